//! Dated cash-flow events, the common currency of every projection.

use cashcast_shared::types::CreditCardId;
use cashcast_shared::types::date::calendar_date;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of cash movement an event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    /// Money arriving in the bank account.
    Inflow,
    /// Money leaving the bank account.
    Outflow,
    /// Cash paid towards a credit card balance.
    CreditPayment,
    /// Vendor purchase order.
    PurchaseOrder,
    /// Cash forced out because a card went over its limit.
    CreditOverflow,
    /// Occurrence of a recurring expense.
    Recurring,
}

/// A single dated money movement.
///
/// `amount` is a magnitude; the direction comes from `event_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Nominal date of the event.
    #[serde(deserialize_with = "calendar_date::deserialize")]
    pub date: NaiveDate,
    /// Date the event actually hits the cash balance, when it differs.
    #[serde(default, deserialize_with = "calendar_date::option::deserialize")]
    pub balance_impact_date: Option<NaiveDate>,
    /// Card whose line this event draws on, if any.
    #[serde(default)]
    pub credit_card_id: Option<CreditCardId>,
    /// Vendor or source label.
    #[serde(default)]
    pub label: Option<String>,
}

impl CashFlowEvent {
    /// Creates an event; the amount is stored as a magnitude.
    #[must_use]
    pub fn new(event_type: EventType, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            event_type,
            amount: amount.abs(),
            date,
            balance_impact_date: None,
            credit_card_id: None,
            label: None,
        }
    }

    /// Sets the date the event hits the balance.
    #[must_use]
    pub fn with_impact_date(mut self, date: NaiveDate) -> Self {
        self.balance_impact_date = Some(date);
        self
    }

    /// Attaches the event to a credit card.
    #[must_use]
    pub fn with_card(mut self, card: CreditCardId) -> Self {
        self.credit_card_id = Some(card);
        self
    }

    /// Sets the vendor/source label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Date the event affects the balance.
    #[must_use]
    pub fn effective_date(&self) -> NaiveDate {
        self.balance_impact_date.unwrap_or(self.date)
    }

    /// Magnitude of the event, whatever sign the caller supplied.
    #[must_use]
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    /// True for money arriving in cash.
    #[must_use]
    pub fn is_inflow(&self) -> bool {
        self.event_type == EventType::Inflow
    }

    /// True when the event is paid from cash rather than drawn on a card.
    ///
    /// Card payments and overflow debits always leave cash, even though they
    /// name a card.
    #[must_use]
    pub fn is_cash_outflow(&self) -> bool {
        if self.is_inflow() {
            return false;
        }
        match self.credit_card_id {
            None => true,
            Some(_) => matches!(
                self.event_type,
                EventType::CreditPayment | EventType::CreditOverflow
            ),
        }
    }

    /// Card charged by this event, if it is a purchase on a card.
    #[must_use]
    pub fn card_purchase(&self) -> Option<CreditCardId> {
        match self.event_type {
            EventType::Inflow | EventType::CreditPayment | EventType::CreditOverflow => None,
            _ => self.credit_card_id,
        }
    }

    /// Card credited by this event, if it is a card payment.
    #[must_use]
    pub fn card_payment(&self) -> Option<CreditCardId> {
        match self.event_type {
            EventType::CreditPayment => self.credit_card_id,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn test_amount_stored_as_magnitude() {
        let event = CashFlowEvent::new(EventType::Outflow, dec!(-45.10), day(1));
        assert_eq!(event.amount, dec!(45.10));
    }

    #[test]
    fn test_effective_date_defaults_to_date() {
        let event = CashFlowEvent::new(EventType::Outflow, dec!(10), day(1));
        assert_eq!(event.effective_date(), day(1));

        let delayed = event.with_impact_date(day(4));
        assert_eq!(delayed.effective_date(), day(4));
        assert_eq!(delayed.date, day(1));
    }

    #[test]
    fn test_card_purchase_is_not_cash() {
        let card = CreditCardId::new();
        let event = CashFlowEvent::new(EventType::PurchaseOrder, dec!(10), day(1)).with_card(card);
        assert!(!event.is_cash_outflow());
        assert_eq!(event.card_purchase(), Some(card));
        assert_eq!(event.card_payment(), None);
    }

    #[test]
    fn test_card_payment_is_cash_and_restores_card() {
        let card = CreditCardId::new();
        let event = CashFlowEvent::new(EventType::CreditPayment, dec!(10), day(1)).with_card(card);
        assert!(event.is_cash_outflow());
        assert_eq!(event.card_purchase(), None);
        assert_eq!(event.card_payment(), Some(card));
    }

    #[test]
    fn test_plain_events() {
        let inflow = CashFlowEvent::new(EventType::Inflow, dec!(10), day(1));
        assert!(inflow.is_inflow());
        assert!(!inflow.is_cash_outflow());

        let outflow = CashFlowEvent::new(EventType::Recurring, dec!(10), day(1));
        assert!(outflow.is_cash_outflow());
        assert_eq!(outflow.card_purchase(), None);
    }

    #[test]
    fn test_deserialize_wire_shape() {
        let json = r#"{
            "type": "credit-payment",
            "amount": "250.00",
            "date": "2025-06-01",
            "balance_impact_date": "2025-06-03T00:00:00Z",
            "credit_card_id": "0191d4a2-8c4e-7f00-9d3e-2a1b3c4d5e6f",
            "label": "Amex autopay"
        }"#;
        let event: CashFlowEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::CreditPayment);
        assert_eq!(event.amount, dec!(250));
        assert_eq!(event.effective_date(), day(3));
        assert!(event.credit_card_id.is_some());
        assert_eq!(event.label.as_deref(), Some("Amex autopay"));
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"type":"purchase-order","amount":99.5,"date":"2025-06-02"}"#;
        let event: CashFlowEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, EventType::PurchaseOrder);
        assert_eq!(event.balance_impact_date, None);
        assert_eq!(event.credit_card_id, None);
    }
}
