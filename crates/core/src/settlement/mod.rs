//! Settlement fund distribution.
//!
//! Turns a marketplace settlement bucket into daily unlock amounts, either
//! spread evenly, accumulated over the settlement period, or weighted by the
//! historical sales pace of each day.

pub mod distributor;
pub mod types;

#[cfg(test)]
mod props;

pub use distributor::SettlementDistributor;
pub use types::{
    DailyDistribution, DistributionMode, HistoricalVolume, SettlementBucket, VolumeWeights,
};
