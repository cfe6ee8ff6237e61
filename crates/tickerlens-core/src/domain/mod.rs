//! # Domain Models
//!
//! Canonical domain types for tickerlens.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, exchange-qualified ticker |
//! | [`Fundamentals`] | Ratios plus company profile for one ticker |
//! | [`PriceSeries`] | Daily closes, strictly ascending by date |
//! | [`TickerSnapshot`] | Fundamentals + prices as fetched together |
//! | [`HistoryRange`] | Lookback window (5d .. 5y) |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Constructors validate their invariants; fetched records are never mutated
//! afterwards and are shared behind `Arc` by the cache.

mod history_range;
mod models;
mod symbol;
mod timestamp;

pub use history_range::HistoryRange;
pub use models::{
    CompanyProfile, Fundamentals, Officer, PricePoint, PriceSeries, TickerSnapshot,
    ValuationRatios,
};
pub use symbol::{Symbol, B3_SUFFIX};
pub use timestamp::UtcDateTime;
