//! # adapter_feeds
//!
//! Daily closing-price feeds for the risk analyzer.
//!
//! ## Architecture Position
//!
//! **A**dapter layer of the A-I-P-S architecture. Implements
//! `risk_core::PriceSeriesSource`; the core never sees file formats or
//! random generators.
//!
//! ## Modules
//!
//! - `synthetic`: seeded geometric-Brownian-motion closes on a weekday calendar
//! - `csv_feed`: one `<ASSET>.csv` file per asset with `date,close` columns
//! - `calendar`: trading-day helpers shared by both feeds
//!
//! ## Example
//!
//! ```
//! use adapter_feeds::SyntheticFeed;
//! use chrono::NaiveDate;
//!
//! let end = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
//! let feed = SyntheticFeed::new(42, end);
//! assert_eq!(feed.path("AAPL", 10).len(), 10);
//! ```

#![deny(missing_docs)]

pub mod calendar;
pub mod csv_feed;
pub mod synthetic;

mod error;

pub use csv_feed::CsvFeed;
pub use error::FeedError;
pub use synthetic::{GbmParams, SyntheticFeed};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::csv_feed::CsvFeed;
    pub use crate::synthetic::SyntheticFeed;
    pub use crate::FeedError;
}
