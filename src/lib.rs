//! Aggregation and ranking engine behind the ERP usage dashboard.
//!
//! Raw usage rows flow one way: [`normalize`] coerces fields, [`ranking`] and
//! [`grouping`] derive ordered views, [`tier`] classifies scores, and
//! [`summary`] assembles what the dashboard renders. [`source`] owns the
//! refreshed snapshot; the core only ever sees it as a plain argument.

pub mod chart;
pub mod grouping;
pub mod models;
pub mod normalize;
pub mod ranking;
pub mod report;
pub mod source;
pub mod summary;
pub mod tier;

pub use models::{Record, Snapshot, Stats};
pub use summary::DashboardSummary;
pub use tier::{classify_tier, Tier};
