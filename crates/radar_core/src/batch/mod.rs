//! Batch processing of retiming units.
//!
//! Units are independent. They run in order with `jobs = 1`, or on a rayon
//! pool otherwise, and every outcome ends up in a [`BatchSummary`].

mod processor;
mod summary;

pub use processor::{BatchProcessor, CancelHandle};
pub use summary::{BatchSummary, UnitReport};
