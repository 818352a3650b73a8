//! Export of metric reports for analysis
//!
//! Reports are written as JSON (per-actor entries plus the batch summary) or
//! as CSV with one row per actor.

mod report;

pub use report::{ActorCsvRecord, ReportExporter};
