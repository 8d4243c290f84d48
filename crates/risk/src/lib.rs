//! Colend risk scanner
//!
//! A periodic/on-demand read-only pass over all open exposures. The
//! scanner detects under-collateralization and appends risk alerts
//! through the credit ledger; it never mutates the entities it scans.

mod scanner;

pub use scanner::{RiskConfig, RiskScanner};
