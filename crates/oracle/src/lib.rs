//! Colend quote provider boundary
//!
//! USD valuations for collateral assets arrive from an injected
//! external provider. The engine treats it as fallible and optional:
//! positions must exist even when no live quote is available.

mod error;
mod mock;
mod types;

pub use error::QuoteError;
pub use mock::MockQuoteProvider;
pub use types::{Quote, QuoteProvider};
