//! Colend pricing - Loan term pricing and health evaluation
//!
//! Pure calculators with no state of their own: the loan pricer turns
//! collateral class, term and LTV into interest terms; the health module
//! measures distance from the liquidation threshold.

mod error;
pub mod health;
mod terms;

pub use error::PricingError;
pub use health::{health_factor, LIQUIDATION_THRESHOLD};
pub use terms::{LoanPricer, LoanTerms, LIQUIDATION_MARGIN};
