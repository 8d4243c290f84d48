//! Pricing errors

use colend_core::AssetCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unsupported collateral asset class: {0}")]
    UnsupportedCollateral(AssetCode),
}
