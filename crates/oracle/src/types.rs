//! Core quote types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use colend_core::AssetCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::QuoteError;

/// A USD valuation snapshot for one asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// The valued asset
    pub asset: AssetCode,
    /// Current USD price per unit
    pub price_usd: Decimal,
    /// When this quote was fetched
    pub timestamp: DateTime<Utc>,
    /// Source of the quote (e.g. "mock", "chainlink", "binance")
    pub source: String,
}

impl Quote {
    pub fn new(asset: AssetCode, price_usd: Decimal, source: impl Into<String>) -> Self {
        Self {
            asset,
            price_usd,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    /// USD value of `amount` units at this quote
    pub fn value_of(&self, amount: Decimal) -> Decimal {
        self.price_usd * amount
    }

    /// Check if the quote is older than a threshold
    pub fn is_stale(&self, max_age_secs: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.timestamp);
        age.num_seconds() > max_age_secs as i64
    }
}

/// Quote provider trait - interface for USD valuation feeds
///
/// Implementations can be:
/// - MockQuoteProvider: fixed prices for testing
/// - An exchange- or oracle-backed feed in the hosting application
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Get the current USD quote for an asset
    async fn quote_usd(&self, asset: &AssetCode) -> Result<Quote, QuoteError>;

    /// List all assets this provider can value
    async fn supported_assets(&self) -> Vec<AssetCode>;

    /// Check if an asset is supported
    async fn is_supported(&self, asset: &AssetCode) -> bool {
        self.supported_assets().await.contains(asset)
    }
}
