//! Mock quote provider for testing
//!
//! Stores fixed USD prices that can be updated programmatically.

use async_trait::async_trait;
use colend_core::AssetCode;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::QuoteError;
use crate::types::{Quote, QuoteProvider};

/// Mock quote provider
///
/// Useful for unit and integration tests; prices are settable and
/// removable to exercise the unavailable-quote paths.
pub struct MockQuoteProvider {
    /// Stored quotes (asset code -> quote)
    quotes: RwLock<HashMap<String, Quote>>,
}

impl MockQuoteProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self {
            quotes: RwLock::new(HashMap::new()),
        }
    }

    /// Create a mock provider with default collateral prices
    pub fn with_defaults() -> Self {
        let provider = Self::new();

        provider.set_quote(AssetCode::Btc, Decimal::from(50000));
        provider.set_quote(AssetCode::Eth, Decimal::from(3000));
        provider.set_quote(AssetCode::Sol, Decimal::from(100));
        provider.set_quote(AssetCode::Usdt, Decimal::ONE);
        provider.set_quote(AssetCode::Usdc, Decimal::ONE);

        provider
    }

    /// Set a fixed USD price for an asset
    pub fn set_quote(&self, asset: AssetCode, price_usd: Decimal) {
        let quote = Quote::new(asset.clone(), price_usd, "mock");
        let mut quotes = self.quotes.write().unwrap();
        quotes.insert(asset.code().to_string(), quote);
    }

    /// Remove a quote (for testing the asset-not-found path)
    pub fn remove_quote(&self, asset: &AssetCode) {
        let mut quotes = self.quotes.write().unwrap();
        quotes.remove(asset.code());
    }

    /// Number of configured assets
    pub fn quote_count(&self) -> usize {
        self.quotes.read().unwrap().len()
    }
}

impl Default for MockQuoteProvider {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    async fn quote_usd(&self, asset: &AssetCode) -> Result<Quote, QuoteError> {
        let quotes = self.quotes.read().unwrap();
        quotes
            .get(asset.code())
            .cloned()
            .ok_or_else(|| QuoteError::AssetNotFound {
                asset: asset.code().to_string(),
            })
    }

    async fn supported_assets(&self) -> Vec<AssetCode> {
        let quotes = self.quotes.read().unwrap();
        quotes.values().map(|quote| quote.asset.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_default_quotes() {
        let provider = MockQuoteProvider::with_defaults();

        let btc = provider.quote_usd(&AssetCode::Btc).await.unwrap();
        assert_eq!(btc.price_usd, dec!(50000));

        let usdt = provider.quote_usd(&AssetCode::Usdt).await.unwrap();
        assert_eq!(usdt.price_usd, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_set_and_remove_quote() {
        let provider = MockQuoteProvider::new();
        let doge = AssetCode::Other("DOGE".to_string());

        assert!(provider.quote_usd(&doge).await.is_err());

        provider.set_quote(doge.clone(), dec!(0.08));
        let quote = provider.quote_usd(&doge).await.unwrap();
        assert_eq!(quote.price_usd, dec!(0.08));

        provider.remove_quote(&doge);
        let result = provider.quote_usd(&doge).await;
        assert!(matches!(result, Err(QuoteError::AssetNotFound { .. })));
    }

    #[tokio::test]
    async fn test_supported_assets() {
        let provider = MockQuoteProvider::with_defaults();
        assert!(provider.is_supported(&AssetCode::Btc).await);
        assert!(
            !provider
                .is_supported(&AssetCode::Other("PEPE".to_string()))
                .await
        );
        assert_eq!(provider.quote_count(), 5);
    }
}
