//! Quote provider errors
//!
//! Always recoverable: a failed or timed-out quote never fails the
//! caller's record state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteError {
    /// No valuation available for the asset
    #[error("No quote available for asset: {asset}")]
    AssetNotFound { asset: String },

    /// Provider returned a quote the engine cannot use
    #[error("Invalid quote for {asset}: {reason}")]
    InvalidQuote { asset: String, reason: String },

    /// Provider did not answer within the caller-supplied bound
    #[error("Quote for {asset} timed out after {timeout_ms}ms")]
    Timeout { asset: String, timeout_ms: u128 },

    /// External provider connection failed
    #[error("Quote provider connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
