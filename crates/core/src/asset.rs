//! AssetCode - Type-safe asset identifiers
//!
//! Common collateral and settlement assets are pre-defined;
//! anything else falls through to the `Other` variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing asset codes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetCodeError {
    #[error("Empty asset code")]
    EmptyCode,

    #[error("Asset code too long (max 10 chars): {0}")]
    TooLong(String),
}

/// Asset codes
///
/// The collateral universe of the lending engine plus an escape hatch
/// for tokens it only tracks opaquely (e.g. hedge legs).
///
/// # Examples
/// ```
/// use colend_core::AssetCode;
///
/// let btc: AssetCode = "BTC".parse().unwrap();
/// assert_eq!(btc, AssetCode::Btc);
/// assert_eq!(btc.to_string(), "BTC");
///
/// let custom: AssetCode = "ARB".parse().unwrap();
/// assert!(matches!(custom, AssetCode::Other(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssetCode {
    /// Bitcoin
    Btc,
    /// Ethereum
    Eth,
    /// Solana
    Sol,
    /// Tether USD
    Usdt,
    /// USD Coin
    Usdc,
    /// Any other token
    Other(String),
}

impl AssetCode {
    /// Returns the asset code as a string slice
    pub fn code(&self) -> &str {
        match self {
            AssetCode::Btc => "BTC",
            AssetCode::Eth => "ETH",
            AssetCode::Sol => "SOL",
            AssetCode::Usdt => "USDT",
            AssetCode::Usdc => "USDC",
            AssetCode::Other(code) => code,
        }
    }

    /// USD-pegged assets are priced and risk-bucketed differently
    /// from volatile collateral.
    pub fn is_stablecoin(&self) -> bool {
        matches!(self, AssetCode::Usdt | AssetCode::Usdc)
    }
}

impl fmt::Display for AssetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for AssetCode {
    type Err = AssetCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();

        if code.is_empty() {
            return Err(AssetCodeError::EmptyCode);
        }
        if code.len() > 10 {
            return Err(AssetCodeError::TooLong(code));
        }

        Ok(match code.as_str() {
            "BTC" => AssetCode::Btc,
            "ETH" => AssetCode::Eth,
            "SOL" => AssetCode::Sol,
            "USDT" => AssetCode::Usdt,
            "USDC" => AssetCode::Usdc,
            _ => AssetCode::Other(code),
        })
    }
}

impl TryFrom<String> for AssetCode {
    type Error = AssetCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssetCode> for String {
    fn from(asset: AssetCode) -> Self {
        asset.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_assets() {
        assert_eq!("BTC".parse::<AssetCode>().unwrap(), AssetCode::Btc);
        assert_eq!("eth".parse::<AssetCode>().unwrap(), AssetCode::Eth);
        assert_eq!(" usdt ".parse::<AssetCode>().unwrap(), AssetCode::Usdt);
    }

    #[test]
    fn test_parse_other_asset() {
        let code: AssetCode = "DOGE".parse().unwrap();
        assert_eq!(code, AssetCode::Other("DOGE".to_string()));
        assert_eq!(code.to_string(), "DOGE");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(
            "".parse::<AssetCode>(),
            Err(AssetCodeError::EmptyCode)
        ));
        assert!(matches!(
            "   ".parse::<AssetCode>(),
            Err(AssetCodeError::EmptyCode)
        ));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        assert!(matches!(
            "VERYLONGTOKEN".parse::<AssetCode>(),
            Err(AssetCodeError::TooLong(_))
        ));
    }

    #[test]
    fn test_is_stablecoin() {
        assert!(AssetCode::Usdt.is_stablecoin());
        assert!(AssetCode::Usdc.is_stablecoin());
        assert!(!AssetCode::Btc.is_stablecoin());
        assert!(!AssetCode::Other("DAI".to_string()).is_stablecoin());
    }

    #[test]
    fn test_serde_roundtrip() {
        let asset = AssetCode::Btc;
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(json, "\"BTC\"");
        let parsed: AssetCode = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, parsed);
    }
}
