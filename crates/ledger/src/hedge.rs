//! Hedge records

use chrono::{DateTime, Utc};
use colend_core::{Amount, AssetCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::record_id;

/// Status of a hedge
///
/// A hedge is created `pending` and reaches a terminal status exactly
/// once. With no execution provider configured it stays `pending`
/// (execution may be supplied asynchronously later).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HedgeStatus {
    Pending,
    Executed,
    Failed,
}

impl HedgeStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, HedgeStatus::Executed | HedgeStatus::Failed)
    }
}

/// An asset-for-asset exchange intended to reduce directional exposure,
/// executed via an external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hedge {
    /// Opaque identifier (`HDG-` prefixed)
    pub id: String,

    pub owner_id: String,

    pub asset_in: AssetCode,
    pub amount_in: Amount,

    pub asset_out: AssetCode,
    pub min_amount_out: Amount,

    /// Filled on successful execution; null until then
    pub amount_out: Option<Amount>,
    /// Provider-side reference for the executed swap
    pub execution_reference: Option<String>,

    pub status: HedgeStatus,

    /// Free-form execution details, including the failure reason
    pub details: HashMap<String, Value>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Hedge {
    /// Create a new pending hedge
    pub fn new(
        owner_id: impl Into<String>,
        asset_in: AssetCode,
        amount_in: Amount,
        asset_out: AssetCode,
        min_amount_out: Amount,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: record_id("HDG"),
            owner_id: owner_id.into(),
            asset_in,
            amount_in,
            asset_out,
            min_amount_out,
            amount_out: None,
            execution_reference: None,
            status: HedgeStatus::Pending,
            details: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_hedge_is_pending() {
        let hedge = Hedge::new(
            "carol",
            AssetCode::Btc,
            Amount::new(dec!(0.2)).unwrap(),
            AssetCode::Usdt,
            Amount::new(dec!(9500)).unwrap(),
        );

        assert!(hedge.id.starts_with("HDG-"));
        assert_eq!(hedge.status, HedgeStatus::Pending);
        assert!(hedge.amount_out.is_none());
        assert!(hedge.execution_reference.is_none());
        assert!(hedge.details.is_empty());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!HedgeStatus::Pending.is_terminal());
        assert!(HedgeStatus::Executed.is_terminal());
        assert!(HedgeStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(HedgeStatus::Failed.to_string(), "failed");
        assert_eq!(
            "executed".parse::<HedgeStatus>().unwrap(),
            HedgeStatus::Executed
        );
    }
}
