//! Vault position records

use chrono::{DateTime, Utc};
use colend_core::{Amount, AssetCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::record_id;

/// Status of a vault position
///
/// `closing` is reserved for staged unwinds; a direct `open -> closed`
/// transition is also legal for immediate liquidation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Open,
    Closing,
    Closed,
}

impl PositionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PositionStatus::Closed)
    }
}

/// A tracked deposit of collateral held on behalf of an owner,
/// independent of any specific loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultPosition {
    /// Opaque identifier (`POS-` prefixed)
    pub id: String,

    pub owner_id: String,

    pub asset: AssetCode,
    /// Deposited amount; non-negative by construction
    pub amount: Amount,

    /// Last-known USD valuation. Zero until a quote succeeds.
    pub value_usd: Decimal,

    pub status: PositionStatus,

    /// Free-form metadata; may embed an `ltv_ratio` used to derive the
    /// health factor when no direct value is tracked.
    pub metadata: HashMap<String, Value>,

    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl VaultPosition {
    /// Create a new open position with no valuation yet
    pub fn new(
        owner_id: impl Into<String>,
        asset: AssetCode,
        amount: Amount,
        metadata: HashMap<String, Value>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: record_id("POS"),
            owner_id: owner_id.into(),
            asset,
            amount,
            value_usd: Decimal::ZERO,
            status: PositionStatus::Open,
            metadata,
            opened_at: now,
            updated_at: now,
            closed_at: None,
        }
    }

    /// LTV ratio embedded in metadata, if any.
    ///
    /// Accepts both JSON numbers and numeric strings, since metadata
    /// arrives from untyped callers.
    pub fn metadata_ltv(&self) -> Option<Decimal> {
        match self.metadata.get("ltv_ratio")? {
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}
