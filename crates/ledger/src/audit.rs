//! Append-only audit records
//!
//! Liquidations, risk alerts and transaction entries are written once
//! and never mutated. They are the audit trail of the engine; basic
//! type checks aside, suspicious values are logged rather than
//! rejected, since their audit value outweighs strict validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::record_id;

/// A forced or manual recovery of collateral.
///
/// References zero-or-one loan and zero-or-one position; at least one
/// is required (enforced by the ledger on write).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liquidation {
    /// Opaque identifier (`LIQ-` prefixed)
    pub id: String,

    pub loan_id: Option<String>,
    pub position_id: Option<String>,

    pub owner_id: String,

    pub recovered_amount: Decimal,
    pub recovered_asset: String,

    pub reason: String,

    pub executed_at: DateTime<Utc>,

    pub details: HashMap<String, Value>,
}

impl Liquidation {
    pub fn new(
        loan_id: Option<String>,
        position_id: Option<String>,
        owner_id: impl Into<String>,
        recovered_amount: Decimal,
        recovered_asset: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: record_id("LIQ"),
            loan_id,
            position_id,
            owner_id: owner_id.into(),
            recovered_amount,
            recovered_asset: recovered_asset.into(),
            reason: reason.into(),
            executed_at: Utc::now(),
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// The entity a risk alert flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity_type", content = "entity_id", rename_all = "snake_case")]
pub enum AlertEntity {
    Loan(String),
    Position(String),
}

impl AlertEntity {
    pub fn entity_id(&self) -> &str {
        match self {
            AlertEntity::Loan(id) | AlertEntity::Position(id) => id,
        }
    }
}

/// A breach detected by the risk scanner.
///
/// Snapshots the breaching metrics and the thresholds in force when the
/// scan ran, so alerts stay meaningful after configs change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    /// Opaque identifier (`ALR-` prefixed)
    pub id: String,

    pub entity: AlertEntity,

    /// LTV ratio observed at scan time, when known
    pub ltv_ratio: Option<Decimal>,
    /// Health factor observed at scan time, when derivable
    pub health_factor: Option<Decimal>,

    /// Max LTV threshold in force during the scan
    pub max_ltv: Decimal,
    /// Min health threshold in force during the scan
    pub min_health_factor: Decimal,

    pub created_at: DateTime<Utc>,

    /// Set by downstream alert consumers, never by the scanner
    pub processed: bool,
}

impl RiskAlert {
    pub fn new(
        entity: AlertEntity,
        ltv_ratio: Option<Decimal>,
        health_factor: Option<Decimal>,
        max_ltv: Decimal,
        min_health_factor: Decimal,
    ) -> Self {
        Self {
            id: record_id("ALR"),
            entity,
            ltv_ratio,
            health_factor,
            max_ltv,
            min_health_factor,
            created_at: Utc::now(),
            processed: false,
        }
    }
}

/// Kind of ledger transaction entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Repayment,
    Liquidation,
}

/// An append-only entry recording money movement against a loan or
/// position. Mirrors into the JSONL journal when one is attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEntry {
    /// Opaque identifier (`TXN-` prefixed)
    pub id: String,

    pub kind: TransactionKind,

    pub loan_id: Option<String>,
    pub position_id: Option<String>,

    pub amount: Decimal,
    pub asset: String,

    /// True when a repayment covered the remaining principal
    pub fully_repaid: bool,

    pub recorded_at: DateTime<Utc>,

    pub details: HashMap<String, Value>,
}

impl TransactionEntry {
    /// Entry for a loan repayment
    pub fn repayment(
        loan_id: impl Into<String>,
        amount: Decimal,
        asset: impl Into<String>,
        fully_repaid: bool,
    ) -> Self {
        Self {
            id: record_id("TXN"),
            kind: TransactionKind::Repayment,
            loan_id: Some(loan_id.into()),
            position_id: None,
            amount,
            asset: asset.into(),
            fully_repaid,
            recorded_at: Utc::now(),
            details: HashMap::new(),
        }
    }

    /// Entry for a loan or position liquidation
    pub fn liquidation(
        loan_id: Option<String>,
        position_id: Option<String>,
        amount: Decimal,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            id: record_id("TXN"),
            kind: TransactionKind::Liquidation,
            loan_id,
            position_id,
            amount,
            asset: asset.into(),
            fully_repaid: false,
            recorded_at: Utc::now(),
            details: HashMap::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}
