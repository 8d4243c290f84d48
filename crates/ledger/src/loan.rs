//! Loan records
//!
//! A loan's `ltv_ratio` is set once at origination and never mutated;
//! risk re-evaluation happens through the health factor computed on
//! read, not by rewriting the stored ratio.

use chrono::{DateTime, Duration, Utc};
use colend_core::{Amount, AssetCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::record_id;

/// Status of a loan
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Requested, awaiting an approval decision
    PendingApproval,
    /// Approved and accruing interest
    Active,
    /// Principal fully covered
    Repaid,
    /// Declined at the approval gate
    Rejected,
    /// Collateral seized
    Liquidated,
}

impl LoanStatus {
    /// Terminal states are retained for audit but accept no further
    /// transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Repaid | LoanStatus::Rejected | LoanStatus::Liquidated
        )
    }
}

/// A collateral-backed loan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Opaque identifier (`LOAN-` prefixed)
    pub id: String,

    /// Trusted owner id supplied by the identity boundary
    pub owner_id: String,

    /// Borrowed asset
    pub principal_asset: AssetCode,
    /// Borrowed amount
    pub principal_amount: Amount,

    /// Pledged asset
    pub collateral_asset: AssetCode,
    /// Pledged amount
    pub collateral_amount: Amount,

    /// Annualized percentage rate fixed at origination
    pub apr: Decimal,

    /// Loan-to-value ratio at origination. Immutable thereafter.
    pub ltv_ratio: Decimal,

    /// Loan term in days
    pub term_days: u32,
    /// Maturity date derived from the request time and term
    pub due_date: DateTime<Utc>,

    /// Total repaid to date. Never exceeds `principal_amount`.
    pub repaid_amount: Amount,

    pub status: LoanStatus,

    // Audit timestamps
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub liquidated_at: Option<DateTime<Utc>>,
    pub last_payment_at: Option<DateTime<Utc>>,

    pub approval_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub liquidation_reason: Option<String>,
}

impl Loan {
    /// Create a new loan in `pending_approval`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: impl Into<String>,
        principal_asset: AssetCode,
        principal_amount: Amount,
        collateral_asset: AssetCode,
        collateral_amount: Amount,
        apr: Decimal,
        ltv_ratio: Decimal,
        term_days: u32,
    ) -> Self {
        let requested_at = Utc::now();

        Self {
            id: record_id("LOAN"),
            owner_id: owner_id.into(),
            principal_asset,
            principal_amount,
            collateral_asset,
            collateral_amount,
            apr,
            ltv_ratio,
            term_days,
            due_date: requested_at + Duration::days(term_days as i64),
            repaid_amount: Amount::ZERO,
            status: LoanStatus::PendingApproval,
            requested_at,
            approved_at: None,
            rejected_at: None,
            liquidated_at: None,
            last_payment_at: None,
            approval_notes: None,
            rejection_reason: None,
            liquidation_reason: None,
        }
    }

    /// Principal not yet covered by repayments
    pub fn outstanding(&self) -> Amount {
        self.principal_amount
            .checked_sub(&self.repaid_amount)
            .unwrap_or(Amount::ZERO)
    }

    /// True once repayments cover the full principal
    pub fn is_fully_repaid(&self) -> bool {
        self.repaid_amount >= self.principal_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(val: i64) -> Amount {
        Amount::new(Decimal::new(val, 0)).unwrap()
    }

    fn test_loan() -> Loan {
        Loan::new(
            "alice",
            AssetCode::Usdt,
            amount(5000),
            AssetCode::Btc,
            Amount::new(dec!(0.5)).unwrap(),
            dec!(4.025),
            dec!(60),
            90,
        )
    }

    #[test]
    fn test_new_loan_is_pending() {
        let loan = test_loan();
        assert!(loan.id.starts_with("LOAN-"));
        assert_eq!(loan.status, LoanStatus::PendingApproval);
        assert!(loan.repaid_amount.is_zero());
        assert_eq!(loan.due_date, loan.requested_at + Duration::days(90));
    }

    #[test]
    fn test_outstanding_tracks_repayments() {
        let mut loan = test_loan();
        assert_eq!(loan.outstanding(), amount(5000));

        loan.repaid_amount = amount(1500);
        assert_eq!(loan.outstanding(), amount(3500));
        assert!(!loan.is_fully_repaid());

        loan.repaid_amount = amount(5000);
        assert_eq!(loan.outstanding(), Amount::ZERO);
        assert!(loan.is_fully_repaid());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!LoanStatus::PendingApproval.is_terminal());
        assert!(!LoanStatus::Active.is_terminal());
        assert!(LoanStatus::Repaid.is_terminal());
        assert!(LoanStatus::Rejected.is_terminal());
        assert!(LoanStatus::Liquidated.is_terminal());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(LoanStatus::PendingApproval.to_string(), "pending_approval");
        assert_eq!(
            "liquidated".parse::<LoanStatus>().unwrap(),
            LoanStatus::Liquidated
        );
        let json = serde_json::to_string(&LoanStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
