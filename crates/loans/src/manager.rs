//! Loan lifecycle manager

use chrono::Utc;
use colend_core::{Amount, AssetCode};
use colend_ledger::{
    CreditError, CreditLedger, Liquidation, Loan, LoanStatus, TransactionEntry,
};
use colend_pricing::{health_factor, LoanPricer, PricingError, LIQUIDATION_THRESHOLD};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for loan origination
#[derive(Debug, Clone)]
pub struct LoanConfig {
    /// Maximum loan-to-value ratio accepted at origination
    pub max_ltv: Decimal,
    /// Shortest accepted term
    pub min_term_days: u32,
    /// Longest accepted term
    pub max_term_days: u32,
    /// Collateral assets the desk accepts
    pub supported_collateral: Vec<AssetCode>,
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            max_ltv: Decimal::from(85),
            min_term_days: 30,
            max_term_days: 1825,
            supported_collateral: vec![
                AssetCode::Btc,
                AssetCode::Eth,
                AssetCode::Sol,
                AssetCode::Usdt,
                AssetCode::Usdc,
            ],
        }
    }
}

/// Input for a loan request. The owner id arrives separately from the
/// identity boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal_asset: AssetCode,
    pub principal_amount: Amount,
    pub collateral_asset: AssetCode,
    pub collateral_amount: Amount,
    pub term_days: u32,
    pub ltv_ratio: Decimal,
}

/// A loan snapshot returned to callers.
///
/// The health factor is computed on read from the stored origination
/// LTV, never cached on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub health_factor: Option<Decimal>,
}

impl LoanView {
    fn of(loan: Loan) -> Self {
        let health_factor = health_factor(Some(loan.ltv_ratio), LIQUIDATION_THRESHOLD);
        Self {
            loan,
            health_factor,
        }
    }
}

/// Loan lifecycle manager
pub struct LoanManager {
    ledger: Arc<CreditLedger>,
    pricer: LoanPricer,
    config: LoanConfig,
}

impl LoanManager {
    /// Create a manager over a shared ledger
    pub fn new(ledger: Arc<CreditLedger>, pricer: LoanPricer, config: LoanConfig) -> Self {
        Self {
            ledger,
            pricer,
            config,
        }
    }

    /// Create a manager with default pricing and config
    pub fn with_ledger(ledger: Arc<CreditLedger>) -> Self {
        Self::new(ledger, LoanPricer::new(), LoanConfig::default())
    }

    pub fn config(&self) -> &LoanConfig {
        &self.config
    }

    /// Validate, price and persist a new loan as `pending_approval`
    pub fn request_loan(
        &self,
        owner_id: &str,
        request: LoanRequest,
    ) -> Result<LoanView, CreditError> {
        if !self
            .config
            .supported_collateral
            .contains(&request.collateral_asset)
        {
            return Err(CreditError::validation(
                "collateral_asset",
                format!("unsupported collateral asset {}", request.collateral_asset),
            ));
        }
        if !request.principal_amount.is_positive() {
            return Err(CreditError::validation(
                "principal_amount",
                "principal amount must be greater than zero",
            ));
        }
        if !request.collateral_amount.is_positive() {
            return Err(CreditError::validation(
                "collateral_amount",
                "collateral amount must be greater than zero",
            ));
        }
        if request.term_days < self.config.min_term_days
            || request.term_days > self.config.max_term_days
        {
            return Err(CreditError::validation(
                "term_days",
                format!(
                    "term must be between {} and {} days",
                    self.config.min_term_days, self.config.max_term_days
                ),
            ));
        }
        if request.ltv_ratio <= Decimal::ZERO || request.ltv_ratio > self.config.max_ltv {
            return Err(CreditError::validation(
                "ltv_ratio",
                format!("LTV ratio must be in (0, {}]", self.config.max_ltv),
            ));
        }

        let terms = self
            .pricer
            .compute_terms(&request.collateral_asset, request.term_days, request.ltv_ratio)
            .map_err(|PricingError::UnsupportedCollateral(asset)| {
                CreditError::validation(
                    "collateral_asset",
                    format!("no pricing available for {asset}"),
                )
            })?;

        let loan = self.ledger.create_loan(Loan::new(
            owner_id,
            request.principal_asset,
            request.principal_amount,
            request.collateral_asset,
            request.collateral_amount,
            terms.apr,
            request.ltv_ratio,
            request.term_days,
        ));

        info!(loan_id = %loan.id, owner_id, apr = %loan.apr, "loan requested");
        Ok(LoanView::of(loan))
    }

    /// Approve a pending loan
    pub fn approve_loan(&self, id: &str, notes: Option<&str>) -> Result<LoanView, CreditError> {
        let loan = self.ledger.transition_loan(
            id,
            &[LoanStatus::PendingApproval],
            LoanStatus::Active,
            |loan| {
                loan.approved_at = Some(Utc::now());
                loan.approval_notes = notes.map(str::to_string);
            },
        )?;

        info!(loan_id = %loan.id, "loan approved");
        Ok(LoanView::of(loan))
    }

    /// Reject a pending loan
    pub fn reject_loan(&self, id: &str, reason: &str) -> Result<LoanView, CreditError> {
        let loan = self.ledger.transition_loan(
            id,
            &[LoanStatus::PendingApproval],
            LoanStatus::Rejected,
            |loan| {
                loan.rejected_at = Some(Utc::now());
                loan.rejection_reason = Some(reason.to_string());
            },
        )?;

        info!(loan_id = %loan.id, reason, "loan rejected");
        Ok(LoanView::of(loan))
    }

    /// Apply a repayment.
    ///
    /// Accepted while `active` or `pending_approval` (early partial
    /// prepayment before formal approval is allowed). Covering the
    /// full principal settles the loan as `repaid`.
    pub fn repay_loan(&self, id: &str, amount: Amount) -> Result<LoanView, CreditError> {
        if !amount.is_positive() {
            return Err(CreditError::validation(
                "amount",
                "repayment amount must be greater than zero",
            ));
        }

        let loan = self.ledger.record_repayment(id, amount)?;
        let fully_repaid = loan.is_fully_repaid();

        self.ledger.record_transaction(TransactionEntry::repayment(
            &loan.id,
            amount.value(),
            loan.principal_asset.code(),
            fully_repaid,
        ));

        info!(loan_id = %loan.id, amount = %amount, fully_repaid, "loan repayment recorded");
        Ok(LoanView::of(loan))
    }

    /// Liquidate a loan from any non-terminal state.
    ///
    /// Writes a liquidation record and a transaction entry alongside
    /// the status change. A non-positive recovery is logged, not
    /// rejected: the audit value of the record outweighs validation.
    pub fn liquidate_loan(
        &self,
        id: &str,
        reason: &str,
        recovered_amount: Decimal,
        recovered_asset: &str,
    ) -> Result<LoanView, CreditError> {
        let loan = self.ledger.transition_loan(
            id,
            &[LoanStatus::PendingApproval, LoanStatus::Active],
            LoanStatus::Liquidated,
            |loan| {
                loan.liquidated_at = Some(Utc::now());
                loan.liquidation_reason = Some(reason.to_string());
            },
        )?;

        if recovered_amount <= Decimal::ZERO {
            warn!(loan_id = %loan.id, %recovered_amount, "liquidation recovered a non-positive amount");
        }
        if recovered_asset.trim().is_empty() {
            warn!(loan_id = %loan.id, "liquidation recorded with empty recovered asset");
        }

        self.ledger.record_liquidation(
            Liquidation::new(
                Some(loan.id.clone()),
                None,
                loan.owner_id.clone(),
                recovered_amount,
                recovered_asset,
                reason,
            )
            .with_detail("ltv_ratio", json!(loan.ltv_ratio.to_string()))
            .with_detail("outstanding", json!(loan.outstanding().to_string())),
        )?;

        self.ledger
            .record_transaction(TransactionEntry::liquidation(
                Some(loan.id.clone()),
                None,
                recovered_amount,
                recovered_asset,
            ));

        info!(loan_id = %loan.id, reason, "loan liquidated");
        Ok(LoanView::of(loan))
    }

    /// Fetch one loan with its health computed on read
    pub fn get_loan(&self, id: &str) -> Result<LoanView, CreditError> {
        Ok(LoanView::of(self.ledger.get_loan(id)?))
    }

    /// All loans for an owner, newest first
    pub fn loans_by_owner(&self, owner_id: &str) -> Vec<LoanView> {
        self.ledger
            .loans_by_owner(owner_id)
            .into_iter()
            .map(LoanView::of)
            .collect()
    }
}
