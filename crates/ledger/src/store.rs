//! Credit ledger store
//!
//! In-memory record sets behind `RwLock`s. Every mutating operation is
//! an atomic read-check-mutate under one write lock, so per-id
//! transitions are linearizable and no partial write is ever visible
//! to a concurrent reader. Liquidations, alerts and transactions are
//! append-only.

use colend_core::Amount;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::warn;

use crate::audit::{Liquidation, RiskAlert, TransactionEntry};
use crate::error::CreditError;
use crate::hedge::{Hedge, HedgeStatus};
use crate::journal::{JournalError, TransactionJournal};
use crate::loan::{Loan, LoanStatus};
use crate::position::{PositionStatus, VaultPosition};

/// The sole owner of persisted credit state
#[derive(Default)]
pub struct CreditLedger {
    loans: RwLock<HashMap<String, Loan>>,
    positions: RwLock<HashMap<String, VaultPosition>>,
    hedges: RwLock<HashMap<String, Hedge>>,
    liquidations: RwLock<Vec<Liquidation>>,
    alerts: RwLock<Vec<RiskAlert>>,
    transactions: RwLock<Vec<TransactionEntry>>,
    journal: Option<Mutex<TransactionJournal>>,
}

impl CreditLedger {
    /// Create an empty in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that mirrors transaction entries to a JSONL
    /// journal directory
    pub fn with_journal(journal_dir: impl AsRef<std::path::Path>) -> Result<Self, JournalError> {
        let journal = TransactionJournal::new(journal_dir)?;
        Ok(Self {
            journal: Some(Mutex::new(journal)),
            ..Self::default()
        })
    }

    // === Loans ===

    /// Insert a new loan and return its snapshot
    pub fn create_loan(&self, loan: Loan) -> Loan {
        let mut loans = self.loans.write().unwrap();
        loans.insert(loan.id.clone(), loan.clone());
        loan
    }

    pub fn get_loan(&self, id: &str) -> Result<Loan, CreditError> {
        self.loans
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CreditError::not_found("loan", id))
    }

    pub fn all_loans(&self) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self.loans.read().unwrap().values().cloned().collect();
        loans.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        loans
    }

    /// Loans for one owner, newest first
    pub fn loans_by_owner(&self, owner_id: &str) -> Vec<Loan> {
        let mut loans: Vec<Loan> = self
            .loans
            .read()
            .unwrap()
            .values()
            .filter(|loan| loan.owner_id == owner_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        loans
    }

    pub fn loans_by_status(&self, status: LoanStatus) -> Vec<Loan> {
        self.loans
            .read()
            .unwrap()
            .values()
            .filter(|loan| loan.status == status)
            .cloned()
            .collect()
    }

    /// Transition a loan whose current status is in `allowed_from`.
    ///
    /// The status check and the mutation happen under one write lock;
    /// a rejected transition leaves the record untouched.
    pub fn transition_loan(
        &self,
        id: &str,
        allowed_from: &[LoanStatus],
        to: LoanStatus,
        apply: impl FnOnce(&mut Loan),
    ) -> Result<Loan, CreditError> {
        let mut loans = self.loans.write().unwrap();
        let loan = loans
            .get_mut(id)
            .ok_or_else(|| CreditError::not_found("loan", id))?;

        if !allowed_from.contains(&loan.status) {
            return Err(CreditError::Conflict {
                entity: "loan",
                id: id.to_string(),
                current: loan.status.to_string(),
                attempted: to.to_string(),
            });
        }

        loan.status = to;
        apply(loan);
        Ok(loan.clone())
    }

    /// Apply a repayment to a loan.
    ///
    /// Allowed while `pending_approval` or `active`. The repaid total
    /// is capped at the principal; covering the full principal
    /// transitions the loan to `repaid` in the same atomic step, which
    /// is what keeps a repayment from landing on an already-liquidated
    /// loan.
    pub fn record_repayment(&self, id: &str, amount: Amount) -> Result<Loan, CreditError> {
        let mut loans = self.loans.write().unwrap();
        let loan = loans
            .get_mut(id)
            .ok_or_else(|| CreditError::not_found("loan", id))?;

        if !matches!(loan.status, LoanStatus::PendingApproval | LoanStatus::Active) {
            return Err(CreditError::Conflict {
                entity: "loan",
                id: id.to_string(),
                current: loan.status.to_string(),
                attempted: "repayment".to_string(),
            });
        }

        let total = loan
            .repaid_amount
            .checked_add(&amount)
            .unwrap_or(loan.principal_amount);
        loan.repaid_amount = total.min(loan.principal_amount);
        loan.last_payment_at = Some(chrono::Utc::now());

        if loan.is_fully_repaid() {
            loan.status = LoanStatus::Repaid;
        }

        Ok(loan.clone())
    }

    // === Vault positions ===

    pub fn create_position(&self, position: VaultPosition) -> VaultPosition {
        let mut positions = self.positions.write().unwrap();
        positions.insert(position.id.clone(), position.clone());
        position
    }

    pub fn get_position(&self, id: &str) -> Result<VaultPosition, CreditError> {
        self.positions
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CreditError::not_found("position", id))
    }

    /// Positions for one owner, newest first
    pub fn positions_by_owner(&self, owner_id: &str) -> Vec<VaultPosition> {
        let mut positions: Vec<VaultPosition> = self
            .positions
            .read()
            .unwrap()
            .values()
            .filter(|position| position.owner_id == owner_id)
            .cloned()
            .collect();
        positions.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        positions
    }

    pub fn open_positions(&self) -> Vec<VaultPosition> {
        self.positions
            .read()
            .unwrap()
            .values()
            .filter(|position| position.status == PositionStatus::Open)
            .cloned()
            .collect()
    }

    /// Refresh the stored USD valuation of an open position
    pub fn update_position_valuation(
        &self,
        id: &str,
        value_usd: Decimal,
    ) -> Result<VaultPosition, CreditError> {
        let mut positions = self.positions.write().unwrap();
        let position = positions
            .get_mut(id)
            .ok_or_else(|| CreditError::not_found("position", id))?;

        if position.status != PositionStatus::Open {
            return Err(CreditError::Conflict {
                entity: "position",
                id: id.to_string(),
                current: position.status.to_string(),
                attempted: "valuation_refresh".to_string(),
            });
        }

        position.value_usd = value_usd;
        position.updated_at = chrono::Utc::now();
        Ok(position.clone())
    }

    /// Move a position toward closure.
    ///
    /// `open -> closing`, `open -> closed` and `closing -> closed` are
    /// the legal moves.
    pub fn close_position(
        &self,
        id: &str,
        to: PositionStatus,
    ) -> Result<VaultPosition, CreditError> {
        let allowed_from: &[PositionStatus] = match to {
            PositionStatus::Closing => &[PositionStatus::Open],
            PositionStatus::Closed => &[PositionStatus::Open, PositionStatus::Closing],
            PositionStatus::Open => {
                return Err(CreditError::validation(
                    "status",
                    "a position cannot be re-opened",
                ))
            }
        };

        let mut positions = self.positions.write().unwrap();
        let position = positions
            .get_mut(id)
            .ok_or_else(|| CreditError::not_found("position", id))?;

        if !allowed_from.contains(&position.status) {
            return Err(CreditError::Conflict {
                entity: "position",
                id: id.to_string(),
                current: position.status.to_string(),
                attempted: to.to_string(),
            });
        }

        let now = chrono::Utc::now();
        position.status = to;
        position.updated_at = now;
        if to == PositionStatus::Closed {
            position.closed_at = Some(now);
        }
        Ok(position.clone())
    }

    // === Hedges ===

    pub fn create_hedge(&self, hedge: Hedge) -> Hedge {
        let mut hedges = self.hedges.write().unwrap();
        hedges.insert(hedge.id.clone(), hedge.clone());
        hedge
    }

    pub fn get_hedge(&self, id: &str) -> Result<Hedge, CreditError> {
        self.hedges
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| CreditError::not_found("hedge", id))
    }

    /// Hedges for one owner, newest first
    pub fn hedges_by_owner(&self, owner_id: &str) -> Vec<Hedge> {
        let mut hedges: Vec<Hedge> = self
            .hedges
            .read()
            .unwrap()
            .values()
            .filter(|hedge| hedge.owner_id == owner_id)
            .cloned()
            .collect();
        hedges.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        hedges
    }

    /// Settle a pending hedge into a terminal status, exactly once
    pub fn update_hedge_outcome(
        &self,
        id: &str,
        to: HedgeStatus,
        apply: impl FnOnce(&mut Hedge),
    ) -> Result<Hedge, CreditError> {
        if !to.is_terminal() {
            return Err(CreditError::validation(
                "status",
                "a hedge outcome must be executed or failed",
            ));
        }

        let mut hedges = self.hedges.write().unwrap();
        let hedge = hedges
            .get_mut(id)
            .ok_or_else(|| CreditError::not_found("hedge", id))?;

        if hedge.status != HedgeStatus::Pending {
            return Err(CreditError::Conflict {
                entity: "hedge",
                id: id.to_string(),
                current: hedge.status.to_string(),
                attempted: to.to_string(),
            });
        }

        hedge.status = to;
        hedge.updated_at = chrono::Utc::now();
        apply(hedge);
        Ok(hedge.clone())
    }

    // === Liquidations ===

    /// Append a liquidation record. It must reference a loan, a
    /// position, or both.
    pub fn record_liquidation(&self, entry: Liquidation) -> Result<Liquidation, CreditError> {
        if entry.loan_id.is_none() && entry.position_id.is_none() {
            return Err(CreditError::validation(
                "loan_id",
                "a liquidation must reference a loan or a position",
            ));
        }

        let mut liquidations = self.liquidations.write().unwrap();
        liquidations.push(entry.clone());
        Ok(entry)
    }

    /// All liquidation records, newest first
    pub fn liquidations(&self) -> Vec<Liquidation> {
        let mut entries = self.liquidations.read().unwrap().clone();
        entries.sort_by(|a, b| b.executed_at.cmp(&a.executed_at));
        entries
    }

    // === Risk alerts ===

    /// Append a scan's qualifying alerts as one batch
    pub fn append_risk_alerts(&self, batch: Vec<RiskAlert>) -> usize {
        let mut alerts = self.alerts.write().unwrap();
        let count = batch.len();
        alerts.extend(batch);
        count
    }

    /// Most recent alerts, newest first
    pub fn recent_alerts(&self, limit: usize) -> Vec<RiskAlert> {
        let alerts = self.alerts.read().unwrap();
        alerts.iter().rev().take(limit).cloned().collect()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.read().unwrap().len()
    }

    // === Transactions ===

    /// Append a transaction entry, mirroring to the journal when one
    /// is attached. Journal failure is logged, never propagated.
    pub fn record_transaction(&self, entry: TransactionEntry) -> TransactionEntry {
        if let Some(ref journal) = self.journal {
            if let Err(error) = journal.lock().unwrap().append(&entry) {
                warn!(%error, entry_id = %entry.id, "transaction journal write failed");
            }
        }

        let mut transactions = self.transactions.write().unwrap();
        transactions.push(entry.clone());
        entry
    }

    pub fn list_transactions(&self) -> Vec<TransactionEntry> {
        self.transactions.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AlertEntity;
    use colend_core::AssetCode;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn amount(val: i64) -> Amount {
        Amount::new(Decimal::new(val, 0)).unwrap()
    }

    fn seed_loan(ledger: &CreditLedger) -> Loan {
        ledger.create_loan(Loan::new(
            "alice",
            AssetCode::Usdt,
            amount(5000),
            AssetCode::Btc,
            Amount::new(dec!(0.5)).unwrap(),
            dec!(4.025),
            dec!(60),
            90,
        ))
    }

    fn seed_position(ledger: &CreditLedger) -> VaultPosition {
        ledger.create_position(VaultPosition::new(
            "bob",
            AssetCode::Btc,
            Amount::new(dec!(0.1)).unwrap(),
            HashMap::new(),
        ))
    }

    #[test]
    fn test_create_and_get_loan() {
        let ledger = CreditLedger::new();
        let loan = seed_loan(&ledger);

        let fetched = ledger.get_loan(&loan.id).unwrap();
        assert_eq!(fetched.id, loan.id);
        assert_eq!(fetched.status, LoanStatus::PendingApproval);
    }

    #[test]
    fn test_get_unknown_loan() {
        let ledger = CreditLedger::new();
        let result = ledger.get_loan("LOAN-MISSING");
        assert!(matches!(result, Err(CreditError::NotFound { .. })));
    }

    #[test]
    fn test_transition_from_allowed_state() {
        let ledger = CreditLedger::new();
        let loan = seed_loan(&ledger);

        let approved = ledger
            .transition_loan(
                &loan.id,
                &[LoanStatus::PendingApproval],
                LoanStatus::Active,
                |loan| loan.approved_at = Some(chrono::Utc::now()),
            )
            .unwrap();

        assert_eq!(approved.status, LoanStatus::Active);
        assert!(approved.approved_at.is_some());
    }

    #[test]
    fn test_transition_conflict_leaves_record_untouched() {
        let ledger = CreditLedger::new();
        let loan = seed_loan(&ledger);

        let result = ledger.transition_loan(
            &loan.id,
            &[LoanStatus::Active],
            LoanStatus::Repaid,
            |loan| loan.approval_notes = Some("should not land".to_string()),
        );

        assert!(matches!(result, Err(CreditError::Conflict { .. })));
        let unchanged = ledger.get_loan(&loan.id).unwrap();
        assert_eq!(unchanged.status, LoanStatus::PendingApproval);
        assert!(unchanged.approval_notes.is_none());
    }

    #[test]
    fn test_repayment_caps_at_principal_and_settles() {
        let ledger = CreditLedger::new();
        let loan = seed_loan(&ledger);

        let partial = ledger.record_repayment(&loan.id, amount(2000)).unwrap();
        assert_eq!(partial.repaid_amount, amount(2000));
        assert_eq!(partial.status, LoanStatus::PendingApproval);
        assert!(partial.last_payment_at.is_some());

        let settled = ledger.record_repayment(&loan.id, amount(9000)).unwrap();
        assert_eq!(settled.repaid_amount, amount(5000));
        assert_eq!(settled.status, LoanStatus::Repaid);
    }

    #[test]
    fn test_repayment_rejected_after_liquidation() {
        let ledger = CreditLedger::new();
        let loan = seed_loan(&ledger);

        ledger
            .transition_loan(
                &loan.id,
                &[LoanStatus::PendingApproval, LoanStatus::Active],
                LoanStatus::Liquidated,
                |_| {},
            )
            .unwrap();

        let result = ledger.record_repayment(&loan.id, amount(100));
        assert!(matches!(result, Err(CreditError::Conflict { .. })));
    }

    #[test]
    fn test_position_valuation_refresh() {
        let ledger = CreditLedger::new();
        let position = seed_position(&ledger);

        let refreshed = ledger
            .update_position_valuation(&position.id, dec!(4500))
            .unwrap();
        assert_eq!(refreshed.value_usd, dec!(4500));
        assert!(refreshed.updated_at >= position.updated_at);
    }

    #[test]
    fn test_position_close_paths() {
        let ledger = CreditLedger::new();

        // Direct open -> closed
        let direct = seed_position(&ledger);
        let closed = ledger
            .close_position(&direct.id, PositionStatus::Closed)
            .unwrap();
        assert_eq!(closed.status, PositionStatus::Closed);
        assert!(closed.closed_at.is_some());

        // Staged open -> closing -> closed
        let staged = seed_position(&ledger);
        let closing = ledger
            .close_position(&staged.id, PositionStatus::Closing)
            .unwrap();
        assert_eq!(closing.status, PositionStatus::Closing);
        assert!(closing.closed_at.is_none());
        let done = ledger
            .close_position(&staged.id, PositionStatus::Closed)
            .unwrap();
        assert_eq!(done.status, PositionStatus::Closed);
    }

    #[test]
    fn test_position_cannot_reopen_or_reclose() {
        let ledger = CreditLedger::new();
        let position = seed_position(&ledger);
        ledger
            .close_position(&position.id, PositionStatus::Closed)
            .unwrap();

        assert!(matches!(
            ledger.close_position(&position.id, PositionStatus::Open),
            Err(CreditError::Validation { .. })
        ));
        assert!(matches!(
            ledger.close_position(&position.id, PositionStatus::Closed),
            Err(CreditError::Conflict { .. })
        ));
        assert!(matches!(
            ledger.update_position_valuation(&position.id, dec!(1)),
            Err(CreditError::Conflict { .. })
        ));
    }

    #[test]
    fn test_hedge_outcome_exactly_once() {
        let ledger = CreditLedger::new();
        let hedge = ledger.create_hedge(Hedge::new(
            "carol",
            AssetCode::Btc,
            Amount::new(dec!(0.2)).unwrap(),
            AssetCode::Usdt,
            amount(9500),
        ));

        let executed = ledger
            .update_hedge_outcome(&hedge.id, HedgeStatus::Executed, |hedge| {
                hedge.amount_out = Some(amount(9700));
                hedge.execution_reference = Some("EXEC-1".to_string());
            })
            .unwrap();
        assert_eq!(executed.status, HedgeStatus::Executed);
        assert_eq!(executed.amount_out, Some(amount(9700)));

        let again = ledger.update_hedge_outcome(&hedge.id, HedgeStatus::Failed, |_| {});
        assert!(matches!(again, Err(CreditError::Conflict { .. })));
    }

    #[test]
    fn test_hedge_outcome_must_be_terminal() {
        let ledger = CreditLedger::new();
        let hedge = ledger.create_hedge(Hedge::new(
            "carol",
            AssetCode::Btc,
            Amount::new(dec!(0.2)).unwrap(),
            AssetCode::Usdt,
            amount(9500),
        ));

        let result = ledger.update_hedge_outcome(&hedge.id, HedgeStatus::Pending, |_| {});
        assert!(matches!(result, Err(CreditError::Validation { .. })));
    }

    #[test]
    fn test_liquidation_requires_reference() {
        let ledger = CreditLedger::new();

        let orphan = Liquidation::new(None, None, "alice", dec!(10), "USDT", "manual");
        let result = ledger.record_liquidation(orphan);
        assert!(matches!(result, Err(CreditError::Validation { .. })));

        let valid = Liquidation::new(
            Some("LOAN-1".to_string()),
            None,
            "alice",
            dec!(10),
            "USDT",
            "manual",
        );
        ledger.record_liquidation(valid).unwrap();
        assert_eq!(ledger.liquidations().len(), 1);
    }

    #[test]
    fn test_recent_alerts_newest_first() {
        let ledger = CreditLedger::new();

        let batch: Vec<RiskAlert> = (0..5)
            .map(|i| {
                RiskAlert::new(
                    AlertEntity::Loan(format!("LOAN-{i}")),
                    Some(dec!(88)),
                    Some(dec!(2.2)),
                    dec!(85),
                    dec!(10),
                )
            })
            .collect();
        let last_id = batch.last().unwrap().entity.entity_id().to_string();

        assert_eq!(ledger.append_risk_alerts(batch), 5);
        let recent = ledger.recent_alerts(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].entity.entity_id(), last_id);
    }

    #[test]
    fn test_transactions_mirror_to_journal() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = CreditLedger::with_journal(dir.path()).unwrap();

        ledger.record_transaction(TransactionEntry::repayment(
            "LOAN-1", dec!(100), "USDT", false,
        ));
        ledger.record_transaction(TransactionEntry::liquidation(
            Some("LOAN-1".to_string()),
            None,
            dec!(10),
            "USDT",
        ));

        assert_eq!(ledger.list_transactions().len(), 2);

        let reader = crate::journal::JournalReader::from_directory(dir.path()).unwrap();
        assert_eq!(reader.count().unwrap(), 2);
    }
}
