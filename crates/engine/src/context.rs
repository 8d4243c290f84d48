//! Engine context - explicit construction of every component

use colend_core::{Amount, AssetCode};
use colend_hedge::{ExecutionProvider, HedgeConfig, HedgeExecutor, HedgeRequest};
use colend_ledger::{
    CreditError, CreditLedger, Hedge, JournalError, Liquidation, RiskAlert, TransactionEntry,
};
use colend_loans::{LoanConfig, LoanManager, LoanRequest, LoanView};
use colend_oracle::QuoteProvider;
use colend_pricing::LoanPricer;
use colend_risk::{RiskConfig, RiskScanner};
use colend_vaults::{PositionView, VaultConfig, VaultManager};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for [`CreditEngine`]
///
/// Providers are optional: an engine without a quote provider opens
/// unvalued positions, one without an execution provider leaves
/// hedges pending.
#[derive(Default)]
pub struct EngineBuilder {
    quote_provider: Option<Arc<dyn QuoteProvider>>,
    execution_provider: Option<Arc<dyn ExecutionProvider>>,
    journal_dir: Option<PathBuf>,
    pricer: Option<LoanPricer>,
    loan_config: Option<LoanConfig>,
    vault_config: Option<VaultConfig>,
    hedge_config: Option<HedgeConfig>,
    risk_config: Option<RiskConfig>,
}

impl EngineBuilder {
    pub fn quote_provider(mut self, provider: Arc<dyn QuoteProvider>) -> Self {
        self.quote_provider = Some(provider);
        self
    }

    pub fn execution_provider(mut self, provider: Arc<dyn ExecutionProvider>) -> Self {
        self.execution_provider = Some(provider);
        self
    }

    /// Mirror the transaction log to a JSONL journal directory
    pub fn journal_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.journal_dir = Some(dir.into());
        self
    }

    pub fn pricer(mut self, pricer: LoanPricer) -> Self {
        self.pricer = Some(pricer);
        self
    }

    pub fn loan_config(mut self, config: LoanConfig) -> Self {
        self.loan_config = Some(config);
        self
    }

    pub fn vault_config(mut self, config: VaultConfig) -> Self {
        self.vault_config = Some(config);
        self
    }

    pub fn hedge_config(mut self, config: HedgeConfig) -> Self {
        self.hedge_config = Some(config);
        self
    }

    pub fn risk_config(mut self, config: RiskConfig) -> Self {
        self.risk_config = Some(config);
        self
    }

    /// Construct the engine. Only journal creation can fail.
    pub fn build(self) -> Result<CreditEngine, JournalError> {
        let journaled = self.journal_dir.is_some();
        let ledger = Arc::new(match self.journal_dir {
            Some(dir) => CreditLedger::with_journal(dir)?,
            None => CreditLedger::new(),
        });

        let loans = LoanManager::new(
            ledger.clone(),
            self.pricer.unwrap_or_default(),
            self.loan_config.unwrap_or_default(),
        );
        let vaults = VaultManager::new(
            ledger.clone(),
            self.quote_provider,
            self.vault_config.unwrap_or_default(),
        );
        let hedges = HedgeExecutor::new(
            ledger.clone(),
            self.execution_provider,
            self.hedge_config.unwrap_or_default(),
        );
        let scanner = RiskScanner::new(ledger.clone(), self.risk_config.unwrap_or_default());

        tracing::info!(journaled, "credit engine constructed");
        Ok(CreditEngine {
            ledger,
            loans,
            vaults,
            hedges,
            scanner,
        })
    }
}

/// The credit lifecycle engine boundary
pub struct CreditEngine {
    ledger: Arc<CreditLedger>,
    loans: LoanManager,
    vaults: VaultManager,
    hedges: HedgeExecutor,
    scanner: RiskScanner,
}

impl CreditEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// In-memory engine with no providers and default configs
    pub fn new() -> Self {
        let ledger = Arc::new(CreditLedger::new());
        Self {
            loans: LoanManager::with_ledger(ledger.clone()),
            vaults: VaultManager::with_ledger(ledger.clone()),
            hedges: HedgeExecutor::with_ledger(ledger.clone()),
            scanner: RiskScanner::with_ledger(ledger.clone()),
            ledger,
        }
    }

    /// The shared ledger, for read-side consumers
    pub fn ledger(&self) -> &Arc<CreditLedger> {
        &self.ledger
    }

    // === Loans ===

    pub fn request_loan(
        &self,
        owner_id: &str,
        request: LoanRequest,
    ) -> Result<LoanView, CreditError> {
        self.loans.request_loan(owner_id, request)
    }

    pub fn approve_loan(&self, id: &str, notes: Option<&str>) -> Result<LoanView, CreditError> {
        self.loans.approve_loan(id, notes)
    }

    pub fn reject_loan(&self, id: &str, reason: &str) -> Result<LoanView, CreditError> {
        self.loans.reject_loan(id, reason)
    }

    pub fn repay_loan(&self, id: &str, amount: Amount) -> Result<LoanView, CreditError> {
        self.loans.repay_loan(id, amount)
    }

    pub fn liquidate_loan(
        &self,
        id: &str,
        reason: &str,
        recovered_amount: Decimal,
        recovered_asset: &str,
    ) -> Result<LoanView, CreditError> {
        self.loans
            .liquidate_loan(id, reason, recovered_amount, recovered_asset)
    }

    pub fn get_loan(&self, id: &str) -> Result<LoanView, CreditError> {
        self.loans.get_loan(id)
    }

    pub fn loans_by_owner(&self, owner_id: &str) -> Vec<LoanView> {
        self.loans.loans_by_owner(owner_id)
    }

    // === Vault positions ===

    pub async fn open_position(
        &self,
        owner_id: &str,
        asset: AssetCode,
        amount: Amount,
        metadata: HashMap<String, Value>,
    ) -> Result<PositionView, CreditError> {
        self.vaults
            .open_position(owner_id, asset, amount, metadata)
            .await
    }

    pub async fn refresh_valuation(&self, id: &str) -> Result<PositionView, CreditError> {
        self.vaults.refresh_valuation(id).await
    }

    pub fn liquidate_position(
        &self,
        id: &str,
        reason: &str,
        recovered_amount: Decimal,
        recovered_asset: &str,
    ) -> Result<PositionView, CreditError> {
        self.vaults
            .liquidate_position(id, reason, recovered_amount, recovered_asset)
    }

    pub fn get_position(&self, id: &str) -> Result<PositionView, CreditError> {
        self.vaults.get_position(id)
    }

    pub fn positions_by_owner(&self, owner_id: &str) -> Vec<PositionView> {
        self.vaults.positions_by_owner(owner_id)
    }

    // === Hedges ===

    pub async fn execute_hedge(
        &self,
        owner_id: &str,
        request: HedgeRequest,
    ) -> Result<Hedge, CreditError> {
        self.hedges.execute_hedge(owner_id, request).await
    }

    pub fn get_hedge(&self, id: &str) -> Result<Hedge, CreditError> {
        self.hedges.get_hedge(id)
    }

    pub fn hedges_by_owner(&self, owner_id: &str) -> Vec<Hedge> {
        self.hedges.hedges_by_owner(owner_id)
    }

    // === Liquidations ===

    /// Manual/direct liquidation entry point, independent of the loan
    /// and position liquidation flows
    pub fn record_liquidation(&self, entry: Liquidation) -> Result<Liquidation, CreditError> {
        self.ledger.record_liquidation(entry)
    }

    pub fn list_liquidations(&self) -> Vec<Liquidation> {
        self.ledger.liquidations()
    }

    // === Risk ===

    /// Run one scan pass; returns the number of alerts created
    pub fn scan(&self) -> usize {
        self.scanner.scan()
    }

    /// Most recent alerts, newest first
    pub fn get_alerts(&self, limit: usize) -> Vec<RiskAlert> {
        self.scanner.recent_alerts(limit)
    }

    // === Audit ===

    pub fn list_transactions(&self) -> Vec<TransactionEntry> {
        self.ledger.list_transactions()
    }
}

impl Default for CreditEngine {
    fn default() -> Self {
        Self::new()
    }
}
