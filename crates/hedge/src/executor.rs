//! Hedge executor

use colend_core::{Amount, AssetCode};
use colend_ledger::{CreditError, CreditLedger, Hedge, HedgeStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::provider::{ExecutionProvider, SwapRequest};

/// Configuration for the hedge executor
#[derive(Debug, Clone)]
pub struct HedgeConfig {
    /// Bound on each execution provider call
    pub execution_timeout: Duration,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            execution_timeout: Duration::from_secs(10),
        }
    }
}

/// Input for a hedge submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HedgeRequest {
    pub asset_in: AssetCode,
    pub amount_in: Amount,
    pub asset_out: AssetCode,
    pub min_amount_out: Amount,
}

/// Hedge executor
///
/// Persists the hedge before contacting the provider, so a crashed or
/// timed-out execution still leaves an auditable record. Outcomes are
/// written exactly once and never retried here; retry policy belongs
/// to the caller.
pub struct HedgeExecutor {
    ledger: Arc<CreditLedger>,
    provider: Option<Arc<dyn ExecutionProvider>>,
    config: HedgeConfig,
}

impl HedgeExecutor {
    /// Create an executor over a shared ledger with an optional
    /// execution provider
    pub fn new(
        ledger: Arc<CreditLedger>,
        provider: Option<Arc<dyn ExecutionProvider>>,
        config: HedgeConfig,
    ) -> Self {
        Self {
            ledger,
            provider,
            config,
        }
    }

    /// Create an executor with no provider and default config
    pub fn with_ledger(ledger: Arc<CreditLedger>) -> Self {
        Self::new(ledger, None, HedgeConfig::default())
    }

    /// Validate and submit a hedge.
    ///
    /// With no provider configured the hedge is persisted `pending`
    /// (execution may be supplied asynchronously later, so this is
    /// deliberately not auto-failed).
    pub async fn execute_hedge(
        &self,
        owner_id: &str,
        request: HedgeRequest,
    ) -> Result<Hedge, CreditError> {
        if !request.amount_in.is_positive() {
            return Err(CreditError::validation(
                "amount_in",
                "input amount must be greater than zero",
            ));
        }

        let hedge = self.ledger.create_hedge(Hedge::new(
            owner_id,
            request.asset_in.clone(),
            request.amount_in,
            request.asset_out.clone(),
            request.min_amount_out,
        ));
        info!(hedge_id = %hedge.id, owner_id, asset_in = %hedge.asset_in, asset_out = %hedge.asset_out, "hedge submitted");

        let provider = match &self.provider {
            Some(provider) => provider,
            None => {
                info!(hedge_id = %hedge.id, "no execution provider configured, hedge left pending");
                return Ok(hedge);
            }
        };

        let swap = SwapRequest {
            asset_in: request.asset_in,
            amount_in: request.amount_in,
            asset_out: request.asset_out,
            min_amount_out: request.min_amount_out,
        };

        match timeout(self.config.execution_timeout, provider.execute_swap(&swap)).await {
            Ok(Ok(outcome)) if outcome.success => {
                let executed =
                    self.ledger
                        .update_hedge_outcome(&hedge.id, HedgeStatus::Executed, |hedge| {
                            hedge.amount_out = outcome.amount_out;
                            hedge.execution_reference = outcome.execution_reference.clone();
                        })?;
                info!(hedge_id = %executed.id, reference = ?executed.execution_reference, "hedge executed");
                Ok(executed)
            }
            Ok(Ok(outcome)) => {
                let message = outcome
                    .error
                    .unwrap_or_else(|| "provider reported failure".to_string());
                self.fail_hedge(&hedge.id, message)
            }
            Ok(Err(error)) => self.fail_hedge(&hedge.id, error.to_string()),
            Err(_) => self.fail_hedge(
                &hedge.id,
                format!(
                    "execution timed out after {}ms",
                    self.config.execution_timeout.as_millis()
                ),
            ),
        }
    }

    /// Fetch one hedge
    pub fn get_hedge(&self, id: &str) -> Result<Hedge, CreditError> {
        self.ledger.get_hedge(id)
    }

    /// All hedges for an owner, newest first
    pub fn hedges_by_owner(&self, owner_id: &str) -> Vec<Hedge> {
        self.ledger.hedges_by_owner(owner_id)
    }

    /// Settle the hedge as failed, capturing the error message into
    /// its details
    fn fail_hedge(&self, id: &str, message: String) -> Result<Hedge, CreditError> {
        warn!(hedge_id = %id, error = %message, "hedge execution failed");
        self.ledger
            .update_hedge_outcome(id, HedgeStatus::Failed, |hedge| {
                hedge.details.insert("error".to_string(), json!(message));
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockExecutionProvider;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn request() -> HedgeRequest {
        HedgeRequest {
            asset_in: AssetCode::Btc,
            amount_in: Amount::new(dec!(0.2)).unwrap(),
            asset_out: AssetCode::Usdt,
            min_amount_out: Amount::new(Decimal::from(9500)).unwrap(),
        }
    }

    fn executor_with(provider: Arc<dyn ExecutionProvider>) -> HedgeExecutor {
        HedgeExecutor::new(
            Arc::new(CreditLedger::new()),
            Some(provider),
            HedgeConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_rejects_zero_amount_in() {
        let executor = HedgeExecutor::with_ledger(Arc::new(CreditLedger::new()));

        let mut bad = request();
        bad.amount_in = Amount::ZERO;
        let err = executor.execute_hedge("carol", bad).await.unwrap_err();
        assert_eq!(err.field(), Some("amount_in"));
    }

    #[tokio::test]
    async fn test_no_provider_leaves_hedge_pending() {
        let ledger = Arc::new(CreditLedger::new());
        let executor = HedgeExecutor::with_ledger(ledger.clone());

        let hedge = executor.execute_hedge("carol", request()).await.unwrap();
        assert_eq!(hedge.status, HedgeStatus::Pending);
        assert!(hedge.amount_out.is_none());

        // Still pending in the ledger, not auto-failed
        let stored = ledger.get_hedge(&hedge.id).unwrap();
        assert_eq!(stored.status, HedgeStatus::Pending);
    }

    #[tokio::test]
    async fn test_provider_fill_executes_hedge() {
        let provider = Arc::new(MockExecutionProvider::filling(
            Amount::new(dec!(9700)).unwrap(),
            "EXEC-42",
        ));
        let executor = executor_with(provider);

        let hedge = executor.execute_hedge("carol", request()).await.unwrap();
        assert_eq!(hedge.status, HedgeStatus::Executed);
        assert_eq!(hedge.amount_out, Some(Amount::new(dec!(9700)).unwrap()));
        assert_eq!(hedge.execution_reference.as_deref(), Some("EXEC-42"));
    }

    #[tokio::test]
    async fn test_provider_reported_failure_fails_hedge() {
        let provider = Arc::new(MockExecutionProvider::rejecting("slippage exceeded"));
        let executor = executor_with(provider);

        let hedge = executor.execute_hedge("carol", request()).await.unwrap();
        assert_eq!(hedge.status, HedgeStatus::Failed);
        assert!(hedge.amount_out.is_none());
        assert_eq!(hedge.details["error"], serde_json::json!("slippage exceeded"));
    }

    #[tokio::test]
    async fn test_provider_error_fails_hedge() {
        let provider = Arc::new(MockExecutionProvider::erroring("venue unreachable"));
        let executor = executor_with(provider);

        let hedge = executor.execute_hedge("carol", request()).await.unwrap();
        assert_eq!(hedge.status, HedgeStatus::Failed);
        let error = hedge.details["error"].as_str().unwrap();
        assert!(error.contains("venue unreachable"));
    }

    #[tokio::test]
    async fn test_timeout_is_a_failure_outcome() {
        let provider = Arc::new(MockExecutionProvider::hanging());
        let executor = HedgeExecutor::new(
            Arc::new(CreditLedger::new()),
            Some(provider),
            HedgeConfig {
                execution_timeout: Duration::from_millis(20),
            },
        );

        let hedge = executor.execute_hedge("carol", request()).await.unwrap();
        assert_eq!(hedge.status, HedgeStatus::Failed);
        let error = hedge.details["error"].as_str().unwrap();
        assert!(error.contains("timed out"));
    }

    #[tokio::test]
    async fn test_hedges_by_owner() {
        let provider = Arc::new(MockExecutionProvider::rejecting("always fails"));
        let ledger = Arc::new(CreditLedger::new());
        let executor = HedgeExecutor::new(ledger, Some(provider), HedgeConfig::default());

        executor.execute_hedge("carol", request()).await.unwrap();
        executor.execute_hedge("carol", request()).await.unwrap();

        assert_eq!(executor.hedges_by_owner("carol").len(), 2);
        assert!(executor.hedges_by_owner("nobody").is_empty());
    }
}
