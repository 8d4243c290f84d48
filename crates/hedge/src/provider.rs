//! Execution provider boundary

use async_trait::async_trait;
use colend_core::{Amount, AssetCode};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Errors from an execution provider
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Provider-side failure before an outcome could be reported
    #[error("Execution provider failed: {reason}")]
    Provider { reason: String },

    /// External provider connection failed
    #[error("Execution provider connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A swap submitted to the execution provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapRequest {
    pub asset_in: AssetCode,
    pub amount_in: Amount,
    pub asset_out: AssetCode,
    pub min_amount_out: Amount,
}

/// Outcome reported by an execution provider.
///
/// `success: false` is a provider-REPORTED failure (e.g. slippage);
/// transport-level problems surface as `ExecutionError` instead. Both
/// end the hedge in `failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub amount_out: Option<Amount>,
    pub execution_reference: Option<String>,
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// A filled swap
    pub fn filled(amount_out: Amount, execution_reference: impl Into<String>) -> Self {
        Self {
            success: true,
            amount_out: Some(amount_out),
            execution_reference: Some(execution_reference.into()),
            error: None,
        }
    }

    /// A provider-reported failure
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            amount_out: None,
            execution_reference: None,
            error: Some(error.into()),
        }
    }
}

/// Execution provider trait - interface to the venue that settles
/// hedges
#[async_trait]
pub trait ExecutionProvider: Send + Sync {
    async fn execute_swap(&self, request: &SwapRequest) -> Result<ExecutionOutcome, ExecutionError>;
}

/// Scripted behavior for the mock provider
#[derive(Debug, Clone)]
enum MockBehavior {
    /// Fill with the given output amount and reference
    Fill {
        amount_out: Amount,
        reference: String,
    },
    /// Report a failure outcome
    Reject { error: String },
    /// Fail at the transport level
    Error { reason: String },
    /// Never answer (exercises the executor's timeout)
    Hang,
}

/// Mock execution provider for testing
///
/// Behavior is settable between calls, so one provider instance can
/// drive a whole scenario.
pub struct MockExecutionProvider {
    behavior: RwLock<MockBehavior>,
}

impl MockExecutionProvider {
    pub fn filling(amount_out: Amount, reference: impl Into<String>) -> Self {
        Self {
            behavior: RwLock::new(MockBehavior::Fill {
                amount_out,
                reference: reference.into(),
            }),
        }
    }

    pub fn rejecting(error: impl Into<String>) -> Self {
        Self {
            behavior: RwLock::new(MockBehavior::Reject {
                error: error.into(),
            }),
        }
    }

    pub fn erroring(reason: impl Into<String>) -> Self {
        Self {
            behavior: RwLock::new(MockBehavior::Error {
                reason: reason.into(),
            }),
        }
    }

    pub fn hanging() -> Self {
        Self {
            behavior: RwLock::new(MockBehavior::Hang),
        }
    }

    /// Rescript the provider for the next call
    pub fn fill_next(&self, amount_out: Amount, reference: impl Into<String>) {
        *self.behavior.write().unwrap() = MockBehavior::Fill {
            amount_out,
            reference: reference.into(),
        };
    }

    /// Make the next call report a failure
    pub fn reject_next(&self, error: impl Into<String>) {
        *self.behavior.write().unwrap() = MockBehavior::Reject {
            error: error.into(),
        };
    }
}

#[async_trait]
impl ExecutionProvider for MockExecutionProvider {
    async fn execute_swap(
        &self,
        _request: &SwapRequest,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let behavior = self.behavior.read().unwrap().clone();

        match behavior {
            MockBehavior::Fill {
                amount_out,
                reference,
            } => Ok(ExecutionOutcome::filled(amount_out, reference)),
            MockBehavior::Reject { error } => Ok(ExecutionOutcome::rejected(error)),
            MockBehavior::Error { reason } => Err(ExecutionError::Provider { reason }),
            MockBehavior::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                unreachable!("the call is always timed out first")
            }
        }
    }
}
