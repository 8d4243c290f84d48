//! Colend hedge executor
//!
//! Submits asset swaps to an injected execution provider and persists
//! their outcome. Provider failures are captured into the hedge's
//! terminal `failed` state, never thrown past this boundary; with no
//! provider configured hedges stay `pending` for later execution.

mod executor;
mod provider;

pub use executor::{HedgeConfig, HedgeExecutor, HedgeRequest};
pub use provider::{ExecutionError, ExecutionOutcome, ExecutionProvider, MockExecutionProvider, SwapRequest};
