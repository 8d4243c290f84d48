//! Colend engine - wires the credit lifecycle components together
//!
//! [`CreditEngine`] is the boundary the hosting application talks to:
//! explicitly constructed, dependency-injected instances of the
//! ledger, managers and scanner, with no ambient global state. The
//! web/identity layer above it supplies authenticated owner ids; the
//! engine trusts them as opaque strings.

mod context;

pub use context::{CreditEngine, EngineBuilder};

// Re-export the boundary vocabulary so callers need only this crate.
pub use colend_core::{Amount, AssetCode};
pub use colend_hedge::{
    ExecutionOutcome, ExecutionProvider, HedgeConfig, HedgeRequest, MockExecutionProvider,
};
pub use colend_ledger::{
    CreditError, Hedge, HedgeStatus, Liquidation, Loan, LoanStatus, PositionStatus, RiskAlert,
    TransactionEntry, VaultPosition,
};
pub use colend_loans::{LoanConfig, LoanRequest, LoanView};
pub use colend_oracle::{MockQuoteProvider, Quote, QuoteProvider};
pub use colend_risk::RiskConfig;
pub use colend_vaults::{PositionView, VaultConfig};
