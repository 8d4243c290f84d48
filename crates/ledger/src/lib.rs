//! Colend credit ledger
//!
//! The single owner of persisted credit state. All other components
//! read and mutate records exclusively through [`CreditLedger`]'s atomic
//! operation surface; a transition whose current state is not in the
//! caller-supplied allowed set is rejected without any partial write.

mod audit;
mod error;
mod hedge;
mod journal;
mod loan;
mod position;
mod store;

pub use audit::{AlertEntity, Liquidation, RiskAlert, TransactionEntry, TransactionKind};
pub use error::CreditError;
pub use hedge::{Hedge, HedgeStatus};
pub use journal::{JournalError, JournalReader, TransactionJournal};
pub use loan::{Loan, LoanStatus};
pub use position::{PositionStatus, VaultPosition};
pub use store::CreditLedger;

/// Generate a prefixed opaque record id (e.g. `LOAN-3F2A9C1D`).
pub(crate) fn record_id(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        uuid::Uuid::new_v4().to_string()[..8].to_uppercase()
    )
}
