//! Colend loan lifecycle manager
//!
//! Orchestrates the loan state machine over the credit ledger:
//! `pending_approval -> active -> {repaid | liquidated}` and
//! `pending_approval -> rejected`, with direct liquidation allowed
//! from any non-terminal state.

mod manager;

pub use manager::{LoanConfig, LoanManager, LoanRequest, LoanView};
