//! Colend vault position manager
//!
//! Tracks collateral deposits held on behalf of owners. Valuations are
//! refreshed opportunistically from the injected quote provider;
//! quote unavailability is never an error, since positions must exist
//! even without a live price.

mod manager;

pub use manager::{PositionView, VaultConfig, VaultManager};
