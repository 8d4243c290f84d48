//! Vault position manager

use colend_core::{Amount, AssetCode};
use colend_ledger::{
    CreditError, CreditLedger, Liquidation, PositionStatus, TransactionEntry, VaultPosition,
};
use colend_oracle::QuoteProvider;
use colend_pricing::health_factor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Configuration for the vault manager
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Bound on each quote provider call
    pub quote_timeout: Duration,
    /// Threshold used when deriving position health from metadata LTV
    pub liquidation_threshold: Decimal,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            quote_timeout: Duration::from_secs(3),
            liquidation_threshold: colend_pricing::LIQUIDATION_THRESHOLD,
        }
    }
}

/// A position snapshot returned to callers.
///
/// Health is derived on read from the `ltv_ratio` metadata entry when
/// present; positions without one have no health factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionView {
    #[serde(flatten)]
    pub position: VaultPosition,
    pub health_factor: Option<Decimal>,
}

/// Vault position manager
pub struct VaultManager {
    ledger: Arc<CreditLedger>,
    quotes: Option<Arc<dyn QuoteProvider>>,
    config: VaultConfig,
}

impl VaultManager {
    /// Create a manager over a shared ledger with an optional quote
    /// provider
    pub fn new(
        ledger: Arc<CreditLedger>,
        quotes: Option<Arc<dyn QuoteProvider>>,
        config: VaultConfig,
    ) -> Self {
        Self {
            ledger,
            quotes,
            config,
        }
    }

    /// Create a manager with no quote provider and default config
    pub fn with_ledger(ledger: Arc<CreditLedger>) -> Self {
        Self::new(ledger, None, VaultConfig::default())
    }

    fn view(&self, position: VaultPosition) -> PositionView {
        let health_factor = health_factor(
            position.metadata_ltv(),
            self.config.liquidation_threshold,
        );
        PositionView {
            position,
            health_factor,
        }
    }

    /// Open a position and best-effort-refresh its valuation.
    ///
    /// Quote failure or timeout leaves `value_usd` at zero and the
    /// position open; it is logged, never surfaced.
    pub async fn open_position(
        &self,
        owner_id: &str,
        asset: AssetCode,
        amount: Amount,
        metadata: HashMap<String, Value>,
    ) -> Result<PositionView, CreditError> {
        if !amount.is_positive() {
            return Err(CreditError::validation(
                "amount",
                "deposit amount must be greater than zero",
            ));
        }

        let position =
            self.ledger
                .create_position(VaultPosition::new(owner_id, asset, amount, metadata));
        info!(position_id = %position.id, owner_id, asset = %position.asset, "position opened");

        let position = match self.fetch_value(&position).await {
            Some(value_usd) => self
                .ledger
                .update_position_valuation(&position.id, value_usd)
                .unwrap_or(position),
            None => position,
        };

        Ok(self.view(position))
    }

    /// Re-quote an open position on demand. Same best-effort semantics
    /// as the refresh at open: an unavailable quote leaves the prior
    /// value intact.
    pub async fn refresh_valuation(&self, id: &str) -> Result<PositionView, CreditError> {
        let position = self.ledger.get_position(id)?;

        let position = match self.fetch_value(&position).await {
            Some(value_usd) => self.ledger.update_position_valuation(id, value_usd)?,
            None => position,
        };

        Ok(self.view(position))
    }

    /// Liquidate a position: direct `open -> closed`, plus the audit
    /// records. A non-positive recovery is logged, not rejected.
    pub fn liquidate_position(
        &self,
        id: &str,
        reason: &str,
        recovered_amount: Decimal,
        recovered_asset: &str,
    ) -> Result<PositionView, CreditError> {
        let position = self.ledger.close_position(id, PositionStatus::Closed)?;

        if recovered_amount <= Decimal::ZERO {
            warn!(position_id = %position.id, %recovered_amount, "liquidation recovered a non-positive amount");
        }

        self.ledger.record_liquidation(
            Liquidation::new(
                None,
                Some(position.id.clone()),
                position.owner_id.clone(),
                recovered_amount,
                recovered_asset,
                reason,
            )
            .with_detail("asset", json!(position.asset.code()))
            .with_detail("amount", json!(position.amount.to_string())),
        )?;

        self.ledger
            .record_transaction(TransactionEntry::liquidation(
                None,
                Some(position.id.clone()),
                recovered_amount,
                recovered_asset,
            ));

        info!(position_id = %position.id, reason, "position liquidated");
        Ok(self.view(position))
    }

    /// Fetch one position with health derived on read
    pub fn get_position(&self, id: &str) -> Result<PositionView, CreditError> {
        Ok(self.view(self.ledger.get_position(id)?))
    }

    /// All positions for an owner, newest first
    pub fn positions_by_owner(&self, owner_id: &str) -> Vec<PositionView> {
        self.ledger
            .positions_by_owner(owner_id)
            .into_iter()
            .map(|position| self.view(position))
            .collect()
    }

    /// USD value of the position via the quote provider, bounded by
    /// the configured timeout. None when no provider is configured or
    /// the quote is unavailable.
    async fn fetch_value(&self, position: &VaultPosition) -> Option<Decimal> {
        let provider = self.quotes.as_ref()?;

        match timeout(self.config.quote_timeout, provider.quote_usd(&position.asset)).await {
            Ok(Ok(quote)) => Some(quote.value_of(position.amount.value())),
            Ok(Err(error)) => {
                warn!(position_id = %position.id, %error, "quote unavailable, keeping prior valuation");
                None
            }
            Err(_) => {
                warn!(
                    position_id = %position.id,
                    timeout_ms = self.config.quote_timeout.as_millis(),
                    "quote timed out, keeping prior valuation"
                );
                None
            }
        }
    }
}
