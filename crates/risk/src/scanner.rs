//! Risk scanner

use colend_ledger::{AlertEntity, CreditLedger, LoanStatus, RiskAlert};
use colend_pricing::health_factor;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Thresholds applied by the scanner
#[derive(Debug, Clone)]
pub struct RiskConfig {
    /// LTV above this flags a loan regardless of health
    pub max_ltv: Decimal,
    /// Health factor below this flags a loan or position
    pub min_health_factor: Decimal,
    /// Threshold used to derive health factors
    pub liquidation_threshold: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_ltv: Decimal::from(85),
            min_health_factor: Decimal::from(10),
            liquidation_threshold: colend_pricing::LIQUIDATION_THRESHOLD,
        }
    }
}

/// Risk scanner
///
/// Safe to re-run at any time: detection is idempotent over unchanged
/// state, and a scan that interleaves with lifecycle mutations may miss
/// a breach at worst until the next pass. Each scan appends fresh alert
/// rows; alerts are deliberately not deduplicated against prior ones.
pub struct RiskScanner {
    ledger: Arc<CreditLedger>,
    config: RiskConfig,
}

impl RiskScanner {
    /// Create a scanner over a shared ledger
    pub fn new(ledger: Arc<CreditLedger>, config: RiskConfig) -> Self {
        Self { ledger, config }
    }

    /// Create a scanner with default thresholds
    pub fn with_ledger(ledger: Arc<CreditLedger>) -> Self {
        Self::new(ledger, RiskConfig::default())
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Scan every open exposure and append one batch of alerts.
    ///
    /// Returns the number of alerts created. Loans breach on
    /// `ltv > max_ltv` or `health < min_health_factor`; positions
    /// breach on derived health alone, and positions with no derivable
    /// ratio are skipped.
    pub fn scan(&self) -> usize {
        let mut batch = Vec::new();

        let open_loans = self
            .ledger
            .loans_by_status(LoanStatus::PendingApproval)
            .into_iter()
            .chain(self.ledger.loans_by_status(LoanStatus::Active));

        for loan in open_loans {
            let health = health_factor(Some(loan.ltv_ratio), self.config.liquidation_threshold);
            let ltv_breach = loan.ltv_ratio > self.config.max_ltv;
            let health_breach = health
                .map(|h| h < self.config.min_health_factor)
                .unwrap_or(false);

            if ltv_breach || health_breach {
                batch.push(RiskAlert::new(
                    AlertEntity::Loan(loan.id),
                    Some(loan.ltv_ratio),
                    health,
                    self.config.max_ltv,
                    self.config.min_health_factor,
                ));
            }
        }

        for position in self.ledger.open_positions() {
            let ltv = position.metadata_ltv();
            let health = health_factor(ltv, self.config.liquidation_threshold);

            if let Some(health_value) = health {
                if health_value < self.config.min_health_factor {
                    batch.push(RiskAlert::new(
                        AlertEntity::Position(position.id),
                        ltv,
                        health,
                        self.config.max_ltv,
                        self.config.min_health_factor,
                    ));
                }
            }
        }

        let created = self.ledger.append_risk_alerts(batch);
        debug!(alerts_created = created, "risk scan complete");
        created
    }

    /// Most recent alerts, newest first
    pub fn recent_alerts(&self, limit: usize) -> Vec<RiskAlert> {
        self.ledger.recent_alerts(limit)
    }
}
