//! Loan term pricing
//!
//! APR is a base rate per collateral class scaled by term and leverage
//! buckets. Longer terms and higher LTV both price upward, never downward.

use colend_core::AssetCode;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::PricingError;

/// Margin applied to the liquidation threshold when deriving the
/// liquidation price (10%).
pub const LIQUIDATION_MARGIN: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// Priced terms for a prospective loan.
///
/// `total_interest` and `total_repayment` are multipliers on the
/// principal, not absolute figures; `daily_interest` is the per-day
/// fraction of the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanTerms {
    /// Annualized percentage rate
    pub apr: Decimal,
    /// Interest accrued over the full term, as a fraction of principal
    pub total_interest: Decimal,
    /// Principal multiplier due at maturity (1 + total_interest)
    pub total_repayment: Decimal,
    /// Interest accrued per day, as a fraction of principal
    pub daily_interest: Decimal,
    /// Collateral price multiplier at which liquidation triggers
    pub liquidation_price_multiplier: Decimal,
}

/// Loan pricer
///
/// Deterministic and side-effect free. Rates are configured once at
/// construction; unknown collateral classes are rejected.
#[derive(Debug, Clone)]
pub struct LoanPricer {
    /// Base APR (percent) per supported collateral class
    base_rates: HashMap<AssetCode, Decimal>,
}

impl LoanPricer {
    /// Create a pricer with the default base-rate table
    pub fn new() -> Self {
        let mut base_rates = HashMap::new();
        base_rates.insert(AssetCode::Btc, Decimal::new(35, 1)); // 3.5
        base_rates.insert(AssetCode::Eth, Decimal::new(45, 1)); // 4.5
        base_rates.insert(AssetCode::Sol, Decimal::new(60, 1)); // 6.0
        base_rates.insert(AssetCode::Usdt, Decimal::new(20, 1)); // 2.0
        base_rates.insert(AssetCode::Usdc, Decimal::new(20, 1)); // 2.0
        Self { base_rates }
    }

    /// Create a pricer with a custom base-rate table
    pub fn with_base_rates(base_rates: HashMap<AssetCode, Decimal>) -> Self {
        Self { base_rates }
    }

    /// Base APR for a collateral class, if supported
    pub fn base_rate(&self, asset: &AssetCode) -> Option<Decimal> {
        self.base_rates.get(asset).copied()
    }

    /// Price a loan from collateral class, term and LTV.
    ///
    /// `apr = base_rate * term_multiplier * ltv_multiplier`.
    pub fn compute_terms(
        &self,
        collateral_asset: &AssetCode,
        term_days: u32,
        ltv_ratio: Decimal,
    ) -> Result<LoanTerms, PricingError> {
        let base = self
            .base_rate(collateral_asset)
            .ok_or_else(|| PricingError::UnsupportedCollateral(collateral_asset.clone()))?;

        let apr = base * term_multiplier(term_days) * ltv_multiplier(ltv_ratio);

        let hundred = Decimal::from(100);
        let year_days = Decimal::from(365);

        let total_interest = apr / hundred * Decimal::from(term_days) / year_days;
        let total_repayment = Decimal::ONE + total_interest;
        let daily_interest = apr / hundred / year_days;
        let liquidation_price_multiplier = Decimal::ONE / (Decimal::ONE - LIQUIDATION_MARGIN);

        Ok(LoanTerms {
            apr,
            total_interest,
            total_repayment,
            daily_interest,
            liquidation_price_multiplier,
        })
    }
}

impl Default for LoanPricer {
    fn default() -> Self {
        Self::new()
    }
}

/// Term bucket multiplier: half-year money is priced flat, up to a year
/// carries a 10% premium, beyond that 20%.
fn term_multiplier(term_days: u32) -> Decimal {
    if term_days <= 180 {
        Decimal::ONE
    } else if term_days <= 365 {
        Decimal::new(11, 1) // 1.1
    } else {
        Decimal::new(12, 1) // 1.2
    }
}

/// LTV bucket multiplier: conservative leverage is flat, mid-band carries
/// 15%, above 70 carries 30%.
fn ltv_multiplier(ltv_ratio: Decimal) -> Decimal {
    if ltv_ratio <= Decimal::from(50) {
        Decimal::ONE
    } else if ltv_ratio <= Decimal::from(70) {
        Decimal::new(115, 2) // 1.15
    } else {
        Decimal::new(13, 1) // 1.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_btc_mid_band_pricing() {
        let pricer = LoanPricer::new();
        let terms = pricer
            .compute_terms(&AssetCode::Btc, 90, dec!(60))
            .unwrap();

        // 3.5 * 1.0 * 1.15
        assert_eq!(terms.apr, dec!(4.025));
        assert_eq!(terms.total_repayment, Decimal::ONE + terms.total_interest);
    }

    #[test]
    fn test_unknown_collateral_rejected() {
        let pricer = LoanPricer::new();
        let result = pricer.compute_terms(&AssetCode::Other("PEPE".to_string()), 90, dec!(50));
        assert!(matches!(result, Err(PricingError::UnsupportedCollateral(_))));
    }

    #[test]
    fn test_term_bucket_boundaries() {
        assert_eq!(term_multiplier(180), Decimal::ONE);
        assert_eq!(term_multiplier(181), dec!(1.1));
        assert_eq!(term_multiplier(365), dec!(1.1));
        assert_eq!(term_multiplier(366), dec!(1.2));
    }

    #[test]
    fn test_ltv_bucket_boundaries() {
        assert_eq!(ltv_multiplier(dec!(50)), Decimal::ONE);
        assert_eq!(ltv_multiplier(dec!(50.01)), dec!(1.15));
        assert_eq!(ltv_multiplier(dec!(70)), dec!(1.15));
        assert_eq!(ltv_multiplier(dec!(70.01)), dec!(1.3));
    }

    #[test]
    fn test_apr_monotone_in_term_and_ltv() {
        let pricer = LoanPricer::new();
        let terms = [30u32, 180, 181, 365, 366, 1825];
        let ltvs = [dec!(30), dec!(50), dec!(60), dec!(70), dec!(80), dec!(85)];

        for asset in [AssetCode::Btc, AssetCode::Eth, AssetCode::Sol, AssetCode::Usdt] {
            for ltv in ltvs {
                let mut prev = Decimal::ZERO;
                for term in terms {
                    let apr = pricer.compute_terms(&asset, term, ltv).unwrap().apr;
                    assert!(apr >= prev, "apr decreased in term for {asset} ltv {ltv}");
                    prev = apr;
                }
            }
            for term in terms {
                let mut prev = Decimal::ZERO;
                for ltv in ltvs {
                    let apr = pricer.compute_terms(&asset, term, ltv).unwrap().apr;
                    assert!(apr >= prev, "apr decreased in ltv for {asset} term {term}");
                    prev = apr;
                }
            }
        }
    }

    #[test]
    fn test_daily_interest_consistent_with_total() {
        let pricer = LoanPricer::new();
        let terms = pricer
            .compute_terms(&AssetCode::Eth, 200, dec!(65))
            .unwrap();
        assert_eq!(
            terms.total_interest,
            terms.apr / dec!(100) * dec!(200) / dec!(365)
        );
        assert_eq!(terms.daily_interest, terms.apr / dec!(100) / dec!(365));
    }

    #[test]
    fn test_liquidation_price_multiplier() {
        let pricer = LoanPricer::new();
        let terms = pricer
            .compute_terms(&AssetCode::Btc, 30, dec!(40))
            .unwrap();
        // 1 / (1 - 0.10)
        assert_eq!(
            terms.liquidation_price_multiplier,
            Decimal::ONE / dec!(0.9)
        );
    }

    #[test]
    fn test_custom_base_rates() {
        let mut rates = HashMap::new();
        rates.insert(AssetCode::Btc, dec!(5));
        let pricer = LoanPricer::with_base_rates(rates);

        let terms = pricer.compute_terms(&AssetCode::Btc, 30, dec!(40)).unwrap();
        assert_eq!(terms.apr, dec!(5));
        assert!(pricer.compute_terms(&AssetCode::Eth, 30, dec!(40)).is_err());
    }
}
