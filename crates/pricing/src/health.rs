//! Health factor evaluation
//!
//! Health is the normalized distance from the liquidation threshold:
//! 100 = no leverage risk, 0 = at the threshold, negative = already past
//! it. The negative range is deliberately not clamped so that alerting
//! can rank severity of breached positions.

use rust_decimal::Decimal;

/// LTV level at which a position becomes eligible for forced liquidation
pub const LIQUIDATION_THRESHOLD: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

/// Compute the health factor for a known LTV ratio.
///
/// `((threshold - ltv) / threshold) * 100`. Returns `None` when the LTV
/// ratio is unknown.
pub fn health_factor(ltv_ratio: Option<Decimal>, liquidation_threshold: Decimal) -> Option<Decimal> {
    let ltv = ltv_ratio?;
    Some((liquidation_threshold - ltv) / liquidation_threshold * Decimal::from(100))
}
