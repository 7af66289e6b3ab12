use crate::domain::order::Balance;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Decimal places of the asset's smallest unit; fees are truncated here.
pub const FEE_SCALE: u32 = 4;

/// Basis-point rate applied at or above the tier threshold.
pub const LOW_RATE_BPS: u32 = 30;

/// Basis-point rate applied below the tier threshold.
pub const HIGH_RATE_BPS: u32 = 50;

const BPS_DENOMINATOR: Decimal = dec!(10000);

/// Tiered basis-point fee schedule, fixed at engine construction.
///
/// Base amounts at or above the threshold get the low rate (the comparison is
/// inclusive on the cheaper side); everything below it gets the high rate.
/// The fee is `base * rate / 10000`, truncated at [`FEE_SCALE`] decimal
/// places. No rounding, and no error conditions: a zero base yields a zero
/// fee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    threshold: Decimal,
    low_bps: u32,
    high_bps: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::new(dec!(10), LOW_RATE_BPS, HIGH_RATE_BPS)
    }
}

impl FeeSchedule {
    pub fn new(threshold: Decimal, low_bps: u32, high_bps: u32) -> Self {
        Self {
            threshold,
            low_bps,
            high_bps,
        }
    }

    /// A schedule that charges nothing, turning settlement into a plain
    /// pass-through escrow.
    pub fn free() -> Self {
        Self::new(Decimal::ZERO, 0, 0)
    }

    pub fn fee_for(&self, base: Balance) -> Balance {
        let rate = if base.0 >= self.threshold {
            self.low_bps
        } else {
            self.high_bps
        };

        let fee = base.0 * Decimal::from(rate) / BPS_DENOMINATOR;
        Balance::new(fee.trunc_with_scale(FEE_SCALE).normalize())
    }
}
