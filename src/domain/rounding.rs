//! Step rounding for exchange precision constraints.
//!
//! Exchanges quote a minimum price increment (tick) and minimum size
//! increment (lot) per market; every outbound price and amount must be a
//! multiple of the relevant step.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round `value` to the nearest multiple of `step`, ties away from zero.
///
/// A zero or negative step is treated as "no constraint" and returns the
/// value unchanged rather than dividing by zero on malformed exchange data.
#[must_use]
pub fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step <= Decimal::ZERO {
        return value;
    }
    let steps = (value / step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (steps * step).normalize()
}
