//! Step-aligned arithmetic
//!
//! Binary floating point cannot represent most decimal steps exactly
//! (`0.1 + 0.2 != 0.3`), so every operation here corrects its result by
//! rounding through the decimal text representation instead of
//! multiplying, truncating and dividing.

use crate::settings::{StepDivisibility, MAX_DECIMALS};

/// Decimal places kept when correcting a `value / step` quotient
const QUOTIENT_PRECISION: u32 = 9;

/// Largest precision derived from a number's own decimal expansion
const MAX_PRECISION: u32 = 15;

/// Direction of a step or an alignment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The opposite direction
    pub fn reversed(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// `+1.0` for up, `-1.0` for down
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }
}

/// Number of digits after the decimal point in the shortest representation
/// of `value`
pub fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let text = format!("{}", value.abs());
    let places = text
        .split_once('.')
        .map(|(_, fraction)| fraction.len() as u32)
        .unwrap_or(0);
    places.min(MAX_PRECISION)
}

/// Round `value` to `decimals` places, half away from zero
///
/// The shift is done by rewriting the exponent of the decimal text
/// (`1.005` -> `1.005e2` -> `100.5`), which is exact where `1.005 * 100.0`
/// is not (`100.49999999999999`).
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let decimals = decimals.min(MAX_DECIMALS);
    let shifted = match format!("{value}e{decimals}").parse::<f64>() {
        Ok(shifted) if shifted.is_finite() => shifted,
        _ => return value,
    };
    let rounded = shifted.round();
    let result = match format!("{rounded}e-{decimals}").parse::<f64>() {
        Ok(result) if result.is_finite() => result,
        _ => return value,
    };
    // Normalize negative zero so it never formats as "-0"
    if result == 0.0 {
        0.0
    } else {
        result
    }
}

/// Fixed-point text with exactly `decimals` places
pub fn to_fixed(value: f64, decimals: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    format!(
        "{:.*}",
        decimals as usize,
        round_to_decimals(value, decimals)
    )
}

/// `value / step` with representation error removed
fn corrected_quotient(value: f64, step: f64) -> f64 {
    round_to_decimals(value / step, QUOTIENT_PRECISION)
}

/// Align `value` to a multiple of `step`, rounding toward `direction`
///
/// Returns `value` unchanged when `step` is not a positive finite number.
/// Values already on a multiple are returned unchanged in both directions.
pub fn align_to_step(value: f64, step: f64, direction: Direction) -> f64 {
    if !(step > 0.0) || !step.is_finite() || !value.is_finite() {
        return value;
    }
    let quotient = corrected_quotient(value, step);
    let snapped = match direction {
        Direction::Up => quotient.ceil(),
        Direction::Down => quotient.floor(),
    };
    let precision = decimal_places(step).max(decimal_places(value));
    round_to_decimals(snapped * step, precision)
}

/// Snap `value` onto a multiple of `step` according to `policy`, then
/// normalize to `decimals` places
///
/// [`StepDivisibility::None`] returns `value` unchanged.
pub fn force_step_divisibility(
    value: f64,
    step: f64,
    decimals: u32,
    policy: StepDivisibility,
) -> f64 {
    if !value.is_finite() || !(step > 0.0) || !step.is_finite() {
        return value;
    }
    let quotient = corrected_quotient(value, step);
    let snapped = match policy {
        StepDivisibility::None => return value,
        StepDivisibility::Round => quotient.round(),
        StepDivisibility::Floor => quotient.floor(),
        StepDivisibility::Ceil => quotient.ceil(),
    };
    round_to_decimals(snapped * step, decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(1.0), 0);
        assert_eq!(decimal_places(0.1), 1);
        assert_eq!(decimal_places(-2.25), 2);
        assert_eq!(decimal_places(0.0001), 4);
        assert_eq!(decimal_places(f64::NAN), 0);
    }

    #[test]
    fn test_round_to_decimals_is_float_safe() {
        assert_eq!(round_to_decimals(1.005, 2), 1.01);
        assert_eq!(round_to_decimals(0.1 + 0.2, 2), 0.3);
        assert_eq!(round_to_decimals(2.5, 0), 3.0);
        assert_eq!(round_to_decimals(-2.5, 0), -3.0);
        assert_eq!(round_to_decimals(1234.5678, 1), 1234.6);
    }

    #[test]
    fn test_round_to_decimals_normalizes_negative_zero() {
        let rounded = round_to_decimals(-0.0001, 2);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
        assert_eq!(to_fixed(-0.0001, 2), "0.00");
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(5.0, 0), "5");
        assert_eq!(to_fixed(5.0, 2), "5.00");
        assert_eq!(to_fixed(1.005, 2), "1.01");
        assert_eq!(to_fixed(0.1 + 0.2, 1), "0.3");
    }

    #[test]
    fn test_align_to_step() {
        assert_eq!(align_to_step(7.0, 5.0, Direction::Up), 10.0);
        assert_eq!(align_to_step(23.0, 5.0, Direction::Down), 20.0);
        assert_eq!(align_to_step(-7.0, 5.0, Direction::Up), -5.0);
        assert_eq!(align_to_step(-7.0, 5.0, Direction::Down), -10.0);
        assert_eq!(align_to_step(0.25, 0.1, Direction::Up), 0.3);
        assert_eq!(align_to_step(0.25, 0.1, Direction::Down), 0.2);
    }

    #[test]
    fn test_align_to_step_idempotent_on_multiples() {
        for &step in &[0.1, 0.25, 1.0, 3.0, 5.0, 0.01] {
            for k in -20..=20 {
                let value = round_to_decimals(f64::from(k) * step, decimal_places(step));
                assert_eq!(align_to_step(value, step, Direction::Up), value);
                assert_eq!(align_to_step(value, step, Direction::Down), value);
            }
        }
    }

    #[test]
    fn test_align_to_step_ignores_invalid_step() {
        assert_eq!(align_to_step(7.0, 0.0, Direction::Up), 7.0);
        assert_eq!(align_to_step(7.0, -1.0, Direction::Down), 7.0);
    }

    #[test]
    fn test_force_step_divisibility_policies() {
        assert_eq!(force_step_divisibility(47.0, 3.0, 0, StepDivisibility::Round), 48.0);
        assert_eq!(force_step_divisibility(47.0, 3.0, 0, StepDivisibility::Floor), 45.0);
        assert_eq!(force_step_divisibility(46.0, 3.0, 0, StepDivisibility::Ceil), 48.0);
        assert_eq!(force_step_divisibility(47.3, 3.0, 0, StepDivisibility::None), 47.3);
    }

    #[test]
    fn test_force_step_divisibility_decimal_steps() {
        assert_eq!(force_step_divisibility(0.3, 0.1, 1, StepDivisibility::Floor), 0.3);
        assert_eq!(force_step_divisibility(1.26, 0.05, 2, StepDivisibility::Round), 1.25);
        assert_eq!(force_step_divisibility(1.27, 0.05, 2, StepDivisibility::Ceil), 1.3);
    }

    #[test]
    fn test_force_step_divisibility_idempotent_on_boundary() {
        for policy in [
            StepDivisibility::Round,
            StepDivisibility::Floor,
            StepDivisibility::Ceil,
        ] {
            assert_eq!(force_step_divisibility(48.0, 3.0, 0, policy), 48.0);
            assert_eq!(force_step_divisibility(0.7, 0.1, 1, policy), 0.7);
        }
    }

    #[test]
    fn test_direction_helpers() {
        assert_eq!(Direction::Up.reversed(), Direction::Down);
        assert_eq!(Direction::Down.sign(), -1.0);
    }
}
