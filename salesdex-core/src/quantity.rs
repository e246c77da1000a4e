//! Exact accumulation of sale quantities.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Quantities are summed in millionths of a unit.
pub const QUANTITY_SCALE: f64 = 1_000_000.0;

/// A running total of quantities held as fixed-point integer units.
///
/// Each quantity is rounded to [`QUANTITY_SCALE`] once, then added as an
/// integer, so a total is the same whatever order its lines arrive in and
/// equal totals compare equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuantitySum(i64);

impl QuantitySum {
    pub const ZERO: Self = Self(0);

    pub fn of(quantity: f64) -> Self {
        Self((quantity * QUANTITY_SCALE).round() as i64)
    }

    /// Raw fixed-point units.
    pub const fn units(self) -> i64 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / QUANTITY_SCALE
    }
}

impl From<f64> for QuantitySum {
    fn from(quantity: f64) -> Self {
        Self::of(quantity)
    }
}

impl From<QuantitySum> for f64 {
    fn from(sum: QuantitySum) -> Self {
        sum.to_f64()
    }
}

impl Add for QuantitySum {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for QuantitySum {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl AddAssign<f64> for QuantitySum {
    fn add_assign(&mut self, quantity: f64) {
        *self += Self::of(quantity);
    }
}

impl Sum for QuantitySum {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for QuantitySum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decimal_parts_sum_exactly() {
        let parts: QuantitySum = [0.1, 0.2, 0.3].into_iter().map(QuantitySum::of).sum();
        assert_eq!(parts, QuantitySum::of(0.6));
        assert_eq!(parts.to_f64(), 0.6);

        let reversed: QuantitySum = [0.3, 0.2, 0.1].into_iter().map(QuantitySum::of).sum();
        assert_eq!(reversed, parts);
    }

    #[test]
    fn test_add_assign_quantity() {
        let mut total = QuantitySum::ZERO;
        total += 2.5;
        total += 0.25;
        assert_eq!(total.units(), 2_750_000);
        assert_eq!(f64::from(total), 2.75);
    }

    #[test]
    fn test_saturates_instead_of_overflowing() {
        let huge = QuantitySum::of(9.0e12);
        assert_eq!((huge + huge).units(), i64::MAX);
    }

    proptest! {
        #[test]
        fn prop_sum_ignores_order(tenths in prop::collection::vec(1u32..1000, 0..30)) {
            let forward: Vec<f64> = tenths.iter().map(|t| f64::from(*t) / 10.0).collect();
            let mut backward = forward.clone();
            backward.reverse();
            let a: QuantitySum = forward.into_iter().map(QuantitySum::of).sum();
            let b: QuantitySum = backward.into_iter().map(QuantitySum::of).sum();
            prop_assert_eq!(a, b);
        }
    }
}
