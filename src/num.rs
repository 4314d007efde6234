//! Utilities related to numbers.

pub mod cmp;

use ieee754;
use num;
use std::fmt;

/// Floating point marker trait for easier control over trait bounds.
pub trait BFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + ieee754::Ieee754 + fmt::Debug
{
}

impl BFloat for f32 {}
impl BFloat for f64 {}

/// Returns +1 for non-negative and -1 for negative values.
///
/// Unlike `f64::signum`, a negative zero counts as non-negative.
pub fn sign<F: BFloat>(value: F) -> F {
    if value < F::zero() {
        -F::one()
    } else {
        F::one()
    }
}
