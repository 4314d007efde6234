//! Approximate comparison of floating point numbers.
//!
//! Two values are considered almost equal if they are within an absolute
//! distance of each other (which handles magnitudes close to zero) or, failing
//! that, if they are within a maximum number of representable doubles (units
//! in the last place, ULPs) of each other. Values with different signs are
//! never almost equal unless they pass the absolute test, and comparisons
//! involving NaN are always false.
//!
//! The ordering predicates treat almost equal values as equal, so `lt` and
//! `gt` are false for them while `le` and `ge` are true.

use ieee754::Ieee754;

/// Floating-point precision to use for comparisons.
#[allow(non_camel_case_types)]
pub type fcm = f64;

/// Tolerances for approximate floating point comparison.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatComparator {
    /// Absolute difference below which two values are always equal.
    pub max_diff: fcm,
    /// Largest distance in ULPs for which two values are equal.
    pub max_ulps: u64,
    /// Magnitude below which a value is considered zero.
    pub zero_tolerance: fcm,
}

impl FloatComparator {
    pub const DEFAULT_MAX_DIFF: fcm = 1e-20;
    pub const DEFAULT_MAX_ULPS: u64 = 1000;
    pub const DEFAULT_ZERO_TOLERANCE: fcm = 1e-15;

    /// Creates a comparator with the given tolerances.
    pub const fn new(max_diff: fcm, max_ulps: u64, zero_tolerance: fcm) -> Self {
        Self {
            max_diff,
            max_ulps,
            zero_tolerance,
        }
    }

    /// Whether `a` and `b` are equal within the comparator tolerances.
    pub fn almost_eq(&self, a: fcm, b: fcm) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        if (a - b).abs() <= self.max_diff {
            return true;
        }
        if a.is_sign_negative() != b.is_sign_negative() {
            return false;
        }
        ulp_distance(a, b) <= u128::from(self.max_ulps)
    }

    /// Whether `a` is zero within the comparator tolerance.
    pub fn almost_eq_zero(&self, a: fcm) -> bool {
        a.abs() <= self.zero_tolerance
    }

    pub fn eq(&self, a: fcm, b: fcm) -> bool {
        self.almost_eq(a, b)
    }

    pub fn le(&self, a: fcm, b: fcm) -> bool {
        self.almost_eq(a, b) || a < b
    }

    pub fn lt(&self, a: fcm, b: fcm) -> bool {
        !self.almost_eq(a, b) && a < b
    }

    pub fn ge(&self, a: fcm, b: fcm) -> bool {
        self.almost_eq(a, b) || a > b
    }

    pub fn gt(&self, a: fcm, b: fcm) -> bool {
        !self.almost_eq(a, b) && a > b
    }

    pub fn eq_zero(&self, a: fcm) -> bool {
        self.almost_eq_zero(a)
    }

    pub fn le_zero(&self, a: fcm) -> bool {
        self.almost_eq_zero(a) || a < 0.0
    }

    pub fn lt_zero(&self, a: fcm) -> bool {
        !self.almost_eq_zero(a) && a < 0.0
    }

    pub fn ge_zero(&self, a: fcm) -> bool {
        self.almost_eq_zero(a) || a > 0.0
    }

    pub fn gt_zero(&self, a: fcm) -> bool {
        !self.almost_eq_zero(a) && a > 0.0
    }
}

impl Default for FloatComparator {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_DIFF,
            Self::DEFAULT_MAX_ULPS,
            Self::DEFAULT_ZERO_TOLERANCE,
        )
    }
}

const DEFAULT: FloatComparator = FloatComparator::new(
    FloatComparator::DEFAULT_MAX_DIFF,
    FloatComparator::DEFAULT_MAX_ULPS,
    FloatComparator::DEFAULT_ZERO_TOLERANCE,
);

/// Maps the bit pattern of a double onto an integer such that the integer
/// ordering matches the floating point ordering.
///
/// Positive values keep their bit pattern, negative values (whose sign-magnitude
/// pattern counts the wrong way) are mirrored below zero.
fn lexicographic_bits(value: fcm) -> i128 {
    let bits = i128::from(value.bits());
    const SIGN_BIT: i128 = 1 << 63;
    if bits & SIGN_BIT != 0 {
        SIGN_BIT - bits
    } else {
        bits
    }
}

/// Number of representable doubles between `a` and `b`.
pub fn ulp_distance(a: fcm, b: fcm) -> u128 {
    (lexicographic_bits(a) - lexicographic_bits(b)).unsigned_abs()
}

/// Whether `a` and `b` are equal within the default tolerances
/// (absolute 1e-20, 1000 ULPs).
pub fn almost_eq(a: fcm, b: fcm) -> bool {
    DEFAULT.almost_eq(a, b)
}

/// Whether `a` is zero within the default tolerance (1e-15).
pub fn almost_eq_zero(a: fcm) -> bool {
    DEFAULT.almost_eq_zero(a)
}

/// Whether `a` and `b` are equal within an absolute difference of `max_diff`
/// or a difference relative to the larger magnitude of `max_rel_diff`.
pub fn almost_eq_diff(a: fcm, b: fcm, max_diff: fcm, max_rel_diff: fcm) -> bool {
    let diff = (a - b).abs();
    if diff <= max_diff {
        return true;
    }
    let largest = fcm::max(a.abs(), b.abs());
    diff <= largest * max_rel_diff
}

pub fn eq(a: fcm, b: fcm) -> bool {
    DEFAULT.eq(a, b)
}

pub fn le(a: fcm, b: fcm) -> bool {
    DEFAULT.le(a, b)
}

pub fn lt(a: fcm, b: fcm) -> bool {
    DEFAULT.lt(a, b)
}

pub fn ge(a: fcm, b: fcm) -> bool {
    DEFAULT.ge(a, b)
}

pub fn gt(a: fcm, b: fcm) -> bool {
    DEFAULT.gt(a, b)
}

pub fn eq_zero(a: fcm) -> bool {
    DEFAULT.eq_zero(a)
}

pub fn le_zero(a: fcm) -> bool {
    DEFAULT.le_zero(a)
}

pub fn lt_zero(a: fcm) -> bool {
    DEFAULT.lt_zero(a)
}

pub fn ge_zero(a: fcm) -> bool {
    DEFAULT.ge_zero(a)
}

pub fn gt_zero(a: fcm) -> bool {
    DEFAULT.gt_zero(a)
}
