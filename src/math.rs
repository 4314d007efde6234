//! Math utilities.

use std::ops::{Add, Mul, Neg, Sub};

/// Floating-point precision to use for series arithmetic.
#[allow(non_camel_case_types)]
pub type fsr = f64;

/// A truncated Taylor series around some expansion point,
/// `f(x0 + h) = c_0 + c_1 h + ... + c_N h^N`.
///
/// Composing elementary functions on series gives all derivatives of the
/// composite function at the expansion point up to order `N` without any
/// symbolic differentiation.
#[derive(Clone, Debug, PartialEq)]
pub struct TaylorSeries {
    coefficients: Vec<fsr>,
}

impl TaylorSeries {
    /// Creates the series of a constant function, truncated at the given order.
    pub fn constant(value: fsr, order: usize) -> Self {
        let mut coefficients = vec![0.0; order + 1];
        coefficients[0] = value;
        Self { coefficients }
    }

    /// Creates the series of the identity function around `x0`,
    /// truncated at the given order.
    pub fn variable(x0: fsr, order: usize) -> Self {
        let mut series = Self::constant(x0, order);
        if order > 0 {
            series.coefficients[1] = 1.0;
        }
        series
    }

    /// Truncation order of the series.
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Value of the expanded function at the expansion point.
    pub fn value(&self) -> fsr {
        self.coefficients[0]
    }

    /// Returns a slice with the Taylor coefficients.
    pub fn coefficients(&self) -> &[fsr] {
        &self.coefficients
    }

    /// Computes the `n`th derivative of the expanded function at the
    /// expansion point, or zero if `n` exceeds the truncation order.
    pub fn derivative(&self, n: usize) -> fsr {
        match self.coefficients.get(n) {
            Some(&coefficient) => coefficient * factorial(n),
            None => 0.0,
        }
    }

    /// Evaluates the polynomial `sum_i p_i u^i` with `u` given by this series.
    pub fn polynomial(&self, poly_coefficients: &[fsr]) -> Self {
        let mut result = Self::constant(0.0, self.order());
        for &coefficient in poly_coefficients.iter().rev() {
            result = &result * self;
            result.coefficients[0] += coefficient;
        }
        result
    }

    /// Computes the series of `exp(f)`.
    pub fn exp(&self) -> Self {
        let a = &self.coefficients;
        let mut e = vec![0.0; a.len()];
        e[0] = a[0].exp();
        // Follows from e' = a' e
        for k in 1..a.len() {
            let mut sum = 0.0;
            for j in 1..=k {
                sum += (j as fsr) * a[j] * e[k - j];
            }
            e[k] = sum / (k as fsr);
        }
        Self { coefficients: e }
    }

    /// Computes the series of `1/f`.
    ///
    /// The value at the expansion point must be non-zero.
    pub fn recip(&self) -> Self {
        let a = &self.coefficients;
        let mut r = vec![0.0; a.len()];
        r[0] = 1.0 / a[0];
        for k in 1..a.len() {
            let mut sum = 0.0;
            for j in 1..=k {
                sum += a[j] * r[k - j];
            }
            r[k] = -sum * r[0];
        }
        Self { coefficients: r }
    }

    /// Computes the series of `1/(1 + exp(f))`, arranged so that
    /// large values of `f` do not overflow.
    pub fn inverse_one_plus_exp(&self) -> Self {
        if self.value() > 0.0 {
            let g = (-self).exp();
            let denominator = &g + 1.0;
            &g * &denominator.recip()
        } else {
            let g = self.exp();
            (&g + 1.0).recip()
        }
    }

    /// Computes the series of `tanh(f)`.
    pub fn tanh(&self) -> Self {
        if self.value() < 0.0 {
            -&(-self).tanh()
        } else {
            let g = (self * -2.0).exp();
            let numerator = -&(&g - 1.0);
            let denominator = &g + 1.0;
            &numerator * &denominator.recip()
        }
    }
}

impl<'a> Add<&'a TaylorSeries> for &'a TaylorSeries {
    type Output = TaylorSeries;
    fn add(self, other: Self) -> Self::Output {
        debug_assert_eq!(self.order(), other.order());
        TaylorSeries {
            coefficients: self
                .coefficients
                .iter()
                .zip(other.coefficients.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl Add<fsr> for &TaylorSeries {
    type Output = TaylorSeries;
    fn add(self, value: fsr) -> Self::Output {
        let mut result = self.clone();
        result.coefficients[0] += value;
        result
    }
}

impl<'a> Sub<&'a TaylorSeries> for &'a TaylorSeries {
    type Output = TaylorSeries;
    fn sub(self, other: Self) -> Self::Output {
        self + &(-other)
    }
}

impl Sub<fsr> for &TaylorSeries {
    type Output = TaylorSeries;
    fn sub(self, value: fsr) -> Self::Output {
        self + (-value)
    }
}

impl<'a> Mul<&'a TaylorSeries> for &'a TaylorSeries {
    type Output = TaylorSeries;
    fn mul(self, other: Self) -> Self::Output {
        debug_assert_eq!(self.order(), other.order());
        let n = self.coefficients.len();
        let mut coefficients = vec![0.0; n];
        for (i, &a) in self.coefficients.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in other.coefficients[..n - i].iter().enumerate() {
                coefficients[i + j] += a * b;
            }
        }
        TaylorSeries { coefficients }
    }
}

impl Mul<fsr> for &TaylorSeries {
    type Output = TaylorSeries;
    fn mul(self, factor: fsr) -> Self::Output {
        TaylorSeries {
            coefficients: self.coefficients.iter().map(|c| c * factor).collect(),
        }
    }
}

impl Neg for &TaylorSeries {
    type Output = TaylorSeries;
    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

/// Computes `n!` as a float.
pub fn factorial(n: usize) -> fsr {
    (1..=n).fold(1.0, |product, k| product * (k as fsr))
}
