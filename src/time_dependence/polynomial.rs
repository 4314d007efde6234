//! Polynomial time dependence.

use super::{ftd, TimeDependence};

/// Time dependence `sum_i c_i t^i`.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialTimeDependence {
    coefficients: Vec<ftd>,
}

impl PolynomialTimeDependence {
    /// Creates a polynomial from its coefficients, lowest power first.
    ///
    /// An empty coefficient list gives the zero function.
    pub fn new(coefficients: Vec<ftd>) -> Self {
        Self { coefficients }
    }

    /// Creates a time dependence with a constant value.
    pub fn constant(value: ftd) -> Self {
        Self::new(vec![value])
    }

    pub fn coefficients(&self) -> &[ftd] {
        &self.coefficients
    }
}

impl TimeDependence for PolynomialTimeDependence {
    fn value(&self, time: ftd) -> ftd {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |result, &coefficient| result * time + coefficient)
    }

    fn integral(&self, time: ftd) -> ftd {
        self.coefficients
            .iter()
            .enumerate()
            .rev()
            .fold(0.0, |result, (power, &coefficient)| {
                result * time + coefficient / ((power + 1) as ftd)
            })
            * time
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn polynomial_value_is_correct() {
        let polynomial = PolynomialTimeDependence::new(vec![1.0, 2.0, 3.0]);
        assert_relative_eq!(polynomial.value(0.1), 1.23, max_relative = 1e-12);
        assert_relative_eq!(polynomial.value(0.2), 1.52, max_relative = 1e-12);
        assert_relative_eq!(polynomial.value(0.0), 1.0);
    }

    #[test]
    fn polynomial_integral_is_correct() {
        let polynomial = PolynomialTimeDependence::new(vec![1.0, 2.0, 3.0]);
        // t + t^2 + t^3
        assert_relative_eq!(polynomial.integral(2.0), 14.0, max_relative = 1e-12);
        assert_eq!(polynomial.integral(0.0), 0.0);
    }

    #[test]
    fn empty_polynomial_is_zero() {
        let polynomial = PolynomialTimeDependence::new(Vec::new());
        assert_eq!(polynomial.value(3.0), 0.0);
        assert_eq!(polynomial.integral(3.0), 0.0);
    }
}
