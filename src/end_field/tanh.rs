//! Hyperbolic tangent fringe field.

use super::{fef, EndFieldModel};
use crate::math::TaylorSeries;

/// Fringe field `f(x) = [tanh((x + x0)/lambda) - tanh((x - x0)/lambda)]/2`.
#[derive(Clone, Debug, PartialEq)]
pub struct Tanh {
    x0: fef,
    lambda: fef,
}

impl Tanh {
    pub fn new(x0: fef, lambda: fef) -> Self {
        assert!(lambda > 0.0, "Tanh lambda must be positive");
        Self { x0, lambda }
    }

    pub fn x0(&self) -> fef {
        self.x0
    }

    pub fn lambda(&self) -> fef {
        self.lambda
    }

    fn tanh_term(&self, offset: fef, x: fef, n: usize) -> fef {
        let argument = &(&TaylorSeries::variable(x, n) + offset) * self.lambda.recip();
        argument.tanh().derivative(n)
    }
}

impl EndFieldModel for Tanh {
    fn function(&self, x: fef, n: usize) -> fef {
        0.5 * (self.tanh_term(self.x0, x, n) - self.tanh_term(-self.x0, x, n))
    }

    fn rescale(&mut self, factor: fef) {
        self.x0 *= factor;
        self.lambda *= factor;
    }

    fn centre_length(&self) -> fef {
        2.0 * self.x0
    }

    fn end_length(&self) -> fef {
        self.lambda
    }

    fn clone_box(&self) -> Box<dyn EndFieldModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn tanh_is_flat_topped() {
        let tanh = Tanh::new(3.0, 0.2);
        assert_abs_diff_eq!(tanh.function(0.0, 0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tanh.function(3.0, 0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(tanh.function(-10.0, 0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(tanh.function(0.0, 1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn tanh_derivative_is_analytic() {
        let tanh = Tanh::new(1.0, 0.5);
        let sech2 = |u: f64| 1.0 - u.tanh().powi(2);
        for &x in &[-1.2, 0.4, 0.95] {
            let expected = 0.5 * (sech2((x + 1.0) / 0.5) - sech2((x - 1.0) / 0.5)) / 0.5;
            assert_relative_eq!(tanh.function(x, 1), expected, epsilon = 1e-12, max_relative = 1e-10);
        }
    }
}
