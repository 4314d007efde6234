//! Enge fringe field.

use super::{fef, EndFieldModel};
use crate::math::TaylorSeries;

/// Symmetric Enge fringe field.
///
/// Built from the one-sided Enge function
/// `E(x) = 1/(1 + exp(h(x/lambda)))` with `h(u) = sum_i a_i u^i`, which is
/// one for large negative `x` and zero for large positive `x`. The symmetric
/// shape function is `f(x) = E(x - x0) + E(-x - x0) - 1`, which is one in the
/// centre, falls off around `|x| = x0` and is one half at `|x| = x0` when
/// `a_0` is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Enge {
    coefficients: Vec<fef>,
    x0: fef,
    lambda: fef,
}

impl Enge {
    /// Creates a new Enge model.
    ///
    /// # Parameters
    ///
    /// - `coefficients`: Coefficients `a_i` of the polynomial `h`, lowest power first.
    /// - `x0`: Half the length of the centre region.
    /// - `lambda`: Length scale of the fall-off (must be positive).
    pub fn new(coefficients: Vec<fef>, x0: fef, lambda: fef) -> Self {
        assert!(lambda > 0.0, "Enge lambda must be positive");
        Self {
            coefficients,
            x0,
            lambda,
        }
    }

    pub fn coefficients(&self) -> &[fef] {
        &self.coefficients
    }

    pub fn x0(&self) -> fef {
        self.x0
    }

    pub fn lambda(&self) -> fef {
        self.lambda
    }

    pub fn set_x0(&mut self, x0: fef) {
        self.x0 = x0;
    }

    /// Evaluates the `n`th derivative of the one-sided function `E` at `x`.
    pub fn one_sided(&self, x: fef, n: usize) -> fef {
        let u = &TaylorSeries::variable(x, n) * self.lambda.recip();
        u.polynomial(&self.coefficients)
            .inverse_one_plus_exp()
            .derivative(n)
    }
}

impl EndFieldModel for Enge {
    fn function(&self, x: fef, n: usize) -> fef {
        let inner = self.one_sided(x - self.x0, n);
        let outer = self.one_sided(-x - self.x0, n);
        if n == 0 {
            inner + outer - 1.0
        } else if n % 2 == 1 {
            inner - outer
        } else {
            inner + outer
        }
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

    fn enge() -> Enge {
        Enge::new(vec![0.0, 0.3, 0.4, 0.5], 1.2, 0.01)
    }

    #[test]
    fn enge_is_one_half_at_x0() {
        let mut enge = enge();
        assert_abs_diff_eq!(enge.function(0.0, 0), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(enge.function(1.2, 0), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(enge.function(-1.2, 0), 0.5, epsilon = 1e-6);
        enge.set_x0(2.3);
        assert_abs_diff_eq!(enge.function(2.3, 0), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn enge_derivatives_match_finite_differences() {
        let enge = Enge::new(vec![0.1, 2.0, 0.3, 0.2], 1.0, 0.5);
        let h = 1e-5;
        for &x in &[-1.4, -0.2, 0.9, 1.3] {
            let numerical_first = (enge.function(x + h, 0) - enge.function(x - h, 0)) / (2.0 * h);
            assert_relative_eq!(
                enge.function(x, 1),
                numerical_first,
                epsilon = 1e-8,
                max_relative = 1e-6
            );
            let numerical_second = (enge.function(x + h, 1) - enge.function(x - h, 1)) / (2.0 * h);
            assert_relative_eq!(
                enge.function(x, 2),
                numerical_second,
                epsilon = 1e-7,
                max_relative = 1e-5
            );
        }
    }

    #[test]
    fn enge_is_symmetric() {
        let enge = Enge::new(vec![0.1, 2.0, 0.3, 0.2], 1.0, 0.5);
        for &x in &[0.3, 1.1, 2.0] {
            assert_relative_eq!(enge.function(x, 0), enge.function(-x, 0), max_relative = 1e-12);
            assert_relative_eq!(enge.function(x, 1), -enge.function(-x, 1), max_relative = 1e-12);
            assert_relative_eq!(enge.function(x, 2), enge.function(-x, 2), max_relative = 1e-12);
        }
    }

    #[test]
    fn rescaling_scales_lengths() {
        let mut enge = enge();
        enge.rescale(2.0);
        assert_relative_eq!(enge.x0(), 2.4);
        assert_relative_eq!(enge.lambda(), 0.02);
        assert_relative_eq!(enge.centre_length(), 4.8);
        assert_relative_eq!(enge.end_length(), 0.02);
    }
}
