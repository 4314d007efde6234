//! Enge fringe field with different fall-off at each end.

use super::{fef, EndFieldModel, Enge};

/// Fringe field with separate Enge functions for the start and end of the
/// magnet.
///
/// The shape function is `f(x) = E_s(-x - x0_s) + E_e(x - x0_e) - 1`, where
/// `E_s` and `E_e` are the one-sided functions of the two ends. The start
/// side is mirrored, so its odd derivatives enter with a negative sign.
#[derive(Clone, Debug, PartialEq)]
pub struct AsymmetricEnge {
    start: Enge,
    end: Enge,
}

impl AsymmetricEnge {
    pub fn new(start: Enge, end: Enge) -> Self {
        Self { start, end }
    }

    /// Creates the model from the parameters of each end.
    pub fn from_parameters(
        start_coefficients: Vec<fef>,
        start_x0: fef,
        start_lambda: fef,
        end_coefficients: Vec<fef>,
        end_x0: fef,
        end_lambda: fef,
    ) -> Self {
        Self::new(
            Enge::new(start_coefficients, start_x0, start_lambda),
            Enge::new(end_coefficients, end_x0, end_lambda),
        )
    }

    pub fn start(&self) -> &Enge {
        &self.start
    }

    pub fn end(&self) -> &Enge {
        &self.end
    }
}

impl EndFieldModel for AsymmetricEnge {
    fn function(&self, x: fef, n: usize) -> fef {
        let start_argument = -x - self.start.x0();
        let end_argument = x - self.end.x0();
        let start = self.start.one_sided(start_argument, n);
        let end = self.end.one_sided(end_argument, n);
        if n == 0 {
            start + end - 1.0
        } else if n % 2 == 1 {
            -start + end
        } else {
            start + end
        }
    }

    fn rescale(&mut self, factor: fef) {
        self.start.rescale(factor);
        self.end.rescale(factor);
    }

    fn centre_length(&self) -> fef {
        self.start.x0() + self.end.x0()
    }

    fn end_length(&self) -> fef {
        0.5 * (self.start.lambda() + self.end.lambda())
    }

    fn clone_box(&self) -> Box<dyn EndFieldModel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    fn asymmetric_enge() -> AsymmetricEnge {
        AsymmetricEnge::from_parameters(vec![0.0, 1.5, 0.2], 1.0, 0.3, vec![0.1, 2.5, 0.4], 2.0, 0.6)
    }

    #[test]
    fn value_combines_both_ends() {
        let model = asymmetric_enge();
        for &x in &[-1.5, -0.3, 0.0, 0.7, 1.9, 2.4] {
            let expected = model.start().one_sided(-x - 1.0, 0) + model.end().one_sided(x - 2.0, 0) - 1.0;
            assert_relative_eq!(model.function(x, 0), expected, max_relative = 1e-14);
        }
    }

    #[test]
    fn odd_derivatives_flip_the_start_side() {
        let model = asymmetric_enge();
        let x = 0.4;
        for n in 1..=4 {
            let start = model.start().one_sided(-x - 1.0, n);
            let end = model.end().one_sided(x - 2.0, n);
            let expected = if n % 2 == 1 { end - start } else { end + start };
            assert_relative_eq!(model.function(x, n), expected, max_relative = 1e-14);
        }
    }

    #[test]
    fn first_derivative_matches_finite_difference() {
        let model = asymmetric_enge();
        let h = 1e-5;
        for &x in &[-0.9, 0.5, 1.8] {
            let numerical = (model.function(x + h, 0) - model.function(x - h, 0)) / (2.0 * h);
            assert_relative_eq!(
                model.function(x, 1),
                numerical,
                epsilon = 1e-8,
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn rescale_and_clone_apply_to_both_ends() {
        let mut model = asymmetric_enge();
        let copy = model.clone_box();
        model.rescale(2.0);
        assert_relative_eq!(model.start().x0(), 2.0);
        assert_relative_eq!(model.end().lambda(), 1.2);
        assert_relative_eq!(model.centre_length(), 6.0);
        assert_relative_eq!(model.end_length(), 0.9, max_relative = 1e-12);
        // The copy owns its own ends
        assert_relative_eq!(copy.centre_length(), 3.0);
    }
}
