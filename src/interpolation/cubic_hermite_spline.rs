//! Interpolation with a cubic Hermite spline.

use super::{fip, RegularSampling1};

/// How tangents should be chosen at the boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryTangents {
    Computed,
    Zero,
}

/// A regularly sampled 1D profile interpolated with a cubic Hermite spline
/// whose tangents are finite differences of the samples.
#[derive(Clone, Debug)]
pub struct CubicHermiteSpline1 {
    sampling: RegularSampling1,
    values: Vec<fip>,
    tangents: Vec<fip>,
}

impl CubicHermiteSpline1 {
    /// Creates a new spline through the given samples.
    ///
    /// # Panics
    ///
    /// If the number of values differs from the sampling size.
    pub fn new(
        sampling: RegularSampling1,
        values: Vec<fip>,
        boundary_tangents: BoundaryTangents,
    ) -> Self {
        assert_eq!(
            values.len(),
            sampling.size(),
            "Number of values must match the sampling"
        );
        let tangents = (0..values.len())
            .map(|index| Self::compute_tangent(&sampling, &values, index, boundary_tangents))
            .collect();
        Self {
            sampling,
            values,
            tangents,
        }
    }

    pub fn sampling(&self) -> &RegularSampling1 {
        &self.sampling
    }

    fn hermite_basis_00(t: fip) -> fip {
        (1.0 + 2.0 * t) * fip::powi(1.0 - t, 2)
    }

    fn hermite_basis_10(t: fip) -> fip {
        t * fip::powi(1.0 - t, 2)
    }

    fn hermite_basis_01(t: fip) -> fip {
        t * t * (3.0 - 2.0 * t)
    }

    fn hermite_basis_11(t: fip) -> fip {
        t * t * (t - 1.0)
    }

    fn compute_tangent(
        sampling: &RegularSampling1,
        values: &[fip],
        index: usize,
        boundary_tangents: BoundaryTangents,
    ) -> fip {
        let size = values.len();
        let spacing = sampling.spacing();
        if index == 0 || index == size - 1 {
            match boundary_tangents {
                BoundaryTangents::Computed if index == 0 => (values[1] - values[0]) / spacing,
                BoundaryTangents::Computed => (values[size - 1] - values[size - 2]) / spacing,
                BoundaryTangents::Zero => 0.0,
            }
        } else {
            0.5 * (values[index + 1] - values[index - 1]) / spacing
        }
    }

    /// Interpolates the value and the first derivative at `coord`, or returns
    /// `None` if `coord` is outside the sampled range.
    pub fn interp_with_derivative(&self, coord: fip) -> Option<(fip, fip)> {
        let (index, t) = self.sampling.find_interval(coord)?;
        let span = self.sampling.spacing();

        let start_value = self.values[index];
        let end_value = self.values[index + 1];
        let start_tangent = self.tangents[index];
        let end_tangent = self.tangents[index + 1];

        let value = Self::hermite_basis_00(t) * start_value
            + Self::hermite_basis_01(t) * end_value
            + Self::hermite_basis_10(t) * span * start_tangent
            + Self::hermite_basis_11(t) * span * end_tangent;

        // Derivatives of the basis functions with respect to t
        let d00 = 6.0 * t * (t - 1.0);
        let d10 = (1.0 - t) * (1.0 - 3.0 * t);
        let d01 = -d00;
        let d11 = t * (3.0 * t - 2.0);
        let derivative = (d00 * start_value + d01 * end_value) / span
            + d10 * start_tangent
            + d11 * end_tangent;

        Some((value, derivative))
    }

    /// Interpolates the value at `coord`.
    pub fn interp(&self, coord: fip) -> Option<fip> {
        self.interp_with_derivative(coord).map(|(value, _)| value)
    }

    /// Integrates the spline from the start of interval `index` to the
    /// fractional position `t` within it.
    ///
    /// # Panics
    ///
    /// If `index` is not the index of an interval.
    pub fn integrate_interval(&self, index: usize, t: fip) -> fip {
        let span = self.sampling.spacing();
        let t2 = t * t;
        let t3 = t2 * t;
        let t4 = t3 * t;
        let int00 = t - t3 + 0.5 * t4;
        let int10 = 0.25 * t4 - 2.0 * t3 / 3.0 + 0.5 * t2;
        let int01 = t3 - 0.5 * t4;
        let int11 = 0.25 * t4 - t3 / 3.0;
        span * (int00 * self.values[index]
            + int01 * self.values[index + 1]
            + int10 * span * self.tangents[index]
            + int11 * span * self.tangents[index + 1])
    }

    /// Values at the sample points.
    pub fn values(&self) -> &[fip] {
        &self.values
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn spline_reproduces_samples() {
        let sampling = RegularSampling1::new(0.0, 0.5, 5);
        let values = vec![0.0, 1.0, 0.5, -0.5, 2.0];
        let spline = CubicHermiteSpline1::new(sampling, values.clone(), BoundaryTangents::Computed);
        for (index, &value) in values.iter().take(4).enumerate() {
            assert_abs_diff_eq!(spline.interp(0.5 * index as f64).unwrap(), value, epsilon = 1e-14);
        }
        assert!(spline.interp(2.0).is_none());
    }

    #[test]
    fn spline_is_exact_for_quadratics() {
        // Central differences give exact tangents for a quadratic at interior points
        let sampling = RegularSampling1::new(-1.0, 0.25, 9);
        let values = (0..9)
            .map(|i| {
                let x = -1.0 + 0.25 * i as f64;
                x * x
            })
            .collect();
        let spline = CubicHermiteSpline1::new(sampling, values, BoundaryTangents::Computed);
        for &x in &[-0.6, -0.1, 0.3, 0.7] {
            let (value, derivative) = spline.interp_with_derivative(x).unwrap();
            assert_abs_diff_eq!(value, x * x, epsilon = 1e-12);
            assert_abs_diff_eq!(derivative, 2.0 * x, epsilon = 1e-12);
        }
    }

    #[test]
    fn interval_integral_is_exact_for_quadratics() {
        let sampling = RegularSampling1::new(0.0, 0.5, 5);
        let values = (0..5).map(|i| (0.5 * i as f64).powi(2)).collect();
        let spline = CubicHermiteSpline1::new(sampling, values, BoundaryTangents::Computed);
        // Interval [0.5, 1.0] has exact central-difference tangents at both ends
        assert_abs_diff_eq!(
            spline.integrate_interval(1, 1.0),
            (1.0 - 0.125) / 3.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            spline.integrate_interval(1, 0.5),
            (0.421875 - 0.125) / 3.0,
            epsilon = 1e-12
        );
        assert_eq!(spline.integrate_interval(2, 0.0), 0.0);
    }

    #[test]
    fn zero_boundary_tangents_flatten_the_ends() {
        let sampling = RegularSampling1::new(0.0, 1.0, 3);
        let spline = CubicHermiteSpline1::new(sampling, vec![0.0, 1.0, 2.0], BoundaryTangents::Zero);
        let (_, derivative) = spline.interp_with_derivative(0.0).unwrap();
        assert_abs_diff_eq!(derivative, 0.0, epsilon = 1e-14);
    }
}
