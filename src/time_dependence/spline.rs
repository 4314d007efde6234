//! Time dependence interpolated from regularly spaced samples.

use super::{ftd, TimeDependence};
use crate::{
    error::TrackingError,
    interpolation::{
        cubic_hermite_spline::{BoundaryTangents, CubicHermiteSpline1},
        RegularSampling1,
    },
};

/// Time dependence given by a cubic Hermite spline through samples at
/// `t_i = start + i*spacing`.
///
/// Before the first sample the value is held at the first sample value, and
/// after the last sample at the last one. The integral follows the same
/// extension.
#[derive(Clone, Debug)]
pub struct SplineTimeDependence {
    spline: CubicHermiteSpline1,
    cumulative_integrals: Vec<ftd>,
    integral_offset: ftd,
}

impl SplineTimeDependence {
    /// Creates a new spline time dependence from samples starting at
    /// `start` with the given time spacing.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the time dependence.
    /// - `Err`: There are fewer than two samples, the spacing is not positive
    /// or a sample is not finite.
    pub fn new(start: ftd, spacing: ftd, values: Vec<ftd>) -> Result<Self, TrackingError> {
        if values.len() < 2 {
            return Err(TrackingError::InvalidConfig(format!(
                "spline needs at least two samples, got {}",
                values.len()
            )));
        }
        if !(spacing > 0.0 && spacing.is_finite() && start.is_finite()) {
            return Err(TrackingError::InvalidConfig(format!(
                "spline sampling must have a finite start and a positive spacing, got {} and {}",
                start, spacing
            )));
        }
        if values.iter().any(|value| !value.is_finite()) {
            return Err(TrackingError::InvalidConfig(
                "spline samples must be finite".to_string(),
            ));
        }
        let sampling = RegularSampling1::new(start, spacing, values.len());
        let spline = CubicHermiteSpline1::new(sampling, values, BoundaryTangents::Computed);

        let mut cumulative_integrals = Vec::with_capacity(spline.values().len());
        let mut accumulated = 0.0;
        cumulative_integrals.push(accumulated);
        for index in 0..spline.values().len() - 1 {
            accumulated += spline.integrate_interval(index, 1.0);
            cumulative_integrals.push(accumulated);
        }

        let mut time_dependence = Self {
            spline,
            cumulative_integrals,
            integral_offset: 0.0,
        };
        time_dependence.integral_offset = time_dependence.integral_from_start(0.0);
        Ok(time_dependence)
    }

    pub fn sampling(&self) -> &RegularSampling1 {
        self.spline.sampling()
    }

    fn first_value(&self) -> ftd {
        self.spline.values()[0]
    }

    fn last_value(&self) -> ftd {
        self.spline.values()[self.spline.values().len() - 1]
    }

    /// Integral of the extended spline from the first sample time.
    fn integral_from_start(&self, time: ftd) -> ftd {
        let sampling = self.spline.sampling();
        if time < sampling.start() {
            return (time - sampling.start()) * self.first_value();
        }
        match sampling.find_interval(time) {
            Some((index, t)) => {
                self.cumulative_integrals[index] + self.spline.integrate_interval(index, t)
            }
            None => {
                self.cumulative_integrals[self.cumulative_integrals.len() - 1]
                    + (time - sampling.end()) * self.last_value()
            }
        }
    }
}

impl TimeDependence for SplineTimeDependence {
    fn value(&self, time: ftd) -> ftd {
        if time < self.spline.sampling().start() {
            return self.first_value();
        }
        self.spline.interp(time).unwrap_or_else(|| self.last_value())
    }

    fn integral(&self, time: ftd) -> ftd {
        self.integral_from_start(time) - self.integral_offset
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    fn linear_ramp() -> SplineTimeDependence {
        // 1 + 2t sampled on [0, 4]
        SplineTimeDependence::new(0.0, 1.0, vec![1.0, 3.0, 5.0, 7.0, 9.0]).unwrap()
    }

    #[test]
    fn spline_reproduces_linear_ramp() {
        let ramp = linear_ramp();
        for &t in &[0.0, 0.3, 1.7, 2.5, 3.99] {
            assert_abs_diff_eq!(ramp.value(t), 1.0 + 2.0 * t, epsilon = 1e-12);
            assert_abs_diff_eq!(ramp.integral(t), t + t * t, epsilon = 1e-12);
        }
    }

    #[test]
    fn spline_is_held_constant_outside_samples() {
        let ramp = linear_ramp();
        assert_eq!(ramp.value(-2.0), 1.0);
        assert_eq!(ramp.value(4.0), 9.0);
        assert_eq!(ramp.value(10.0), 9.0);
        assert_abs_diff_eq!(ramp.integral(-2.0), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ramp.integral(6.0), 20.0 + 2.0 * 9.0, epsilon = 1e-12);
    }

    #[test]
    fn integral_starts_at_time_zero() {
        let spline = SplineTimeDependence::new(2.0, 0.5, vec![4.0, 4.0, 4.0]).unwrap();
        assert_abs_diff_eq!(spline.integral(0.0), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.integral(2.5), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.integral(5.0), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_samples_are_rejected() {
        assert!(SplineTimeDependence::new(0.0, 1.0, vec![1.0]).is_err());
        assert!(SplineTimeDependence::new(0.0, 0.0, vec![1.0, 2.0]).is_err());
        assert!(SplineTimeDependence::new(0.0, 1.0, vec![1.0, f64::NAN]).is_err());
    }
}
