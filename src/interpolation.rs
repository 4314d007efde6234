//! Interpolation of tabulated field data.

pub mod cubic_hermite_spline;
pub mod trilinear;

/// Floating-point precision to use for interpolation.
#[allow(non_camel_case_types)]
pub type fip = f64;

/// Regular one-dimensional sampling `x_i = start + i*spacing`, `i = 0..size`.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularSampling1 {
    start: fip,
    spacing: fip,
    size: usize,
}

impl RegularSampling1 {
    /// Creates a new regular sampling.
    ///
    /// The sampling must have at least two points and a positive spacing.
    pub fn new(start: fip, spacing: fip, size: usize) -> Self {
        assert!(size >= 2, "Sampling must have at least two points");
        assert!(spacing > 0.0, "Sample spacing must be positive");
        Self {
            start,
            spacing,
            size,
        }
    }

    pub fn start(&self) -> fip {
        self.start
    }

    pub fn spacing(&self) -> fip {
        self.spacing
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Coordinate of the last sample.
    pub fn end(&self) -> fip {
        self.start + ((self.size - 1) as fip) * self.spacing
    }

    /// Finds the index of the interval containing `coord` together with the
    /// fractional position within it, or `None` if `coord` is outside the
    /// half-open range `[start, end)`.
    ///
    /// The index is clamped to the last interval so that round-off in the
    /// division never produces an interval beyond the end.
    pub fn find_interval(&self, coord: fip) -> Option<(usize, fip)> {
        let offset = coord - self.start;
        if !(offset >= 0.0 && coord < self.end()) {
            return None;
        }
        let scaled = offset / self.spacing;
        let index = usize::min(scaled.floor() as usize, self.size - 2);
        Some((index, scaled - index as fip))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interval_search_is_half_open() {
        let sampling = RegularSampling1::new(-1.0, 0.5, 5);
        assert_eq!(sampling.end(), 1.0);
        assert_eq!(sampling.find_interval(-1.0), Some((0, 0.0)));
        let (index, fraction) = sampling.find_interval(0.3).unwrap();
        assert_eq!(index, 2);
        assert_abs_diff_eq!(fraction, 0.6, epsilon = 1e-12);
        assert!(sampling.find_interval(1.0).is_none());
        assert!(sampling.find_interval(-1.01).is_none());
        assert!(sampling.find_interval(f64::NAN).is_none());
    }
}
