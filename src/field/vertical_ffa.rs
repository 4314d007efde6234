//! Fixed-field magnet whose field grows exponentially in the vertical
//! direction.

use super::{ffd, FieldBounds, FieldEvaluator, FieldSample};
use crate::{
    end_field::EndFieldModel,
    error::TrackingError,
    geometry::{BoundingBox, Dim3, Point3, Vec3},
};
use std::sync::Arc;

/// Configuration parameters for a vertical FFA magnet.
///
/// Lengths are in millimeters.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalFfaConfig {
    /// Highest power of the horizontal coordinate kept in the field expansion.
    pub max_order: usize,
    /// Field index [1/mm], so that the field scales as `exp(k*y)`.
    pub field_index: ffd,
    /// Vertical field at `y = 0` in the body of the magnet [T].
    pub bz: ffd,
    /// Half the horizontal aperture.
    pub half_width: ffd,
    /// Length of the element along the beam.
    pub length: ffd,
    /// Extent of the field below `y = 0`.
    pub negative_vertical_extent: ffd,
    /// Extent of the field above `y = 0`.
    pub positive_vertical_extent: ffd,
}

impl VerticalFfaConfig {
    pub const DEFAULT_MAX_ORDER: usize = 4;
    pub const DEFAULT_FIELD_INDEX: ffd = 1e-3;
    pub const DEFAULT_BZ: ffd = 1.0;
    pub const DEFAULT_HALF_WIDTH: ffd = 500.0;
    pub const DEFAULT_LENGTH: ffd = 2000.0;
    pub const DEFAULT_NEGATIVE_VERTICAL_EXTENT: ffd = 500.0;
    pub const DEFAULT_POSITIVE_VERTICAL_EXTENT: ffd = 500.0;

    /// Checks that the configuration describes a valid magnet.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.field_index == 0.0 || !self.field_index.is_finite() {
            return Err(TrackingError::InvalidConfig(format!(
                "field index must be finite and nonzero, got {}",
                self.field_index
            )));
        }
        if !(self.half_width > 0.0 && self.length > 0.0) {
            return Err(TrackingError::InvalidConfig(format!(
                "half width and length must be positive, got {} and {}",
                self.half_width, self.length
            )));
        }
        if !(self.negative_vertical_extent >= 0.0 && self.positive_vertical_extent >= 0.0) {
            return Err(TrackingError::InvalidConfig(
                "vertical extents must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for VerticalFfaConfig {
    fn default() -> Self {
        Self {
            max_order: Self::DEFAULT_MAX_ORDER,
            field_index: Self::DEFAULT_FIELD_INDEX,
            bz: Self::DEFAULT_BZ,
            half_width: Self::DEFAULT_HALF_WIDTH,
            length: Self::DEFAULT_LENGTH,
            negative_vertical_extent: Self::DEFAULT_NEGATIVE_VERTICAL_EXTENT,
            positive_vertical_extent: Self::DEFAULT_POSITIVE_VERTICAL_EXTENT,
        }
    }
}

/// A straight FFA magnet with vertical orbit excursion.
///
/// On the plane `x = 0` the vertical field is `bz*exp(k*y)*f(z - L/2)`, with
/// `f` the end-field model. The field elsewhere follows from an expansion in
/// powers of `x`.
#[derive(Clone, Debug)]
pub struct VerticalFfaMagnet {
    config: VerticalFfaConfig,
    end_field: Box<dyn EndFieldModel>,
    df_coefficients: Arc<Vec<Vec<ffd>>>,
}

/// Fringe field combinations `f_n` and `df_n/dz` at a longitudinal position.
struct ExpansionTerms {
    f_n: Vec<ffd>,
    dz_f_n: Vec<ffd>,
    reference_field: ffd,
}

impl VerticalFfaMagnet {
    /// Creates a new magnet. The end-field model is centred on the middle of
    /// the element.
    pub fn new(
        config: VerticalFfaConfig,
        end_field: Box<dyn EndFieldModel>,
    ) -> Result<Self, TrackingError> {
        config.validate()?;
        let df_coefficients = calculate_df_coefficients(config.max_order, config.field_index);
        Ok(Self {
            config,
            end_field,
            df_coefficients: Arc::new(df_coefficients),
        })
    }

    pub fn config(&self) -> &VerticalFfaConfig {
        &self.config
    }

    pub fn df_coefficients(&self) -> &[Vec<ffd>] {
        &self.df_coefficients
    }

    fn is_inside(&self, position: &Point3<ffd>) -> bool {
        let (x, y, z) = (position[Dim3::X], position[Dim3::Y], position[Dim3::Z]);
        x.abs() <= self.config.half_width
            && z >= 0.0
            && z <= self.config.length
            && y >= -self.config.negative_vertical_extent
            && y <= self.config.positive_vertical_extent
    }

    fn expansion_terms(&self, position: &Point3<ffd>) -> ExpansionTerms {
        let max_order = self.config.max_order;
        let z_relative = position[Dim3::Z] - 0.5 * self.config.length;
        let fringe_derivatives: Vec<ffd> = (0..max_order + 2)
            .map(|i| self.end_field.function(z_relative, i))
            .collect();

        let mut f_n = vec![0.0; max_order + 2];
        let mut dz_f_n = vec![0.0; max_order + 1];
        for (n, coefficients) in self.df_coefficients.iter().enumerate() {
            for (i, &c) in coefficients.iter().enumerate() {
                f_n[n] += c * fringe_derivatives[i];
                dz_f_n[n] += c * fringe_derivatives[i + 1];
            }
        }
        f_n[0] = fringe_derivatives[0];

        ExpansionTerms {
            f_n,
            dz_f_n,
            reference_field: self.config.bz * ffd::exp(self.config.field_index * position[Dim3::Y]),
        }
    }

    /// Computes the magnetic vector potential [T mm] at the given position,
    /// or returns `None` if the position is outside the magnet.
    pub fn vector_potential(&self, position: &Point3<ffd>) -> Option<Vec3<ffd>> {
        if !self.is_inside(position) {
            return None;
        }
        let terms = self.expansion_terms(position);
        let k = self.config.field_index;
        let x = position[Dim3::X];
        let mut potential = Vec3::zero();
        let mut x_power = x;
        for n in 0..self.df_coefficients.len() {
            let nf = (n + 1) as ffd;
            potential[Dim3::Y] += terms.reference_field / k * terms.dz_f_n[n] * x_power / nf;
            potential[Dim3::Z] += -terms.reference_field * terms.f_n[n] * x_power / nf;
            x_power *= x;
        }
        Some(potential)
    }
}

impl FieldEvaluator for VerticalFfaMagnet {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        _time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        if !self.is_inside(position) {
            return FieldBounds::OutOfBounds;
        }
        let terms = self.expansion_terms(position);
        let k = self.config.field_index;
        let x = position[Dim3::X];
        let b_ref = terms.reference_field;

        let magnetic = &mut sample.magnetic;
        let mut x_power = 1.0;
        for n in 0..=self.config.max_order {
            let nf = n as ffd;
            magnetic[Dim3::X] += b_ref * terms.f_n[n + 1] * (nf + 1.0) / k * x_power;
            magnetic[Dim3::Y] += b_ref * terms.f_n[n] * x_power;
            magnetic[Dim3::Z] += b_ref * terms.dz_f_n[n] / k * x_power;
            x_power *= x;
        }
        FieldBounds::Inside
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(
            &Point3::new(
                -self.config.half_width,
                -self.config.negative_vertical_extent,
                0.0,
            ),
            &Point3::new(
                self.config.half_width,
                self.config.positive_vertical_extent,
                self.config.length,
            ),
        ))
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }
}

/// Computes the coefficients relating the `n`th power of `x` in the field
/// expansion to the derivatives of the fringe field.
///
/// Odd orders vanish. Each even order follows from the previous one through
/// `f_i = -(k^2 f_{i-2} + f''_{i-2})/(i(i-1))`, where both terms contribute
/// to the coefficient of the same fringe derivative.
pub fn calculate_df_coefficients(max_order: usize, k: ffd) -> Vec<Vec<ffd>> {
    let mut df = vec![Vec::new(); max_order + 1];
    df[0] = vec![1.0];
    for i in (2..=max_order).step_by(2) {
        let factor = -1.0 / ((i * (i - 1)) as ffd);
        let previous = &df[i - 2];
        let mut coefficients = vec![0.0; previous.len() + 2];
        for (j, &c) in previous.iter().enumerate() {
            coefficients[j] += factor * k * k * c;
            coefficients[j + 2] += factor * c;
        }
        df[i] = coefficients;
    }
    df
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::end_field::Tanh;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn magnet(max_order: usize) -> VerticalFfaMagnet {
        let config = VerticalFfaConfig {
            max_order,
            field_index: 2e-3,
            bz: 1.5,
            half_width: 200.0,
            length: 1000.0,
            negative_vertical_extent: 100.0,
            positive_vertical_extent: 300.0,
        };
        VerticalFfaMagnet::new(config, Box::new(Tanh::new(300.0, 100.0))).unwrap()
    }

    #[test]
    fn coefficients_accumulate_both_contributions() {
        let k = 0.7;
        let df = calculate_df_coefficients(4, k);
        assert_eq!(df[1], Vec::<f64>::new());
        assert_eq!(df[2].len(), 3);
        assert_relative_eq!(df[2][0], -k * k / 2.0, max_relative = 1e-14);
        assert_relative_eq!(df[2][2], -0.5, max_relative = 1e-14);
        assert_eq!(df[3], Vec::<f64>::new());
        assert_eq!(df[4].len(), 5);
        assert_relative_eq!(df[4][0], k.powi(4) / 24.0, max_relative = 1e-14);
        assert_abs_diff_eq!(df[4][1], 0.0);
        assert_relative_eq!(df[4][2], k * k / 12.0, max_relative = 1e-14);
        assert_relative_eq!(df[4][4], 1.0 / 24.0, max_relative = 1e-14);
    }

    #[test]
    fn field_on_symmetry_plane_is_vertical() {
        let mut magnet = magnet(4);
        let position = Point3::new(0.0, 50.0, 500.0);
        let sample = magnet.evaluate(&position, 0.0).unwrap();
        let expected = 1.5 * f64::exp(2e-3 * 50.0) * Tanh::new(300.0, 100.0).function(0.0, 0);
        assert_relative_eq!(sample.magnetic[Dim3::Y], expected, max_relative = 1e-12);
        assert_abs_diff_eq!(sample.magnetic[Dim3::X], 0.0);
        // The fringe field is flat in the centre
        assert_abs_diff_eq!(sample.magnetic[Dim3::Z], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn field_is_divergence_free_near_the_end() {
        let mut magnet = magnet(8);
        let position = Point3::new(5.0, 20.0, 780.0);
        let mut divergence = 0.0;
        let mut scale = 0.0;
        for dim in Dim3::slice() {
            let derivative = magnet.field_derivative(&position, 0.0, dim).unwrap();
            divergence += derivative.magnetic[dim];
            scale += derivative.magnetic[dim].abs();
        }
        assert!(scale > 0.0);
        assert!(divergence.abs() < 1e-6 * scale);
    }

    #[test]
    fn vertical_field_is_curl_of_potential() {
        let magnet = magnet(6);
        let position = Point3::new(3.0, 10.0, 650.0);
        let h = 1e-3;
        let potential_z = |x: f64| {
            magnet
                .vector_potential(&Point3::new(x, 10.0, 650.0))
                .unwrap()[Dim3::Z]
        };
        let dx_az = (potential_z(3.0 + h) - potential_z(3.0 - h)) / (2.0 * h);
        let b_y = magnet.clone().evaluate(&position, 0.0).unwrap().magnetic[Dim3::Y];
        assert_relative_eq!(-dx_az, b_y, max_relative = 1e-6);
    }

    #[test]
    fn outside_positions_leave_sample_untouched() {
        let mut magnet = magnet(2);
        let original = FieldSample::new(Vec3::zero(), Vec3::new(0.1, 0.2, 0.3));
        for position in [
            Point3::new(201.0, 0.0, 500.0),
            Point3::new(0.0, -101.0, 500.0),
            Point3::new(0.0, 301.0, 500.0),
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(0.0, 0.0, 1001.0),
        ] {
            let mut sample = original.clone();
            assert_eq!(
                magnet.accumulate_field(&position, 0.0, &mut sample),
                FieldBounds::OutOfBounds
            );
            assert_eq!(sample, original);
        }
        assert!(magnet
            .bounding_box()
            .unwrap()
            .contains(&Point3::new(200.0, 300.0, 1000.0)));
    }
}
