//! Scaling fixed-field alternating-gradient magnet with spiral edges.

use super::{ffd, FieldBounds, FieldEvaluator, FieldSample};
use crate::{
    constants::{PI, TWO_PI},
    end_field::EndFieldModel,
    error::TrackingError,
    geometry::{BoundingBox, Dim3, Point3, Vec3},
};
use std::sync::Arc;

/// Configuration parameters for a scaling FFA magnet.
///
/// Lengths are in millimeters and angles in radians.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalingFfaConfig {
    /// Highest power of the vertical coordinate kept in the field expansion.
    pub max_order: usize,
    /// Field index `k`, so that the midplane field scales as `(r/r0)^k`.
    pub field_index: ffd,
    /// Tangent of the spiral angle (zero for a radial sector magnet).
    pub tan_delta: ffd,
    /// Nominal dipole field at `r0` [T].
    pub bz: ffd,
    /// Reference radius [mm]. A negative value bends the other way.
    pub r0: ffd,
    /// Smallest radius inside the magnet [mm].
    pub r_min: ffd,
    /// Largest radius inside the magnet [mm].
    pub r_max: ffd,
    /// Angle of the magnet centre relative to the start of the element.
    /// Defaults to half the default element extent.
    pub phi_start: Option<ffd>,
    /// Angle at which the next element starts.
    /// Defaults to the centre length plus four end lengths.
    pub phi_end: Option<ffd>,
    /// Largest angle from the magnet centre with nonzero field.
    /// Defaults to half the centre length plus five end lengths.
    pub azimuthal_extent: Option<ffd>,
    /// Largest distance from the midplane with nonzero field [mm].
    pub vertical_extent: ffd,
}

impl ScalingFfaConfig {
    pub const DEFAULT_MAX_ORDER: usize = 3;
    pub const DEFAULT_FIELD_INDEX: ffd = 2.0;
    pub const DEFAULT_TAN_DELTA: ffd = 0.0;
    pub const DEFAULT_BZ: ffd = 1.0;
    pub const DEFAULT_R0: ffd = 4000.0;
    pub const DEFAULT_R_MIN: ffd = 3000.0;
    pub const DEFAULT_R_MAX: ffd = 5000.0;
    pub const DEFAULT_VERTICAL_EXTENT: ffd = 300.0;

    /// Checks that the configuration describes a valid magnet.
    pub fn validate(&self) -> Result<(), TrackingError> {
        let fail = |message: String| Err(TrackingError::InvalidConfig(message));
        if self.r0 == 0.0 || !self.r0.is_finite() {
            return fail(format!("reference radius must be finite and nonzero, got {}", self.r0));
        }
        if !(self.r_min >= 0.0 && self.r_min < self.r_max) {
            return fail(format!(
                "radial extent [{}, {}] must be non-negative and non-empty",
                self.r_min, self.r_max
            ));
        }
        if !(self.vertical_extent > 0.0) {
            return fail(format!(
                "vertical extent must be positive, got {}",
                self.vertical_extent
            ));
        }
        if !self.field_index.is_finite() || !self.tan_delta.is_finite() || !self.bz.is_finite() {
            return fail("field index, spiral angle and dipole field must be finite".to_string());
        }
        for (name, angle) in [
            ("phi_start", self.phi_start),
            ("phi_end", self.phi_end),
            ("azimuthal_extent", self.azimuthal_extent),
        ] {
            if let Some(angle) = angle {
                if !(angle >= 0.0) {
                    return fail(format!("{} must be non-negative, got {}", name, angle));
                }
            }
        }
        Ok(())
    }
}

impl Default for ScalingFfaConfig {
    fn default() -> Self {
        Self {
            max_order: Self::DEFAULT_MAX_ORDER,
            field_index: Self::DEFAULT_FIELD_INDEX,
            tan_delta: Self::DEFAULT_TAN_DELTA,
            bz: Self::DEFAULT_BZ,
            r0: Self::DEFAULT_R0,
            r_min: Self::DEFAULT_R_MIN,
            r_max: Self::DEFAULT_R_MAX,
            phi_start: None,
            phi_end: None,
            azimuthal_extent: None,
            vertical_extent: Self::DEFAULT_VERTICAL_EXTENT,
        }
    }
}

/// A scaling FFA magnet.
///
/// The midplane field is `bz*(r/|r0|)^k*f(psi)`, where `f` is the end-field
/// model evaluated at the spiral angle `psi = phi - tan(delta)*ln(r/|r0|) -
/// phi_start`. Off the midplane the field is expanded in powers of `z/r` so
/// that it stays divergence and curl free up to the configured order.
///
/// The magnet is centred at `(-r0, 0, 0)` in element coordinates, with `y`
/// as the vertical axis and the beam entering along `z`.
#[derive(Clone, Debug)]
pub struct ScalingFfaMagnet {
    max_order: usize,
    field_index: ffd,
    tan_delta: ffd,
    bz: ffd,
    r0: ffd,
    r0_sign: ffd,
    r_min: ffd,
    r_max: ffd,
    phi_start: ffd,
    phi_end: ffd,
    azimuthal_extent: ffd,
    vertical_extent: ffd,
    end_field: Box<dyn EndFieldModel>,
    df_coefficients: Arc<Vec<Vec<ffd>>>,
}

impl ScalingFfaMagnet {
    /// Creates a new magnet from the given configuration and end-field model.
    ///
    /// The end-field model is given in millimeters along the reference
    /// radius and is rescaled to radians. Angular extents missing from the
    /// configuration are derived from the rescaled model.
    pub fn new(
        config: ScalingFfaConfig,
        mut end_field: Box<dyn EndFieldModel>,
    ) -> Result<Self, TrackingError> {
        config.validate()?;
        let r0_abs = config.r0.abs();
        end_field.rescale(r0_abs.recip());

        let centre_length = end_field.centre_length();
        let end_length = end_field.end_length();
        let default_extent = 4.0 * end_length + centre_length;

        let phi_start = config
            .phi_start
            .map_or(0.5 * default_extent, |phi| phi + 0.5 * centre_length);
        let phi_end = config.phi_end.unwrap_or(default_extent);
        let azimuthal_extent = config
            .azimuthal_extent
            .unwrap_or(5.0 * end_length + 0.5 * centre_length);

        let df_coefficients =
            calculate_df_coefficients(config.max_order, config.field_index, config.tan_delta);

        Ok(Self {
            max_order: config.max_order,
            field_index: config.field_index,
            tan_delta: config.tan_delta,
            bz: config.bz,
            r0: config.r0,
            r0_sign: config.r0.signum(),
            r_min: config.r_min,
            r_max: config.r_max,
            phi_start,
            phi_end,
            azimuthal_extent,
            vertical_extent: config.vertical_extent,
            end_field,
            df_coefficients: Arc::new(df_coefficients),
        })
    }

    pub fn phi_start(&self) -> ffd {
        self.phi_start
    }

    pub fn phi_end(&self) -> ffd {
        self.phi_end
    }

    pub fn azimuthal_extent(&self) -> ffd {
        self.azimuthal_extent
    }

    /// Length of the element along the reference radius [mm].
    pub fn element_length(&self) -> ffd {
        self.r0.abs() * self.phi_end
    }

    pub fn end_field(&self) -> &dyn EndFieldModel {
        self.end_field.as_ref()
    }

    /// Coefficients of the fringe field derivatives for each power of `z/r`.
    pub fn df_coefficients(&self) -> &[Vec<ffd>] {
        &self.df_coefficients
    }

    /// Computes the magnetic field in cylindrical components
    /// `(B_r, B_z, B_phi)` at the cylindrical position `(r, z, phi)`, or
    /// returns `None` if the position is outside the magnet.
    pub fn field_cylindrical(&self, r: ffd, z: ffd, phi: ffd) -> Option<Vec3<ffd>> {
        if !(r >= self.r_min && r <= self.r_max) {
            return None;
        }
        if !(z >= -self.vertical_extent && z <= self.vertical_extent) {
            return None;
        }
        let normalized_radius = r / self.r0.abs();
        let phi_spiral = phi - self.tan_delta * normalized_radius.ln() - self.phi_start;
        if !(phi_spiral >= -self.azimuthal_extent && phi_spiral <= self.azimuthal_extent) {
            return None;
        }

        let h = self.bz * normalized_radius.powf(self.field_index);
        let fringe_derivatives: Vec<ffd> = (0..=self.max_order)
            .map(|n| self.end_field.function(phi_spiral, n))
            .collect();
        let fringe_combination = |coefficients: &[ffd]| -> ffd {
            coefficients
                .iter()
                .zip(fringe_derivatives.iter())
                .map(|(c, f)| c * f)
                .sum()
        };

        let z_over_r = self.r0_sign * z / r;
        let k = self.field_index;
        let (mut b_r, mut b_z, mut b_phi) = (0.0, 0.0, 0.0);
        let mut z_over_r_power = 1.0;

        for n in (0..self.df_coefficients.len()).step_by(2) {
            let f_2n = fringe_combination(&self.df_coefficients[n]);
            b_z += f_2n * h * z_over_r_power;
            if self.max_order > n {
                let f_2n_plus_1 = fringe_combination(&self.df_coefficients[n + 1]);
                let next_power = z_over_r_power * z_over_r;
                let nf = n as ffd;
                b_r += self.r0_sign
                    * (f_2n * (k - nf) / (nf + 1.0) - self.tan_delta * f_2n_plus_1)
                    * h
                    * next_power;
                b_phi += self.r0_sign * f_2n_plus_1 * h * next_power;
            }
            z_over_r_power *= z_over_r * z_over_r;
        }
        Some(Vec3::new(b_r, b_z, b_phi))
    }

    /// Converts element coordinates to the cylindrical `(r, z, phi)`
    /// coordinates of the magnet.
    fn to_cylindrical(&self, position: &Point3<ffd>) -> (ffd, ffd, ffd) {
        let x = self.r0_sign * (self.r0 + position[Dim3::X]);
        let z = position[Dim3::Z];
        (x.hypot(z), position[Dim3::Y], z.atan2(x))
    }

    fn to_element_coordinates(&self, r: ffd, y: ffd, phi: ffd) -> Point3<ffd> {
        let x = r * phi.cos();
        Point3::new(self.r0_sign * x - self.r0, y, r * phi.sin())
    }
}

impl FieldEvaluator for ScalingFfaMagnet {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        _time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        let (r, z, phi) = self.to_cylindrical(position);
        match self.field_cylindrical(r, z, phi) {
            Some(b_cyl) => {
                let (b_r, b_z, b_phi) = (b_cyl[Dim3::X], b_cyl[Dim3::Y], b_cyl[Dim3::Z]);
                let (sin_phi, cos_phi) = phi.sin_cos();
                let magnetic = &mut sample.magnetic;
                magnetic[Dim3::X] += -self.r0_sign * (-b_r * cos_phi + b_phi * sin_phi);
                magnetic[Dim3::Y] += b_z;
                magnetic[Dim3::Z] += b_r * sin_phi + b_phi * cos_phi;
                FieldBounds::Inside
            }
            None => FieldBounds::OutOfBounds,
        }
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        // Range of polar angles swept by the spiral over the radial extent
        let spiral_offsets = [self.r_min, self.r_max]
            .map(|r| self.tan_delta * (r / self.r0.abs()).ln());
        let phi_low = self.phi_start - self.azimuthal_extent
            + ffd::min(spiral_offsets[0], spiral_offsets[1]);
        let phi_high = self.phi_start
            + self.azimuthal_extent
            + ffd::max(spiral_offsets[0], spiral_offsets[1]);

        // Extremes of an annular sector lie at its end angles or where it
        // crosses a coordinate axis
        let mut angles = vec![phi_low, phi_high];
        let mut axis_angle = (phi_low / (0.5 * PI)).ceil() * 0.5 * PI;
        while axis_angle < phi_high && axis_angle < phi_low + TWO_PI {
            angles.push(axis_angle);
            axis_angle += 0.5 * PI;
        }

        let corners: Vec<Point3<ffd>> = angles
            .iter()
            .flat_map(|&phi| {
                [self.r_min, self.r_max].into_iter().flat_map(move |r| {
                    [-self.vertical_extent, self.vertical_extent]
                        .into_iter()
                        .map(move |y| (r, y, phi))
                })
            })
            .map(|(r, y, phi)| self.to_element_coordinates(r, y, phi))
            .collect();
        BoundingBox::enclosing(&corners)
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }
}

/// Computes the coefficients relating the `n`th power of `z/r` in the field
/// expansion to the derivatives of the fringe field.
///
/// Entry `[n][i]` multiplies the `i`th derivative of the end-field model in
/// the coefficient of `(z/r)^n`. The recurrence follows from requiring the
/// field to be curl and divergence free.
pub fn calculate_df_coefficients(max_order: usize, k: ffd, tan_delta: ffd) -> Vec<Vec<ffd>> {
    let mut df = vec![Vec::new(); max_order + 1];
    df[0] = vec![1.0];
    let mut n = 0;
    while n < max_order {
        let nf = n as ffd;

        let mut next = vec![0.0; df[n].len() + 1];
        for (i, &c) in df[n].iter().enumerate() {
            next[i + 1] = c / (nf + 1.0);
        }
        df[n + 1] = next;
        if n + 1 == max_order {
            break;
        }

        let mut next = vec![0.0; df[n].len() + 2];
        for (i, &c) in df[n].iter().enumerate() {
            next[i] = -(k - nf) * (k - nf) / (nf + 1.0) * c / (nf + 2.0);
        }
        for (i, &c) in df[n + 1].iter().enumerate() {
            next[i] += 2.0 * (k - nf) * tan_delta * c / (nf + 2.0);
            next[i + 1] -= (1.0 + tan_delta * tan_delta) * c / (nf + 2.0);
        }
        df[n + 2] = next;
        n += 2;
    }
    df
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::end_field::{Enge, Tanh};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const R0: f64 = 4000.0;

    /// Magnet with a tanh fringe field of 100 mm end length and 1100 mm
    /// centre length, starting 1500 mm into the element.
    fn spiral_magnet(tan_delta: f64, max_order: usize) -> ScalingFfaMagnet {
        let config = ScalingFfaConfig {
            max_order,
            field_index: 2.0,
            tan_delta,
            bz: 4.0,
            r0: R0,
            r_min: R0 - 1200.0,
            r_max: R0 + 1300.0,
            phi_start: Some(1500.0 / R0),
            phi_end: Some(2500.0 / R0),
            azimuthal_extent: Some(5100.0 / R0),
            vertical_extent: 305.0,
        };
        ScalingFfaMagnet::new(config, Box::new(Tanh::new(550.0, 100.0))).unwrap()
    }

    /// Position at radius `r`, height `y` and arc length `s` along the
    /// reference radius.
    fn element_position(r: f64, y: f64, s: f64) -> Point3<f64> {
        let theta = s / R0;
        Point3::new(r * theta.cos() - R0, y, r * theta.sin())
    }

    #[test]
    fn coefficients_up_to_second_order_are_correct() {
        let (k, tan_delta) = (1.7, 0.4);
        let df = calculate_df_coefficients(2, k, tan_delta);
        assert_eq!(df.len(), 3);
        assert_eq!(df[0], vec![1.0]);
        assert_eq!(df[1], vec![0.0, 1.0]);
        assert_relative_eq!(df[2][0], -k * k / 2.0, max_relative = 1e-14);
        assert_relative_eq!(df[2][1], k * tan_delta, max_relative = 1e-14);
        assert_relative_eq!(
            df[2][2],
            -(1.0 + tan_delta * tan_delta) / 2.0,
            max_relative = 1e-14
        );
    }

    #[test]
    fn coefficients_stop_at_odd_maximum_order() {
        let df = calculate_df_coefficients(3, 2.0, 0.0);
        assert_eq!(df.len(), 4);
        assert_eq!(df[3].len(), 4);
        let df = calculate_df_coefficients(0, 2.0, 0.0);
        assert_eq!(df, vec![vec![1.0]]);
    }

    #[test]
    fn midplane_field_follows_end_field_along_reference_radius() {
        let mut magnet = spiral_magnet(1.0, 3);
        for &(s, expected) in &[(1500.0, 2.0), (2600.0, 2.0), (2050.0, 4.0)] {
            let sample = magnet.evaluate(&element_position(R0, 0.0, s), 0.0).unwrap();
            assert_abs_diff_eq!(sample.magnetic[Dim3::Y], expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn midplane_field_scales_with_radius() {
        let config = ScalingFfaConfig {
            max_order: 4,
            field_index: 7.1,
            bz: 0.8,
            r_min: 3000.0,
            r_max: 5000.0,
            ..ScalingFfaConfig::default()
        };
        let mut magnet =
            ScalingFfaMagnet::new(config, Box::new(Enge::new(vec![0.0, 2.0], 400.0, 20.0))).unwrap();
        let phi_start = magnet.phi_start();
        let fringe = magnet.end_field().function(0.0, 0);
        for &r in &[3500.0, 4000.0, 4600.0] {
            let position = Point3::new(r * phi_start.cos() - R0, 0.0, r * phi_start.sin());
            let sample = magnet.evaluate(&position, 0.0).unwrap();
            let expected = 0.8 * f64::powf(r / R0, 7.1) * fringe;
            assert_relative_eq!(sample.magnetic[Dim3::Y], expected, max_relative = 1e-12);
            assert_abs_diff_eq!(sample.magnetic[Dim3::X], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(sample.magnetic[Dim3::Z], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn positions_outside_aperture_are_out_of_bounds() {
        let mut magnet = spiral_magnet(0.0, 3);
        for &(r, y, s) in &[
            (R0 - 1199.0, 304.0, 1.0),
            (R0 - 1199.0, 304.0, 7149.0),
            (R0 + 1299.0, 304.0, 1.0),
            (R0 + 1299.0, -304.0, 7149.0),
        ] {
            let mut sample = FieldSample::zero();
            assert_eq!(
                magnet.accumulate_field(&element_position(r, y, s), 0.0, &mut sample),
                FieldBounds::Inside,
                "({}, {}, {}) should be inside",
                r,
                y,
                s
            );
        }
        for &(r, y, s) in &[
            (R0 - 1201.0, 304.0, 1.0),
            (R0 - 1199.0, 306.0, 1.0),
            (R0 + 1301.0, -304.0, 7149.0),
            (R0 + 1299.0, -304.0, 7151.0),
        ] {
            let mut sample = FieldSample::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
            assert_eq!(
                magnet.accumulate_field(&element_position(r, y, s), 0.0, &mut sample),
                FieldBounds::OutOfBounds,
                "({}, {}, {}) should be out of bounds",
                r,
                y,
                s
            );
            assert_eq!(
                sample,
                FieldSample::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0))
            );
        }
    }

    #[test]
    fn default_extents_are_derived_from_end_field() {
        let config = ScalingFfaConfig::default();
        let magnet =
            ScalingFfaMagnet::new(config, Box::new(Enge::new(vec![0.0, 2.0], 400.0, 20.0))).unwrap();
        let centre = 800.0 / R0;
        let end = 20.0 / R0;
        assert_relative_eq!(magnet.phi_start(), 0.5 * (4.0 * end + centre), max_relative = 1e-12);
        assert_relative_eq!(magnet.phi_end(), 4.0 * end + centre, max_relative = 1e-12);
        assert_relative_eq!(
            magnet.azimuthal_extent(),
            5.0 * end + 0.5 * centre,
            max_relative = 1e-12
        );
        assert_relative_eq!(magnet.element_length(), 880.0, max_relative = 1e-12);
    }

    #[test]
    fn off_midplane_field_is_divergence_free() {
        let mut magnet = spiral_magnet(0.3, 5);
        // Fringe region off the midplane
        let position = element_position(4100.0, 20.0, 1450.0);
        let mut divergence = 0.0;
        let mut scale = 0.0;
        for dim in Dim3::slice() {
            let derivative = magnet.field_derivative(&position, 0.0, dim).unwrap();
            divergence += derivative.magnetic[dim];
            scale += derivative.magnetic[dim].abs();
        }
        assert!(scale > 0.0);
        assert!(
            divergence.abs() < 1e-2 * scale,
            "divergence {} is not small compared to {}",
            divergence,
            scale
        );
    }

    #[test]
    fn bounding_box_contains_magnet_corners() {
        let magnet = spiral_magnet(0.0, 3);
        let bounding_box = magnet.bounding_box().unwrap();
        for &(r, y, s) in &[
            (R0 - 1199.0, 304.0, 1.0),
            (R0 + 1299.0, -304.0, 7149.0),
            (R0 + 1299.0, 0.0, 3000.0),
        ] {
            assert!(bounding_box.contains(&element_position(r, y, s)));
        }
        assert!(!bounding_box.contains(&element_position(R0, 400.0, 2000.0)));
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = ScalingFfaConfig {
            r_min: 6000.0,
            ..ScalingFfaConfig::default()
        };
        assert!(matches!(
            ScalingFfaMagnet::new(config, Box::new(Tanh::new(100.0, 10.0))),
            Err(TrackingError::InvalidConfig(_))
        ));
    }
}
