//! RF cavity with a longitudinal fringe field and its off-axis expansion.

use super::{
    ffd,
    rf_cavity::{RfWave, VariableRfCavity},
    FieldBounds, FieldEvaluator, FieldSample,
};
use crate::{
    constants::C_LIGHT,
    end_field::EndFieldModel,
    error::TrackingError,
    geometry::{BoundingBox, Dim3, Point3},
    time_dependence::TimeDependence,
};
use std::sync::Arc;

/// A variable RF cavity whose on-axis field `E_z(0, z) = a(t)*e(z - z_c)*sin(psi(t))`
/// is shaped by an end-field model `e` centred at `z_c`.
///
/// Away from the axis the field is expanded in powers of `y` so that the
/// TM mode (`E_y`, `E_z`, `B_x`) satisfies Maxwell's equations in vacuum up
/// to the maximum power. The coefficient of `y^(2n)` in `E_z` is
/// `a_n = sum_j c_nj*k^(2(n - j))*e^(2j)`, with `k = omega/c`, and the
/// recurrence `a_(n+1) = -(a_n'' + k^2 a_n)/((2n + 1)(2n + 2))`. Then
///
/// - `E_z = sin(psi) sum_n y^(2n) a_n`
/// - `E_y = -sin(psi) sum_n y^(2n+1) a_n'/(2n + 1)`
/// - `B_x = -cos(psi) omega/c^2 sum_n y^(2n+1) a_n/(2n + 1)`
///
/// The field has no dependence on `x`. Bounds are those of the underlying
/// cavity.
#[derive(Clone, Debug)]
pub struct VariableRfCavityFringeField {
    cavity: VariableRfCavity,
    cavity_centre: ffd,
    max_order: usize,
    end_field: Box<dyn EndFieldModel>,
    coefficients: Arc<Vec<Vec<ffd>>>,
}

impl VariableRfCavityFringeField {
    /// Creates a new fringe-field cavity.
    ///
    /// # Parameters
    ///
    /// - `cavity`: Cavity giving the dimensions and time dependences.
    /// - `cavity_centre`: Offset of the field centre from the start of the cavity [mm].
    /// - `max_order`: Highest power of `y` kept in the expansion.
    /// - `end_field`: Longitudinal shape of the on-axis field, in millimeters.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the new cavity.
    /// - `Err`: The cavity centre is not finite.
    pub fn new(
        cavity: VariableRfCavity,
        cavity_centre: ffd,
        max_order: usize,
        end_field: Box<dyn EndFieldModel>,
    ) -> Result<Self, TrackingError> {
        if !cavity_centre.is_finite() {
            return Err(TrackingError::InvalidConfig(format!(
                "cavity centre must be finite, got {}",
                cavity_centre
            )));
        }
        Ok(Self {
            cavity,
            cavity_centre,
            max_order,
            end_field,
            coefficients: Arc::new(compute_expansion_coefficients(max_order)),
        })
    }

    pub fn cavity(&self) -> &VariableRfCavity {
        &self.cavity
    }

    pub fn cavity_centre(&self) -> ffd {
        self.cavity_centre
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    pub fn end_field(&self) -> &dyn EndFieldModel {
        self.end_field.as_ref()
    }

    /// Coefficients `c_nj` of the `E_z` expansion, indexed by `n` then `j`.
    pub fn coefficients(&self) -> &[Vec<ffd>] {
        &self.coefficients
    }

    pub fn set_max_order(&mut self, max_order: usize) {
        self.max_order = max_order;
        self.coefficients = Arc::new(compute_expansion_coefficients(max_order));
    }

    pub fn set_end_field(&mut self, end_field: Box<dyn EndFieldModel>) {
        self.end_field = end_field;
    }

    pub fn set_amplitude_model(&mut self, amplitude: Arc<dyn TimeDependence>) {
        self.cavity.set_amplitude_model(amplitude);
    }

    pub fn set_frequency_model(&mut self, frequency: Arc<dyn TimeDependence>) {
        self.cavity.set_frequency_model(frequency);
    }

    pub fn set_phase_model(&mut self, phase: Arc<dyn TimeDependence>) {
        self.cavity.set_phase_model(phase);
    }

    fn compute_field(&self, position: &Point3<ffd>, wave: &RfWave, sample: &mut FieldSample) {
        let y = position[Dim3::Y];
        let z = position[Dim3::Z] - self.cavity_centre;
        let k = wave.angular_frequency / C_LIGHT;
        let k2 = k * k;

        let mut ez = 0.0;
        let mut ey = 0.0;
        let mut bx = 0.0;
        let mut y_power = 1.0;
        for (n, coefficients) in self.coefficients.iter().enumerate() {
            let mut a_n = 0.0;
            let mut da_n = 0.0;
            let mut k_power = 1.0;
            for (j, &coefficient) in coefficients.iter().enumerate().rev() {
                if coefficient != 0.0 {
                    a_n += coefficient * k_power * self.end_field.function(z, 2 * j);
                    da_n += coefficient * k_power * self.end_field.function(z, 2 * j + 1);
                }
                k_power *= k2;
            }
            ez += y_power * a_n;
            if 2 * n + 1 <= self.max_order {
                let odd_power = y_power * y / ((2 * n + 1) as ffd);
                ey -= odd_power * da_n;
                bx -= odd_power * a_n;
            }
            y_power *= y * y;
        }

        let sin_phase = ffd::sin(wave.phase);
        let cos_phase = ffd::cos(wave.phase);
        sample.electric[Dim3::Y] += wave.amplitude * sin_phase * ey;
        sample.electric[Dim3::Z] += wave.amplitude * sin_phase * ez;
        sample.magnetic[Dim3::X] +=
            wave.amplitude * cos_phase * wave.angular_frequency / (C_LIGHT * C_LIGHT) * bx;
    }
}

/// Computes the coefficients `c_nj` for `n = 0..=max_order/2`.
///
/// They follow from `c_00 = 1` and
/// `c_(n+1)j = -(c_n(j-1) + c_nj)/((2n + 1)(2n + 2))`, and do not depend on
/// the frequency.
fn compute_expansion_coefficients(max_order: usize) -> Vec<Vec<ffd>> {
    let mut coefficients = vec![vec![1.0]];
    for n in 0..max_order / 2 {
        let previous = &coefficients[n];
        let denominator = ((2 * n + 1) * (2 * n + 2)) as ffd;
        let next = (0..=previous.len())
            .map(|j| {
                let lower = if j > 0 { previous[j - 1] } else { 0.0 };
                let same = previous.get(j).copied().unwrap_or(0.0);
                -(lower + same) / denominator
            })
            .collect();
        coefficients.push(next);
    }
    coefficients
}

impl FieldEvaluator for VariableRfCavityFringeField {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        if !self.cavity.is_inside(position) {
            return FieldBounds::OutOfBounds;
        }
        let wave = self.cavity.wave(time);
        self.compute_field(position, &wave, sample);
        FieldBounds::Inside
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.cavity.bounding_box()
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }

    fn reset(&mut self) {
        self.cavity.reset();
    }
}
