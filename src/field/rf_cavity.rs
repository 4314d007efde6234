//! RF cavity with time dependent amplitude, frequency and phase.

use super::{ffd, FieldBounds, FieldEvaluator, FieldSample};
use crate::{
    constants::{MHZ_NS_TO_CYCLES, TWO_PI},
    error::TrackingError,
    geometry::{BoundingBox, Dim3, Point3},
    time_dependence::{TimeDependence, TimeDependenceCache},
};
use std::sync::Arc;

/// State of the RF wave at an instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RfWave {
    /// Peak electric field [MV/m].
    pub amplitude: ffd,
    /// Angular frequency [rad/ns].
    pub angular_frequency: ffd,
    /// Total phase of the wave [rad].
    pub phase: ffd,
}

/// A box-shaped cavity with a uniform longitudinal electric field
/// `E_z = a(t)*sin(2*pi*int_0^t f(t') dt' + phi(t))`.
///
/// The amplitude `a` is in MV/m, the frequency `f` in MHz and the phase
/// `phi` in radians, all as functions of time in nanoseconds. The cavity
/// spans `|x| <= width/2`, `|y| <= height/2` and `0 <= z <= length`, with
/// boundaries included.
#[derive(Clone, Debug)]
pub struct VariableRfCavity {
    length: ffd,
    half_width: ffd,
    half_height: ffd,
    amplitude: TimeDependenceCache,
    frequency: TimeDependenceCache,
    phase: TimeDependenceCache,
}

impl VariableRfCavity {
    /// Creates a new cavity with the given dimensions [mm] and time
    /// dependences.
    pub fn new(
        length: ffd,
        width: ffd,
        height: ffd,
        amplitude: Arc<dyn TimeDependence>,
        frequency: Arc<dyn TimeDependence>,
        phase: Arc<dyn TimeDependence>,
    ) -> Result<Self, TrackingError> {
        if !(length >= 0.0 && width >= 0.0 && height >= 0.0) {
            return Err(TrackingError::InvalidConfig(format!(
                "cavity dimensions must be non-negative, got {} x {} x {}",
                width, height, length
            )));
        }
        Ok(Self {
            length,
            half_width: 0.5 * width,
            half_height: 0.5 * height,
            amplitude: TimeDependenceCache::with_time_dependence(amplitude),
            frequency: TimeDependenceCache::with_time_dependence(frequency),
            phase: TimeDependenceCache::with_time_dependence(phase),
        })
    }

    pub fn length(&self) -> ffd {
        self.length
    }

    pub fn width(&self) -> ffd {
        2.0 * self.half_width
    }

    pub fn height(&self) -> ffd {
        2.0 * self.half_height
    }

    pub fn amplitude_model(&self) -> Option<&Arc<dyn TimeDependence>> {
        self.amplitude.time_dependence()
    }

    pub fn frequency_model(&self) -> Option<&Arc<dyn TimeDependence>> {
        self.frequency.time_dependence()
    }

    pub fn phase_model(&self) -> Option<&Arc<dyn TimeDependence>> {
        self.phase.time_dependence()
    }

    pub fn set_amplitude_model(&mut self, amplitude: Arc<dyn TimeDependence>) {
        self.amplitude.set_time_dependence(amplitude);
    }

    pub fn set_frequency_model(&mut self, frequency: Arc<dyn TimeDependence>) {
        self.frequency.set_time_dependence(frequency);
    }

    pub fn set_phase_model(&mut self, phase: Arc<dyn TimeDependence>) {
        self.phase.set_time_dependence(phase);
    }

    /// Evaluates the amplitude, angular frequency and phase of the wave at
    /// the given time.
    pub fn wave(&mut self, time: ffd) -> RfWave {
        let cycles = MHZ_NS_TO_CYCLES * self.frequency.integral(time);
        RfWave {
            amplitude: self.amplitude.value(time),
            angular_frequency: TWO_PI * MHZ_NS_TO_CYCLES * self.frequency.value(time),
            phase: TWO_PI * cycles + self.phase.value(time),
        }
    }

    /// Computes the longitudinal electric field [MV/m] at the given time.
    pub fn longitudinal_field(&mut self, time: ffd) -> ffd {
        let wave = self.wave(time);
        wave.amplitude * ffd::sin(wave.phase)
    }

    pub(super) fn is_inside(&self, position: &Point3<ffd>) -> bool {
        position[Dim3::Z] >= 0.0
            && position[Dim3::Z] <= self.length
            && position[Dim3::X].abs() <= self.half_width
            && position[Dim3::Y].abs() <= self.half_height
    }
}

impl FieldEvaluator for VariableRfCavity {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        if !self.is_inside(position) {
            return FieldBounds::OutOfBounds;
        }
        sample.electric[Dim3::Z] += self.longitudinal_field(time);
        FieldBounds::Inside
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(
            &Point3::new(-self.half_width, -self.half_height, 0.0),
            &Point3::new(self.half_width, self.half_height, self.length),
        ))
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }

    fn reset(&mut self) {
        self.amplitude.reset();
        self.frequency.reset();
        self.phase.reset();
    }
}
