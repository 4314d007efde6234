//! Phase space state of a particle.

use super::ftr;
use crate::geometry::{Dim3, Point3, Vec3};
use std::fmt;

/// Number of variables in the state of a particle.
pub const N_STATE_VARIABLES: usize = 8;

/// Flat representation of a particle state used for integration, ordered as
/// `(t, x, y, z, E, px, py, pz)`.
pub type StateVector = [ftr; N_STATE_VARIABLES];

/// Index of the time in a `StateVector`.
pub const TIME_INDEX: usize = 0;
/// Index of the longitudinal coordinate in a `StateVector`.
pub const LONGITUDINAL_INDEX: usize = 3;

/// Time, position, total energy and momentum of a particle.
///
/// Units are ns, mm, MeV and MeV/c.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleState {
    pub time: ftr,
    pub position: Point3<ftr>,
    pub energy: ftr,
    pub momentum: Vec3<ftr>,
}

impl ParticleState {
    pub fn new(time: ftr, position: Point3<ftr>, energy: ftr, momentum: Vec3<ftr>) -> Self {
        Self {
            time,
            position,
            energy,
            momentum,
        }
    }

    /// Creates an on-shell state for a particle of the given mass [MeV/c^2].
    pub fn with_mass(time: ftr, position: Point3<ftr>, momentum: Vec3<ftr>, mass: ftr) -> Self {
        let energy = ftr::sqrt(momentum.squared_length() + mass * mass);
        Self::new(time, position, energy, momentum)
    }

    /// Computes `E^2 - |p|^2`, the squared rest mass for an on-shell state.
    pub fn mass_squared(&self) -> ftr {
        self.energy * self.energy - self.momentum.squared_length()
    }

    /// Computes the kinetic energy [MeV] given the rest mass.
    pub fn kinetic_energy(&self, mass: ftr) -> ftr {
        self.energy - mass
    }

    pub fn to_vector(&self) -> StateVector {
        [
            self.time,
            self.position[Dim3::X],
            self.position[Dim3::Y],
            self.position[Dim3::Z],
            self.energy,
            self.momentum[Dim3::X],
            self.momentum[Dim3::Y],
            self.momentum[Dim3::Z],
        ]
    }

    pub fn from_vector(vector: &StateVector) -> Self {
        Self::new(
            vector[0],
            Point3::new(vector[1], vector[2], vector[3]),
            vector[4],
            Vec3::new(vector[5], vector[6], vector[7]),
        )
    }

    /// Whether all variables are finite.
    pub fn is_finite(&self) -> bool {
        self.to_vector().iter().all(|value| value.is_finite())
    }
}

impl fmt::Display for ParticleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t = {} ns, r = {} mm, E = {} MeV, p = {} MeV/c",
            self.time, self.position, self.energy, self.momentum
        )
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn on_shell_state_has_requested_mass() {
        let state = ParticleState::with_mass(
            0.0,
            Point3::origin(),
            Vec3::new(30.0, -40.0, 120.0),
            938.272,
        );
        assert_relative_eq!(state.mass_squared().sqrt(), 938.272, max_relative = 1e-12);
        assert_eq!(ParticleState::from_vector(&state.to_vector()), state);
        assert!(state.is_finite());
    }
}
