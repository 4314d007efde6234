//! Relativistic equations of motion of a charged particle.

use super::{
    ftr,
    state::{StateVector, N_STATE_VARIABLES},
    IndependentVariable,
};
use crate::{
    constants::{C_LIGHT, MV_PER_M_TO_MV_PER_MM, TESLA_TO_KILOTESLA},
    error::TrackingError,
    field::{FieldEvaluator, FieldSample},
    geometry::{Dim3, Point3, Vec3},
};

/// Smallest longitudinal momentum [MeV/c] allowed when the longitudinal
/// coordinate is the independent variable.
pub const MIN_LONGITUDINAL_MOMENTUM: ftr = 1e-9;

/// Derivatives of the particle state with respect to the independent
/// variable, for a particle of the given charge moving through the field of
/// an evaluator.
///
/// The charge is in units of the elementary charge. Positions where the
/// evaluator has no field contribute zero field; whether this happened is
/// recorded and can be queried afterwards.
pub struct MotionEquations<'a> {
    evaluator: &'a mut dyn FieldEvaluator,
    charge: ftr,
    variable: IndependentVariable,
    out_of_bounds_encountered: bool,
}

impl<'a> MotionEquations<'a> {
    pub fn new(
        evaluator: &'a mut dyn FieldEvaluator,
        charge: ftr,
        variable: IndependentVariable,
    ) -> Self {
        Self {
            evaluator,
            charge,
            variable,
            out_of_bounds_encountered: false,
        }
    }

    pub fn variable(&self) -> IndependentVariable {
        self.variable
    }

    /// Whether any field query so far was outside the domain of the
    /// evaluator.
    pub fn out_of_bounds_encountered(&self) -> bool {
        self.out_of_bounds_encountered
    }

    /// Queries the field at the position and time of the given state,
    /// converted to MV/mm and kT.
    fn field_at(&mut self, state: &StateVector) -> (Vec3<ftr>, Vec3<ftr>) {
        let position = Point3::new(state[1], state[2], state[3]);
        let mut sample = FieldSample::zero();
        if !self
            .evaluator
            .accumulate_field(&position, state[0], &mut sample)
            .is_inside()
        {
            self.out_of_bounds_encountered = true;
        }
        (
            &sample.electric * MV_PER_M_TO_MV_PER_MM,
            &sample.magnetic * TESLA_TO_KILOTESLA,
        )
    }

    /// Computes the derivatives of `(t, x, y, z, E, px, py, pz)` with respect
    /// to the independent variable.
    pub fn derivatives(&mut self, state: &StateVector) -> Result<StateVector, TrackingError> {
        let (electric, magnetic) = self.field_at(state);
        let energy = state[4];
        let momentum = Vec3::new(state[5], state[6], state[7]);
        let q = self.charge;

        let (dt, velocity) = match self.variable {
            IndependentVariable::Time => (1.0, &momentum * (C_LIGHT / energy)),
            IndependentVariable::LongitudinalPosition => {
                let pz = state[7];
                if !(pz.abs() >= MIN_LONGITUDINAL_MOMENTUM) {
                    return Err(TrackingError::ZeroLongitudinalMomentum { pz });
                }
                (energy / (C_LIGHT * pz), &momentum / pz)
            }
        };

        let force = &velocity.cross(&magnetic) + &(&electric * dt);
        let mut derivatives = [0.0; N_STATE_VARIABLES];
        derivatives[0] = dt;
        derivatives[1] = velocity[Dim3::X];
        derivatives[2] = velocity[Dim3::Y];
        derivatives[3] = velocity[Dim3::Z];
        derivatives[4] = q * electric.dot(&velocity);
        derivatives[5] = q * C_LIGHT * force[Dim3::X];
        derivatives[6] = q * C_LIGHT * force[Dim3::Y];
        derivatives[7] = q * C_LIGHT * force[Dim3::Z];
        Ok(derivatives)
    }
}
