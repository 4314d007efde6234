//! Integrating the motion of charged particles through accelerator fields.

pub mod equations;
pub mod state;
pub mod stepping;

use self::{
    equations::MotionEquations,
    state::{ParticleState, LONGITUDINAL_INDEX, TIME_INDEX},
    stepping::{RungeKutta4Stepper, StepperConfig},
};
use crate::{error::TrackingError, field::FieldEvaluator};
use log::{debug, warn};
use rayon::prelude::*;

/// Floating-point precision to use for tracking.
#[allow(non_camel_case_types)]
pub type ftr = f64;

/// Variable with respect to which the equations of motion are integrated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndependentVariable {
    /// Time [ns].
    Time,
    /// Longitudinal coordinate `z` [mm].
    LongitudinalPosition,
}

impl IndependentVariable {
    /// Index of the variable in a `StateVector`.
    pub fn state_index(&self) -> usize {
        match self {
            Self::Time => TIME_INDEX,
            Self::LongitudinalPosition => LONGITUDINAL_INDEX,
        }
    }
}

/// Configuration parameters for particle integration.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegratorConfig {
    /// Maximum number of steps before the integration is given up.
    pub max_steps: usize,
    /// How close the independent variable must come to its target.
    pub tolerance: ftr,
    /// Configuration of the Runge–Kutta stepper.
    pub stepper: StepperConfig,
}

impl IntegratorConfig {
    pub const DEFAULT_MAX_STEPS: usize = 10_000_000;
    pub const DEFAULT_TOLERANCE: ftr = 1e-6;

    /// Largest negative value of `E^2 - p^2` [MeV^2] accepted as a massless
    /// particle.
    pub const MASS_SQUARED_TOLERANCE: ftr = 1e-6;

    /// Checks that the parameters are within their valid ranges.
    pub fn validate(&self) -> Result<(), TrackingError> {
        if self.max_steps == 0 {
            return Err(TrackingError::InvalidConfig(
                "Maximum number of steps must be larger than zero.".to_string(),
            ));
        }
        if !(self.tolerance > 0.0) {
            return Err(TrackingError::InvalidConfig(
                "Target tolerance must be larger than zero.".to_string(),
            ));
        }
        self.stepper.validate()
    }
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig {
            max_steps: Self::DEFAULT_MAX_STEPS,
            tolerance: Self::DEFAULT_TOLERANCE,
            stepper: StepperConfig::default(),
        }
    }
}

/// Summary of a successful integration.
#[derive(Clone, Debug, PartialEq)]
pub struct IntegrationReport {
    /// Number of accepted steps.
    pub steps: usize,
    /// Total number of rejected step attempts.
    pub rejected_attempts: usize,
    /// Step size the stepper would have attempted next.
    pub final_step_size: ftr,
    /// Whether the particle left the domain of the field at some point.
    pub out_of_bounds_encountered: bool,
    /// Rest mass [MeV/c^2] derived from the initial state.
    pub mass: ftr,
}

/// Integrates particles of a given charge through the field of an evaluator.
#[derive(Clone, Debug)]
pub struct ParticleIntegrator {
    config: IntegratorConfig,
    charge: ftr,
}

impl ParticleIntegrator {
    /// Creates a new integrator for particles with the given charge, in units
    /// of the elementary charge.
    pub fn new(config: IntegratorConfig, charge: ftr) -> Result<Self, TrackingError> {
        config.validate()?;
        Ok(Self { config, charge })
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn charge(&self) -> ftr {
        self.charge
    }

    /// Integrates the state of a particle until the independent variable
    /// reaches the given target.
    ///
    /// # Parameters
    ///
    /// - `variable`: Variable to integrate with respect to.
    /// - `target`: Value of the independent variable to reach [ns or mm].
    /// - `state`: State of the particle, which will be updated in place.
    /// - `evaluator`: Field to move the particle through.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains an `IntegrationReport` summarizing the integration.
    /// - `Err`: Contains a `TrackingError` telling why the integration was
    /// terminated. The state is left at the last accepted step.
    pub fn integrate(
        &self,
        variable: IndependentVariable,
        target: ftr,
        state: &mut ParticleState,
        evaluator: &mut dyn FieldEvaluator,
    ) -> Result<IntegrationReport, TrackingError> {
        let mass = Self::compute_mass(state)?;

        let mut stepper = RungeKutta4Stepper::new(self.config.stepper.clone())?;
        let mut equations = MotionEquations::new(evaluator, self.charge, variable);
        let independent_index = variable.state_index();
        let mut vector = state.to_vector();

        let mut steps = 0;
        let mut rejected_attempts = 0;

        let result = loop {
            if (vector[independent_index] - target).abs() <= self.config.tolerance {
                break Ok(());
            }
            steps += 1;
            if steps > self.config.max_steps {
                break Err(TrackingError::NonConvergent {
                    steps,
                    max_steps: self.config.max_steps,
                    independent: vector[independent_index],
                    step_size: stepper.step_size(),
                    state: ParticleState::from_vector(&vector),
                });
            }
            match stepper.step(&mut equations, &mut vector, independent_index, target) {
                Ok(outcome) => rejected_attempts += outcome.rejected_attempts as usize,
                Err(err) => break Err(err),
            }
        };

        *state = ParticleState::from_vector(&vector);
        result?;

        let report = IntegrationReport {
            steps,
            rejected_attempts,
            final_step_size: stepper.step_size(),
            out_of_bounds_encountered: equations.out_of_bounds_encountered(),
            mass,
        };
        debug!(
            "Integrated to {:?} = {} in {} steps ({} rejected), final step size {}",
            variable, target, report.steps, report.rejected_attempts, report.final_step_size
        );
        Ok(report)
    }

    /// Integrates the states of many particles in parallel.
    ///
    /// Every particle is integrated with its own clone of the evaluator. A
    /// failed particle is logged and does not affect the others.
    pub fn integrate_ensemble(
        &self,
        variable: IndependentVariable,
        target: ftr,
        states: &mut [ParticleState],
        evaluator: &dyn FieldEvaluator,
    ) -> Vec<Result<IntegrationReport, TrackingError>> {
        let mut evaluators: Vec<_> = (0..states.len()).map(|_| evaluator.clone_box()).collect();
        states
            .par_iter_mut()
            .zip(evaluators.par_iter_mut())
            .enumerate()
            .map(|(idx, (state, evaluator))| {
                let result = self.integrate(variable, target, state, evaluator.as_mut());
                if let Err(err) = &result {
                    warn!("Particle {} was killed: {}", idx, err);
                }
                result
            })
            .collect()
    }

    fn compute_mass(state: &ParticleState) -> Result<ftr, TrackingError> {
        let mass_squared = state.mass_squared();
        if !mass_squared.is_finite() || mass_squared < -IntegratorConfig::MASS_SQUARED_TOLERANCE
        {
            return Err(TrackingError::UnphysicalState { mass_squared });
        }
        Ok(ftr::sqrt(ftr::max(mass_squared, 0.0)))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{
        constants::{C_LIGHT, M_PROTON, TWO_PI},
        field::uniform::UniformField,
        geometry::{Dim3, Point3, Vec3},
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn proton(momentum: Vec3<ftr>) -> ParticleState {
        ParticleState::with_mass(0.0, Point3::origin(), momentum, M_PROTON)
    }

    #[test]
    fn straight_line_in_time() {
        let integrator = ParticleIntegrator::new(IntegratorConfig::default(), 1.0).unwrap();
        let mut field = UniformField::new(Vec3::zero(), Vec3::zero());
        let mut state = proton(Vec3::new(0.0, 0.0, 100.0));
        let energy = state.energy;
        let report = integrator
            .integrate(IndependentVariable::Time, 10.0, &mut state, &mut field)
            .unwrap();
        assert!(report.steps > 0);
        assert!(!report.out_of_bounds_encountered);
        assert_relative_eq!(report.mass, M_PROTON, max_relative = 1e-10);
        assert_abs_diff_eq!(state.time, 10.0, epsilon = 1e-6);
        assert_relative_eq!(
            state.position[Dim3::Z],
            10.0 * C_LIGHT * 100.0 / energy,
            max_relative = 1e-6
        );
        assert_eq!(state.energy, energy);
    }

    #[test]
    fn straight_line_in_longitudinal_position() {
        let integrator = ParticleIntegrator::new(IntegratorConfig::default(), 1.0).unwrap();
        let mut field = UniformField::new(Vec3::zero(), Vec3::zero());
        let mut state = proton(Vec3::new(10.0, 0.0, 100.0));
        let energy = state.energy;
        integrator
            .integrate(
                IndependentVariable::LongitudinalPosition,
                500.0,
                &mut state,
                &mut field,
            )
            .unwrap();
        assert_abs_diff_eq!(state.position, Point3::new(50.0, 0.0, 500.0), epsilon = 1e-5);
        assert_relative_eq!(
            state.time,
            500.0 * energy / (C_LIGHT * 100.0),
            max_relative = 1e-6
        );
    }

    #[test]
    fn gyration_closes_after_one_period() {
        let config = IntegratorConfig {
            stepper: StepperConfig {
                absolute_tolerance: 1e-9,
                relative_tolerance: 1e-9,
                ..StepperConfig::default()
            },
            ..IntegratorConfig::default()
        };
        let integrator = ParticleIntegrator::new(config, 1.0).unwrap();
        let mut field = UniformField::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
        let mut state = proton(Vec3::new(100.0, 0.0, 0.0));
        let energy = state.energy;
        let angular_frequency = C_LIGHT * C_LIGHT * 1e-3 / energy;
        let period = TWO_PI / angular_frequency;
        integrator
            .integrate(IndependentVariable::Time, period, &mut state, &mut field)
            .unwrap();
        // Radius is about 334 mm
        assert_abs_diff_eq!(state.position, Point3::origin(), epsilon = 1e-3);
        assert_abs_diff_eq!(state.momentum, Vec3::new(100.0, 0.0, 0.0), epsilon = 1e-3);
        assert_relative_eq!(state.energy, energy);
    }

    #[test]
    fn unphysical_state_fails_before_stepping() {
        let integrator = ParticleIntegrator::new(IntegratorConfig::default(), 1.0).unwrap();
        let mut field = UniformField::new(Vec3::zero(), Vec3::zero());
        let mut state = ParticleState::new(0.0, Point3::origin(), 1.0, Vec3::new(0.0, 0.0, 10.0));
        let initial_state = state.clone();
        let result = integrator.integrate(IndependentVariable::Time, 1.0, &mut state, &mut field);
        assert!(matches!(
            result,
            Err(TrackingError::UnphysicalState { mass_squared }) if mass_squared == -99.0
        ));
        assert_eq!(state, initial_state);
    }

    #[test]
    fn slightly_negative_mass_squared_gives_massless_particle() {
        let integrator = ParticleIntegrator::new(IntegratorConfig::default(), 1.0).unwrap();
        let mut field = UniformField::new(Vec3::zero(), Vec3::zero());
        let mut state =
            ParticleState::new(0.0, Point3::origin(), 10.0, Vec3::new(0.0, 0.0, 10.00000001));
        let report = integrator
            .integrate(IndependentVariable::Time, 1.0, &mut state, &mut field)
            .unwrap();
        assert_eq!(report.mass, 0.0);
    }

    #[test]
    fn step_limit_gives_non_convergent_error() {
        let config = IntegratorConfig {
            max_steps: 2,
            stepper: StepperConfig {
                use_step_control: false,
                initial_step_size: 1e-3,
                ..StepperConfig::default()
            },
            ..IntegratorConfig::default()
        };
        let integrator = ParticleIntegrator::new(config, 1.0).unwrap();
        let mut field = UniformField::new(Vec3::zero(), Vec3::zero());
        let mut state = proton(Vec3::new(0.0, 0.0, 100.0));
        match integrator.integrate(IndependentVariable::Time, 1.0, &mut state, &mut field) {
            Err(TrackingError::NonConvergent {
                steps,
                max_steps,
                independent,
                ..
            }) => {
                assert_eq!(steps, 3);
                assert_eq!(max_steps, 2);
                assert_relative_eq!(independent, 2e-3);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert_relative_eq!(state.time, 2e-3);
    }

    #[test]
    fn ensemble_continues_after_failed_particle() {
        let integrator = ParticleIntegrator::new(IntegratorConfig::default(), 1.0).unwrap();
        let field = UniformField::new(Vec3::zero(), Vec3::new(0.0, 0.0, 0.5));
        let mut states = vec![
            proton(Vec3::new(100.0, 0.0, 0.0)),
            ParticleState::new(0.0, Point3::origin(), 1.0, Vec3::new(5.0, 0.0, 0.0)),
            proton(Vec3::new(0.0, 50.0, 0.0)),
        ];
        let results =
            integrator.integrate_ensemble(IndependentVariable::Time, 5.0, &mut states, &field);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(TrackingError::UnphysicalState { .. })
        ));
        assert!(results[2].is_ok());
        assert_abs_diff_eq!(states[0].time, 5.0, epsilon = 1e-6);
        assert_eq!(states[1].time, 0.0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = IntegratorConfig {
            max_steps: 0,
            ..IntegratorConfig::default()
        };
        assert!(matches!(
            ParticleIntegrator::new(config, 1.0),
            Err(TrackingError::InvalidConfig(_))
        ));
    }
}
