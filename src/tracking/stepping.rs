//! Stepping the particle state with the classical fourth order Runge–Kutta
//! method, with step size adaptation driven by error estimation through
//! step doubling.

use super::{
    equations::MotionEquations,
    ftr,
    state::{StateVector, N_STATE_VARIABLES},
};
use crate::error::TrackingError;

/// Configuration parameters for the Runge–Kutta stepper.
#[derive(Clone, Debug, PartialEq)]
pub struct StepperConfig {
    /// Maximum number of attempts at a step before giving up.
    pub max_step_attempts: u32,
    /// Absolute error tolerance.
    pub absolute_tolerance: ftr,
    /// Relative error tolerance.
    pub relative_tolerance: ftr,
    /// Scaling factor for the error to reduce oscillations.
    pub safety_factor: ftr,
    /// Smallest allowed scaling of the step size in one step.
    pub min_step_scale: ftr,
    /// Largest allowed scaling of the step size in one step.
    pub max_step_scale: ftr,
    /// Start value for error.
    pub initial_error: ftr,
    /// Initial step size [ns or mm, depending on the independent variable].
    pub initial_step_size: ftr,
    /// Whether to adapt the step size. Without adaptation every step has the
    /// initial step size.
    pub use_step_control: bool,
    /// Whether to use Proportional Integral (PI) control for stabilizing the stepping.
    pub use_pi_control: bool,
}

impl StepperConfig {
    pub const DEFAULT_MAX_STEP_ATTEMPTS: u32 = 16;
    pub const DEFAULT_ABSOLUTE_TOLERANCE: ftr = 1e-6;
    pub const DEFAULT_RELATIVE_TOLERANCE: ftr = 1e-6;
    pub const DEFAULT_SAFETY_FACTOR: ftr = 0.9;
    pub const DEFAULT_MIN_STEP_SCALE: ftr = 0.2;
    pub const DEFAULT_MAX_STEP_SCALE: ftr = 10.0;
    pub const DEFAULT_INITIAL_ERROR: ftr = 1e-4;
    pub const DEFAULT_INITIAL_STEP_SIZE: ftr = 1e-3;
    pub const DEFAULT_USE_STEP_CONTROL: bool = true;
    pub const DEFAULT_USE_PI_CONTROL: bool = true;

    /// Checks that the parameters are within their valid ranges.
    pub fn validate(&self) -> Result<(), TrackingError> {
        let check = |valid: bool, message: &str| {
            if valid {
                Ok(())
            } else {
                Err(TrackingError::InvalidConfig(message.to_string()))
            }
        };
        check(
            self.max_step_attempts > 0,
            "Maximum number of step attempts must be larger than zero.",
        )?;
        check(
            self.absolute_tolerance > 0.0,
            "Absolute error tolerance must be larger than zero.",
        )?;
        check(
            self.relative_tolerance >= 0.0,
            "Relative error tolerance must be larger than or equal to zero.",
        )?;
        check(
            self.safety_factor > 0.0 && self.safety_factor <= 1.0,
            "Safety factor must be in the range (0, 1].",
        )?;
        check(
            self.min_step_scale > 0.0,
            "Minimum step scale must be larger than zero.",
        )?;
        check(
            self.max_step_scale >= self.min_step_scale,
            "Maximum step scale must be larger than or equal to the minimum step scale.",
        )?;
        check(
            self.initial_step_size > 0.0 && self.initial_step_size.is_finite(),
            "Initial step size must be larger than zero.",
        )?;
        check(
            self.initial_error > 0.0 && self.initial_error <= 1.0,
            "Initial error must be in the range (0, 1].",
        )
    }
}

impl Default for StepperConfig {
    fn default() -> Self {
        StepperConfig {
            max_step_attempts: Self::DEFAULT_MAX_STEP_ATTEMPTS,
            absolute_tolerance: Self::DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: Self::DEFAULT_RELATIVE_TOLERANCE,
            safety_factor: Self::DEFAULT_SAFETY_FACTOR,
            min_step_scale: Self::DEFAULT_MIN_STEP_SCALE,
            max_step_scale: Self::DEFAULT_MAX_STEP_SCALE,
            initial_error: Self::DEFAULT_INITIAL_ERROR,
            initial_step_size: Self::DEFAULT_INITIAL_STEP_SIZE,
            use_step_control: Self::DEFAULT_USE_STEP_CONTROL,
            use_pi_control: Self::DEFAULT_USE_PI_CONTROL,
        }
    }
}

#[derive(Clone, Debug)]
struct PIControlParams {
    k_i: ftr,
    k_p: ftr,
}

impl PIControlParams {
    fn activated(scheme_order: u8) -> Self {
        let order = ftr::from(scheme_order);
        let k_i = 0.4 / order;
        let k_p = 1.0 / order - 0.75 * k_i;
        PIControlParams { k_i, k_p }
    }

    fn deactivated(scheme_order: u8) -> Self {
        let order = ftr::from(scheme_order);
        let k_i = 0.0;
        let k_p = 1.0 / order;
        PIControlParams { k_i, k_p }
    }
}

#[derive(Clone, Debug)]
enum StepError {
    Acceptable(ftr),
    TooLarge(ftr),
}

/// Outcome of a successful step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    /// Signed change of the independent variable.
    pub step: ftr,
    /// Number of rejected attempts before the step was accepted.
    pub rejected_attempts: u32,
}

/// Classical fourth order Runge–Kutta stepper.
///
/// The error of a step is estimated by comparing one full step with two half
/// steps, and the two half steps are then improved by Richardson
/// extrapolation. The step size is adapted from the error estimate in the
/// same way as for embedded Runge–Kutta–Fehlberg schemes.
#[derive(Clone, Debug)]
pub struct RungeKutta4Stepper {
    config: StepperConfig,
    pi_control: PIControlParams,
    /// Magnitude of the step size to use in the next step.
    step_size: ftr,
    /// The estimated error of the previous accepted step.
    error: ftr,
}

impl RungeKutta4Stepper {
    /// Order of the error estimate after extrapolation.
    const ORDER: u8 = 5;

    /// Creates a new stepper with the given configuration.
    pub fn new(config: StepperConfig) -> Result<Self, TrackingError> {
        config.validate()?;
        let pi_control = if config.use_pi_control {
            PIControlParams::activated(Self::ORDER)
        } else {
            PIControlParams::deactivated(Self::ORDER)
        };
        Ok(Self {
            step_size: config.initial_step_size,
            error: config.initial_error,
            config,
            pi_control,
        })
    }

    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Magnitude of the step size to attempt next.
    pub fn step_size(&self) -> ftr {
        self.step_size
    }

    /// Brings the step size and error back to their initial values.
    pub fn reset(&mut self) {
        self.step_size = self.config.initial_step_size;
        self.error = self.config.initial_error;
    }

    /// Advances `state` towards `target`, the value of the independent
    /// variable at `independent_index` that should be reached, without
    /// stepping past it.
    pub fn step(
        &mut self,
        equations: &mut MotionEquations,
        state: &mut StateVector,
        independent_index: usize,
        target: ftr,
    ) -> Result<StepOutcome, TrackingError> {
        let independent = state[independent_index];
        let remaining = target - independent;
        let direction = if remaining < 0.0 { -1.0 } else { 1.0 };

        if !self.config.use_step_control {
            let step = direction * ftr::min(self.step_size, remaining.abs());
            let next_state = rk4_step(equations, state, step)?;
            if !is_finite(&next_state) || next_state[independent_index] == independent {
                return Err(TrackingError::StepFailed {
                    independent,
                    step_size: step,
                });
            }
            *state = next_state;
            return Ok(StepOutcome {
                step,
                rejected_attempts: 0,
            });
        }

        let mut attempts = 0;
        while attempts < self.config.max_step_attempts {
            let clipped = self.step_size >= remaining.abs();
            let step_size = if clipped {
                remaining.abs()
            } else {
                self.step_size
            };
            let step = direction * step_size;

            let (next_state, error_deltas) = self.attempt_step(equations, state, step)?;
            attempts += 1;

            if next_state[independent_index] == independent {
                // The step no longer changes the independent variable
                break;
            }

            match self.compute_error(state, &next_state, &error_deltas) {
                StepError::Acceptable(new_error) => {
                    let mut new_step_size = self.compute_step_size_accepted(step_size, new_error);

                    // Don't increase step size if the previous attempt was rejected
                    if attempts > 1 && new_step_size > step_size {
                        new_step_size = step_size;
                    }
                    // Keep the unclipped step size when only the target limited the step
                    if clipped && new_step_size < self.step_size {
                        new_step_size = self.step_size;
                    }

                    *state = next_state;
                    self.update_step_size(new_step_size, new_error);
                    return Ok(StepOutcome {
                        step,
                        rejected_attempts: attempts - 1,
                    });
                }
                StepError::TooLarge(new_error) => {
                    let new_step_size = self.compute_step_size_rejected(step_size, new_error);
                    self.step_size = new_step_size;
                }
            }
        }

        Err(TrackingError::StepFailed {
            independent,
            step_size: direction * self.step_size,
        })
    }

    /// Performs one full step and two half steps, returning the
    /// extrapolated state and the error deltas.
    fn attempt_step(
        &self,
        equations: &mut MotionEquations,
        state: &StateVector,
        step: ftr,
    ) -> Result<(StateVector, StateVector), TrackingError> {
        let full = rk4_step(equations, state, step)?;
        let half = rk4_step(equations, state, 0.5 * step)?;
        let double_half = rk4_step(equations, &half, 0.5 * step)?;

        let mut error_deltas = [0.0; N_STATE_VARIABLES];
        let mut extrapolated = double_half;
        for i in 0..N_STATE_VARIABLES {
            error_deltas[i] = (double_half[i] - full[i]) / 15.0;
            extrapolated[i] += error_deltas[i];
        }
        Ok((extrapolated, error_deltas))
    }

    fn compute_error(
        &self,
        state: &StateVector,
        next_state: &StateVector,
        error_deltas: &StateVector,
    ) -> StepError {
        if !is_finite(next_state) {
            return StepError::TooLarge(ftr::INFINITY);
        }
        let squared_error_sum: ftr = (0..N_STATE_VARIABLES)
            .map(|i| {
                let scale = ftr::max(state[i].abs(), next_state[i].abs());
                let error = error_deltas[i]
                    / (self.config.absolute_tolerance + self.config.relative_tolerance * scale);
                error * error
            })
            .sum();
        let error = ftr::sqrt(squared_error_sum / N_STATE_VARIABLES as ftr);

        if error <= 1.0 {
            StepError::Acceptable(error)
        } else {
            StepError::TooLarge(error)
        }
    }

    fn compute_step_size_accepted(&self, step_size: ftr, new_error: ftr) -> ftr {
        let step_scale = if new_error < 1e-9 {
            // Use max step scale directly for very small error to avoid division by zero
            self.config.max_step_scale
        } else {
            let step_scale = self.config.safety_factor * (self.error.powf(self.pi_control.k_i))
                / (new_error.powf(self.pi_control.k_p));
            step_scale.clamp(self.config.min_step_scale, self.config.max_step_scale)
        };
        step_size * step_scale
    }

    fn compute_step_size_rejected(&self, step_size: ftr, new_error: ftr) -> ftr {
        let scale = if new_error.is_finite() {
            ftr::max(
                self.config.safety_factor / (new_error.powf(self.pi_control.k_p)),
                self.config.min_step_scale,
            )
        } else {
            self.config.min_step_scale
        };
        scale * step_size
    }

    fn update_step_size(&mut self, new_step_size: ftr, new_error: ftr) {
        self.step_size = new_step_size;
        self.error = new_error;
    }
}

/// Performs a single classical fourth order Runge–Kutta step.
pub fn rk4_step(
    equations: &mut MotionEquations,
    state: &StateVector,
    step: ftr,
) -> Result<StateVector, TrackingError> {
    let offset = |base: &StateVector, slope: &StateVector, factor: ftr| {
        let mut result = *base;
        for (value, derivative) in result.iter_mut().zip(slope.iter()) {
            *value += factor * derivative;
        }
        result
    };
    let k1 = equations.derivatives(state)?;
    let k2 = equations.derivatives(&offset(state, &k1, 0.5 * step))?;
    let k3 = equations.derivatives(&offset(state, &k2, 0.5 * step))?;
    let k4 = equations.derivatives(&offset(state, &k3, step))?;

    let mut next_state = *state;
    for i in 0..N_STATE_VARIABLES {
        next_state[i] += step / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
    }
    Ok(next_state)
}

fn is_finite(state: &StateVector) -> bool {
    state.iter().all(|value| value.is_finite())
}
