//! Error types and error handling macros.

use crate::tracking::state::ParticleState;
use thiserror::Error;

/// Errors that can terminate the integration of a particle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackingError {
    #[error("unphysical particle state: E^2 - p^2 = {mass_squared} MeV^2 is negative or not finite")]
    UnphysicalState { mass_squared: f64 },
    #[error("longitudinal momentum {pz} MeV/c is too small to step in z")]
    ZeroLongitudinalMomentum { pz: f64 },
    #[error("step failed at independent variable {independent} with step size {step_size}")]
    StepFailed { independent: f64, step_size: f64 },
    #[error(
        "integration did not reach its target after {steps} steps (limit {max_steps}); \
         independent variable {independent}, step size {step_size}, state {state}"
    )]
    NonConvergent {
        steps: usize,
        max_steps: usize,
        independent: f64,
        step_size: f64,
        state: ParticleState,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(not(feature = "for-testing"))]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        eprintln!($($print_arg)*);
        quit::with_code(1);
    }};
}

#[cfg(feature = "for-testing")]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        panic!($($print_arg)*);
    }};
}

#[macro_export]
macro_rules! exit_on_error {
    ($result:expr, $($print_arg:tt)*) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::exit_with_error!($($print_arg)*, err)
            }
        }
    };
}

#[macro_export]
macro_rules! exit_on_false {
    ($logic:expr, $($print_arg:tt)*) => {
        if $logic {
            true
        } else {
            $crate::exit_with_error!($($print_arg)*)
        }
    };
}

#[macro_export]
macro_rules! exit_on_none {
    ($option:expr, $($print_arg:tt)*) => {
        $option.unwrap_or_else(|| $crate::exit_with_error!($($print_arg)*))
    };
}
