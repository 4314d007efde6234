//! Command line interface for the Runge–Kutta stepper and the integrator.

use super::utils;
use crate::tracking::{stepping::StepperConfig, IntegratorConfig};
use clap::{Arg, ArgMatches, Command};

/// Adds arguments for parameters used by the stepper and the integrator.
pub fn add_integrator_arguments_to_subcommand(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("max-steps")
                .long("max-steps")
                .value_name("NUMBER")
                .help("Maximum number of steps before terminating")
                .next_line_help(true)
                .takes_value(true)
                .default_value("10000000"),
        )
        .arg(
            Arg::new("target-tolerance")
                .long("target-tolerance")
                .value_name("VALUE")
                .help("How close the independent variable must come to the target")
                .next_line_help(true)
                .takes_value(true)
                .default_value("1e-6"),
        )
        .arg(
            Arg::new("max-step-attempts")
                .long("max-step-attempts")
                .value_name("NUMBER")
                .help("Maximum number of step attempts before terminating")
                .next_line_help(true)
                .takes_value(true)
                .default_value("16"),
        )
        .arg(
            Arg::new("stepping-absolute-tolerance")
                .long("stepping-absolute-tolerance")
                .value_name("VALUE")
                .help("Absolute error tolerance for stepping")
                .next_line_help(true)
                .takes_value(true)
                .default_value("1e-6"),
        )
        .arg(
            Arg::new("stepping-relative-tolerance")
                .long("stepping-relative-tolerance")
                .value_name("VALUE")
                .help("Relative error tolerance for stepping")
                .next_line_help(true)
                .takes_value(true)
                .default_value("1e-6"),
        )
        .arg(
            Arg::new("stepping-safety-factor")
                .long("stepping-safety-factor")
                .value_name("VALUE")
                .help("Scaling factor for the error to reduce step size oscillations")
                .next_line_help(true)
                .takes_value(true)
                .default_value("0.9"),
        )
        .arg(
            Arg::new("min-step-scale")
                .long("min-step-scale")
                .value_name("VALUE")
                .help("Smallest allowed scaling of the step size in one step")
                .next_line_help(true)
                .takes_value(true)
                .default_value("0.2"),
        )
        .arg(
            Arg::new("max-step-scale")
                .long("max-step-scale")
                .value_name("VALUE")
                .help("Largest allowed scaling of the step size in one step")
                .next_line_help(true)
                .takes_value(true)
                .default_value("10.0"),
        )
        .arg(
            Arg::new("stepping-initial-error")
                .long("stepping-initial-error")
                .value_name("VALUE")
                .help("Start value for stepping error")
                .next_line_help(true)
                .takes_value(true)
                .default_value("1e-4"),
        )
        .arg(
            Arg::new("initial-step-size")
                .long("initial-step-size")
                .value_name("VALUE")
                .help("Initial step size [ns or mm]")
                .next_line_help(true)
                .takes_value(true)
                .default_value("1e-3"),
        )
        .arg(
            Arg::new("step-control")
                .long("step-control")
                .value_name("STATE")
                .help("Whether to adapt the step size (fixed steps of the initial size when off)")
                .next_line_help(true)
                .takes_value(true)
                .possible_values(["off", "on"])
                .default_value("on"),
        )
        .arg(
            Arg::new("pi-control")
                .long("pi-control")
                .value_name("STATE")
                .help("Whether to use Proportional Integral (PI) control for stabilizing the stepping")
                .next_line_help(true)
                .takes_value(true)
                .possible_values(["off", "on"])
                .default_value("on"),
        )
}

/// Sets stepper parameters based on present arguments.
pub fn configure_stepper_from_arguments(config: &mut StepperConfig, arguments: &ArgMatches) {
    utils::assign_value_from_parseable_argument(
        &mut config.max_step_attempts,
        arguments,
        "max-step-attempts",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.absolute_tolerance,
        arguments,
        "stepping-absolute-tolerance",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.relative_tolerance,
        arguments,
        "stepping-relative-tolerance",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.safety_factor,
        arguments,
        "stepping-safety-factor",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.min_step_scale,
        arguments,
        "min-step-scale",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.max_step_scale,
        arguments,
        "max-step-scale",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.initial_error,
        arguments,
        "stepping-initial-error",
    );
    utils::assign_value_from_parseable_argument(
        &mut config.initial_step_size,
        arguments,
        "initial-step-size",
    );
    utils::assign_value_from_selected_argument(
        &mut config.use_step_control,
        arguments,
        "step-control",
        &["off", "on"],
        &[false, true],
    );
    utils::assign_value_from_selected_argument(
        &mut config.use_pi_control,
        arguments,
        "pi-control",
        &["off", "on"],
        &[false, true],
    );
}

/// Creates an integrator configuration based on present arguments.
pub fn construct_integrator_config_from_arguments(arguments: &ArgMatches) -> IntegratorConfig {
    let mut config = IntegratorConfig::default();
    utils::assign_value_from_parseable_argument(&mut config.max_steps, arguments, "max-steps");
    utils::assign_value_from_parseable_argument(
        &mut config.tolerance,
        arguments,
        "target-tolerance",
    );
    configure_stepper_from_arguments(&mut config.stepper, arguments);
    config
}
