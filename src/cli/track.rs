//! Command line interface for tracking a single particle.

use super::{element, stepping, utils};
use crate::{
    constants::M_PROTON,
    exit_on_error, exit_on_false,
    geometry::Vec3,
    tracking::{state::ParticleState, IndependentVariable, ParticleIntegrator},
};
use clap::{Arg, ArgMatches, Command};
use log::info;

/// Creates a subcommand for tracking a particle through a field element.
pub fn create_track_subcommand() -> Command<'static> {
    let command = Command::new("track")
        .about("Track a particle through an accelerator element")
        .arg(
            Arg::new("target")
                .value_name("TARGET")
                .help("Value of the independent variable to integrate to [ns or mm]")
                .required(true)
                .allow_hyphen_values(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("independent-variable")
                .long("independent-variable")
                .value_name("NAME")
                .help("Variable to integrate with respect to")
                .takes_value(true)
                .possible_values(["time", "z"])
                .default_value("time"),
        )
        .arg(
            Arg::new("momentum")
                .long("momentum")
                .value_name("PX,PY,PZ")
                .help("Initial momentum of the particle [MeV/c]")
                .required(true)
                .takes_value(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .number_of_values(3)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("position")
                .long("position")
                .value_name("X,Y,Z")
                .help("Initial position of the particle [mm] [default: 0,0,0]")
                .takes_value(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .number_of_values(3)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("time")
                .long("time")
                .value_name("VALUE")
                .help("Initial time [ns]")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.0"),
        )
        .arg(
            Arg::new("mass")
                .long("mass")
                .value_name("VALUE")
                .help("Rest mass of the particle [MeV/c^2] [default: proton mass]")
                .takes_value(true),
        )
        .arg(
            Arg::new("charge")
                .long("charge")
                .value_name("VALUE")
                .help("Charge of the particle [elementary charges]")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0"),
        );
    let command = element::add_element_arguments_to_subcommand(command);
    stepping::add_integrator_arguments_to_subcommand(command)
}

/// Runs the actions for the `track` subcommand using the given arguments.
pub fn run_track_subcommand(arguments: &ArgMatches) {
    let target =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "target");
    let variable = match arguments.value_of("independent-variable") {
        Some("z") => IndependentVariable::LongitudinalPosition,
        _ => IndependentVariable::Time,
    };
    let momentum = utils::get_vec3_from_required_argument(arguments, "momentum");
    let position = utils::get_vec3_from_argument(arguments, "position")
        .unwrap_or_else(Vec3::zero)
        .to_point3();
    let time = utils::get_finite_float_value_from_required_parseable_argument(arguments, "time");
    let charge =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "charge");
    let mut mass = M_PROTON;
    utils::assign_value_from_parseable_argument(&mut mass, arguments, "mass");
    exit_on_false!(
        mass.is_finite() && mass >= 0.0,
        "Error: mass must be finite and non-negative"
    );

    let config = stepping::construct_integrator_config_from_arguments(arguments);
    let integrator = exit_on_error!(
        ParticleIntegrator::new(config, charge),
        "Error: Invalid integrator configuration: {}"
    );
    let mut evaluator = element::construct_element_from_arguments(arguments);

    let mut state = ParticleState::with_mass(time, position, momentum, mass);
    info!("Initial state: {}", state);

    let report = exit_on_error!(
        integrator.integrate(variable, target, &mut state, evaluator.as_mut()),
        "Error: Particle was lost: {}"
    );

    info!(
        "Took {} steps with {} rejected attempts",
        report.steps, report.rejected_attempts
    );
    if report.out_of_bounds_encountered {
        info!("Particle left the domain of the element");
    }
    print_state(&state);
    println!("kinetic energy: {} MeV", state.kinetic_energy(report.mass));
}

fn print_state(state: &ParticleState) {
    println!("time: {} ns", state.time);
    println!("position: {} mm", state.position);
    println!("energy: {} MeV", state.energy);
    println!("momentum: {} MeV/c", state.momentum);
}
