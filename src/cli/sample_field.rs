//! Command line interface for sampling the field of an element at a point.

use super::{element, utils};
use crate::exit_with_error;
use clap::{Arg, ArgMatches, Command};

/// Creates a subcommand for printing the field at a point.
pub fn create_sample_field_subcommand() -> Command<'static> {
    let command = Command::new("sample-field")
        .about("Print the electric and magnetic field of an accelerator element at a point")
        .arg(
            Arg::new("position")
                .value_name("X,Y,Z")
                .help("Position to sample [mm]")
                .required(true)
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
                .help("Time to sample [ns]")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.0"),
        );
    element::add_element_arguments_to_subcommand(command)
}

/// Runs the actions for the `sample-field` subcommand using the given arguments.
pub fn run_sample_field_subcommand(arguments: &ArgMatches) {
    let position = utils::get_vec3_from_required_argument(arguments, "position").to_point3();
    let time = utils::get_finite_float_value_from_required_parseable_argument(arguments, "time");
    let mut evaluator = element::construct_element_from_arguments(arguments);

    match evaluator.evaluate(&position, time) {
        Some(sample) => {
            println!("electric field: {} MV/m", sample.electric);
            println!("magnetic field: {} T", sample.magnetic);
        }
        None => exit_with_error!("Error: Position {} is outside the element", position),
    }
}
