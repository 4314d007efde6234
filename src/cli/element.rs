//! Command line interface for constructing the field of an accelerator element.

use super::utils;
use crate::{
    end_field::enge::Enge,
    exit_on_error, exit_on_false, exit_with_error,
    field::{
        scaling_ffa::{ScalingFfaConfig, ScalingFfaMagnet},
        uniform::UniformField,
        FieldEvaluator,
    },
    geometry::Vec3,
};
use clap::{Arg, ArgMatches, Command};

const DEFAULT_ENGE_COEFFICIENTS: [f64; 2] = [0.0, 4.0];

/// Adds arguments for selecting and configuring a field element.
pub fn add_element_arguments_to_subcommand(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("element")
                .long("element")
                .value_name("NAME")
                .help("Accelerator element to use")
                .takes_value(true)
                .possible_values(["uniform", "scaling-ffa"])
                .default_value("scaling-ffa"),
        )
        .arg(
            Arg::new("electric-field")
                .long("electric-field")
                .value_name("EX,EY,EZ")
                .help("Electric field of the uniform element [MV/m] [default: 0,0,0]")
                .next_line_help(true)
                .takes_value(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .number_of_values(3)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("magnetic-field")
                .long("magnetic-field")
                .value_name("BX,BY,BZ")
                .help("Magnetic field of the uniform element [T] [default: 0,0,0]")
                .next_line_help(true)
                .takes_value(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .number_of_values(3)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("max-order")
                .long("max-order")
                .value_name("NUMBER")
                .help("Highest power of the vertical coordinate in the FFA field expansion")
                .next_line_help(true)
                .takes_value(true)
                .default_value("3"),
        )
        .arg(
            Arg::new("field-index")
                .long("field-index")
                .value_name("VALUE")
                .help("Field index k of the FFA magnet")
                .next_line_help(true)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2.0"),
        )
        .arg(
            Arg::new("tan-delta")
                .long("tan-delta")
                .value_name("VALUE")
                .help("Tangent of the spiral angle of the FFA magnet")
                .next_line_help(true)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0.0"),
        )
        .arg(
            Arg::new("dipole-field")
                .long("dipole-field")
                .value_name("VALUE")
                .help("Vertical field of the FFA magnet at the reference radius [T]")
                .next_line_help(true)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0"),
        )
        .arg(
            Arg::new("reference-radius")
                .long("reference-radius")
                .value_name("VALUE")
                .help("Reference radius of the FFA magnet [mm]")
                .next_line_help(true)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("4000.0"),
        )
        .arg(
            Arg::new("radial-extent")
                .long("radial-extent")
                .value_name("MIN,MAX")
                .help("Smallest and largest radius inside the FFA magnet [mm] [default: 3000,5000]")
                .next_line_help(true)
                .takes_value(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .number_of_values(2),
        )
        .arg(
            Arg::new("vertical-extent")
                .long("vertical-extent")
                .value_name("VALUE")
                .help("Largest distance from the midplane with nonzero FFA field [mm]")
                .next_line_help(true)
                .takes_value(true)
                .default_value("300.0"),
        )
        .arg(
            Arg::new("enge-coefficients")
                .long("enge-coefficients")
                .value_name("VALUES")
                .help("Coefficients of the Enge fringe field polynomial, lowest power first [default: 0,4]")
                .next_line_help(true)
                .takes_value(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .multiple_values(true)
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("centre-length")
                .long("centre-length")
                .value_name("VALUE")
                .help("Length of the FFA magnet at half field along the reference radius [mm]")
                .next_line_help(true)
                .takes_value(true)
                .default_value("1000.0"),
        )
        .arg(
            Arg::new("end-length")
                .long("end-length")
                .value_name("VALUE")
                .help("Length scale of the Enge fringe field fall-off [mm]")
                .next_line_help(true)
                .takes_value(true)
                .default_value("100.0"),
        )
}

/// Constructs the selected field element based on present arguments.
pub fn construct_element_from_arguments(arguments: &ArgMatches) -> Box<dyn FieldEvaluator> {
    match arguments.value_of("element") {
        Some("uniform") => Box::new(UniformField::new(
            utils::get_vec3_from_argument(arguments, "electric-field").unwrap_or_else(Vec3::zero),
            utils::get_vec3_from_argument(arguments, "magnetic-field").unwrap_or_else(Vec3::zero),
        )),
        Some("scaling-ffa") => Box::new(construct_scaling_ffa_from_arguments(arguments)),
        other => exit_with_error!("Error: Invalid element {:?}", other),
    }
}

fn construct_scaling_ffa_from_arguments(arguments: &ArgMatches) -> ScalingFfaMagnet {
    let mut config = ScalingFfaConfig::default();
    utils::assign_value_from_parseable_argument(&mut config.max_order, arguments, "max-order");
    utils::assign_value_from_parseable_argument(&mut config.field_index, arguments, "field-index");
    utils::assign_value_from_parseable_argument(&mut config.tan_delta, arguments, "tan-delta");
    utils::assign_value_from_parseable_argument(&mut config.bz, arguments, "dipole-field");
    utils::assign_value_from_parseable_argument(&mut config.r0, arguments, "reference-radius");
    utils::assign_value_from_parseable_argument(
        &mut config.vertical_extent,
        arguments,
        "vertical-extent",
    );
    if let Some(radial_extent) =
        utils::get_finite_float_values_from_parseable_argument(arguments, "radial-extent")
    {
        exit_on_false!(
            radial_extent.len() == 2,
            "Error: radial-extent must have 2 values, got {}",
            radial_extent.len()
        );
        config.r_min = radial_extent[0];
        config.r_max = radial_extent[1];
    }

    let coefficients = utils::get_finite_float_values_from_parseable_argument(
        arguments,
        "enge-coefficients",
    )
    .unwrap_or_else(|| DEFAULT_ENGE_COEFFICIENTS.to_vec());
    let centre_length =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "centre-length");
    let end_length =
        utils::get_finite_float_value_from_required_parseable_argument(arguments, "end-length");
    exit_on_false!(
        end_length > 0.0,
        "Error: end-length must be larger than zero"
    );

    let end_field = Enge::new(coefficients, 0.5 * centre_length, end_length);
    exit_on_error!(
        ScalingFfaMagnet::new(config, Box::new(end_field)),
        "Error: Could not construct scaling FFA magnet: {}"
    )
}
