//! Utilities for creating the command line interface.

use crate::{exit_on_error, exit_on_false, exit_on_none, exit_with_error, geometry::Vec3};
use clap::ArgMatches;
use std::str::FromStr;

pub fn parse_value_string<T>(argument_name: &str, value_string: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    exit_on_error!(
        value_string.trim().parse(),
        "Error: Could not parse value for {0}: {1}",
        argument_name
    )
}

fn parse_value_strings<'a, T, I>(argument_name: &str, value_strings: I) -> Vec<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
    I: Iterator<Item = &'a str>,
{
    value_strings
        .filter_map(|value_string| {
            if value_string.is_empty() {
                None
            } else {
                Some(parse_value_string(argument_name, value_string))
            }
        })
        .collect()
}

fn verify_finite_float_value(argument_name: &str, value: f64) {
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
}

pub fn get_value_from_required_parseable_argument<T>(arguments: &ArgMatches, argument_name: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match arguments.value_of(argument_name) {
        Some(value_string) => parse_value_string(argument_name, value_string),
        None => exit_with_error!("Error: No value for required argument {}", argument_name),
    }
}

pub fn get_finite_float_value_from_required_parseable_argument(
    arguments: &ArgMatches,
    argument_name: &str,
) -> f64 {
    let value = get_value_from_required_parseable_argument(arguments, argument_name);
    verify_finite_float_value(argument_name, value);
    value
}

pub fn get_finite_float_values_from_parseable_argument(
    arguments: &ArgMatches,
    argument_name: &str,
) -> Option<Vec<f64>> {
    arguments.values_of(argument_name).map(|values| {
        let values: Vec<f64> = parse_value_strings(argument_name, values);
        for &value in &values {
            verify_finite_float_value(argument_name, value);
        }
        values
    })
}

/// Reads a comma-separated triple of finite floats into a vector, if the
/// argument is present.
pub fn get_vec3_from_argument(arguments: &ArgMatches, argument_name: &str) -> Option<Vec3<f64>> {
    get_finite_float_values_from_parseable_argument(arguments, argument_name).map(|values| {
        exit_on_false!(
            values.len() == 3,
            "Error: {} must have 3 values, got {}",
            argument_name,
            values.len()
        );
        Vec3::new(values[0], values[1], values[2])
    })
}

pub fn get_vec3_from_required_argument(arguments: &ArgMatches, argument_name: &str) -> Vec3<f64> {
    exit_on_none!(
        get_vec3_from_argument(arguments, argument_name),
        "Error: No value for required argument {}",
        argument_name
    )
}

/// Overwrites `value` with the parsed argument if the argument is present.
pub fn assign_value_from_parseable_argument<T>(
    value: &mut T,
    arguments: &ArgMatches,
    argument_name: &str,
) where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    if let Some(value_string) = arguments.value_of(argument_name) {
        *value = parse_value_string(argument_name, value_string);
    }
}

/// Overwrites `value` with the value corresponding to the selected
/// alternative if the argument is present.
pub fn assign_value_from_selected_argument<T: Clone>(
    value: &mut T,
    arguments: &ArgMatches,
    argument_name: &str,
    alternatives: &[&str],
    values: &[T],
) {
    if let Some(selected) = arguments.value_of(argument_name) {
        match alternatives.iter().position(|&alternative| alternative == selected) {
            Some(idx) => *value = values[idx].clone(),
            None => exit_with_error!(
                "Error: Invalid value {} for {}, expected one of {:?}",
                selected,
                argument_name,
                alternatives
            ),
        }
    }
}
