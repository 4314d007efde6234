//! Function for running the command line program.

use super::{build, sample_field::run_sample_field_subcommand, track::run_track_subcommand};
use crate::io::{self, Verbosity};
use std::time::Instant;

/// Runs the `beamtrack` command line program.
pub fn run() {
    let command = build::build();

    let arguments = command.get_matches();

    let verbosity = match arguments.occurrences_of("verbose") {
        0 => Verbosity::Quiet,
        1 => Verbosity::Messages,
        _ => Verbosity::Diagnostics,
    };
    io::init_logging(verbosity);

    let start_instant = Instant::now();

    if let Some(track_arguments) = arguments.subcommand_matches("track") {
        run_track_subcommand(track_arguments);
    }
    if let Some(sample_field_arguments) = arguments.subcommand_matches("sample-field") {
        run_sample_field_subcommand(sample_field_arguments);
    }

    if arguments.is_present("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}
