//! Function for building the command line hierarchy.

use super::{sample_field::create_sample_field_subcommand, track::create_track_subcommand};
use clap::{self, Arg, Command};

/// Build the `beamtrack` command line hierarchy.
pub fn build() -> Command<'static> {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .disable_help_subcommand(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .help("Display elapsed time when done"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print status messages (repeat for diagnostics)")
                .multiple_occurrences(true)
                .global(true),
        )
        .subcommand(create_track_subcommand())
        .subcommand(create_sample_field_subcommand())
}
