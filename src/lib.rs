//! The `beamtrack` crate evaluates the electromagnetic fields of accelerator
//! elements and integrates the relativistic motion of charged particles
//! through them.

pub mod constants;
pub mod end_field;
pub mod error;
pub mod field;
pub mod geometry;
pub mod interpolation;
pub mod io;
pub mod math;
pub mod num;
pub mod time_dependence;
pub mod tracking;

#[cfg(feature = "cli")]
pub mod cli;
