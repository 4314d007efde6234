//! Command line interface.

pub mod build;
pub mod element;
pub mod run;
pub mod sample_field;
pub mod stepping;
pub mod track;
pub mod utils;
