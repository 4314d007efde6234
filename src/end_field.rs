//! Models for the fringe fields at the ends of magnets.
//!
//! An end-field model is a dimensionless shape function of the position
//! along the magnet, close to one inside the magnet and falling off to zero
//! outside it. Field expansions need its derivatives too.

pub mod asymmetric_enge;
pub mod enge;
pub mod tanh;

use std::fmt;

pub use asymmetric_enge::AsymmetricEnge;
pub use enge::Enge;
pub use tanh::Tanh;

/// Floating-point precision to use for end-field models.
#[allow(non_camel_case_types)]
pub type fef = f64;

/// Defines the properties of a fringe field shape function.
pub trait EndFieldModel: Sync + Send + fmt::Debug {
    /// Evaluates the `n`th derivative of the shape function at `x`
    /// (`n = 0` gives the function itself).
    fn function(&self, x: fef, n: usize) -> fef;

    /// Scales all lengths of the model by the given factor.
    fn rescale(&mut self, factor: fef);

    /// Length of the region where the shape function is close to one.
    fn centre_length(&self) -> fef;

    /// Typical length over which the shape function falls off.
    fn end_length(&self) -> fef;

    /// Creates a boxed deep copy of the model.
    fn clone_box(&self) -> Box<dyn EndFieldModel>;
}

impl Clone for Box<dyn EndFieldModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
