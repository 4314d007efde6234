//! Time-varying scalar parameters of field elements.

pub mod cache;
pub mod polynomial;
pub mod sinusoidal;
pub mod spline;

use std::fmt;

pub use cache::TimeDependenceCache;
pub use polynomial::PolynomialTimeDependence;
pub use sinusoidal::SinusoidalTimeDependence;
pub use spline::SplineTimeDependence;

/// Floating-point precision to use for time dependencies.
#[allow(non_camel_case_types)]
pub type ftd = f64;

/// A scalar function of time together with its integral.
///
/// The time unit is up to the user; field elements use nanoseconds.
pub trait TimeDependence: Sync + Send + fmt::Debug {
    /// Evaluates the function at the given time.
    fn value(&self, time: ftd) -> ftd;

    /// Evaluates the integral of the function from zero to the given time.
    fn integral(&self, time: ftd) -> ftd;
}
