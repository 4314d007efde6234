//! Physical and mathematical constants.
//!
//! Tracking works in accelerator units: time in nanoseconds, lengths in
//! millimeters, energies in MeV and momenta in MeV/c.

/// Floating-point precision to use for constants.
#[allow(non_camel_case_types)]
pub type fcn = f64;

// Mathematical constants

pub const PI: fcn = std::f64::consts::PI;
pub const TWO_PI: fcn = 2.0 * PI;

// Physical constants

/// Speed of light in vacuum [mm/ns].
pub const C_LIGHT: fcn = 299.792458;
/// Elementary charge [C].
pub const Q_ELEMENTARY: fcn = 1.602_176_634e-19;
/// Electron rest energy [MeV].
pub const M_ELECTRON: fcn = 0.510_998_95;
/// Proton rest energy [MeV].
pub const M_PROTON: fcn = 938.272_088_16;
/// Muon rest energy [MeV].
pub const M_MUON: fcn = 105.658_375_5;

// Unit conversion factors

/// Conversion factor from megahertz to hertz.
pub const MHZ_TO_HZ: fcn = 1e6;
/// Conversion factor from frequency in megahertz times time in nanoseconds
/// to a number of cycles.
pub const MHZ_NS_TO_CYCLES: fcn = 1e-3;
/// Conversion factor from megavolts per meter to megavolts per millimeter.
pub const MV_PER_M_TO_MV_PER_MM: fcn = 1e-3;
/// Conversion factor from tesla to kilotesla.
pub const TESLA_TO_KILOTESLA: fcn = 1e-3;
/// Conversion factor from kilogauss to tesla.
pub const KILOGAUSS_TO_TESLA: fcn = 0.1;
