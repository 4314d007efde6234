use approx::assert_abs_diff_eq;
use beamtrack::{
    constants::M_PROTON,
    end_field::enge::Enge,
    field::scaling_ffa::{ScalingFfaConfig, ScalingFfaMagnet},
    geometry::{Dim3, Point3, Vec3},
    tracking::{state::ParticleState, IntegratorConfig, ParticleIntegrator},
};

pub fn proton_at_origin(momentum: Vec3<f64>) -> ParticleState {
    ParticleState::with_mass(0.0, Point3::origin(), momentum, M_PROTON)
}

pub fn proton_integrator() -> ParticleIntegrator {
    ParticleIntegrator::new(IntegratorConfig::default(), 1.0).unwrap()
}

pub fn assert_points_close(actual: &Point3<f64>, expected: &Point3<f64>, epsilon: f64) {
    for dim in Dim3::slice() {
        assert_abs_diff_eq!(actual[dim], expected[dim], epsilon = epsilon);
    }
}

/// Radial sector magnet with a 1 T reference field at 4 m and a 1 m long
/// centre region along the reference radius.
pub fn sector_magnet() -> ScalingFfaMagnet {
    let config = ScalingFfaConfig {
        max_order: 4,
        field_index: 2.0,
        bz: 1.0,
        ..ScalingFfaConfig::default()
    };
    ScalingFfaMagnet::new(config, Box::new(Enge::new(vec![0.0, 4.0], 500.0, 100.0))).unwrap()
}
