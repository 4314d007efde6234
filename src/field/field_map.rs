//! Fields interpolated from tabulated data.

use super::{ffd, FieldBounds, FieldEvaluator, FieldSample};
use crate::{
    constants::{C_LIGHT, MHZ_NS_TO_CYCLES, TWO_PI},
    error::TrackingError,
    geometry::{BoundingBox, Dim3, In3D, Point3, Vec3},
    interpolation::{
        cubic_hermite_spline::CubicHermiteSpline1,
        trilinear::{interp_trilinear, RegularGrid3},
    },
};
use log::debug;
use ndarray::Array3;
use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
};

/// Time variation of a tabulated field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldMapTiming {
    /// The tabulated field is constant in time.
    Static,
    /// The tabulated field is the peak of an RF field with the given
    /// frequency [MHz] and phase [rad]. The electric field varies as
    /// `cos(w*t + phase)` and the magnetic field as `-sin(w*t + phase)`.
    Dynamic { frequency: ffd, phase: ffd },
}

impl FieldMapTiming {
    /// Angular frequency [rad/ns], zero for static fields.
    pub fn angular_frequency(&self) -> ffd {
        match *self {
            Self::Static => 0.0,
            Self::Dynamic { frequency, .. } => TWO_PI * MHZ_NS_TO_CYCLES * frequency,
        }
    }

    /// Factors multiplying the tabulated electric and magnetic fields at the
    /// given time.
    pub fn factors(&self, time: ffd) -> (ffd, ffd) {
        match *self {
            Self::Static => (1.0, 1.0),
            Self::Dynamic { phase, .. } => {
                let (sin, cos) = ffd::sin_cos(self.angular_frequency() * time + phase);
                (cos, -sin)
            }
        }
    }
}

/// Electric and magnetic field components tabulated on a regular 3D grid.
///
/// Either field may be absent, in which case it is taken to be zero.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldMapData3 {
    grid: RegularGrid3,
    electric: Option<In3D<Array3<ffd>>>,
    magnetic: Option<In3D<Array3<ffd>>>,
}

impl FieldMapData3 {
    /// Creates new field map data, checking that all component arrays match
    /// the shape of the grid and hold only finite values.
    pub fn new(
        grid: RegularGrid3,
        electric: Option<In3D<Array3<ffd>>>,
        magnetic: Option<In3D<Array3<ffd>>>,
    ) -> Result<Self, TrackingError> {
        let shape = grid.shape();
        let expected_shape = (shape[Dim3::X], shape[Dim3::Y], shape[Dim3::Z]);
        for (name, field) in [("electric", &electric), ("magnetic", &magnetic)] {
            if let Some(components) = field {
                for dim in Dim3::slice() {
                    let array = &components[dim];
                    if array.dim() != expected_shape {
                        return Err(TrackingError::InvalidConfig(format!(
                            "{} field component {} has shape {:?} but the grid has shape {:?}",
                            name,
                            dim,
                            array.dim(),
                            expected_shape
                        )));
                    }
                    if !array.iter().all(|value| value.is_finite()) {
                        return Err(TrackingError::InvalidConfig(format!(
                            "{} field component {} contains non-finite values",
                            name, dim
                        )));
                    }
                }
            }
        }
        Ok(Self {
            grid,
            electric,
            magnetic,
        })
    }

    pub fn grid(&self) -> &RegularGrid3 {
        &self.grid
    }

    pub fn has_electric(&self) -> bool {
        self.electric.is_some()
    }

    pub fn has_magnetic(&self) -> bool {
        self.magnetic.is_some()
    }

    /// Interpolates the tabulated fields at the given position, or returns
    /// `None` if the position is outside the grid.
    pub fn interpolate(&self, position: &Point3<ffd>) -> Option<FieldSample> {
        let cell = self.grid.find_cell(position)?;
        let interpolate_components = |components: &Option<In3D<Array3<ffd>>>| match components {
            Some(components) => {
                Vec3::with_each_component(|dim| interp_trilinear(&components[dim], &cell))
            }
            None => Vec3::zero(),
        };
        Some(FieldSample::new(
            interpolate_components(&self.electric),
            interpolate_components(&self.magnetic),
        ))
    }
}

/// A field trilinearly interpolated from data on a regular 3D grid.
///
/// The lower grid boundaries belong to the domain and the upper ones do not.
#[derive(Clone, Debug)]
pub struct TabulatedFieldMap3 {
    data: Arc<FieldMapData3>,
    scale: ffd,
    timing: FieldMapTiming,
}

impl TabulatedFieldMap3 {
    /// Creates a new field map with the tabulated values multiplied by
    /// `scale`.
    pub fn new(data: Arc<FieldMapData3>, scale: ffd, timing: FieldMapTiming) -> Self {
        Self {
            data,
            scale,
            timing,
        }
    }

    pub fn data(&self) -> &Arc<FieldMapData3> {
        &self.data
    }

    pub fn scale(&self) -> ffd {
        self.scale
    }

    pub fn timing(&self) -> FieldMapTiming {
        self.timing
    }
}

impl FieldEvaluator for TabulatedFieldMap3 {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        match self.data.interpolate(position) {
            Some(tabulated) => {
                let (electric_factor, magnetic_factor) = self.timing.factors(time);
                sample
                    .electric
                    .add_scaled(&tabulated.electric, self.scale * electric_factor);
                sample
                    .magnetic
                    .add_scaled(&tabulated.magnetic, self.scale * magnetic_factor);
                FieldBounds::Inside
            }
            None => FieldBounds::OutOfBounds,
        }
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let grid = self.data.grid();
        Some(BoundingBox::new(&grid.lower_corner(), &grid.upper_corner()))
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }
}

/// What an on-axis profile describes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OnAxisFieldKind {
    /// Static longitudinal electric field [MV/m].
    Electrostatic,
    /// Static longitudinal magnetic field [T].
    Magnetostatic,
    /// Peak longitudinal electric field [MV/m] of an RF field with the
    /// given frequency [MHz] and phase [rad].
    Dynamic { frequency: ffd, phase: ffd },
}

/// A cylindrically symmetric field given by its longitudinal component on
/// the axis, extended off axis to first order in the radius.
///
/// With `F(z)` the on-axis profile, the radial component is `-r/2*F'(z)`.
/// An RF field additionally gets the azimuthal magnetic field
/// `r*w/(2c^2)*F(z)` required by the time variation of the electric field.
#[derive(Clone, Debug)]
pub struct OnAxisFieldMap1 {
    profile: Arc<CubicHermiteSpline1>,
    kind: OnAxisFieldKind,
    scale: ffd,
    radius: ffd,
}

impl OnAxisFieldMap1 {
    /// Creates a new on-axis field map confined to the given radius [mm].
    pub fn new(
        profile: Arc<CubicHermiteSpline1>,
        kind: OnAxisFieldKind,
        scale: ffd,
        radius: ffd,
    ) -> Self {
        Self {
            profile,
            kind,
            scale,
            radius,
        }
    }

    pub fn kind(&self) -> OnAxisFieldKind {
        self.kind
    }

    pub fn profile(&self) -> &CubicHermiteSpline1 {
        &self.profile
    }
}

impl FieldEvaluator for OnAxisFieldMap1 {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        let (x, y) = (position[Dim3::X], position[Dim3::Y]);
        if x * x + y * y > self.radius * self.radius {
            return FieldBounds::OutOfBounds;
        }
        let (value, derivative) = match self.profile.interp_with_derivative(position[Dim3::Z]) {
            Some(interpolated) => interpolated,
            None => return FieldBounds::OutOfBounds,
        };
        let (on_axis, radial_factor) = (self.scale * value, -0.5 * self.scale * derivative);
        let expanded = Vec3::new(radial_factor * x, radial_factor * y, on_axis);

        match self.kind {
            OnAxisFieldKind::Electrostatic => sample.electric.add_scaled(&expanded, 1.0),
            OnAxisFieldKind::Magnetostatic => sample.magnetic.add_scaled(&expanded, 1.0),
            OnAxisFieldKind::Dynamic { frequency, phase } => {
                let timing = FieldMapTiming::Dynamic { frequency, phase };
                let (electric_factor, magnetic_factor) = timing.factors(time);
                sample.electric.add_scaled(&expanded, electric_factor);

                let azimuthal_factor =
                    0.5 * timing.angular_frequency() / (C_LIGHT * C_LIGHT) * on_axis;
                sample.magnetic[Dim3::X] -= azimuthal_factor * y * magnetic_factor;
                sample.magnetic[Dim3::Y] += azimuthal_factor * x * magnetic_factor;
            }
        }
        FieldBounds::Inside
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let sampling = self.profile.sampling();
        Some(BoundingBox::new(
            &Point3::new(-self.radius, -self.radius, sampling.start()),
            &Point3::new(self.radius, self.radius, sampling.end()),
        ))
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }
}

/// Keeps track of loaded field data by name, so that evaluators referring
/// to the same source share a single copy.
///
/// Only weak references are held, so data is freed once the last evaluator
/// using it is dropped, and loaded again on the next request.
pub struct FieldMapRegistry<T = FieldMapData3> {
    entries: HashMap<String, Weak<T>>,
}

impl<T> FieldMapRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the data registered under the given name if it is still in
    /// use.
    pub fn get(&self, name: &str) -> Option<Arc<T>> {
        self.entries.get(name).and_then(Weak::upgrade)
    }

    /// Returns the data registered under the given name, loading it with
    /// `load` if it is not in use.
    pub fn get_or_load<F, E>(&mut self, name: &str, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(data) = self.get(name) {
            debug!("Reusing field data {}", name);
            return Ok(data);
        }
        debug!("Loading field data {}", name);
        let data = Arc::new(load()?);
        self.entries.insert(name.to_string(), Arc::downgrade(&data));
        Ok(data)
    }

    /// Removes entries whose data is no longer in use.
    pub fn purge(&mut self) {
        self.entries.retain(|_, data| data.strong_count() > 0);
    }

    /// Number of registered names, including those whose data has been
    /// freed since the last purge.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for FieldMapRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FieldMapRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMapRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::interpolation::{cubic_hermite_spline::BoundaryTangents, RegularSampling1};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn linear_map_data() -> FieldMapData3 {
        let grid = RegularGrid3::from_corner(
            &Point3::new(-1.0, -1.0, 0.0),
            &In3D::new(0.5, 0.5, 1.0),
            &In3D::new(5, 5, 4),
        );
        let coordinates = |(i, j, k): (usize, usize, usize)| {
            (-1.0 + 0.5 * i as f64, -1.0 + 0.5 * j as f64, k as f64)
        };
        let electric = In3D::new(
            Array3::from_shape_fn((5, 5, 4), |index| coordinates(index).0),
            Array3::zeros((5, 5, 4)),
            Array3::from_shape_fn((5, 5, 4), |index| 2.0 + coordinates(index).2),
        );
        let magnetic = In3D::new(
            Array3::zeros((5, 5, 4)),
            Array3::from_shape_fn((5, 5, 4), |index| {
                let (x, y, z) = coordinates(index);
                0.1 * x - 0.2 * y + 0.3 * z
            }),
            Array3::zeros((5, 5, 4)),
        );
        FieldMapData3::new(grid, Some(electric), Some(magnetic)).unwrap()
    }

    #[test]
    fn static_map_reproduces_linear_fields() {
        let mut map = TabulatedFieldMap3::new(Arc::new(linear_map_data()), 2.0, FieldMapTiming::Static);
        let sample = map.evaluate(&Point3::new(0.3, -0.4, 1.7), 0.0).unwrap();
        assert_abs_diff_eq!(sample.electric, Vec3::new(0.6, 0.0, 7.4), epsilon = 1e-12);
        assert_abs_diff_eq!(
            sample.magnetic,
            Vec3::new(0.0, 2.0 * (0.03 + 0.08 + 0.51), 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn upper_grid_boundary_is_outside() {
        let mut map = TabulatedFieldMap3::new(Arc::new(linear_map_data()), 1.0, FieldMapTiming::Static);
        assert!(map.evaluate(&Point3::new(-1.0, -1.0, 0.0), 0.0).is_some());
        assert!(map.evaluate(&Point3::new(1.0, 0.0, 1.0), 0.0).is_none());
        assert!(map.evaluate(&Point3::new(0.0, 0.0, 3.0), 0.0).is_none());
        let mut sample = FieldSample::zero();
        assert_eq!(
            map.accumulate_field(&Point3::new(0.0, 0.0, -0.1), 0.0, &mut sample),
            FieldBounds::OutOfBounds
        );
        assert_eq!(sample, FieldSample::zero());
    }

    #[test]
    fn dynamic_map_oscillates_in_quadrature() {
        let timing = FieldMapTiming::Dynamic {
            frequency: 250.0,
            phase: 0.0,
        };
        let mut map = TabulatedFieldMap3::new(Arc::new(linear_map_data()), 1.0, timing);
        let position = Point3::new(0.0, 0.0, 1.0);
        // A quarter period at 250 MHz is 1 ns
        let at_start = map.evaluate(&position, 0.0).unwrap();
        assert_abs_diff_eq!(at_start.electric[Dim3::Z], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(at_start.magnetic[Dim3::Y], 0.0, epsilon = 1e-12);
        let at_quarter = map.evaluate(&position, 1.0).unwrap();
        assert_abs_diff_eq!(at_quarter.electric[Dim3::Z], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(at_quarter.magnetic[Dim3::Y], -0.3, epsilon = 1e-12);
    }

    #[test]
    fn mismatched_component_shape_is_rejected() {
        let grid = RegularGrid3::from_corner(&Point3::origin(), &In3D::same(1.0), &In3D::same(3));
        let magnetic = In3D::new(
            Array3::zeros((3, 3, 3)),
            Array3::zeros((3, 3, 2)),
            Array3::zeros((3, 3, 3)),
        );
        assert!(matches!(
            FieldMapData3::new(grid, None, Some(magnetic)),
            Err(TrackingError::InvalidConfig(_))
        ));
    }

    fn quadratic_profile() -> Arc<CubicHermiteSpline1> {
        let sampling = RegularSampling1::new(0.0, 1.0, 21);
        let values = (0..21)
            .map(|i| {
                let z = i as f64;
                1.0 + 0.01 * z * z
            })
            .collect();
        Arc::new(CubicHermiteSpline1::new(sampling, values, BoundaryTangents::Computed))
    }

    #[test]
    fn on_axis_map_expands_off_axis() {
        let mut map = OnAxisFieldMap1::new(quadratic_profile(), OnAxisFieldKind::Electrostatic, 2.0, 10.0);
        let z = 7.5;
        let sample = map.evaluate(&Point3::new(1.0, -2.0, z), 0.0).unwrap();
        let derivative = 2.0 * 0.02 * z;
        assert_relative_eq!(sample.electric[Dim3::Z], 2.0 * (1.0 + 0.01 * z * z), max_relative = 1e-12);
        assert_relative_eq!(sample.electric[Dim3::X], -0.5 * derivative, max_relative = 1e-12);
        assert_relative_eq!(sample.electric[Dim3::Y], derivative, max_relative = 1e-12);
        assert_abs_diff_eq!(sample.magnetic, Vec3::zero());

        assert!(map.evaluate(&Point3::new(8.0, 7.0, z), 0.0).is_none());
        assert!(map.evaluate(&Point3::new(0.0, 0.0, 20.0), 0.0).is_none());
    }

    #[test]
    fn magnetostatic_on_axis_map_fills_magnetic_field() {
        let mut map = OnAxisFieldMap1::new(quadratic_profile(), OnAxisFieldKind::Magnetostatic, 1.0, 10.0);
        let sample = map.evaluate(&Point3::new(0.0, 0.0, 5.0), 0.0).unwrap();
        assert_abs_diff_eq!(sample.electric, Vec3::zero());
        assert_relative_eq!(sample.magnetic[Dim3::Z], 1.25, max_relative = 1e-12);
    }

    #[test]
    fn dynamic_on_axis_map_has_azimuthal_magnetic_field() {
        let frequency = 500.0;
        let kind = OnAxisFieldKind::Dynamic {
            frequency,
            phase: 0.0,
        };
        let mut map = OnAxisFieldMap1::new(quadratic_profile(), kind, 1.0, 10.0);
        // Half a quarter period at 500 MHz
        let time = 0.25;
        let z = 10.0;
        let sample = map.evaluate(&Point3::new(3.0, 0.0, z), time).unwrap();
        let omega = TWO_PI * 1e-3 * frequency;
        let on_axis = 1.0 + 0.01 * z * z;
        let expected = -3.0 * omega / (2.0 * C_LIGHT * C_LIGHT) * on_axis * f64::sin(omega * time);
        assert_relative_eq!(sample.magnetic[Dim3::Y], expected, max_relative = 1e-12);
        assert_abs_diff_eq!(sample.magnetic[Dim3::X], 0.0);
        assert_relative_eq!(
            sample.electric[Dim3::Z],
            on_axis * f64::cos(omega * time),
            max_relative = 1e-12
        );
    }

    #[test]
    fn registry_shares_loaded_data() {
        let mut registry = FieldMapRegistry::new();
        let mut loads = 0;
        let first = registry
            .get_or_load("map", || -> Result<_, TrackingError> {
                loads += 1;
                Ok(linear_map_data())
            })
            .unwrap();
        let second = registry
            .get_or_load("map", || -> Result<_, TrackingError> {
                loads += 1;
                Ok(linear_map_data())
            })
            .unwrap();
        assert_eq!(loads, 1);
        assert!(Arc::ptr_eq(&first, &second));

        drop(first);
        drop(second);
        assert!(registry.get("map").is_none());
        registry.purge();
        assert!(registry.is_empty());

        let failed: Result<Arc<FieldMapData3>, &str> = registry.get_or_load("broken", || Err("missing"));
        assert_eq!(failed.unwrap_err(), "missing");
        assert!(registry.get("broken").is_none());
    }
}
