//! Electromagnetic fields of accelerator elements.
//!
//! Positions are in millimeters and times in nanoseconds. Electric fields
//! are in MV/m and magnetic fields in tesla.

pub mod field_map;
pub mod polynomial_patch;
pub mod rf_cavity;
pub mod rf_cavity_fringe;
pub mod scaling_ffa;
pub mod uniform;
pub mod vertical_ffa;

use crate::geometry::{BoundingBox, Dim3, Point3, Vec3};
use std::fmt;

/// Floating-point precision to use for fields.
#[allow(non_camel_case_types)]
pub type ffd = f64;

/// Electric and magnetic field vectors at a point in space and time.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSample {
    /// Electric field [MV/m].
    pub electric: Vec3<ffd>,
    /// Magnetic field [T].
    pub magnetic: Vec3<ffd>,
}

impl FieldSample {
    pub fn new(electric: Vec3<ffd>, magnetic: Vec3<ffd>) -> Self {
        Self { electric, magnetic }
    }

    /// Creates a sample with zero fields.
    pub fn zero() -> Self {
        Self::new(Vec3::zero(), Vec3::zero())
    }

    /// Adds the fields of another sample scaled by `factor` to this one.
    pub fn add_scaled(&mut self, other: &Self, factor: ffd) {
        self.electric.add_scaled(&other.electric, factor);
        self.magnetic.add_scaled(&other.magnetic, factor);
    }

    /// Whether all field components are finite.
    pub fn is_finite(&self) -> bool {
        self.electric.is_finite() && self.magnetic.is_finite()
    }
}

impl Default for FieldSample {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for FieldSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E = {} MV/m, B = {} T", self.electric, self.magnetic)
    }
}

/// Whether a field query was inside the domain of the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldBounds {
    Inside,
    OutOfBounds,
}

impl FieldBounds {
    pub fn is_inside(&self) -> bool {
        *self == Self::Inside
    }
}

/// Defines the properties of the field of an accelerator element.
///
/// Evaluators may keep private caches, so evaluation takes `&mut self`.
/// Each integration works with its own evaluator, cloned with `clone_box`.
pub trait FieldEvaluator: Send + fmt::Debug {
    /// Adds the field at the given position and time to `sample`.
    ///
    /// # Returns
    ///
    /// `FieldBounds::Inside` if the position is within the domain of the
    /// element, otherwise `FieldBounds::OutOfBounds`, in which case `sample`
    /// is left untouched.
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds;

    /// Returns a box enclosing the domain of the element, or `None` if the
    /// domain is unbounded.
    fn bounding_box(&self) -> Option<BoundingBox>;

    /// Creates a boxed copy of the evaluator with its own caches.
    fn clone_box(&self) -> Box<dyn FieldEvaluator>;

    /// Brings internal caches back to their initial state.
    fn reset(&mut self) {}

    /// Step length [mm] to use for finite difference derivatives.
    fn derivative_step(&self) -> ffd {
        DEFAULT_DERIVATIVE_STEP
    }

    /// Computes the field at the given position and time, or returns `None`
    /// if the position is outside the domain of the element.
    fn evaluate(&mut self, position: &Point3<ffd>, time: ffd) -> Option<FieldSample> {
        let mut sample = FieldSample::zero();
        match self.accumulate_field(position, time, &mut sample) {
            FieldBounds::Inside => Some(sample),
            FieldBounds::OutOfBounds => None,
        }
    }

    /// Computes the spatial derivative of the field along the given dimension
    /// by central differences, or returns `None` if either evaluation point
    /// is outside the domain.
    fn field_derivative(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        dim: Dim3,
    ) -> Option<FieldSample> {
        let step = self.derivative_step();
        let upper = self.evaluate(&position.shifted(dim, step), time)?;
        let lower = self.evaluate(&position.shifted(dim, -step), time)?;
        let mut derivative = upper;
        derivative.add_scaled(&lower, -1.0);
        let inverse_step = 0.5 / step;
        Some(FieldSample::new(
            &derivative.electric * inverse_step,
            &derivative.magnetic * inverse_step,
        ))
    }
}

/// Default step length [mm] for finite difference field derivatives.
pub const DEFAULT_DERIVATIVE_STEP: ffd = 1e-3;

impl Clone for Box<dyn FieldEvaluator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Superposition of the fields of several elements.
///
/// A position is inside the composite domain when it is inside the domain
/// of at least one element.
#[derive(Clone, Debug, Default)]
pub struct CompositeField {
    elements: Vec<Box<dyn FieldEvaluator>>,
}

impl CompositeField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an element to the composite.
    pub fn push(&mut self, element: Box<dyn FieldEvaluator>) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl FieldEvaluator for CompositeField {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        let mut bounds = FieldBounds::OutOfBounds;
        for element in self.elements.iter_mut() {
            if element.accumulate_field(position, time, sample).is_inside() {
                bounds = FieldBounds::Inside;
            }
        }
        bounds
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        let mut boxes = self.elements.iter().map(|element| element.bounding_box());
        let mut combined = boxes.next()??;
        for bounding_box in boxes {
            combined.enlarge_to_contain_box(&bounding_box?);
        }
        Some(combined)
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }

    fn reset(&mut self) {
        self.elements.iter_mut().for_each(|element| element.reset());
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::field::uniform::UniformField;
    use approx::assert_abs_diff_eq;

    #[test]
    fn composite_field_sums_elements() {
        let mut composite = CompositeField::new();
        composite.push(Box::new(UniformField::new(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.5, 0.0),
        )));
        composite.push(Box::new(
            UniformField::new(Vec3::zero(), Vec3::new(0.0, 0.25, 0.0)).with_bounds(
                BoundingBox::new(&Point3::new(-1.0, -1.0, -1.0), &Point3::new(1.0, 1.0, 1.0)),
            ),
        ));
        let inside = composite.evaluate(&Point3::origin(), 0.0).unwrap();
        assert_abs_diff_eq!(inside.magnetic, Vec3::new(0.0, 0.75, 0.0));
        let outside = composite.evaluate(&Point3::new(5.0, 0.0, 0.0), 0.0).unwrap();
        assert_abs_diff_eq!(outside.magnetic, Vec3::new(0.0, 0.5, 0.0));
        // One of the elements is unbounded
        assert!(composite.bounding_box().is_none());
    }

    #[test]
    fn empty_composite_is_out_of_bounds() {
        let mut composite = CompositeField::new();
        assert!(composite.is_empty());
        assert!(composite.evaluate(&Point3::origin(), 0.0).is_none());
    }

    #[test]
    fn derivative_of_uniform_field_is_zero() {
        let mut field = UniformField::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3));
        for dim in Dim3::slice() {
            let derivative = field.field_derivative(&Point3::origin(), 0.0, dim).unwrap();
            assert_abs_diff_eq!(derivative.electric, Vec3::zero());
            assert_abs_diff_eq!(derivative.magnetic, Vec3::zero());
        }
    }
}
