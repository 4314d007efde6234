//! Constant electric and magnetic fields.

use super::{ffd, FieldBounds, FieldEvaluator, FieldSample};
use crate::geometry::{BoundingBox, Point3, Vec3};

/// A constant field, either filling all of space or confined to a box.
#[derive(Clone, Debug, PartialEq)]
pub struct UniformField {
    field: FieldSample,
    bounds: Option<BoundingBox>,
}

impl UniformField {
    /// Creates an unbounded uniform field.
    pub fn new(electric: Vec3<ffd>, magnetic: Vec3<ffd>) -> Self {
        Self {
            field: FieldSample::new(electric, magnetic),
            bounds: None,
        }
    }

    /// Confines the field to the given box.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn field(&self) -> &FieldSample {
        &self.field
    }
}

impl FieldEvaluator for UniformField {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        _time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        match &self.bounds {
            Some(bounds) if !bounds.contains(position) => FieldBounds::OutOfBounds,
            _ => {
                sample.add_scaled(&self.field, 1.0);
                FieldBounds::Inside
            }
        }
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounds.clone()
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bounded_field_vanishes_outside_box() {
        let mut field = UniformField::new(Vec3::zero(), Vec3::new(0.0, 1.0, 0.0)).with_bounds(
            BoundingBox::new(&Point3::new(0.0, 0.0, 0.0), &Point3::new(10.0, 10.0, 10.0)),
        );
        let mut sample = FieldSample::new(Vec3::new(1.0, 1.0, 1.0), Vec3::zero());
        assert_eq!(
            field.accumulate_field(&Point3::new(11.0, 5.0, 5.0), 0.0, &mut sample),
            FieldBounds::OutOfBounds
        );
        assert_eq!(sample.magnetic, Vec3::zero());

        assert_eq!(
            field.accumulate_field(&Point3::new(10.0, 5.0, 0.0), 0.0, &mut sample),
            FieldBounds::Inside
        );
        assert_abs_diff_eq!(sample.magnetic, Vec3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(sample.electric, Vec3::new(1.0, 1.0, 1.0));
    }
}
