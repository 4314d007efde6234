//! Fields given by local polynomial fits on a regular grid of cells.

use super::{ffd, FieldBounds, FieldEvaluator, FieldSample};
use crate::{
    error::TrackingError,
    geometry::{BoundingBox, Dim3, In3D, Point3, Vec3},
    interpolation::trilinear::RegularGrid3,
};
use ndarray::{Array2, ArrayView1};
use std::sync::Arc;

/// Number of field components described by a polynomial vector
/// (three electric followed by three magnetic).
pub const N_FIELD_COMPONENTS: usize = 6;

/// Lists the exponents `[i, j, k]` of the monomials `x^i y^j z^k` with total
/// order up to `max_order`.
///
/// Monomials are ordered by increasing total order, and within an order by
/// decreasing power of `x`, then of `y`.
pub fn monomial_exponents(max_order: usize) -> Vec<[usize; 3]> {
    let mut exponents = Vec::with_capacity(monomial_count(max_order));
    for order in 0..=max_order {
        for i in (0..=order).rev() {
            for j in (0..=order - i).rev() {
                exponents.push([i, j, order - i - j]);
            }
        }
    }
    exponents
}

/// Number of monomials in three variables with total order up to
/// `max_order`.
pub fn monomial_count(max_order: usize) -> usize {
    (max_order + 1) * (max_order + 2) * (max_order + 3) / 6
}

/// A polynomial for each field component, sharing the same monomials.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialVector {
    max_order: usize,
    coefficients: Array2<ffd>,
}

impl PolynomialVector {
    /// Creates a new polynomial vector.
    ///
    /// Row `c` of `coefficients` holds the coefficients of field component
    /// `c` for the monomials in the order given by [`monomial_exponents`].
    pub fn new(max_order: usize, coefficients: Array2<ffd>) -> Result<Self, TrackingError> {
        let expected_shape = (N_FIELD_COMPONENTS, monomial_count(max_order));
        if coefficients.dim() != expected_shape {
            return Err(TrackingError::InvalidConfig(format!(
                "polynomial coefficients have shape {:?}, expected {:?} for order {}",
                coefficients.dim(),
                expected_shape,
                max_order
            )));
        }
        Ok(Self {
            max_order,
            coefficients,
        })
    }

    /// Creates a polynomial vector giving constant fields.
    pub fn constant(field: &FieldSample) -> Self {
        let mut coefficients = Array2::zeros((N_FIELD_COMPONENTS, 1));
        for dim in Dim3::slice() {
            coefficients[[dim.num(), 0]] = field.electric[dim];
            coefficients[[3 + dim.num(), 0]] = field.magnetic[dim];
        }
        Self {
            max_order: 0,
            coefficients,
        }
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Evaluates the polynomials at the given local coordinates.
    pub fn evaluate(&self, local: &Vec3<ffd>, exponents: &[[usize; 3]]) -> FieldSample {
        let monomials: Vec<ffd> = exponents
            .iter()
            .take(self.coefficients.ncols())
            .map(|&[i, j, k]| {
                local[Dim3::X].powi(i as i32)
                    * local[Dim3::Y].powi(j as i32)
                    * local[Dim3::Z].powi(k as i32)
            })
            .collect();
        let component = |row: ArrayView1<ffd>| -> ffd {
            row.iter().zip(monomials.iter()).map(|(c, m)| c * m).sum()
        };
        FieldSample::new(
            Vec3::with_each_component(|dim| component(self.coefficients.row(dim.num()))),
            Vec3::with_each_component(|dim| component(self.coefficients.row(3 + dim.num()))),
        )
    }
}

/// A field described by one polynomial vector per grid cell.
///
/// The polynomial of a cell is evaluated at the offset [mm] of the position
/// from the lower corner of the cell. Cells are stored with the `z` index
/// varying fastest. As for other gridded fields, lower grid boundaries are
/// inside and upper boundaries outside.
#[derive(Clone, Debug)]
pub struct PolynomialPatch {
    grid: RegularGrid3,
    polynomials: Arc<Vec<PolynomialVector>>,
    exponents: Arc<Vec<[usize; 3]>>,
}

impl PolynomialPatch {
    /// Creates a new patch from the grid of cell corners and the polynomial
    /// for each cell.
    pub fn new(
        grid: RegularGrid3,
        polynomials: Vec<PolynomialVector>,
    ) -> Result<Self, TrackingError> {
        let shape = grid.shape();
        let n_cells: usize = Dim3::slice()
            .iter()
            .map(|&dim| shape[dim] - 1)
            .product();
        if polynomials.len() != n_cells {
            return Err(TrackingError::InvalidConfig(format!(
                "patch has {} cells but {} polynomials were given",
                n_cells,
                polynomials.len()
            )));
        }
        let max_order = polynomials
            .iter()
            .map(PolynomialVector::max_order)
            .max()
            .unwrap_or(0);
        Ok(Self {
            grid,
            polynomials: Arc::new(polynomials),
            exponents: Arc::new(monomial_exponents(max_order)),
        })
    }

    pub fn grid(&self) -> &RegularGrid3 {
        &self.grid
    }

    fn cell_index(&self, indices: &In3D<usize>) -> usize {
        let shape = self.grid.shape();
        (indices[Dim3::X] * (shape[Dim3::Y] - 1) + indices[Dim3::Y]) * (shape[Dim3::Z] - 1)
            + indices[Dim3::Z]
    }
}

impl FieldEvaluator for PolynomialPatch {
    fn accumulate_field(
        &mut self,
        position: &Point3<ffd>,
        _time: ffd,
        sample: &mut FieldSample,
    ) -> FieldBounds {
        let cell = match self.grid.find_cell(position) {
            Some(cell) => cell,
            None => return FieldBounds::OutOfBounds,
        };
        let local = Vec3::with_each_component(|dim| {
            cell.fractions[dim] * self.grid.sampling(dim).spacing()
        });
        let polynomial = &self.polynomials[self.cell_index(&cell.indices)];
        sample.add_scaled(&polynomial.evaluate(&local, &self.exponents), 1.0);
        FieldBounds::Inside
    }

    fn bounding_box(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(
            &self.grid.lower_corner(),
            &self.grid.upper_corner(),
        ))
    }

    fn clone_box(&self) -> Box<dyn FieldEvaluator> {
        Box::new(self.clone())
    }
}
