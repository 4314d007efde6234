//! Trilinear interpolation on regular 3D grids.

use super::{fip, RegularSampling1};
use crate::geometry::{Dim3, In3D, Point3};
use ndarray::Array3;

/// A regular 3D grid given by one regular sampling per dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct RegularGrid3 {
    samplings: In3D<RegularSampling1>,
}

/// Location of a point within a grid cell.
#[derive(Clone, Debug, PartialEq)]
pub struct GridCellPosition3 {
    /// Indices of the lower corner of the cell.
    pub indices: In3D<usize>,
    /// Fractional position within the cell along each dimension.
    pub fractions: In3D<fip>,
}

impl RegularGrid3 {
    pub fn new(samplings: In3D<RegularSampling1>) -> Self {
        Self { samplings }
    }

    /// Creates a grid from its lower corner, spacings and number of points.
    pub fn from_corner(lower_corner: &Point3<fip>, spacing: &In3D<fip>, shape: &In3D<usize>) -> Self {
        Self::new(In3D::with_each_component(|dim| {
            RegularSampling1::new(lower_corner[dim], spacing[dim], shape[dim])
        }))
    }

    pub fn sampling(&self, dim: Dim3) -> &RegularSampling1 {
        &self.samplings[dim]
    }

    /// Number of grid points along each dimension.
    pub fn shape(&self) -> In3D<usize> {
        In3D::with_each_component(|dim| self.samplings[dim].size())
    }

    pub fn lower_corner(&self) -> Point3<fip> {
        Point3::with_each_component(|dim| self.samplings[dim].start())
    }

    pub fn upper_corner(&self) -> Point3<fip> {
        Point3::with_each_component(|dim| self.samplings[dim].end())
    }

    /// Finds the cell containing the given point, or `None` if the point is
    /// outside the grid. Lower grid boundaries are inside, upper are outside.
    pub fn find_cell(&self, point: &Point3<fip>) -> Option<GridCellPosition3> {
        let (ix, fx) = self.samplings[Dim3::X].find_interval(point[Dim3::X])?;
        let (iy, fy) = self.samplings[Dim3::Y].find_interval(point[Dim3::Y])?;
        let (iz, fz) = self.samplings[Dim3::Z].find_interval(point[Dim3::Z])?;
        Some(GridCellPosition3 {
            indices: In3D::new(ix, iy, iz),
            fractions: In3D::new(fx, fy, fz),
        })
    }
}

/// Interpolates the values in `array` trilinearly at the given cell position.
pub fn interp_trilinear(array: &Array3<fip>, cell: &GridCellPosition3) -> fip {
    let (i, j, k) = (
        cell.indices[Dim3::X],
        cell.indices[Dim3::Y],
        cell.indices[Dim3::Z],
    );
    let (fx, fy, fz) = (
        cell.fractions[Dim3::X],
        cell.fractions[Dim3::Y],
        cell.fractions[Dim3::Z],
    );

    let lerp = |a: fip, b: fip, f: fip| a + f * (b - a);

    let c00 = lerp(array[[i, j, k]], array[[i + 1, j, k]], fx);
    let c10 = lerp(array[[i, j + 1, k]], array[[i + 1, j + 1, k]], fx);
    let c01 = lerp(array[[i, j, k + 1]], array[[i + 1, j, k + 1]], fx);
    let c11 = lerp(array[[i, j + 1, k + 1]], array[[i + 1, j + 1, k + 1]], fx);

    lerp(lerp(c00, c10, fy), lerp(c01, c11, fy), fz)
}
