//! Geometric utility objects.

use crate::num::{cmp, BFloat};
use std::{
    fmt,
    ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub},
};

#[cfg(any(test, feature = "for-testing"))]
use approx::{AbsDiffEq, RelativeEq};

/// Denotes the x-, y- or z-dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dim3 {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Dim3 {
    /// Creates an array for iterating over the x-, y- and z-dimensions.
    pub fn slice() -> [Self; 3] {
        [Self::X, Self::Y, Self::Z]
    }

    /// Returns the number of the dimension.
    pub fn num(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Dim3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::X => "x",
                Self::Y => "y",
                Self::Z => "z",
            }
        )
    }
}

use Dim3::{X, Y, Z};

/// Represents any quantity with three dimensional components.
#[derive(Clone, Debug, PartialEq)]
pub struct In3D<T>([T; 3]);

impl<T> In3D<T> {
    /// Creates a new 3D quantity given the three components.
    pub fn new(x: T, y: T, z: T) -> Self {
        Self([x, y, z])
    }

    /// Creates a new 3D quantity by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> T,
    {
        Self::new(
            create_component(X),
            create_component(Y),
            create_component(Z),
        )
    }

    /// Creates a new 3D quantity with the given value copied into all components.
    pub fn same(a: T) -> Self
    where
        T: Copy,
    {
        Self([a, a, a])
    }
}

impl<T> Index<Dim3> for In3D<T> {
    type Output = T;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim as usize]
    }
}

impl<T> IndexMut<Dim3> for In3D<T> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim as usize]
    }
}

impl<'a, T> IntoIterator for &'a In3D<T> {
    type Item = &'a T;
    type IntoIter = ::std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: fmt::Display> fmt::Display for In3D<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self[X], self[Y], self[Z])
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl<T> AbsDiffEq for In3D<T>
where
    T: AbsDiffEq,
    T::Epsilon: Copy,
{
    type Epsilon = <T as AbsDiffEq>::Epsilon;

    fn default_epsilon() -> Self::Epsilon {
        T::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        Dim3::slice()
            .into_iter()
            .all(|dim| T::abs_diff_eq(&self[dim], &other[dim], epsilon))
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl<T> RelativeEq for In3D<T>
where
    T: RelativeEq,
    T::Epsilon: Copy,
{
    fn default_max_relative() -> Self::Epsilon {
        T::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        Dim3::slice()
            .into_iter()
            .all(|dim| T::relative_eq(&self[dim], &other[dim], epsilon, max_relative))
    }
}

#[cfg(any(test, feature = "for-testing"))]
macro_rules! impl_approx_eq_3d {
    ($T:ident <$F:ident>) => {
        impl<$F> AbsDiffEq for $T<$F>
        where
            $F: BFloat + AbsDiffEq,
            $F::Epsilon: Copy,
        {
            type Epsilon = <In3D<$F> as AbsDiffEq>::Epsilon;

            fn default_epsilon() -> Self::Epsilon {
                In3D::<$F>::default_epsilon()
            }

            fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
                In3D::<$F>::abs_diff_eq(&self.0, &other.0, epsilon)
            }
        }

        impl<$F> RelativeEq for $T<$F>
        where
            $F: BFloat + RelativeEq,
            $F::Epsilon: Copy,
        {
            fn default_max_relative() -> Self::Epsilon {
                In3D::<$F>::default_max_relative()
            }

            fn relative_eq(
                &self,
                other: &Self,
                epsilon: Self::Epsilon,
                max_relative: Self::Epsilon,
            ) -> bool {
                In3D::<$F>::relative_eq(&self.0, &other.0, epsilon, max_relative)
            }
        }
    };
}

/// A 3D vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Vec3<F>(In3D<F>);

impl<F: BFloat> Vec3<F> {
    /// Creates a new 3D vector given the three components.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self(In3D::new(x, y, z))
    }

    /// Creates a new 3D vector by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> F,
    {
        Self(In3D::with_each_component(create_component))
    }

    /// Creates a new zero vector.
    pub fn zero() -> Self {
        Self::new(F::zero(), F::zero(), F::zero())
    }

    /// Constructs a new point from the vector components.
    pub fn to_point3(&self) -> Point3<F> {
        Point3::with_each_component(|dim| self[dim])
    }

    /// Computes the squared length of the vector.
    pub fn squared_length(&self) -> F {
        self.dot(self)
    }

    /// Computes the length of the vector.
    pub fn length(&self) -> F {
        self.squared_length().sqrt()
    }

    /// Whether the vector is the zero vector.
    pub fn is_zero(&self) -> bool {
        self.0.into_iter().all(|&c| c == F::zero())
    }

    /// Whether all components are finite.
    pub fn is_finite(&self) -> bool {
        self.0.into_iter().all(|c| c.is_finite())
    }

    /// Computes the dot product of the vector with another vector.
    pub fn dot(&self, other: &Self) -> F {
        self[X] * other[X] + self[Y] * other[Y] + self[Z] * other[Z]
    }

    /// Computes the cross product of the vector with another vector.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self[Y] * other[Z] - self[Z] * other[Y],
            self[Z] * other[X] - self[X] * other[Z],
            self[X] * other[Y] - self[Y] * other[X],
        )
    }

    /// Adds the given vector scaled by `factor` to this vector.
    pub fn add_scaled(&mut self, other: &Self, factor: F) {
        for dim in Dim3::slice() {
            self[dim] = self[dim] + factor * other[dim];
        }
    }
}

impl<F: BFloat> Index<Dim3> for Vec3<F> {
    type Output = F;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim]
    }
}

impl<F: BFloat> IndexMut<Dim3> for Vec3<F> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl<'a, F: BFloat> Add<&'a Vec3<F>> for &'a Vec3<F> {
    type Output = Vec3<F>;
    fn add(self, other: Self) -> Self::Output {
        Vec3::with_each_component(|dim| self[dim] + other[dim])
    }
}

impl<F: BFloat> Add<Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn add(self, other: Self) -> Self::Output {
        &self + &other
    }
}

impl<'a, F: BFloat> Sub<&'a Vec3<F>> for &'a Vec3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: Self) -> Self::Output {
        Vec3::with_each_component(|dim| self[dim] - other[dim])
    }
}

impl<F: BFloat> Sub<Vec3<F>> for Vec3<F> {
    type Output = Self;
    fn sub(self, other: Self) -> Self::Output {
        &self - &other
    }
}

impl<F: BFloat> Mul<F> for &Vec3<F> {
    type Output = Vec3<F>;
    fn mul(self, factor: F) -> Self::Output {
        Vec3::with_each_component(|dim| factor * self[dim])
    }
}

impl<F: BFloat> Mul<F> for Vec3<F> {
    type Output = Self;
    fn mul(self, factor: F) -> Self::Output {
        &self * factor
    }
}

impl<F: BFloat> Div<F> for &Vec3<F> {
    type Output = Vec3<F>;
    fn div(self, divisor: F) -> Self::Output {
        #![allow(clippy::suspicious_arithmetic_impl)]
        self * divisor.recip()
    }
}

impl<F: BFloat> Neg for &Vec3<F> {
    type Output = Vec3<F>;
    fn neg(self) -> Self::Output {
        Vec3::with_each_component(|dim| -self[dim])
    }
}

impl<F: BFloat + fmt::Display> fmt::Display for Vec3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self[X], self[Y], self[Z])
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl_approx_eq_3d!(Vec3<F>);

/// A 3D spatial coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct Point3<F>(In3D<F>);

impl<F: BFloat> Point3<F> {
    /// Creates a new 3D point given the three components.
    pub fn new(x: F, y: F, z: F) -> Self {
        Self(In3D::new(x, y, z))
    }

    /// Creates a new 3D point by evaluating the given component
    /// constructor for each dimension.
    pub fn with_each_component<C>(create_component: C) -> Self
    where
        C: Fn(Dim3) -> F,
    {
        Self(In3D::with_each_component(create_component))
    }

    /// Creates a new 3D point with all components set to zero.
    pub fn origin() -> Self {
        Self::new(F::zero(), F::zero(), F::zero())
    }

    /// Returns a copy of the point moved by `offset` along `dim`.
    pub fn shifted(&self, dim: Dim3, offset: F) -> Self {
        let mut shifted = self.clone();
        shifted[dim] = shifted[dim] + offset;
        shifted
    }
}

impl<F: BFloat> Index<Dim3> for Point3<F> {
    type Output = F;
    fn index(&self, dim: Dim3) -> &Self::Output {
        &self.0[dim]
    }
}

impl<F: BFloat> IndexMut<Dim3> for Point3<F> {
    fn index_mut(&mut self, dim: Dim3) -> &mut Self::Output {
        &mut self.0[dim]
    }
}

impl<'a, F: BFloat> Sub<&'a Point3<F>> for &'a Point3<F> {
    type Output = Vec3<F>;
    fn sub(self, other: &'a Point3<F>) -> Self::Output {
        Vec3::with_each_component(|dim| self[dim] - other[dim])
    }
}

impl<'a, F: BFloat> Add<&'a Vec3<F>> for &'a Point3<F> {
    type Output = Point3<F>;
    fn add(self, vector: &Vec3<F>) -> Self::Output {
        Point3::with_each_component(|dim| self[dim] + vector[dim])
    }
}

impl<F: BFloat> Add<Vec3<F>> for Point3<F> {
    type Output = Self;
    fn add(self, vector: Vec3<F>) -> Self::Output {
        &self + &vector
    }
}

impl<F: BFloat + fmt::Display> fmt::Display for Point3<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self[X], self[Y], self[Z])
    }
}

#[cfg(any(test, feature = "for-testing"))]
impl_approx_eq_3d!(Point3<F>);

/// Axis-aligned box bounding the domain of a field element.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox {
    lower_corner: Point3<f64>,
    upper_corner: Point3<f64>,
}

impl BoundingBox {
    /// Creates the smallest box containing both given corners.
    pub fn new(corner_a: &Point3<f64>, corner_b: &Point3<f64>) -> Self {
        Self {
            lower_corner: Point3::with_each_component(|dim| f64::min(corner_a[dim], corner_b[dim])),
            upper_corner: Point3::with_each_component(|dim| f64::max(corner_a[dim], corner_b[dim])),
        }
    }

    /// Creates the smallest box containing all the given points, or `None`
    /// if there are no points.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounding_box = Self::new(first, first);
        for point in points {
            bounding_box.enlarge_to_contain(point);
        }
        Some(bounding_box)
    }

    pub fn lower_corner(&self) -> &Point3<f64> {
        &self.lower_corner
    }

    pub fn upper_corner(&self) -> &Point3<f64> {
        &self.upper_corner
    }

    /// Computes the extent of the box along each dimension.
    pub fn extent(&self) -> Vec3<f64> {
        &self.upper_corner - &self.lower_corner
    }

    /// Whether the point lies inside the box, with boundaries included up to
    /// floating point round-off.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        Dim3::slice().into_iter().all(|dim| {
            cmp::le(self.lower_corner[dim], point[dim]) && cmp::le(point[dim], self.upper_corner[dim])
        })
    }

    /// Grows the box as needed to include the given point.
    pub fn enlarge_to_contain(&mut self, point: &Point3<f64>) {
        for dim in Dim3::slice() {
            self.lower_corner[dim] = f64::min(self.lower_corner[dim], point[dim]);
            self.upper_corner[dim] = f64::max(self.upper_corner[dim], point[dim]);
        }
    }

    /// Grows the box as needed to include the other box.
    pub fn enlarge_to_contain_box(&mut self, other: &Self) {
        self.enlarge_to_contain(&other.lower_corner);
        self.enlarge_to_contain(&other.upper_corner);
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.lower_corner, self.upper_corner)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cross_product_is_right_handed() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(y.cross(&x), -&Vec3::new(0.0, 0.0, 1.0));

        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-2.0, 0.5, 4.0);
        let c = a.cross(&b);
        assert_abs_diff_eq!(c.dot(&a), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.dot(&b), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bounding_box_contains_its_boundary() {
        let bounding_box = BoundingBox::new(&Point3::new(1.0, 1.0, 1.0), &Point3::new(-1.0, 0.0, 2.0));
        assert_eq!(bounding_box.lower_corner(), &Point3::new(-1.0, 0.0, 1.0));
        assert!(bounding_box.contains(&Point3::new(1.0, 0.0, 2.0)));
        assert!(bounding_box.contains(&Point3::new(0.0, 0.5, 1.5)));
        assert!(!bounding_box.contains(&Point3::new(0.0, 0.5, 2.1)));
    }

    #[test]
    fn bounding_box_grows_to_enclose_points() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, -1.0, 0.5),
            Point3::new(-1.0, 3.0, 0.0),
        ];
        let bounding_box = BoundingBox::enclosing(&points).unwrap();
        assert_eq!(bounding_box.extent(), Vec3::new(3.0, 4.0, 0.5));
        assert_eq!(&points[1] - &points[2], Vec3::new(3.0, -4.0, 0.5));
        let no_points: [Point3<f64>; 0] = [];
        assert!(BoundingBox::enclosing(&no_points).is_none());
    }
}
