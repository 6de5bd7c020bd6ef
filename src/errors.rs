//! Validation errors

use crate::float_types::Real;
use nalgebra::{Point2, Point3};

/// All the possible validation issues we might encounter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A ring has fewer than the minimal number of points
    #[error("(TooFewPoints) A shape needs at least 3 points, got {0}")]
    TooFewPoints(usize),
    /// The outline of an area crosses itself
    #[error("(SelfIntersection) The outline is self intersecting")]
    SelfIntersection,
    /// The area enclosed by an outline is (almost) zero
    #[error("(DegenerateArea) The outline encloses a degenerate area of {0}")]
    DegenerateArea(Real),
    /// The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// A polygon has a reflex corner
    #[error("(NonConvexPolygon) The polygon is not convex at: {0}")]
    NonConvexPolygon(Point3<Real>),
    /// A polygon vertex is off the polygon's plane
    #[error("(NonPlanarPolygon) The polygon is not planar at: {0}")]
    NonPlanarPolygon(Point3<Real>),
    /// A wall polygon has a vertex that is neither on z=-1 nor on z=+1
    #[error("(WallVertexOutOfRange) Wall polygon vertex is not at |z| = 1: {0}")]
    WallVertexOutOfRange(Point3<Real>),
    /// A wall polygon does not have exactly two vertices on z=+1
    #[error("(WallTopVertexCount) Wall polygon has {0} vertices with z > 0, expected 2")]
    WallTopVertexCount(usize),
    /// The two top vertices of a wall polygon are neither adjacent nor wrapping
    #[error("(WallWinding) Unknown wall vertex index combination: {0}, {1}")]
    WallWinding(usize, usize),
    /// A face refers to a point index that does not exist
    #[error("(IndexOutOfRange) Face index {0} is out of range")]
    IndexOutOfRange(usize),
    /// Walking the sides of an area reached a vertex with no outgoing side
    #[error("(AreaNotClosed) Area is not closed at: {0}")]
    AreaNotClosed(Point2<Real>),
}
