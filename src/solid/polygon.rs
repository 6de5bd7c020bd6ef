//! Struct and functions for working with `Polygon`s and their `Shared`
//! attribute records.

use crate::errors::ValidationError;
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::float_types::{Real, tolerance};
use crate::solid::plane::Plane;
use crate::solid::vertex::Vertex;
use crate::tag::{Tag, next_tag};
use nalgebra::{Matrix4, Point3, Vector3};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::OnceLock;

/// Bounds required of per-polygon metadata. Metadata is deduplicated by
/// value during canonicalization, so it must be hashable.
pub trait Metadata: Clone + Debug + Hash + Eq + Send + Sync {}

impl<T: Clone + Debug + Hash + Eq + Send + Sync> Metadata for T {}

/// Per-polygon attribute record (e.g. a color), deduplicated independently
/// of geometry. `metadata: None` means "no attributes".
#[derive(Debug, Clone)]
pub struct Shared<S: Clone> {
    pub metadata: Option<S>,
    tag: Tag,
}

impl<S: Clone> Shared<S> {
    pub fn new(metadata: Option<S>) -> Self {
        Shared {
            metadata,
            tag: next_tag(),
        }
    }

    /// Identity of this record instance.
    pub const fn tag(&self) -> Tag {
        self.tag
    }
}

impl<S: Clone> Default for Shared<S> {
    fn default() -> Self {
        Shared::new(None)
    }
}

impl<S: Clone + PartialEq> PartialEq for Shared<S> {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata
    }
}

/// A convex, planar polygon: an ordered ring of at least three vertices, the
/// plane it lies on, and a shared attribute record.
///
/// Polygons are treated as immutable values; every flip, split or transform
/// produces a new one.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    pub plane: Plane,
    pub shared: Shared<S>,

    /// Lazily calculated `(center, radius)` enclosing the vertices.
    bounding_sphere: OnceLock<(Point3<Real>, Real)>,
}

impl<S: Metadata> Polygon<S> {
    /// Create a polygon from vertices, computing its plane from them.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        Self::with_shared(vertices, Shared::new(metadata))
    }

    /// Create a polygon with an existing shared record, computing its plane.
    pub fn with_shared(vertices: Vec<Vertex>, shared: Shared<S>) -> Self {
        let plane = Plane::from_vertices(&vertices);
        Self::with_plane(vertices, shared, plane)
    }

    /// Create a polygon with a known plane and shared record.
    pub const fn with_plane(vertices: Vec<Vertex>, shared: Shared<S>, plane: Plane) -> Self {
        Polygon {
            vertices,
            plane,
            shared,
            bounding_sphere: OnceLock::new(),
        }
    }

    /// Same polygon facing the other way: reversed ring, flipped plane.
    pub fn flipped(&self) -> Polygon<S> {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Polygon::with_plane(vertices, self.shared.clone(), self.plane.flipped())
    }

    /// Axis-aligned bounds of the vertex ring.
    pub fn bounding_box(&self) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for v in &self.vertices {
            mins = mins.inf(&v.pos);
            maxs = maxs.sup(&v.pos);
        }
        Aabb::new(mins, maxs)
    }

    /// `(center, radius)` of a sphere enclosing the polygon: the center of the
    /// bounding box and its half diagonal. Cached after the first call.
    pub fn bounding_sphere(&self) -> (Point3<Real>, Real) {
        *self.bounding_sphere.get_or_init(|| {
            let aabb = self.bounding_box();
            let center = nalgebra::center(&aabb.mins, &aabb.maxs);
            (center, (aabb.maxs - center).norm())
        })
    }

    /// `true` if every corner turns the same way as the plane normal
    /// (within tolerance).
    pub fn is_convex(&self) -> bool {
        self.first_reflex_vertex().is_none()
    }

    fn first_reflex_vertex(&self) -> Option<&Vertex> {
        let count = self.vertices.len();
        if count < 3 {
            return None;
        }
        let eps = tolerance();
        let normal = self.plane.normal;
        (0..count).find_map(|i| {
            let prev = &self.vertices[(i + count - 2) % count].pos;
            let curr = &self.vertices[(i + count - 1) % count].pos;
            let next = &self.vertices[i].pos;
            let turn = (curr - prev).cross(&(next - curr)).dot(&normal);
            (turn < -eps).then(|| &self.vertices[(i + count - 1) % count])
        })
    }

    /// Check the input contract: finite coordinates, all vertices on the
    /// plane, convex ring.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let eps = tolerance();
        for v in &self.vertices {
            if !v.pos.iter().all(|c| c.is_finite()) {
                return Err(ValidationError::InvalidCoordinate(v.pos));
            }
            if self.plane.signed_distance(&v.pos).abs() > eps {
                return Err(ValidationError::NonPlanarPolygon(v.pos));
            }
        }
        match self.first_reflex_vertex() {
            Some(v) => Err(ValidationError::NonConvexPolygon(v.pos)),
            None => Ok(()),
        }
    }

    /// Area of the polygon, positive when the ring winds counter-clockwise
    /// around the plane normal.
    pub fn area(&self) -> Real {
        let sum = self
            .vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .fold(Vector3::zeros(), |acc: Vector3<Real>, (curr, next)| {
                acc + curr.pos.coords.cross(&next.pos.coords)
            });
        0.5 * sum.dot(&self.plane.normal)
    }

    /// Signed volume of the cone from the origin to this polygon. Summed over a
    /// closed solid this is the enclosed volume.
    pub fn signed_volume(&self) -> Real {
        let Some(first) = self.vertices.first() else {
            return 0.0;
        };
        self.vertices[1..]
            .windows(2)
            .map(|pair| {
                first
                    .pos
                    .coords
                    .dot(&pair[0].pos.coords.cross(&pair[1].pos.coords))
                    / 6.0
            })
            .sum()
    }

    /// Apply an affine transform to every vertex and recompute the plane.
    pub fn transform(&self, mat: &Matrix4<Real>) -> Polygon<S> {
        let vertices = self.vertices.iter().map(|v| v.transform(mat)).collect();
        Polygon::with_shared(vertices, self.shared.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon<()> {
        Polygon::new(
            vec![
                Vertex::new(Point3::new(0.0, 0.0, 0.0)),
                Vertex::new(Point3::new(2.0, 0.0, 0.0)),
                Vertex::new(Point3::new(2.0, 2.0, 0.0)),
                Vertex::new(Point3::new(0.0, 2.0, 0.0)),
            ],
            None,
        )
    }

    #[test]
    fn area_and_flip() {
        let poly = square();
        assert!((poly.area() - 4.0).abs() < 1e-12);
        let flipped = poly.flipped();
        assert!((flipped.area() - 4.0).abs() < 1e-12);
        assert!((flipped.plane.normal + poly.plane.normal).norm() < 1e-12);
        assert!(flipped.shared.tag() == poly.shared.tag());
    }

    #[test]
    fn bounding_sphere_encloses_ring() {
        let poly = square();
        let (center, radius) = poly.bounding_sphere();
        assert_eq!(center, Point3::new(1.0, 1.0, 0.0));
        assert!((radius - 2.0_f64.sqrt() as Real).abs() < 1e-12);
    }

    #[test]
    fn reflex_corner_is_reported() {
        let poly: Polygon<()> = Polygon::new(
            vec![
                Vertex::new(Point3::new(0.0, 0.0, 0.0)),
                Vertex::new(Point3::new(2.0, 0.0, 0.0)),
                Vertex::new(Point3::new(1.0, 0.5, 0.0)),
                Vertex::new(Point3::new(2.0, 2.0, 0.0)),
                Vertex::new(Point3::new(0.0, 2.0, 0.0)),
            ],
            None,
        );
        assert!(!poly.is_convex());
        assert_eq!(
            poly.validate(),
            Err(ValidationError::NonConvexPolygon(Point3::new(1.0, 0.5, 0.0)))
        );
        assert!(square().validate().is_ok());
    }
}
