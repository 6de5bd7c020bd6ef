//! Struct and functions for working with planar `Plane`s in 3D space,
//! including the polygon splitting primitive shared by the BSP tree and the
//! polygon tree.

use crate::float_types::{Real, tolerance};
use crate::solid::polygon::{Metadata, Polygon};
use crate::solid::vertex::Vertex;
use crate::tag::{Tag, next_tag};
use nalgebra::{Point2, Point3, Vector3};

// Vertex orientation flags. A polygon's orientation is the bitwise OR of its
// vertices', so FRONT | BACK == SPANNING.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// Where a polygon lies relative to a splitting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonClass {
    /// In the plane, facing the same way as the plane.
    CoplanarFront,
    /// In the plane, facing the opposite way.
    CoplanarBack,
    /// Entirely in front of the plane.
    Front,
    /// Entirely behind the plane.
    Back,
    /// Crosses the plane; see [`SplitResult::front`] / [`SplitResult::back`].
    Spanning,
}

/// Outcome of [`Plane::split_polygon`].
///
/// `front` / `back` are only populated for [`PolygonClass::Spanning`], and
/// only when the corresponding fragment keeps at least three vertices.
#[derive(Debug, Clone)]
pub struct SplitResult<S: Clone> {
    pub class: PolygonClass,
    pub front: Option<Polygon<S>>,
    pub back: Option<Polygon<S>>,
}

impl<S: Clone> SplitResult<S> {
    const fn classified(class: PolygonClass) -> Self {
        Self {
            class,
            front: None,
            back: None,
        }
    }
}

/// A plane in 3D space defined by a unit normal and offset `w`
/// (`normal · p = w` for points on the plane).
///
/// Like [`Vertex`], a plane carries an identity tag. Two planes compare equal
/// by value with [`Plane::equals`]; tag comparison is only meaningful after
/// canonicalization.
#[derive(Debug, Clone)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
    tag: Tag,
}

impl Plane {
    /// Create a plane from a normal that is already unit length.
    pub fn new(normal: Vector3<Real>, w: Real) -> Self {
        Plane {
            normal,
            w,
            tag: next_tag(),
        }
    }

    /// Create a plane from any non-zero normal; the normal is normalized and
    /// `w` is taken as the offset along the *unit* normal.
    pub fn from_normal(normal: Vector3<Real>, w: Real) -> Self {
        Plane::new(normal.normalize(), w)
    }

    /// Plane through three points, normal following the right-hand rule
    /// `(b - a) × (c - a)`.
    pub fn from_points(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Self {
        let normal = (b - a).cross(&(c - a)).normalize();
        let w = normal.dot(&a.coords);
        Plane::new(normal, w)
    }

    /// Plane of a polygon's vertex ring. Uses the first three vertices; if those
    /// are collinear the Newell normal of the whole ring is used instead.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        if vertices.len() < 3 {
            return Plane::new(Vector3::z(), 0.0);
        }
        let a = &vertices[0].pos;
        let cross = (vertices[1].pos - a).cross(&(vertices[2].pos - a));
        let eps = tolerance();
        if cross.norm_squared() > eps * eps * eps * eps {
            return Plane::from_points(a, &vertices[1].pos, &vertices[2].pos);
        }

        // Newell's method
        let newell = vertices.iter().zip(vertices.iter().cycle().skip(1)).fold(
            Vector3::zeros(),
            |acc: Vector3<Real>, (curr, next)| acc + curr.pos.coords.cross(&next.pos.coords),
        );
        if newell.norm_squared() <= Real::EPSILON {
            return Plane::new(Vector3::z(), a.z);
        }
        let normal = newell.normalize();
        Plane::new(normal, normal.dot(&a.coords))
    }

    /// Identity of this plane instance.
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    pub const fn offset(&self) -> Real {
        self.w
    }

    /// The same surface, facing the other way. Gets a fresh tag.
    pub fn flipped(&self) -> Plane {
        Plane::new(-self.normal, -self.w)
    }

    /// Flip in place.
    pub fn flip(&mut self) {
        *self = self.flipped();
    }

    /// Exact value equality of normal and offset.
    pub fn equals(&self, other: &Plane) -> bool {
        self.normal == other.normal && self.w == other.w
    }

    /// Signed distance of `point` from the plane, positive in front.
    pub fn signed_distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within tolerance.
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        orient_distance(self.signed_distance(point))
    }

    /// Intersection of the segment `p1 → p2` with the plane. The parameter is
    /// clamped to `[0, 1]` so near-parallel edges never overshoot, and a NaN
    /// parameter collapses to `p1`.
    pub fn split_line_between_points(
        &self,
        p1: &Point3<Real>,
        p2: &Point3<Real>,
    ) -> Point3<Real> {
        let direction = p2 - p1;
        let mut lambda = (self.w - self.normal.dot(&p1.coords)) / self.normal.dot(&direction);
        if lambda.is_nan() {
            lambda = 0.0;
        }
        p1 + direction * lambda.clamp(0.0, 1.0)
    }

    /// Classify `polygon` against this plane and, if it spans the plane, cut
    /// it into a front and a back fragment.
    ///
    /// Vertices within tolerance of the plane count as coplanar for the
    /// classification. During the cut each vertex goes to the side its exact
    /// signed distance puts it on, an intersection vertex is inserted on every
    /// edge that changes side, and near-duplicate consecutive vertices are
    /// then removed. A fragment left with fewer than three vertices is
    /// dropped. Fragments keep the source polygon's plane and shared record.
    pub fn split_polygon<S: Metadata>(&self, polygon: &Polygon<S>) -> SplitResult<S> {
        if self.equals(&polygon.plane) {
            return SplitResult::classified(PolygonClass::CoplanarFront);
        }

        let distances: Vec<Real> = polygon
            .vertices
            .iter()
            .map(|vertex| self.signed_distance(&vertex.pos))
            .collect();
        let polygon_type = distances
            .iter()
            .fold(COPLANAR, |acc, &t| acc | orient_distance(t));

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) >= 0.0 {
                    SplitResult::classified(PolygonClass::CoplanarFront)
                } else {
                    SplitResult::classified(PolygonClass::CoplanarBack)
                }
            },
            FRONT => SplitResult::classified(PolygonClass::Front),
            BACK => SplitResult::classified(PolygonClass::Back),
            _ => {
                let count = polygon.vertices.len();
                let mut front_vertices = Vec::with_capacity(count + 1);
                let mut back_vertices = Vec::with_capacity(count + 1);

                for i in 0..count {
                    let j = (i + 1) % count;
                    let vertex = &polygon.vertices[i];
                    let is_back = distances[i] < 0.0;
                    let next_is_back = distances[j] < 0.0;

                    if is_back == next_is_back {
                        if is_back {
                            back_vertices.push(vertex.clone());
                        } else {
                            front_vertices.push(vertex.clone());
                        }
                    } else {
                        let intersection = Vertex::new(
                            self.split_line_between_points(&vertex.pos, &polygon.vertices[j].pos),
                        );
                        if is_back {
                            back_vertices.push(vertex.clone());
                            back_vertices.push(intersection.clone());
                            front_vertices.push(intersection);
                        } else {
                            front_vertices.push(vertex.clone());
                            front_vertices.push(intersection.clone());
                            back_vertices.push(intersection);
                        }
                    }
                }

                remove_near_duplicates(&mut front_vertices);
                remove_near_duplicates(&mut back_vertices);

                let fragment = |vertices: Vec<Vertex>| {
                    (vertices.len() >= 3).then(|| {
                        Polygon::with_plane(vertices, polygon.shared.clone(), polygon.plane.clone())
                    })
                };

                SplitResult {
                    class: PolygonClass::Spanning,
                    front: fragment(front_vertices),
                    back: fragment(back_vertices),
                }
            },
        }
    }
}

#[inline]
fn orient_distance(t: Real) -> i8 {
    let eps = tolerance();
    if t > eps {
        FRONT
    } else if t < -eps {
        BACK
    } else {
        COPLANAR
    }
}

/// Drop vertices closer than tolerance to their predecessor in the ring.
fn remove_near_duplicates(vertices: &mut Vec<Vertex>) {
    if vertices.len() < 3 {
        return;
    }
    let eps = tolerance();
    let eps_squared = eps * eps;
    let mut prev = vertices[vertices.len() - 1].pos;
    vertices.retain(|vertex| {
        let keep = (vertex.pos - prev).norm_squared() >= eps_squared;
        prev = vertex.pos;
        keep
    });
}

/// A right-handed 2D coordinate frame lying in a plane.
///
/// `u` and `v` are orthonormal and span the plane; `to_2d` projects onto
/// them and `to_3d` maps back onto the plane.
#[derive(Debug, Clone)]
pub struct OrthoNormalBasis {
    pub u: Vector3<Real>,
    pub v: Vector3<Real>,
    plane_origin: Vector3<Real>,
}

impl OrthoNormalBasis {
    /// Basis for `plane`, using the coordinate axis least parallel to its
    /// normal as the right vector.
    pub fn new(plane: &Plane) -> Self {
        Self::with_right_vector(plane, &least_parallel_axis(&plane.normal))
    }

    pub fn with_right_vector(plane: &Plane, right_vector: &Vector3<Real>) -> Self {
        let v = plane.normal.cross(right_vector).normalize();
        let u = v.cross(&plane.normal);
        OrthoNormalBasis {
            u,
            v,
            plane_origin: plane.normal * plane.w,
        }
    }

    pub fn to_2d(&self, point: &Point3<Real>) -> Point2<Real> {
        Point2::new(point.coords.dot(&self.u), point.coords.dot(&self.v))
    }

    pub fn to_3d(&self, point: &Point2<Real>) -> Point3<Real> {
        Point3::from(self.plane_origin + self.u * point.x + self.v * point.y)
    }
}

fn least_parallel_axis(normal: &Vector3<Real>) -> Vector3<Real> {
    let abs = normal.abs();
    if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.x && abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    }
}
