//! Struct and functions for working with `Vertex`s from which `Polygon`s are composed.

use crate::float_types::Real;
use crate::tag::{Tag, next_tag};
use nalgebra::{Matrix4, Point3};

/// A vertex of a polygon: a position plus an identity tag.
///
/// Equality compares positions. Use [`Vertex::same_instance`] (or compare
/// [`Vertex::tag`]) when identity matters, e.g. after canonicalization.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub pos: Point3<Real>,
    tag: Tag,
}

impl Vertex {
    /// Create a new [`Vertex`] with a fresh tag.
    pub fn new(pos: Point3<Real>) -> Self {
        Vertex {
            pos,
            tag: next_tag(),
        }
    }

    /// Identity of this vertex instance.
    pub const fn tag(&self) -> Tag {
        self.tag
    }

    /// `true` if both are the same instance (or clones of it).
    pub const fn same_instance(&self, other: &Vertex) -> bool {
        self.tag == other.tag
    }

    /// Linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        Vertex::new(self.pos + (other.pos - self.pos) * t)
    }

    /// Apply an affine 4x4 transform, producing a new instance.
    pub fn transform(&self, mat: &Matrix4<Real>) -> Vertex {
        Vertex::new(mat.transform_point(&self.pos))
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let v = Vertex::new(Point3::new(1.0, 2.0, 3.0));
        let w = v.clone();
        let u = Vertex::new(Point3::new(1.0, 2.0, 3.0));
        assert!(v.same_instance(&w));
        assert!(!v.same_instance(&u));
        assert_eq!(v, u);
    }

    #[test]
    fn interpolate_midpoint() {
        let a = Vertex::new(Point3::new(0.0, 0.0, 0.0));
        let b = Vertex::new(Point3::new(2.0, 4.0, -2.0));
        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.pos, Point3::new(1.0, 2.0, -1.0));
    }
}
