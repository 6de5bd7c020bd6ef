//! Directed sides of a 2D area and their 3D wall counterparts.

use crate::errors::ValidationError;
use crate::float_types::Real;
use crate::solid::polygon::Polygon;
use crate::solid::vertex::Vertex;
use crate::tag::{Tag, next_tag};
use log::warn;
use nalgebra::{Point2, Point3, Vector2};

/// A 2D vertex with an identity tag, the planar analogue of
/// [`Vertex`](crate::solid::vertex::Vertex).
#[derive(Debug, Clone)]
pub struct Vertex2 {
    pub pos: Point2<Real>,
    tag: Tag,
}

impl Vertex2 {
    pub fn new(pos: Point2<Real>) -> Self {
        Vertex2 {
            pos,
            tag: next_tag(),
        }
    }

    pub const fn tag(&self) -> Tag {
        self.tag
    }
}

impl PartialEq for Vertex2 {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

/// A directed side from `vertex0` to `vertex1`. The area lies to the left.
#[derive(Debug, Clone, PartialEq)]
pub struct Side {
    pub vertex0: Vertex2,
    pub vertex1: Vertex2,
}

/// Accepted `z` window around `±1` for wall polygon vertices.
const WALL_Z_SLACK: Real = 0.001;

impl Side {
    pub const fn new(vertex0: Vertex2, vertex1: Vertex2) -> Self {
        Side { vertex0, vertex1 }
    }

    pub fn direction(&self) -> Vector2<Real> {
        self.vertex1.pos - self.vertex0.pos
    }

    pub fn length(&self) -> Real {
        self.direction().norm()
    }

    pub fn flipped(&self) -> Side {
        Side::new(self.vertex1.clone(), self.vertex0.clone())
    }

    /// Extrude into the quad `[v0@z0, v1@z0, v1@z1, v0@z1]`.
    pub fn to_polygon_3d(&self, z0: Real, z1: Real) -> Polygon<()> {
        let (p0, p1) = (&self.vertex0.pos, &self.vertex1.pos);
        let vertices = vec![
            Vertex::new(Point3::new(p0.x, p0.y, z0)),
            Vertex::new(Point3::new(p1.x, p1.y, z0)),
            Vertex::new(Point3::new(p1.x, p1.y, z1)),
            Vertex::new(Point3::new(p0.x, p0.y, z1)),
        ];
        Polygon::new(vertices, None)
    }

    /// Recover a side from a polygon of a `z = [-1, 1]` wall solid.
    ///
    /// Every vertex must lie at `z ≈ ±1`. Polygons with fewer than four
    /// vertices are clipping residue and yield `Ok(None)`. The two vertices at
    /// `z = +1` form the side; if they are adjacent in the ring the order is
    /// reversed, if they wrap around the ring it is kept.
    pub fn from_wall_polygon(polygon: &Polygon<()>) -> Result<Option<Side>, ValidationError> {
        let on_level = |z: Real, level: Real| z >= level - WALL_Z_SLACK && z < level + WALL_Z_SLACK;
        if let Some(v) = polygon
            .vertices
            .iter()
            .find(|v| !on_level(v.pos.z, -1.0) && !on_level(v.pos.z, 1.0))
        {
            return Err(ValidationError::WallVertexOutOfRange(v.pos));
        }

        if polygon.vertices.len() < 4 {
            warn!(
                "discarding wall residue with {} vertices",
                polygon.vertices.len()
            );
            return Ok(None);
        }

        let top: Vec<(usize, Point2<Real>)> = polygon
            .vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.pos.z > 0.0)
            .map(|(i, v)| (i, Point2::new(v.pos.x, v.pos.y)))
            .collect();
        let &[(i0, p0), (i1, p1)] = top.as_slice() else {
            return Err(ValidationError::WallTopVertexCount(top.len()));
        };

        match i1 - i0 {
            1 => Ok(Some(Side::new(Vertex2::new(p1), Vertex2::new(p0)))),
            3 => Ok(Some(Side::new(Vertex2::new(p0), Vertex2::new(p1)))),
            _ => Err(ValidationError::WallWinding(i0, i1)),
        }
    }
}
