//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use csgkernel::{
    Solid,
    float_types::Real,
    solid::{polygon::Polygon, vertex::Vertex},
};
use nalgebra::{Point3, Vector3};

/// Returns the bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box(polygons: &[Polygon<()>]) -> [Real; 6] {
    let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
    let mut maxs = Point3::new(Real::MIN, Real::MIN, Real::MIN);
    for v in polygons.iter().flat_map(|poly| &poly.vertices) {
        mins = mins.inf(&v.pos);
        maxs = maxs.sup(&v.pos);
    }
    [mins.x, mins.y, mins.z, maxs.x, maxs.y, maxs.z]
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let verts = points
        .iter()
        .map(|&[x, y, z]| Vertex::new(Point3::new(x, y, z)))
        .collect();
    Polygon::new(verts, None)
}

/// Axis-aligned cube of edge length 1 centered on `center`.
pub fn unit_cube(center: [Real; 3]) -> Solid<()> {
    Solid::cuboid(
        Point3::new(center[0], center[1], center[2]),
        Vector3::new(0.5, 0.5, 0.5),
        None,
    )
}
