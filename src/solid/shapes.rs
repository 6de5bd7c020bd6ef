//! Primitive solids used to build operands.

use crate::errors::ValidationError;
use crate::float_types::Real;
use crate::solid::Solid;
use crate::solid::polygon::{Metadata, Polygon, Shared};
use crate::solid::vertex::Vertex;
use nalgebra::{Point3, Vector3};

impl<S: Metadata> Solid<S> {
    /// Axis-aligned box around `center` with half-extents `radius`.
    ///
    /// ```
    /// # use csgkernel::Solid;
    /// # use nalgebra::{Point3, Vector3};
    /// let cube: Solid<()> = Solid::cuboid(Point3::origin(), Vector3::new(0.5, 0.5, 0.5), None);
    /// assert_eq!(cube.polygons.len(), 6);
    /// ```
    pub fn cuboid(center: Point3<Real>, radius: Vector3<Real>, metadata: Option<S>) -> Solid<S> {
        // corner i sits at center + radius * (±1, ±1, ±1), bit k of i
        // selecting the sign along axis k
        const FACES: [[usize; 4]; 6] = [
            [0, 4, 6, 2], // -x
            [1, 3, 7, 5], // +x
            [0, 1, 5, 4], // -y
            [2, 6, 7, 3], // +y
            [0, 2, 3, 1], // -z
            [4, 5, 7, 6], // +z
        ];

        let corner = |i: usize| {
            let sign = |bit: usize| if i & bit != 0 { 1.0 } else { -1.0 };
            Point3::new(
                center.x + radius.x * sign(1),
                center.y + radius.y * sign(2),
                center.z + radius.z * sign(4),
            )
        };

        let shared = Shared::new(metadata);
        let polygons = FACES
            .iter()
            .map(|face| {
                let vertices = face.iter().map(|&i| Vertex::new(corner(i))).collect();
                Polygon::with_shared(vertices, shared.clone())
            })
            .collect();
        Solid::from_polygons(polygons)
    }

    /// Solid from a point list and faces indexing into it. Faces must be
    /// convex and wound counter-clockwise seen from outside; faces with fewer
    /// than three indices are skipped.
    pub fn polyhedron(
        points: &[[Real; 3]],
        faces: &[&[usize]],
        metadata: Option<S>,
    ) -> Result<Solid<S>, ValidationError> {
        let shared = Shared::new(metadata);
        let mut polygons = Vec::with_capacity(faces.len());

        for face in faces {
            if face.len() < 3 {
                continue;
            }
            let mut vertices = Vec::with_capacity(face.len());
            for &index in face.iter() {
                let [x, y, z] = *points
                    .get(index)
                    .ok_or(ValidationError::IndexOutOfRange(index))?;
                vertices.push(Vertex::new(Point3::new(x, y, z)));
            }
            polygons.push(Polygon::with_shared(vertices, shared.clone()));
        }

        Ok(Solid::from_polygons(polygons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cuboid_faces_point_outward() {
        let cube: Solid<()> =
            Solid::cuboid(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.5, 1.0, 1.5), None);
        assert_eq!(cube.polygons.len(), 6);
        assert!((cube.volume() - 6.0).abs() < 1e-9);
        for polygon in &cube.polygons {
            let centroid = polygon
                .vertices
                .iter()
                .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords)
                / 4.0;
            let outward = centroid - Vector3::new(1.0, 2.0, 3.0);
            assert!(outward.dot(&polygon.plane.normal) > 0.0);
        }
    }

    #[test]
    fn polyhedron_rejects_bad_indices() {
        let points = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let ok: Result<Solid<()>, _> = Solid::polyhedron(&points, &[&[0, 1, 2], &[0, 1]], None);
        assert_eq!(ok.map(|s| s.polygons.len()), Ok(1));
        let bad: Result<Solid<()>, _> = Solid::polyhedron(&points, &[&[0, 1, 3]], None);
        assert_eq!(bad.map(|s| s.polygons.len()), Err(ValidationError::IndexOutOfRange(3)));
    }
}
