mod support;

use approx::assert_relative_eq;
use csgkernel::ValidationError;
use csgkernel::float_types::{PI, Real};
use csgkernel::solid::polygon::{Polygon, Shared};
use csgkernel::solid::vertex::Vertex;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::support::make_polygon_3d;

#[test]
fn polygon_construction() {
    let poly = make_polygon_3d(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]);
    assert_eq!(poly.vertices.len(), 4);
    assert_relative_eq!(poly.plane.normal, Vector3::z());
    assert_relative_eq!(poly.area(), 1.0);
    assert!(poly.is_convex());
    assert!(poly.validate().is_ok());
}

#[test]
fn flipped_polygon_faces_the_other_way() {
    let poly = make_polygon_3d(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]]);
    let flipped = poly.flipped();

    assert_relative_eq!(flipped.plane.normal, -Vector3::z());
    assert_eq!(flipped.vertices[0].pos, poly.vertices[2].pos);
    assert_eq!(flipped.shared.tag(), poly.shared.tag());
    // the ring is reversed together with the normal
    assert_relative_eq!(flipped.area(), 2.0);
}

#[test]
fn validation_errors() {
    let bent = make_polygon_3d(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.5]]);
    assert!(matches!(bent.validate(), Err(ValidationError::NonPlanarPolygon(_))));

    let dart = make_polygon_3d(&[[0.0, 0.0, 0.0], [2.0, 1.0, 0.0], [0.0, 2.0, 0.0], [1.0, 1.0, 0.0]]);
    assert!(!dart.is_convex());
    assert_eq!(
        dart.validate(),
        Err(ValidationError::NonConvexPolygon(Point3::new(1.0, 1.0, 0.0)))
    );

    let broken = make_polygon_3d(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [Real::NAN, 1.0, 0.0]]);
    assert!(matches!(broken.validate(), Err(ValidationError::InvalidCoordinate(_))));
}

#[test]
fn bounding_volumes() {
    let poly = make_polygon_3d(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]]);
    let aabb = poly.bounding_box();
    assert_eq!(aabb.mins, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(aabb.maxs, Point3::new(2.0, 2.0, 0.0));

    let (center, radius) = poly.bounding_sphere();
    assert_eq!(center, Point3::new(1.0, 1.0, 0.0));
    assert_relative_eq!(radius, Real::sqrt(2.0));
}

#[test]
fn transform_recomputes_the_plane() {
    let poly = make_polygon_3d(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
    let rotation = Matrix4::from_euler_angles(PI / 2.0, 0.0, 0.0);
    let moved = poly.transform(&(Matrix4::new_translation(&Vector3::new(0.0, 0.0, 3.0)) * rotation));

    // rotating +z a quarter turn about x gives -y
    assert_relative_eq!(moved.plane.normal, -Vector3::y(), epsilon = 1e-12);
    assert_relative_eq!(moved.area(), poly.area(), epsilon = 1e-12);
    assert_eq!(moved.shared.tag(), poly.shared.tag());
}

#[test]
fn shared_records_compare_by_metadata() {
    let red = Shared::new(Some("red"));
    let also_red = Shared::new(Some("red"));
    assert_ne!(red.tag(), also_red.tag());
    assert_eq!(red, also_red);
    assert_ne!(red, Shared::new(Some("blue")));

    let vertices = vec![
        Vertex::new(Point3::new(0.0, 0.0, 0.0)),
        Vertex::new(Point3::new(1.0, 0.0, 0.0)),
        Vertex::new(Point3::new(0.0, 1.0, 0.0)),
    ];
    let poly = Polygon::with_shared(vertices, red.clone());
    assert_eq!(poly.shared.tag(), red.tag());
    assert_eq!(poly.shared.metadata, Some("red"));
}
