use approx::assert_relative_eq;
use csgkernel::cag::{Side, Vertex2};
use csgkernel::float_types::Real;
use csgkernel::{BooleanOps, Cag, ValidationError};
use nalgebra::Point2;

fn square(x: Real, y: Real, size: Real) -> Cag {
    Cag::from_points(&[[x, y], [x + size, y], [x + size, y + size], [x, y + size]])
        .expect("valid square")
}

#[test]
fn validity_gate() {
    assert_eq!(
        Cag::from_points(&[[0.0, 0.0], [1.0, 0.0]]).unwrap_err(),
        ValidationError::TooFewPoints(2)
    );

    let bow_tie = Cag::from_points(&[[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0]]);
    assert_eq!(bow_tie.unwrap_err(), ValidationError::SelfIntersection);

    let collinear = Cag::from_points(&[[0.0, 0.0], [1.0, 0.0], [2.0, 0.0]]);
    assert!(matches!(collinear, Err(ValidationError::DegenerateArea(_))));
}

#[test]
fn area_and_bounds() {
    let cag = square(1.0, 3.0, 2.0);
    assert_relative_eq!(cag.area(), 4.0);
    assert_eq!(cag.sides().len(), 4);

    let bounds = cag.bounds().expect("non-empty");
    assert_relative_eq!(bounds.min().x, 1.0);
    assert_relative_eq!(bounds.min().y, 3.0);
    assert_relative_eq!(bounds.max().x, 3.0);
    assert_relative_eq!(bounds.max().y, 5.0);

    assert!(Cag::new().bounds().is_none());
    assert_relative_eq!(cag.translate(5.0, -1.0).area(), 4.0);
    assert_relative_eq!(cag.flipped().area(), -4.0);
}

#[test]
fn union_with_itself() {
    let a = square(0.0, 0.0, 1.0);
    let union = a.union(&a.clone()).expect("wall solid converts back");
    assert_relative_eq!(union.area(), 1.0, epsilon = 1e-4);
    assert!(union.is_canonicalized());
}

#[test]
fn disjoint_union_keeps_both_outlines() {
    let a = square(0.0, 0.0, 1.0);
    let b = square(3.0, 3.0, 1.0);
    let union = a.union(&b).expect("wall solid converts back");
    assert_relative_eq!(union.area(), 2.0, epsilon = 1e-9);
    assert_eq!(union.sides().len(), 8);
    assert_eq!(union.outline_paths().expect("closed").len(), 2);
}

#[test]
fn overlapping_squares() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);

    let union = a.union(&b).expect("union");
    assert_relative_eq!(union.area(), 7.0, epsilon = 1e-6);

    let difference = a.subtract(&b).expect("difference");
    assert_relative_eq!(difference.area(), 3.0, epsilon = 1e-6);

    let intersection = a.intersect(&b).expect("intersection");
    assert_relative_eq!(intersection.area(), 1.0, epsilon = 1e-6);
    let bounds = intersection.bounds().expect("non-empty");
    assert_relative_eq!(bounds.min().x, 1.0, epsilon = 1e-6);
    assert_relative_eq!(bounds.max().y, 2.0, epsilon = 1e-6);
}

#[test]
fn outline_of_a_square() {
    let paths = square(0.0, 0.0, 1.0).outline_paths().expect("closed");
    assert_eq!(paths.len(), 1);
    assert!(paths[0].is_closed());
    assert_eq!(paths[0].0.len(), 5);
}

#[test]
fn open_outline_is_reported() {
    let p = |x: Real, y: Real| Vertex2::new(Point2::new(x, y));
    let open = Cag::from_sides(vec![
        Side::new(p(0.0, 0.0), p(1.0, 0.0)),
        Side::new(p(1.0, 0.0), p(1.0, 1.0)),
    ]);
    assert!(matches!(
        open.outline_paths(),
        Err(ValidationError::AreaNotClosed(_))
    ));
}

#[test]
fn outlines_touching_at_a_corner() {
    // two squares sharing the vertex (1, 1)
    let p = |x: Real, y: Real| Vertex2::new(Point2::new(x, y));
    let ring = |points: [(Real, Real); 4]| {
        (0..4)
            .map(|i| {
                let (x0, y0) = points[i];
                let (x1, y1) = points[(i + 1) % 4];
                Side::new(p(x0, y0), p(x1, y1))
            })
            .collect::<Vec<_>>()
    };
    let mut sides = ring([(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    sides.extend(ring([(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]));

    let paths = Cag::from_sides(sides).outline_paths().expect("closed");
    let vertex_count: usize = paths.iter().map(|path| path.0.len() - 1).sum();
    assert_eq!(vertex_count, 8);
    assert!(paths.iter().all(|path| path.is_closed()));
}
