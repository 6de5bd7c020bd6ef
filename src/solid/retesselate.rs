//! Coplanar retesselation.
//!
//! Clipping leaves the faces of a solid cut into many convex fragments that
//! share a plane and a shared record. [`retesselate_coplanar_polygons`] merges
//! such a group back into as few convex polygons as possible with a scanline
//! sweep in the plane's 2D basis:
//!
//! - every fragment is projected to 2D and its y coordinates are snapped to
//!   bins so that corners meant to be level are exactly level;
//! - the sweep visits every distinct y; between two consecutive y values each
//!   active fragment contributes one trapezoid strip, and strips that touch
//!   side by side are merged;
//! - a strip extends the output polygon of the strip above it when the two
//!   share their boundary and the joint keeps the outline convex; otherwise
//!   the polygon above is closed and a new one is started.

use crate::float_types::{Real, tolerance};
use crate::solid::Solid;
use crate::solid::canonical::SolidFactory;
use crate::solid::plane::OrthoNormalBasis;
use crate::solid::polygon::{Metadata, Polygon};
use crate::solid::vertex::Vertex;
use crate::tag::Tag;
use hashbrown::{HashMap, HashSet};
use log::{debug, trace};
use nalgebra::{Point2, Vector2};

/// A fragment currently crossed by the scanline.
#[derive(Debug, Clone)]
struct ActivePolygon {
    polygon_index: usize,
    left_vertex_index: usize,
    right_vertex_index: usize,
    top_left: Point2<Real>,
    top_right: Point2<Real>,
    bottom_left: Point2<Real>,
    bottom_right: Point2<Real>,
}

/// One trapezoid between two consecutive scanlines.
#[derive(Debug, Clone)]
struct Strip {
    top_left: Point2<Real>,
    top_right: Point2<Real>,
    bottom_left: Point2<Real>,
    bottom_right: Point2<Real>,
    left_direction: Vector2<Real>,
    right_direction: Vector2<Real>,
    out_polygon: Option<usize>,
    left_line_continues: bool,
    right_line_continues: bool,
}

/// An output polygon under construction: its left and right chains, top down.
#[derive(Debug, Clone, Default)]
struct OutPolygon {
    left_points: Vec<Point2<Real>>,
    right_points: Vec<Point2<Real>>,
}

/// Key for exact lookups of binned y coordinates.
#[inline]
fn y_key(y: Real) -> u64 {
    y.to_bits() as u64
}

/// x coordinate of the line through `p1` and `p2` at height `y`, clamped to
/// the segment.
fn interpolate_x_for_y(p1: &Point2<Real>, p2: &Point2<Real>, y: Real) -> Real {
    let mut f1 = y - p1.y;
    let mut f2 = p2.y - p1.y;
    if f2 < 0.0 {
        f1 = -f1;
        f2 = -f2;
    }
    let t = if f1 <= 0.0 {
        0.0
    } else if f1 >= f2 {
        1.0
    } else if f2 < 1e-10 {
        0.5
    } else {
        f1 / f2
    };
    p1.x + t * (p2.x - p1.x)
}

/// Merge a group of convex polygons that share one plane and one shared
/// record into an equivalent set of larger convex polygons. The output uses
/// the plane and shared record of the first input polygon.
pub fn retesselate_coplanar_polygons<S: Metadata>(source: &[Polygon<S>]) -> Vec<Polygon<S>> {
    let Some(first) = source.first() else {
        return Vec::new();
    };
    let eps = tolerance();
    let plane = first.plane.clone();
    let shared = first.shared.clone();
    let basis = OrthoNormalBasis::new(&plane);
    let y_binning_factor = 10.0 / eps;

    let mut polygon_vertices_2d: Vec<Vec<Point2<Real>>> = Vec::with_capacity(source.len());
    let mut polygon_top_vertex_indexes: Vec<usize> = Vec::with_capacity(source.len());
    let mut top_y_to_polygon_indexes: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut y_to_polygon_indexes: HashMap<u64, HashSet<usize>> = HashMap::new();
    let mut y_bins: HashMap<i64, Real> = HashMap::new();
    let mut y_coordinates: Vec<Real> = Vec::new();

    for (polygon_index, polygon) in source.iter().enumerate() {
        let mut vertices_2d = Vec::with_capacity(polygon.vertices.len());
        let mut min_index = 0;
        let mut min_y = Real::MAX;
        let mut max_y = -Real::MAX;

        for (i, vertex) in polygon.vertices.iter().enumerate() {
            let mut pos = basis.to_2d(&vertex.pos);
            let bin = (pos.y * y_binning_factor).floor() as i64;
            let binned = [bin, bin + 1, bin - 1]
                .iter()
                .find_map(|b| y_bins.get(b).copied());
            pos.y = match binned {
                Some(y) => y,
                None => {
                    y_bins.insert(bin, pos.y);
                    pos.y
                },
            };
            let y = pos.y;
            vertices_2d.push(pos);

            if i == 0 || y < min_y {
                min_y = y;
                min_index = i;
            }
            if i == 0 || y > max_y {
                max_y = y;
            }
            y_to_polygon_indexes
                .entry(y_key(y))
                .or_insert_with(|| {
                    y_coordinates.push(y);
                    HashSet::new()
                })
                .insert(polygon_index);
        }

        if vertices_2d.is_empty() || min_y >= max_y {
            // degenerate: no height, never becomes active
            vertices_2d.clear();
            polygon_top_vertex_indexes.push(0);
        } else {
            top_y_to_polygon_indexes
                .entry(y_key(min_y))
                .or_default()
                .push(polygon_index);
            vertices_2d.reverse();
            polygon_top_vertex_indexes.push(vertices_2d.len() - 1 - min_index);
        }
        polygon_vertices_2d.push(vertices_2d);
    }

    y_coordinates.sort_by(|a, b| a.total_cmp(b));

    let mut active: Vec<ActivePolygon> = Vec::new();
    let mut out_polygons: Vec<OutPolygon> = Vec::new();
    let mut prev_row: Vec<Strip> = Vec::new();
    let mut dest: Vec<Polygon<S>> = Vec::new();

    for (y_index, &y) in y_coordinates.iter().enumerate() {
        // advance the active polygons that have a corner on this scanline
        if let Some(polygons_with_corner) = y_to_polygon_indexes.get(&y_key(y)) {
            active.retain_mut(|current| {
                if !polygons_with_corner.contains(&current.polygon_index) {
                    return true;
                }
                let vertices = &polygon_vertices_2d[current.polygon_index];
                let count = vertices.len();

                let mut new_left = current.left_vertex_index;
                loop {
                    let next_left = (new_left + 1) % count;
                    if vertices[next_left].y != y {
                        break;
                    }
                    new_left = next_left;
                }
                let mut new_right = current.right_vertex_index;
                let next_right = (new_right + count - 1) % count;
                if vertices[next_right].y == y {
                    new_right = next_right;
                }

                if new_left != current.left_vertex_index && new_left == new_right {
                    // the polygon ends here
                    return false;
                }
                current.left_vertex_index = new_left;
                current.right_vertex_index = new_right;
                current.top_left = vertices[new_left];
                current.top_right = vertices[new_right];
                current.bottom_left = vertices[(new_left + 1) % count];
                current.bottom_right = vertices[(new_right + count - 1) % count];
                true
            });
        }

        let next_y = if y_index + 1 >= y_coordinates.len() {
            // last scanline: every polygon ends
            active.clear();
            None
        } else {
            let next_y = y_coordinates[y_index + 1];
            let middle_y = 0.5 * (y + next_y);

            // polygons whose top is on this scanline become active, kept
            // sorted by the x of their left edge
            for &polygon_index in top_y_to_polygon_indexes.get(&y_key(y)).into_iter().flatten() {
                let vertices = &polygon_vertices_2d[polygon_index];
                let count = vertices.len();
                let top_vertex_index = polygon_top_vertex_indexes[polygon_index];

                // the top may be a horizontal edge: walk along it both ways
                let mut top_left = top_vertex_index;
                loop {
                    let i = (top_left + 1) % count;
                    if vertices[i].y != y || i == top_vertex_index {
                        break;
                    }
                    top_left = i;
                }
                let mut top_right = top_vertex_index;
                loop {
                    let i = (top_right + count - 1) % count;
                    if vertices[i].y != y || i == top_left {
                        break;
                    }
                    top_right = i;
                }

                let entry = ActivePolygon {
                    polygon_index,
                    left_vertex_index: top_left,
                    right_vertex_index: top_right,
                    top_left: vertices[top_left],
                    top_right: vertices[top_right],
                    bottom_left: vertices[(top_left + 1) % count],
                    bottom_right: vertices[(top_right + count - 1) % count],
                };
                let x = interpolate_x_for_y(&entry.top_left, &entry.bottom_left, middle_y);
                let position = active.partition_point(|other| {
                    interpolate_x_for_y(&other.top_left, &other.bottom_left, middle_y) < x
                });
                active.insert(position, entry);
            }
            Some(next_y)
        };

        // one strip per active polygon between this scanline and the next
        let mut new_row: Vec<Strip> = Vec::with_capacity(active.len());
        if let Some(next_y) = next_y {
            for current in &active {
                let top_left = Point2::new(
                    interpolate_x_for_y(&current.top_left, &current.bottom_left, y),
                    y,
                );
                let top_right = Point2::new(
                    interpolate_x_for_y(&current.top_right, &current.bottom_right, y),
                    y,
                );
                let bottom_left = Point2::new(
                    interpolate_x_for_y(&current.top_left, &current.bottom_left, next_y),
                    next_y,
                );
                let bottom_right = Point2::new(
                    interpolate_x_for_y(&current.top_right, &current.bottom_right, next_y),
                    next_y,
                );
                let mut strip = Strip {
                    top_left,
                    top_right,
                    bottom_left,
                    bottom_right,
                    left_direction: (bottom_left - top_left).normalize(),
                    right_direction: (top_right - bottom_right).normalize(),
                    out_polygon: None,
                    left_line_continues: false,
                    right_line_continues: false,
                };

                if let Some(prev) = new_row.last() {
                    if (strip.top_left - prev.top_right).norm() < eps
                        && (strip.bottom_left - prev.bottom_right).norm() < eps
                    {
                        // touches the previous strip: merge into one
                        strip.top_left = prev.top_left;
                        strip.bottom_left = prev.bottom_left;
                        strip.left_direction = prev.left_direction;
                        new_row.pop();
                    }
                }
                new_row.push(strip);
            }
        }

        if y_index > 0 {
            let mut prev_continued = vec![false; prev_row.len()];
            let mut matched = vec![false; prev_row.len()];

            for strip in new_row.iter_mut() {
                for (prev_index, prev) in prev_row.iter().enumerate() {
                    if matched[prev_index] {
                        continue;
                    }
                    if (prev.bottom_left - strip.top_left).norm() < eps
                        && (prev.bottom_right - strip.top_right).norm() < eps
                    {
                        matched[prev_index] = true;

                        let d1 = strip.left_direction.x - prev.left_direction.x;
                        let d2 = strip.right_direction.x - prev.right_direction.x;
                        let left_line_continues = d1.abs() < eps;
                        let right_line_continues = d2.abs() < eps;
                        let left_convex = left_line_continues || d1 >= 0.0;
                        let right_convex = right_line_continues || d2 >= 0.0;
                        if left_convex && right_convex {
                            strip.out_polygon = prev.out_polygon;
                            strip.left_line_continues = left_line_continues;
                            strip.right_line_continues = right_line_continues;
                            prev_continued[prev_index] = true;
                        }
                        break;
                    }
                }
            }

            // close every polygon of the previous row that did not continue
            for (prev_index, prev) in prev_row.iter().enumerate() {
                if prev_continued[prev_index] {
                    continue;
                }
                let Some(out_index) = prev.out_polygon else {
                    continue;
                };
                let out = &mut out_polygons[out_index];
                out.right_points.push(prev.bottom_right);
                if (prev.bottom_right - prev.bottom_left).norm() > eps {
                    out.left_points.push(prev.bottom_left);
                }
                out.left_points.reverse();

                let vertices: Vec<Vertex> = out
                    .right_points
                    .iter()
                    .chain(out.left_points.iter())
                    .map(|point| Vertex::new(basis.to_3d(point)))
                    .collect();
                if vertices.len() >= 3 {
                    dest.push(Polygon::with_plane(vertices, shared.clone(), plane.clone()));
                } else {
                    trace!("dropping degenerate retesselated polygon");
                }
            }
        }

        // start or extend an output polygon for every strip of this row
        for strip in new_row.iter_mut() {
            match strip.out_polygon {
                None => {
                    let mut out = OutPolygon::default();
                    out.left_points.push(strip.top_left);
                    if (strip.top_left - strip.top_right).norm() > eps {
                        out.right_points.push(strip.top_right);
                    }
                    strip.out_polygon = Some(out_polygons.len());
                    out_polygons.push(out);
                },
                Some(out_index) => {
                    let out = &mut out_polygons[out_index];
                    if !strip.left_line_continues {
                        out.left_points.push(strip.top_left);
                    }
                    if !strip.right_line_continues {
                        out.right_points.push(strip.top_right);
                    }
                },
            }
        }

        prev_row = new_row;
    }

    dest
}

impl<S: Metadata> Solid<S> {
    /// Merge coplanar fragments sharing a plane and a shared record. Returns a
    /// clone if already retesselated.
    pub fn retesselated(&self) -> Solid<S> {
        if self.is_retesselated {
            return self.clone();
        }

        // group by canonical (plane, shared) identity, in first-seen order
        let mut factory = SolidFactory::new();
        let mut group_of: HashMap<(Tag, Tag), usize> = HashMap::new();
        let mut groups: Vec<Vec<Polygon<S>>> = Vec::new();
        for polygon in &self.polygons {
            let key = if self.is_canonicalized {
                (polygon.plane.tag(), polygon.shared.tag())
            } else {
                (
                    factory.get_plane(&polygon.plane).tag(),
                    factory.get_shared(&polygon.shared).tag(),
                )
            };
            match group_of.get(&key) {
                Some(&index) => groups[index].push(polygon.clone()),
                None => {
                    group_of.insert(key, groups.len());
                    groups.push(vec![polygon.clone()]);
                },
            }
        }

        let mut polygons = Vec::with_capacity(self.polygons.len());
        for group in groups {
            if group.len() < 2 {
                polygons.extend(group);
            } else {
                trace!("retesselating {} coplanar polygons", group.len());
                polygons.extend(retesselate_coplanar_polygons(&group));
            }
        }
        debug!(
            "retesselated {} polygons into {}",
            self.polygons.len(),
            polygons.len()
        );

        let mut result = Solid::from_polygons(polygons);
        result.is_retesselated = true;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn rect(x0: Real, x1: Real, y0: Real, y1: Real) -> Polygon<()> {
        Polygon::new(
            vec![
                Vertex::new(Point3::new(x0, y0, 0.0)),
                Vertex::new(Point3::new(x1, y0, 0.0)),
                Vertex::new(Point3::new(x1, y1, 0.0)),
                Vertex::new(Point3::new(x0, y1, 0.0)),
            ],
            None,
        )
    }

    fn total_area(polygons: &[Polygon<()>]) -> Real {
        polygons.iter().map(Polygon::area).sum()
    }

    #[test]
    fn interpolation_is_clamped() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        assert_eq!(interpolate_x_for_y(&a, &b, 1.0), 1.0);
        assert_eq!(interpolate_x_for_y(&a, &b, -1.0), 0.0);
        assert_eq!(interpolate_x_for_y(&a, &b, 3.0), 2.0);
        assert_eq!(interpolate_x_for_y(&b, &a, 1.5), 1.5);
    }

    #[test]
    fn side_by_side_rectangles_merge() {
        let plane = rect(0.0, 1.0, 0.0, 1.0).plane;
        let mut left = rect(0.0, 1.0, 0.0, 1.0);
        let mut right = rect(1.0, 2.0, 0.0, 1.0);
        left.plane = plane.clone();
        right.plane = plane;

        let merged = retesselate_coplanar_polygons(&[left, right]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].vertices.len(), 4);
        assert!((total_area(&merged) - 2.0).abs() < 1e-9);
        assert!(merged[0].is_convex());
    }

    #[test]
    fn stacked_rectangles_merge() {
        let plane = rect(0.0, 1.0, 0.0, 1.0).plane;
        let mut bottom = rect(0.0, 1.0, 0.0, 1.0);
        let mut top = rect(0.0, 1.0, 1.0, 3.0);
        bottom.plane = plane.clone();
        top.plane = plane;

        let merged = retesselate_coplanar_polygons(&[bottom, top]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].vertices.len(), 4);
        assert!((total_area(&merged) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn l_shape_keeps_area_and_convexity() {
        let plane = rect(0.0, 1.0, 0.0, 1.0).plane;
        let mut pieces = vec![
            rect(0.0, 1.0, 0.0, 1.0),
            rect(1.0, 2.0, 0.0, 1.0),
            rect(0.0, 1.0, 1.0, 2.0),
        ];
        for piece in &mut pieces {
            piece.plane = plane.clone();
        }

        let merged = retesselate_coplanar_polygons(&pieces);
        assert!(merged.len() < pieces.len());
        assert!((total_area(&merged) - 3.0).abs() < 1e-9);
        assert!(merged.iter().all(Polygon::is_convex));
    }
}
