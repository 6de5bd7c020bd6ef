//! 2D area geometry.
//!
//! A [`Cag`] is a set of directed [`Side`]s with the area on their left.
//! Boolean operations extrude both operands into walls spanning
//! `z = [-1, 1]`, combine the walls with the 3D [`Solid`] engine and read the
//! sides back from the resulting wall polygons.

mod side;

pub use side::{Side, Vertex2};

use crate::errors::ValidationError;
use crate::float_types::{PI, Real, TAU, tolerance};
use crate::fuzzy::FuzzyFactory;
use crate::solid::Solid;
use crate::tag::Tag;
use crate::traits::BooleanOps;
use geo::{BoundingRect, Coord, Line, LineString, MultiPoint, Point, Rect};
use log::debug;
use nalgebra::{Matrix2, Point2, Vector2};
use std::collections::BTreeMap;

/// Shapes whose absolute area is below this are rejected by [`Cag::from_points`].
const MIN_AREA: Real = 1e-5;

/// Two consecutive sides whose unit directions sum to less than this fold
/// straight back onto each other.
const FOLD_BACK_EPSILON: Real = 1e-5;

/// Cross products below this mean two segments are parallel.
const PARALLEL_EPSILON: Real = 1e-9;

/// Wall extent used for Boolean operations.
const WALL_Z0: Real = -1.0;
const WALL_Z1: Real = 1.0;

#[derive(Debug, Clone, Default)]
pub struct Cag {
    sides: Vec<Side>,
    is_canonicalized: bool,
}

impl Cag {
    /// Returns a new empty Cag
    pub const fn new() -> Self {
        Cag {
            sides: Vec::new(),
            is_canonicalized: false,
        }
    }

    pub const fn from_sides(sides: Vec<Side>) -> Self {
        Cag {
            sides,
            is_canonicalized: false,
        }
    }

    /// Closed outline through `points`, checked for self-intersection and
    /// degenerate area. A clockwise outline is flipped to counter-clockwise.
    pub fn from_points(points: &[[Real; 2]]) -> Result<Cag, ValidationError> {
        if points.len() < 3 {
            return Err(ValidationError::TooFewPoints(points.len()));
        }
        let mut result = Self::from_points_no_check(points);
        if result.is_self_intersecting() {
            return Err(ValidationError::SelfIntersection);
        }
        let area = result.area();
        if area.abs() < MIN_AREA {
            return Err(ValidationError::DegenerateArea(area));
        }
        if area < 0.0 {
            result = result.flipped();
        }
        Ok(result.canonicalized())
    }

    /// Closed outline through `points` without any checks.
    pub fn from_points_no_check(points: &[[Real; 2]]) -> Cag {
        let vertices: Vec<Vertex2> = points
            .iter()
            .map(|&[x, y]| Vertex2::new(Point2::new(x, y)))
            .collect();
        let sides = vertices
            .iter()
            .zip(vertices.iter().cycle().skip(vertices.len().saturating_sub(1)))
            .map(|(curr, prev)| Side::new(prev.clone(), curr.clone()))
            .collect();
        Cag::from_sides(sides)
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub const fn is_canonicalized(&self) -> bool {
        self.is_canonicalized
    }

    /// Signed shoelace area, positive for counter-clockwise outlines.
    pub fn area(&self) -> Real {
        0.5 * self
            .sides
            .iter()
            .map(|side| {
                let (a, b) = (&side.vertex0.pos, &side.vertex1.pos);
                Line::new(Coord { x: a.x, y: a.y }, Coord { x: b.x, y: b.y }).determinant()
            })
            .sum::<Real>()
    }

    /// Same area with every side reversed.
    pub fn flipped(&self) -> Cag {
        let sides = self.sides.iter().rev().map(Side::flipped).collect();
        Cag::from_sides(sides)
    }

    /// Axis-aligned bounds of all side endpoints, `None` when empty.
    pub fn bounds(&self) -> Option<Rect<Real>> {
        let points: MultiPoint<Real> = self
            .sides
            .iter()
            .flat_map(|side| [&side.vertex0.pos, &side.vertex1.pos])
            .map(|p| Point::new(p.x, p.y))
            .collect();
        points.bounding_rect()
    }

    pub fn translate(&self, dx: Real, dy: Real) -> Cag {
        let offset = Vector2::new(dx, dy);
        let sides = self
            .sides
            .iter()
            .map(|side| {
                Side::new(
                    Vertex2::new(side.vertex0.pos + offset),
                    Vertex2::new(side.vertex1.pos + offset),
                )
            })
            .collect();
        Cag::from_sides(sides)
    }

    /// `true` if any two sides cross.
    pub fn is_self_intersecting(&self) -> bool {
        self.sides.iter().enumerate().any(|(i, side0)| {
            self.sides[i + 1..].iter().any(|side1| {
                Self::lines_intersect(
                    &side0.vertex0.pos,
                    &side0.vertex1.pos,
                    &side1.vertex0.pos,
                    &side1.vertex1.pos,
                )
            })
        })
    }

    /// Segment intersection test used by [`Cag::is_self_intersecting`].
    ///
    /// Consecutive segments (`p0end == p1start`) only count as intersecting
    /// when the second one doubles straight back over the first. Otherwise
    /// shared endpoints and parallel segments never intersect.
    pub fn lines_intersect(
        p0start: &Point2<Real>,
        p0end: &Point2<Real>,
        p1start: &Point2<Real>,
        p1end: &Point2<Real>,
    ) -> bool {
        if p0end == p1start {
            if p1end == p0start {
                let d = (p1end - p1start).normalize() + (p0end - p0start).normalize();
                return d.norm() < FOLD_BACK_EPSILON;
            }
            return false;
        }

        let d0 = p0end - p0start;
        let d1 = p1end - p1start;
        if d0.perp(&d1).abs() < PARALLEL_EPSILON {
            return false;
        }

        let system = Matrix2::new(-d0.x, d1.x, -d0.y, d1.y);
        let Some(inverse) = system.try_inverse() else {
            return false;
        };
        let alphas = inverse * (p0start - p1start);
        alphas.x > 1e-6 && alphas.x < 0.999_999 && alphas.y > 1e-5 && alphas.y < 0.999_999
    }

    /// Snap near-coincident vertices onto shared instances and drop sides
    /// shorter than the tolerance.
    pub fn canonicalized(&self) -> Cag {
        if self.is_canonicalized {
            return self.clone();
        }
        let eps = tolerance();
        let mut factory: FuzzyFactory<Vertex2, 2> = FuzzyFactory::new(eps);
        let mut snap = |vertex: &Vertex2| {
            factory.lookup_or_create([vertex.pos.x, vertex.pos.y], || vertex.clone())
        };
        let sides = self
            .sides
            .iter()
            .map(|side| Side::new(snap(&side.vertex0), snap(&side.vertex1)))
            .filter(|side| side.length() > eps)
            .collect();
        Cag {
            sides,
            is_canonicalized: true,
        }
    }

    /// Extrude every side into a wall quad spanning `z0..z1`.
    pub fn to_wall(&self, z0: Real, z1: Real) -> Solid<()> {
        Solid::from_polygons(
            self.sides
                .iter()
                .map(|side| side.to_polygon_3d(z0, z1))
                .collect(),
        )
    }

    /// Read the sides back from a wall solid, skipping clipping residue.
    pub fn from_wall_solid(solid: &Solid<()>) -> Result<Cag, ValidationError> {
        let mut sides = Vec::with_capacity(solid.polygons.len());
        for polygon in &solid.polygons {
            if let Some(side) = Side::from_wall_polygon(polygon)? {
                sides.push(side);
            }
        }
        Ok(Cag::from_sides(sides))
    }

    /// Walk the sides into closed outlines.
    ///
    /// Where several sides leave the same vertex (two outlines touching at a
    /// corner) the walk takes the one turning furthest left.
    pub fn outline_paths(&self) -> Result<Vec<LineString<Real>>, ValidationError> {
        let cag = self.canonicalized();
        let sides = &cag.sides;

        let mut sides_by_start: BTreeMap<Tag, Vec<usize>> = BTreeMap::new();
        for (index, side) in sides.iter().enumerate() {
            sides_by_start.entry(side.vertex0.tag()).or_default().push(index);
        }

        let mut paths = Vec::new();
        while let Some(mut entry) = sides_by_start.first_entry() {
            let start_side = entry.get_mut().remove(0);
            if entry.get().is_empty() {
                entry.remove();
            }

            let start_tag = sides[start_side].vertex0.tag();
            let mut this_side = &sides[start_side];
            let mut coords = Vec::new();
            loop {
                let pos = this_side.vertex0.pos;
                coords.push(Coord { x: pos.x, y: pos.y });

                let next_tag = this_side.vertex1.tag();
                if next_tag == start_tag {
                    break;
                }
                let Some(candidates) = sides_by_start.get_mut(&next_tag) else {
                    return Err(ValidationError::AreaNotClosed(this_side.vertex1.pos));
                };

                let mut next_index = 0;
                if candidates.len() > 1 {
                    let this_angle = angle(&this_side.direction());
                    let mut best_turn = -Real::MAX;
                    for (candidate_index, &candidate) in candidates.iter().enumerate() {
                        let mut turn = angle(&sides[candidate].direction()) - this_angle;
                        if turn < -PI {
                            turn += TAU;
                        }
                        if turn >= PI {
                            turn -= TAU;
                        }
                        if turn > best_turn {
                            next_index = candidate_index;
                            best_turn = turn;
                        }
                    }
                }

                let next_side = candidates.remove(next_index);
                if candidates.is_empty() {
                    sides_by_start.remove(&next_tag);
                }
                this_side = &sides[next_side];
            }

            let mut path = LineString::new(coords);
            path.close();
            paths.push(path);
        }
        Ok(paths)
    }
}

fn angle(direction: &Vector2<Real>) -> Real {
    direction.y.atan2(direction.x)
}

fn walls(cags: &[Cag]) -> impl Iterator<Item = Solid<()>> + '_ {
    cags.iter().map(|cag| cag.to_wall(WALL_Z0, WALL_Z1))
}

impl BooleanOps for Cag {
    type Output = Result<Cag, ValidationError>;

    fn union_all(&self, others: &[Cag]) -> Result<Cag, ValidationError> {
        debug!("2D union of {} shapes", others.len() + 1);
        let others: Vec<Solid<()>> = walls(others).map(|wall| wall.retesselated()).collect();
        let merged = self.to_wall(WALL_Z0, WALL_Z1).union_all(&others);
        Ok(Cag::from_wall_solid(&merged)?.canonicalized())
    }

    fn subtract_all(&self, others: &[Cag]) -> Result<Cag, ValidationError> {
        debug!("2D subtraction of {} shapes", others.len());
        let mut result = self.to_wall(WALL_Z0, WALL_Z1);
        for wall in walls(others) {
            result = result.subtract_sub(&wall, false, false);
        }
        let result = result.retesselated().canonicalized();
        Ok(Cag::from_wall_solid(&result)?.canonicalized())
    }

    fn intersect_all(&self, others: &[Cag]) -> Result<Cag, ValidationError> {
        debug!("2D intersection of {} shapes", others.len());
        let mut result = self.to_wall(WALL_Z0, WALL_Z1);
        for wall in walls(others) {
            result = result.intersect_sub(&wall, false, false);
        }
        let result = result.retesselated().canonicalized();
        Ok(Cag::from_wall_solid(&result)?.canonicalized())
    }
}
