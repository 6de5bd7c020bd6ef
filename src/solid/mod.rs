//! `Solid` struct and implementations of the `BooleanOps` trait for `Solid`

use crate::errors::ValidationError;
use crate::float_types::{
    Real,
    parry3d::bounding_volume::{Aabb, BoundingVolume},
};
use crate::solid::bsp::Tree;
use crate::solid::polygon::{Metadata, Polygon};
use crate::traits::BooleanOps;
use log::{debug, trace};
use nalgebra::{Matrix4, Point3, Vector3};
use std::sync::OnceLock;

pub mod bsp;
pub mod canonical;
pub mod plane;
pub mod polygon;
pub mod polygon_tree;
pub mod retesselate;
pub mod shapes;
pub mod vertex;

/// A closed polyhedral boundary: an unordered set of convex polygons.
///
/// Two flags record work already done on the polygon set. Both start out
/// `false` for any solid built with [`Solid::from_polygons`] and let
/// [`Solid::canonicalized`] and [`Solid::retesselated`] skip redundant passes.
#[derive(Clone, Debug)]
pub struct Solid<S: Clone> {
    /// 3D polygons bounding the solid
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    is_canonicalized: bool,
    is_retesselated: bool,
}

impl<S: Metadata> Default for Solid<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Metadata> Solid<S> {
    /// Returns a new empty Solid
    pub const fn new() -> Self {
        Solid {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            is_canonicalized: false,
            is_retesselated: false,
        }
    }

    /// Build a Solid from an existing polygon list. Polygons are trusted to
    /// be convex and planar; see [`Solid::try_from_polygons`].
    pub fn from_polygons(polygons: Vec<Polygon<S>>) -> Self {
        let mut solid = Solid::new();
        solid.polygons = polygons;
        solid
    }

    /// Like [`Solid::from_polygons`], but checks every polygon with
    /// [`Polygon::validate`] first.
    pub fn try_from_polygons(polygons: Vec<Polygon<S>>) -> Result<Self, ValidationError> {
        for polygon in &polygons {
            polygon.validate()?;
        }
        Ok(Self::from_polygons(polygons))
    }

    pub fn polygons(&self) -> &[Polygon<S>] {
        &self.polygons
    }

    pub const fn is_canonicalized(&self) -> bool {
        self.is_canonicalized
    }

    pub const fn is_retesselated(&self) -> bool {
        self.is_retesselated
    }

    /// Returns a [`parry3d::bounding_volume::Aabb`] indicating the 3D bounds of all `polygons`.
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for polygon in &self.polygons {
                for v in &polygon.vertices {
                    mins = mins.inf(&v.pos);
                    maxs = maxs.sup(&v.pos);
                }
            }

            // no polygons: trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// `false` when the bounding boxes prove the two solids cannot touch.
    pub fn may_overlap(&self, other: &Solid<S>) -> bool {
        if self.polygons.is_empty() || other.polygons.is_empty() {
            return false;
        }
        self.bounding_box().intersects(&other.bounding_box())
    }

    /// Enclosed volume, summed from the signed volumes of the polygons.
    pub fn volume(&self) -> Real {
        self.polygons.iter().map(Polygon::signed_volume).sum()
    }

    /// Total surface area.
    pub fn area(&self) -> Real {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Invert this Solid (flip inside vs. outside)
    pub fn invert(&self) -> Solid<S> {
        Solid::from_polygons(self.polygons.iter().map(Polygon::flipped).collect())
    }

    /// Apply an arbitrary affine transform (as a 4x4 matrix). A mirroring
    /// transform also flips every polygon so that faces keep pointing out.
    pub fn transform(&self, mat: &Matrix4<Real>) -> Solid<S> {
        let mirrors = mat.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0;
        let polygons = self
            .polygons
            .iter()
            .map(|polygon| {
                let moved = polygon.transform(mat);
                if mirrors { moved.flipped() } else { moved }
            })
            .collect();
        Solid::from_polygons(polygons)
    }

    pub fn translate(&self, x: Real, y: Real, z: Real) -> Solid<S> {
        self.transform(&Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    pub fn scale(&self, sx: Real, sy: Real, sz: Real) -> Solid<S> {
        self.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }

    /// Concatenate the polygons of two solids known not to overlap.
    pub fn union_for_non_intersecting(&self, other: &Solid<S>) -> Solid<S> {
        let mut polygons = self.polygons.clone();
        polygons.extend_from_slice(&other.polygons);
        let mut result = Solid::from_polygons(polygons);
        result.is_canonicalized = self.is_canonicalized && other.is_canonicalized;
        result.is_retesselated = self.is_retesselated && other.is_retesselated;
        result
    }

    /// Pairwise union without the final cleanup unless requested.
    pub fn union_sub(&self, other: &Solid<S>, retesselate: bool, canonicalize: bool) -> Solid<S> {
        if !self.may_overlap(other) {
            trace!(
                "union of {} and {} polygons: disjoint bounds, concatenating",
                self.polygons.len(),
                other.polygons.len()
            );
            return self.union_for_non_intersecting(other);
        }

        let mut a = Tree::new(&self.polygons);
        let mut b = Tree::new(&other.polygons);

        a.clip_to(&b, false);
        b.clip_to(&a, false);
        b.invert();
        b.clip_to(&a, false);
        b.invert();

        let mut polygons = a.all_polygons();
        polygons.extend(b.all_polygons());
        Solid::from_polygons(polygons).cleaned_up(retesselate, canonicalize)
    }

    /// Pairwise difference without the final cleanup unless requested.
    pub fn subtract_sub(&self, other: &Solid<S>, retesselate: bool, canonicalize: bool) -> Solid<S> {
        let mut a = Tree::new(&self.polygons);
        let mut b = Tree::new(&other.polygons);

        a.invert();
        a.clip_to(&b, false);
        b.clip_to(&a, true);
        a.add_polygons(b.all_polygons());
        a.invert();

        Solid::from_polygons(a.all_polygons()).cleaned_up(retesselate, canonicalize)
    }

    /// Pairwise intersection without the final cleanup unless requested.
    pub fn intersect_sub(&self, other: &Solid<S>, retesselate: bool, canonicalize: bool) -> Solid<S> {
        let mut a = Tree::new(&self.polygons);
        let mut b = Tree::new(&other.polygons);

        a.invert();
        b.clip_to(&a, false);
        b.invert();
        a.clip_to(&b, false);
        b.clip_to(&a, false);
        a.add_polygons(b.all_polygons());
        a.invert();

        Solid::from_polygons(a.all_polygons()).cleaned_up(retesselate, canonicalize)
    }

    fn cleaned_up(self, retesselate: bool, canonicalize: bool) -> Solid<S> {
        let mut result = self;
        if retesselate {
            result = result.retesselated();
        }
        if canonicalize {
            result = result.canonicalized();
        }
        result
    }
}

impl<S: Metadata> BooleanOps for Solid<S> {
    type Output = Solid<S>;

    /// Unions are paired up in a balanced binary pattern: each pass merges
    /// neighbouring operands and appends the result, so the final solid sits
    /// at the end of the working list.
    fn union_all(&self, others: &[Solid<S>]) -> Solid<S> {
        debug!("union of {} solids", others.len() + 1);
        let mut solids = others.to_vec();
        solids.push(self.clone());

        let mut i = 1;
        while i < solids.len() {
            let merged = solids[i - 1].union_sub(&solids[i], false, false);
            solids.push(merged);
            i += 2;
        }

        let result = solids.swap_remove(i - 1).retesselated().canonicalized();
        debug!("union produced {} polygons", result.polygons.len());
        result
    }

    fn subtract_all(&self, others: &[Solid<S>]) -> Solid<S> {
        debug!("subtracting {} solids from {} polygons", others.len(), self.polygons.len());
        let mut result = self.clone();
        for (index, other) in others.iter().enumerate() {
            let last = index + 1 == others.len();
            result = result.subtract_sub(other, last, last);
        }
        debug!("subtraction produced {} polygons", result.polygons.len());
        result
    }

    fn intersect_all(&self, others: &[Solid<S>]) -> Solid<S> {
        debug!("intersecting {} polygons with {} solids", self.polygons.len(), others.len());
        let mut result = self.clone();
        for (index, other) in others.iter().enumerate() {
            let last = index + 1 == others.len();
            result = result.intersect_sub(other, last, last);
        }
        debug!("intersection produced {} polygons", result.polygons.len());
        result
    }
}
