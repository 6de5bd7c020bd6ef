//! Canonicalization: snap near-coincident vertices, planes and shared records
//! of a solid onto single representative instances so that their tags can be
//! compared directly.

use crate::float_types::tolerance;
use crate::fuzzy::FuzzyFactory;
use crate::solid::Solid;
use crate::solid::plane::Plane;
use crate::solid::polygon::{Metadata, Polygon, Shared};
use crate::solid::vertex::Vertex;
use hashbrown::HashMap;
use log::debug;

/// Lookup tables mapping vertices, planes and shared records to their
/// canonical instances.
#[derive(Debug, Clone)]
pub struct SolidFactory<S: Clone> {
    vertex_factory: FuzzyFactory<Vertex, 3>,
    plane_factory: FuzzyFactory<Plane, 4>,
    shared_factory: HashMap<Option<S>, Shared<S>>,
}

impl<S: Metadata> Default for SolidFactory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Metadata> SolidFactory<S> {
    pub fn new() -> Self {
        let eps = tolerance();
        SolidFactory {
            vertex_factory: FuzzyFactory::new(eps),
            plane_factory: FuzzyFactory::new(eps),
            shared_factory: HashMap::new(),
        }
    }

    pub fn get_vertex(&mut self, vertex: &Vertex) -> Vertex {
        let pos = vertex.pos;
        self.vertex_factory
            .lookup_or_create([pos.x, pos.y, pos.z], || vertex.clone())
    }

    pub fn get_plane(&mut self, plane: &Plane) -> Plane {
        let n = plane.normal;
        self.plane_factory
            .lookup_or_create([n.x, n.y, n.z, plane.w], || plane.clone())
    }

    /// Shared records are deduplicated by exact metadata value.
    pub fn get_shared(&mut self, shared: &Shared<S>) -> Shared<S> {
        self.shared_factory
            .entry(shared.metadata.clone())
            .or_insert_with(|| shared.clone())
            .clone()
    }

    /// Canonical copy of `polygon`, or `None` if snapping collapsed it below
    /// three distinct vertices.
    pub fn get_polygon(&mut self, polygon: &Polygon<S>) -> Option<Polygon<S>> {
        let plane = self.get_plane(&polygon.plane);
        let shared = self.get_shared(&polygon.shared);
        let snapped: Vec<Vertex> = polygon
            .vertices
            .iter()
            .map(|vertex| self.get_vertex(vertex))
            .collect();

        // drop consecutive repeats, the ring wrapping around included
        let mut vertices = Vec::with_capacity(snapped.len());
        let mut prev_tag = snapped.last().map(Vertex::tag);
        for vertex in snapped {
            if prev_tag != Some(vertex.tag()) {
                prev_tag = Some(vertex.tag());
                vertices.push(vertex);
            }
        }

        (vertices.len() >= 3).then(|| Polygon::with_plane(vertices, shared, plane))
    }

    pub fn get_solid(&mut self, solid: &Solid<S>) -> Solid<S> {
        let polygons: Vec<Polygon<S>> = solid
            .polygons
            .iter()
            .filter_map(|polygon| self.get_polygon(polygon))
            .collect();
        let mut result = Solid::from_polygons(polygons);
        result.is_canonicalized = true;
        result.is_retesselated = solid.is_retesselated;
        result
    }
}

impl<S: Metadata> Solid<S> {
    /// Snap near-coincident vertices, planes and shared records onto shared
    /// instances. Returns a clone if already canonicalized.
    pub fn canonicalized(&self) -> Solid<S> {
        if self.is_canonicalized {
            return self.clone();
        }
        let result = SolidFactory::new().get_solid(self);
        debug!(
            "canonicalized {} polygons into {}",
            self.polygons.len(),
            result.polygons.len()
        );
        result
    }
}
