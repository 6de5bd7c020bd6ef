//! Polygon fragment tree.
//!
//! For every polygon inserted into a BSP [`Tree`](crate::solid::bsp::Tree) the
//! polygon tree records how it gets subdivided by splitting planes. Nodes live
//! in an arena and refer to each other by [`FragmentId`].
//!
//! A node that has been split keeps its own polygon until one of its
//! descendants is removed. As long as nothing below it was discarded,
//! [`PolygonTree::collect`] therefore returns the original unsplit polygon
//! instead of its fragments.

use crate::float_types::Real;
use crate::solid::plane::{Plane, PolygonClass};
use crate::solid::polygon::{Metadata, Polygon};

/// Extra radius added to a polygon's bounding sphere before the quick
/// front/back rejection test.
const SPHERE_SLACK: Real = 1e-4;

/// Index of a node in a [`PolygonTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(usize);

#[derive(Debug, Clone)]
struct FragmentNode<S: Clone> {
    parent: Option<FragmentId>,
    children: Vec<FragmentId>,
    polygon: Option<Polygon<S>>,
    removed: bool,
}

impl<S: Clone> FragmentNode<S> {
    const fn new(parent: Option<FragmentId>, polygon: Option<Polygon<S>>) -> Self {
        FragmentNode {
            parent,
            children: Vec::new(),
            polygon,
            removed: false,
        }
    }
}

/// Arena of fragment nodes rooted at [`PolygonTree::ROOT`].
#[derive(Debug, Clone)]
pub struct PolygonTree<S: Clone> {
    nodes: Vec<FragmentNode<S>>,
}

impl<S: Metadata> Default for PolygonTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Metadata> PolygonTree<S> {
    /// The root never holds a polygon; inserted polygons become its children.
    pub const ROOT: FragmentId = FragmentId(0);

    pub fn new() -> Self {
        PolygonTree {
            nodes: vec![FragmentNode::new(None, None)],
        }
    }

    /// Insert one leaf per polygon under the root, returning their ids in
    /// input order.
    pub fn add_polygons<I>(&mut self, polygons: I) -> Vec<FragmentId>
    where
        I: IntoIterator<Item = Polygon<S>>,
    {
        polygons
            .into_iter()
            .map(|polygon| self.add_child(Self::ROOT, polygon))
            .collect()
    }

    fn add_child(&mut self, parent: FragmentId, polygon: Polygon<S>) -> FragmentId {
        let id = FragmentId(self.nodes.len());
        self.nodes.push(FragmentNode::new(Some(parent), Some(polygon)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Number of nodes ever allocated, including the root and removed nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The node's current polygon, `None` once invalidated.
    pub fn polygon(&self, id: FragmentId) -> Option<&Polygon<S>> {
        self.nodes[id.0].polygon.as_ref()
    }

    pub fn children(&self, id: FragmentId) -> &[FragmentId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: FragmentId) -> Option<FragmentId> {
        self.nodes[id.0].parent
    }

    pub fn is_removed(&self, id: FragmentId) -> bool {
        self.nodes[id.0].removed
    }

    /// Discard a fragment: mark it removed, detach it from its parent and
    /// drop the cached polygon of every ancestor up to the first one that is
    /// already invalidated. Removing twice is a no-op.
    pub fn remove(&mut self, id: FragmentId) {
        let node = &mut self.nodes[id.0];
        if node.removed {
            return;
        }
        node.removed = true;
        let Some(parent) = node.parent else {
            debug_assert!(false, "the root of a polygon tree cannot be removed");
            return;
        };

        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings.iter().position(|&child| child == id);
        debug_assert!(position.is_some(), "fragment {id:?} missing from its parent");
        if let Some(position) = position {
            siblings.remove(position);
        }

        let mut current = Some(parent);
        while let Some(ancestor) = current {
            let node = &mut self.nodes[ancestor.0];
            if node.polygon.is_none() {
                break;
            }
            node.polygon = None;
            current = node.parent;
        }
    }

    /// Flip every polygon held anywhere in the tree.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            if let Some(polygon) = node.polygon.as_mut() {
                *polygon = polygon.flipped();
            }
        }
    }

    /// Breadth-first collection of the surviving geometry: a node with a
    /// polygon contributes it and is not descended into; a node without one
    /// contributes its children instead.
    pub fn collect(&self) -> Vec<Polygon<S>> {
        let mut result = Vec::new();
        let mut queue: Vec<FragmentId> = self.nodes[Self::ROOT.0].children.clone();
        let mut next = 0;
        while next < queue.len() {
            let node = &self.nodes[queue[next].0];
            next += 1;
            match &node.polygon {
                Some(polygon) => result.push(polygon.clone()),
                None => queue.extend_from_slice(&node.children),
            }
        }
        result
    }

    /// Classify the leaves under `id` against `plane`, splitting spanning
    /// leaves into new front/back children.
    ///
    /// `sink` receives every resulting fragment together with its class; it is
    /// never called with [`PolygonClass::Spanning`] since spanning leaves are
    /// reported through their new children as `Front` / `Back`.
    pub fn split_by_plane<F>(&mut self, id: FragmentId, plane: &Plane, sink: &mut F)
    where
        F: FnMut(PolygonClass, FragmentId),
    {
        if self.nodes[id.0].children.is_empty() {
            self.split_leaf(id, plane, sink);
            return;
        }

        let mut queue = self.nodes[id.0].children.clone();
        let mut next = 0;
        while next < queue.len() {
            let node = queue[next];
            next += 1;
            if self.nodes[node.0].children.is_empty() {
                self.split_leaf(node, plane, sink);
            } else {
                queue.extend_from_slice(&self.nodes[node.0].children);
            }
        }
    }

    fn split_leaf<F>(&mut self, id: FragmentId, plane: &Plane, sink: &mut F)
    where
        F: FnMut(PolygonClass, FragmentId),
    {
        let Some(polygon) = self.nodes[id.0].polygon.as_ref() else {
            return;
        };

        let (center, radius) = polygon.bounding_sphere();
        let radius = radius + SPHERE_SLACK;
        let distance = plane.signed_distance(&center);
        if distance > radius {
            sink(PolygonClass::Front, id);
            return;
        }
        if distance < -radius {
            sink(PolygonClass::Back, id);
            return;
        }

        let split = plane.split_polygon(polygon);
        match split.class {
            PolygonClass::Spanning => {
                if let Some(front) = split.front {
                    let child = self.add_child(id, front);
                    sink(PolygonClass::Front, child);
                }
                if let Some(back) = split.back {
                    let child = self.add_child(id, back);
                    sink(PolygonClass::Back, child);
                }
            },
            class => sink(class, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solid::vertex::Vertex;
    use nalgebra::{Point3, Vector3};

    fn square() -> Polygon<()> {
        Polygon::new(
            vec![
                Vertex::new(Point3::new(-1.0, -1.0, 0.0)),
                Vertex::new(Point3::new(1.0, -1.0, 0.0)),
                Vertex::new(Point3::new(1.0, 1.0, 0.0)),
                Vertex::new(Point3::new(-1.0, 1.0, 0.0)),
            ],
            None,
        )
    }

    fn split_square(tree: &mut PolygonTree<()>) -> (FragmentId, Vec<(PolygonClass, FragmentId)>) {
        let ids = tree.add_polygons([square()]);
        let mut seen = Vec::new();
        let plane = Plane::from_normal(Vector3::x(), 0.0);
        tree.split_by_plane(ids[0], &plane, &mut |class, id| seen.push((class, id)));
        (ids[0], seen)
    }

    #[test]
    fn split_keeps_parent_polygon_until_removal() {
        let mut tree = PolygonTree::new();
        let (leaf, seen) = split_square(&mut tree);

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, PolygonClass::Front);
        assert_eq!(seen[1].0, PolygonClass::Back);
        assert_eq!(tree.children(leaf).len(), 2);

        // nothing removed yet: the unsplit square is still authoritative
        let collected = tree.collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].vertices.len(), 4);

        tree.remove(seen[1].1);
        assert!(tree.is_removed(seen[1].1));
        assert!(tree.polygon(leaf).is_none());
        assert_eq!(tree.children(leaf), &[seen[0].1]);

        let collected = tree.collect();
        assert_eq!(collected.len(), 1);
        assert!(collected[0].vertices.iter().all(|v| v.pos.x >= -1e-9));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut tree = PolygonTree::new();
        let (leaf, seen) = split_square(&mut tree);
        tree.remove(seen[0].1);
        tree.remove(seen[0].1);
        assert_eq!(tree.children(leaf).len(), 1);
        tree.remove(seen[1].1);
        assert!(tree.children(leaf).is_empty());
        assert!(tree.collect().is_empty());
    }

    #[test]
    fn split_descends_to_leaves() {
        let mut tree = PolygonTree::new();
        let (leaf, _) = split_square(&mut tree);
        let mut seen = Vec::new();
        let plane = Plane::from_normal(Vector3::y(), 0.0);
        tree.split_by_plane(leaf, &plane, &mut |class, id| seen.push((class, id)));
        // both halves are cut again
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|(_, id)| tree.parent(*id) != Some(leaf)));
    }

    #[test]
    fn far_polygons_use_the_sphere_test() {
        let mut tree = PolygonTree::new();
        let ids = tree.add_polygons([square()]);
        let plane = Plane::from_normal(Vector3::x(), -10.0);
        let mut seen = Vec::new();
        tree.split_by_plane(ids[0], &plane, &mut |class, id| seen.push((class, id)));
        assert_eq!(seen, vec![(PolygonClass::Front, ids[0])]);
        assert!(tree.children(ids[0]).is_empty());
    }

    #[test]
    fn invert_flips_every_polygon() {
        let mut tree = PolygonTree::new();
        tree.add_polygons([square()]);
        tree.invert();
        let collected = tree.collect();
        assert!((collected[0].plane.normal + Vector3::z()).norm() < 1e-12);
    }
}
