//! BSP trees over polygon fragments.
//!
//! A [`Tree`] couples a BSP [`Node`] hierarchy with the [`PolygonTree`] that
//! records how the inserted polygons were cut. Clipping one tree against
//! another never touches the polygons directly: it splits and removes
//! fragments, and [`Tree::all_polygons`] reassembles whatever survived.

mod node;

pub use node::Node;

use crate::solid::polygon::{Metadata, Polygon};
use crate::solid::polygon_tree::PolygonTree;
use log::trace;

#[derive(Debug, Clone)]
pub struct Tree<S: Clone> {
    polygon_tree: PolygonTree<S>,
    root: Node,
}

impl<S: Metadata> Tree<S> {
    /// Build a tree from `polygons`.
    pub fn new(polygons: &[Polygon<S>]) -> Self {
        trace!("building bsp tree from {} polygons", polygons.len());
        let mut tree = Tree {
            polygon_tree: PolygonTree::new(),
            root: Node::new(),
        };
        tree.add_polygons(polygons.to_vec());
        tree
    }

    pub const fn root(&self) -> &Node {
        &self.root
    }

    pub const fn polygon_tree(&self) -> &PolygonTree<S> {
        &self.polygon_tree
    }

    /// Turn the described solid inside out.
    pub fn invert(&mut self) {
        self.polygon_tree.invert();
        self.root.invert();
    }

    /// Remove every fragment of this tree that lies inside `other`.
    ///
    /// Fragments coplanar with a face of `other` and facing the same way are
    /// kept, unless `also_remove_coplanar_front` is set.
    pub fn clip_to(&mut self, other: &Tree<S>, also_remove_coplanar_front: bool) {
        let Tree { polygon_tree, root } = self;
        trace!("clipping {} fragment nodes", polygon_tree.len());
        for node in root.iter() {
            if !node.fragments.is_empty() {
                other
                    .root
                    .clip_polygons(polygon_tree, node.fragments.clone(), also_remove_coplanar_front);
            }
        }
    }

    /// The surviving geometry, unsplit wherever no fragment was discarded.
    pub fn all_polygons(&self) -> Vec<Polygon<S>> {
        self.polygon_tree.collect()
    }

    /// Insert more polygons into the tree.
    pub fn add_polygons(&mut self, polygons: Vec<Polygon<S>>) {
        let fragments = self.polygon_tree.add_polygons(polygons);
        self.root.add_fragments(&mut self.polygon_tree, fragments);
    }
}
