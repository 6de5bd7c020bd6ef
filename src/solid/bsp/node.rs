//! [BSP](https://en.wikipedia.org/wiki/Binary_space_partitioning) tree node structure and operations

use crate::solid::plane::{Plane, PolygonClass};
use crate::solid::polygon::Metadata;
use crate::solid::polygon_tree::{FragmentId, PolygonTree};

/// A BSP tree node. Polygons are not stored directly: the node refers to
/// fragments of the owning tree's [`PolygonTree`].
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Splitting plane for this node, or **None** while nothing has been
    /// inserted yet.
    pub plane: Option<Plane>,

    /// Subtree for the *front* half-space.
    pub front: Option<Box<Node>>,

    /// Subtree for the *back* half-space.
    pub back: Option<Box<Node>>,

    /// Fragments lying on `plane` and facing the same way.
    pub fragments: Vec<FragmentId>,
}

impl Node {
    /// Create a new empty BSP node
    pub const fn new() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            fragments: Vec::new(),
        }
    }

    /// Flip every splitting plane and swap front/back subtrees. The fragments
    /// themselves are flipped by [`PolygonTree::invert`].
    pub fn invert(&mut self) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Some(ref mut plane) = node.plane {
                plane.flip();
            }
            std::mem::swap(&mut node.front, &mut node.back);
            if let Some(ref mut front) = node.front {
                stack.push(front);
            }
            if let Some(ref mut back) = node.back {
                stack.push(back);
            }
        }
    }

    /// Insert fragments into the subtree rooted here.
    ///
    /// A node without a plane adopts the plane of the first fragment.
    /// Fragments coplanar and facing the same way stay on the node; fragments
    /// facing the other way go down the back side together with the ones
    /// behind the plane. Child nodes are created as needed.
    pub fn add_fragments<S: Metadata>(
        &mut self,
        polygon_tree: &mut PolygonTree<S>,
        fragments: Vec<FragmentId>,
    ) {
        let mut stack = vec![(self, fragments)];

        while let Some((node, fragments)) = stack.pop() {
            if node.plane.is_none() {
                node.plane = fragments
                    .iter()
                    .find_map(|&id| polygon_tree.polygon(id))
                    .map(|polygon| polygon.plane.clone());
            }
            let Some(plane) = node.plane.clone() else {
                continue;
            };

            let mut front = Vec::with_capacity(fragments.len() / 2);
            let mut back = Vec::with_capacity(fragments.len() / 2);
            let coplanar = &mut node.fragments;

            for id in fragments {
                polygon_tree.split_by_plane(id, &plane, &mut |class, fragment| match class {
                    PolygonClass::CoplanarFront => coplanar.push(fragment),
                    PolygonClass::Front => front.push(fragment),
                    _ => back.push(fragment),
                });
            }

            if !front.is_empty() {
                let front_node = node.front.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((front_node, front));
            }
            if !back.is_empty() {
                let back_node = node.back.get_or_insert_with(|| Box::new(Node::new()));
                stack.push((back_node, back));
            }
        }
    }

    /// Push `fragments` down this subtree and remove from `polygon_tree`
    /// every fragment that ends up behind a node that has no back child,
    /// i.e. inside the solid this tree describes.
    ///
    /// With `also_remove_coplanar_front` set, fragments coplanar with a node
    /// and facing the same way travel to the back side as well.
    pub fn clip_polygons<S: Metadata>(
        &self,
        polygon_tree: &mut PolygonTree<S>,
        fragments: Vec<FragmentId>,
        also_remove_coplanar_front: bool,
    ) {
        let mut stack = vec![(self, fragments)];

        while let Some((node, fragments)) = stack.pop() {
            let Some(plane) = node.plane.as_ref() else {
                continue;
            };

            let mut front = Vec::with_capacity(fragments.len());
            let mut back = Vec::with_capacity(fragments.len());

            for id in fragments {
                if polygon_tree.is_removed(id) {
                    continue;
                }
                polygon_tree.split_by_plane(id, plane, &mut |class, fragment| match class {
                    PolygonClass::CoplanarFront if also_remove_coplanar_front => {
                        back.push(fragment)
                    },
                    PolygonClass::CoplanarFront | PolygonClass::Front => front.push(fragment),
                    _ => back.push(fragment),
                });
            }

            if let Some(front_node) = node.front.as_deref() {
                if !front.is_empty() {
                    stack.push((front_node, front));
                }
            }

            match node.back.as_deref() {
                Some(back_node) => {
                    if !back.is_empty() {
                        stack.push((back_node, back));
                    }
                },
                None => {
                    for id in back {
                        polygon_tree.remove(id);
                    }
                },
            }
        }
    }

    /// Depth-first iterator over this node and all of its descendants, back
    /// subtrees first.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.front.as_deref());
            stack.extend(node.back.as_deref());
            Some(node)
        })
    }
}
