//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena owned by the [`Bvh`]; a child is either another
//! node or a primitive in the [`World`]. The tree is built once and only read
//! afterwards, so it is shared across render threads without locking.

use std::cmp::Ordering;

use rand::{Rng, RngCore};
use umbra_math::{Aabb, Interval, Ray};

use crate::hittable::{HitRecord, Hittable};
use crate::world::{PrimitiveId, World};

/// One side of a BVH node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhChild {
    /// Index into the BVH's node arena.
    Node(usize),
    /// A primitive leaf.
    Primitive(PrimitiveId),
}

/// Internal node with two children.
///
/// A node built over a single primitive has that primitive on both sides.
#[derive(Debug, Clone)]
pub struct BvhNode {
    pub left: BvhChild,
    pub right: BvhChild,
    pub bbox: Aabb,
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    root: Option<usize>,
}

impl Bvh {
    /// Build a BVH over `objects`.
    ///
    /// Each node splits along an axis drawn uniformly from `rng`, after
    /// sorting its primitives by their minimum bound on that axis.
    pub fn new(world: &World, objects: &[PrimitiveId], rng: &mut dyn RngCore) -> Self {
        let mut entries: Vec<(PrimitiveId, Aabb)> = objects
            .iter()
            .map(|&id| (id, world.bounding_box(id)))
            .collect();

        let mut nodes = Vec::with_capacity(entries.len().saturating_sub(1).max(1));
        let root = if entries.is_empty() {
            None
        } else {
            let (root, depth) = Self::build(&mut entries, &mut nodes, rng);
            log::debug!(
                "Built BVH over {} primitives: {} nodes, depth {}",
                objects.len(),
                nodes.len(),
                depth
            );
            Some(root)
        };

        Self { nodes, root }
    }

    /// Recursive construction. Returns the new node's index and subtree depth.
    fn build(
        entries: &mut [(PrimitiveId, Aabb)],
        nodes: &mut Vec<BvhNode>,
        rng: &mut dyn RngCore,
    ) -> (usize, usize) {
        let axis = rng.gen_range(0..3);
        let axis_min = |entry: &(PrimitiveId, Aabb)| entry.1.axis_interval(axis).min;

        let bbox = entries
            .iter()
            .fold(Aabb::EMPTY, |acc, (_, b)| Aabb::surrounding(&acc, b));

        let (left, right, depth) = match entries.len() {
            1 => {
                let only = entries[0].0;
                (BvhChild::Primitive(only), BvhChild::Primitive(only), 1)
            }
            2 => {
                let (a, b) = (&entries[0], &entries[1]);
                if axis_min(a) < axis_min(b) {
                    (BvhChild::Primitive(a.0), BvhChild::Primitive(b.0), 1)
                } else {
                    (BvhChild::Primitive(b.0), BvhChild::Primitive(a.0), 1)
                }
            }
            _ => {
                entries.sort_by(|a, b| axis_min(a).partial_cmp(&axis_min(b)).unwrap_or(Ordering::Equal));

                let mid = entries.len() / 2;
                let (lower, upper) = entries.split_at_mut(mid);
                let (left, left_depth) = Self::build(lower, nodes, rng);
                let (right, right_depth) = Self::build(upper, nodes, rng);
                (
                    BvhChild::Node(left),
                    BvhChild::Node(right),
                    1 + left_depth.max(right_depth),
                )
            }
        };

        nodes.push(BvhNode { left, right, bbox });
        (nodes.len() - 1, depth)
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    fn hit_child(
        &self,
        world: &World,
        child: BvhChild,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        match child {
            BvhChild::Node(index) => self.hit_node(world, index, ray, ray_t, rng),
            BvhChild::Primitive(id) => world.hit(id, ray, ray_t, rng),
        }
    }

    fn hit_node(
        &self,
        world: &World,
        index: usize,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord> {
        let node = &self.nodes[index];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let hit_left = self.hit_child(world, node.left, ray, ray_t, rng);

        // Only check right up to closest hit
        let right_max = hit_left.map_or(ray_t.max, |rec| rec.t);
        let hit_right = self.hit_child(world, node.right, ray, Interval::new(ray_t.min, right_max), rng);

        hit_right.or(hit_left)
    }
}

impl Hittable for Bvh {
    fn hit(&self, world: &World, ray: &Ray, ray_t: Interval, rng: &mut dyn RngCore) -> Option<HitRecord> {
        let root = self.root?;
        self.hit_node(world, root, ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.root
            .map_or(Aabb::EMPTY, |root| self.nodes[root].bbox)
    }
}
