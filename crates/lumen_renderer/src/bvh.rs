//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and refer to their children by index. The tree
//! is built bottom-up by agglomerative clustering: the two forest members
//! with the closest box centers are merged until a single root remains.
//! Construction is cubic in the element count, which is fine for the
//! per-object triangle counts of an offline scene.

use lumen_math::{Aabb, Ray};

/// Index of a node in the BVH arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An input element: its box and the caller's index for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhElement {
    pub bbox: Aabb,
    pub index: usize,
}

/// BVH node - either a leaf carrying an element index or an internal node
/// with exactly two children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Leaf { element: usize },
    Internal { left: NodeId, right: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub bbox: Aabb,
    pub kind: NodeKind,
}

/// Binary tree of boxes over caller-indexed elements.
///
/// Children are always stored before their parent, so iterating the arena
/// in order visits the tree bottom-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Bvh {
    /// Build a BVH over `elements`. An empty input yields a tree that is
    /// never hit.
    pub fn new(elements: &[BvhElement]) -> Self {
        let mut nodes: Vec<Node> = elements
            .iter()
            .map(|e| Node {
                bbox: e.bbox,
                kind: NodeKind::Leaf { element: e.index },
            })
            .collect();

        if nodes.is_empty() {
            return Self::default();
        }

        let mut forest: Vec<NodeId> = (0..nodes.len()).map(NodeId).collect();

        while forest.len() > 1 {
            let (i, j) = Self::closest_pair(&nodes, &forest);

            // j > i, so removing j first keeps i valid
            let right = forest.remove(j);
            let left = forest.remove(i);

            let bbox = Aabb::surrounding(&nodes[left.0].bbox, &nodes[right.0].bbox);
            nodes.push(Node {
                bbox,
                kind: NodeKind::Internal { left, right },
            });
            forest.push(NodeId(nodes.len() - 1));
        }

        Self {
            root: forest.first().copied(),
            nodes,
        }
    }

    /// Pair of forest positions `(i, j)`, `i < j`, with the smallest
    /// squared distance between box centers. The first pair in scan order
    /// wins ties.
    fn closest_pair(nodes: &[Node], forest: &[NodeId]) -> (usize, usize) {
        let centers: Vec<_> = forest.iter().map(|id| nodes[id.0].bbox.centroid()).collect();

        let mut best = (0, 1);
        let mut best_distance = f32::INFINITY;

        for i in 0..centers.len() {
            for j in (i + 1)..centers.len() {
                let distance = centers[i].distance_squared(centers[j]);
                if distance < best_distance {
                    best_distance = distance;
                    best = (i, j);
                }
            }
        }

        best
    }

    /// Recompute every box without changing the topology.
    ///
    /// Leaf boxes come from `box_of(element)`; internal boxes become the
    /// union of their children.
    pub fn rebuild<F>(&mut self, mut box_of: F)
    where
        F: FnMut(usize) -> Aabb,
    {
        for i in 0..self.nodes.len() {
            let bbox = match self.nodes[i].kind {
                NodeKind::Leaf { element } => box_of(element),
                NodeKind::Internal { left, right } => {
                    Aabb::surrounding(&self.nodes[left.0].bbox, &self.nodes[right.0].bbox)
                }
            };
            self.nodes[i].bbox = bbox;
        }
    }

    /// Unordered candidate element indices whose boxes the ray passes.
    ///
    /// Every element the ray actually hits is included; extra candidates
    /// are possible and callers must test each one.
    pub fn hits(&self, ray: &Ray) -> Vec<usize> {
        let mut result = Vec::new();
        let Some(root) = self.root else {
            return result;
        };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if !node.bbox.hit(ray) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { element } => result.push(element),
                NodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        result
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Box of the whole tree (empty for an empty tree).
    pub fn bounding_box(&self) -> Aabb {
        self.root
            .map(|id| self.nodes[id.0].bbox)
            .unwrap_or(Aabb::EMPTY)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;

    fn unit_box(center: Vec3, index: usize) -> BvhElement {
        BvhElement {
            bbox: Aabb::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5)),
            index,
        }
    }

    fn leaf_count(bvh: &Bvh, id: NodeId) -> usize {
        match bvh.node(id).kind {
            NodeKind::Leaf { .. } => 1,
            NodeKind::Internal { left, right } => leaf_count(bvh, left) + leaf_count(bvh, right),
        }
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = Bvh::new(&[]);
        assert!(bvh.is_empty());
        assert!(bvh.bounding_box().is_empty());
        assert!(bvh.hits(&Ray::new(Vec3::ZERO, Vec3::X)).is_empty());
    }

    #[test]
    fn test_bvh_single_element() {
        let bvh = Bvh::new(&[unit_box(Vec3::new(0.0, 0.0, -3.0), 7)]);

        assert_eq!(bvh.node_count(), 1);
        assert!(matches!(
            bvh.node(bvh.root().unwrap()).kind,
            NodeKind::Leaf { element: 7 }
        ));
        assert_eq!(bvh.hits(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)), vec![7]);
        assert!(bvh.hits(&Ray::new(Vec3::ZERO, Vec3::Z)).is_empty());
    }

    #[test]
    fn test_closest_centers_merge_first() {
        // 0 and 1 are close, 2 is far away
        let elements = [
            unit_box(Vec3::new(0.0, 0.0, 0.0), 0),
            unit_box(Vec3::new(1.5, 0.0, 0.0), 1),
            unit_box(Vec3::new(50.0, 0.0, 0.0), 2),
        ];
        let bvh = Bvh::new(&elements);

        assert_eq!(bvh.node_count(), 5);
        let first_merge = bvh.node(NodeId(3));
        assert_eq!(
            first_merge.kind,
            NodeKind::Internal {
                left: NodeId(0),
                right: NodeId(1)
            }
        );
        assert_eq!(bvh.root(), Some(NodeId(4)));
        assert_eq!(leaf_count(&bvh, NodeId(4)), 3);
    }

    #[test]
    fn test_ties_use_scan_order() {
        // Equal spacing: (0,1) and (1,2) tie, scan order picks (0,1)
        let elements = [
            unit_box(Vec3::new(0.0, 0.0, 0.0), 0),
            unit_box(Vec3::new(2.0, 0.0, 0.0), 1),
            unit_box(Vec3::new(4.0, 0.0, 0.0), 2),
        ];
        let bvh = Bvh::new(&elements);

        assert_eq!(
            bvh.node(NodeId(3)).kind,
            NodeKind::Internal {
                left: NodeId(0),
                right: NodeId(1)
            }
        );
    }

    #[test]
    fn test_internal_box_is_union_of_children() {
        let elements: Vec<_> = (0..6)
            .map(|i| unit_box(Vec3::new(i as f32 * 3.0, (i % 2) as f32, 0.0), i))
            .collect();
        let bvh = Bvh::new(&elements);

        for i in 0..bvh.node_count() {
            let node = bvh.node(NodeId(i));
            if let NodeKind::Internal { left, right } = node.kind {
                let union = Aabb::surrounding(&bvh.node(left).bbox, &bvh.node(right).bbox);
                assert_eq!(node.bbox, union);
            }
        }
        assert_eq!(leaf_count(&bvh, bvh.root().unwrap()), 6);
    }

    #[test]
    fn test_rebuild_keeps_topology() {
        let elements = [
            unit_box(Vec3::new(0.0, 0.0, 0.0), 0),
            unit_box(Vec3::new(3.0, 0.0, 0.0), 1),
            unit_box(Vec3::new(9.0, 0.0, 0.0), 2),
        ];
        let mut bvh = Bvh::new(&elements);
        let before: Vec<_> = (0..bvh.node_count()).map(|i| bvh.node(NodeId(i)).kind).collect();

        let offset = Vec3::new(0.0, 10.0, 0.0);
        bvh.rebuild(|element| elements[element].bbox.translate(offset));

        let after: Vec<_> = (0..bvh.node_count()).map(|i| bvh.node(NodeId(i)).kind).collect();
        assert_eq!(before, after);

        let root_box = bvh.bounding_box();
        assert!((root_box.min() - Vec3::new(-0.5, 9.5, -0.5)).length() < 1e-5);
        assert!((root_box.max() - Vec3::new(9.5, 10.5, 0.5)).length() < 1e-5);

        let ray = Ray::new(Vec3::new(3.0, 10.0, 5.0), Vec3::NEG_Z);
        assert_eq!(bvh.hits(&ray), vec![1]);
        let old_ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(bvh.hits(&old_ray).is_empty());
    }

    #[test]
    fn test_hits_has_no_duplicates() {
        let elements: Vec<_> = (0..8)
            .map(|i| unit_box(Vec3::new(i as f32 * 2.0, 0.0, 0.0), i))
            .collect();
        let bvh = Bvh::new(&elements);

        let mut hits = bvh.hits(&Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X));
        hits.sort_unstable();
        assert_eq!(hits, (0..8).collect::<Vec<_>>());
    }
}
