use std::collections::VecDeque;

use bevy::{
    log::{debug, warn},
    math::{
        bounding::{Aabb3d, BoundingVolume, RayCast3d},
        Vec3,
    },
    prelude::Component,
};
use lox::{
    core::Mesh as LoxMesh,
    map::{DenseMap, PropStoreMut},
    FaceHandle,
};

use crate::core::dim3::{centroid, ray_intersects_polygon_at};

use super::EditableMesh;

/// Bounding volume hierarchy over the faces of an [`EditableMesh`], in mesh-local space.
#[derive(Component, Default)]
pub struct BoundingVolumeHierarchy {
    pub nodes: Vec<Node>,
}

#[derive(Clone, Copy, Default, Debug)]
struct Bucket {
    primitive_count: u32,
    aabb: Option<Aabb3d>,
}

impl Bucket {
    fn add(&mut self, aabb: &Aabb3d) {
        self.primitive_count += 1;
        self.aabb = Some(match self.aabb {
            Some(bucket_aabb) => bucket_aabb.merge(aabb),
            None => *aabb,
        });
    }

    fn merge(self, other: &Bucket) -> Bucket {
        Bucket {
            primitive_count: self.primitive_count + other.primitive_count,
            aabb: match (self.aabb, other.aabb) {
                (Some(a), Some(b)) => Some(a.merge(&b)),
                (a, b) => a.or(b),
            },
        }
    }
}

struct Split {
    axis: usize,
    bucket: usize,
    cost: f32,
}

pub enum Node {
    NonLeaf {
        left: u32,
        right: u32,
        aabb: Aabb3d,
    },
    Leaf {
        aabb: Aabb3d,
        primitive_list: Vec<FaceHandle>,
    },
}

impl Node {
    pub fn intersects_ray(&self, ray: &RayCast3d) -> Option<f32> {
        ray.aabb_intersection_at(&self.aabb())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn primitives(&self) -> Option<&Vec<FaceHandle>> {
        match self {
            Node::Leaf { primitive_list, .. } => Some(primitive_list),
            Node::NonLeaf { .. } => None,
        }
    }

    pub fn children(&self) -> Option<[u32; 2]> {
        match self {
            Node::Leaf { .. } => None,
            Node::NonLeaf { left, right, .. } => Some([*left, *right]),
        }
    }

    pub fn aabb(&self) -> Aabb3d {
        match self {
            Node::Leaf { aabb, .. } => *aabb,
            Node::NonLeaf { aabb, .. } => *aabb,
        }
    }
}

impl BoundingVolumeHierarchy {
    const BUCKET_COUNT: usize = 16;
    pub const MAX_PRIMITIVES_PER_LEAF: usize = 8;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Does fast ray intersection test. Does not consider the primitives in the leaf node.
    pub fn intersects_ray_at_fast(&self, ray: &RayCast3d) -> Option<f32> {
        let mut closest_t = None;

        self.traverse(ray, |node, entry_t, closest: &mut Option<f32>| {
            if node.is_leaf() && closest.map_or(true, |t| entry_t < t) {
                *closest = Some(entry_t);
            }
            *closest
        }, &mut closest_t);

        closest_t
    }

    /// Nearest face hit by `ray`, with the distance along it. The ray must be in mesh-local space.
    pub fn intersects_ray_at(
        &self,
        ray: &RayCast3d,
        mesh: &EditableMesh,
    ) -> Option<(FaceHandle, f32)> {
        let mut closest = Option::<(FaceHandle, f32)>::None;

        self.traverse(ray, |node, _, closest: &mut Option<(FaceHandle, f32)>| {
            for face_handle in node.primitives().into_iter().flatten().copied() {
                let (_, corners) = mesh.face_corners(face_handle);

                let Some(t) = ray_intersects_polygon_at(ray, &corners) else {
                    continue;
                };

                if closest.map_or(true, |(_, value)| t < value) {
                    *closest = Some((face_handle, t));
                }
            }
            closest.map(|(_, t)| t)
        }, &mut closest);

        closest
    }

    /// Visits leaves front to back, skipping nodes that start beyond the best distance
    /// reported by `visit_leaf`.
    fn traverse<T>(
        &self,
        ray: &RayCast3d,
        mut visit_leaf: impl FnMut(&Node, f32, &mut T) -> Option<f32>,
        state: &mut T,
    ) {
        let Some(root) = self.nodes.first() else {
            return;
        };

        let Some(root_t) = root.intersects_ray(ray) else {
            return;
        };

        let mut stack = vec![(0u32, root_t)];
        let mut best_t = Option::<f32>::None;

        while let Some((index, entry_t)) = stack.pop() {
            if best_t.is_some_and(|t| entry_t > t) {
                continue;
            }

            let node = &self.nodes[index as usize];

            let Some([left, right]) = node.children() else {
                best_t = visit_leaf(node, entry_t, state);
                continue;
            };

            let left_t = self.nodes[left as usize].intersects_ray(ray);
            let right_t = self.nodes[right as usize].intersects_ray(ray);

            match (left_t, right_t) {
                (Some(left_t), Some(right_t)) => {
                    if left_t < right_t {
                        stack.push((right, right_t));
                        stack.push((left, left_t));
                    } else {
                        stack.push((left, left_t));
                        stack.push((right, right_t));
                    }
                }
                (Some(left_t), None) => stack.push((left, left_t)),
                (None, Some(right_t)) => stack.push((right, right_t)),
                (None, None) => {}
            }
        }
    }

    fn bucket_index(value: f32, min: f32, extent: f32) -> usize {
        if extent <= 0.0 {
            return 0;
        }

        let bucket = (value - min) / extent * Self::BUCKET_COUNT as f32;
        bucket.clamp(0.0, (Self::BUCKET_COUNT - 1) as f32) as usize
    }

    fn split_node(
        &mut self,
        node_index: u32,
        face_centroid_cache: &DenseMap<FaceHandle, Vec3>,
        face_aabb_cache: &DenseMap<FaceHandle, Aabb3d>,
    ) -> Option<(u32, u32)> {
        let Node::Leaf {
            aabb: root_aabb,
            primitive_list: root_primitive_list,
        } = &self.nodes[node_index as usize]
        else {
            return None;
        };
        let root_aabb = *root_aabb;

        let (centroid_min, centroid_max) = root_primitive_list.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), face_handle| {
                let centroid = face_centroid_cache[*face_handle];
                (centroid.min(min), centroid.max(max))
            },
        );
        let centroid_extent = centroid_max - centroid_min;

        let mut best_split = Option::<Split>::None;

        for axis in 0..3 {
            let mut buckets = [Bucket::default(); Self::BUCKET_COUNT];

            for face_handle in root_primitive_list.iter().copied() {
                let bucket_index = Self::bucket_index(
                    face_centroid_cache[face_handle][axis],
                    centroid_min[axis],
                    centroid_extent[axis],
                );
                buckets[bucket_index].add(&face_aabb_cache[face_handle]);
            }

            for i in 1..Self::BUCKET_COUNT {
                let left = buckets[..i]
                    .iter()
                    .fold(Bucket::default(), |acc, bucket| acc.merge(bucket));
                let right = buckets[i..]
                    .iter()
                    .fold(Bucket::default(), |acc, bucket| acc.merge(bucket));

                let (Some(left_aabb), Some(right_aabb)) = (left.aabb, right.aabb) else {
                    continue;
                };

                // surface area heuristic, left unnormalized since only the ordering matters
                let cost = left_aabb.visible_area() * left.primitive_count as f32
                    + right_aabb.visible_area() * right.primitive_count as f32;

                if best_split.as_ref().map_or(true, |best| cost < best.cost) {
                    best_split = Some(Split {
                        axis,
                        bucket: i,
                        cost,
                    });
                }
            }
        }

        let Split { axis, bucket, .. } = best_split?;

        let (left_primitive_list, right_primitive_list): (Vec<FaceHandle>, Vec<FaceHandle>) =
            root_primitive_list.iter().copied().partition(|face_handle| {
                Self::bucket_index(
                    face_centroid_cache[*face_handle][axis],
                    centroid_min[axis],
                    centroid_extent[axis],
                ) < bucket
            });

        let bounds = |primitives: &[FaceHandle]| {
            primitives
                .iter()
                .map(|face_handle| face_aabb_cache[*face_handle])
                .reduce(|acc, aabb| acc.merge(&aabb))
        };

        let (Some(left_aabb), Some(right_aabb)) =
            (bounds(&left_primitive_list), bounds(&right_primitive_list))
        else {
            return None;
        };

        let left_node_index = self.nodes.len() as u32;
        let right_node_index = left_node_index + 1;

        self.nodes.push(Node::Leaf {
            aabb: left_aabb,
            primitive_list: left_primitive_list,
        });

        self.nodes.push(Node::Leaf {
            aabb: right_aabb,
            primitive_list: right_primitive_list,
        });

        self.nodes[node_index as usize] = Node::NonLeaf {
            left: left_node_index,
            right: right_node_index,
            aabb: root_aabb,
        };

        Some((left_node_index, right_node_index))
    }
}

impl From<&EditableMesh> for BoundingVolumeHierarchy {
    fn from(mesh: &EditableMesh) -> Self {
        let mut face_centroid_cache =
            DenseMap::<FaceHandle, Vec3>::with_capacity(mesh.structure.num_faces());
        let mut face_aabb_cache =
            DenseMap::<FaceHandle, Aabb3d>::with_capacity(mesh.structure.num_faces());

        let mut root_aabb = Option::<Aabb3d>::None;

        for face_handle in mesh.structure.face_handles() {
            let (_, corners) = mesh.face_corners(face_handle);

            let (min, max) = corners.iter().fold(
                (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
                |(min, max), position| (position.min(min), position.max(max)),
            );
            let face_aabb = Aabb3d { min, max };

            face_centroid_cache.insert(face_handle, centroid(&corners));
            face_aabb_cache.insert(face_handle, face_aabb);

            root_aabb = Some(match root_aabb {
                Some(aabb) => aabb.merge(&face_aabb),
                None => face_aabb,
            });
        }

        let mut bvh = BoundingVolumeHierarchy::new();

        let Some(root_aabb) = root_aabb else {
            return bvh;
        };

        bvh.nodes.push(Node::Leaf {
            aabb: root_aabb,
            primitive_list: mesh.structure.face_handles().collect(),
        });

        let mut queue = VecDeque::<u32>::new();

        queue.push_back(0);

        while let Some(top) = queue.pop_front() {
            let primitive_count = bvh.nodes[top as usize]
                .primitives()
                .map_or(0, |primitives| primitives.len());

            if primitive_count <= Self::MAX_PRIMITIVES_PER_LEAF {
                continue;
            }

            match bvh.split_node(top, &face_centroid_cache, &face_aabb_cache) {
                Some((left, right)) => {
                    queue.push_back(left);
                    queue.push_back(right);
                }
                None => {
                    warn!(
                        "Failed to split node, leaving at size {} when max is {}",
                        primitive_count,
                        Self::MAX_PRIMITIVES_PER_LEAF
                    );
                }
            };
        }

        debug!(
            "Built BVH with {} nodes over {} faces",
            bvh.nodes.len(),
            mesh.structure.num_faces()
        );

        bvh
    }
}
