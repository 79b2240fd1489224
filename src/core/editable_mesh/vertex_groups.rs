use bevy::{
    log::warn,
    prelude::*,
    render::mesh::VertexAttributeValues,
    utils::HashMap,
};
use lox::{Handle as LoxHandle, VertexHandle};

/// Named per-vertex weight channels of a mesh entity.
///
/// Weights are sparse: a vertex only stores entries for the groups it belongs to.
#[derive(Component, Default, Debug, Clone)]
pub struct VertexGroups {
    names: Vec<String>,
    active: Option<u32>,
    // vertex index -> (group index -> weight)
    weights: HashMap<u32, HashMap<u32, f32>>,
}

impl VertexGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group and makes it the active one.
    pub fn add_group(&mut self, name: impl Into<String>) -> u32 {
        let index = self.names.len() as u32;
        self.names.push(name.into());
        self.active = Some(index);
        index
    }

    pub fn group_index(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .position(|group| group == name)
            .map(|index| index as u32)
    }

    pub fn group_name(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn active(&self) -> Option<u32> {
        self.active
    }

    /// Returns false, and leaves the active group alone, when `index` names no group.
    pub fn set_active(&mut self, index: u32) -> bool {
        if index as usize >= self.names.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Stores `weight` clamped to `[0, 1]`. Returns false, and stores nothing, when `group`
    /// names no group.
    pub fn set_weight(&mut self, vertex: VertexHandle, group: u32, weight: f32) -> bool {
        if group as usize >= self.names.len() {
            return false;
        }

        self.weights
            .entry(vertex.idx())
            .or_default()
            .insert(group, weight.clamp(0.0, 1.0));
        true
    }

    pub fn remove_weight(&mut self, vertex: VertexHandle, group: u32) -> Option<f32> {
        let entries = self.weights.get_mut(&vertex.idx())?;
        let removed = entries.remove(&group);

        if entries.is_empty() {
            self.weights.remove(&vertex.idx());
        }

        removed
    }

    pub fn weight(&self, vertex: VertexHandle, group: u32) -> Option<f32> {
        self.weights
            .get(&vertex.idx())
            .and_then(|entries| entries.get(&group))
            .copied()
    }

    /// Builds one group per joint from the skinning attributes of `mesh`.
    ///
    /// Vertex `i` of the attributes maps to `VertexHandle::new(i)`, which is how
    /// [`EditableMesh`](super::EditableMesh) numbers vertices when converting a bevy mesh.
    pub fn from_skinning_attributes(mesh: &Mesh) -> Self {
        let mut vertex_groups = Self::new();

        let (
            Some(VertexAttributeValues::Uint16x4(joint_indices)),
            Some(VertexAttributeValues::Float32x4(joint_weights)),
        ) = (
            mesh.attribute(Mesh::ATTRIBUTE_JOINT_INDEX),
            mesh.attribute(Mesh::ATTRIBUTE_JOINT_WEIGHT),
        )
        else {
            return vertex_groups;
        };

        if joint_indices.len() != joint_weights.len() {
            warn!(
                "Ignoring skinning attributes with {} joint indices but {} joint weights",
                joint_indices.len(),
                joint_weights.len()
            );
            return vertex_groups;
        }

        let joint_count = joint_indices
            .iter()
            .flat_map(|joints| joints.iter())
            .map(|joint| *joint as u32 + 1)
            .max()
            .unwrap_or(0);

        for joint in 0..joint_count {
            vertex_groups.add_group(format!("joint_{joint}"));
        }

        for (vertex, (joints, weights)) in joint_indices.iter().zip(joint_weights).enumerate() {
            let handle = VertexHandle::new(vertex as u32);

            for (joint, weight) in joints.iter().zip(weights) {
                if *weight > 0.0 {
                    vertex_groups.set_weight(handle, *joint as u32, *weight);
                }
            }
        }

        if joint_count > 0 {
            vertex_groups.active = Some(0);
        }

        vertex_groups
    }
}
