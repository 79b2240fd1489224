pub mod bvh;
pub mod vertex_groups;

use bevy::{
    asset::Handle,
    log::warn,
    math::Vec3,
    prelude::*,
    render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues},
};
use bvh::BoundingVolumeHierarchy;
use lox::{
    core::{half_edge::PolyConfig, HalfEdgeMesh, Mesh as LoxMesh, MeshMut},
    leer::Empty,
    map::{DenseMap, PropStoreMut},
    FaceHandle, VertexHandle,
};
use thiserror::Error;
use vertex_groups::VertexGroups;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshConversionError {
    #[error("only triangle list topologies are supported, got {0:?}")]
    UnsupportedTopology(PrimitiveTopology),
    #[error("mesh has no position attribute")]
    MissingPositions,
    #[error("positions must be Float32x3")]
    UnsupportedPositionFormat,
    #[error("face {face} has {count} vertices, at least 3 are needed")]
    FaceTooSmall { face: usize, count: usize },
    #[error("face {face} references vertex {vertex}, but there are only {vertex_count}")]
    VertexOutOfRange {
        face: usize,
        vertex: u32,
        vertex_count: usize,
    },
}

#[derive(Bundle, Default)]
pub struct EditableMeshBundle {
    pub mesh: Handle<Mesh>,
    pub editable_mesh: EditableMesh,
    pub vertex_groups: VertexGroups,
    pub material: Handle<StandardMaterial>,
    pub visibility: Visibility,
    pub inherited_visibility: InheritedVisibility,
    pub view_visibility: ViewVisibility,
    pub transform: Transform,
    pub global_transform: GlobalTransform,
    pub bvh: BoundingVolumeHierarchy,
}

/// Polygon mesh in local space, backed by a half-edge structure.
#[derive(Component)]
pub struct EditableMesh {
    pub structure: HalfEdgeMesh<PolyConfig>,
    pub vertex_positions: DenseMap<VertexHandle, Vec3>,
}

impl Default for EditableMesh {
    fn default() -> Self {
        Self {
            structure: HalfEdgeMesh::empty(),
            vertex_positions: DenseMap::new(),
        }
    }
}

impl EditableMeshBundle {
    /// Converts `raw_mesh`, builds its BVH and picks up skinning weights as vertex groups.
    pub fn from_mesh(
        raw_mesh: Mesh,
        meshes: &mut Assets<Mesh>,
    ) -> Result<Self, MeshConversionError> {
        let editable_mesh = EditableMesh::try_from(&raw_mesh)?;
        let vertex_groups = VertexGroups::from_skinning_attributes(&raw_mesh);
        let bvh = BoundingVolumeHierarchy::from(&editable_mesh);
        let mesh = meshes.add(raw_mesh);

        Ok(Self {
            editable_mesh,
            vertex_groups,
            bvh,
            mesh,
            ..default()
        })
    }
}

impl EditableMesh {
    /// Builds a mesh from indexed polygons. Faces may have any number of corners.
    pub fn from_polygons<I, F>(positions: &[Vec3], faces: I) -> Result<Self, MeshConversionError>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u32]>,
    {
        let mut editable_mesh = EditableMesh::default();

        let vertices: Vec<VertexHandle> = positions
            .iter()
            .map(|position| editable_mesh.add_vertex(*position))
            .collect();

        for (face, indices) in faces.into_iter().enumerate() {
            let indices = indices.as_ref();

            if indices.len() < 3 {
                return Err(MeshConversionError::FaceTooSmall {
                    face,
                    count: indices.len(),
                });
            }

            let handles = indices
                .iter()
                .map(|index| {
                    vertices.get(*index as usize).copied().ok_or(
                        MeshConversionError::VertexOutOfRange {
                            face,
                            vertex: *index,
                            vertex_count: vertices.len(),
                        },
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;

            editable_mesh.structure.add_face(&handles);
        }

        Ok(editable_mesh)
    }

    fn add_vertex(&mut self, position: Vec3) -> VertexHandle {
        let vertex = self.structure.add_vertex();
        self.vertex_positions.insert(vertex, position);
        vertex
    }

    /// Corners of `face` in winding order, with their local positions.
    pub fn face_corners(&self, face: FaceHandle) -> (Vec<VertexHandle>, Vec<Vec3>) {
        self.structure
            .get_ref(face)
            .adjacent_vertices()
            .map(|vertex| {
                let handle = vertex.handle();
                (handle, self.vertex_positions[handle])
            })
            .unzip()
    }
}

impl TryFrom<&Mesh> for EditableMesh {
    type Error = MeshConversionError;

    fn try_from(mesh: &Mesh) -> Result<Self, Self::Error> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            return Err(MeshConversionError::UnsupportedTopology(
                mesh.primitive_topology(),
            ));
        }

        let position_attribute = match mesh.attribute(Mesh::ATTRIBUTE_POSITION) {
            Some(VertexAttributeValues::Float32x3(positions)) => positions,
            Some(_) => return Err(MeshConversionError::UnsupportedPositionFormat),
            None => return Err(MeshConversionError::MissingPositions),
        };

        let mut editable_mesh = EditableMesh::default();

        let vertices: Vec<VertexHandle> = position_attribute
            .iter()
            .map(|position| editable_mesh.add_vertex(Vec3::from_array(*position)))
            .collect();

        let triangles: Vec<[usize; 3]> = match mesh.indices() {
            None => (0..vertices.len() / 3)
                .map(|triangle| [triangle * 3, triangle * 3 + 1, triangle * 3 + 2])
                .collect(),
            Some(Indices::U16(indices)) => indices
                .chunks_exact(3)
                .map(|chunk| [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize])
                .collect(),
            Some(Indices::U32(indices)) => indices
                .chunks_exact(3)
                .map(|chunk| [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize])
                .collect(),
        };

        for (face, triangle) in triangles.into_iter().enumerate() {
            if let Some(vertex) = triangle.iter().find(|vertex| **vertex >= vertices.len()) {
                return Err(MeshConversionError::VertexOutOfRange {
                    face,
                    vertex: *vertex as u32,
                    vertex_count: vertices.len(),
                });
            }

            let [a, b, c] = triangle;
            if a == b || b == c || a == c {
                warn!("Skipping triangle {face} with repeated vertex {triangle:?}");
                continue;
            }

            editable_mesh
                .structure
                .add_face(&[vertices[a], vertices[b], vertices[c]]);
        }

        Ok(editable_mesh)
    }
}
