use bevy::prelude::*;
use lox::core::Mesh as LoxMesh;

use crate::core::{
    editable_mesh::{bvh::BoundingVolumeHierarchy, vertex_groups::VertexGroups, EditableMesh},
    editor_plugin::Focused,
    interaction::{cast_into_mesh, CursorRay, InteractionMode, InteractionPlugin, MeshHit},
};

/// Brush values shared by every weight paint tool.
///
/// `weight` is the value painted by [`DrawWeight`] and the target of weight sampling.
/// It is not clamped here.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct UnifiedPaintSettings {
    pub weight: f32,
    /// Brush radius in mesh local units
    pub radius: f32,
    pub strength: f32,
}

impl Default for UnifiedPaintSettings {
    fn default() -> Self {
        Self {
            weight: 1.0,
            radius: 0.5,
            strength: 1.0,
        }
    }
}

pub struct BrushContext<'a> {
    pub hit: &'a MeshHit,
    pub settings: &'a UnifiedPaintSettings,
    pub mesh: &'a EditableMesh,
    pub vertex_groups: &'a mut VertexGroups,
}

pub trait Brush {
    /// Applies one dab and returns how many vertices it touched.
    fn brush(&self, context: BrushContext) -> usize;
}

pub struct DrawWeight;

impl Brush for DrawWeight {
    fn brush(&self, context: BrushContext) -> usize {
        let BrushContext {
            hit,
            settings,
            mesh,
            vertex_groups,
        } = context;

        let Some(group) = vertex_groups.active() else {
            return 0;
        };

        if settings.radius <= 0.0 {
            return 0;
        }

        let mut touched = 0;

        for vertex in mesh.structure.vertex_handles() {
            let distance = mesh.vertex_positions[vertex].distance(hit.local_point);
            if distance > settings.radius {
                continue;
            }

            let falloff = (settings.strength * (1.0 - distance / settings.radius)).clamp(0.0, 1.0);
            let current = vertex_groups.weight(vertex, group).unwrap_or(0.0);

            vertex_groups.set_weight(
                vertex,
                group,
                current + (settings.weight - current) * falloff,
            );
            touched += 1;
        }

        touched
    }
}

impl DrawWeight {
    pub fn update_system(
        interaction_mode: Res<InteractionMode>,
        settings: Res<UnifiedPaintSettings>,
        mouse: Res<ButtonInput<MouseButton>>,
        cursor_ray: Res<CursorRay>,
        mut focused_mesh: Query<
            (
                &EditableMesh,
                &mut VertexGroups,
                &BoundingVolumeHierarchy,
                &GlobalTransform,
            ),
            With<Focused>,
        >,
    ) {
        if *interaction_mode != InteractionMode::WeightPaint || !mouse.pressed(MouseButton::Left)
        {
            return;
        }

        let Some(ray) = cursor_ray.0 else {
            return;
        };

        let Ok((mesh, mut vertex_groups, bvh, transform)) = focused_mesh.get_single_mut() else {
            return;
        };

        let Some(hit) = cast_into_mesh(
            ray,
            InteractionPlugin::PICKING_RAY_LENGTH,
            transform,
            bvh,
            mesh,
        ) else {
            return;
        };

        let touched = DrawWeight.brush(BrushContext {
            hit: &hit,
            settings: &settings,
            mesh,
            vertex_groups: &mut vertex_groups,
        });

        debug!("Draw weight touched {touched} vertices");
    }
}
