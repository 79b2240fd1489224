use bevy::{math::Ray3d, prelude::*, window::PrimaryWindow};
use lox::FaceHandle;
use wasm_bindgen::prelude::*;

use crate::utils::projection::ray_cast_to_local;

use super::{
    editable_mesh::{bvh::BoundingVolumeHierarchy, EditableMesh},
    editor_plugin::{Focused, PrimaryCamera},
    tools::ToolSet,
};

pub struct InteractionPlugin;

#[derive(SystemSet, Clone, Copy, Hash, Debug, PartialEq, Eq)]
pub enum InteractionSet {
    /// Refreshes [`CursorRay`]
    CursorRay,
    /// Picks the focused entity from mouse clicks in object mode
    Picking,
}

/// World-space ray under the cursor for the current frame, if the cursor is over the viewport.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq)]
pub struct CursorRay(pub Option<Ray3d>);

#[wasm_bindgen]
#[derive(Resource, Clone, Debug, PartialEq, Eq, Copy)]
pub enum InteractionMode {
    Object,
    WeightPaint,
}

/// A ray hit on a mesh face. `local_point` is in the mesh's local space.
#[derive(Clone, Copy)]
pub struct MeshHit {
    pub face: FaceHandle,
    pub local_point: Vec3,
    /// Distance from the ray origin in world units
    pub distance: f32,
}

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(InteractionMode::Object)
            .init_resource::<CursorRay>()
            .configure_sets(
                Update,
                (
                    InteractionSet::CursorRay.before(InteractionSet::Picking),
                    InteractionSet::CursorRay.before(ToolSet::Update),
                ),
            )
            .add_systems(
                Update,
                (
                    Self::update_cursor_ray.in_set(InteractionSet::CursorRay),
                    Self::object_mode_picking.in_set(InteractionSet::Picking),
                ),
            );
    }
}

/// World-space ray under the cursor of the primary window.
pub fn cursor_ray(
    window: &Window,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) -> Option<Ray3d> {
    let cursor_position = window.cursor_position()?;
    camera.viewport_to_world(camera_transform, cursor_position)
}

/// Casts a world-space ray against a mesh entity and returns the nearest face hit.
pub fn cast_into_mesh(
    ray: Ray3d,
    max: f32,
    transform: &GlobalTransform,
    bvh: &BoundingVolumeHierarchy,
    mesh: &EditableMesh,
) -> Option<MeshHit> {
    let local_ray = ray_cast_to_local(ray, max, transform)?;

    let (face, t) = bvh.intersects_ray_at(&local_ray.cast, mesh)?;

    Some(MeshHit {
        face,
        local_point: local_ray.cast.ray.get_point(t),
        distance: local_ray.world_distance(t),
    })
}

impl InteractionPlugin {
    pub const PICKING_RAY_LENGTH: f32 = 1000.0;

    fn update_cursor_ray(
        mut ray: ResMut<CursorRay>,
        window: Query<&Window, With<PrimaryWindow>>,
        camera: Query<(&Camera, &GlobalTransform), With<PrimaryCamera>>,
    ) {
        let next = match (window.get_single(), camera.get_single()) {
            (Ok(window), Ok((camera, camera_transform))) => {
                cursor_ray(window, camera, camera_transform)
            }
            _ => None,
        };

        ray.set_if_neq(CursorRay(next));
    }

    fn object_mode_picking(
        interaction_mode: Res<InteractionMode>,
        mut commands: Commands,
        query: Query<(&BoundingVolumeHierarchy, &GlobalTransform, Entity, Has<Focused>)>,
        mouse: Res<ButtonInput<MouseButton>>,
        cursor_ray: Res<CursorRay>,
    ) {
        if *interaction_mode != InteractionMode::Object || !mouse.just_pressed(MouseButton::Left) {
            return;
        }

        let Some(ray) = cursor_ray.0 else {
            return;
        };

        // Picking only needs the entity, so the leaf bounds are a good enough approximation
        let (mut closest_distance, mut closest_entity) = (f32::MAX, None);

        for (bvh, transform, entity, _) in query.iter() {
            let Some(local_ray) = ray_cast_to_local(ray, Self::PICKING_RAY_LENGTH, transform)
            else {
                continue;
            };

            if let Some(t) = bvh.intersects_ray_at_fast(&local_ray.cast) {
                let distance = local_ray.world_distance(t);
                if distance < closest_distance {
                    closest_distance = distance;
                    closest_entity = Some(entity);
                }
            }
        }

        let Some(closest_entity) = closest_entity else {
            return;
        };

        for (_, _, entity, focused) in query.iter() {
            if focused && entity != closest_entity {
                commands.entity(entity).remove::<Focused>();
            }
        }

        debug!("Focusing {closest_entity:?}");
        commands.entity(closest_entity).insert(Focused);
    }
}
