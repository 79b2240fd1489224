use bevy::{prelude::*, window::RequestRedraw, winit::EventLoopProxy};
use events::EventPlugin;
use wasm_bindgen::prelude::*;
use world::{set_world, world, world_mut};

use crate::core::{
    editable_mesh::{vertex_groups::VertexGroups, EditableMeshBundle},
    editor_plugin::{ActiveTool, EditorPlugin, Focused, Tools, ViewportMaterial},
    interaction::InteractionMode,
    tools::{brush::UnifiedPaintSettings, sample_weight::SampleWeightRequest},
};

use transport::ToolType;

pub mod events;
pub mod transport;
mod world;

#[wasm_bindgen]
pub fn trigger_update() {
    let Some(world) = world() else {
        return;
    };
    wakeup_world(&world);
}

#[inline]
pub fn wakeup_world(world: &World) {
    let Some(event_loop_proxy) = world.get_non_send_resource::<EventLoopProxy>() else {
        return;
    };

    if event_loop_proxy.send_event(RequestRedraw).is_err() {
        warn!("Event loop is gone, could not request a redraw");
    }
}

#[wasm_bindgen]
pub fn init_app_with_canvas_selector(canvas_selector: String, width: f32, height: f32) {
    App::new()
        .add_systems(PreStartup, set_world)
        .add_plugins((
            EditorPlugin {
                main_window_canvas_selector: canvas_selector,
                width,
                height,
            },
            EventPlugin,
        ))
        .run();
}

/// Spawns a cube and returns its entity index.
#[wasm_bindgen]
pub fn spawn_cube(option: transport::CubeOptions) -> Option<u32> {
    let mut world = world_mut()?;

    let mesh = Cuboid::from_size(Vec3::splat(option.size)).mesh();

    let material = world.get_resource::<ViewportMaterial>()?.0.clone();

    let mut meshes = world.get_resource_mut::<Assets<Mesh>>()?;

    let bundle = match EditableMeshBundle::from_mesh(mesh, &mut meshes) {
        Ok(bundle) => bundle,
        Err(error) => {
            warn!("Could not spawn cube: {error}");
            return None;
        }
    };

    let entity = world
        .spawn((
            EditableMeshBundle { material, ..bundle },
            Name::from("Cube"),
        ))
        .id();

    wakeup_world(&world);

    Some(entity.index())
}

#[wasm_bindgen]
pub fn focus_entity(entity_index: u32) {
    let Some(mut world) = world_mut() else {
        return;
    };

    let entity = Entity::from_raw(entity_index);
    if world.get_entity(entity).is_none() {
        return;
    }

    let mut query = world.query_filtered::<Entity, With<Focused>>();
    let focused: Vec<Entity> = query.iter(&world).collect();

    for focused_entity in focused {
        if let Some(mut entity_ref) = world.get_entity_mut(focused_entity) {
            entity_ref.remove::<Focused>();
        }
    }

    if let Some(mut entity_ref) = world.get_entity_mut(entity) {
        entity_ref.insert(Focused);
    }

    wakeup_world(&world);
}

#[wasm_bindgen]
pub fn set_interaction_mode(mode: InteractionMode) {
    let Some(mut world) = world_mut() else {
        return;
    };

    // Weight paint works on the focused entity
    if mode != InteractionMode::Object {
        let mut focused_entity = world.query_filtered::<(), With<Focused>>();
        if focused_entity.get_single(&world).is_err() {
            warn!("{mode:?} mode needs exactly one focused entity");
            return;
        }
    }

    let Some(mut interaction_mode) = world.get_resource_mut::<InteractionMode>() else {
        return;
    };
    *interaction_mode = mode;

    wakeup_world(&world);
}

#[wasm_bindgen]
pub fn get_interaction_mode() -> InteractionMode {
    world()
        .and_then(|world| world.get_resource::<InteractionMode>().copied())
        .unwrap_or(InteractionMode::Object)
}

#[wasm_bindgen]
pub fn set_active_tool(tool_type: ToolType) {
    let Some(mut world) = world_mut() else {
        return;
    };

    let Some(tool) = world
        .get_resource::<Tools>()
        .and_then(|tools| tools.map.get(&tool_type).cloned())
    else {
        return;
    };

    let new_active_tool_startup = tool.startup_system;

    let Some(mut active_tool) = world.get_resource_mut::<ActiveTool>() else {
        return;
    };

    let last_active_tool_cleanup = active_tool
        .0
        .as_ref()
        .and_then(|active_tool| active_tool.cleanup_system);

    active_tool.0 = Some(tool);

    for system in [last_active_tool_cleanup, new_active_tool_startup]
        .into_iter()
        .flatten()
    {
        if let Err(error) = world.run_system(system) {
            warn!("Tool system failed to run: {error:?}");
        }
    }

    info!("Active tool is now {tool_type:?}");

    wakeup_world(&world);
}

#[wasm_bindgen]
pub fn unset_active_tool() {
    let Some(mut world) = world_mut() else {
        return;
    };

    let Some(mut active_tool) = world.get_resource_mut::<ActiveTool>() else {
        return;
    };

    let last_active_tool_cleanup = active_tool
        .0
        .take()
        .and_then(|active_tool| active_tool.cleanup_system);

    if let Some(cleanup_system) = last_active_tool_cleanup {
        if let Err(error) = world.run_system(cleanup_system) {
            warn!("Tool cleanup failed to run: {error:?}");
        }
    }

    wakeup_world(&world);
}

/// Menu entry for "Sample Weight Interpolated". Waits for a click in the viewport.
#[wasm_bindgen]
pub fn invoke_sample_weight_interpolated() {
    let Some(mut world) = world_mut() else {
        return;
    };

    world.send_event(SampleWeightRequest { from_tool: false });

    wakeup_world(&world);
}

#[wasm_bindgen]
pub fn get_brush_weight() -> f32 {
    world()
        .and_then(|world| {
            world
                .get_resource::<UnifiedPaintSettings>()
                .map(|settings| settings.weight)
        })
        .unwrap_or_else(|| UnifiedPaintSettings::default().weight)
}

#[wasm_bindgen]
pub fn set_brush_weight(weight: f32) {
    let Some(mut world) = world_mut() else {
        return;
    };

    let Some(mut settings) = world.get_resource_mut::<UnifiedPaintSettings>() else {
        return;
    };
    settings.weight = weight;

    wakeup_world(&world);
}

/// Adds a group to the focused entity and makes it active. Returns the group index.
#[wasm_bindgen]
pub fn add_vertex_group(name: String) -> Option<u32> {
    let mut world = world_mut()?;

    let mut query = world.query_filtered::<&mut VertexGroups, With<Focused>>();
    let mut vertex_groups = query.get_single_mut(&mut world).ok()?;

    let index = vertex_groups.add_group(name);

    wakeup_world(&world);

    Some(index)
}

#[wasm_bindgen]
pub fn set_active_vertex_group(index: u32) -> bool {
    let Some(mut world) = world_mut() else {
        return false;
    };

    let mut query = world.query_filtered::<&mut VertexGroups, With<Focused>>();
    let Ok(mut vertex_groups) = query.get_single_mut(&mut world) else {
        return false;
    };

    vertex_groups.set_active(index)
}
