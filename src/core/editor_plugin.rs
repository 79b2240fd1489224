use bevy::{
    ecs::system::SystemId, prelude::*, utils::HashMap, window::WindowResolution,
    winit::WinitSettings,
};

use crate::binding::transport::ToolType;

use super::{
    editable_mesh::{vertex_groups::VertexGroups, EditableMeshBundle},
    interaction::InteractionPlugin,
    tools::{
        self,
        sample_weight::{SampleWeightPlugin, SampleWeightTool},
        ToolSet,
    },
};

pub struct EditorPlugin {
    pub main_window_canvas_selector: String,
    pub width: f32,
    pub height: f32,
}

#[derive(Component)]
pub struct PrimaryCamera;

#[derive(Clone)]
pub struct Tool {
    pub startup_system: Option<SystemId>,
    pub update_system: Option<SystemId>,
    pub cleanup_system: Option<SystemId>,
}

#[derive(Resource, Default)]
pub struct Tools {
    pub map: HashMap<ToolType, Tool>,
}

#[derive(Resource, Default)]
pub struct ActiveTool(pub Option<Tool>);

#[derive(Component)]
pub struct Focused;

/// Material shared by every mesh spawned from the host.
#[derive(Resource)]
pub struct ViewportMaterial(pub Handle<StandardMaterial>);

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    resolution: WindowResolution::new(self.width, self.height),
                    transparent: true,
                    canvas: Some(self.main_window_canvas_selector.clone()),
                    ..default()
                }),
                ..default()
            }),
            InteractionPlugin,
            SampleWeightPlugin,
        ))
        .insert_resource(WinitSettings::game())
        .insert_resource(ActiveTool::default())
        .insert_resource(Tools::default())
        .insert_resource(ClearColor(Color::NONE))
        .add_systems(Startup, Self::populate_scene)
        .add_systems(Update, Self::run_tool.in_set(ToolSet::Update));

        Self::register_tools(&mut app.world);
    }
}

impl EditorPlugin {
    fn run_tool(active_tool: Res<ActiveTool>, mut commands: Commands) {
        let Some(tool) = &active_tool.0 else {
            return;
        };
        let Some(update_system) = tool.update_system else {
            return;
        };
        commands.run_system(update_system);
    }

    fn register_tools(world: &mut World) {
        // Weight paint tools
        let draw_weight_update = world.register_system(tools::brush::DrawWeight::update_system);

        let sample_weight_update = world.register_system(SampleWeightTool::update_system);
        let sample_weight_cleanup = world.register_system(SampleWeightTool::cleanup_system);

        let mut tool_registry = world.resource_mut::<Tools>();

        tool_registry.map.insert(
            ToolType::DrawWeight,
            Tool {
                startup_system: None,
                update_system: Some(draw_weight_update),
                cleanup_system: None,
            },
        );

        tool_registry.map.insert(
            ToolType::SampleWeightInterpolated,
            Tool {
                startup_system: None,
                update_system: Some(sample_weight_update),
                cleanup_system: Some(sample_weight_cleanup),
            },
        );
    }

    fn populate_scene(
        mut ambient_light: ResMut<AmbientLight>,
        mut commands: Commands,
        mut meshes: ResMut<Assets<Mesh>>,
        mut materials: ResMut<Assets<StandardMaterial>>,
    ) {
        ambient_light.brightness = 250.0;

        let material = materials.add(StandardMaterial {
            cull_mode: None,
            double_sided: true,
            base_color: Color::rgb_linear(0.35, 0.35, 0.35),
            ..default()
        });
        commands.insert_resource(ViewportMaterial(material.clone()));

        commands.spawn((
            Camera3dBundle {
                transform: Transform::from_xyz(4.0, 3.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
                ..default()
            },
            PrimaryCamera,
        ));

        commands.spawn(DirectionalLightBundle {
            directional_light: DirectionalLight {
                illuminance: light_consts::lux::OVERCAST_DAY * 2.,
                ..default()
            },
            transform: Transform::from_xyz(4.0, 3.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
            ..default()
        });

        let cube = Cuboid::new(2.0, 2.0, 2.0).mesh();

        let bundle = match EditableMeshBundle::from_mesh(cube, &mut meshes) {
            Ok(bundle) => bundle,
            Err(error) => {
                warn!("Could not build the starting cube: {error}");
                return;
            }
        };

        let vertex_groups = gradient_group(&bundle, "Group");

        commands.spawn((
            EditableMeshBundle {
                material,
                vertex_groups,
                ..bundle
            },
            Name::from("Cube"),
            Focused,
        ));
    }
}

/// A vertex group whose weight rises from 0 to 1 along the mesh's x extent.
fn gradient_group(bundle: &EditableMeshBundle, name: &str) -> VertexGroups {
    use lox::core::Mesh as LoxMesh;

    let mesh = &bundle.editable_mesh;
    let mut vertex_groups = bundle.vertex_groups.clone();
    let group = vertex_groups.add_group(name);

    let (min_x, max_x) = mesh
        .structure
        .vertex_handles()
        .map(|vertex| mesh.vertex_positions[vertex].x)
        .fold((f32::MAX, f32::MIN), |(min, max), x| (min.min(x), max.max(x)));

    let width = max_x - min_x;
    if width <= 0.0 {
        return vertex_groups;
    }

    for vertex in mesh.structure.vertex_handles() {
        let x = mesh.vertex_positions[vertex].x;
        vertex_groups.set_weight(vertex, group, (x - min_x) / width);
    }

    vertex_groups
}
