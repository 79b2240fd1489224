//! The "Sample Weight Interpolated" operator.
//!
//! Reads the active vertex group under the cursor, interpolated across the hit face,
//! and stores the result as the brush weight. It can run directly from the tool, or
//! modally from the keymap or the menu, in which case it waits for a click.

use bevy::{math::Ray3d, prelude::*};

use crate::core::{
    editable_mesh::{bvh::BoundingVolumeHierarchy, vertex_groups::VertexGroups, EditableMesh},
    editor_plugin::Focused,
    interaction::{cast_into_mesh, CursorRay, InteractionMode, InteractionSet},
    weight_sample::{sample_face, InvalidFaceError},
};

use super::{brush::UnifiedPaintSettings, ToolSet};

pub const HEADER_TEXT: &str = "Input pending Sample Weight Interpolated";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OperatorState {
    #[default]
    Idle,
    AwaitingClick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorButton {
    Primary,
    Secondary,
    Escape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorEvent {
    Invoke { from_tool: bool },
    Press(OperatorButton),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorStatus {
    RunningModal,
    Finished,
    Cancelled,
    PassThrough,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorAction {
    None,
    Sample,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub status: OperatorStatus,
    pub action: OperatorAction,
}

impl Step {
    const fn new(status: OperatorStatus, action: OperatorAction) -> Self {
        Self { status, action }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OperatorContext {
    pub mode: InteractionMode,
    pub has_mesh: bool,
}

#[derive(Resource, Default, Debug)]
pub struct SampleWeightOperator {
    state: OperatorState,
}

impl SampleWeightOperator {
    pub fn state(&self) -> OperatorState {
        self.state
    }

    pub fn handle(&mut self, event: OperatorEvent, context: &OperatorContext) -> Step {
        use OperatorAction as A;
        use OperatorStatus as S;

        match (self.state, event) {
            (OperatorState::Idle, OperatorEvent::Invoke { from_tool }) => {
                if context.mode != InteractionMode::WeightPaint || !context.has_mesh {
                    return Step::new(S::Cancelled, A::None);
                }

                if from_tool {
                    Step::new(S::Finished, A::Sample)
                } else {
                    self.state = OperatorState::AwaitingClick;
                    Step::new(S::RunningModal, A::None)
                }
            }
            (OperatorState::Idle, OperatorEvent::Press(_)) => Step::new(S::PassThrough, A::None),
            (OperatorState::AwaitingClick, OperatorEvent::Invoke { .. }) => {
                Step::new(S::RunningModal, A::None)
            }
            (OperatorState::AwaitingClick, OperatorEvent::Press(OperatorButton::Primary)) => {
                self.state = OperatorState::Idle;
                Step::new(S::Finished, A::Sample)
            }
            (
                OperatorState::AwaitingClick,
                OperatorEvent::Press(OperatorButton::Secondary | OperatorButton::Escape),
            ) => {
                self.state = OperatorState::Idle;
                Step::new(S::Cancelled, A::None)
            }
        }
    }

    pub fn header_text(&self) -> Option<&'static str> {
        match self.state {
            OperatorState::AwaitingClick => Some(HEADER_TEXT),
            OperatorState::Idle => None,
        }
    }

    /// Drops a pending modal run. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        std::mem::take(&mut self.state) == OperatorState::AwaitingClick
    }
}

/// Asks the operator to run. Tools run it directly, the keymap and menu run it modally.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleWeightRequest {
    pub from_tool: bool,
}

/// A key with an exact set of modifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyChord {
    pub key: KeyCode,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn just_pressed(&self, keys: &ButtonInput<KeyCode>) -> bool {
        keys.just_pressed(self.key)
            && keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) == self.shift
            && keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) == self.ctrl
            && keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]) == self.alt
    }
}

#[derive(Resource, Clone, Debug)]
pub struct SampleWeightSettings {
    /// Maximum distance in world units from the camera to a sampled face
    pub ray_length: f32,
    pub keymap: KeyChord,
}

impl Default for SampleWeightSettings {
    fn default() -> Self {
        Self {
            ray_length: 1000.0,
            keymap: KeyChord {
                key: KeyCode::KeyX,
                shift: true,
                ctrl: false,
                alt: true,
            },
        }
    }
}

/// Status line shown by the host while a modal operator waits for input.
#[derive(Resource, Default, Clone, Debug, PartialEq, Eq)]
pub struct HeaderText(pub Option<String>);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleOutcome {
    Sampled(f32),
    NoCursor,
    NoFocusedMesh,
    NoHit,
    NoActiveGroup,
    Invalid(InvalidFaceError),
}

/// Casts `ray` into a mesh entity and samples its active vertex group at the hit.
pub fn sample_along_ray(
    ray: Ray3d,
    max: f32,
    transform: &GlobalTransform,
    bvh: &BoundingVolumeHierarchy,
    mesh: &EditableMesh,
    vertex_groups: &VertexGroups,
) -> SampleOutcome {
    if vertex_groups.active().is_none() {
        return SampleOutcome::NoActiveGroup;
    }

    let Some(hit) = cast_into_mesh(ray, max, transform, bvh, mesh) else {
        return SampleOutcome::NoHit;
    };

    match sample_face(mesh, vertex_groups, hit.face, hit.local_point) {
        Ok(Some(weight)) => SampleOutcome::Sampled(weight),
        Ok(None) => SampleOutcome::NoActiveGroup,
        Err(error) => SampleOutcome::Invalid(error),
    }
}

type FocusedMesh<'a> = (
    &'a EditableMesh,
    &'a VertexGroups,
    &'a BoundingVolumeHierarchy,
    &'a GlobalTransform,
);

pub struct SampleWeightPlugin;

impl Plugin for SampleWeightPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SampleWeightOperator>()
            .init_resource::<SampleWeightSettings>()
            .init_resource::<UnifiedPaintSettings>()
            .init_resource::<HeaderText>()
            .add_event::<SampleWeightRequest>()
            .add_systems(
                Update,
                (Self::keymap_system, Self::operator_system)
                    .chain()
                    .after(InteractionSet::CursorRay)
                    .before(ToolSet::Update),
            );
    }
}

impl SampleWeightPlugin {
    pub fn keymap_system(
        interaction_mode: Res<InteractionMode>,
        keys: Res<ButtonInput<KeyCode>>,
        settings: Res<SampleWeightSettings>,
        mut requests: EventWriter<SampleWeightRequest>,
    ) {
        if *interaction_mode == InteractionMode::WeightPaint && settings.keymap.just_pressed(&keys)
        {
            requests.send(SampleWeightRequest { from_tool: false });
        }
    }

    /// Runs before the active tool, so a click that ends a modal run is consumed here and
    /// never reaches the tool.
    pub fn operator_system(
        mut operator: ResMut<SampleWeightOperator>,
        mut requests: EventReader<SampleWeightRequest>,
        mut mouse: ResMut<ButtonInput<MouseButton>>,
        mut keys: ResMut<ButtonInput<KeyCode>>,
        interaction_mode: Res<InteractionMode>,
        settings: Res<SampleWeightSettings>,
        cursor_ray: Res<CursorRay>,
        mut paint_settings: ResMut<UnifiedPaintSettings>,
        mut header_text: ResMut<HeaderText>,
        focused_mesh: Query<FocusedMesh, With<Focused>>,
    ) {
        if *interaction_mode != InteractionMode::WeightPaint && operator.cancel() {
            debug!("Sample weight cancelled, left weight paint mode");
        }

        let context = OperatorContext {
            mode: *interaction_mode,
            has_mesh: focused_mesh.get_single().is_ok(),
        };

        let presses = [
            (mouse.just_pressed(MouseButton::Left), OperatorButton::Primary),
            (mouse.just_pressed(MouseButton::Right), OperatorButton::Secondary),
            (keys.just_pressed(KeyCode::Escape), OperatorButton::Escape),
        ]
        .into_iter()
        .filter_map(|(pressed, button)| pressed.then_some(OperatorEvent::Press(button)));

        let events: Vec<OperatorEvent> = requests
            .read()
            .map(|request| OperatorEvent::Invoke {
                from_tool: request.from_tool,
            })
            .chain(presses)
            .collect();

        for event in events {
            let step = operator.handle(event, &context);

            if step.status == OperatorStatus::PassThrough {
                continue;
            }

            debug!("Sample weight {event:?} -> {:?}", step.status);

            if let OperatorEvent::Press(button) = event {
                match button {
                    OperatorButton::Primary => mouse.reset(MouseButton::Left),
                    OperatorButton::Secondary => mouse.reset(MouseButton::Right),
                    OperatorButton::Escape => keys.reset(KeyCode::Escape),
                }
            }

            if step.action != OperatorAction::Sample {
                continue;
            }

            let outcome = match (cursor_ray.0, focused_mesh.get_single()) {
                (_, Err(_)) => SampleOutcome::NoFocusedMesh,
                (None, Ok(_)) => SampleOutcome::NoCursor,
                (Some(ray), Ok((mesh, vertex_groups, bvh, transform))) => sample_along_ray(
                    ray,
                    settings.ray_length,
                    transform,
                    bvh,
                    mesh,
                    vertex_groups,
                ),
            };

            match outcome {
                SampleOutcome::Sampled(weight) => {
                    paint_settings.weight = weight;
                    info!("Sampled weight {weight:.3}");
                }
                SampleOutcome::Invalid(error) => warn!("Could not sample weight: {error}"),
                other => debug!("Nothing to sample: {other:?}"),
            }
        }

        header_text.set_if_neq(HeaderText(operator.header_text().map(String::from)));
    }
}

/// Tool wrapper: every click samples immediately.
pub struct SampleWeightTool;

impl SampleWeightTool {
    pub fn update_system(
        mouse: Res<ButtonInput<MouseButton>>,
        mut requests: EventWriter<SampleWeightRequest>,
    ) {
        if mouse.just_pressed(MouseButton::Left) {
            requests.send(SampleWeightRequest { from_tool: true });
        }
    }

    pub fn cleanup_system(mut operator: ResMut<SampleWeightOperator>) {
        operator.cancel();
    }
}

#[cfg(test)]
mod test {
    use bevy::{
        ecs::system::RunSystemOnce,
        math::{primitives::Direction3d, Ray3d},
        prelude::*,
    };
    use lox::{Handle as LoxHandle, VertexHandle};

    use crate::core::{
        editable_mesh::{bvh::BoundingVolumeHierarchy, vertex_groups::VertexGroups, EditableMesh},
        editor_plugin::Focused,
        interaction::{CursorRay, InteractionMode},
        tools::{
            brush::{DrawWeight, UnifiedPaintSettings},
            ToolSet,
        },
    };

    use super::{
        sample_along_ray, HeaderText, OperatorAction, OperatorButton, OperatorContext,
        OperatorEvent, OperatorState, OperatorStatus, SampleOutcome, SampleWeightOperator,
        SampleWeightPlugin, SampleWeightRequest, SampleWeightSettings, HEADER_TEXT,
    };

    const PAINTING: OperatorContext = OperatorContext {
        mode: InteractionMode::WeightPaint,
        has_mesh: true,
    };

    #[test]
    fn test_invoke_from_tool_samples_immediately() {
        let mut operator = SampleWeightOperator::default();

        let step = operator.handle(OperatorEvent::Invoke { from_tool: true }, &PAINTING);

        assert_eq!(step.status, OperatorStatus::Finished);
        assert_eq!(step.action, OperatorAction::Sample);
        assert_eq!(operator.state(), OperatorState::Idle);
        assert_eq!(operator.header_text(), None);
    }

    #[test]
    fn test_modal_invoke_waits_for_primary_click() {
        let mut operator = SampleWeightOperator::default();

        let step = operator.handle(OperatorEvent::Invoke { from_tool: false }, &PAINTING);
        assert_eq!(step.status, OperatorStatus::RunningModal);
        assert_eq!(step.action, OperatorAction::None);
        assert_eq!(operator.header_text(), Some(HEADER_TEXT));

        // a second invoke while waiting is ignored
        let step = operator.handle(OperatorEvent::Invoke { from_tool: true }, &PAINTING);
        assert_eq!(step.status, OperatorStatus::RunningModal);
        assert_eq!(step.action, OperatorAction::None);
        assert_eq!(operator.state(), OperatorState::AwaitingClick);

        let step = operator.handle(OperatorEvent::Press(OperatorButton::Primary), &PAINTING);
        assert_eq!(step.status, OperatorStatus::Finished);
        assert_eq!(step.action, OperatorAction::Sample);
        assert_eq!(operator.state(), OperatorState::Idle);
        assert_eq!(operator.header_text(), None);
    }

    #[test]
    fn test_modal_run_cancels_without_sampling() {
        for button in [OperatorButton::Secondary, OperatorButton::Escape] {
            let mut operator = SampleWeightOperator::default();
            operator.handle(OperatorEvent::Invoke { from_tool: false }, &PAINTING);

            let step = operator.handle(OperatorEvent::Press(button), &PAINTING);

            assert_eq!(step.status, OperatorStatus::Cancelled);
            assert_eq!(step.action, OperatorAction::None);
            assert_eq!(operator.state(), OperatorState::Idle);
        }
    }

    #[test]
    fn test_invoke_outside_weight_paint_is_cancelled() {
        let mut operator = SampleWeightOperator::default();

        for context in [
            OperatorContext {
                mode: InteractionMode::Object,
                has_mesh: true,
            },
            OperatorContext {
                mode: InteractionMode::WeightPaint,
                has_mesh: false,
            },
        ] {
            for from_tool in [true, false] {
                let step = operator.handle(OperatorEvent::Invoke { from_tool }, &context);
                assert_eq!(step.status, OperatorStatus::Cancelled);
                assert_eq!(operator.state(), OperatorState::Idle);
            }
        }
    }

    #[test]
    fn test_idle_presses_pass_through() {
        let mut operator = SampleWeightOperator::default();

        let step = operator.handle(OperatorEvent::Press(OperatorButton::Primary), &PAINTING);

        assert_eq!(step.status, OperatorStatus::PassThrough);
        assert_eq!(step.action, OperatorAction::None);
        assert!(!operator.cancel());
    }

    fn weighted_square() -> (EditableMesh, VertexGroups, BoundingVolumeHierarchy) {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mesh = EditableMesh::from_polygons(&positions, [[0u32, 1, 2], [0, 2, 3]]).unwrap();
        let bvh = BoundingVolumeHierarchy::from(&mesh);

        let mut vertex_groups = VertexGroups::new();
        let group = vertex_groups.add_group("Group");
        // weight follows x
        vertex_groups.set_weight(VertexHandle::new(1), group, 1.0);
        vertex_groups.set_weight(VertexHandle::new(2), group, 1.0);

        (mesh, vertex_groups, bvh)
    }

    #[test]
    fn test_sample_along_ray_through_transformed_mesh() {
        let (mesh, vertex_groups, bvh) = weighted_square();

        let transform = GlobalTransform::from(
            Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)),
        );

        // world x = 10.5 is local x = 0.25
        let ray = Ray3d {
            origin: Vec3::new(10.5, 1.0, 3.0),
            direction: Direction3d::new(Vec3::NEG_Z).unwrap(),
        };

        let SampleOutcome::Sampled(weight) =
            sample_along_ray(ray, 100.0, &transform, &bvh, &mesh, &vertex_groups)
        else {
            panic!("expected a sampled weight");
        };
        assert!((weight - 0.25).abs() < 1e-5);

        let short = sample_along_ray(ray, 1.0, &transform, &bvh, &mesh, &vertex_groups);
        assert_eq!(short, SampleOutcome::NoHit);

        let mut inactive = vertex_groups.clone();
        inactive.clear_active();
        let outcome = sample_along_ray(ray, 100.0, &transform, &bvh, &mesh, &inactive);
        assert_eq!(outcome, SampleOutcome::NoActiveGroup);
    }

    fn operator_world(mode: InteractionMode) -> World {
        let mut world = World::new();
        world.insert_resource(mode);
        world.init_resource::<ButtonInput<KeyCode>>();
        world.init_resource::<ButtonInput<MouseButton>>();
        world.init_resource::<SampleWeightSettings>();
        world.init_resource::<SampleWeightOperator>();
        world.init_resource::<UnifiedPaintSettings>();
        world.init_resource::<HeaderText>();
        world.init_resource::<Events<SampleWeightRequest>>();
        world.init_resource::<CursorRay>();
        world
    }

    fn ray_down_at(x: f32, y: f32) -> CursorRay {
        CursorRay(Some(Ray3d {
            origin: Vec3::new(x, y, 1.0),
            direction: Direction3d::new(Vec3::NEG_Z).unwrap(),
        }))
    }

    #[test]
    fn test_keymap_only_fires_in_weight_paint() {
        for (mode, expected) in [(InteractionMode::WeightPaint, 1), (InteractionMode::Object, 0)] {
            let mut world = operator_world(mode);

            {
                let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
                keys.press(KeyCode::ShiftLeft);
                keys.press(KeyCode::AltLeft);
                keys.press(KeyCode::KeyX);
            }

            world.run_system_once(SampleWeightPlugin::keymap_system);

            assert_eq!(world.resource::<Events<SampleWeightRequest>>().len(), expected);
        }
    }

    #[test]
    fn test_keymap_requires_exact_modifiers() {
        let mut world = operator_world(InteractionMode::WeightPaint);

        {
            let mut keys = world.resource_mut::<ButtonInput<KeyCode>>();
            keys.press(KeyCode::ShiftLeft);
            keys.press(KeyCode::AltLeft);
            keys.press(KeyCode::ControlLeft);
            keys.press(KeyCode::KeyX);
        }

        world.run_system_once(SampleWeightPlugin::keymap_system);

        assert_eq!(world.resource::<Events<SampleWeightRequest>>().len(), 0);
    }

    #[test]
    fn test_operator_system_mirrors_header_and_cancels() {
        let mut world = operator_world(InteractionMode::WeightPaint);

        let (mesh, vertex_groups, bvh) = weighted_square();
        world.spawn((mesh, vertex_groups, bvh, GlobalTransform::IDENTITY, Focused));

        world.send_event(SampleWeightRequest { from_tool: false });
        world.run_system_once(SampleWeightPlugin::operator_system);

        assert_eq!(
            world.resource::<SampleWeightOperator>().state(),
            OperatorState::AwaitingClick
        );
        assert_eq!(
            world.resource::<HeaderText>().0.as_deref(),
            Some(HEADER_TEXT)
        );

        world.resource_mut::<Events<SampleWeightRequest>>().clear();
        world
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        world.run_system_once(SampleWeightPlugin::operator_system);

        assert_eq!(
            world.resource::<SampleWeightOperator>().state(),
            OperatorState::Idle
        );
        assert_eq!(world.resource::<HeaderText>().0, None);
        assert_eq!(world.resource::<UnifiedPaintSettings>().weight, 1.0);
    }

    #[test]
    fn test_sampling_without_cursor_keeps_brush_weight() {
        let mut world = operator_world(InteractionMode::WeightPaint);

        let (mesh, vertex_groups, bvh) = weighted_square();
        world.spawn((mesh, vertex_groups, bvh, GlobalTransform::IDENTITY, Focused));
        world.resource_mut::<UnifiedPaintSettings>().weight = 0.5;

        world.send_event(SampleWeightRequest { from_tool: true });
        world.run_system_once(SampleWeightPlugin::operator_system);

        assert_eq!(world.resource::<UnifiedPaintSettings>().weight, 0.5);
        assert_eq!(
            world.resource::<SampleWeightOperator>().state(),
            OperatorState::Idle
        );
    }

    #[test]
    fn test_leaving_weight_paint_drops_pending_run() {
        let mut world = operator_world(InteractionMode::WeightPaint);

        let (mesh, vertex_groups, bvh) = weighted_square();
        world.spawn((mesh, vertex_groups, bvh, GlobalTransform::IDENTITY, Focused));

        world.send_event(SampleWeightRequest { from_tool: false });
        world.run_system_once(SampleWeightPlugin::operator_system);

        world.resource_mut::<Events<SampleWeightRequest>>().clear();
        world.insert_resource(InteractionMode::Object);
        world.run_system_once(SampleWeightPlugin::operator_system);

        assert_eq!(
            world.resource::<SampleWeightOperator>().state(),
            OperatorState::Idle
        );
        assert_eq!(world.resource::<HeaderText>().0, None);
    }

    #[test]
    fn test_modal_click_writes_sampled_weight() {
        let mut world = operator_world(InteractionMode::WeightPaint);

        let (mesh, vertex_groups, bvh) = weighted_square();
        world.spawn((mesh, vertex_groups, bvh, GlobalTransform::IDENTITY, Focused));
        world.insert_resource(ray_down_at(0.25, 0.5));

        world.send_event(SampleWeightRequest { from_tool: false });
        world.run_system_once(SampleWeightPlugin::operator_system);
        assert_eq!(world.resource::<UnifiedPaintSettings>().weight, 1.0);

        world.resource_mut::<Events<SampleWeightRequest>>().clear();
        world
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        world.run_system_once(SampleWeightPlugin::operator_system);

        let weight = world.resource::<UnifiedPaintSettings>().weight;
        assert!((weight - 0.25).abs() < 1e-5);
        assert_eq!(
            world.resource::<SampleWeightOperator>().state(),
            OperatorState::Idle
        );

        // the click ended the modal run, nothing after the operator sees it
        let mouse = world.resource::<ButtonInput<MouseButton>>();
        assert!(!mouse.pressed(MouseButton::Left));
        assert!(!mouse.just_pressed(MouseButton::Left));
    }

    #[test]
    fn test_idle_click_is_left_for_tools() {
        let mut world = operator_world(InteractionMode::WeightPaint);

        let (mesh, vertex_groups, bvh) = weighted_square();
        world.spawn((mesh, vertex_groups, bvh, GlobalTransform::IDENTITY, Focused));
        world.insert_resource(ray_down_at(0.25, 0.5));

        world
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        world.run_system_once(SampleWeightPlugin::operator_system);

        assert!(world
            .resource::<ButtonInput<MouseButton>>()
            .just_pressed(MouseButton::Left));
        assert_eq!(world.resource::<UnifiedPaintSettings>().weight, 1.0);
    }

    fn paint_app() -> App {
        let mut app = App::new();
        app.add_plugins(SampleWeightPlugin)
            .insert_resource(InteractionMode::WeightPaint)
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .insert_resource(ray_down_at(0.1, 0.1))
            .add_systems(Update, DrawWeight::update_system.in_set(ToolSet::Update));

        let (mesh, vertex_groups, bvh) = weighted_square();
        app.world
            .spawn((mesh, vertex_groups, bvh, GlobalTransform::IDENTITY, Focused));

        app
    }

    fn painted_weights(app: &mut App) -> Vec<Option<f32>> {
        let vertex_groups = app
            .world
            .query::<&VertexGroups>()
            .single(&app.world)
            .clone();
        (0..4)
            .map(|index| vertex_groups.weight(VertexHandle::new(index), 0))
            .collect()
    }

    #[test]
    fn test_modal_click_does_not_paint() {
        let mut app = paint_app();
        let before = painted_weights(&mut app);

        app.world.send_event(SampleWeightRequest { from_tool: false });
        app.update();
        assert_eq!(
            app.world.resource::<SampleWeightOperator>().state(),
            OperatorState::AwaitingClick
        );

        app.world
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();

        assert_eq!(painted_weights(&mut app), before);

        let weight = app.world.resource::<UnifiedPaintSettings>().weight;
        assert!((weight - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_idle_click_paints() {
        let mut app = paint_app();
        let before = painted_weights(&mut app);

        app.world
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();

        let after = painted_weights(&mut app);
        assert_ne!(after, before);
        assert!(after[0].is_some_and(|weight| weight > 0.0));
        assert_eq!(app.world.resource::<UnifiedPaintSettings>().weight, 1.0);
    }
}
