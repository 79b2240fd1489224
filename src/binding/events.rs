use bevy::prelude::*;
use wasm_bindgen::prelude::*;

use crate::core::tools::{brush::UnifiedPaintSettings, sample_weight::HeaderText};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = __wasm_callback_handles__)]
    fn header_text_update(text: Option<String>);

    #[wasm_bindgen(js_namespace = __wasm_callback_handles__)]
    fn brush_weight_update(weight: f32);
}

pub struct EventPlugin;

impl Plugin for EventPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            PostUpdate,
            (Self::header_text_change_detection, Self::brush_weight_change_detection),
        );
    }
}

impl EventPlugin {
    fn header_text_change_detection(header_text: Res<HeaderText>) {
        if header_text.is_changed() {
            header_text_update(header_text.0.clone());
        }
    }

    fn brush_weight_change_detection(settings: Res<UnifiedPaintSettings>) {
        if settings.is_changed() {
            brush_weight_update(settings.weight);
        }
    }
}
