use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct CubeOptions {
    pub size: f32,
}

#[wasm_bindgen]
impl CubeOptions {
    #[wasm_bindgen(constructor)]
    pub fn new(size: f32) -> Self {
        Self { size }
    }
}

#[wasm_bindgen]
#[derive(Hash, Eq, PartialEq, Debug, Clone, Copy)]
pub enum ToolType {
    DrawWeight,
    SampleWeightInterpolated,
}
