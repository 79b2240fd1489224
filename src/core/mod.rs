pub mod dim3;
pub mod editable_mesh;
pub mod editor_plugin;
pub mod interaction;
pub mod tools;
pub mod weight_sample;
