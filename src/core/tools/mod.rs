use bevy::prelude::SystemSet;

pub mod brush;
pub mod sample_weight;

#[derive(SystemSet, Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub enum ToolSet {
    /// Runs the update system of the active tool
    Update,
}
