// Re-export glam for convenience
pub use glam::*;

// Maya transform model
mod transform;
pub use transform::{Axis, RotateOrder, TransformComponents};
