//! Painting: scene recording, rounded boxes, backgrounds and borders.

pub mod snapshot;
pub mod rounded_box;
pub mod background;
pub mod border;

pub use background::render_background;
pub use border::{outline_clip, render_border, render_outline};
pub use rounded_box::{CornerRadius, RoundedBox};
pub use snapshot::{RenderNode, ShadowParams, Snapshot, Texture};
