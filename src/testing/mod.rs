//! Test helpers: text dumps of recorded scenes.
//!
//! Use [`dump`] to turn a [`RenderNode`](crate::render::RenderNode) tree
//! into indented text for snapshot-style assertions.

pub mod snapshot;

pub use snapshot::{dump, paint_to_string};
