//! Layout: the CSS box model around widget content.

pub mod gadget;

pub use gadget::{ContentProvider, EmptyContent, Gadget, Orientation, PreferredSize};
