//! # gilt-css
//!
//! A CSS value engine and box painter modelled on GTK's styling core.
//!
//! gilt-css parses CSS declarations into typed values, computes them
//! through a cascade, interpolates between computed styles, and paints
//! backgrounds, borders and outlines of a CSS box into a retained scene.
//!
//! ## Core Systems
//!
//! - **[`css`]**: Tokenizer, value parser, the value algebra (compute, equal,
//!   transition, print), property table, computed styles and the style tree
//! - **[`layout`]**: The box-model gadget: preferred sizes, allocation, clip
//! - **[`render`]**: Scene recording, rounded boxes, background and border
//!   painting
//! - **[`testing`]**: Text dumps of recorded scenes for snapshot tests
//! - **[`geometry`]**: Rect, Region, Sides, Point primitives

// Foundation
pub mod geometry;

// Styling
pub mod css;

// Box model and painting
pub mod layout;
pub mod render;

// Test helpers
pub mod testing;
