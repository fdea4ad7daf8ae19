//! CSS engine: tokenizer, value parser, value algebra, properties, cascade.

pub mod tokenizer;
pub mod parser;
pub mod values;
pub mod properties;
pub mod provider;
pub mod style;
pub mod tree;

pub use parser::{ParseError, Parser};
pub use properties::{parse_declaration, DeclaredValue, Group, PropertyError, PropertyId};
pub use provider::{Settings, StaticProvider, StyleProvider};
pub use style::ComputedStyle;
pub use tree::{Declaration, DeclarationBlock, StyleNodeId, StyleTree};
pub use values::{ComputeContext, CssValue};
