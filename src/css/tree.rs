//! Declaration blocks and the style tree.
//!
//! A [`StyleTree`] is an arena of style nodes, each holding the
//! [`DeclarationBlock`] that applies to it. Computing a node cascades its
//! declarations over its parent's computed style; results are cached until
//! the node or one of its ancestors changes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::css::parser::Parser;
use crate::css::properties::{parse_declaration, DeclaredValue, PropertyError, PropertyId};
use crate::css::provider::StyleProvider;
use crate::css::style::ComputedStyle;
use crate::css::tokenizer::Token;

// ---------------------------------------------------------------------------
// DeclarationBlock
// ---------------------------------------------------------------------------

/// One longhand declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: PropertyId,
    pub value: DeclaredValue,
    pub important: bool,
}

/// An ordered list of longhand declarations, as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationBlock {
    declarations: Vec<Declaration>,
}

impl DeclarationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name: value [!important]` entries separated by `;`.
    ///
    /// Invalid declarations are dropped and reported; the rest of the block
    /// still applies.
    pub fn parse(text: &str) -> (Self, Vec<PropertyError>) {
        let mut block = Self::new();
        let mut errors = Vec::new();
        let mut parser = match Parser::new(text) {
            Ok(parser) => parser,
            Err(e) => return (block, vec![e.into()]),
        };

        while !parser.is_eof() {
            if parser.try_token(Token::Semicolon) {
                continue;
            }
            match block.parse_one(&mut parser) {
                Ok(()) => {}
                Err(e) => {
                    log::debug!("dropping declaration: {e}");
                    errors.push(e);
                    parser.skip_declaration();
                }
            }
            if !parser.try_token(Token::Semicolon) && !parser.is_eof() {
                // A stray `}` ends nothing here; skip it.
                parser.advance();
            }
        }
        (block, errors)
    }

    fn parse_one(&mut self, parser: &mut Parser) -> Result<(), PropertyError> {
        let name = parser.consume_ident()?;
        parser.expect(Token::Colon, "':'")?;
        let values = parse_declaration(&name, parser)?;
        let important = parser.try_token(Token::Important);
        if !matches!(parser.peek_token(), None | Some(Token::Semicolon)) {
            return Err(parser.error("expected ';'").into());
        }
        for (property, value) in values {
            self.push(property, value, important);
        }
        Ok(())
    }

    /// Append a declaration.
    pub fn push(&mut self, property: PropertyId, value: DeclaredValue, important: bool) {
        self.declarations.push(Declaration {
            property,
            value,
            important,
        });
    }

    /// The winning declaration for `property`: `!important` beats normal,
    /// later beats earlier.
    pub fn get(&self, property: PropertyId) -> Option<&DeclaredValue> {
        self.declarations
            .iter()
            .filter(|d| d.property == property)
            .max_by_key(|d| d.important)
            .map(|d| &d.value)
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// StyleTree
// ---------------------------------------------------------------------------

new_key_type! {
    /// Handle to a node of a [`StyleTree`].
    pub struct StyleNodeId;
}

const EMPTY_CHILDREN: &[StyleNodeId] = &[];

struct StyleNode {
    declarations: DeclarationBlock,
    computed: RefCell<Option<Rc<ComputedStyle>>>,
}

/// A tree of declaration blocks with cached cascading.
pub struct StyleTree {
    nodes: SlotMap<StyleNodeId, StyleNode>,
    children: SecondaryMap<StyleNodeId, Vec<StyleNodeId>>,
    parent: SecondaryMap<StyleNodeId, StyleNodeId>,
}

impl Default for StyleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTree {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    /// Insert a root node.
    pub fn insert(&mut self, declarations: DeclarationBlock) -> StyleNodeId {
        let id = self.nodes.insert(StyleNode {
            declarations,
            computed: RefCell::new(None),
        });
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a node under `parent`. Returns `None` if `parent` is gone.
    pub fn insert_child(
        &mut self,
        parent: StyleNodeId,
        declarations: DeclarationBlock,
    ) -> Option<StyleNodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.insert(declarations);
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        Some(id)
    }

    /// Replace a node's declarations, invalidating its subtree.
    pub fn set_declarations(&mut self, id: StyleNodeId, declarations: DeclarationBlock) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.declarations = declarations;
            self.invalidate(id);
        }
    }

    pub fn declarations(&self, id: StyleNodeId) -> Option<&DeclarationBlock> {
        self.nodes.get(id).map(|n| &n.declarations)
    }

    /// Remove a node and its descendants.
    pub fn remove(&mut self, id: StyleNodeId) -> Option<DeclarationBlock> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        if let Some(parent) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent) {
                siblings.retain(|&child| child != id);
            }
        }

        let mut queue = VecDeque::from([id]);
        let mut removed = None;
        while let Some(current) = queue.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                queue.extend(kids);
            }
            self.parent.remove(current);
            let node = self.nodes.remove(current);
            if current == id {
                removed = node.map(|n| n.declarations);
            }
        }
        removed
    }

    pub fn contains(&self, id: StyleNodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: StyleNodeId) -> Option<StyleNodeId> {
        self.parent.get(id).copied()
    }

    pub fn children(&self, id: StyleNodeId) -> &[StyleNodeId] {
        self.children.get(id).map_or(EMPTY_CHILDREN, Vec::as_slice)
    }

    /// The computed style of `id`, cascading from its ancestors.
    pub fn style(&self, id: StyleNodeId, provider: &dyn StyleProvider) -> Option<Rc<ComputedStyle>> {
        let node = self.nodes.get(id)?;
        if let Some(style) = node.computed.borrow().as_ref() {
            return Some(Rc::clone(style));
        }
        let parent = match self.parent(id) {
            Some(parent) => Some(self.style(parent, provider)?),
            None => None,
        };
        let style = Rc::new(ComputedStyle::compute(
            &node.declarations,
            provider,
            parent.as_deref(),
        ));
        *node.computed.borrow_mut() = Some(Rc::clone(&style));
        Some(style)
    }

    fn invalidate(&self, id: StyleNodeId) {
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.nodes.get(current) {
                node.computed.borrow_mut().take();
            }
            queue.extend(self.children(current).iter().copied());
        }
    }
}
