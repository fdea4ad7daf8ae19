//! Recursive descent parser state for CSS values.
//!
//! Wraps the token stream from [`crate::css::tokenizer`] with the cursor
//! operations value parsers need: peeking, keyword and function matching,
//! backtracking marks and position-aware errors. Each value kind owns its
//! grammar and drives a [`Parser`] directly.

use crate::css::tokenizer::{tokenize, Spanned, Token};

/// Errors from CSS value parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("invalid character at position {0}")]
    InvalidCharacter(usize),
    #[error("invalid value at position {position}: {message}")]
    InvalidValue { position: usize, message: String },
}

impl ParseError {
    /// Byte offset the error refers to, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::InvalidValue { position, .. }
            | Self::InvalidCharacter(position) => Some(*position),
            Self::UnexpectedEof(_) => None,
        }
    }
}

/// Parse `input` completely with `f`, failing if tokens are left over.
pub fn parse_all<T>(
    input: &str,
    f: impl FnOnce(&mut Parser) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    let mut parser = Parser::new(input)?;
    let value = f(&mut parser)?;
    parser.expect_eof()?;
    Ok(value)
}

/// Recursive descent parser state.
#[derive(Debug, Clone)]
pub struct Parser {
    tokens: Vec<Spanned>,
    cursor: usize,
    input_len: usize,
}

impl Parser {
    /// Tokenize `input` and position the cursor at the first token.
    pub fn new(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input).map_err(ParseError::InvalidCharacter)?;
        Ok(Self {
            tokens,
            cursor: 0,
            input_len: input.len(),
        })
    }

    pub fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    pub fn peek_token(&self) -> Option<Token> {
        self.peek().map(|t| t.token)
    }

    /// Look `n` tokens past the cursor.
    pub fn peek_nth(&self, n: usize) -> Option<&Spanned> {
        self.tokens.get(self.cursor + n)
    }

    pub fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    /// Byte offset of the next token, or the input length at the end.
    pub fn position(&self) -> usize {
        self.peek().map_or(self.input_len, |t| t.offset)
    }

    /// Cursor snapshot for backtracking.
    pub fn mark(&self) -> usize {
        self.cursor
    }

    pub fn reset(&mut self, mark: usize) {
        self.cursor = mark.min(self.tokens.len());
    }

    // ── Matching ────────────────────────────────────────────────────────

    /// Whether the next token is the identifier `name` (ASCII case-insensitive).
    pub fn has_ident(&self, name: &str) -> bool {
        matches!(self.peek(), Some(t) if t.token == Token::Ident && t.text.eq_ignore_ascii_case(name))
    }

    /// Consume the identifier `name` if it is next.
    pub fn try_ident(&mut self, name: &str) -> bool {
        if self.has_ident(name) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Consume the first identifier from `names` that matches and return its index.
    pub fn try_ident_of(&mut self, names: &[&str]) -> Option<usize> {
        let index = names.iter().position(|name| self.has_ident(name))?;
        self.cursor += 1;
        Some(index)
    }

    /// Consume `token` if it is next.
    pub fn try_token(&mut self, token: Token) -> bool {
        if self.peek_token() == Some(token) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Whether the next token opens the function `name(`.
    pub fn has_function(&self, name: &str) -> bool {
        match self.peek() {
            Some(t) if t.token == Token::Function => t
                .text
                .strip_suffix('(')
                .is_some_and(|n| n.eq_ignore_ascii_case(name)),
            _ => false,
        }
    }

    /// Consume the function opener `name(` if it is next.
    pub fn try_function(&mut self, name: &str) -> bool {
        if self.has_function(name) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Name of the function opener at the cursor, without the parenthesis.
    pub fn peek_function(&self) -> Option<&str> {
        match self.peek() {
            Some(t) if t.token == Token::Function => t.text.strip_suffix('('),
            _ => None,
        }
    }

    /// Consume any identifier and return its text.
    pub fn consume_ident(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(t) if t.token == Token::Ident => {
                let text = t.text.clone();
                self.cursor += 1;
                Ok(text)
            }
            _ => Err(self.error("expected an identifier")),
        }
    }

    /// Consume a plain number token.
    pub fn consume_number(&mut self) -> Result<f64, ParseError> {
        match self.peek() {
            Some(t) if t.token == Token::Number => {
                let value = t
                    .text
                    .parse::<f64>()
                    .map_err(|e| self.invalid(e.to_string()))?;
                self.cursor += 1;
                Ok(value)
            }
            _ => Err(self.error("expected a number")),
        }
    }

    /// Consume `expected` or fail naming `what` was wanted.
    pub fn expect(&mut self, expected: Token, what: &str) -> Result<Spanned, ParseError> {
        match self.peek() {
            Some(t) if t.token == expected => {
                let tok = t.clone();
                self.cursor += 1;
                Ok(tok)
            }
            _ => Err(self.error(&format!("expected {what}"))),
        }
    }

    /// Consume the closing parenthesis of a function.
    pub fn expect_close(&mut self) -> Result<(), ParseError> {
        self.expect(Token::ParenClose, "')'").map(|_| ())
    }

    pub fn expect_comma(&mut self) -> Result<(), ParseError> {
        self.expect(Token::Comma, "','").map(|_| ())
    }

    /// Fail unless every token was consumed.
    pub fn expect_eof(&self) -> Result<(), ParseError> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.error("expected end of value"))
        }
    }

    /// Whether the current value has ended: end of input, `;`, `}`,
    /// `!important`, `,` or `)`.
    pub fn is_value_end(&self) -> bool {
        matches!(
            self.peek_token(),
            None | Some(
                Token::Semicolon
                    | Token::BraceClose
                    | Token::Important
                    | Token::Comma
                    | Token::ParenClose
            )
        )
    }

    /// Whether the whole declaration value has ended: end of input, `;`,
    /// `}` or `!important`.
    pub fn is_declaration_end(&self) -> bool {
        matches!(
            self.peek_token(),
            None | Some(Token::Semicolon | Token::BraceClose | Token::Important)
        )
    }

    /// Whether the next token can start a number, dimension or calc().
    pub fn has_number(&self) -> bool {
        matches!(
            self.peek_token(),
            Some(Token::Number | Token::Dimension | Token::Percentage)
        ) || self.has_function("calc")
            || self.has_function("-gtk-calc")
    }

    /// Parse a comma separated list of one or more items.
    pub fn parse_comma_list<T>(
        &mut self,
        mut item: impl FnMut(&mut Parser) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = vec![item(self)?];
        while self.try_token(Token::Comma) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// Skip to the end of the current declaration (`;` or `}` at depth zero).
    pub fn skip_declaration(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek_token() {
            match token {
                Token::Function | Token::ParenOpen => depth += 1,
                Token::ParenClose => depth = depth.saturating_sub(1),
                Token::Semicolon | Token::BraceClose if depth == 0 => return,
                _ => {}
            }
            self.cursor += 1;
        }
    }

    // ── Errors ──────────────────────────────────────────────────────────

    /// An error describing the token at the cursor.
    pub fn error(&self, message: &str) -> ParseError {
        match self.peek() {
            Some(t) => ParseError::UnexpectedToken {
                position: t.offset,
                message: format!("{message}, got '{}'", t.text),
            },
            None => ParseError::UnexpectedEof(message.to_string()),
        }
    }

    /// A semantic error at the cursor position.
    pub fn invalid(&self, message: impl Into<String>) -> ParseError {
        ParseError::InvalidValue {
            position: self.position(),
            message: message.into(),
        }
    }
}
