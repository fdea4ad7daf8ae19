//! logos-based CSS value tokenizer.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `10px` as Dimension beats `10` + `px`)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Our ordering ensures:
//! - `calc(` matches [`Token::Function`], not `Ident` + `ParenOpen`
//! - `url(a.png)` matches [`Token::Url`] as a whole
//! - `-gtk-icontheme` matches [`Token::Ident`], not `Minus` + `Ident`
//! - a lone `-` or `+` between spaces is an operator, so `calc(1px - 2px)` works

use logos::Logos;

/// CSS value token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum Token {
    // ── Compound tokens (longer matches, defined first) ──────────────

    /// `!important` flag.
    #[token("!important")]
    Important,

    /// Unquoted url: `url(image.png)`.
    #[regex(r#"url\([^)"' \t\n]*\)"#)]
    Url,

    /// Function opener: `calc(`, `rgb(`, `translate3d(`.
    #[regex(r"-?-?[a-zA-Z_][a-zA-Z0-9_-]*\(")]
    Function,

    /// Percentage: `50%`, `-12.5%`.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)%")]
    Percentage,

    /// Dimension: number with unit suffix like `10px`, `1.5em`, `90deg`.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)[a-zA-Z]+")]
    Dimension,

    /// Number: integer or float, possibly signed.
    #[regex(r"[+-]?([0-9]+(\.[0-9]+)?|\.[0-9]+)")]
    Number,

    /// Hash: `#fff`, `#ff00aa80`.
    #[regex(r"#[0-9a-zA-Z_-]+")]
    Hash,

    /// Double-quoted string literal.
    #[regex(r#""[^"]*""#)]
    StringLiteral,

    /// Single-quoted string literal.
    #[regex(r"'[^']*'")]
    StringLiteralSingle,

    /// Identifier: keywords, property names, color names.
    #[regex(r"-?-?[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    // ── Single-character punctuation ─────────────────────────────────

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `,`
    #[token(",")]
    Comma,

    /// `/`
    #[token("/")]
    Slash,

    /// `*`
    #[token("*")]
    Star,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `:`
    #[token(":")]
    Colon,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,
}

/// A token together with its source text and byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub text: String,
    pub offset: usize,
}

/// Tokenize a CSS string.
///
/// Input the lexer cannot match is returned as an `Err` carrying its byte
/// offset, so callers can report it instead of silently skipping it.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, usize> {
    let mut lexer = Token::lexer(input);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => out.push(Spanned {
                token,
                text: input[span.clone()].to_string(),
                offset: span.start,
            }),
            Err(()) => return Err(span.start),
        }
    }
    Ok(out)
}
