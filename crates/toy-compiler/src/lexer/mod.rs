//! Lexical layer: cursor, character classifiers and token-level rules.
//!
//! There is no separate token stream. Token rules run directly on the
//! [`Cursor`], each skipping leading whitespace and comments itself, and
//! the grammar calls them on demand. This keeps arbitrary lookahead cheap
//! to express at the cost of re-scanning text on failed alternatives.
//!
//! ## Structure
//!
//! - `cursor` - `Cursor` position tracking and the `Backtrack` trait
//! - `literals` - identifier, keyword, number and string rules
//!
//! ## Usage
//!
//! ```rust
//! use toy_compiler::lexer::Cursor;
//!
//! let mut cursor = Cursor::new("  answer = 42");
//! assert_eq!(cursor.identifier().as_deref(), Some("answer"));
//! cursor.whitespace();
//! assert!(cursor.read("="));
//! assert_eq!(cursor.number(), Some(42));
//! ```

mod cursor;
mod literals;

pub use cursor::{Backtrack, Cursor};

/// Reserved words. None of them can be used as an identifier.
pub const KEYWORDS: [&str; 11] = [
    "else", "false", "function", "if", "in", "null", "return", "true", "typeof", "var", "while",
];

/// Whether `word` is reserved.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// `0`-`9`.
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// `a`-`z`.
pub fn is_lowercase_letter(ch: char) -> bool {
    ch.is_ascii_lowercase()
}

/// `A`-`Z`.
pub fn is_uppercase_letter(ch: char) -> bool {
    ch.is_ascii_uppercase()
}

/// An ASCII letter of either case.
pub fn is_letter(ch: char) -> bool {
    is_lowercase_letter(ch) || is_uppercase_letter(ch)
}

/// Space, newline, carriage return or tab.
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\n' | '\r' | '\t')
}
