//! Parser for toy source code.
//!
//! A backtracking recursive-descent parser running directly over the
//! [`Cursor`](crate::lexer::Cursor). Every multi-token rule is wrapped in
//! `backtrack`, so a failing alternative never needs manual position
//! bookkeeping.
//!
//! ## Structure
//!
//! - `parser` - `Parser` entry point and the shared combinators
//! - `statements` - statement rules (`while`, `if`, expression statements)
//! - `expressions` - the precedence chain, postfix forms and literals
//!
//! ## Usage
//!
//! ```rust
//! use toy_compiler::parser::Parser;
//!
//! let mut parser = Parser::new("var x = 1 + 2;");
//! let program = parser.parse_program().expect("Should parse");
//! assert_eq!(program.body.len(), 1);
//! ```

mod parser;

pub mod expressions;
pub mod statements;

pub use parser::Parser;
