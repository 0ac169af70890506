//! Statement rules.
//!
//! | Statement | Method | Separator |
//! |-----------|--------|-----------|
//! | `while (cond) { ... }` | `while_statement` | none |
//! | `if (cond) { ... }` | `if_statement` | none |
//! | `expr;` | `expression_statement` | trailing `;` |
//!
//! Statements only need whitespace or comments between them. `var` and
//! `return` are expression forms and therefore end with `;` like any other
//! expression statement.
//!
//! ```text
//! Statements :
//!     (Statement Whitespace)*
//!
//! Statement :
//!     `while` Paren Block
//!     `if` Paren Block
//!     Expression `;`
//!
//! Block :
//!     `{` Statements `}`
//! ```

use crate::ast::{Conditional, Loop, Node};
use crate::lexer::Backtrack;

use super::Parser;

impl<'src> Parser<'src> {
    /// Zero or more statements. Always succeeds.
    pub fn statements(&mut self) -> Vec<Node> {
        let mut items = Vec::new();
        loop {
            if !items.is_empty() {
                self.cursor.whitespace();
            }
            match self.statement() {
                Some(statement) => items.push(statement),
                None => return items,
            }
        }
    }

    /// A single statement.
    pub fn statement(&mut self) -> Option<Node> {
        self.while_statement()
            .or_else(|| self.if_statement())
            .or_else(|| self.expression_statement())
    }

    fn block(&mut self) -> Option<Vec<Node>> {
        self.wrapped("{", |p| Some(p.statements()), "}")
    }

    fn while_statement(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            p.cursor.this_keyword("while")?;
            let cond = p.paren()?;
            let children = p.block()?;
            Some(Node::While(Loop {
                cond: Box::new(cond),
                children,
            }))
        })
    }

    fn if_statement(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            p.cursor.this_keyword("if")?;
            let cond = p.paren()?;
            let children = p.block()?;
            Some(Node::If(Conditional {
                cond: Box::new(cond),
                children,
            }))
        })
    }

    fn expression_statement(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            let expr = p.expr()?;
            p.cursor.whitespace();
            p.cursor.read(";").then_some(expr)
        })
    }
}
