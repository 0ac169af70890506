//! The main parser implementation.

use crate::ast::{BinaryOperator, Node, Program};
use crate::lexer::{is_letter, Backtrack, Cursor};
use crate::{Error, Result};

/// A backtracking recursive-descent parser for the toy language.
pub struct Parser<'src> {
    pub(super) cursor: Cursor<'src>,
}

impl<'src> Backtrack<'src> for Parser<'src> {
    fn cursor(&mut self) -> &mut Cursor<'src> {
        &mut self.cursor
    }
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source code.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Parses the whole source as a sequence of statements.
    ///
    /// Fails unless every character is consumed. The reported line is the
    /// one holding the farthest index any attempt reached.
    pub fn parse_program(&mut self) -> Result<Program> {
        let body = self.statements();
        self.cursor.whitespace();
        if !self.cursor.is_at_end() {
            let farthest = self.cursor.farthest().max(self.cursor.index());
            return Err(Error::Syntax {
                line: self.cursor.line_at(farthest),
            });
        }
        Ok(Program { body })
    }

    /// `left body right`, with optional whitespace before each delimiter.
    pub(super) fn wrapped<T>(
        &mut self,
        left: &str,
        body: impl FnOnce(&mut Self) -> Option<T>,
        right: &str,
    ) -> Option<T> {
        self.backtrack(|p| {
            p.cursor.whitespace();
            if !p.cursor.read(left) {
                return None;
            }
            let value = body(p)?;
            p.cursor.whitespace();
            p.cursor.read(right).then_some(value)
        })
    }

    /// Zero or more `item`s separated by commas. A trailing comma is
    /// consumed. Always succeeds.
    pub(super) fn comma_separated<T>(&mut self, item: impl Fn(&mut Self) -> Option<T>) -> Vec<T> {
        let mut items = Vec::new();
        loop {
            if !items.is_empty() && !self.comma() {
                return items;
            }
            match item(self) {
                Some(value) => items.push(value),
                None => return items,
            }
        }
    }

    fn comma(&mut self) -> bool {
        self.backtrack(|p| {
            p.cursor.whitespace();
            p.cursor.read(",").then_some(())
        })
        .is_some()
    }

    /// A left-associative chain `a op b op c`, folded as `((a op b) op c)`.
    ///
    /// `next` parses the operands (the next tighter level) and `operators`
    /// lists the accepted operator tokens, longest first where one is a
    /// prefix of another. An operator without a right operand is not
    /// consumed.
    pub(super) fn binary_chain(
        &mut self,
        next: fn(&mut Self) -> Option<Node>,
        operators: &[(&str, BinaryOperator)],
    ) -> Option<Node> {
        self.backtrack(|p| {
            let mut left = next(p)?;
            loop {
                let step = p.backtrack(|p| {
                    let op = p.operator(operators)?;
                    let right = next(p)?;
                    Some((op, right))
                });
                match step {
                    Some((op, right)) => left = Node::binary(left, op, right),
                    None => return Some(left),
                }
            }
        })
    }

    fn operator(&mut self, operators: &[(&str, BinaryOperator)]) -> Option<BinaryOperator> {
        self.cursor.whitespace();
        operators
            .iter()
            .find(|(token, _)| self.read_operator(token))
            .map(|&(_, op)| op)
    }

    /// Word operators such as `in` must not run into an identifier.
    fn read_operator(&mut self, token: &str) -> bool {
        if token.starts_with(is_letter) {
            self.cursor.this_keyword(token).is_some()
        } else {
            self.cursor.read(token)
        }
    }
}

impl Node {
    pub(crate) fn binary(left: Node, op: BinaryOperator, right: Node) -> Node {
        Node::BinaryOp(crate::ast::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Program> {
        Parser::new(src).parse_program()
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("").unwrap().body, vec![]);
        assert_eq!(parse("  // only a comment\n").unwrap().body, vec![]);
    }

    #[test]
    fn test_parse_leftover_input_is_error() {
        assert_eq!(parse("x"), Err(Error::Syntax { line: 1 }));
    }

    #[test]
    fn test_error_line_uses_farthest_index() {
        // The string rule runs to the end of the input before failing.
        let err = parse("print(1);\n\nprint('abc);\nx;").unwrap_err();
        assert_eq!(err, Error::Syntax { line: 4 });
    }

    #[test]
    fn test_error_on_later_line() {
        let err = parse("var a = 1;\nvar b = 2;\nvar c = ;").unwrap_err();
        assert_eq!(err, Error::Syntax { line: 3 });
    }

    #[test]
    fn test_unterminated_string_is_syntax_error() {
        assert!(matches!(parse("'abc"), Err(Error::Syntax { line: 1 })));
    }

    #[test]
    fn test_backtracking_round_trip() {
        let mut parser = Parser::new("  [1, 2");
        let list = parser.wrapped(
            "[",
            |p| Some(p.comma_separated(|p| p.cursor.number())),
            "]",
        );
        assert!(list.is_none());
        assert_eq!(parser.cursor.index(), 0);
    }

    #[test]
    fn test_comma_separated_allows_trailing_comma() {
        let mut parser = Parser::new("1, 2 ,3,");
        let items = parser.comma_separated(|p| p.cursor.number());
        assert_eq!(items, vec![1, 2, 3]);
        assert!(parser.cursor.is_at_end());
    }

    #[test]
    fn test_dangling_operator_not_consumed() {
        let mut parser = Parser::new("1 + ;");
        let node = parser.binary_chain(
            |p| p.cursor.number().map(Node::Number),
            &[("+", BinaryOperator::Add)],
        );
        assert_eq!(node, Some(Node::Number(1)));
        assert_eq!(parser.cursor.rest(), " + ;");
    }
}
