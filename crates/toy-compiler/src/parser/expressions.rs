//! Expression rules.
//!
//! ## Precedence Table (lowest to highest)
//!
//! | Precedence | Operators | Method |
//! |------------|-----------|--------|
//! | 1 | `function`, `var`, `return` | `expr` |
//! | 2 | `=` | `assignment` |
//! | 3 | `\|\|` | `or_expr` |
//! | 4 | `&&` | `and_expr` |
//! | 5 | `===` `!==` | `equality` |
//! | 6 | `<=` `>=` `<` `>` `in` | `relation` |
//! | 7 | `+` `-` | `addition` |
//! | 8 | `*` `/` `%` | `multiplication` |
//! | 9 | `-` `!` `typeof` (prefix) | `unary` |
//! | 10 | `()` `[]` `.` | `postfix` |
//! | 11 | literals, lists, dicts, parentheses | `atom` |
//!
//! ## Desugaring
//!
//! - `a.name` is `a['name']`
//! - `f(x)` is a `call` binary operation with the argument on the right;
//!   `f()` passes `null`. At most one argument is supported.
//! - `{ key }` is `{ key: key }`; keys are always strings.

use crate::ast::*;
use crate::lexer::Backtrack;

use super::Parser;

impl<'src> Parser<'src> {
    /// Any expression, including `function`, `var` and `return` forms.
    pub fn expr(&mut self) -> Option<Node> {
        self.function()
            .or_else(|| self.var_expr())
            .or_else(|| self.return_expr())
            .or_else(|| self.assignment())
    }

    fn assignment(&mut self) -> Option<Node> {
        self.assign()
            .or_else(|| self.or_expr())
            .or_else(|| self.function())
    }

    /// `target = value`, right-associative. The target must be an lvalue.
    fn assign(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            let left = p.postfix().filter(Node::is_lvalue)?;
            p.cursor.whitespace();
            if !p.cursor.read("=") {
                return None;
            }
            let right = p.assignment()?;
            Some(Node::Assignment(Assignment {
                left: Box::new(left),
                right: Box::new(right),
            }))
        })
    }

    fn or_expr(&mut self) -> Option<Node> {
        self.binary_chain(Self::and_expr, &[("||", BinaryOperator::Or)])
    }

    fn and_expr(&mut self) -> Option<Node> {
        self.binary_chain(Self::equality, &[("&&", BinaryOperator::And)])
    }

    fn equality(&mut self) -> Option<Node> {
        self.binary_chain(
            Self::relation,
            &[("===", BinaryOperator::Eq), ("!==", BinaryOperator::Neq)],
        )
    }

    fn relation(&mut self) -> Option<Node> {
        self.binary_chain(
            Self::addition,
            &[
                ("<=", BinaryOperator::Lte),
                (">=", BinaryOperator::Gte),
                ("<", BinaryOperator::Lt),
                (">", BinaryOperator::Gt),
                ("in", BinaryOperator::In),
            ],
        )
    }

    fn addition(&mut self) -> Option<Node> {
        self.binary_chain(
            Self::multiplication,
            &[("+", BinaryOperator::Add), ("-", BinaryOperator::Sub)],
        )
    }

    fn multiplication(&mut self) -> Option<Node> {
        self.binary_chain(
            Self::unary,
            &[
                ("*", BinaryOperator::Mul),
                ("/", BinaryOperator::Div),
                ("%", BinaryOperator::Mod),
            ],
        )
    }

    /// At most one prefix operator applied to a postfix expression.
    fn unary(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            p.cursor.whitespace();
            let op = if p.cursor.read("-") {
                Some(UnaryOperator::Minus)
            } else if p.cursor.read("!") {
                Some(UnaryOperator::Not)
            } else {
                p.cursor.this_keyword("typeof").map(|_| UnaryOperator::TypeOf)
            };
            let right = p.postfix()?;
            Some(match op {
                Some(op) => Node::UnaryOp(UnaryOp {
                    op,
                    right: Box::new(right),
                }),
                None => right,
            })
        })
    }

    /// An atom followed by any number of calls, subscripts and member
    /// accesses.
    fn postfix(&mut self) -> Option<Node> {
        let mut left = self.atom()?;
        loop {
            if let Some(argument) = self.paren() {
                left = Node::binary(left, BinaryOperator::Call, argument);
            } else if let Some(key) = self.wrapped("[", Self::expr, "]") {
                left = Node::subscript(left, key);
            } else if let Some(name) = self.member() {
                left = Node::subscript(left, Node::String(name));
            } else {
                return Some(left);
            }
        }
    }

    fn member(&mut self) -> Option<String> {
        self.backtrack(|p| {
            p.cursor.whitespace();
            if !p.cursor.read(".") {
                return None;
            }
            p.cursor.identifier()
        })
    }

    fn atom(&mut self) -> Option<Node> {
        self.literal()
            .or_else(|| self.list())
            .or_else(|| self.dict())
            .or_else(|| self.paren())
    }

    fn literal(&mut self) -> Option<Node> {
        if self.cursor.this_keyword("null").is_some() {
            return Some(Node::Null);
        }
        if let Some(name) = self.cursor.identifier() {
            return Some(Node::Identifier(name));
        }
        if let Some(value) = self.cursor.number() {
            return Some(Node::Number(value));
        }
        self.cursor.string().map(Node::String)
    }

    /// `( expr )`, or `null` for empty parentheses.
    pub(super) fn paren(&mut self) -> Option<Node> {
        self.wrapped("(", |p| Some(p.expr().unwrap_or(Node::Null)), ")")
    }

    fn list(&mut self) -> Option<Node> {
        self.wrapped("[", |p| Some(p.comma_separated(Self::expr)), "]")
            .map(Node::List)
    }

    fn dict(&mut self) -> Option<Node> {
        self.wrapped("{", |p| Some(p.comma_separated(Self::dict_entry)), "}")
            .map(Node::Dict)
    }

    fn dict_entry(&mut self) -> Option<DictEntry> {
        self.backtrack(|p| {
            let key = p.cursor.identifier().or_else(|| p.cursor.string())?;
            p.cursor.whitespace();
            if !p.cursor.read(":") {
                return Some(DictEntry {
                    value: Node::Identifier(key.clone()),
                    key,
                });
            }
            let value = p.expr()?;
            Some(DictEntry { key, value })
        })
    }

    fn var_expr(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            p.cursor.this_keyword("var")?;
            let name = p.cursor.identifier()?;
            p.cursor.whitespace();
            if !p.cursor.read("=") {
                return None;
            }
            let value = p.expr()?;
            Some(Node::Var(VarDeclaration {
                name,
                value: Box::new(value),
            }))
        })
    }

    fn return_expr(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            p.cursor.this_keyword("return")?;
            let value = p.expr().unwrap_or(Node::Null);
            Some(Node::Return(Box::new(value)))
        })
    }

    fn function(&mut self) -> Option<Node> {
        self.backtrack(|p| {
            p.cursor.this_keyword("function")?;
            let param = p.wrapped("(", |p| Some(p.cursor.identifier()), ")")?;
            let children = p.wrapped("{", |p| Some(p.statements()), "}")?;
            Some(Node::Function(FunctionLiteral { param, children }))
        })
    }
}

impl Node {
    pub(crate) fn subscript(left: Node, right: Node) -> Node {
        Node::Subscript(Subscript {
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}
