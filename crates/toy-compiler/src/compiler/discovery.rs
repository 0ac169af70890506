//! Function discovery.
//!
//! A depth-first, pre-order walk over the whole program that collects every
//! function literal and numbers it densely from zero. The program itself is
//! the implicit root function with id 0. Children are visited in the order
//! the code generator emits them, so the `load_func` operands inside any one
//! body appear in increasing order.

use std::ptr;

use rustc_hash::FxHashMap;

use crate::ast::{FunctionLiteral, Node};
use crate::{Error, Result};

/// A function body found during discovery.
#[derive(Debug, Clone, Copy)]
pub struct Discovered<'ast> {
    /// The parameter name, if any
    pub param: Option<&'ast str>,
    /// The body statements
    pub body: &'ast [Node],
}

/// The result of discovery: every function in id order, plus the id of
/// each function literal node.
#[derive(Debug, Default)]
pub struct FunctionIds<'ast> {
    functions: Vec<Discovered<'ast>>,
    ids: FxHashMap<*const FunctionLiteral, u16>,
}

impl<'ast> FunctionIds<'ast> {
    /// Walks `body` as the root function and every function nested in it.
    pub fn discover(body: &'ast [Node]) -> Result<Self> {
        let mut ids = Self::default();
        ids.functions.push(Discovered { param: None, body });
        ids.visit_all(body)?;
        Ok(ids)
    }

    /// Number of functions, the root included.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether nothing was discovered. Never true after `discover`.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Functions in id order; index 0 is the root.
    pub fn functions(&self) -> &[Discovered<'ast>] {
        &self.functions
    }

    /// The id assigned to a function literal node.
    pub fn id_of(&self, function: &FunctionLiteral) -> Option<u16> {
        self.ids.get(&ptr::from_ref(function)).copied()
    }

    fn visit_all(&mut self, nodes: &'ast [Node]) -> Result<()> {
        nodes.iter().try_for_each(|node| self.visit(node))
    }

    fn visit(&mut self, node: &'ast Node) -> Result<()> {
        match node {
            Node::Function(function) => {
                self.assign(function)?;
                self.visit_all(&function.children)
            }
            Node::Var(var) => self.visit(&var.value),
            Node::Return(value) => self.visit(value),
            Node::While(lp) => {
                self.visit(&lp.cond)?;
                self.visit_all(&lp.children)
            }
            Node::If(cond) => {
                self.visit(&cond.cond)?;
                self.visit_all(&cond.children)
            }
            Node::BinaryOp(bin) => {
                self.visit(&bin.left)?;
                self.visit(&bin.right)
            }
            // The value is evaluated before the target.
            Node::Assignment(assign) => {
                self.visit(&assign.right)?;
                self.visit(&assign.left)
            }
            Node::Subscript(sub) => {
                self.visit(&sub.left)?;
                self.visit(&sub.right)
            }
            Node::UnaryOp(un) => self.visit(&un.right),
            Node::List(items) => self.visit_all(items),
            Node::Dict(entries) => entries.iter().try_for_each(|entry| self.visit(&entry.value)),
            Node::String(_) | Node::Number(_) | Node::Null | Node::Identifier(_) => Ok(()),
        }
    }

    fn assign(&mut self, function: &'ast FunctionLiteral) -> Result<()> {
        let id = self.functions.len();
        let id = u16::try_from(id).map_err(|_| Error::OperandOverflow {
            what: "function id",
            value: id,
        })?;
        self.ids.insert(ptr::from_ref(function), id);
        self.functions.push(Discovered {
            param: function.param.as_deref(),
            body: &function.children,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn program(src: &str) -> Vec<Node> {
        Parser::new(src).parse_program().expect("Should parse").body
    }

    fn params<'a>(ids: &FunctionIds<'a>) -> Vec<Option<&'a str>> {
        ids.functions().iter().map(|f| f.param).collect()
    }

    #[test]
    fn test_root_only() {
        let body = program("var x = 1;");
        let ids = FunctionIds::discover(&body).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids.functions()[0].body.len(), 1);
        assert_eq!(ids.functions()[0].param, None);
    }

    #[test]
    fn test_pre_order_numbering() {
        let body = program(
            "var a = function (x) { var b = function (y) { return y; }; };
             var c = function (z) { return z; };",
        );
        let ids = FunctionIds::discover(&body).unwrap();
        assert_eq!(params(&ids), vec![None, Some("x"), Some("y"), Some("z")]);
    }

    #[test]
    fn test_id_of_matches_node() {
        let body = program("f(function (a) {}); g(function (b) {});");
        let ids = FunctionIds::discover(&body).unwrap();
        let Node::BinaryOp(call) = &body[1] else { panic!() };
        let Node::Function(function) = call.right.as_ref() else { panic!() };
        assert_eq!(ids.id_of(function), Some(2));
    }

    #[test]
    fn test_unknown_node_has_no_id() {
        let body = program("1;");
        let ids = FunctionIds::discover(&body).unwrap();
        let stray = FunctionLiteral {
            param: None,
            children: vec![],
        };
        assert_eq!(ids.id_of(&stray), None);
    }

    #[test]
    fn test_condition_before_body() {
        let body = program(
            "while (function (c) {}) { function (b) {}; }
             if (function (d) {}) { function (e) {}; }",
        );
        let ids = FunctionIds::discover(&body).unwrap();
        assert_eq!(params(&ids), vec![None, Some("c"), Some("b"), Some("d"), Some("e")]);
    }

    #[test]
    fn test_visits_every_container() {
        let body = program(
            "x = [function (l) {}];
             y = {k: function (d) {}};
             o[function (key) {}] = function (val) {};
             -(function (u) {})();
             return function (r) {};",
        );
        let ids = FunctionIds::discover(&body).unwrap();
        assert_eq!(
            params(&ids),
            vec![None, Some("l"), Some("d"), Some("val"), Some("key"), Some("u"), Some("r")]
        );
    }

    #[test]
    fn test_function_id_overflow() {
        let body = program(&"function () {};".repeat(usize::from(u16::MAX) + 1));
        assert_eq!(
            FunctionIds::discover(&body).unwrap_err(),
            Error::OperandOverflow {
                what: "function id",
                value: 65536,
            }
        );
    }

    #[test]
    fn test_deterministic() {
        let src = "var f = function (a) { return function (b) { return a; }; };";
        let first = program(src);
        let second = program(src);
        assert_eq!(
            params(&FunctionIds::discover(&first).unwrap()),
            params(&FunctionIds::discover(&second).unwrap())
        );
    }
}
