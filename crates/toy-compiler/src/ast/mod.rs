//! Abstract Syntax Tree (AST) definitions for the toy language.
//!
//! Every node kind is one variant of [`Node`] carrying exactly its own
//! fields. Statements and expressions share the same type because the
//! grammar accepts `var`, `return` and function literals as expression forms.

use std::fmt;

/// A complete program: a bare sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The top-level statements
    pub body: Vec<Node>,
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// String literal (escapes already resolved)
    String(String),
    /// Non-negative integer literal
    Number(i64),
    /// `null`
    Null,
    /// Variable reference
    Identifier(String),
    /// Binary operation, including calls and `&&`/`||`
    BinaryOp(BinaryOp),
    /// Prefix operation
    UnaryOp(UnaryOp),
    /// `target = value`
    Assignment(Assignment),
    /// `object[key]`, also produced by `object.name`
    Subscript(Subscript),
    /// `[a, b, c]`
    List(Vec<Node>),
    /// `{ key: value, shorthand }`
    Dict(Vec<DictEntry>),
    /// `var name = value`
    Var(VarDeclaration),
    /// `return value`
    Return(Box<Node>),
    /// `while (cond) { ... }`
    While(Loop),
    /// `if (cond) { ... }`
    If(Conditional),
    /// `function (param) { ... }`
    Function(FunctionLiteral),
}

impl Node {
    /// The node kind as it appears in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::String(_) => "string",
            Node::Number(_) => "number",
            Node::Null => "null",
            Node::Identifier(_) => "identifier",
            Node::BinaryOp(_) => "binaryOp",
            Node::UnaryOp(_) => "unaryOp",
            Node::Assignment(_) => "assignment",
            Node::Subscript(_) => "subscript",
            Node::List(_) => "list",
            Node::Dict(_) => "dict",
            Node::Var(_) => "var",
            Node::Return(_) => "return",
            Node::While(_) => "while",
            Node::If(_) => "if",
            Node::Function(_) => "function",
        }
    }

    /// Whether the node may appear on the left of `=`.
    pub fn is_lvalue(&self) -> bool {
        matches!(self, Node::Identifier(_) | Node::Subscript(_))
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    /// Left operand (the callee for calls)
    pub left: Box<Node>,
    /// The operator
    pub op: BinaryOperator,
    /// Right operand (the single argument for calls)
    pub right: Box<Node>,
}

/// A prefix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    /// The operator
    pub op: UnaryOperator,
    /// The operand
    pub right: Box<Node>,
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Target: an identifier or a subscript
    pub left: Box<Node>,
    /// Assigned value
    pub right: Box<Node>,
}

/// An indexing expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscript {
    /// The indexed object
    pub left: Box<Node>,
    /// The key
    pub right: Box<Node>,
}

/// One `key: value` pair of a dict literal.
///
/// The key is always a string, whether written as an identifier or as a
/// quoted string.
#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry {
    /// The key
    pub key: String,
    /// The value
    pub value: Node,
}

/// A `var` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclaration {
    /// Declared name
    pub name: String,
    /// Initializer
    pub value: Box<Node>,
}

/// A `while` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    /// Loop condition
    pub cond: Box<Node>,
    /// Loop body
    pub children: Vec<Node>,
}

/// An `if` statement. There is no `else` branch in the language.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    /// Condition
    pub cond: Box<Node>,
    /// Body run when the condition is truthy
    pub children: Vec<Node>,
}

/// A function literal. Functions take at most one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    /// The parameter name, if any
    pub param: Option<String>,
    /// The function body
    pub children: Vec<Node>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `===`
    Eq,
    /// `!==`
    Neq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `>=`
    Gte,
    /// `in`
    In,
    /// `&&`
    And,
    /// `||`
    Or,
    /// Function call `f(x)`
    Call,
}

impl BinaryOperator {
    /// The operator as written in source, or `call` for calls.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Eq => "===",
            BinaryOperator::Neq => "!==",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gte => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Call => "call",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// `-`
    Minus,
    /// `!`
    Not,
    /// `typeof`
    TypeOf,
}

impl UnaryOperator {
    /// The operator as written in source.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::TypeOf => "typeof",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lvalues() {
        assert!(Node::Identifier("x".into()).is_lvalue());
        let subscript = Node::Subscript(Subscript {
            left: Box::new(Node::Identifier("a".into())),
            right: Box::new(Node::Number(0)),
        });
        assert!(subscript.is_lvalue());
        assert!(!Node::Number(1).is_lvalue());
        assert!(!Node::Null.is_lvalue());
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(BinaryOperator::Eq.to_string(), "===");
        assert_eq!(BinaryOperator::Call.to_string(), "call");
        assert_eq!(UnaryOperator::TypeOf.to_string(), "typeof");
    }
}
