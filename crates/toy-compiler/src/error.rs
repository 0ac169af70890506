//! Error types for the compiler.

use thiserror::Error;

use crate::ast::BinaryOperator;

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal compilation error. There is no recovery and no partial output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The source did not parse completely.
    ///
    /// `line` is 1-based and points at the farthest position any parse
    /// attempt reached.
    #[error("syntax error (line {line})")]
    Syntax {
        /// Line of the farthest index reached
        line: usize,
    },

    /// The AST violates an invariant the grammar guarantees.
    #[error("codegen error: {0}")]
    Codegen(#[from] CodegenError),

    /// A constant index, jump offset or function id does not fit in a
    /// 2-byte operand.
    #[error("{what} {value} does not fit in a 16-bit operand")]
    OperandOverflow {
        /// Which operand overflowed
        what: &'static str,
        /// The offending value
        value: usize,
    },
}

/// A grammar/codegen contract violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A node that cannot be evaluated as an expression.
    #[error("unknown expression kind `{0}`")]
    UnknownExpression(&'static str),

    /// An operator with no opcode of its own reached the generic path.
    #[error("unknown operator `{0}`")]
    UnmappedOperator(BinaryOperator),

    /// An assignment whose left side is neither an identifier nor a subscript.
    #[error("invalid assignment target `{0}`")]
    InvalidAssignmentTarget(&'static str),

    /// A function literal that discovery never assigned an id to.
    #[error("function literal has no id")]
    UndiscoveredFunction,
}
