// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # toy-compiler
//!
//! Compiles source text of the toy scripting language into bytecode for an
//! external stack-based virtual machine.
//!
//! ## Overview
//!
//! The pipeline has two halves:
//! - A backtracking recursive-descent parser (`lexer` + `parser`) producing
//!   a list of statement nodes (`ast`)
//! - A code generator (`compiler`) that discovers every function literal,
//!   assigns it a numeric id and lowers each body into a constant pool and
//!   an instruction stream
//!
//! The result is a [`FunctionTable`] whose entry 0 is the program itself.
//!
//! ## Quick Start
//!
//! ```rust
//! use toy_compiler::compile;
//!
//! let table = compile("var x = 1 + 2 * 3;").expect("Should compile");
//! assert_eq!(table.len(), 1);
//! println!("{}", table);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

mod error;

pub use compiler::bytecode::{
    Constant, Function, FunctionTable, Instruction, OpCode, Operand, UnknownOpCode,
};
pub use compiler::Compiler;
pub use error::{CodegenError, Error, Result};

/// Compiles a complete program into its function table.
///
/// Parsing and code generation run back to back; the first failure aborts
/// the whole compilation and no partial table is returned.
///
/// # Examples
///
/// ```rust
/// let table = toy_compiler::compile("print('hello');").unwrap();
/// assert_eq!(table.entry().param_name, None);
/// ```
pub fn compile(source: &str) -> Result<FunctionTable> {
    let program = parser::Parser::new(source).parse_program()?;
    Compiler::new().compile(&program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_empty_source() {
        let table = compile("").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.entry().code.last().map(|i| i.opcode),
            Some(OpCode::Return)
        );
    }

    #[test]
    fn test_compile_reports_syntax_line() {
        let err = compile("var x = 1;\nvar y = ;\n").unwrap_err();
        assert_eq!(err, Error::Syntax { line: 2 });
        assert_eq!(err.to_string(), "syntax error (line 2)");
    }

    #[test]
    fn test_compile_is_deterministic() {
        let src = "var f = function (n) { return n * 2; }; print(f(21));";
        assert_eq!(compile(src).unwrap(), compile(src).unwrap());
    }
}
