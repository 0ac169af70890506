//! Bytecode compiler for the toy language.
//!
//! Compilation is two passes over the AST:
//! 1. [`discovery`] numbers every function literal, the program being
//!    function 0
//! 2. [`codegen`] lowers each discovered body, in id order, into its own
//!    constant pool and instruction stream
//!
//! The output is a [`FunctionTable`] ready to be handed to the VM.

pub mod bytecode;
pub mod codegen;
pub mod discovery;

use tracing::{debug, trace};

use crate::ast::Program;
use crate::Result;
use bytecode::FunctionTable;
use codegen::FunctionCompiler;
use discovery::FunctionIds;

/// The bytecode compiler.
///
/// Holds no state between calls; every table is built from scratch.
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    /// Creates a new compiler.
    pub fn new() -> Self {
        Self
    }

    /// Compiles a program to its function table.
    pub fn compile(&self, program: &Program) -> Result<FunctionTable> {
        let mut table = FunctionTable::new();
        let ids = FunctionIds::discover(&program.body)?;
        debug!(
            statements = program.body.len(),
            functions = ids.len(),
            "compiling program"
        );

        for (id, discovered) in ids.functions().iter().enumerate() {
            let function =
                FunctionCompiler::new(&ids).compile(discovered.param, discovered.body)?;
            trace!(
                id,
                param = discovered.param,
                consts = function.consts.len(),
                bytes = function.code_len(),
                "compiled function"
            );
            table.push(function);
        }

        Ok(table)
    }
}
