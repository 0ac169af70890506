//! Code generation from AST to bytecode.
//!
//! [`FunctionCompiler`] lowers one function body at a time into a constant
//! pool and an instruction stream. Nested function literals are not
//! compiled inline; they become a `load_func` of the id discovery gave them.
//!
//! ## Control Flow Compilation
//!
//! ### While Loop
//!
//! ```text
//! start:
//!   [condition]
//!   not
//!   goto_if -> end
//!   [body]
//!   goto -> start
//! end:
//! ```
//!
//! ### Short-circuit `&&` / `||`
//!
//! ```text
//!   [left]
//!   dup
//!   not            ; only for &&
//!   goto_if -> end
//!   pop
//!   [right]
//! end:
//! ```
//!
//! Forward jumps are emitted with a zero placeholder and patched once the
//! target offset is known.


use crate::ast::*;
use crate::compiler::bytecode::{Constant, Function, Instruction, OpCode, Operand};
use crate::compiler::discovery::FunctionIds;
use crate::{CodegenError, Error, Result};

impl BinaryOperator {
    /// The opcode of a plain binary operator. `&&` and `||` have none since
    /// they compile to jumps.
    pub fn opcode(self) -> Option<OpCode> {
        Some(match self {
            BinaryOperator::Add => OpCode::Add,
            BinaryOperator::Sub => OpCode::Sub,
            BinaryOperator::Mul => OpCode::Mul,
            BinaryOperator::Div => OpCode::Div,
            BinaryOperator::Mod => OpCode::Mod,
            BinaryOperator::Eq => OpCode::Eq,
            BinaryOperator::Neq => OpCode::Neq,
            BinaryOperator::Lt => OpCode::Lt,
            BinaryOperator::Gt => OpCode::Gt,
            BinaryOperator::Lte => OpCode::Lte,
            BinaryOperator::Gte => OpCode::Gte,
            BinaryOperator::In => OpCode::In,
            BinaryOperator::Call => OpCode::Call,
            BinaryOperator::And | BinaryOperator::Or => return None,
        })
    }
}

impl UnaryOperator {
    /// The opcode of a prefix operator.
    pub fn opcode(self) -> OpCode {
        match self {
            UnaryOperator::Minus => OpCode::UnaryMinus,
            UnaryOperator::Not => OpCode::Not,
            UnaryOperator::TypeOf => OpCode::TypeOf,
        }
    }
}

/// Compiles a single function body.
pub struct FunctionCompiler<'a, 'ast> {
    ids: &'a FunctionIds<'ast>,
    function: Function,
    /// Byte offset of the next instruction in the flat encoding
    offset: usize,
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// Creates a compiler resolving function literals through `ids`.
    pub fn new(ids: &'a FunctionIds<'ast>) -> Self {
        Self {
            ids,
            function: Function::default(),
            offset: 0,
        }
    }

    /// Compiles `body` and appends the trailing `load_null; return`.
    pub fn compile(mut self, param: Option<&str>, body: &[Node]) -> Result<Function> {
        self.compile_statements(body)?;
        self.emit(Instruction::simple(OpCode::LoadNull));
        self.emit(Instruction::simple(OpCode::Return));
        self.function.param_name = param.map(str::to_owned);
        Ok(self.function)
    }

    // ========================================================================
    // Statement Compilation
    // ========================================================================

    fn compile_statements(&mut self, statements: &[Node]) -> Result<()> {
        statements
            .iter()
            .try_for_each(|stmt| self.compile_statement(stmt))
    }

    fn compile_statement(&mut self, stmt: &Node) -> Result<()> {
        match stmt {
            Node::Var(var) => self.compile_var(var),
            Node::Return(value) => {
                self.compile_expression(value)?;
                self.emit(Instruction::simple(OpCode::Return));
                Ok(())
            }
            Node::While(lp) => self.compile_while(lp),
            Node::If(cond) => self.compile_if(cond),
            expr => {
                self.compile_expression(expr)?;
                // Expression statements run for their side effects only.
                self.emit(Instruction::simple(OpCode::Pop));
                Ok(())
            }
        }
    }

    /// The name is declared before the initializer runs, so the initializer
    /// can refer to it.
    fn compile_var(&mut self, var: &VarDeclaration) -> Result<()> {
        self.load_const(Constant::String(var.name.clone()))?;
        self.emit(Instruction::simple(OpCode::Dup));
        self.emit(Instruction::simple(OpCode::DeclVar));
        self.compile_expression(&var.value)?;
        self.emit(Instruction::simple(OpCode::StoreVar));
        Ok(())
    }

    fn compile_while(&mut self, lp: &Loop) -> Result<()> {
        let loop_start = self.jump_target()?;
        self.compile_expression(&lp.cond)?;
        self.emit(Instruction::simple(OpCode::Not));
        let jump_to_end = self.emit_jump(OpCode::GotoIf);
        self.compile_statements(&lp.children)?;
        self.emit(Instruction::with_operand(OpCode::Goto, Operand::Jump(loop_start)));
        self.patch_jump(jump_to_end)
    }

    fn compile_if(&mut self, cond: &Conditional) -> Result<()> {
        self.compile_expression(&cond.cond)?;
        self.emit(Instruction::simple(OpCode::Not));
        let jump_to_end = self.emit_jump(OpCode::GotoIf);
        self.compile_statements(&cond.children)?;
        self.patch_jump(jump_to_end)
    }

    // ========================================================================
    // Expression Compilation
    // ========================================================================

    fn compile_expression(&mut self, expr: &Node) -> Result<()> {
        match expr {
            Node::String(s) => self.load_const(Constant::String(s.clone())),
            Node::Number(n) => self.load_const(Constant::Integer(*n)),
            Node::Null => {
                self.emit(Instruction::simple(OpCode::LoadNull));
                Ok(())
            }
            Node::Identifier(name) => {
                self.load_const(Constant::String(name.clone()))?;
                self.emit(Instruction::simple(OpCode::LoadVar));
                Ok(())
            }
            Node::Assignment(assign) => self.compile_assignment(assign),
            Node::BinaryOp(bin) => self.compile_binary(bin),
            Node::UnaryOp(un) => {
                self.compile_expression(&un.right)?;
                self.emit(Instruction::simple(un.op.opcode()));
                Ok(())
            }
            Node::Subscript(sub) => {
                self.compile_expression(&sub.left)?;
                self.compile_expression(&sub.right)?;
                self.emit(Instruction::simple(OpCode::Get));
                Ok(())
            }
            Node::List(items) => {
                self.emit(Instruction::simple(OpCode::LoadEmptyList));
                for item in items {
                    self.compile_expression(item)?;
                    self.emit(Instruction::simple(OpCode::ListPush));
                }
                Ok(())
            }
            Node::Dict(entries) => {
                self.emit(Instruction::simple(OpCode::LoadEmptyDict));
                for entry in entries {
                    self.load_const(Constant::String(entry.key.clone()))?;
                    self.compile_expression(&entry.value)?;
                    self.emit(Instruction::simple(OpCode::DictPush));
                }
                Ok(())
            }
            Node::Function(function) => {
                let id = self
                    .ids
                    .id_of(function)
                    .ok_or(CodegenError::UndiscoveredFunction)?;
                self.emit(Instruction::with_operand(OpCode::LoadFunc, Operand::Function(id)));
                Ok(())
            }
            Node::Var(_) | Node::Return(_) | Node::While(_) | Node::If(_) => {
                Err(CodegenError::UnknownExpression(expr.kind()).into())
            }
        }
    }

    /// The assigned value is duplicated so that it stays on the stack as
    /// the value of the assignment itself.
    fn compile_assignment(&mut self, assign: &Assignment) -> Result<()> {
        match assign.left.as_ref() {
            Node::Identifier(name) => {
                self.compile_expression(&assign.right)?;
                self.emit(Instruction::simple(OpCode::Dup));
                self.load_const(Constant::String(name.clone()))?;
                self.emit(Instruction::simple(OpCode::Rot));
                self.emit(Instruction::simple(OpCode::StoreVar));
                Ok(())
            }
            Node::Subscript(target) => {
                self.compile_expression(&assign.right)?;
                self.emit(Instruction::simple(OpCode::Dup));
                self.compile_expression(&target.left)?;
                self.compile_expression(&target.right)?;
                self.emit(Instruction::simple(OpCode::Set));
                Ok(())
            }
            other => Err(CodegenError::InvalidAssignmentTarget(other.kind()).into()),
        }
    }

    fn compile_binary(&mut self, bin: &BinaryOp) -> Result<()> {
        match bin.op {
            BinaryOperator::And | BinaryOperator::Or => self.compile_logical(bin),
            _ => self.compile_operator(bin),
        }
    }

    fn compile_operator(&mut self, bin: &BinaryOp) -> Result<()> {
        self.compile_expression(&bin.left)?;
        self.compile_expression(&bin.right)?;
        let opcode = bin
            .op
            .opcode()
            .ok_or(CodegenError::UnmappedOperator(bin.op))?;
        self.emit(Instruction::simple(opcode));
        Ok(())
    }

    /// Leaves the left value when it decides the outcome, otherwise the
    /// right value.
    fn compile_logical(&mut self, bin: &BinaryOp) -> Result<()> {
        self.compile_expression(&bin.left)?;
        self.emit(Instruction::simple(OpCode::Dup));
        if bin.op == BinaryOperator::And {
            self.emit(Instruction::simple(OpCode::Not));
        }
        let jump_to_end = self.emit_jump(OpCode::GotoIf);
        self.emit(Instruction::simple(OpCode::Pop));
        self.compile_expression(&bin.right)?;
        self.patch_jump(jump_to_end)
    }

    // ========================================================================
    // Emission helpers
    // ========================================================================

    fn emit(&mut self, instruction: Instruction) -> usize {
        let index = self.function.code.len();
        self.offset += instruction.encoded_len();
        self.function.code.push(instruction);
        index
    }

    fn load_const(&mut self, value: Constant) -> Result<()> {
        let index = self.function.consts.len();
        let index = u16::try_from(index).map_err(|_| Error::OperandOverflow {
            what: "constant index",
            value: index,
        })?;
        self.function.consts.push(value);
        self.emit(Instruction::with_operand(OpCode::LoadConst, Operand::Constant(index)));
        Ok(())
    }

    /// Emits a forward jump with a placeholder target.
    fn emit_jump(&mut self, opcode: OpCode) -> usize {
        self.emit(Instruction::with_operand(opcode, Operand::Jump(0)))
    }

    /// Points the jump at `index` to the next instruction.
    fn patch_jump(&mut self, index: usize) -> Result<()> {
        let target = self.jump_target()?;
        self.function.code[index].operand = Some(Operand::Jump(target));
        Ok(())
    }

    fn jump_target(&self) -> Result<u16> {
        u16::try_from(self.offset).map_err(|_| Error::OperandOverflow {
            what: "jump offset",
            value: self.offset,
        })
    }
}
