//! Bytecode definitions.
//!
//! Instructions are kept structured (an [`OpCode`] plus an optional typed
//! [`Operand`]) and only flattened at the VM boundary by
//! [`Function::encode`]: one byte per opcode followed, when present, by a
//! 2-byte big-endian operand. Jump operands are absolute offsets into that
//! flat stream.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use thiserror::Error;

/// Operation codes for the VM, with their stack effects.
///
/// The discriminant is the opcode byte in the flat encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    // Control
    /// `[.., value]` -> returns `value` from the activation
    Return,
    /// `[.., callee, arg]` -> `[.., result]`
    Call,
    /// Jumps to the operand offset
    Goto,
    /// `[.., cond]` -> `[..]`; jumps to the operand offset if `cond` is truthy
    GotoIf,

    // Stack manipulation
    /// `[.., a]` -> `[.., a, a]`
    Dup,
    /// `[.., a]` -> `[..]`
    Pop,
    /// `[.., a, b]` -> `[.., b, a]`
    Rot,

    // Variables and constants
    /// Pushes the constant at the operand index
    LoadConst,
    /// Pushes `null`
    LoadNull,
    /// `[.., name]` -> `[.., value]`, looked up by name through the scope chain
    LoadVar,
    /// `[.., name, value]` -> `[..]`
    StoreVar,
    /// `[.., name]` -> `[..]`, declares `name` in the current scope
    DeclVar,
    /// Pushes a closure over the function with the operand id
    LoadFunc,

    // Collections
    /// `[.., object, key]` -> `[.., value]`
    Get,
    /// `[.., value, object, key]` -> `[..]`
    Set,
    /// Pushes `[]`
    LoadEmptyList,
    /// `[.., list, item]` -> `[.., list]`
    ListPush,
    /// Pushes `{}`
    LoadEmptyDict,
    /// `[.., dict, key, value]` -> `[.., dict]`
    DictPush,

    // Arithmetic: `[.., a, b]` -> `[.., a op b]`
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

    // Comparison: `[.., a, b]` -> `[.., a op b]`
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

    // Unary: `[.., a]` -> `[.., op a]`
    /// Logical not
    Not,
    /// Numeric negation
    UnaryMinus,
    /// Type name as a string
    TypeOf,
}

impl OpCode {
    /// Every opcode, in encoding order.
    pub const ALL: [OpCode; 34] = [
        OpCode::Return,
        OpCode::Call,
        OpCode::Goto,
        OpCode::GotoIf,
        OpCode::Dup,
        OpCode::Pop,
        OpCode::Rot,
        OpCode::LoadConst,
        OpCode::LoadNull,
        OpCode::LoadVar,
        OpCode::StoreVar,
        OpCode::DeclVar,
        OpCode::LoadFunc,
        OpCode::Get,
        OpCode::Set,
        OpCode::LoadEmptyList,
        OpCode::ListPush,
        OpCode::LoadEmptyDict,
        OpCode::DictPush,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Mod,
        OpCode::Eq,
        OpCode::Neq,
        OpCode::Lt,
        OpCode::Gt,
        OpCode::Lte,
        OpCode::Gte,
        OpCode::In,
        OpCode::Not,
        OpCode::UnaryMinus,
        OpCode::TypeOf,
    ];

    /// The opcode's canonical name, as the VM host spells it.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Return => "return",
            OpCode::Call => "call",
            OpCode::Goto => "goto",
            OpCode::GotoIf => "goto_if",
            OpCode::Dup => "dup",
            OpCode::Pop => "pop",
            OpCode::Rot => "rot",
            OpCode::LoadConst => "load_const",
            OpCode::LoadNull => "load_null",
            OpCode::LoadVar => "load_var",
            OpCode::StoreVar => "store_var",
            OpCode::DeclVar => "decl_var",
            OpCode::LoadFunc => "load_func",
            OpCode::Get => "get",
            OpCode::Set => "set",
            OpCode::LoadEmptyList => "load_empty_list",
            OpCode::ListPush => "list_push",
            OpCode::LoadEmptyDict => "load_empty_dict",
            OpCode::DictPush => "dict_push",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Mod => "mod",
            OpCode::Eq => "eq",
            OpCode::Neq => "neq",
            OpCode::Lt => "lt",
            OpCode::Gt => "gt",
            OpCode::Lte => "lte",
            OpCode::Gte => "gte",
            OpCode::In => "in",
            OpCode::Not => "not",
            OpCode::UnaryMinus => "unary_minus",
            OpCode::TypeOf => "typeof",
        }
    }

    /// Looks an opcode up by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Decodes an opcode byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(usize::from(byte)).copied()
    }

    /// Whether the opcode is followed by a 2-byte operand.
    pub fn has_operand(self) -> bool {
        matches!(
            self,
            OpCode::LoadConst | OpCode::LoadFunc | OpCode::Goto | OpCode::GotoIf
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An opcode name that is not part of the instruction set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown opcode `{0}`")]
pub struct UnknownOpCode(pub String);

impl FromStr for OpCode {
    type Err = UnknownOpCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownOpCode(s.to_owned()))
    }
}

/// Instruction operands. All of them encode as a big-endian `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Constant pool index
    Constant(u16),
    /// Absolute byte offset into the function's flat code
    Jump(u16),
    /// Function table index
    Function(u16),
}

impl Operand {
    /// The raw operand value.
    pub fn value(self) -> u16 {
        match self {
            Operand::Constant(v) | Operand::Jump(v) | Operand::Function(v) => v,
        }
    }
}

/// A single bytecode instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation code
    pub opcode: OpCode,
    /// Optional operand
    pub operand: Option<Operand>,
}

impl Instruction {
    /// Creates a new instruction with no operand.
    pub fn simple(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    /// Creates a new instruction with an operand.
    pub fn with_operand(opcode: OpCode, operand: Operand) -> Self {
        Self {
            opcode,
            operand: Some(operand),
        }
    }

    /// Size of the instruction in the flat encoding.
    pub fn encoded_len(&self) -> usize {
        if self.operand.is_some() {
            3
        } else {
            1
        }
    }
}

/// A literal value in a constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Constant {
    /// A string literal or a variable name
    String(String),
    /// An integer literal
    Integer(i64),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::String(s) => write!(f, "'{}'", s.escape_default()),
            Constant::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// One element of the name-tagged code stream: opcode names interleaved
/// with raw operand bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Word {
    /// An opcode, serialized by name
    Op(OpCode),
    /// An operand byte
    Byte(u8),
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Word::Op(op) => serializer.serialize_str(op.name()),
            Word::Byte(b) => serializer.serialize_u8(*b),
        }
    }
}

/// A compiled function body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    /// The constant pool, in first-use order, never deduplicated
    pub consts: Vec<Constant>,
    /// The instructions
    pub code: Vec<Instruction>,
    /// Name the call argument is bound to, if the function has a parameter
    pub param_name: Option<String>,
}

impl Function {
    /// Length of the flat encoding in bytes.
    pub fn code_len(&self) -> usize {
        self.code.iter().map(Instruction::encoded_len).sum()
    }

    /// Flattens the instructions into the VM byte stream.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.code_len());
        for instruction in &self.code {
            bytes.push(instruction.opcode as u8);
            if let Some(operand) = instruction.operand {
                bytes.extend_from_slice(&operand.value().to_be_bytes());
            }
        }
        bytes
    }

    /// The name-tagged stream: same layout as [`encode`](Self::encode) but
    /// with opcodes kept by name.
    pub fn words(&self) -> Vec<Word> {
        let mut words = Vec::with_capacity(self.code_len());
        for instruction in &self.code {
            words.push(Word::Op(instruction.opcode));
            if let Some(operand) = instruction.operand {
                let [hi, lo] = operand.value().to_be_bytes();
                words.push(Word::Byte(hi));
                words.push(Word::Byte(lo));
            }
        }
        words
    }
}

impl Serialize for Function {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.param_name.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Function", fields)?;
        state.serialize_field("consts", &self.consts)?;
        state.serialize_field("code", &self.words())?;
        if let Some(param) = &self.param_name {
            state.serialize_field("paramName", param)?;
        }
        state.end()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut offset = 0;
        for instruction in &self.code {
            write!(f, "{:04}  {}", offset, instruction.opcode)?;
            match instruction.operand {
                Some(Operand::Constant(index)) => {
                    write!(f, " {}", index)?;
                    if let Some(value) = self.consts.get(usize::from(index)) {
                        write!(f, "  ; {}", value)?;
                    }
                }
                Some(Operand::Jump(target)) => write!(f, " -> {:04}", target)?,
                Some(Operand::Function(id)) => write!(f, " #{}", id)?,
                None => {}
            }
            writeln!(f)?;
            offset += instruction.encoded_len();
        }
        Ok(())
    }
}

/// Every compiled function of a program, indexed by id. Entry 0 is the
/// program itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FunctionTable {
    functions: Vec<Function>,
}

impl FunctionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next function; its id is the current length.
    pub fn push(&mut self, function: Function) -> usize {
        let id = self.functions.len();
        self.functions.push(function);
        id
    }

    /// Number of functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the table is empty. A compiled program never is.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// The function with the given id.
    pub fn get(&self, id: usize) -> Option<&Function> {
        self.functions.get(id)
    }

    /// The entry point.
    ///
    /// # Panics
    ///
    /// Panics if the table is empty, which never happens for a table
    /// returned by the compiler. `get(0)` is the checked form.
    pub fn entry(&self) -> &Function {
        &self.functions[0]
    }

    /// Iterates over the functions in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Function> {
        self.functions.iter()
    }

    /// The functions as a plain vector.
    pub fn into_inner(self) -> Vec<Function> {
        self.functions
    }
}

/// Looks a function up by id.
///
/// # Panics
///
/// Panics if `id` is out of range, including on an empty table. Use
/// [`FunctionTable::get`] for a checked lookup.
impl Index<usize> for FunctionTable {
    type Output = Function;

    fn index(&self, id: usize) -> &Function {
        &self.functions[id]
    }
}

impl<'a> IntoIterator for &'a FunctionTable {
    type Item = &'a Function;
    type IntoIter = std::slice::Iter<'a, Function>;

    fn into_iter(self) -> Self::IntoIter {
        self.functions.iter()
    }
}

impl fmt::Display for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, function) in self.functions.iter().enumerate() {
            if id > 0 {
                writeln!(f)?;
            }
            match &function.param_name {
                Some(param) => writeln!(f, "== function {} (param: {}) ==", id, param)?,
                None => writeln!(f, "== function {} ==", id)?,
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Function {
        Function {
            consts: vec![Constant::String("x".into()), Constant::Integer(7)],
            code: vec![
                Instruction::with_operand(OpCode::LoadConst, Operand::Constant(1)),
                Instruction::with_operand(OpCode::GotoIf, Operand::Jump(0x0104)),
                Instruction::simple(OpCode::LoadNull),
                Instruction::simple(OpCode::Return),
            ],
            param_name: Some("n".into()),
        }
    }

    #[test]
    fn test_opcode_names_round_trip() {
        for op in OpCode::ALL {
            assert_eq!(OpCode::from_name(op.name()), Some(op));
        }
        assert_eq!(OpCode::from_name("halt"), None);
        assert_eq!("goto_if".parse::<OpCode>(), Ok(OpCode::GotoIf));
        assert_eq!(
            "halt".parse::<OpCode>().unwrap_err().to_string(),
            "unknown opcode `halt`"
        );
    }

    #[test]
    fn test_opcode_bytes_match_declaration_order() {
        for (i, op) in OpCode::ALL.into_iter().enumerate() {
            assert_eq!(op as usize, i);
            assert_eq!(OpCode::from_byte(i as u8), Some(op));
        }
        assert_eq!(OpCode::from_byte(OpCode::ALL.len() as u8), None);
    }

    #[test]
    fn test_encode_big_endian_operands() {
        let bytes = sample().encode();
        assert_eq!(
            bytes,
            vec![
                OpCode::LoadConst as u8,
                0,
                1,
                OpCode::GotoIf as u8,
                0x01,
                0x04,
                OpCode::LoadNull as u8,
                OpCode::Return as u8,
            ]
        );
        assert_eq!(sample().code_len(), bytes.len());
    }

    #[test]
    fn test_words_keep_opcode_names() {
        let words = sample().words();
        assert_eq!(words[0], Word::Op(OpCode::LoadConst));
        assert_eq!(&words[1..3], &[Word::Byte(0), Word::Byte(1)]);
        assert_eq!(words.len(), sample().code_len());
    }

    #[test]
    fn test_constant_display() {
        assert_eq!(Constant::String("a'b\n".into()).to_string(), r"'a\'b\n'");
        assert_eq!(Constant::Integer(42).to_string(), "42");
    }

    #[test]
    fn test_disassembly() {
        let listing = sample().to_string();
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines[0], "0000  load_const 1  ; 7");
        assert_eq!(lines[1], "0003  goto_if -> 0260");
        assert_eq!(lines[2], "0006  load_null");
        assert_eq!(lines[3], "0007  return");
    }

    #[test]
    fn test_table_display_headers() {
        let mut table = FunctionTable::new();
        table.push(Function::default());
        table.push(sample());
        let listing = table.to_string();
        assert!(listing.starts_with("== function 0 ==\n"));
        assert!(listing.contains("== function 1 (param: n) ==\n"));
    }

    #[test]
    fn test_table_lookup_by_id() {
        let mut table = FunctionTable::new();
        assert_eq!(table.get(0), None);
        table.push(sample());
        assert_eq!(table.get(0), Some(&sample()));
        assert_eq!(table[0], sample());
        assert_eq!(table.get(1), None);
    }

    #[test]
    #[should_panic]
    fn test_entry_of_empty_table_panics() {
        FunctionTable::new().entry();
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range_panics() {
        let table = FunctionTable::new();
        let _ = &table[0];
    }
}
