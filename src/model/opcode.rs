//! The closed instruction set and the operand signature of every opcode.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // frames and calls
    Move,
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar,
    Call,
    Return,

    // operand stack
    PushS,
    PopS,

    // arithmetic, relational, logical, conversions
    Add,
    Sub,
    Mul,
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    Int2Char,
    Stri2Int,

    // i/o
    Read,
    Write,

    // strings
    Concat,
    StrLen,
    GetChar,
    SetChar,

    // types
    Type,

    // control flow
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    Exit,

    // debugging
    DPrint,
    Break,
}

/// What a single operand position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A variable reference.
    Var,
    /// A variable reference or any constant.
    Symb,
    Label,
    Type,
}

use self::Operand::{Label as L, Symb as S, Type as T, Var as V};

impl Opcode {
    /// Every opcode, in the order they are documented.
    pub const ALL: &'static [Opcode] = &[
        Opcode::Move,
        Opcode::CreateFrame,
        Opcode::PushFrame,
        Opcode::PopFrame,
        Opcode::DefVar,
        Opcode::Call,
        Opcode::Return,
        Opcode::PushS,
        Opcode::PopS,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::IDiv,
        Opcode::Lt,
        Opcode::Gt,
        Opcode::Eq,
        Opcode::And,
        Opcode::Or,
        Opcode::Not,
        Opcode::Int2Char,
        Opcode::Stri2Int,
        Opcode::Read,
        Opcode::Write,
        Opcode::Concat,
        Opcode::StrLen,
        Opcode::GetChar,
        Opcode::SetChar,
        Opcode::Type,
        Opcode::Label,
        Opcode::Jump,
        Opcode::JumpIfEq,
        Opcode::JumpIfNeq,
        Opcode::Exit,
        Opcode::DPrint,
        Opcode::Break,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Case-insensitive lookup by mnemonic.
    pub fn from_name(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    /// Operand kinds expected by this opcode, in order.
    pub fn operands(self) -> &'static [Operand] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::PopS => &[V],
            Opcode::Call | Opcode::Label | Opcode::Jump => &[L],
            Opcode::PushS | Opcode::Write | Opcode::Exit | Opcode::DPrint => &[S],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::StrLen
            | Opcode::Type => &[V, S],

            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
