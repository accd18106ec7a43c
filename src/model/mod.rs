//! Data model shared by the loader and the engine: values, operands and
//! instructions.

pub mod opcode;

pub use opcode::{Opcode, Operand};

use crate::error::{Result, VmError};
use std::fmt;

/// A runtime value. Every value is a scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Nil,
    /// Declared but never assigned. Distinct from `Nil`.
    Uninit,
}

impl Value {
    /// Name reported by `TYPE`; empty for an unassigned variable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Uninit => "",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_uninit(&self) -> bool {
        matches!(self, Value::Uninit)
    }

    /// True when both values carry the same runtime type.
    pub fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// `type@value` form used by the BREAK dump.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "int@{i}"),
            Value::Bool(b) => write!(f, "bool@{b}"),
            Value::Str(s) => write!(f, "string@{s}"),
            Value::Nil => f.write_str("nil@nil"),
            Value::Uninit => f.write_str("(uninitialized)"),
        }
    }
}

/// The primitive types `READ` can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Bool,
    String,
}

impl DataType {
    pub fn parse(text: &str) -> Result<DataType> {
        match text {
            "int" => Ok(DataType::Int),
            "bool" => Ok(DataType::Bool),
            "string" => Ok(DataType::String),
            other => Err(VmError::Structure(format!("unknown type `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTag {
    Global,
    Local,
    Temporary,
}

impl fmt::Display for FrameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameTag::Global => "GF",
            FrameTag::Local => "LF",
            FrameTag::Temporary => "TF",
        })
    }
}

/// A `tag@name` variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRef {
    pub frame: FrameTag,
    pub name: String,
}

impl VarRef {
    pub fn parse(text: &str) -> Result<VarRef> {
        let (tag, name) = text
            .split_once('@')
            .ok_or_else(|| VmError::Structure(format!("`{text}` is not a variable")))?;

        let frame = match tag {
            "GF" => FrameTag::Global,
            "LF" => FrameTag::Local,
            "TF" => FrameTag::Temporary,
            other => return Err(VmError::Structure(format!("unknown frame `{other}`"))),
        };

        if name.is_empty() {
            return Err(VmError::Structure(format!("`{text}` has no variable name")));
        }

        Ok(VarRef {
            frame,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Variable,
    Label,
    ConstInt,
    ConstBool,
    ConstString,
    ConstNil,
    Type,
}

/// One instruction operand, already converted to its typed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Var(VarRef),
    Label(String),
    /// Int, Bool, Str or Nil literal. Strings keep their escapes.
    Const(Value),
    Type(DataType),
}

impl Argument {
    /// Builds an argument from its document form (`type` attribute + text).
    pub fn from_text(kind: &str, text: &str) -> Result<Argument> {
        match kind {
            "int" => parse_int(text.trim()).map(|i| Argument::Const(Value::Int(i))),
            "bool" => match text.trim() {
                "true" => Ok(Argument::Const(Value::Bool(true))),
                "false" => Ok(Argument::Const(Value::Bool(false))),
                other => Err(VmError::Structure(format!("invalid bool literal `{other}`"))),
            },
            "string" => Ok(Argument::Const(Value::Str(text.to_string()))),
            "nil" => match text.trim() {
                "nil" | "" => Ok(Argument::Const(Value::Nil)),
                other => Err(VmError::Structure(format!("invalid nil literal `{other}`"))),
            },
            "var" => VarRef::parse(text.trim()).map(Argument::Var),
            "label" => {
                let name = text.trim();
                if name.is_empty() {
                    return Err(VmError::Structure("empty label name".into()));
                }
                Ok(Argument::Label(name.to_string()))
            }
            "type" => DataType::parse(text.trim()).map(Argument::Type),
            other => Err(VmError::Structure(format!("unknown argument kind `{other}`"))),
        }
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            Argument::Var(_) => ArgKind::Variable,
            Argument::Label(_) => ArgKind::Label,
            Argument::Type(_) => ArgKind::Type,
            Argument::Const(Value::Int(_)) => ArgKind::ConstInt,
            Argument::Const(Value::Bool(_)) => ArgKind::ConstBool,
            Argument::Const(Value::Str(_)) => ArgKind::ConstString,
            Argument::Const(Value::Nil | Value::Uninit) => ArgKind::ConstNil,
        }
    }

    fn fits(&self, slot: Operand) -> bool {
        match (slot, self) {
            (Operand::Var, Argument::Var(_)) => true,
            (Operand::Symb, Argument::Var(_) | Argument::Const(_)) => true,
            (Operand::Label, Argument::Label(_)) => true,
            (Operand::Type, Argument::Type(_)) => true,
            _ => false,
        }
    }
}

fn parse_int(text: &str) -> Result<i64> {
    text.parse::<i64>()
        .map_err(|_| VmError::Structure(format!("invalid int literal `{text}`")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub order: i64,
    pub opcode: Opcode,
    pub args: Vec<Argument>,
}

impl Instruction {
    /// Creates an instruction, rejecting operands that do not match the
    /// opcode's signature.
    pub fn new(order: i64, opcode: Opcode, args: Vec<Argument>) -> Result<Instruction> {
        let ins = Instruction {
            order,
            opcode,
            args,
        };
        ins.check()?;
        Ok(ins)
    }

    /// Checks the operands against the opcode's signature.
    pub fn check(&self) -> Result<()> {
        let Instruction {
            order,
            opcode,
            args,
        } = self;
        let expected = opcode.operands();
        if args.len() != expected.len() {
            return Err(VmError::Structure(format!(
                "{opcode} (order {order}) takes {} operands, got {}",
                expected.len(),
                args.len()
            )));
        }

        for (pos, (arg, slot)) in args.iter().zip(expected).enumerate() {
            if !arg.fits(*slot) {
                return Err(VmError::Structure(format!(
                    "{opcode} (order {order}) operand {} expects {slot:?}, got {:?}",
                    pos + 1,
                    arg.kind()
                )));
            }
        }
        Ok(())
    }
}
