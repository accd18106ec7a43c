//! Value-level semantics of the operator opcodes.
//!
//! Operands reaching these functions have already been resolved. An
//! unassigned variable is always an operand-type error.

use std::cmp::Ordering;

use crate::error::{Result, VmError};
use crate::model::{Opcode, Value};

fn type_error(op: Opcode, a: &Value, b: &Value) -> VmError {
    VmError::OperandType(format!(
        "{op} cannot take operands of type `{}` and `{}`",
        a.type_name(),
        b.type_name()
    ))
}

fn defined(op: Opcode, v: &Value) -> Result<()> {
    if v.is_uninit() {
        return Err(VmError::OperandType(format!(
            "{op} operand is an uninitialized variable"
        )));
    }
    Ok(())
}

/// ADD, SUB, MUL and IDIV. Overflow wraps; IDIV truncates toward zero.
pub fn arithmetic(op: Opcode, a: &Value, b: &Value) -> Result<Value> {
    let (Value::Int(x), Value::Int(y)) = (a, b) else {
        return Err(type_error(op, a, b));
    };

    let result = match op {
        Opcode::Add => x.wrapping_add(*y),
        Opcode::Sub => x.wrapping_sub(*y),
        Opcode::Mul => x.wrapping_mul(*y),
        Opcode::IDiv => {
            if *y == 0 {
                return Err(VmError::OperandValue("division by zero".into()));
            }
            x.wrapping_div(*y)
        }
        other => unreachable!("{other} is not arithmetic"),
    };

    Ok(Value::Int(result))
}

/// LT and GT: same type, never nil.
pub fn relational(op: Opcode, a: &Value, b: &Value) -> Result<Value> {
    defined(op, a)?;
    defined(op, b)?;
    if a.is_nil() || b.is_nil() {
        return Err(VmError::OperandType(format!("{op} cannot compare nil")));
    }

    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        _ => return Err(type_error(op, a, b)),
    };

    let result = match op {
        Opcode::Lt => ordering == Ordering::Less,
        Opcode::Gt => ordering == Ordering::Greater,
        other => unreachable!("{other} is not relational"),
    };

    Ok(Value::Bool(result))
}

/// EQ: nil compares against anything, otherwise types must match.
pub fn equals(a: &Value, b: &Value) -> Result<bool> {
    defined(Opcode::Eq, a)?;
    defined(Opcode::Eq, b)?;
    if a.is_nil() || b.is_nil() {
        return Ok(a == b);
    }
    if !a.same_type(b) {
        return Err(type_error(Opcode::Eq, a, b));
    }
    Ok(a == b)
}

/// JUMPIFEQ / JUMPIFNEQ comparison: types must match, nil included.
pub fn jump_equals(op: Opcode, a: &Value, b: &Value) -> Result<bool> {
    defined(op, a)?;
    defined(op, b)?;
    if !a.same_type(b) {
        return Err(type_error(op, a, b));
    }
    Ok(a == b)
}

/// AND and OR.
pub fn logical(op: Opcode, a: &Value, b: &Value) -> Result<Value> {
    let (Value::Bool(x), Value::Bool(y)) = (a, b) else {
        return Err(type_error(op, a, b));
    };

    let result = match op {
        Opcode::And => *x && *y,
        Opcode::Or => *x || *y,
        other => unreachable!("{other} is not logical"),
    };

    Ok(Value::Bool(result))
}

pub fn not(a: &Value) -> Result<Value> {
    match a {
        Value::Bool(x) => Ok(Value::Bool(!x)),
        other => Err(VmError::OperandType(format!(
            "NOT cannot take operand of type `{}`",
            other.type_name()
        ))),
    }
}

pub fn int2char(a: &Value) -> Result<Value> {
    let Value::Int(code) = a else {
        return Err(VmError::OperandType(format!(
            "INT2CHAR cannot take operand of type `{}`",
            a.type_name()
        )));
    };

    u8::try_from(*code)
        .map(|byte| Value::Str(char::from(byte).to_string()))
        .map_err(|_| VmError::StringOperation(format!("{code} is not a valid character code")))
}

/// Checks `0 <= index < len` and returns the index as usize.
fn char_index(op: Opcode, text: &str, index: i64) -> Result<usize> {
    let len = text.chars().count();
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| {
            VmError::StringOperation(format!(
                "{op} index {index} out of range for string of length {len}"
            ))
        })
}

fn string_and_index<'v>(op: Opcode, a: &'v Value, b: &Value) -> Result<(&'v str, usize)> {
    let (Value::Str(text), Value::Int(index)) = (a, b) else {
        return Err(type_error(op, a, b));
    };
    Ok((text.as_str(), char_index(op, text, *index)?))
}

pub fn stri2int(a: &Value, b: &Value) -> Result<Value> {
    let (text, index) = string_and_index(Opcode::Stri2Int, a, b)?;
    let ch = text.chars().nth(index).unwrap_or_default();
    Ok(Value::Int(i64::from(u32::from(ch))))
}

pub fn getchar(a: &Value, b: &Value) -> Result<Value> {
    let (text, index) = string_and_index(Opcode::GetChar, a, b)?;
    let ch = text.chars().nth(index).unwrap_or_default();
    Ok(Value::Str(ch.to_string()))
}

/// SETCHAR: `target[index] = replacement[0]`.
pub fn setchar(target: &Value, index: &Value, replacement: &Value) -> Result<Value> {
    let Value::Str(text) = target else {
        return Err(VmError::OperandType(format!(
            "SETCHAR target must hold a string, holds `{}`",
            target.type_name()
        )));
    };
    let (Value::Int(index), Value::Str(replacement)) = (index, replacement) else {
        return Err(type_error(Opcode::SetChar, index, replacement));
    };

    let index = char_index(Opcode::SetChar, text, *index)?;
    let Some(new_char) = replacement.chars().next() else {
        return Err(VmError::StringOperation(
            "SETCHAR replacement string is empty".into(),
        ));
    };

    let result = text
        .chars()
        .enumerate()
        .map(|(i, c)| if i == index { new_char } else { c })
        .collect();

    Ok(Value::Str(result))
}

pub fn concat(a: &Value, b: &Value) -> Result<Value> {
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{x}{y}"))),
        _ => Err(type_error(Opcode::Concat, a, b)),
    }
}

pub fn strlen(a: &Value) -> Result<Value> {
    match a {
        Value::Str(text) => Ok(Value::Int(text.chars().count() as i64)),
        other => Err(VmError::OperandType(format!(
            "STRLEN cannot take operand of type `{}`",
            other.type_name()
        ))),
    }
}
