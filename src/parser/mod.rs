//! Loader for the JSON instruction document.
//!
//! The document is expected to look like
//!
//! ```json
//! { "language": "IPPcode24",
//!   "instructions": [ { "order": 1, "opcode": "WRITE",
//!                       "args": [ { "type": "string", "value": "hi" } ] } ] }
//! ```
//!
//! Only the shape is checked here. Orders are validated and sorted by
//! [`crate::processor::program`].

use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, VmError};
use crate::model::{Argument, Instruction, Opcode};

pub const LANGUAGE: &str = "IPPcode24";

/// Immediately-after-parse representation (raw, 1-to-1 with JSON).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProgram {
    #[serde(default)]
    pub language: Option<String>,
    pub instructions: Vec<RawInstruction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawInstruction {
    pub order: i64,
    pub opcode: String,
    #[serde(default)]
    pub args: Vec<RawArg>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawArg {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: String,
}

/// Parse the whole document into instruction records, in document order.
pub fn load(json: &str) -> Result<Vec<Instruction>> {
    let raw: RawProgram =
        serde_json::from_str(json).map_err(|e| VmError::SourceFormat(e.to_string()))?;

    debug!(instructions = raw.instructions.len(), "document parsed");

    if let Some(lang) = &raw.language {
        if !lang.eq_ignore_ascii_case(LANGUAGE) {
            return Err(VmError::Structure(format!("unsupported language `{lang}`")));
        }
    }

    raw.instructions.iter().map(to_instruction).collect()
}

fn to_instruction(raw: &RawInstruction) -> Result<Instruction> {
    let opcode = Opcode::from_name(raw.opcode.trim()).ok_or_else(|| {
        VmError::Structure(format!("unknown opcode `{}` (order {})", raw.opcode, raw.order))
    })?;

    let args = raw
        .args
        .iter()
        .map(|a| Argument::from_text(&a.kind, &a.value))
        .collect::<Result<Vec<_>>>()?;

    Instruction::new(raw.order, opcode, args)
}
