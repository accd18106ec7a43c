//! Error taxonomy of the interpreter.
//!
//! Every failure the engine can raise maps to exactly one variant, and every
//! variant maps to a fixed process exit status.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmError>;

/// Exit status used when a failure is not a `VmError`.
pub const INTERNAL_ERROR: i32 = 99;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("invalid parameters: {0}")]
    Parameter(String),

    #[error("cannot read {0}")]
    InputFile(String),

    #[error("output failed: {0}")]
    Output(#[from] std::io::Error),

    #[error("malformed instruction document: {0}")]
    SourceFormat(String),

    #[error("invalid program structure: {0}")]
    Structure(String),

    #[error("semantic error: {0}")]
    Semantic(String),

    #[error("operand type error: {0}")]
    OperandType(String),

    #[error("variable access error: {0}")]
    VariableAccess(String),

    #[error("frame access error: {0}")]
    FrameAccess(String),

    #[error("missing value: {0}")]
    MissingValue(String),

    #[error("operand value error: {0}")]
    OperandValue(String),

    #[error("string operation error: {0}")]
    StringOperation(String),
}

impl VmError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            VmError::Parameter(_) => 10,
            VmError::InputFile(_) => 11,
            VmError::Output(_) => 12,
            VmError::SourceFormat(_) => 31,
            VmError::Structure(_) => 32,
            VmError::Semantic(_) => 52,
            VmError::OperandType(_) => 53,
            VmError::VariableAccess(_) => 54,
            VmError::FrameAccess(_) => 55,
            VmError::MissingValue(_) => 56,
            VmError::OperandValue(_) => 57,
            VmError::StringOperation(_) => 58,
        }
    }
}

/// Finds the first `VmError` in an `anyhow` chain and returns its status.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<VmError>())
        .map(VmError::exit_code)
        .unwrap_or(INTERNAL_ERROR)
}
