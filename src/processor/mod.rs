//! The execution core: program loading, frames, stacks, operator semantics
//! and the dispatch engine.
pub mod frame;
pub mod operators;
pub mod program;
pub mod stack;
pub mod vm;

pub use program::Program;
pub use vm::{Io, Vm};

use crate::error::Result;
use crate::model::Instruction;
use tracing::info;

/// Sorts and label-resolves `instructions`, then runs them to completion.
pub fn run(instructions: Vec<Instruction>, io: Io<'_>) -> Result<i32> {
    let program = Program::new(instructions)?;
    let mut vm = Vm::new(&program, io);
    let status = vm.run()?;
    info!(status, completed = vm.completed(), "program finished");
    Ok(status)
}
