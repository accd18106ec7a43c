use clap::Parser;
use std::path::PathBuf;

use crate::error::VmError;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Instruction document (.json); read from stdin when omitted
    #[arg(long)]
    pub source: Option<PathBuf>,
    /// Input for READ; read from stdin when omitted
    #[arg(long)]
    pub input: Option<PathBuf>,
}

impl Cli {
    /// Only one of the two streams can come from stdin.
    pub fn validate(&self) -> Result<(), VmError> {
        if self.source.is_none() && self.input.is_none() {
            return Err(VmError::Parameter(
                "at least one of --source and --input is required".into(),
            ));
        }
        Ok(())
    }
}
