pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod reader;
pub mod writer;

use std::fs::File;
use std::io::{self, BufReader, Read};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::error::VmError;
use crate::processor::Io;
use crate::reader::{InputReader, LineReader};
use crate::writer::StreamWriter;

/// Loads a JSON instruction document and runs it against `io`.
pub fn execute(json: &str, io: Io<'_>) -> error::Result<i32> {
    let instructions = parser::load(json)?;
    processor::run(instructions, io)
}

/// Command-line entry point; returns the process status of the program.
pub fn run() -> anyhow::Result<i32> {
    let args = cli::Cli::parse();
    args.validate()?;

    // 1. ── Load ───────────────────────────────────────────────────────
    let json = match &args.source {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| VmError::InputFile(format!("{}: {e}", path.display())))?,
        None => {
            let mut json = String::new();
            io::stdin()
                .read_to_string(&mut json)
                .map_err(|e| VmError::InputFile(format!("stdin: {e}")))?;
            json
        }
    };
    info!(bytes = json.len(), "source loaded");

    let instructions = parser::load(&json).context("Parsing instruction document")?;
    info!(instructions = instructions.len(), "instructions parsed");

    // 2. ── Wire collaborators ─────────────────────────────────────────
    let mut input: Box<dyn InputReader> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| VmError::InputFile(format!("{}: {e}", path.display())))?;
            Box::new(LineReader::new(BufReader::new(file)))
        }
        None => Box::new(LineReader::new(io::stdin().lock())),
    };
    let mut stdout = StreamWriter::new(io::stdout().lock());
    let mut stderr = StreamWriter::new(io::stderr().lock());

    // 3. ── Execute ────────────────────────────────────────────────────
    let status = processor::run(
        instructions,
        Io {
            input: input.as_mut(),
            stdout: &mut stdout,
            stderr: &mut stderr,
        },
    )
    .context("Executing program")?;

    Ok(status)
}
