#![allow(dead_code)]

use std::io::Cursor;

use ippcode_vm::error::VmError;
use ippcode_vm::processor::Io;
use ippcode_vm::reader::LineReader;
use ippcode_vm::writer::StreamWriter;
use serde_json::{Value as JsonValue, json};

pub struct Outcome {
    pub status: Result<i32, VmError>,
    pub stdout: String,
    pub stderr: String,
}

/// Builds a document from a listing with one instruction per line, written
/// as `OPCODE kind@value kind@value`. Orders are numbered 1, 2, 3, ... and
/// blank lines are skipped.
pub fn program(listing: &str) -> String {
    let instructions: Vec<JsonValue> = listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            let mut words = line.split_whitespace();
            let opcode = words.next().unwrap_or_default();
            let args: Vec<JsonValue> = words
                .map(|word| {
                    let (kind, value) = word.split_once('@').unwrap_or((word, ""));
                    json!({ "type": kind, "value": value })
                })
                .collect();
            json!({ "order": i + 1, "opcode": opcode, "args": args })
        })
        .collect();

    json!({ "language": "IPPcode24", "instructions": instructions }).to_string()
}

pub fn run_json(json: &str, input: &str) -> Outcome {
    let mut reader = LineReader::new(Cursor::new(input.to_string()));
    let mut stdout = StreamWriter::new(Vec::new());
    let mut stderr = StreamWriter::new(Vec::new());

    let status = ippcode_vm::execute(
        json,
        Io {
            input: &mut reader,
            stdout: &mut stdout,
            stderr: &mut stderr,
        },
    );

    Outcome {
        status,
        stdout: String::from_utf8(stdout.into_inner()).expect("utf-8 stdout"),
        stderr: String::from_utf8(stderr.into_inner()).expect("utf-8 stderr"),
    }
}

pub fn run(listing: &str) -> Outcome {
    run_json(&program(listing), "")
}

pub fn run_with_input(listing: &str, input: &str) -> Outcome {
    run_json(&program(listing), input)
}

/// Exit status the binary would report.
pub fn code(outcome: &Outcome) -> i32 {
    match &outcome.status {
        Ok(status) => *status,
        Err(err) => err.exit_code(),
    }
}
