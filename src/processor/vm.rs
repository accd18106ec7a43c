//! The dispatch engine.
//!
//! A `Vm` owns every piece of interpreter state (frames, both stacks, the
//! program counter) and executes one instruction per step until the program
//! runs off its end, an EXIT executes, or an error is raised.

use tracing::{instrument, trace};

use super::frame::Frames;
use super::operators;
use super::program::Program;
use super::stack::Stack;
use crate::error::{Result, VmError};
use crate::model::{Argument, DataType, Instruction, Opcode, Value, VarRef};
use crate::reader::InputReader;
use crate::writer::{OutputWriter, decode_escapes};

/// The collaborators the engine reads from and writes to.
pub struct Io<'a> {
    pub input: &'a mut dyn InputReader,
    pub stdout: &'a mut dyn OutputWriter,
    pub stderr: &'a mut dyn OutputWriter,
}

/// Where execution continues after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Next,
    Jump(usize),
    Exit(i32),
}

#[derive(Debug, Clone, Copy)]
enum Sink {
    Stdout,
    Stderr,
}

pub struct Vm<'p, 'io> {
    program: &'p Program,
    io: Io<'io>,
    frames: Frames,
    calls: Stack<usize>,
    data: Stack<Value>,
    pc: usize,
    completed: u64,
}

impl<'p, 'io> Vm<'p, 'io> {
    pub fn new(program: &'p Program, io: Io<'io>) -> Self {
        Self {
            program,
            io,
            frames: Frames::new(),
            calls: Stack::new("call stack"),
            data: Stack::new("operand stack"),
            pc: 0,
            completed: 0,
        }
    }

    /// Runs to completion and returns the process status.
    #[instrument(skip(self), fields(instructions = self.program.len()))]
    pub fn run(&mut self) -> Result<i32> {
        let program = self.program;
        while let Some(ins) = program.get(self.pc) {
            trace!(pc = self.pc, order = ins.order, opcode = %ins.opcode, "step");

            let flow = self.step(ins)?;
            self.completed += 1;

            match flow {
                Flow::Next => self.pc += 1,
                Flow::Jump(target) => self.pc = target,
                Flow::Exit(code) => return Ok(code),
            }
        }
        Ok(0)
    }

    /// Number of instructions executed so far.
    pub fn completed(&self) -> u64 {
        self.completed
    }

    fn step(&mut self, ins: &'p Instruction) -> Result<Flow> {
        let args = ins.args.as_slice();

        match ins.opcode {
            Opcode::Move => {
                let value = self.copy_of(&args[1])?;
                self.store(&args[0], value)?;
            }
            Opcode::CreateFrame => self.frames.create_temporary(),
            Opcode::PushFrame => self.frames.push_temporary()?,
            Opcode::PopFrame => self.frames.pop_local()?,
            Opcode::DefVar => {
                let var = variable(&args[0])?;
                self.frames.declare(var)?;
            }

            Opcode::Call => {
                let target = self.label(&args[0])?;
                self.calls.push(self.pc + 1);
                return Ok(Flow::Jump(target));
            }
            Opcode::Return => {
                let target = self.calls.pop()?;
                return Ok(Flow::Jump(target));
            }

            Opcode::PushS => {
                let value = self.copy_of(&args[0])?;
                self.data.push(value);
            }
            Opcode::PopS => {
                let var = variable(&args[0])?;
                let value = self.data.pop()?;
                self.frames.store(var, value)?;
            }

            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::IDiv => {
                let (a, b) = self.operands(ins)?;
                let result = operators::arithmetic(ins.opcode, &a, &b)?;
                self.store(&args[0], result)?;
            }
            Opcode::Lt | Opcode::Gt => {
                let (a, b) = self.operands(ins)?;
                let result = operators::relational(ins.opcode, &a, &b)?;
                self.store(&args[0], result)?;
            }
            Opcode::Eq => {
                let (a, b) = self.operands(ins)?;
                let result = operators::equals(&a, &b)?;
                self.store(&args[0], Value::Bool(result))?;
            }
            Opcode::And | Opcode::Or => {
                let (a, b) = self.operands(ins)?;
                let result = operators::logical(ins.opcode, &a, &b)?;
                self.store(&args[0], result)?;
            }
            Opcode::Not => {
                let a = self.operand(ins.opcode, &args[1])?;
                self.store(&args[0], operators::not(&a)?)?;
            }
            Opcode::Int2Char => {
                let a = self.operand(ins.opcode, &args[1])?;
                self.store(&args[0], operators::int2char(&a)?)?;
            }
            Opcode::Stri2Int => {
                let (a, b) = self.operands(ins)?;
                self.store(&args[0], operators::stri2int(&a, &b)?)?;
            }

            Opcode::Read => {
                let Argument::Type(ty) = &args[1] else {
                    return Err(VmError::Structure("READ expects a type operand".into()));
                };
                let value = self.read(*ty);
                self.store(&args[0], value)?;
            }
            Opcode::Write => {
                let value = self.copy_of(&args[0])?;
                self.print(Sink::Stdout, &value)?;
            }

            Opcode::Concat => {
                let (a, b) = self.operands(ins)?;
                self.store(&args[0], operators::concat(&a, &b)?)?;
            }
            Opcode::StrLen => {
                let a = self.operand(ins.opcode, &args[1])?;
                self.store(&args[0], operators::strlen(&a)?)?;
            }
            Opcode::GetChar => {
                let (a, b) = self.operands(ins)?;
                self.store(&args[0], operators::getchar(&a, &b)?)?;
            }
            Opcode::SetChar => {
                let target = self.operand(ins.opcode, &args[0])?;
                let (index, replacement) = self.operands(ins)?;
                let result = operators::setchar(&target, &index, &replacement)?;
                self.store(&args[0], result)?;
            }

            Opcode::Type => {
                let name = self.type_name_of(&args[1])?;
                self.store(&args[0], Value::Str(name.to_string()))?;
            }

            Opcode::Label => {}
            Opcode::Jump => return Ok(Flow::Jump(self.label(&args[0])?)),
            Opcode::JumpIfEq | Opcode::JumpIfNeq => {
                let target = self.label(&args[0])?;
                let a = self.value_of(&args[1])?;
                let b = self.value_of(&args[2])?;
                let equal = operators::jump_equals(ins.opcode, &a, &b)?;
                if equal == (ins.opcode == Opcode::JumpIfEq) {
                    return Ok(Flow::Jump(target));
                }
            }
            Opcode::Exit => return self.exit_status(&args[0]).map(Flow::Exit),

            Opcode::DPrint => {
                let value = self.copy_of(&args[0])?;
                self.print(Sink::Stderr, &value)?;
            }
            Opcode::Break => self.dump(ins)?,
        }

        Ok(Flow::Next)
    }

    /// Resolves a symbol. Unassigned variables resolve to `Value::Uninit`.
    pub fn value_of(&self, arg: &Argument) -> Result<Value> {
        match arg {
            Argument::Const(value) => Ok(value.clone()),
            Argument::Var(var) => self.frames.load(var).cloned(),
            Argument::Label(_) | Argument::Type(_) => Err(VmError::Structure(format!(
                "{:?} operand is not a symbol",
                arg.kind()
            ))),
        }
    }

    /// Type name reported by TYPE for a symbol.
    pub fn type_name_of(&self, arg: &Argument) -> Result<&'static str> {
        Ok(self.value_of(arg)?.type_name())
    }

    /// A symbol fed to an operator; unassigned is a type error.
    fn operand(&self, op: Opcode, arg: &Argument) -> Result<Value> {
        let value = self.value_of(arg)?;
        if value.is_uninit() {
            return Err(VmError::OperandType(format!(
                "{op} operand {} is uninitialized",
                describe(arg)
            )));
        }
        Ok(value)
    }

    /// The two source symbols of a `var symb symb` instruction.
    fn operands(&self, ins: &Instruction) -> Result<(Value, Value)> {
        Ok((
            self.operand(ins.opcode, &ins.args[1])?,
            self.operand(ins.opcode, &ins.args[2])?,
        ))
    }

    /// A symbol being copied or printed; unassigned is a missing value.
    fn copy_of(&self, arg: &Argument) -> Result<Value> {
        let value = self.value_of(arg)?;
        if value.is_uninit() {
            return Err(VmError::MissingValue(format!(
                "{} is uninitialized",
                describe(arg)
            )));
        }
        Ok(value)
    }

    fn store(&mut self, arg: &Argument, value: Value) -> Result<()> {
        self.frames.store(variable(arg)?, value)
    }

    fn label(&self, arg: &Argument) -> Result<usize> {
        match arg {
            Argument::Label(name) => self.program.label(name),
            other => Err(VmError::Structure(format!(
                "expected a label, got {:?}",
                other.kind()
            ))),
        }
    }

    fn read(&mut self, ty: DataType) -> Value {
        let input = &mut *self.io.input;
        let value = match ty {
            DataType::Int => input.read_int().map(Value::Int),
            DataType::Bool => input.read_bool().map(Value::Bool),
            DataType::String => input.read_string().map(Value::Str),
        };
        value.unwrap_or(Value::Nil)
    }

    fn sink(&mut self, sink: Sink) -> &mut dyn OutputWriter {
        match sink {
            Sink::Stdout => &mut *self.io.stdout,
            Sink::Stderr => &mut *self.io.stderr,
        }
    }

    fn print(&mut self, sink: Sink, value: &Value) -> Result<()> {
        let out = self.sink(sink);
        match value {
            Value::Int(i) => out.write_int(*i)?,
            Value::Bool(b) => out.write_bool(*b)?,
            Value::Str(s) => out.write_string(&decode_escapes(s))?,
            Value::Nil | Value::Uninit => {}
        }
        Ok(())
    }

    /// EXIT takes an integer literal in `0..=9`. Variables are still
    /// resolved first so frame and variable errors keep their own class.
    fn exit_status(&self, arg: &Argument) -> Result<i32> {
        let value = self.value_of(arg)?;
        let (Argument::Const(_), Value::Int(code)) = (arg, value) else {
            return Err(VmError::OperandType(
                "EXIT expects an integer literal".into(),
            ));
        };
        if !(0..=9).contains(&code) {
            return Err(VmError::OperandValue(format!("invalid exit code {code}")));
        }
        Ok(code as i32)
    }

    /// BREAK: a snapshot of the interpreter on the diagnostic output.
    fn dump(&mut self, ins: &Instruction) -> Result<()> {
        let mut text = String::from("\n======Break======\n");
        text.push_str(&format!("Instruction order number: {}\n", ins.order));
        text.push_str(&format!("Completed instructions: {}\n", self.completed));
        text.push_str(&format!(
            "Frames: TF {}, LF depth {}\n",
            if self.frames.has_temporary() { "defined" } else { "undefined" },
            self.frames.depth()
        ));
        text.push_str(&format!(
            "Stacks: call {}, operand {}\n",
            self.calls.len(),
            self.data.len()
        ));
        text.push_str("GF:\n");
        for (name, value) in self.frames.global().sorted() {
            text.push_str(&format!("\t{name} : {value}\n"));
        }

        self.io.stderr.write_string(&text)?;
        Ok(())
    }
}

fn variable(arg: &Argument) -> Result<&VarRef> {
    match arg {
        Argument::Var(var) => Ok(var),
        other => Err(VmError::Structure(format!(
            "expected a variable, got {:?}",
            other.kind()
        ))),
    }
}

fn describe(arg: &Argument) -> String {
    match arg {
        Argument::Var(var) => var.to_string(),
        other => format!("{:?}", other.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::LineReader;
    use crate::writer::StreamWriter;
    use std::io::Cursor;

    fn var(text: &str) -> Argument {
        Argument::from_text("var", text).unwrap()
    }

    fn int(i: i64) -> Argument {
        Argument::Const(Value::Int(i))
    }

    fn ins(order: i64, op: Opcode, args: Vec<Argument>) -> Instruction {
        Instruction::new(order, op, args).unwrap()
    }

    /// Runs `program` with `input`, returning (status, stdout, stderr).
    fn exec(program: Vec<Instruction>, input: &str) -> (Result<i32>, String, String) {
        let program = Program::new(program).expect("valid program");
        let mut input = LineReader::new(Cursor::new(input.to_string()));
        let mut stdout = StreamWriter::new(Vec::new());
        let mut stderr = StreamWriter::new(Vec::new());

        let status = Vm::new(
            &program,
            Io {
                input: &mut input,
                stdout: &mut stdout,
                stderr: &mut stderr,
            },
        )
        .run();

        (
            status,
            String::from_utf8(stdout.into_inner()).unwrap(),
            String::from_utf8(stderr.into_inner()).unwrap(),
        )
    }

    #[test]
    fn test_straight_line_counts_steps() {
        let program = Program::new(vec![
            ins(3, Opcode::Write, vec![int(3)]),
            ins(1, Opcode::Write, vec![int(1)]),
            ins(2, Opcode::Write, vec![int(2)]),
        ])
        .unwrap();
        let mut input = LineReader::new(Cursor::new(String::new()));
        let mut stdout = StreamWriter::new(Vec::new());
        let mut stderr = StreamWriter::new(Vec::new());

        let mut vm = Vm::new(
            &program,
            Io {
                input: &mut input,
                stdout: &mut stdout,
                stderr: &mut stderr,
            },
        );
        assert_eq!(vm.run().unwrap(), 0);
        assert_eq!(vm.completed(), 3);
        drop(vm);

        assert_eq!(String::from_utf8(stdout.into_inner()).unwrap(), "123");
    }

    #[test]
    fn test_type_of_nil_and_uninit() {
        let (status, out, _) = exec(
            vec![
                ins(1, Opcode::DefVar, vec![var("GF@a")]),
                ins(2, Opcode::DefVar, vec![var("GF@t")]),
                ins(3, Opcode::Type, vec![var("GF@t"), var("GF@a")]),
                ins(4, Opcode::Write, vec![var("GF@t")]),
                ins(5, Opcode::Write, vec![Argument::Const(Value::Str("|".into()))]),
                ins(6, Opcode::Move, vec![var("GF@a"), Argument::Const(Value::Nil)]),
                ins(7, Opcode::Type, vec![var("GF@t"), var("GF@a")]),
                ins(8, Opcode::Write, vec![var("GF@t")]),
            ],
            "",
        );
        assert_eq!(status.unwrap(), 0);
        assert_eq!(out, "|nil");
    }

    #[test]
    fn test_uninit_operands() {
        let (status, _, _) = exec(
            vec![
                ins(1, Opcode::DefVar, vec![var("GF@a")]),
                ins(2, Opcode::Add, vec![var("GF@a"), var("GF@a"), int(1)]),
            ],
            "",
        );
        assert!(matches!(status, Err(VmError::OperandType(_))));

        let (status, _, _) = exec(
            vec![
                ins(1, Opcode::DefVar, vec![var("GF@a")]),
                ins(2, Opcode::Write, vec![var("GF@a")]),
            ],
            "",
        );
        assert!(matches!(status, Err(VmError::MissingValue(_))));
    }

    #[test]
    fn test_read_types_and_missing_input() {
        let (status, out, _) = exec(
            vec![
                ins(1, Opcode::DefVar, vec![var("GF@x")]),
                ins(2, Opcode::Read, vec![var("GF@x"), Argument::Type(DataType::Int)]),
                ins(3, Opcode::Write, vec![var("GF@x")]),
                ins(4, Opcode::Read, vec![var("GF@x"), Argument::Type(DataType::Int)]),
                ins(5, Opcode::Write, vec![var("GF@x")]),
                ins(6, Opcode::Read, vec![var("GF@x"), Argument::Type(DataType::Bool)]),
                ins(7, Opcode::Write, vec![var("GF@x")]),
                ins(8, Opcode::Read, vec![var("GF@x"), Argument::Type(DataType::String)]),
                ins(9, Opcode::Type, vec![var("GF@x"), var("GF@x")]),
                ins(10, Opcode::Write, vec![var("GF@x")]),
            ],
            "41\nabc\ntrue\n",
        );
        assert_eq!(status.unwrap(), 0);
        // "abc" is not an int, so the second read yields nil and prints nothing
        assert_eq!(out, "41truenil");
    }

    #[test]
    fn test_break_dumps_global_frame() {
        let (status, out, err) = exec(
            vec![
                ins(1, Opcode::DefVar, vec![var("GF@b")]),
                ins(2, Opcode::DefVar, vec![var("GF@a")]),
                ins(3, Opcode::Move, vec![var("GF@a"), int(7)]),
                ins(4, Opcode::Break, vec![]),
            ],
            "",
        );
        assert_eq!(status.unwrap(), 0);
        assert!(out.is_empty());
        assert!(err.contains("Instruction order number: 4"));
        assert!(err.contains("Completed instructions: 3"));
        assert!(err.contains("\ta : int@7\n\tb : (uninitialized)\n"));
    }

    #[test]
    fn test_exit_status() {
        let exit = |arg: Argument| exec(vec![ins(1, Opcode::Exit, vec![arg])], "").0;

        assert_eq!(exit(int(7)).unwrap(), 7);
        assert!(matches!(exit(int(10)), Err(VmError::OperandValue(_))));
        assert!(matches!(exit(int(-1)), Err(VmError::OperandValue(_))));
        assert!(matches!(
            exit(Argument::Const(Value::Str("1".into()))),
            Err(VmError::OperandType(_))
        ));

        // the operand is resolved before its kind is checked
        assert!(matches!(exit(var("TF@code")), Err(VmError::FrameAccess(_))));
        assert!(matches!(exit(var("GF@code")), Err(VmError::VariableAccess(_))));

        let (status, _, _) = exec(
            vec![
                ins(1, Opcode::DefVar, vec![var("GF@code")]),
                ins(2, Opcode::Move, vec![var("GF@code"), int(3)]),
                ins(3, Opcode::Exit, vec![var("GF@code")]),
            ],
            "",
        );
        assert!(matches!(status, Err(VmError::OperandType(_))));
    }

    #[test]
    fn test_dprint_goes_to_stderr() {
        let (status, out, err) = exec(
            vec![ins(
                1,
                Opcode::DPrint,
                vec![Argument::Const(Value::Str("a\\032b".into()))],
            )],
            "",
        );
        assert_eq!(status.unwrap(), 0);
        assert_eq!(out, "");
        assert_eq!(err, "a b");
    }
}
