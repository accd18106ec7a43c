//! Program loading: order validation, sorting and the label table.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, VmError};
use crate::model::{Argument, Instruction, Opcode};

/// Label name -> index into the sorted instruction list.
pub type LabelTable = HashMap<String, usize>;

/// A sorted, label-resolved program ready for execution.
#[derive(Debug)]
pub struct Program {
    instructions: Vec<Instruction>,
    labels: LabelTable,
}

impl Program {
    /// Validates `order` values and operands, sorts by order and builds
    /// the label table.
    pub fn new(mut instructions: Vec<Instruction>) -> Result<Program> {
        for ins in &instructions {
            ins.check()?;
        }
        if let Some(bad) = instructions.iter().find(|ins| ins.order <= 0) {
            return Err(VmError::Structure(format!(
                "instruction order must be positive, got {}",
                bad.order
            )));
        }

        instructions.sort_by_key(|ins| ins.order);

        if let Some(dup) = instructions.windows(2).find(|w| w[0].order == w[1].order) {
            return Err(VmError::Structure(format!(
                "duplicate instruction order {}",
                dup[0].order
            )));
        }

        let labels = build_labels(&instructions)?;
        debug!(
            instructions = instructions.len(),
            labels = labels.len(),
            "program loaded"
        );

        Ok(Program {
            instructions,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Index of the LABEL instruction named `name`.
    pub fn label(&self, name: &str) -> Result<usize> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| VmError::Semantic(format!("label `{name}` does not exist")))
    }
}

/// One pass over the sorted instructions recording every LABEL.
pub fn build_labels(instructions: &[Instruction]) -> Result<LabelTable> {
    let mut labels = LabelTable::new();

    for (index, ins) in instructions.iter().enumerate() {
        if ins.opcode != Opcode::Label {
            continue;
        }
        let Some(Argument::Label(name)) = ins.args.first() else {
            return Err(VmError::Structure(format!(
                "LABEL (order {}) has no label operand",
                ins.order
            )));
        };
        if labels.insert(name.clone(), index).is_some() {
            return Err(VmError::Semantic(format!("label `{name}` already exists")));
        }
    }

    Ok(labels)
}
