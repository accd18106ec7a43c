//! Variable frames: the global frame, the optional temporary frame and the
//! stack of local frames.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, VmError};
use crate::model::{FrameTag, Value, VarRef};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Frame {
    vars: HashMap<String, Value>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` as an unassigned variable.
    pub fn declare(&mut self, name: &str) -> Result<()> {
        if self.vars.contains_key(name) {
            return Err(VmError::VariableAccess(format!(
                "variable `{name}` is already defined"
            )));
        }
        self.vars.insert(name.to_string(), Value::Uninit);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.vars
            .get(name)
            .ok_or_else(|| VmError::VariableAccess(format!("variable `{name}` does not exist")))
    }

    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let slot = self
            .vars
            .get_mut(name)
            .ok_or_else(|| VmError::VariableAccess(format!("variable `{name}` does not exist")))?;
        *slot = value;
        Ok(())
    }

    /// Variables sorted by name, for stable dumps.
    pub fn sorted(&self) -> Vec<(&str, &Value)> {
        let mut vars: Vec<_> = self.vars.iter().map(|(k, v)| (k.as_str(), v)).collect();
        vars.sort_by(|a, b| a.0.cmp(b.0));
        vars
    }
}

#[derive(Debug, Default)]
pub struct Frames {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl Frames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    /// Number of frames on the local-frame stack.
    pub fn depth(&self) -> usize {
        self.locals.len()
    }

    pub fn has_temporary(&self) -> bool {
        self.temporary.is_some()
    }

    /// CREATEFRAME: a fresh temporary frame, discarding any previous one.
    pub fn create_temporary(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// PUSHFRAME: the temporary frame becomes the new local frame.
    pub fn push_temporary(&mut self) -> Result<()> {
        let frame = self
            .temporary
            .take()
            .ok_or_else(|| VmError::FrameAccess("TF does not exist".into()))?;
        self.locals.push(frame);
        debug!(depth = self.locals.len(), "frame pushed");
        Ok(())
    }

    /// POPFRAME: the top local frame becomes the temporary frame.
    pub fn pop_local(&mut self) -> Result<()> {
        let frame = self
            .locals
            .pop()
            .ok_or_else(|| VmError::FrameAccess("local frame stack is empty".into()))?;
        self.temporary = Some(frame);
        debug!(depth = self.locals.len(), "frame popped");
        Ok(())
    }

    pub fn resolve(&self, tag: FrameTag) -> Result<&Frame> {
        match tag {
            FrameTag::Global => Ok(&self.global),
            FrameTag::Temporary => self
                .temporary
                .as_ref()
                .ok_or_else(|| VmError::FrameAccess("TF does not exist".into())),
            FrameTag::Local => self
                .locals
                .last()
                .ok_or_else(|| VmError::FrameAccess("local frame stack is empty".into())),
        }
    }

    pub fn resolve_mut(&mut self, tag: FrameTag) -> Result<&mut Frame> {
        match tag {
            FrameTag::Global => Ok(&mut self.global),
            FrameTag::Temporary => self
                .temporary
                .as_mut()
                .ok_or_else(|| VmError::FrameAccess("TF does not exist".into())),
            FrameTag::Local => self
                .locals
                .last_mut()
                .ok_or_else(|| VmError::FrameAccess("local frame stack is empty".into())),
        }
    }

    pub fn declare(&mut self, var: &VarRef) -> Result<()> {
        self.resolve_mut(var.frame)?.declare(&var.name)
    }

    pub fn load(&self, var: &VarRef) -> Result<&Value> {
        self.resolve(var.frame)?.get(&var.name)
    }

    pub fn store(&mut self, var: &VarRef, value: Value) -> Result<()> {
        self.resolve_mut(var.frame)?.set(&var.name, value)
    }
}
