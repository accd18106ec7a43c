//! LIFO container used for both the call stack and the operand stack.

use crate::error::{Result, VmError};

#[derive(Debug)]
pub struct Stack<T> {
    items: Vec<T>,
    name: &'static str,
}

impl<T> Stack<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            items: Vec::new(),
            name,
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Popping an empty stack is a missing-value error.
    pub fn pop(&mut self) -> Result<T> {
        self.items
            .pop()
            .ok_or_else(|| VmError::MissingValue(format!("{} is empty", self.name)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
