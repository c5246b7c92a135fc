//! Basic blocks
//!
//! A block is a straight-line instruction sequence whose last instruction is
//! its terminator. The entry block of a function may be unnamed; every other
//! block carries the label it was defined under. Unnamed blocks are given
//! synthetic names by the session orchestrator before any diff runs, so the
//! differ can rely on stable block identity.

use crate::{indent_str, Instruction, PrettyPrint};

/// A basic block in a function's control flow graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The block's label, if it has one
    pub name: Option<String>,
    /// The instruction sequence; the last instruction is the terminator
    pub instructions: Vec<Instruction>,
}

impl Block {
    pub const fn new(name: Option<String>) -> Self {
        Self {
            name,
            instructions: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    pub const fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The block's terminator, if the block is non-empty and well-formed
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.is_terminator())
    }

    /// Labels of the blocks this block can transfer control to
    pub fn successors(&self) -> Vec<&str> {
        self.terminator().map_or_else(Vec::new, Instruction::successors)
    }
}

impl PrettyPrint for Block {
    fn pretty_print(&self, indent: usize) -> String {
        let mut result = String::new();
        if let Some(name) = &self.name {
            result.push_str(&format!("{}{}:\n", indent_str(indent), name));
        }
        for instruction in &self.instructions {
            result.push_str(&format!("{}{}\n", indent_str(indent + 1), instruction));
        }
        result
    }
}
