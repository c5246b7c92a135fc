//! The typed diff tree

use serde::{Deserialize, Serialize};

use aion_ir::Instruction;

/// How one entity changed between the two module states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiffKind {
    Unchanged,
    Added,
    Removed,
    Modified,
}

/// A lightweight capture of one printed instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionRecord {
    /// The stable printed form, leading whitespace stripped
    pub text: String,
    /// 1-based position in the block
    pub line_index: u32,
    pub opcode_name: String,
    /// `file:line:col`, or empty when the instruction has no location
    pub debug_loc: String,
}

impl InstructionRecord {
    pub fn capture(instruction: &Instruction, line_index: u32) -> Self {
        Self {
            text: instruction.to_string().trim_start().to_string(),
            line_index,
            opcode_name: instruction.opcode_name().to_string(),
            debug_loc: instruction
                .loc
                .as_ref()
                .map(aion_ir::DebugLoc::format)
                .unwrap_or_default(),
        }
    }
}

/// One aligned instruction pair
///
/// Exactly one side is populated for `Added`/`Removed`; both sides are
/// populated for `Unchanged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionDiff {
    pub kind: DiffKind,
    pub before: Option<InstructionRecord>,
    pub after: Option<InstructionRecord>,
}

/// One aligned block pair, or a block present on only one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDiff {
    pub kind: DiffKind,
    pub block_name: String,
    pub instructions: Vec<InstructionDiff>,
    pub before_instr_count: usize,
    pub after_instr_count: usize,
}

/// One function's classification with its block-level detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDiff {
    pub kind: DiffKind,
    pub function_name: String,
    pub before_signature: String,
    pub after_signature: String,
    pub blocks: Vec<BlockDiff>,
    pub before_block_count: usize,
    pub after_block_count: usize,
    pub before_instr_count: usize,
    pub after_instr_count: usize,
    pub attributes_changed: bool,
    pub signature_changed: bool,
}

impl FunctionDiff {
    /// The function shrank: fewer instructions after than before
    pub fn was_optimized(&self) -> bool {
        self.kind == DiffKind::Modified && self.after_instr_count < self.before_instr_count
    }

    /// The control flow simplified: fewer blocks after than before
    pub fn was_simplified(&self) -> bool {
        self.kind == DiffKind::Modified && self.after_block_count < self.before_block_count
    }

    /// The function disappeared, implying it was inlined or eliminated
    pub fn was_inlined(&self) -> bool {
        self.kind == DiffKind::Removed
    }
}

/// The complete module-level comparison
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleDiff {
    /// Per-function classifications: before-module order, then functions
    /// only present in the after module
    pub functions: Vec<FunctionDiff>,
    pub added_functions: usize,
    pub removed_functions: usize,
    pub modified_functions: usize,
    pub unchanged_functions: usize,
    /// Instruction totals over all functions, including unchanged ones
    pub total_before_instructions: usize,
    pub total_after_instructions: usize,
}

impl ModuleDiff {
    pub fn has_changes(&self) -> bool {
        self.modified_functions > 0 || self.added_functions > 0 || self.removed_functions > 0
    }

    /// Signed instruction count change, after minus before
    pub fn instruction_delta(&self) -> i64 {
        self.total_after_instructions as i64 - self.total_before_instructions as i64
    }
}
