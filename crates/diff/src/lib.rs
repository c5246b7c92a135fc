//! # Aion diff
//!
//! Structural comparison of two IR modules, semantically ordered as
//! "before" and "after". The differ classifies every function, every basic
//! block within matched functions, and every instruction within matched
//! blocks into a typed tree of additions, removals and modifications.
//!
//! Matching runs as three nested alignments:
//!
//! 1. functions pair by name;
//! 2. blocks of a matched pair align by name vector (real name, or a
//!    synthetic `<bb.INDEX>` for unnamed blocks) with an LCS-style dynamic
//!    program;
//! 3. instructions of a matched block pair align the same way over their
//!    printed text.
//!
//! An instruction whose text changed decomposes into a `Removed` entry
//! followed by an `Added` entry; `Modified` is reserved for the block and
//! function levels. The differ never fails and its output is deterministic:
//! functions appear in before-module order followed by after-only functions
//! in after-module order.

pub mod align;
pub mod tree;

pub use tree::{BlockDiff, DiffKind, FunctionDiff, InstructionDiff, InstructionRecord, ModuleDiff};

use rustc_hash::FxHashMap;

use aion_ir::{Block, Function, Module};

use crate::align::align_sequences;

/// Computes [`ModuleDiff`]s
#[derive(Debug, Default)]
pub struct DiffEngine;

impl DiffEngine {
    pub const fn new() -> Self {
        Self
    }

    /// Compare two modules
    pub fn diff(&self, before: &Module, after: &Module) -> ModuleDiff {
        let mut diff = ModuleDiff::default();

        let before_names: FxHashMap<&str, &Function> = before
            .functions()
            .map(|f| (f.name.as_str(), f))
            .collect();
        let after_names: FxHashMap<&str, &Function> =
            after.functions().map(|f| (f.name.as_str(), f)).collect();

        diff.total_before_instructions = before.instruction_count();
        diff.total_after_instructions = after.instruction_count();

        for function in before.functions() {
            match after_names.get(function.name.as_str()) {
                None => {
                    diff.functions.push(removed_function(function));
                    diff.removed_functions += 1;
                }
                Some(after_fn) => {
                    let fd = self.diff_functions(function, after_fn);
                    if fd.kind == DiffKind::Modified {
                        diff.modified_functions += 1;
                    } else {
                        diff.unchanged_functions += 1;
                    }
                    diff.functions.push(fd);
                }
            }
        }

        for function in after.functions() {
            if !before_names.contains_key(function.name.as_str()) {
                diff.functions.push(added_function(function));
                diff.added_functions += 1;
            }
        }

        diff
    }

    fn diff_functions(&self, before: &Function, after: &Function) -> FunctionDiff {
        let mut fd = FunctionDiff {
            kind: DiffKind::Unchanged,
            function_name: before.name.clone(),
            before_signature: before.signature(),
            after_signature: after.signature(),
            blocks: Vec::new(),
            before_block_count: before.block_count(),
            after_block_count: after.block_count(),
            before_instr_count: before.instruction_count(),
            after_instr_count: after.instruction_count(),
            attributes_changed: !attributes_equal(before, after),
            signature_changed: false,
        };
        fd.signature_changed = fd.before_signature != fd.after_signature;

        if before.is_declaration && after.is_declaration {
            fd.kind = DiffKind::Unchanged;
            return fd;
        }
        if before.is_declaration || after.is_declaration {
            fd.kind = DiffKind::Modified;
            return fd;
        }

        let before_names = block_names(before);
        let after_names = block_names(after);
        let alignment = align_sequences(&before_names, &after_names);

        let mut any_change = false;
        for (b, a) in alignment {
            match (b, a) {
                (Some(bi), Some(ai)) => {
                    let bd = self.diff_blocks(
                        &before.blocks.raw[bi],
                        &after.blocks.raw[ai],
                        before_names[bi].clone(),
                    );
                    if bd.kind != DiffKind::Unchanged {
                        any_change = true;
                    }
                    fd.blocks.push(bd);
                }
                (Some(bi), None) => {
                    let block = &before.blocks.raw[bi];
                    any_change = true;
                    fd.blocks.push(BlockDiff {
                        kind: DiffKind::Removed,
                        block_name: before_names[bi].clone(),
                        instructions: Vec::new(),
                        before_instr_count: block.instruction_count(),
                        after_instr_count: 0,
                    });
                }
                (None, Some(ai)) => {
                    let block = &after.blocks.raw[ai];
                    any_change = true;
                    fd.blocks.push(BlockDiff {
                        kind: DiffKind::Added,
                        block_name: after_names[ai].clone(),
                        instructions: Vec::new(),
                        before_instr_count: 0,
                        after_instr_count: block.instruction_count(),
                    });
                }
                (None, None) => unreachable!("alignment never emits a double gap"),
            }
        }

        fd.kind = if any_change || fd.attributes_changed || fd.signature_changed {
            DiffKind::Modified
        } else {
            DiffKind::Unchanged
        };
        fd
    }

    fn diff_blocks(&self, before: &Block, after: &Block, name: String) -> BlockDiff {
        let mut bd = BlockDiff {
            kind: DiffKind::Unchanged,
            block_name: name,
            instructions: self.diff_instructions(before, after),
            before_instr_count: before.instruction_count(),
            after_instr_count: after.instruction_count(),
        };
        if bd
            .instructions
            .iter()
            .any(|d| d.kind != DiffKind::Unchanged)
        {
            bd.kind = DiffKind::Modified;
        }
        bd
    }

    fn diff_instructions(&self, before: &Block, after: &Block) -> Vec<InstructionDiff> {
        let before_recs: Vec<InstructionRecord> = before
            .instructions
            .iter()
            .enumerate()
            .map(|(i, instr)| InstructionRecord::capture(instr, i as u32 + 1))
            .collect();
        let after_recs: Vec<InstructionRecord> = after
            .instructions
            .iter()
            .enumerate()
            .map(|(i, instr)| InstructionRecord::capture(instr, i as u32 + 1))
            .collect();

        let before_texts: Vec<String> = before_recs.iter().map(|r| r.text.clone()).collect();
        let after_texts: Vec<String> = after_recs.iter().map(|r| r.text.clone()).collect();

        align_sequences(&before_texts, &after_texts)
            .into_iter()
            .map(|(b, a)| match (b, a) {
                (Some(bi), Some(ai)) => InstructionDiff {
                    kind: DiffKind::Unchanged,
                    before: Some(before_recs[bi].clone()),
                    after: Some(after_recs[ai].clone()),
                },
                (Some(bi), None) => InstructionDiff {
                    kind: DiffKind::Removed,
                    before: Some(before_recs[bi].clone()),
                    after: None,
                },
                (None, Some(ai)) => InstructionDiff {
                    kind: DiffKind::Added,
                    before: None,
                    after: Some(after_recs[ai].clone()),
                },
                (None, None) => unreachable!("alignment never emits a double gap"),
            })
            .collect()
    }
}

/// Block identity: the block's name, or `<bb.INDEX>` by position
fn block_names(function: &Function) -> Vec<String> {
    function
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| {
            block
                .name
                .clone()
                .unwrap_or_else(|| format!("<bb.{index}>"))
        })
        .collect()
}

/// Compare linkage and the printed attribute list
fn attributes_equal(a: &Function, b: &Function) -> bool {
    a.linkage == b.linkage && a.attribute_string() == b.attribute_string()
}

fn removed_function(function: &Function) -> FunctionDiff {
    FunctionDiff {
        kind: DiffKind::Removed,
        function_name: function.name.clone(),
        before_signature: function.signature(),
        after_signature: String::new(),
        blocks: Vec::new(),
        before_block_count: function.block_count(),
        after_block_count: 0,
        before_instr_count: function.instruction_count(),
        after_instr_count: 0,
        attributes_changed: false,
        signature_changed: false,
    }
}

fn added_function(function: &Function) -> FunctionDiff {
    FunctionDiff {
        kind: DiffKind::Added,
        function_name: function.name.clone(),
        before_signature: String::new(),
        after_signature: function.signature(),
        blocks: Vec::new(),
        before_block_count: 0,
        after_block_count: function.block_count(),
        before_instr_count: 0,
        after_instr_count: function.instruction_count(),
        attributes_changed: false,
        signature_changed: false,
    }
}
