//! Control-flow simplification
//!
//! Three rewrites, applied to fixpoint: branches with a constant condition
//! or identical targets degrade to plain jumps, blocks unreachable from the
//! entry are deleted, and a block ending in a jump to its unique successor's
//! only predecessor merges with it.

use rustc_hash::{FxHashMap, FxHashSet};

use aion_ir::{Context, Function, Instruction, Opcode, Value};

use crate::passes::{emit_applied, Pass};

/// The control-flow simplification pass
#[derive(Debug, Default)]
pub struct SimplifyCfg;

impl SimplifyCfg {
    pub const fn new() -> Self {
        Self
    }
}

impl Pass for SimplifyCfg {
    fn run(&self, function: &mut Function, ctx: &Context) -> bool {
        let mut modified = false;
        loop {
            let round = simplify_branches(function, ctx)
                || remove_unreachable_blocks(function, ctx)
                || merge_blocks(function, ctx);
            if !round {
                break;
            }
            modified = true;
        }
        modified
    }

    fn name(&self) -> &'static str {
        "simplify-cfg"
    }
}

/// Rewrite `br` terminators whose outcome is already decided
fn simplify_branches(function: &mut Function, ctx: &Context) -> bool {
    let function_name = function.name.clone();
    let mut modified = false;
    for block in function.blocks.iter_mut() {
        let Some(terminator) = block.instructions.last_mut() else {
            continue;
        };
        let Opcode::Br {
            cond,
            then_label,
            else_label,
        } = &terminator.opcode
        else {
            continue;
        };

        let target = if then_label == else_label {
            Some(then_label.clone())
        } else {
            match cond {
                Value::Int(0) => Some(else_label.clone()),
                Value::Int(_) => Some(then_label.clone()),
                _ => None,
            }
        };
        let Some(target) = target else {
            continue;
        };

        emit_applied(
            ctx,
            "simplify-cfg",
            "BranchFolded",
            &function_name,
            &[
                ("String", "folded conditional branch to 'label %"),
                ("Dest", &target),
                ("String", "'"),
            ],
        );
        *terminator = Instruction::new(None, Opcode::Jmp { target });
        modified = true;
    }
    modified
}

/// Delete blocks no path from the entry block reaches
fn remove_unreachable_blocks(function: &mut Function, ctx: &Context) -> bool {
    if function.blocks.is_empty() {
        return false;
    }

    let label_index: FxHashMap<&str, usize> = function
        .blocks
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.name.as_deref().map(|n| (n, i)))
        .collect();

    let mut reachable = FxHashSet::default();
    let mut worklist = vec![0usize];
    while let Some(index) = worklist.pop() {
        if !reachable.insert(index) {
            continue;
        }
        for successor in function.blocks.raw[index].successors() {
            if let Some(&target) = label_index.get(successor) {
                if !reachable.contains(&target) {
                    worklist.push(target);
                }
            }
        }
    }

    if reachable.len() == function.blocks.len() {
        return false;
    }

    let function_name = function.name.clone();
    for (index, block) in function.blocks.iter().enumerate() {
        if !reachable.contains(&index) {
            emit_applied(
                ctx,
                "simplify-cfg",
                "UnreachableEliminated",
                &function_name,
                &[
                    ("String", "removed unreachable block '"),
                    ("Block", block.name.as_deref().unwrap_or("<entry>")),
                    ("String", "'"),
                ],
            );
        }
    }

    let mut index = 0;
    function.blocks.raw.retain(|_| {
        let keep = reachable.contains(&index);
        index += 1;
        keep
    });
    true
}

/// Merge a block into its unique jump successor when that successor has no
/// other predecessor
fn merge_blocks(function: &mut Function, ctx: &Context) -> bool {
    let Some((from, into)) = find_merge_candidate(function) else {
        return false;
    };

    let merged = function.blocks.raw.remove(into);
    let merged_name = merged.name.clone().unwrap_or_default();
    let from = if into < from { from - 1 } else { from };
    let block = &mut function.blocks.raw[from];
    let block_name = block.name.clone().unwrap_or_else(|| "<entry>".to_string());
    block.instructions.pop(); // the jmp
    block.instructions.extend(merged.instructions);

    emit_applied(
        ctx,
        "simplify-cfg",
        "BlockMerged",
        &function.name.clone(),
        &[
            ("String", "merged block '"),
            ("Block", &merged_name),
            ("String", "' into '"),
            ("Dest", &block_name),
            ("String", "'"),
        ],
    );
    true
}

fn find_merge_candidate(function: &Function) -> Option<(usize, usize)> {
    let label_index: FxHashMap<&str, usize> = function
        .blocks
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.name.as_deref().map(|n| (n, i)))
        .collect();

    let mut pred_counts: FxHashMap<usize, usize> = FxHashMap::default();
    for block in &function.blocks {
        for successor in block.successors() {
            if let Some(&target) = label_index.get(successor) {
                *pred_counts.entry(target).or_default() += 1;
            }
        }
    }

    for (index, block) in function.blocks.iter().enumerate() {
        let Some(Instruction {
            opcode: Opcode::Jmp { target },
            ..
        }) = block.instructions.last()
        else {
            continue;
        };
        let Some(&target_index) = label_index.get(target.as_str()) else {
            continue;
        };
        if target_index == index || target_index == 0 {
            continue;
        }
        if pred_counts.get(&target_index) == Some(&1) {
            return Some((index, target_index));
        }
    }
    None
}
