//! Aggressive dead-code elimination
//!
//! Liveness seeds at side-effecting instructions (stores, calls, volatile
//! loads) and terminators, then flows backwards through operands; whatever
//! stays unmarked is deleted. Roots that only survive because of their side
//! effects get a missed remark: the value they compute is dead, but the
//! instruction cannot go.

use rustc_hash::{FxHashMap, FxHashSet};

use aion_ir::{Context, Function, Opcode};

use crate::passes::{emit_applied, emit_missed, Pass};

/// The aggressive dead-code elimination pass
#[derive(Debug, Default)]
pub struct Adce;

impl Adce {
    pub const fn new() -> Self {
        Self
    }
}

impl Pass for Adce {
    fn run(&self, function: &mut Function, ctx: &Context) -> bool {
        let live = compute_live_results(function);
        report_pinned_roots(function, &live, ctx);

        let function_name = function.name.clone();
        let mut modified = false;
        for block in function.blocks.iter_mut() {
            block.instructions.retain(|instruction| {
                if instruction.has_side_effects() {
                    return true;
                }
                let keep = instruction
                    .result
                    .as_deref()
                    .is_none_or(|result| live.contains(result));
                if !keep {
                    emit_applied(
                        ctx,
                        "adce",
                        "DeadInstructionRemoved",
                        &function_name,
                        &[
                            ("String", "removed dead instruction '"),
                            ("Inst", &instruction.to_string()),
                            ("String", "'"),
                        ],
                    );
                    modified = true;
                }
                keep
            });
        }
        modified
    }

    fn name(&self) -> &'static str {
        "adce"
    }
}

/// Result names whose values feed a side-effecting instruction, directly or
/// transitively
fn compute_live_results(function: &Function) -> FxHashSet<String> {
    let mut operands_of: FxHashMap<&str, Vec<&str>> = FxHashMap::default();
    let mut live: FxHashSet<String> = FxHashSet::default();
    let mut worklist: Vec<&str> = Vec::new();

    for block in &function.blocks {
        for instruction in &block.instructions {
            if instruction.has_side_effects() {
                worklist.extend(instruction.used_temps());
            } else if let Some(result) = instruction.result.as_deref() {
                operands_of.insert(result, instruction.used_temps());
            }
        }
    }

    while let Some(name) = worklist.pop() {
        if !live.insert(name.to_string()) {
            continue;
        }
        if let Some(operands) = operands_of.get(name) {
            worklist.extend(operands.iter().copied());
        }
    }

    live
}

/// Emit missed remarks for dead values pinned by side effects
fn report_pinned_roots(function: &Function, live: &FxHashSet<String>, ctx: &Context) {
    let mut use_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for block in &function.blocks {
        for instruction in &block.instructions {
            for temp in instruction.used_temps() {
                *use_counts.entry(temp).or_default() += 1;
            }
        }
    }

    for block in &function.blocks {
        for instruction in &block.instructions {
            let Some(result) = instruction.result.as_deref() else {
                continue;
            };
            if live.contains(result) || use_counts.contains_key(result) {
                continue;
            }
            match &instruction.opcode {
                Opcode::Call { callee, .. } => {
                    emit_missed(
                        ctx,
                        "adce",
                        "SideEffects",
                        &function.name,
                        &[
                            ("String", "call to '@"),
                            ("Callee", callee),
                            ("String", "' kept alive: callee may have side effects"),
                        ],
                    );
                }
                Opcode::Load { volatile: true, .. } => {
                    emit_missed(
                        ctx,
                        "adce",
                        "VolatileOperation",
                        &function.name,
                        &[
                            ("String", "volatile load '"),
                            ("Inst", &instruction.to_string()),
                            ("String", "' has a dead result but cannot be removed"),
                        ],
                    );
                }
                _ => {}
            }
        }
    }
}
