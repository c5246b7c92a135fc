//! Instruction combination
//!
//! Folds constant expressions and algebraic identities. A folded
//! instruction is deleted and every use of its result is rewritten to the
//! computed value; folding runs front to back so chains collapse in one
//! sweep, and a final substitution pass patches uses that appear before
//! their definition's block in layout order.

use rustc_hash::FxHashMap;

use aion_ir::{BinOp, Context, Function, Instruction, Opcode, Value};

use crate::passes::{emit_applied, Pass};

/// The instruction-combination pass
#[derive(Debug, Default)]
pub struct InstCombine;

impl InstCombine {
    pub const fn new() -> Self {
        Self
    }
}

impl Pass for InstCombine {
    fn run(&self, function: &mut Function, ctx: &Context) -> bool {
        let mut subst: FxHashMap<String, Value> = FxHashMap::default();
        let function_name = function.name.clone();

        for block in function.blocks.iter_mut() {
            block.instructions.retain_mut(|instruction| {
                instruction.replace_temps(&subst);
                let Some(replacement) = simplify(instruction) else {
                    return true;
                };
                let result = instruction
                    .result
                    .clone()
                    .unwrap_or_default();
                let remark_name = if replacement.is_const() && all_const_operands(instruction) {
                    "ConstantFold"
                } else {
                    "Identity"
                };
                emit_applied(
                    ctx,
                    "combine",
                    remark_name,
                    &function_name,
                    &[
                        ("String", "replaced '"),
                        ("Inst", &instruction.to_string()),
                        ("String", "' with "),
                        ("Value", &replacement.to_string()),
                    ],
                );
                subst.insert(result, replacement);
                false
            });
        }

        if subst.is_empty() {
            return false;
        }

        // Patch uses that sit in blocks laid out before their definition.
        for block in function.blocks.iter_mut() {
            for instruction in &mut block.instructions {
                instruction.replace_temps(&subst);
            }
        }
        true
    }

    fn name(&self) -> &'static str {
        "combine"
    }
}

fn all_const_operands(instruction: &Instruction) -> bool {
    instruction.operands().iter().all(|v| v.is_const())
}

/// The value an instruction's result collapses to, if any
fn simplify(instruction: &Instruction) -> Option<Value> {
    if instruction.result.is_none() {
        return None;
    }
    match &instruction.opcode {
        Opcode::Binary { op, lhs, rhs, .. } => simplify_binary(*op, lhs, rhs),
        Opcode::Icmp { pred, lhs, rhs, .. } => match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(pred.eval(*a, *b) as i64)),
            _ => None,
        },
        Opcode::Select {
            cond,
            if_true,
            if_false,
            ..
        } => match cond {
            Value::Int(0) => Some(if_false.clone()),
            Value::Int(_) => Some(if_true.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn simplify_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Option<Value> {
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        return op.eval(*a, *b).map(Value::Int);
    }
    match (op, lhs, rhs) {
        // x + 0, x - 0, x | 0, x ^ 0, x << 0, x >> 0
        (
            BinOp::Add | BinOp::Sub | BinOp::Or | BinOp::Xor | BinOp::Shl | BinOp::Shr,
            _,
            Value::Int(0),
        ) => Some(lhs.clone()),
        // 0 + x, 0 | x, 0 ^ x
        (BinOp::Add | BinOp::Or | BinOp::Xor, Value::Int(0), _) => Some(rhs.clone()),
        // x * 1, x / 1
        (BinOp::Mul | BinOp::Div, _, Value::Int(1)) => Some(lhs.clone()),
        // 1 * x
        (BinOp::Mul, Value::Int(1), _) => Some(rhs.clone()),
        // x * 0, 0 * x, x & 0, 0 & x
        (BinOp::Mul | BinOp::And, Value::Int(0), _) | (BinOp::Mul | BinOp::And, _, Value::Int(0)) => {
            Some(Value::Int(0))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aion_ir::{parse_module, Module, PrettyPrint};

    fn run_pass(source: &str) -> (Module, Vec<String>) {
        use aion_remarks::RemarkCollector;
        let mut ctx = Context::new("<test>");
        let collector = RemarkCollector::new();
        collector.install(&mut ctx);
        let mut module = parse_module(source, &ctx).expect("parse failed");
        for function in module.functions_mut() {
            InstCombine::new().run(function, &ctx);
        }
        let messages = collector
            .snapshot()
            .into_iter()
            .map(|r| format!("{}:{}", r.remark_name, r.message))
            .collect();
        (module, messages)
    }

    #[test]
    fn folds_constant_chains_in_one_sweep() {
        let (module, messages) = run_pass(
            "fn @f() -> i32 {\nentry:\n  %a = add i32 2, 3\n  %b = mul i32 %a, 4\n  ret i32 %b\n}",
        );
        let func = module.get_function("f").unwrap();
        assert_eq!(func.instruction_count(), 1);
        assert!(module.pretty_print(0).contains("ret i32 20"));
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("ConstantFold:"));
    }

    #[test]
    fn rewrites_identities_to_their_operand() {
        let (module, messages) = run_pass(
            "fn @f(i32 %x) -> i32 {\nentry:\n  %a = add i32 %x, 0\n  %b = mul i32 %a, 1\n  ret i32 %b\n}",
        );
        assert!(module.pretty_print(0).contains("ret i32 %x"));
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.starts_with("Identity:")));
    }

    #[test]
    fn folds_comparisons_and_selects() {
        let (module, _) = run_pass(
            "fn @f(i32 %x) -> i32 {\nentry:\n  %c = icmp sgt i32 5, 3\n  %r = select i32 %c, %x, 0\n  ret i32 %r\n}",
        );
        assert!(module.pretty_print(0).contains("ret i32 %x"));
    }

    #[test]
    fn leaves_division_by_zero_alone() {
        let (module, messages) = run_pass(
            "fn @f() -> i32 {\nentry:\n  %a = div i32 1, 0\n  ret i32 %a\n}",
        );
        let func = module.get_function("f").unwrap();
        assert_eq!(func.instruction_count(), 2);
        assert!(messages.is_empty());
    }

    #[test]
    fn does_not_touch_unfoldable_code() {
        let source = "fn @f(i32 %x, i32 %y) -> i32 {\nentry:\n  %a = add i32 %x, %y\n  ret i32 %a\n}";
        let (module, messages) = run_pass(source);
        assert_eq!(module.get_function("f").unwrap().instruction_count(), 2);
        assert!(messages.is_empty());
    }
}
