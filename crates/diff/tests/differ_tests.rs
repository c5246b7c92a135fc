//! End-to-end differ behavior over parsed modules

use aion_diff::{DiffEngine, DiffKind};
use aion_ir::{parse_module, Context, Module};

fn parse(source: &str) -> Module {
    let ctx = Context::new("<test>");
    parse_module(source, &ctx).expect("parse failed")
}

const TWO_FUNCTIONS: &str = "\
fn @foo(i32 %x) -> i32 {
entry:
  %r = call i32 @bar(i32 %x)
  ret i32 %r
}

fn @bar(i32 %x) -> i32 {
entry:
  %r = mul i32 %x, %x
  ret i32 %r
}
";

#[test]
fn identical_modules_diff_as_unchanged() {
    let before = parse(TWO_FUNCTIONS);
    let after = parse(TWO_FUNCTIONS);
    let diff = DiffEngine::new().diff(&before, &after);

    assert_eq!(diff.modified_functions, 0);
    assert_eq!(diff.added_functions, 0);
    assert_eq!(diff.removed_functions, 0);
    assert_eq!(diff.unchanged_functions, 2);
    assert_eq!(diff.instruction_delta(), 0);
    assert!(!diff.has_changes());
    assert!(diff.functions.iter().all(|f| f.kind == DiffKind::Unchanged));
}

#[test]
fn function_counts_partition_the_list() {
    let before = parse(TWO_FUNCTIONS);
    let after = parse(
        "fn @foo(i32 %x) -> i32 {\nentry:\n  ret i32 %x\n}\n\
         fn @baz() -> void {\nentry:\n  ret void\n}",
    );
    let diff = DiffEngine::new().diff(&before, &after);

    assert_eq!(
        diff.added_functions
            + diff.removed_functions
            + diff.modified_functions
            + diff.unchanged_functions,
        diff.functions.len()
    );
    assert_eq!(diff.added_functions, 1);
    assert_eq!(diff.removed_functions, 1);
    assert_eq!(diff.modified_functions, 1);
}

#[test]
fn instruction_totals_sum_over_all_functions() {
    let before = parse(TWO_FUNCTIONS);
    let after = parse("fn @foo(i32 %x) -> i32 {\nentry:\n  ret i32 %x\n}");
    let diff = DiffEngine::new().diff(&before, &after);

    let before_sum: usize = diff.functions.iter().map(|f| f.before_instr_count).sum();
    let after_sum: usize = diff.functions.iter().map(|f| f.after_instr_count).sum();
    assert_eq!(diff.total_before_instructions, before_sum);
    assert_eq!(diff.total_after_instructions, after_sum);
}

#[test]
fn removed_function_reads_as_inlined() {
    let before = parse(TWO_FUNCTIONS);
    let after = parse(
        "fn @foo(i32 %x) -> i32 {\nentry:\n  %r = mul i32 %x, %x\n  ret i32 %r\n}",
    );
    let diff = DiffEngine::new().diff(&before, &after);

    assert_eq!(diff.removed_functions, 1);
    let bar = diff
        .functions
        .iter()
        .find(|f| f.function_name == "bar")
        .expect("missing @bar entry");
    assert_eq!(bar.kind, DiffKind::Removed);
    assert!(bar.was_inlined());
    assert_eq!(bar.after_instr_count, 0);
    assert_eq!(bar.before_instr_count, 2);
}

#[test]
fn single_substitution_produces_removed_then_added() {
    let before = parse(
        "fn @f(i32 %x) -> i32 {\nentry:\n  %a = add i32 %x, 1\n  %b = add i32 %a, 2\n  ret i32 %b\n}",
    );
    let after = parse(
        "fn @f(i32 %x) -> i32 {\nentry:\n  %a = add i32 %x, 1\n  %b = mul i32 %a, 2\n  ret i32 %b\n}",
    );
    let diff = DiffEngine::new().diff(&before, &after);

    assert_eq!(diff.modified_functions, 1);
    let func = &diff.functions[0];
    assert_eq!(func.kind, DiffKind::Modified);
    let block = &func.blocks[0];
    assert_eq!(block.kind, DiffKind::Modified);

    let changed: Vec<_> = block
        .instructions
        .iter()
        .filter(|d| d.kind != DiffKind::Unchanged)
        .collect();
    assert_eq!(changed.len(), 2);
    assert_eq!(changed[0].kind, DiffKind::Removed);
    assert!(changed[0].before.as_ref().unwrap().text.contains("add"));
    assert_eq!(changed[1].kind, DiffKind::Added);
    assert!(changed[1].after.as_ref().unwrap().text.contains("mul"));
}

#[test]
fn shrinking_function_reads_as_optimized() {
    let before = parse(
        "fn @f(i32 %x) -> i32 {\nentry:\n  %a = add i32 %x, 0\n  %b = add i32 %a, 0\n  ret i32 %b\n}",
    );
    let after = parse("fn @f(i32 %x) -> i32 {\nentry:\n  ret i32 %x\n}");
    let diff = DiffEngine::new().diff(&before, &after);

    let func = &diff.functions[0];
    assert!(func.was_optimized());
    assert!(!func.was_simplified());
}

#[test]
fn dropped_block_reads_as_simplified() {
    let before = parse(
        "fn @f(i1 %c) -> i32 {\nentry:\n  br i1 %c, label %a, label %b\na:\n  ret i32 1\nb:\n  ret i32 2\n}",
    );
    let after = parse(
        "fn @f(i1 %c) -> i32 {\nentry:\n  jmp label %a\na:\n  ret i32 1\n}",
    );
    let diff = DiffEngine::new().diff(&before, &after);

    let func = &diff.functions[0];
    assert_eq!(func.kind, DiffKind::Modified);
    assert!(func.was_simplified());
    let removed_block = func
        .blocks
        .iter()
        .find(|b| b.kind == DiffKind::Removed)
        .expect("missing removed block");
    assert_eq!(removed_block.block_name, "b");
    assert_eq!(removed_block.before_instr_count, 1);
    assert!(removed_block.instructions.is_empty());
}

#[test]
fn declarations_compare_without_bodies() {
    let both = "declare fn @escape(ptr %p) -> void";
    let diff = DiffEngine::new().diff(&parse(both), &parse(both));
    assert_eq!(diff.functions[0].kind, DiffKind::Unchanged);

    let defined = "fn @escape(ptr %p) -> void {\nentry:\n  ret void\n}";
    let diff = DiffEngine::new().diff(&parse(both), &parse(defined));
    let func = &diff.functions[0];
    assert_eq!(func.kind, DiffKind::Modified);
    assert!(func.blocks.is_empty());
}

#[test]
fn attribute_change_alone_modifies_the_function() {
    let before = parse("fn @f() -> void {\nentry:\n  ret void\n}");
    let after = parse("fn @f() -> void !noinline {\nentry:\n  ret void\n}");
    let diff = DiffEngine::new().diff(&before, &after);

    let func = &diff.functions[0];
    assert_eq!(func.kind, DiffKind::Modified);
    assert!(func.attributes_changed);
    assert!(!func.signature_changed);
}

#[test]
fn signature_change_is_detected() {
    let before = parse("fn @f(i32 %x) -> i32 {\nentry:\n  ret i32 %x\n}");
    let after = parse("fn @f(i64 %x) -> i64 {\nentry:\n  ret i64 %x\n}");
    let diff = DiffEngine::new().diff(&before, &after);
    assert!(diff.functions[0].signature_changed);
}

#[test]
fn function_order_is_before_then_after_only() {
    let before = parse(
        "fn @a() -> void {\nentry:\n  ret void\n}\nfn @b() -> void {\nentry:\n  ret void\n}",
    );
    let after = parse(
        "fn @c() -> void {\nentry:\n  ret void\n}\nfn @b() -> void {\nentry:\n  ret void\n}",
    );
    let diff = DiffEngine::new().diff(&before, &after);
    let names: Vec<_> = diff
        .functions
        .iter()
        .map(|f| f.function_name.as_str())
        .collect();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn instruction_records_carry_positions_and_debug_locs() {
    let before = parse(
        "fn @f(ptr %p) -> void {\nentry:\n  store i32 1, ptr %p !loc(\"a.c\", 7, 3)\n  ret void\n}",
    );
    let after = parse("fn @f(ptr %p) -> void {\nentry:\n  ret void\n}");
    let diff = DiffEngine::new().diff(&before, &after);

    let block = &diff.functions[0].blocks[0];
    let removed = block
        .instructions
        .iter()
        .find(|d| d.kind == DiffKind::Removed)
        .expect("missing removed store");
    let record = removed.before.as_ref().unwrap();
    assert_eq!(record.line_index, 1);
    assert_eq!(record.opcode_name, "store");
    assert_eq!(record.debug_loc, "a.c:7:3");
}
