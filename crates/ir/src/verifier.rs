//! Structural verification
//!
//! Checks the invariants downstream stages rely on: bodies are non-empty,
//! every block ends in exactly one terminator, branch targets resolve,
//! result names are unique per function and every operand refers to a known
//! name. Functions verify independently, so the work fans out across a
//! thread pool; the first failure in definition order is reported.

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::{Function, Module, Opcode, VerifyError};

/// Verify every function of a module
///
/// Returns the first failure in definition order, if any.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    module
        .functions
        .raw
        .par_iter()
        .find_map_first(|function| verify_function(function).err())
        .map_or(Ok(()), Err)
}

fn err(function: &Function, message: impl Into<String>) -> VerifyError {
    VerifyError {
        function: function.name.clone(),
        message: message.into(),
    }
}

fn verify_function(function: &Function) -> Result<(), VerifyError> {
    if function.is_declaration {
        if !function.blocks.is_empty() {
            return Err(err(function, "declaration has a body"));
        }
        return Ok(());
    }
    if function.blocks.is_empty() {
        return Err(err(function, "defined function has no blocks"));
    }

    // Collect labels and definitions up front; operand references may point
    // anywhere in the function.
    let mut labels = FxHashSet::default();
    for block in &function.blocks {
        if let Some(name) = &block.name {
            if !labels.insert(name.as_str()) {
                return Err(err(function, format!("duplicate block label '{name}'")));
            }
        }
    }

    let mut defined: FxHashSet<&str> = function.params.iter().map(|p| p.name.as_str()).collect();
    for block in &function.blocks {
        for instruction in &block.instructions {
            if let Some(result) = &instruction.result {
                if !defined.insert(result.as_str()) {
                    return Err(err(function, format!("redefinition of '%{result}'")));
                }
            }
        }
    }

    for block in &function.blocks {
        let block_desc = block.name.as_deref().unwrap_or("<entry>");
        if block.is_empty() {
            return Err(err(function, format!("block '{block_desc}' is empty")));
        }
        let last = block.instructions.len() - 1;
        for (index, instruction) in block.instructions.iter().enumerate() {
            if index == last && !instruction.is_terminator() {
                return Err(err(
                    function,
                    format!("block '{block_desc}' does not end in a terminator"),
                ));
            }
            if index != last && instruction.is_terminator() {
                return Err(err(
                    function,
                    format!("terminator in the middle of block '{block_desc}'"),
                ));
            }
            for temp in instruction.used_temps() {
                if !defined.contains(temp) {
                    return Err(err(function, format!("use of undefined value '%{temp}'")));
                }
            }
            for target in instruction.successors() {
                if !labels.contains(target) {
                    return Err(err(function, format!("branch to unknown block '%{target}'")));
                }
            }
            if let Opcode::Ret { ty, .. } = &instruction.opcode {
                if *ty != function.ret_ty {
                    return Err(err(
                        function,
                        format!(
                            "return type mismatch: function returns {}, found {ty}",
                            function.ret_ty
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_module, Context};

    fn parse(source: &str) -> Module {
        let ctx = Context::new("<test>");
        parse_module(source, &ctx).expect("parse failed")
    }

    #[test]
    fn well_formed_module_verifies() {
        let module = parse(
            "fn @f(i32 %x) -> i32 {\nentry:\n  %r = add i32 %x, 1\n  ret i32 %r\n}\n\
             declare fn @g() -> void",
        );
        assert!(verify_module(&module).is_ok());
    }

    #[test]
    fn missing_terminator_is_rejected() {
        let module = parse("fn @f(i32 %x) -> void {\nentry:\n  %r = add i32 %x, 1\n}");
        let error = verify_module(&module).unwrap_err();
        assert!(error.message.contains("does not end in a terminator"));
    }

    #[test]
    fn undefined_operand_is_rejected() {
        let module = parse("fn @f() -> i32 {\nentry:\n  ret i32 %ghost\n}");
        let error = verify_module(&module).unwrap_err();
        assert!(error.message.contains("undefined value '%ghost'"));
    }

    #[test]
    fn unknown_branch_target_is_rejected() {
        let module = parse(
            "fn @f(i1 %c) -> void {\nentry:\n  br i1 %c, label %a, label %b\na:\n  ret void\n}",
        );
        let error = verify_module(&module).unwrap_err();
        assert!(error.message.contains("unknown block '%b'"));
    }

    #[test]
    fn redefinition_is_rejected() {
        let module = parse(
            "fn @f(i32 %x) -> void {\nentry:\n  %r = add i32 %x, 1\n  %r = add i32 %x, 2\n  ret void\n}",
        );
        let error = verify_module(&module).unwrap_err();
        assert!(error.message.contains("redefinition"));
    }

    #[test]
    fn return_type_must_match() {
        let module = parse("fn @f() -> i32 {\nentry:\n  ret void\n}");
        let error = verify_module(&module).unwrap_err();
        assert!(error.message.contains("return type mismatch"));
    }
}
