//! Optimization passes
//!
//! The native pipeline the single-input flow drives over the cloned module.
//! Each pass reports what it did (or could not do) as optimization remarks
//! through the context diagnostic channel, which is the whole point of
//! running it: the session explains the pipeline's behavior rather than
//! shipping its output.

pub mod adce;
pub mod combine;
pub mod simplify_cfg;

pub use adce::Adce;
pub use combine::InstCombine;
pub use simplify_cfg::SimplifyCfg;

use aion_ir::{Context, Diagnostic, DiagnosticKind, Function, Module, OptDiagnostic};

/// A function-level transformation
///
/// Passes are stateless and report through the context, so a pass manager
/// may run them from worker threads against distinct functions.
pub trait Pass: Send + Sync {
    /// Apply the pass; returns true iff the function changed
    fn run(&self, function: &mut Function, ctx: &Context) -> bool;

    /// The pass's pipeline name
    fn name(&self) -> &'static str;
}

/// Emit an `Applied` remark for a transformation a pass performed
pub(crate) fn emit_applied(
    ctx: &Context,
    pass: &'static str,
    remark_name: &'static str,
    function: &str,
    pieces: &[(&str, &str)],
) {
    let mut diag = OptDiagnostic::new(DiagnosticKind::Remark, pass, remark_name, function);
    for (key, value) in pieces {
        diag = diag.arg(*key, *value);
    }
    ctx.emit(Diagnostic::Optimization(diag));
}

/// Emit a `Missed` remark for a transformation a pass had to give up on
pub(crate) fn emit_missed(
    ctx: &Context,
    pass: &'static str,
    remark_name: &'static str,
    function: &str,
    pieces: &[(&str, &str)],
) {
    let mut diag = OptDiagnostic::new(DiagnosticKind::RemarkMissed, pass, remark_name, function);
    for (key, value) in pieces {
        diag = diag.arg(*key, *value);
    }
    ctx.emit(Diagnostic::Optimization(diag));
}

/// Runs a pass sequence over every defined function of a module
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pass to the sequence
    pub fn add_pass<P: Pass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// The default pipeline: instruction combination, control-flow
    /// simplification, aggressive dead-code elimination
    pub fn default_pipeline() -> Self {
        Self::new()
            .add_pass(InstCombine::new())
            .add_pass(SimplifyCfg::new())
            .add_pass(Adce::new())
    }

    /// Build a pipeline from a description string
    ///
    /// Recognized pass names are matched by substring, in canonical order;
    /// everything else in the description is ignored.
    pub fn from_description(description: &str) -> Self {
        let mut manager = Self::new();
        if description.contains("combine") {
            manager = manager.add_pass(InstCombine::new());
        }
        if description.contains("simplify-cfg") {
            manager = manager.add_pass(SimplifyCfg::new());
        }
        if description.contains("adce") {
            manager = manager.add_pass(Adce::new());
        }
        manager
    }

    /// Number of passes in the sequence
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Run every pass over every defined function, in order
    ///
    /// Functions run sequentially so remark emission order is reproducible
    /// across runs.
    pub fn run(&self, module: &mut Module, ctx: &Context) -> bool {
        let mut modified = false;
        for function in module.functions_mut() {
            if function.is_declaration {
                continue;
            }
            for pass in &self.passes {
                if pass.run(function, ctx) {
                    tracing::debug!(
                        pass = pass.name(),
                        function = %function.name,
                        "pass modified function"
                    );
                    modified = true;
                }
            }
        }
        modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_selects_passes_in_canonical_order() {
        let manager = PassManager::from_description("adce,combine");
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.passes[0].name(), "combine");
        assert_eq!(manager.passes[1].name(), "adce");
    }

    #[test]
    fn unknown_descriptions_build_an_empty_pipeline() {
        assert!(PassManager::from_description("licm,gvn").is_empty());
    }

    #[test]
    fn default_pipeline_has_the_three_core_passes() {
        let manager = PassManager::default_pipeline();
        let names: Vec<_> = manager.passes.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["combine", "simplify-cfg", "adce"]);
    }
}
