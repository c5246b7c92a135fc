//! The session orchestrator

use std::path::Path;

use aion_diagnostics::DiagnosticEngine;
use aion_diff::DiffEngine;
use aion_ir::{
    parse_module, parse_module_file, verify_module, Context, Diagnostic, Module,
    ResourceDiagnostic,
};
use aion_remarks::{parse_record_file, Remark, RemarkCollector};

use crate::passes::PassManager;
use crate::{AnalysisConfig, AnalysisError, AnalysisInputs, AnalysisSession, Result};

/// Synthetic name prefix for blocks the input left unnamed
const ANON_BLOCK_PREFIX: &str = "aion.bb";

/// Drives the two analysis flows and assembles sessions
pub struct Analyzer {
    diff_engine: DiffEngine,
    diag_engine: DiagnosticEngine,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            diff_engine: DiffEngine::new(),
            diag_engine: DiagnosticEngine::new(),
        }
    }

    /// Validate a set of inputs and dispatch to the matching flow
    pub fn run(&self, inputs: &AnalysisInputs, config: &AnalysisConfig) -> Result<AnalysisSession> {
        match (&inputs.input, &inputs.before, &inputs.after) {
            (_, Some(_), None) => Err(AnalysisError::Config("'before' requires 'after'".into())),
            (_, None, Some(_)) => Err(AnalysisError::Config("'after' requires 'before'".into())),
            (Some(_), Some(_), Some(_)) => Err(AnalysisError::Config(
                "cannot combine a single input with a before/after pair".into(),
            )),
            (None, None, None) => Err(AnalysisError::Config(
                "no input specified: provide an IR file or a before/after pair".into(),
            )),
            (None, Some(before), Some(after)) => {
                self.run_from_before_after(before, after, inputs.record.as_deref())
            }
            (Some(input), None, None) => self.run_from_file(input, config),
        }
    }

    /// Flow A from a file path
    pub fn run_from_file(
        &self,
        path: impl AsRef<Path>,
        config: &AnalysisConfig,
    ) -> Result<AnalysisSession> {
        let path = path.as_ref();
        let ctx = Context::new(path.display().to_string());
        let module = parse_module_file(path, &ctx)?;
        self.execute_analysis(module, ctx, config)
    }

    /// Flow A from IR text
    pub fn run_from_ir(&self, ir_text: &str, config: &AnalysisConfig) -> Result<AnalysisSession> {
        let ctx = Context::new("<string>");
        let module = parse_module(ir_text, &ctx)?;
        self.execute_analysis(module, ctx, config)
    }

    /// Flow B: two snapshots plus an optional record file, no pass execution
    pub fn run_from_before_after(
        &self,
        before_path: impl AsRef<Path>,
        after_path: impl AsRef<Path>,
        record_path: Option<&Path>,
    ) -> Result<AnalysisSession> {
        let before_ctx = Context::new(before_path.as_ref().display().to_string());
        let after_ctx = Context::new(after_path.as_ref().display().to_string());

        let before = parse_module_file(before_path, &before_ctx)?;
        let after = parse_module_file(after_path, &after_ctx)?;

        let remarks = match record_path {
            Some(path) => parse_record_file(path)?,
            None => Vec::new(),
        };

        let mut session = self.run_from_modules(before, after, remarks);
        session.contexts = vec![before_ctx, after_ctx];
        Ok(session)
    }

    /// Compare two already-parsed modules with externally supplied remarks
    ///
    /// The caller keeps responsibility for handing the owning contexts to
    /// the session.
    pub fn run_from_modules(
        &self,
        before: Module,
        after: Module,
        remarks: Vec<Remark>,
    ) -> AnalysisSession {
        let diff = self.diff_engine.diff(&before, &after);
        let diagnostics = self.diag_engine.analyze(&remarks, &diff);
        AnalysisSession {
            contexts: Vec::new(),
            before_ir: before.print_to_string(),
            after_ir: after.print_to_string(),
            before_module: before,
            after_module: after,
            remarks,
            diff,
            diagnostics,
            pipeline_used: String::new(),
            verification_failed: false,
        }
    }

    /// Flow A core: verify, clone, run the pipeline under a collector, diff
    /// and classify
    fn execute_analysis(
        &self,
        mut before: Module,
        mut ctx: Context,
        config: &AnalysisConfig,
    ) -> Result<AnalysisSession> {
        // Later stages key block diffs on names; hand every unnamed block a
        // stable identity first.
        for function in before.functions_mut() {
            if function.is_declaration {
                continue;
            }
            function.name_anonymous_blocks(ANON_BLOCK_PREFIX);
        }

        verify_module(&before)?;

        let pipeline_used = if config.pass_pipeline.is_empty() {
            format!("default-{}", config.opt_level)
        } else {
            config.pass_pipeline.clone()
        };

        let before_ir = before.print_to_string();
        let mut after = before.clone();

        let collector = RemarkCollector::new();
        collector.install(&mut ctx);

        let manager = if config.pass_pipeline.is_empty() {
            PassManager::default_pipeline()
        } else {
            PassManager::from_description(&config.pass_pipeline)
        };
        manager.run(&mut after, &ctx);

        if let Some(limit) = config.stack_size_limit {
            check_stack_sizes(&after, &ctx, limit);
        }

        if config.verify_each_pass {
            verify_module(&after)?;
        }

        let after_ir = after.print_to_string();
        let remarks = collector.snapshot();
        let diff = self.diff_engine.diff(&before, &after);
        let diagnostics = self.diag_engine.analyze(&remarks, &diff);

        Ok(AnalysisSession {
            contexts: vec![ctx],
            before_module: before,
            after_module: after,
            before_ir,
            after_ir,
            remarks,
            diff,
            diagnostics,
            pipeline_used,
            verification_failed: false,
        })
    }
}

/// Backend-style resource check: report functions whose stack frame exceeds
/// the configured limit
fn check_stack_sizes(module: &Module, ctx: &Context, limit: u64) {
    for function in module.functions() {
        let mut frame_size = 0u64;
        for block in &function.blocks {
            for instruction in &block.instructions {
                if let aion_ir::Opcode::Alloca { ty, count } = &instruction.opcode {
                    frame_size += ty.size_in_bytes() * u64::from(*count);
                }
            }
        }
        if frame_size > limit {
            ctx.emit(Diagnostic::ResourceLimit(ResourceDiagnostic {
                resource_name: "stack-size".to_string(),
                function_name: function.name.clone(),
                size: frame_size,
                limit,
            }));
        }
    }
}
