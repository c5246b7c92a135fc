//! The analysis session

use aion_diagnostics::{DiagnosticResult, SeverityLevel};
use aion_diff::ModuleDiff;
use aion_ir::{Context, Module};
use aion_remarks::Remark;

/// The immutable result bundle of one analysis run
///
/// The session owns the parser contexts alongside the modules parsed into
/// them, so both live exactly as long as the session. Before and after
/// modules of a replayed comparison never share a context.
#[derive(Debug)]
pub struct AnalysisSession {
    /// Parser contexts backing the modules, dropped after them
    pub contexts: Vec<Context>,
    pub before_module: Module,
    pub after_module: Module,
    /// Printed form of the module before the pipeline
    pub before_ir: String,
    /// Printed form of the module after the pipeline
    pub after_ir: String,
    /// Captured or replayed remarks, in emission order
    pub remarks: Vec<Remark>,
    pub diff: ModuleDiff,
    /// Classified diagnostics, most severe first
    pub diagnostics: Vec<DiagnosticResult>,
    /// The pipeline description that ran, or `default-<level>`
    pub pipeline_used: String,
    pub verification_failed: bool,
}

impl AnalysisSession {
    /// Whether any diagnostic reached `Critical` severity
    pub fn has_critical(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == SeverityLevel::Critical)
    }
}
