//! The diagnostic channel
//!
//! Pass pipelines report what they did (or failed to do) as structured
//! diagnostics emitted through the owning [`Context`](crate::Context). A
//! diagnostic is either an optimization remark, a resource-limit notice, or
//! a plain note. Consumers install a [`DiagnosticHandler`]; a handler that
//! returns `false` lets the diagnostic fall through to the default handler.
//!
//! The printed form of an optimization diagnostic is
//! `<pass>: <message pieces>` — the same shape the persisted record format
//! reconstructs from its `Args` sequence, so live and replayed remarks read
//! identically downstream.

use crate::DebugLoc;

/// Source-level kind of an optimization diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Remark,
    RemarkMissed,
    RemarkAnalysis,
    RemarkAnalysisAliasing,
    RemarkAnalysisFpCommute,
    MachineRemark,
    MachineRemarkMissed,
    MachineRemarkAnalysis,
}

impl DiagnosticKind {
    /// Whether this kind originates from machine-level (backend) passes
    pub const fn is_machine(self) -> bool {
        matches!(
            self,
            Self::MachineRemark | Self::MachineRemarkMissed | Self::MachineRemarkAnalysis
        )
    }
}

/// One structured key/value piece of a diagnostic message
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticArgument {
    pub key: String,
    pub value: String,
    pub loc: Option<DebugLoc>,
}

impl DiagnosticArgument {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            loc: None,
        }
    }
}

/// An optimization remark emitted by a pass
#[derive(Debug, Clone, PartialEq)]
pub struct OptDiagnostic {
    pub kind: DiagnosticKind,
    pub pass_name: String,
    pub remark_name: String,
    pub function_name: String,
    pub loc: Option<DebugLoc>,
    pub args: Vec<DiagnosticArgument>,
    pub hotness: Option<f32>,
}

impl OptDiagnostic {
    pub fn new(
        kind: DiagnosticKind,
        pass_name: impl Into<String>,
        remark_name: impl Into<String>,
        function_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            pass_name: pass_name.into(),
            remark_name: remark_name.into(),
            function_name: function_name.into(),
            loc: None,
            args: Vec::new(),
            hotness: None,
        }
    }

    /// Append a message piece
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(DiagnosticArgument::new(key, value));
        self
    }

    pub fn with_loc(mut self, loc: DebugLoc) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn with_hotness(mut self, hotness: f32) -> Self {
        self.hotness = Some(hotness);
        self
    }

    /// The human-readable printed form, `<pass>: <pieces>`
    pub fn print(&self) -> String {
        let message: String = self.args.iter().map(|a| a.value.as_str()).collect();
        format!("{}: {}", self.pass_name, message)
    }
}

/// A resource-limit notice (stack frame size, etc.)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDiagnostic {
    pub resource_name: String,
    pub function_name: String,
    pub size: u64,
    pub limit: u64,
}

impl ResourceDiagnostic {
    pub fn print(&self) -> String {
        format!(
            "{} ({}) exceeds limit ({}) in function '{}'",
            self.resource_name, self.size, self.limit, self.function_name
        )
    }
}

/// Anything a pass pipeline can report through a context
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    Optimization(OptDiagnostic),
    ResourceLimit(ResourceDiagnostic),
    /// Free-form informational output; never claimed by remark collectors
    Note { message: String },
}

impl Diagnostic {
    pub fn print(&self) -> String {
        match self {
            Self::Optimization(d) => d.print(),
            Self::ResourceLimit(d) => d.print(),
            Self::Note { message } => message.clone(),
        }
    }
}

/// Capability interface for diagnostic consumers
///
/// `handle` returns `true` iff the diagnostic was claimed. Handlers may be
/// invoked from multiple pass-manager threads and must serialize their own
/// state.
pub trait DiagnosticHandler: Send + Sync {
    fn handle(&self, diagnostic: &Diagnostic) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printed_form_concatenates_argument_values() {
        let diag = OptDiagnostic::new(
            DiagnosticKind::RemarkMissed,
            "loop-vectorize",
            "MissedDetails",
            "f",
        )
        .arg("String", "loop not")
        .arg("String", " vectorized");
        assert_eq!(diag.print(), "loop-vectorize: loop not vectorized");
    }

    #[test]
    fn machine_kinds_are_flagged() {
        assert!(DiagnosticKind::MachineRemarkMissed.is_machine());
        assert!(!DiagnosticKind::RemarkMissed.is_machine());
    }
}
