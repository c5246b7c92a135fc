//! Live remark collection
//!
//! The collector installs a [`DiagnosticHandler`] on a module's context and
//! converts every optimization remark and resource-limit notice the pipeline
//! emits into a [`Remark`]. Appends are serialized under a mutex: pass
//! managers may report from several worker threads at once. After the
//! pipeline finishes, [`RemarkCollector::snapshot`] hands out the captured
//! list and no further synchronization is needed.

use std::sync::{Arc, Mutex, PoisonError};

use aion_ir::{Context, Diagnostic, DiagnosticHandler, DiagnosticKind, OptDiagnostic,
    ResourceDiagnostic};

use crate::{Remark, RemarkArgument, RemarkKind, SourceLocation};

/// Captures remarks emitted by a live pass pipeline
#[derive(Default)]
pub struct RemarkCollector {
    remarks: Arc<Mutex<Vec<Remark>>>,
}

impl RemarkCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach this collector to a module's diagnostic channel
    ///
    /// Must run before any pass does; diagnostics emitted earlier go to the
    /// default handler.
    pub fn install(&self, ctx: &mut Context) {
        ctx.set_diagnostic_handler(Arc::new(CollectorHandler {
            remarks: Arc::clone(&self.remarks),
        }));
    }

    /// All captured remarks, in emission order
    pub fn snapshot(&self) -> Vec<Remark> {
        self.remarks.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Captured remarks of kind `Missed`
    pub fn missed(&self) -> Vec<Remark> {
        self.filtered(Remark::is_missed)
    }

    /// Captured remarks of kind `Applied`
    pub fn applied(&self) -> Vec<Remark> {
        self.filtered(Remark::is_applied)
    }

    /// Captured remarks of the analysis kinds
    pub fn analysis(&self) -> Vec<Remark> {
        self.filtered(Remark::is_analysis)
    }

    /// Captured remarks for one function
    pub fn for_function(&self, function_name: &str) -> Vec<Remark> {
        self.filtered(|r| r.function_name == function_name)
    }

    /// Captured remarks emitted by one pass
    pub fn for_pass(&self, pass_name: &str) -> Vec<Remark> {
        self.filtered(|r| r.pass_name == pass_name)
    }

    fn filtered(&self, keep: impl Fn(&Remark) -> bool) -> Vec<Remark> {
        self.remarks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

struct CollectorHandler {
    remarks: Arc<Mutex<Vec<Remark>>>,
}

impl DiagnosticHandler for CollectorHandler {
    fn handle(&self, diagnostic: &Diagnostic) -> bool {
        let remark = match diagnostic {
            Diagnostic::Optimization(d) => convert_optimization(d),
            Diagnostic::ResourceLimit(d) => convert_resource(d),
            Diagnostic::Note { .. } => return false,
        };
        self.remarks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(remark);
        true
    }
}

fn convert_kind(kind: DiagnosticKind) -> RemarkKind {
    match kind {
        DiagnosticKind::Remark | DiagnosticKind::MachineRemark => RemarkKind::Applied,
        DiagnosticKind::RemarkMissed | DiagnosticKind::MachineRemarkMissed => RemarkKind::Missed,
        DiagnosticKind::RemarkAnalysis | DiagnosticKind::MachineRemarkAnalysis => {
            RemarkKind::Analysis
        }
        DiagnosticKind::RemarkAnalysisAliasing => RemarkKind::AnalysisAliasing,
        DiagnosticKind::RemarkAnalysisFpCommute => RemarkKind::AnalysisFpCommute,
    }
}

/// Strip the `<prefix>:` header the diagnostic printer prepends
fn strip_header(printed: &str) -> String {
    if let Some(colon) = printed.find(':') {
        let rest = &printed[colon + 1..];
        let trimmed = rest.trim_start_matches(' ');
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    printed.to_string()
}

fn convert_optimization(diag: &OptDiagnostic) -> Remark {
    let args = diag
        .args
        .iter()
        .map(|arg| RemarkArgument {
            key: arg.key.clone(),
            value: arg.value.clone(),
            loc: arg
                .loc
                .as_ref()
                .map(SourceLocation::from)
                .unwrap_or_default(),
        })
        .collect();

    Remark {
        kind: convert_kind(diag.kind),
        pass_name: diag.pass_name.clone(),
        remark_name: diag.remark_name.clone(),
        function_name: diag.function_name.clone(),
        loc: diag
            .loc
            .as_ref()
            .map(SourceLocation::from)
            .unwrap_or_default(),
        message: strip_header(&diag.print()),
        args,
        hotness: diag.hotness,
        is_machine: diag.kind.is_machine(),
    }
}

fn convert_resource(diag: &ResourceDiagnostic) -> Remark {
    Remark {
        kind: RemarkKind::Analysis,
        pass_name: "backend".to_string(),
        remark_name: diag.resource_name.clone(),
        function_name: diag.function_name.clone(),
        loc: SourceLocation::default(),
        message: diag.print(),
        args: vec![
            RemarkArgument::new("Size", diag.size.to_string()),
            RemarkArgument::new("Limit", diag.limit.to_string()),
        ],
        hotness: None,
        is_machine: true,
    }
}
