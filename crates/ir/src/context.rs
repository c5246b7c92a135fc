//! Per-module contexts
//!
//! Every parsed module belongs to exactly one [`Context`]. The context owns
//! the diagnostic channel for pipelines run over its module; the analysis
//! session owns the contexts for as long as any of its modules is alive, and
//! before/after modules of a replayed comparison never share one.

use std::sync::Arc;

use crate::diag::{Diagnostic, DiagnosticHandler};

/// Owner of a module's diagnostic channel
pub struct Context {
    /// Name of the source the module came from, used in error messages
    name: String,
    handler: Option<Arc<dyn DiagnosticHandler>>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Install a diagnostic handler; replaces any previous one
    pub fn set_diagnostic_handler(&mut self, handler: Arc<dyn DiagnosticHandler>) {
        self.handler = Some(handler);
    }

    /// Report a diagnostic
    ///
    /// Claimed diagnostics stop at the installed handler; everything else
    /// reaches the default handler, which logs it.
    pub fn emit(&self, diagnostic: Diagnostic) {
        if let Some(handler) = &self.handler {
            if handler.handle(&diagnostic) {
                return;
            }
        }
        tracing::debug!(context = %self.name, "unclaimed diagnostic: {}", diagnostic.print());
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.name)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{DiagnosticKind, OptDiagnostic};
    use std::sync::Mutex;

    struct Recorder {
        claimed: Mutex<Vec<String>>,
        claim_notes: bool,
    }

    impl DiagnosticHandler for Recorder {
        fn handle(&self, diagnostic: &Diagnostic) -> bool {
            if matches!(diagnostic, Diagnostic::Note { .. }) && !self.claim_notes {
                return false;
            }
            self.claimed.lock().unwrap().push(diagnostic.print());
            true
        }
    }

    #[test]
    fn claimed_diagnostics_reach_the_handler() {
        let recorder = Arc::new(Recorder {
            claimed: Mutex::new(Vec::new()),
            claim_notes: false,
        });
        let mut ctx = Context::new("test");
        ctx.set_diagnostic_handler(recorder.clone());

        ctx.emit(Diagnostic::Optimization(OptDiagnostic::new(
            DiagnosticKind::Remark,
            "combine",
            "ConstantFold",
            "f",
        )));
        ctx.emit(Diagnostic::Note {
            message: "ignored".into(),
        });

        let claimed = recorder.claimed.lock().unwrap();
        assert_eq!(claimed.len(), 1);
        assert!(claimed[0].starts_with("combine:"));
    }
}
