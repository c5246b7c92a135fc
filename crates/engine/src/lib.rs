//! # Aion engine
//!
//! The session orchestrator of the aion diagnostic engine. Two flows produce
//! an [`AnalysisSession`]:
//!
//! - **single input**: parse one IR module, verify it, clone it, drive a
//!   pass pipeline over the clone while a remark collector listens, then
//!   diff the two states and classify the captured remarks;
//! - **before/after**: parse two IR snapshots into independent contexts,
//!   optionally replay a persisted optimization-record file, and run the
//!   differ and classifier without executing any pass.
//!
//! Errors are surfaced as [`AnalysisError`] values; a failed run returns no
//! partial session.

pub mod analyzer;
pub mod config;
pub mod passes;
pub mod session;

pub use analyzer::Analyzer;
pub use config::{AnalysisConfig, AnalysisInputs, OptLevel};
pub use passes::{Adce, InstCombine, Pass, PassManager, SimplifyCfg};
pub use session::AnalysisSession;

use thiserror::Error;

/// Result type for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Everything that can go wrong while assembling a session
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// IR text failed to parse
    #[error("failed to parse IR: {0}")]
    Parse(#[source] aion_ir::ParseError),
    /// IR failed structural verification before or after the pipeline
    #[error("{0}")]
    Verify(#[from] aion_ir::VerifyError),
    /// A requested file could not be opened or read
    #[error("i/o error: {0}")]
    Io(String),
    /// Mutually exclusive inputs were supplied
    #[error("conflicting inputs: {0}")]
    Config(String),
    /// Invariant violation inside the engine
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`AnalysisError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseError,
    VerifyError,
    IoError,
    ConfigError,
    InternalError,
}

impl AnalysisError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::ParseError,
            Self::Verify(_) => ErrorKind::VerifyError,
            Self::Io(_) => ErrorKind::IoError,
            Self::Config(_) => ErrorKind::ConfigError,
            Self::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<aion_ir::ParseError> for AnalysisError {
    fn from(error: aion_ir::ParseError) -> Self {
        match error {
            aion_ir::ParseError::Io { .. } => Self::Io(error.to_string()),
            syntax @ aion_ir::ParseError::Syntax { .. } => Self::Parse(syntax),
        }
    }
}

impl From<aion_remarks::RecordError> for AnalysisError {
    fn from(error: aion_remarks::RecordError) -> Self {
        Self::Io(error.to_string())
    }
}
