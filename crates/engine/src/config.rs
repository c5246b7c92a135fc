//! Analysis configuration

use std::path::PathBuf;

/// Optimization-level hint used when no explicit pipeline is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptLevel {
    O0,
    O1,
    #[default]
    O2,
    O3,
    Os,
    Oz,
}

impl OptLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::O0 => "O0",
            Self::O1 => "O1",
            Self::O2 => "O2",
            Self::O3 => "O3",
            Self::Os => "Os",
            Self::Oz => "Oz",
        }
    }

    /// Parse a level name; unknown names fall back to the default
    pub fn parse(name: &str) -> Self {
        match name {
            "O0" => Self::O0,
            "O1" => Self::O1,
            "O3" => Self::O3,
            "Os" => Self::Os,
            "Oz" => Self::Oz,
            _ => Self::O2,
        }
    }
}

impl std::fmt::Display for OptLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs for a single-input analysis run
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Explicit pass pipeline description; empty selects the default
    /// pipeline for `opt_level`
    pub pass_pipeline: String,
    pub opt_level: OptLevel,
    pub enable_all_remarks: bool,
    pub enable_hotness_info: bool,
    /// Re-run the verifier after the pipeline completes
    pub verify_each_pass: bool,
    pub inline_threshold: u32,
    pub enable_vectorization: bool,
    pub enable_unrolling: bool,
    /// Emit a backend resource notice for functions whose stack frame
    /// exceeds this many bytes
    pub stack_size_limit: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pass_pipeline: String::new(),
            opt_level: OptLevel::default(),
            enable_all_remarks: true,
            enable_hotness_info: false,
            verify_each_pass: false,
            inline_threshold: 225,
            enable_vectorization: true,
            enable_unrolling: true,
            stack_size_limit: None,
        }
    }
}

/// The inputs of one run, as the CLI collaborator hands them over
///
/// Exactly one of `input` or the `before`/`after` pair must be present;
/// `record` only accompanies the pair.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInputs {
    pub input: Option<PathBuf>,
    pub before: Option<PathBuf>,
    pub after: Option<PathBuf>,
    pub record: Option<PathBuf>,
}
