//! # Aion remarks
//!
//! Optimization remarks are the structured diagnostics passes emit to
//! describe what they did, missed, or analyzed. This crate defines the
//! normalized [`Remark`] value type and its two producers:
//!
//! - [`RemarkCollector`] captures remarks live from a pass pipeline through
//!   the context diagnostic channel;
//! - [`record::parse_record_file`] parses a persisted optimization-record
//!   document into the same value type.
//!
//! Downstream stages are source-agnostic: a replayed record and a live run
//! produce value-equal remarks for the same logical event (the record format
//! does not encode the machine-kind bit, which defaults to `false`).

pub mod collector;
pub mod record;

pub use collector::RemarkCollector;
pub use record::{parse_record_file, parse_record_str, RecordError};

use serde::{Deserialize, Serialize};

/// A position in the user's source code
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// A location is valid iff it names a file
    pub fn is_valid(&self) -> bool {
        !self.file.is_empty()
    }

    /// `file:line:col`, or `<unknown>` for invalid locations
    pub fn format(&self) -> String {
        if !self.is_valid() {
            return "<unknown>".to_string();
        }
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}

impl From<&aion_ir::DebugLoc> for SourceLocation {
    fn from(loc: &aion_ir::DebugLoc) -> Self {
        Self {
            file: loc.file.clone(),
            line: loc.line,
            column: loc.column,
        }
    }
}

/// Classification of a remark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemarkKind {
    /// The pass applied a transformation
    Applied,
    /// The pass wanted to transform but could not
    Missed,
    /// Supporting analysis output
    Analysis,
    /// Analysis output about aliasing obstacles
    AnalysisAliasing,
    /// Analysis output about floating-point commutativity obstacles
    AnalysisFpCommute,
}

/// One structured key/value argument of a remark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemarkArgument {
    pub key: String,
    pub value: String,
    pub loc: SourceLocation,
}

impl RemarkArgument {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            loc: SourceLocation::default(),
        }
    }
}

/// The normalized form of one optimization diagnostic
///
/// `pass_name` is non-empty for any ingested remark; `args` preserves
/// emission order so output stays reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remark {
    pub kind: RemarkKind,
    pub pass_name: String,
    pub remark_name: String,
    pub function_name: String,
    pub loc: SourceLocation,
    pub message: String,
    pub args: Vec<RemarkArgument>,
    pub hotness: Option<f32>,
    pub is_machine: bool,
}

impl Remark {
    pub fn is_missed(&self) -> bool {
        self.kind == RemarkKind::Missed
    }

    pub fn is_applied(&self) -> bool {
        self.kind == RemarkKind::Applied
    }

    pub fn is_analysis(&self) -> bool {
        matches!(
            self.kind,
            RemarkKind::Analysis | RemarkKind::AnalysisAliasing | RemarkKind::AnalysisFpCommute
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_location_formats_as_unknown() {
        assert_eq!(SourceLocation::default().format(), "<unknown>");
        assert_eq!(
            SourceLocation::new("a.c", 3, 7).format(),
            "a.c:3:7"
        );
    }

    #[test]
    fn analysis_covers_all_analysis_kinds() {
        let mut remark = Remark {
            kind: RemarkKind::AnalysisAliasing,
            pass_name: "loop-vectorize".into(),
            remark_name: String::new(),
            function_name: "f".into(),
            loc: SourceLocation::default(),
            message: String::new(),
            args: Vec::new(),
            hotness: None,
            is_machine: false,
        };
        assert!(remark.is_analysis());
        remark.kind = RemarkKind::Missed;
        assert!(remark.is_missed() && !remark.is_analysis());
    }
}
