//! # Aion diagnostics
//!
//! Turns raw missed-optimization remarks into actionable diagnoses. The
//! engine owns a database of known failure patterns; each non-`Applied`
//! remark is matched against it by case-insensitive substring selectors on
//! the pass name, remark name and message, templates are interpolated with
//! the remark's arguments, the matching function's structural diff is
//! attached, and the results are stably sorted by severity.
//!
//! Rule matching deliberately avoids regular expressions: three
//! independently wildcardable substrings keep the table readable and the
//! matcher `O(|rules|)` per remark with small constants.

mod patterns;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use aion_diff::{FunctionDiff, ModuleDiff};
use aion_remarks::{Remark, SourceLocation};

/// How badly a missed optimization is expected to hurt
///
/// Ordered most severe first; the discriminant is the sort key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl SeverityLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }

    /// Compact badge used by report renderers
    pub const fn badge(self) -> &'static str {
        match self {
            Self::Critical => "[!!]",
            Self::High => "[! ]",
            Self::Medium => "[~ ]",
            Self::Low => "[- ]",
            Self::Info => "[i ]",
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A human-readable repair paired with an example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSuggestion {
    pub description: String,
    pub code_example: String,
    pub is_source_level: bool,
    pub is_ir_level: bool,
}

/// Source-level suggestion
pub(crate) fn fix(description: &str, code_example: &str) -> FixSuggestion {
    FixSuggestion {
        description: description.to_string(),
        code_example: code_example.to_string(),
        is_source_level: true,
        is_ir_level: false,
    }
}

/// IR-level suggestion
pub(crate) fn ir_fix(description: &str, code_example: &str) -> FixSuggestion {
    FixSuggestion {
        description: description.to_string(),
        code_example: code_example.to_string(),
        is_source_level: false,
        is_ir_level: true,
    }
}

/// One rule of the failure-pattern database
///
/// The three substring selectors may each be empty, which makes them
/// wildcards. Templates may reference `{ArgKey}` placeholders, including the
/// reserved `{FunctionName}`.
#[derive(Debug, Clone)]
pub struct OptimizationPattern {
    pub pass_substr: &'static str,
    pub remark_substr: &'static str,
    pub message_substr: &'static str,
    pub short_reason: &'static str,
    pub detailed_explanation: &'static str,
    pub root_cause: &'static str,
    pub optimizer_intent: &'static str,
    pub suggestions: Vec<FixSuggestion>,
    pub severity: SeverityLevel,
    pub estimated_speedup: f64,
}

/// One classified missed optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    pub pass_name: String,
    pub function_name: String,
    pub location: SourceLocation,
    pub short_reason: String,
    pub detailed_explanation: String,
    pub root_cause: String,
    pub optimizer_intent: String,
    pub suggestions: Vec<FixSuggestion>,
    pub severity: SeverityLevel,
    pub ir_diff: Option<FunctionDiff>,
    pub estimated_speedup: f64,
    pub is_machine: bool,
}

impl DiagnosticResult {
    pub fn has_fix(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// Case-insensitive substring match; an empty pattern matches everything
pub(crate) fn matches_pattern(text: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }
    text.to_lowercase().contains(&pattern.to_lowercase())
}

/// The pattern database and classifier
pub struct DiagnosticEngine {
    patterns: Vec<OptimizationPattern>,
}

impl Default for DiagnosticEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosticEngine {
    /// Build the engine with the full rule database registered
    pub fn new() -> Self {
        let mut engine = Self {
            patterns: Vec::new(),
        };
        engine.register_patterns();
        engine
    }

    /// Number of registered rules
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Append a rule to the database
    ///
    /// Registration order matters: earlier rules win score ties.
    pub fn register_pattern(&mut self, pattern: OptimizationPattern) {
        self.patterns.push(pattern);
    }

    /// Classify every non-`Applied` remark and attach per-function diffs
    ///
    /// The result is stably sorted by ascending severity, so remarks of
    /// equal severity keep their emission order.
    pub fn analyze(&self, remarks: &[Remark], diff: &ModuleDiff) -> Vec<DiagnosticResult> {
        let diff_map: FxHashMap<&str, &FunctionDiff> = diff
            .functions
            .iter()
            .map(|f| (f.function_name.as_str(), f))
            .collect();

        let mut results: Vec<DiagnosticResult> = remarks
            .iter()
            .filter(|remark| !remark.is_applied())
            .map(|remark| {
                let mut result = self.analyze_remark(remark);
                if let Some(fd) = diff_map.get(remark.function_name.as_str()) {
                    result.ir_diff = Some((*fd).clone());
                }
                result
            })
            .collect();

        results.sort_by_key(|r| r.severity);
        results
    }

    /// Classify one remark against the database
    pub fn analyze_remark(&self, remark: &Remark) -> DiagnosticResult {
        match self.find_matching_pattern(remark) {
            Some(pattern) => self.build_from_pattern(remark, pattern),
            None => self.build_fallback(remark),
        }
    }

    /// Scan the database in registration order and keep the best-scoring
    /// match: pass name weighs 2, remark name 3, message 4; first
    /// registration wins ties
    fn find_matching_pattern(&self, remark: &Remark) -> Option<&OptimizationPattern> {
        let mut best: Option<&OptimizationPattern> = None;
        let mut best_score = -1i32;

        'patterns: for pattern in &self.patterns {
            let mut score = 0i32;
            for (text, selector, weight) in [
                (remark.pass_name.as_str(), pattern.pass_substr, 2),
                (remark.remark_name.as_str(), pattern.remark_substr, 3),
                (remark.message.as_str(), pattern.message_substr, 4),
            ] {
                if !selector.is_empty() {
                    if !matches_pattern(text, selector) {
                        continue 'patterns;
                    }
                    score += weight;
                }
            }
            if score > best_score {
                best_score = score;
                best = Some(pattern);
            }
        }

        best
    }

    fn build_from_pattern(
        &self,
        remark: &Remark,
        pattern: &OptimizationPattern,
    ) -> DiagnosticResult {
        DiagnosticResult {
            pass_name: remark.pass_name.clone(),
            function_name: remark.function_name.clone(),
            location: remark.loc.clone(),
            short_reason: pattern.short_reason.to_string(),
            detailed_explanation: interpolate_args(pattern.detailed_explanation, remark),
            root_cause: interpolate_args(pattern.root_cause, remark),
            optimizer_intent: interpolate_args(pattern.optimizer_intent, remark),
            suggestions: pattern.suggestions.clone(),
            severity: pattern.severity,
            ir_diff: None,
            estimated_speedup: pattern.estimated_speedup,
            is_machine: remark.is_machine,
        }
    }

    fn build_fallback(&self, remark: &Remark) -> DiagnosticResult {
        DiagnosticResult {
            pass_name: remark.pass_name.clone(),
            function_name: remark.function_name.clone(),
            location: remark.loc.clone(),
            short_reason: format!("Optimization missed: {}", remark.remark_name),
            detailed_explanation: format!(
                "Pass '{}' reported a missed optimization with remark '{}'. The raw \
                 message from the pass is: {}\n\nThis remark does not have a detailed \
                 explanation in the aion database yet. The raw remark information above \
                 should point you toward the issue.",
                remark.pass_name, remark.remark_name, remark.message
            ),
            root_cause: format!("See raw message: {}", remark.message),
            optimizer_intent: format!(
                "The {} pass attempted a transformation that was blocked by a precondition.",
                remark.pass_name
            ),
            suggestions: Vec::new(),
            severity: SeverityLevel::Medium,
            ir_diff: None,
            estimated_speedup: 0.0,
            is_machine: remark.is_machine,
        }
    }
}

/// Replace `{Key}` placeholders with remark argument values
///
/// The first argument with a given key wins; the reserved `{FunctionName}`
/// placeholder substitutes the remark's function name. Placeholders with no
/// matching key stay literal, documenting which key the rule expected.
fn interpolate_args(template: &str, remark: &Remark) -> String {
    let mut result = template.to_string();
    let mut seen: Vec<&str> = Vec::new();
    for arg in &remark.args {
        if seen.contains(&arg.key.as_str()) {
            continue;
        }
        seen.push(&arg.key);
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result.replace("{FunctionName}", &remark.function_name)
}
