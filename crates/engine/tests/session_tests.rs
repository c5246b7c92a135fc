//! End-to-end sessions: the single-input flow and the before/after flow

use std::io::Write;

use aion_diff::DiffKind;
use aion_engine::{AnalysisConfig, AnalysisInputs, Analyzer, ErrorKind};
use aion_remarks::RemarkKind;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

const FOLDABLE: &str = "\
fn @math() -> i32 {
entry:
  %a = add i32 2, 3
  %b = mul i32 %a, 4
  ret i32 %b
}
";

#[test]
fn single_input_flow_runs_the_default_pipeline() {
    let analyzer = Analyzer::new();
    let session = analyzer
        .run_from_ir(FOLDABLE, &AnalysisConfig::default())
        .expect("analysis failed");

    assert_eq!(session.pipeline_used, "default-O2");
    assert!(!session.verification_failed);

    // The folds show up as applied remarks and as a shrinking diff.
    assert!(session.remarks.iter().any(|r| r.kind == RemarkKind::Applied));
    assert!(session.diff.instruction_delta() < 0);
    let func = &session.diff.functions[0];
    assert_eq!(func.kind, DiffKind::Modified);
    assert!(func.was_optimized());

    // Applied remarks produce no diagnostics.
    assert!(session.diagnostics.is_empty());

    // The printed states bracket the transformation.
    assert!(session.before_ir.contains("add i32 2, 3"));
    assert!(session.after_ir.contains("ret i32 20"));
}

#[test]
fn unnamed_blocks_get_stable_synthetic_names() {
    let analyzer = Analyzer::new();
    let session = analyzer
        .run_from_ir(
            "fn @f(ptr %p) -> void {\n  store i32 1, ptr %p\n  ret void\n}",
            &AnalysisConfig::default(),
        )
        .expect("analysis failed");

    assert!(session.before_ir.contains("aion.bb.0:"));
    assert_eq!(session.diff.functions[0].blocks[0].block_name, "aion.bb.0");
}

#[test]
fn explicit_pipeline_description_is_recorded_and_honored() {
    let analyzer = Analyzer::new();
    let config = AnalysisConfig {
        pass_pipeline: "combine".to_string(),
        ..AnalysisConfig::default()
    };
    let session = analyzer.run_from_ir(FOLDABLE, &config).expect("analysis failed");

    assert_eq!(session.pipeline_used, "combine");
    assert!(session
        .remarks
        .iter()
        .all(|r| r.pass_name == "combine"));
}

#[test]
fn missed_remarks_from_the_pipeline_reach_the_classifier() {
    let analyzer = Analyzer::new();
    let session = analyzer
        .run_from_ir(
            "declare fn @opaque() -> i32\n\
             fn @f() -> void {\nentry:\n  %r = call i32 @opaque()\n  ret void\n}",
            &AnalysisConfig::default(),
        )
        .expect("analysis failed");

    let missed: Vec<_> = session.remarks.iter().filter(|r| r.is_missed()).collect();
    assert_eq!(missed.len(), 1);
    assert_eq!(missed[0].remark_name, "SideEffects");

    // The fallback classification covers passes outside the rule database.
    assert_eq!(session.diagnostics.len(), 1);
    assert_eq!(session.diagnostics[0].pass_name, "adce");
    assert_eq!(session.diagnostics[0].function_name, "f");
}

#[test]
fn stack_limit_produces_a_backend_remark() {
    let analyzer = Analyzer::new();
    let config = AnalysisConfig {
        stack_size_limit: Some(16),
        ..AnalysisConfig::default()
    };
    let session = analyzer
        .run_from_ir(
            "fn @big(ptr %out) -> void {\nentry:\n  %buf = alloca i64, 8\n  store i64 1, ptr %buf\n  ret void\n}",
            &config,
        )
        .expect("analysis failed");

    let backend: Vec<_> = session
        .remarks
        .iter()
        .filter(|r| r.pass_name == "backend")
        .collect();
    assert_eq!(backend.len(), 1);
    let remark = backend[0];
    assert_eq!(remark.remark_name, "stack-size");
    assert_eq!(remark.args[0].key, "Size");
    assert_eq!(remark.args[0].value, "64");
    assert_eq!(remark.args[1].key, "Limit");
    assert_eq!(remark.args[1].value, "16");
    assert!(remark.is_machine);
}

#[test]
fn sessions_are_reproducible() {
    let analyzer = Analyzer::new();
    let config = AnalysisConfig::default();
    let first = analyzer.run_from_ir(FOLDABLE, &config).expect("analysis failed");
    let second = analyzer.run_from_ir(FOLDABLE, &config).expect("analysis failed");

    assert_eq!(first.before_ir, second.before_ir);
    assert_eq!(first.after_ir, second.after_ir);
    assert_eq!(first.remarks, second.remarks);
    assert_eq!(first.diagnostics, second.diagnostics);
}

#[test]
fn before_after_flow_replays_a_record_file() {
    let before = write_temp(
        "fn @loop_dependency(ptr %a, ptr %b, i32 %n) -> void {\nentry:\n  ret void\n}\n\
         fn @helper() -> i32 {\nentry:\n  ret i32 1\n}",
    );
    let after = write_temp(
        "fn @loop_dependency(ptr %a, ptr %b, i32 %n) -> void {\nentry:\n  ret void\n}",
    );
    let record = write_temp(
        "--- !Missed\n\
         Pass: 'loop-vectorize'\n\
         Name: 'MissedDetails'\n\
         Function: 'loop_dependency'\n\
         Args:\n\
         \x20 - String: 'unsafe dependent'\n\
         \x20 - String: ' memory operations'\n",
    );

    let analyzer = Analyzer::new();
    let session = analyzer
        .run_from_before_after(before.path(), after.path(), Some(record.path()))
        .expect("analysis failed");

    // No pass ran; the remarks came from the record file.
    assert!(session.pipeline_used.is_empty());
    assert_eq!(session.remarks.len(), 1);
    assert_eq!(session.remarks[0].message, "unsafe dependent memory operations");

    // The helper disappeared between the snapshots.
    assert_eq!(session.diff.removed_functions, 1);
    let helper = session
        .diff
        .functions
        .iter()
        .find(|f| f.function_name == "helper")
        .expect("missing helper diff");
    assert!(helper.was_inlined());

    // The remark classified as the critical aliasing pattern.
    assert!(session.has_critical());
    let diag = &session.diagnostics[0];
    assert_eq!(
        diag.short_reason,
        "Loop vectorization blocked: memory dependency / aliasing"
    );
    assert!(diag.suggestions.len() >= 3);
    assert!(diag.suggestions[0].description.contains("__restrict__"));
}

#[test]
fn before_after_flow_works_without_a_record_file() {
    let module = "fn @f() -> void {\nentry:\n  ret void\n}";
    let before = write_temp(module);
    let after = write_temp(module);

    let session = Analyzer::new()
        .run_from_before_after(before.path(), after.path(), None)
        .expect("analysis failed");

    assert!(session.remarks.is_empty());
    assert!(session.diagnostics.is_empty());
    assert!(!session.diff.has_changes());
    assert_eq!(session.contexts.len(), 2);
}

#[test]
fn conflicting_inputs_are_config_errors() {
    let analyzer = Analyzer::new();
    let config = AnalysisConfig::default();

    let only_before = AnalysisInputs {
        before: Some("a.air".into()),
        ..AnalysisInputs::default()
    };
    assert_eq!(
        analyzer.run(&only_before, &config).unwrap_err().kind(),
        ErrorKind::ConfigError
    );

    let both = AnalysisInputs {
        input: Some("x.air".into()),
        before: Some("a.air".into()),
        after: Some("b.air".into()),
        ..AnalysisInputs::default()
    };
    assert_eq!(
        analyzer.run(&both, &config).unwrap_err().kind(),
        ErrorKind::ConfigError
    );

    let nothing = AnalysisInputs::default();
    assert_eq!(
        analyzer.run(&nothing, &config).unwrap_err().kind(),
        ErrorKind::ConfigError
    );
}

#[test]
fn parse_and_io_failures_carry_their_kind() {
    let analyzer = Analyzer::new();
    let config = AnalysisConfig::default();

    let error = analyzer.run_from_ir("fn @broken(", &config).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ParseError);

    let error = analyzer
        .run_from_file("/nonexistent/input.air", &config)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::IoError);
}

#[test]
fn verification_failures_abort_the_session() {
    let analyzer = Analyzer::new();
    let error = analyzer
        .run_from_ir(
            "fn @f() -> i32 {\nentry:\n  ret i32 %ghost\n}",
            &AnalysisConfig::default(),
        )
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::VerifyError);
}

#[test]
fn collector_views_match_session_remarks() {
    // Exercise the re-verify toggle together with a pipeline that both
    // applies and misses.
    let analyzer = Analyzer::new();
    let config = AnalysisConfig {
        verify_each_pass: true,
        ..AnalysisConfig::default()
    };
    let session = analyzer
        .run_from_ir(
            "declare fn @opaque() -> i32\n\
             fn @f() -> i32 {\nentry:\n  %dead = add i32 1, 2\n  %r = call i32 @opaque()\n  ret i32 0\n}",
            &config,
        )
        .expect("analysis failed");

    let applied = session.remarks.iter().filter(|r| r.is_applied()).count();
    let missed = session.remarks.iter().filter(|r| r.is_missed()).count();
    assert!(applied >= 1);
    assert_eq!(missed, 1);
    assert_eq!(session.remarks.len(), applied + missed);
}
