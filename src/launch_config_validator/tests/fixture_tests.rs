use launch_config_validator::{
    collect::collect_files, validate_files_with, BuiltinSchemas, DiagnosticKind, Report,
    StaticProvider, ValidateOptions,
};
use std::path::{Path, PathBuf};

fn fixtures(sub: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(sub)
}

fn validate_isolated(paths: &[PathBuf]) -> Report {
    let provider = StaticProvider::new();
    let schemas = BuiltinSchemas::new().unwrap();
    let options = ValidateOptions {
        isolated: true,
        ..Default::default()
    };
    validate_files_with(paths, &options, &provider, &schemas).unwrap()
}

fn kinds(report: &Report) -> Vec<DiagnosticKind> {
    report.diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn test_correct_tree_passes_isolated() {
    let report = validate_isolated(&[fixtures("correct")]);
    assert!(
        report.passed(),
        "unexpected diagnostics: {:#?}",
        report.diagnostics
    );
    assert_eq!(report.documents, 6);
}

#[test]
fn test_correct_files_pass_one_at_a_time() {
    for file in collect_files(&[fixtures("correct")]).unwrap() {
        let report = validate_isolated(&[file.clone()]);
        assert!(report.passed(), "{}: {:#?}", file.display(), report.diagnostics);
    }
}

#[test]
fn test_correct_tree_captures_nodes() {
    let report = validate_isolated(&[fixtures("correct")]);
    let base = report
        .nodes
        .iter()
        .find(|n| n.name.as_deref() == Some("base_driver"))
        .expect("base_driver captured");
    assert_eq!(base.package.as_deref(), Some("athena_base"));
    assert_eq!(base.namespace.as_deref(), Some("/athena"));
    assert_eq!(base.params_files.len(), 2);

    // sensors.launch.yaml is only reported through the include
    let lidars: Vec<_> = report
        .nodes
        .iter()
        .filter(|n| n.name.as_deref() == Some("lidar"))
        .collect();
    assert_eq!(lidars.len(), 1);
    assert_eq!(lidars[0].namespace.as_deref(), Some("/athena/sensors"));

    // guarded off by use_sim_time=false
    assert!(!report
        .nodes
        .iter()
        .any(|n| n.package.as_deref() == Some("nav2_map_server")));
}

#[test]
fn test_each_incorrect_file_fails_isolated() {
    let files = collect_files(&[fixtures("incorrect")]).unwrap();
    assert_eq!(files.len(), 11);
    for file in files {
        let report = validate_isolated(&[file.clone()]);
        assert!(!report.passed(), "{} should fail", file.display());
        assert_eq!(report.exit_code(), 1);
    }
}

#[test]
fn test_incorrect_files_report_expected_kind() {
    let cases = [
        ("launch/unknown_substitution.launch.yaml", DiagnosticKind::UnsupportedSubstitution),
        ("launch/undeclared_variable.launch.yaml", DiagnosticKind::UnsupportedSubstitution),
        ("launch/node_without_exec.launch.yaml", DiagnosticKind::SchemaViolation),
        ("launch/conflict.launch.yaml", DiagnosticKind::ClassificationConflict),
        ("launch/unbalanced.launch.yaml", DiagnosticKind::SyntaxError),
        ("launch/missing_env.launch.yaml", DiagnosticKind::EnvVarMissing),
        ("launch/undefined_guard.launch.yaml", DiagnosticKind::UnsupportedSubstitution),
        ("launch/invalid_syntax.launch.yaml", DiagnosticKind::YamlSyntax),
        ("config/duplicate_key.yaml", DiagnosticKind::DuplicateKey),
        ("config/empty.yaml", DiagnosticKind::EmptyDocument),
        ("config/parameters_not_mapping.yaml", DiagnosticKind::SchemaViolation),
    ];

    for (rel, expected) in cases {
        let report = validate_isolated(&[fixtures("incorrect").join(rel)]);
        assert!(
            kinds(&report).contains(&expected),
            "{}: expected {:?}, got {:?}",
            rel,
            expected,
            kinds(&report)
        );
    }
}
