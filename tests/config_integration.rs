//! Edit scripts applied to files on disk.

use hcledit::config::{
    apply_edits, apply_plan, load_from_path, load_from_str, plan_edits, ApplicationError, ConfigError,
    EditOutcome, EditReport,
};
use hcledit::WorkspaceGuard;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

/// Workspace holding a copy of the main.tf fixture.
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.tf"), load_fixture("main.tf.input")).unwrap();
    dir
}

fn outcomes(reports: &[EditReport]) -> Vec<(&str, &'static str)> {
    reports
        .iter()
        .map(|report| {
            let label = match &report.result {
                Ok(EditOutcome::Applied { .. }) => "applied",
                Ok(EditOutcome::AlreadyApplied { .. }) => "already-applied",
                Ok(EditOutcome::Skipped { .. }) => "skipped",
                Ok(EditOutcome::Failed { .. }) => "failed",
                Err(_) => "error",
            };
            (report.id.as_str(), label)
        })
        .collect()
}

#[test]
fn script_produces_golden_output() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_path(fixture_path("scale-web.toml")).unwrap();

    let reports = apply_edits(&script, &guard);
    assert_eq!(
        outcomes(&reports),
        vec![
            ("web-count", "applied"),
            ("web-ami", "applied"),
            ("web-monitoring", "applied"),
            ("drop-ami-type", "applied"),
            ("web-ip-output", "applied"),
            ("web-ip-value", "applied"),
        ]
    );

    let result = fs::read_to_string(workspace.path().join("main.tf")).unwrap();
    assert_eq!(result, load_fixture("main.tf.expected"));
}

#[test]
fn second_run_is_already_applied() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_path(fixture_path("scale-web.toml")).unwrap();

    apply_edits(&script, &guard);
    let after_first = fs::read_to_string(workspace.path().join("main.tf")).unwrap();

    let reports = apply_edits(&script, &guard);
    assert!(
        outcomes(&reports)
            .iter()
            .all(|(_, label)| *label == "already-applied"),
        "{:?}",
        outcomes(&reports)
    );
    let after_second = fs::read_to_string(workspace.path().join("main.tf")).unwrap();
    assert_eq!(after_first, after_second);
}

#[test]
fn planning_does_not_touch_disk() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_path(fixture_path("scale-web.toml")).unwrap();

    let plan = plan_edits(&script, &guard);
    let changed: Vec<_> = plan.changed_files().collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].after, load_fixture("main.tf.expected"));

    let on_disk = fs::read_to_string(workspace.path().join("main.tf")).unwrap();
    assert_eq!(on_disk, load_fixture("main.tf.input"));
}

#[test]
fn applying_a_plan_writes_its_planned_text() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_path(fixture_path("scale-web.toml")).unwrap();

    let plan = plan_edits(&script, &guard);
    let planned = plan.changed_files().next().unwrap().after.clone();
    let reports = apply_plan(plan);
    assert!(outcomes(&reports).iter().all(|(_, label)| *label == "applied"));
    assert_eq!(
        fs::read_to_string(workspace.path().join("main.tf")).unwrap(),
        planned
    );
}

#[test]
fn plan_is_not_applied_over_a_changed_file() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_path(fixture_path("scale-web.toml")).unwrap();

    let plan = plan_edits(&script, &guard);
    let edited = format!("# edited by hand\n{}", load_fixture("main.tf.input"));
    fs::write(workspace.path().join("main.tf"), &edited).unwrap();

    let reports = apply_plan(plan);
    assert!(reports
        .iter()
        .all(|report| matches!(report.result, Err(ApplicationError::Write { .. }))));
    assert_eq!(
        fs::read_to_string(workspace.path().join("main.tf")).unwrap(),
        edited
    );
}

#[test]
fn whole_float_value_is_already_applied_on_rerun() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_str(
        r#"
[meta]
name = "ratio"
workspace_relative = true

[[edits]]
id = "ratio"
file = "main.tf"
block = ["resource.aws_instance.web"]
operation = { type = "set-value", name = "ratio", value = 1.0 }
"#,
    )
    .unwrap();

    assert_eq!(outcomes(&apply_edits(&script, &guard)), vec![("ratio", "applied")]);
    assert!(fs::read_to_string(workspace.path().join("main.tf"))
        .unwrap()
        .contains("  ratio = 1.0\n"));
    assert_eq!(
        outcomes(&apply_edits(&script, &guard)),
        vec![("ratio", "already-applied")]
    );
}

#[test]
fn constraints_skip_and_fail() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_str(
        r#"
[meta]
name = "constraints"
workspace_relative = true

[[edits]]
id = "keep-count"
file = "main.tf"
block = ["resource.aws_instance.web"]
constraint = { ensure_absent = true }
operation = { type = "set-value", name = "count", value = 9 }

[[edits]]
id = "need-subnet"
file = "main.tf"
block = ["resource.aws_instance.web"]
constraint = { ensure_present = true }
operation = { type = "set-value", name = "subnet_id", value = "subnet-1" }
"#,
    )
    .unwrap();

    let reports = apply_edits(&script, &guard);
    assert_eq!(
        outcomes(&reports),
        vec![("keep-count", "skipped"), ("need-subnet", "failed")]
    );

    let on_disk = fs::read_to_string(workspace.path().join("main.tf")).unwrap();
    assert_eq!(on_disk, load_fixture("main.tf.input"));
}

#[test]
fn missing_block_is_a_query_error() {
    let workspace = setup_workspace();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_str(
        r#"
[meta]
name = "missing"
workspace_relative = true

[[edits]]
id = "db-count"
file = "main.tf"
block = ["resource.aws_instance.db"]
operation = { type = "set-value", name = "count", value = 2 }
"#,
    )
    .unwrap();

    let reports = apply_edits(&script, &guard);
    assert!(matches!(
        reports[0].result,
        Err(ApplicationError::Query { .. })
    ));
}

#[test]
fn unparsable_file_fails_every_edit_for_it() {
    let workspace = setup_workspace();
    fs::write(workspace.path().join("broken.tf"), "resource \"x\" {\n").unwrap();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();
    let script = load_from_str(
        r#"
[meta]
name = "broken"
workspace_relative = true

[[edits]]
id = "first"
file = "broken.tf"
operation = { type = "set-value", name = "a", value = 1 }

[[edits]]
id = "second"
file = "broken.tf"
operation = { type = "set-value", name = "b", value = 2 }

[[edits]]
id = "unrelated"
file = "main.tf"
operation = { type = "set-value", name = "c", value = 3 }
"#,
    )
    .unwrap();

    let reports = apply_edits(&script, &guard);
    assert_eq!(
        outcomes(&reports),
        vec![
            ("first", "error"),
            ("second", "error"),
            ("unrelated", "applied"),
        ]
    );
    assert!(matches!(
        reports[0].result,
        Err(ApplicationError::Parse { .. })
    ));
    assert_eq!(
        fs::read_to_string(workspace.path().join("broken.tf")).unwrap(),
        "resource \"x\" {\n"
    );
}

#[test]
fn paths_outside_workspace_are_rejected() {
    let workspace = setup_workspace();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("other.tf"), "a = 1\n").unwrap();
    let guard = WorkspaceGuard::new(workspace.path()).unwrap();

    let script = load_from_str(&format!(
        r#"
[meta]
name = "escape"
workspace_relative = false

[[edits]]
id = "outside"
file = '{}'
operation = {{ type = "set-value", name = "a", value = 2 }}
"#,
        outside.path().join("other.tf").display()
    ))
    .unwrap();

    let reports = apply_edits(&script, &guard);
    assert!(matches!(
        reports[0].result,
        Err(ApplicationError::Unsafe { .. })
    ));
    assert_eq!(
        fs::read_to_string(outside.path().join("other.tf")).unwrap(),
        "a = 1\n"
    );
}

#[test]
fn invalid_script_reports_location() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("bad.toml");
    fs::write(
        &script,
        r#"
[meta]
name = "bad"

[[edits]]
id = "dup"
file = "main.tf"
operation = { type = "remove-attribute", name = "a" }

[[edits]]
id = "dup"
file = "main.tf"
operation = { type = "remove-attribute", name = "b" }
"#,
    )
    .unwrap();

    let err = load_from_path(&script).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
    assert_eq!(err.path(), Some(script.as_path()));
}
