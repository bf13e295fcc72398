//! Command-line interface: get, set, append-block, apply and check.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn hcledit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hcledit"))
        .args(args)
        .env_remove("HCLEDIT_LOG")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Workspace holding a copy of the main.tf fixture.
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::copy(fixture_path("main.tf.input"), dir.path().join("main.tf")).unwrap();
    dir
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_help() {
    let output = hcledit(&["--help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Format-preserving editing of HCL configuration files"));
    for command in ["apply", "get", "set", "append-block", "check"] {
        assert!(text.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_get_prints_expression_source() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");

    let output = hcledit(&[
        "get",
        path_arg(&file),
        "instance_type",
        "--block",
        "resource.aws_instance.web",
    ]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "\"t3.micro\"");
}

#[test]
fn test_get_json() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");

    let output = hcledit(&[
        "get",
        path_arg(&file),
        "ami",
        "-b",
        "resource.aws_instance.web",
        "--json",
    ]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["kind"], "literal");
    assert_eq!(json["value"], "ami-123456");
}

#[test]
fn test_get_missing_attribute_fails() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");

    let output = hcledit(&["get", path_arg(&file), "nope"]);
    assert!(!output.status.success());
}

#[test]
fn test_set_rewrites_only_the_value() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");

    let output = hcledit(&[
        "set",
        path_arg(&file),
        "count",
        "3",
        "--block",
        "resource.aws_instance.web",
    ]);
    assert!(output.status.success());

    let expected = fs::read_to_string(fixture_path("main.tf.input"))
        .unwrap()
        .replace("count         = 1", "count         = 3");
    assert_eq!(fs::read_to_string(&file).unwrap(), expected);
}

#[test]
fn test_set_traversal() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");

    let output = hcledit(&[
        "set",
        path_arg(&file),
        "ami",
        "var.ami",
        "--traversal",
        "-b",
        "resource.aws_instance.web",
    ]);
    assert!(output.status.success());
    assert!(fs::read_to_string(&file)
        .unwrap()
        .contains("  ami           = var.ami\n"));
}

#[test]
fn test_set_dry_run_leaves_file() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");
    let before = fs::read_to_string(&file).unwrap();

    let output = hcledit(&["set", path_arg(&file), "region", "eu-west-1", "--dry-run"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("would change"));
    assert_eq!(fs::read_to_string(&file).unwrap(), before);
}

#[test]
fn test_append_block() {
    let workspace = setup_workspace();
    let file = workspace.path().join("main.tf");

    let output = hcledit(&[
        "append-block",
        path_arg(&file),
        "output",
        "web_ip",
        "--blank-line",
    ]);
    assert!(output.status.success());
    assert!(fs::read_to_string(&file)
        .unwrap()
        .ends_with("}\n\noutput \"web_ip\" {\n}\n"));
}

#[test]
fn test_apply_and_reapply() {
    let workspace = setup_workspace();
    let script = fixture_path("scale-web.toml");

    let output = hcledit(&[
        "apply",
        path_arg(&script),
        "--workspace",
        path_arg(workspace.path()),
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Summary:"));
    assert!(text.contains("6 applied"));
    assert_eq!(
        fs::read_to_string(workspace.path().join("main.tf")).unwrap(),
        fs::read_to_string(fixture_path("main.tf.expected")).unwrap()
    );

    let output = hcledit(&[
        "apply",
        path_arg(&script),
        "--workspace",
        path_arg(workspace.path()),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("6 already applied"));
}

#[test]
fn test_apply_dry_run() {
    let workspace = setup_workspace();
    let script = fixture_path("scale-web.toml");

    let output = hcledit(&[
        "apply",
        path_arg(&script),
        "--workspace",
        path_arg(workspace.path()),
        "--dry-run",
        "--diff",
    ]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("DRY RUN"));
    assert!(text.contains("+  count         = 3"));
    assert_eq!(
        fs::read_to_string(workspace.path().join("main.tf")).unwrap(),
        fs::read_to_string(fixture_path("main.tf.input")).unwrap()
    );
}

#[test]
fn test_check_walks_directories() {
    let workspace = setup_workspace();
    fs::create_dir_all(workspace.path().join("modules/net")).unwrap();
    fs::write(
        workspace.path().join("modules/net/vpc.hcl"),
        "cidr = \"10.0.0.0/16\" # main\n",
    )
    .unwrap();
    fs::create_dir_all(workspace.path().join(".terraform")).unwrap();
    fs::write(workspace.path().join(".terraform/broken.tf"), "a = {\n").unwrap();

    let output = hcledit(&["check", path_arg(workspace.path())]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("2 checked"));

    fs::write(workspace.path().join("broken.tf"), "a = {\n").unwrap();
    let output = hcledit(&["check", path_arg(workspace.path())]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_workspace() {
    let output = hcledit(&[
        "apply",
        path_arg(&fixture_path("scale-web.toml")),
        "--workspace",
        "/nonexistent/workspace",
    ]);
    assert!(!output.status.success());
}
