//! Whole-vault checks against temporary directories, through the library and
//! the `vaultmark` binary

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use vaultmark::{IssueKind, Vault};

const SCHEMA: &str = r#"
types:
  person:
    default_path: people/
    name_field: name
    fields:
      name: { type: string, required: true }
  project:
    default_path: projects/
    fields:
      owner: { type: ref, target: person }
      status: { type: enum, values: [active, paused] }
traits:
  due: { type: date }
  done: { type: boolean }
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_vault() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "schema.yaml", SCHEMA);
    write(
        root,
        "people/freya.md",
        "---\ntype: person\nname: Freya\nalias: The Queen\n---\n# Notes\n\n- @done Learned seidr\n",
    );
    write(
        root,
        "projects/bifrost.md",
        "---\ntype: project\nowner: \"[[people/freya]]\"\nstatus: active\n---\n# Plan\n\n- @due(2025-03-01) Talk to [[people/freya]]\n- Ask her about [[daily/2025-02-01]]\n",
    );
    write(
        root,
        "daily/2025-02-01.md",
        "# Standup\n\n```\n@due(never) [[nowhere]]\n```\n",
    );
    write(root, ".git/ignored.md", "[[nowhere]]\n");
    temp
}

#[test]
fn test_clean_vault() {
    let temp = sample_vault();
    let vault = Vault::open(temp.path()).unwrap();
    let report = vault.check();

    assert_eq!(report.files_checked, 3);
    assert!(report.issues.is_empty(), "{:#?}", report.issues);
    assert!(report.schema_issues.is_empty(), "{:#?}", report.schema_issues);
    assert!(report.passed_with(true));
}

#[test]
fn test_broken_vault() {
    let temp = sample_vault();
    let root = temp.path();
    write(root, "people/loki.md", "---\ntype: person\n---\n");
    write(
        root,
        "notes/saga.md",
        "---\ntype: saga\n---\n@done(maybe) See [[projects/bifrost#old-plan]] and [[people/odin]].\n",
    );

    let vault = Vault::open(root).unwrap();
    let report = vault.check();
    let found: Vec<(&str, IssueKind)> = report
        .issues
        .iter()
        .map(|i| (i.file_path.as_str(), i.kind))
        .collect();

    assert_eq!(
        found,
        vec![
            ("notes/saga.md", IssueKind::UnknownType),
            ("notes/saga.md", IssueKind::InvalidTraitValue),
            ("notes/saga.md", IssueKind::StaleFragment),
            ("notes/saga.md", IssueKind::MissingReference),
            ("people/loki.md", IssueKind::MissingRequiredField),
        ]
    );
    let missing = &report.issues[3];
    assert_eq!(
        missing.fix_command.as_deref(),
        Some("vaultmark new person \"people/odin\"")
    );
    assert_eq!(report.error_count, 4);
    assert_eq!(report.warning_count, 1);
    assert!(!report.passed());
}

#[test]
fn test_alias_and_name_refs_suggest_full_paths() {
    let temp = sample_vault();
    write(
        temp.path(),
        "notes/ride.md",
        "Saddle up with [[The Queen]].\nThen [[Freya]] takes the lead.\n",
    );

    let report = Vault::open(temp.path()).unwrap().check();
    let found: Vec<_> = report
        .issues
        .iter()
        .map(|i| (i.kind, i.line, i.value.as_deref()))
        .collect();
    assert_eq!(
        found,
        vec![
            (IssueKind::ShortRefCouldBeFullPath, 1, Some("The Queen")),
            (IssueKind::ShortRefCouldBeFullPath, 2, Some("Freya")),
        ]
    );
    assert_eq!(report.error_count, 0);
    assert!(report.passed());
    assert!(!report.passed_with(true));
}

#[test]
fn test_duplicate_aliases_are_reported() {
    let temp = sample_vault();
    write(
        temp.path(),
        "people/freyja.md",
        "---\ntype: person\nname: Freyja\nalias: The Queen\n---\n",
    );

    let report = Vault::open(temp.path()).unwrap().check();
    let kinds: Vec<_> = report.schema_issues.iter().map(|i| i.kind).collect();
    assert_eq!(kinds, vec![IssueKind::DuplicateAlias]);
    assert_eq!(
        report.schema_issues[0].message,
        "Alias 'The Queen' is used by multiple objects: people/freya, people/freyja"
    );
}

#[test]
fn test_cli_exit_codes_and_formats() {
    let temp = sample_vault();
    let bin = env!("CARGO_BIN_EXE_vaultmark");

    let clean = Command::new(bin)
        .args(["check", "--strict"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(clean.status.success());
    assert_eq!(
        String::from_utf8_lossy(&clean.stdout),
        "Checked 3 files: no issues\n"
    );

    write(temp.path(), "people/loki.md", "---\ntype: person\n---\n");
    let broken = Command::new(bin)
        .args(["check", "--format", "json"])
        .env("VAULTMARK_VAULT", temp.path())
        .output()
        .unwrap();
    assert_eq!(broken.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&broken.stdout).unwrap();
    assert_eq!(json["error_count"], 1);
    assert_eq!(json["issues"][0]["type"], "missing_required_field");
    assert_eq!(json["issues"][0]["level"], "error");
    assert_eq!(json["issues"][0]["file_path"], "people/loki.md");
}
