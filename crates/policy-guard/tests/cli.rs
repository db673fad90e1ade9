use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RESPONSE: &str = r#"I understand you need read access to one bucket.

```json
{
  "Version": "2012-10-17",
  "Statement": [
    {
      "Effect": "Allow",
      "Action": ["s3:GetObject"],
      "Resource": "arn:aws:s3:::data-bucket/*"
    }
  ]
}
```

The policy grants only GetObject."#;

const WIDE_POLICY: &str =
    r#"{"Statement": [{"Effect": "Allow", "Action": "iam:*", "Resource": "*"}]}"#;

fn fenced(doc: &str) -> String {
    format!("Here you go:\n```json\n{doc}\n```\n")
}

/// Command running inside an isolated working directory.
fn cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("policy-guard").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn extract_prints_response_and_validation() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["extract", "--validate", RESPONSE])
        .assert()
        .success()
        .stdout(contains("I understand you need read access"))
        .stdout(contains("=== Policy Validation Results ==="))
        .stdout(contains("✅ Policy is valid according to best practices."))
        .stdout(contains(
            "- Consider adding conditions to Statement 1 for additional security",
        ));
}

#[test]
fn extract_json_only_from_stdin() {
    let tmp = TempDir::new().unwrap();
    let output = cmd(tmp.path())
        .args(["extract", "--json-only"])
        .write_stdin(RESPONSE)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["Statement"][0]["Action"][0], "s3:GetObject");
}

#[test]
fn extract_from_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("answer.txt");
    fs::write(&path, fenced(WIDE_POLICY)).unwrap();
    cmd(tmp.path())
        .args(["extract", "--validate", "--file", "answer.txt"])
        .assert()
        .success()
        .stdout(contains("⚠️ Policy has some issues to address:"))
        .stdout(contains("- Missing 'Version' field in policy"))
        .stdout(contains("- Statement 1 contains overly permissive action: iam:*"))
        .stdout(contains("- Statement 1 applies to all resources ('*')"));
}

#[test]
fn extract_bare_policy_by_brace_scan() {
    let tmp = TempDir::new().unwrap();
    let text = r#"Policy: {"Version": "2012-10-17", "Statement": {"Action": "s3:*", "Resource": "arn:aws:s3:::b"}} -- end"#;
    cmd(tmp.path())
        .args(["extract", "--json-only", "--validate", text])
        .assert()
        .success()
        .stdout(contains("\"Action\": \"s3:*\""))
        .stdout(contains("- Statement 1 contains overly permissive action: s3:*"));
}

#[test]
fn extract_not_found_fails() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["extract", "Sorry, I cannot help with that."])
        .assert()
        .failure()
        .stderr(contains("Could not extract a valid policy"))
        .stderr(contains("Sorry, I cannot help with that."));
}

#[test]
fn extract_save_then_list_view_validate() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["extract", "--save", "data reader", RESPONSE])
        .assert()
        .success()
        .stdout(contains("Policy saved to:"))
        .stdout(contains("data_reader.json"));

    let raw = fs::read_to_string(tmp.path().join("saved_policies/data_reader.json")).unwrap();
    let saved: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved["policy"]["Version"], "2012-10-17");
    assert!(saved["metadata"]["description"]
        .as_str()
        .unwrap()
        .starts_with("Policy extracted from: I understand"));

    cmd(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Found 1 saved policies:"))
        .stdout(contains("1. data_reader.json"));

    cmd(tmp.path())
        .args(["view", "data_reader.json"])
        .assert()
        .success()
        .stdout(contains("=== Policy Metadata ==="))
        .stdout(contains("description: Policy extracted from:"))
        .stdout(contains("=== Policy Content ==="))
        .stdout(contains("\"Resource\": \"arn:aws:s3:::data-bucket/*\""));

    cmd(tmp.path())
        .args(["validate", "data_reader.json"])
        .assert()
        .success()
        .stdout(contains("=== Policy Validation Results: data_reader.json ==="))
        .stdout(contains("✅ Policy is valid"));
}

#[test]
fn list_empty_store() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No saved policies found."));
}

#[test]
fn validate_many_keeps_argument_order_and_reads_examples() {
    let tmp = TempDir::new().unwrap();
    let examples = tmp.path().join("example_policies");
    fs::create_dir_all(&examples).unwrap();
    fs::write(examples.join("wide.json"), WIDE_POLICY).unwrap();
    fs::write(
        examples.join("tight.json"),
        r#"{"Version": "2012-10-17", "Statement": {"Action": "s3:GetObject", "Resource": "arn:aws:s3:::b/*", "Condition": {"Bool": {"aws:SecureTransport": "true"}}}}"#,
    )
    .unwrap();

    let output = cmd(tmp.path())
        .args(["validate", "--format", "json", "wide.json", "tight.json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let entries: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(entries[0]["file"], "wide.json");
    assert_eq!(entries[0]["report"]["valid"], false);
    assert_eq!(entries[1]["file"], "tight.json");
    assert_eq!(entries[1]["report"]["valid"], true);
    assert_eq!(entries[1]["report"]["issues"], serde_json::json!([]));
}

#[test]
fn validate_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["validate", "ghost.json"])
        .assert()
        .failure()
        .stderr(contains("policy file 'ghost.json' not found"));
}

#[test]
fn custom_rules_file_changes_findings() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("rules.yaml"),
        "overly_permissive_actions: [\"s3:GetObject\"]\nsensitive_actions: []\n",
    )
    .unwrap();
    cmd(tmp.path())
        .args(["--rules", "rules.yaml", "extract", "--validate", RESPONSE])
        .assert()
        .success()
        .stdout(contains(
            "Statement 1 contains overly permissive action: s3:GetObject",
        ));
}

#[test]
fn config_file_sets_policies_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("policy-guard.yaml"), "policies_dir: store\n").unwrap();
    cmd(tmp.path())
        .args(["extract", "--save", "p", RESPONSE])
        .assert()
        .success();
    assert!(tmp.path().join("store/p.json").is_file());
    assert!(!tmp.path().join("saved_policies").exists());
}

#[test]
fn markdown_report_format() {
    let tmp = TempDir::new().unwrap();
    cmd(tmp.path())
        .args(["extract", "--validate", "--format", "markdown", &fenced(WIDE_POLICY)])
        .assert()
        .success()
        .stdout(contains("**⚠️ Policy has some issues to address:**"))
        .stdout(contains("### Issues:"))
        .stdout(contains("### Recommendations:").and(contains("- Specify exact resource ARNs")));
}
