use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::rules::RuleSet;

/// Load a [`RuleSet`] from a YAML file on disk.
///
/// Lists omitted from the file fall back to the built-in catalogue.
pub fn load_rules(path: impl AsRef<Path>) -> Result<RuleSet> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rules file: {}", path.display()))?;
    load_rules_from_str(&contents)
        .with_context(|| format!("failed to parse rules file: {}", path.display()))
}

/// Parse and validate a [`RuleSet`] from a YAML string.
pub fn load_rules_from_str(yaml: &str) -> Result<RuleSet> {
    let rules: RuleSet = serde_yml::from_str(yaml).context("YAML deserialization failed")?;
    validate(&rules)?;
    Ok(rules)
}

/// Run post-deserialization validation checks.
fn validate(rules: &RuleSet) -> Result<()> {
    let lists = [&rules.overly_permissive_actions, &rules.sensitive_actions];
    if lists.iter().flat_map(|l| l.iter()).any(|a| a.trim().is_empty()) {
        bail!("action entries must not be empty");
    }

    if let Some(dup) = rules.duplicates().first() {
        bail!("duplicate action entry: '{dup}'");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let rules = load_rules_from_str("{}").unwrap();
        assert_eq!(rules, RuleSet::default());
    }

    #[test]
    fn partial_document_keeps_other_default() {
        let rules = load_rules_from_str(
            r#"
overly_permissive_actions:
  - "*"
  - "sqs:*"
"#,
        )
        .unwrap();
        assert_eq!(rules.overly_permissive_actions, vec!["*", "sqs:*"]);
        assert_eq!(rules.sensitive_actions, RuleSet::default().sensitive_actions);
    }

    #[test]
    fn explicit_empty_list_disables_rule() {
        let rules = load_rules_from_str("sensitive_actions: []").unwrap();
        assert!(rules.sensitive_actions.is_empty());
        assert!(rules.is_overly_permissive("*"));
    }

    #[test]
    fn reject_empty_entry() {
        let err = load_rules_from_str(
            r#"
sensitive_actions:
  - "kms:Decrypt"
  - ""
"#,
        )
        .unwrap_err();
        assert!(
            err.to_string().contains("must not be empty"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn reject_duplicate_entry() {
        let err = load_rules_from_str(
            r#"
overly_permissive_actions: ["s3:*", "s3:*"]
"#,
        )
        .unwrap_err();
        assert!(
            err.to_string().contains("duplicate action entry"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn reject_wrong_type() {
        let err = load_rules_from_str("sensitive_actions: 12").unwrap_err();
        assert!(
            err.to_string().contains("YAML deserialization failed"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn load_from_nonexistent_file() {
        let err = load_rules("/does/not/exist.yaml").unwrap_err();
        assert!(
            err.to_string().contains("failed to read rules file"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(&path, "overly_permissive_actions: [\"sns:*\"]\n").unwrap();
        let rules = load_rules(&path).unwrap();
        assert!(rules.is_overly_permissive("sns:*"));
        assert!(!rules.is_overly_permissive("s3:*"));
    }
}
