//! Rule-set catalogue.
//!
//! A [`RuleSet`] holds the two fixed action lists the validator checks
//! statements against. The built-in lists live in static slices; a custom set
//! can be deserialized from YAML (see [`crate::loader`]) or built directly in
//! tests.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Built-in catalogue
// ---------------------------------------------------------------------------

/// Wildcard actions that grant far more than any single use case needs.
pub static OVERLY_PERMISSIVE_ACTIONS: &[&str] = &[
    "*",
    "s3:*",
    "ec2:*",
    "iam:*",
    "dynamodb:*",
    "lambda:*",
    "cloudformation:*",
];

/// Actions that are sometimes required but deserve a second look.
pub static SENSITIVE_ACTIONS: &[&str] = &[
    "iam:CreateUser",
    "iam:CreateRole",
    "iam:PutRolePolicy",
    "iam:AttachRolePolicy",
    "iam:AttachUserPolicy",
    "s3:PutBucketPolicy",
    "ec2:RunInstances",
    "lambda:CreateFunction",
    "kms:Decrypt",
    "secretsmanager:GetSecretValue",
];

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// Immutable action lists injected into a
/// [`PolicyValidator`](crate::PolicyValidator).
///
/// Matching is exact string equality: `s3:*` flags the literal action
/// `s3:*`, never `s3:GetObject`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Actions reported as blocking issues.
    #[serde(default = "default_overly_permissive")]
    pub overly_permissive_actions: Vec<String>,
    /// Actions reported as non-blocking warnings.
    #[serde(default = "default_sensitive")]
    pub sensitive_actions: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            overly_permissive_actions: default_overly_permissive(),
            sensitive_actions: default_sensitive(),
        }
    }
}

impl RuleSet {
    /// Build a rule set from arbitrary lists.
    pub fn new<P, S>(overly_permissive: P, sensitive: S) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            overly_permissive_actions: overly_permissive.into_iter().map(Into::into).collect(),
            sensitive_actions: sensitive.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_overly_permissive(&self, action: &str) -> bool {
        self.overly_permissive_actions.iter().any(|a| a == action)
    }

    pub fn is_sensitive(&self, action: &str) -> bool {
        self.sensitive_actions.iter().any(|a| a == action)
    }

    /// Entries that appear more than once in either list.
    pub(crate) fn duplicates(&self) -> Vec<&str> {
        let mut dups = Vec::new();
        for list in [&self.overly_permissive_actions, &self.sensitive_actions] {
            let mut seen = BTreeSet::new();
            for entry in list {
                if !seen.insert(entry.as_str()) {
                    dups.push(entry.as_str());
                }
            }
        }
        dups
    }
}

fn default_overly_permissive() -> Vec<String> {
    OVERLY_PERMISSIVE_ACTIONS.iter().map(|s| s.to_string()).collect()
}

fn default_sensitive() -> Vec<String> {
    SENSITIVE_ACTIONS.iter().map(|s| s.to_string()).collect()
}
