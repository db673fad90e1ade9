use serde::{Deserialize, Serialize};

/// Description recorded when the caller does not supply one.
pub const DEFAULT_DESCRIPTION: &str = "Generated IAM policy";

/// The on-disk shape of a saved policy:
/// `{"metadata": {...}, "policy": <document>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEnvelope {
    pub metadata: PolicyMetadata,
    pub policy: serde_json::Value,
}

impl PolicyEnvelope {
    /// Wrap `policy` with metadata stamped at the current local time.
    pub fn new(policy: serde_json::Value, description: Option<&str>) -> Self {
        Self {
            metadata: PolicyMetadata::now(description),
            policy,
        }
    }
}

/// Metadata stored alongside every saved policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    /// Local time of saving, ISO-8601 without offset.
    pub generated_at: String,
    pub description: String,
}

impl PolicyMetadata {
    pub fn now(description: Option<&str>) -> Self {
        Self {
            generated_at: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            description: description.unwrap_or(DEFAULT_DESCRIPTION).to_string(),
        }
    }
}

/// A policy read back from disk.
///
/// Files written by this crate carry an envelope; hand-written example files
/// are often a bare policy document. Both load into this type.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPolicy {
    /// Metadata key/value pairs in file order, when the file has a
    /// `metadata` object.
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    pub policy: serde_json::Value,
}

impl SavedPolicy {
    /// Split a file's JSON into metadata and policy.
    ///
    /// A top-level `policy` key marks an envelope; anything else is taken to
    /// be the policy itself.
    pub fn from_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(mut map) if map.contains_key("policy") => {
                let policy = map.remove("policy").unwrap_or_default();
                let metadata = match map.remove("metadata") {
                    Some(serde_json::Value::Object(meta)) => Some(meta),
                    _ => None,
                };
                Self { metadata, policy }
            }
            other => Self {
                metadata: None,
                policy: other,
            },
        }
    }
}
