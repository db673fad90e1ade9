//! Two-tier policy extraction from free-form model output.

use std::fmt;

use policy_engine::Policy;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::scanner::{fenced_block, first_object_with_keys};

/// Which strategy located the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// A "```json" fenced block.
    FencedBlock,
    /// A balanced object with top-level `Version` and `Statement` keys.
    BraceScan,
}

impl fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FencedBlock => write!(f, "fenced_block"),
            Self::BraceScan => write!(f, "brace_scan"),
        }
    }
}

/// A syntactically valid JSON document found in a larger text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPolicy {
    /// The document text exactly as it appeared, minus surrounding
    /// whitespace.
    pub document: String,
    /// The parsed document. Any JSON value; its policy shape is not checked.
    pub value: serde_json::Value,
    pub source: ExtractionSource,
}

impl ExtractedPolicy {
    /// Decode the document into a [`Policy`].
    pub fn policy(&self) -> Result<Policy, serde_json::Error> {
        Policy::from_value(&self.value)
    }
}

/// Locates exactly one policy document in model output.
///
/// Strategies run in order and the first success wins:
///
/// 1. the first "```json" fenced block, if its body parses as JSON;
/// 2. the first balanced object whose top-level keys include `Version`
///    followed by `Statement`, if it parses as JSON.
///
/// Anything else is "not found". The extractor is stateless and never
/// panics on malformed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyExtractor;

impl PolicyExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the policy document from `text`, or `None` if there is none.
    pub fn extract(&self, text: &str) -> Option<ExtractedPolicy> {
        if let Some(found) = Self::from_fenced_block(text) {
            debug!(source = %found.source, len = found.document.len(), "policy extracted");
            return Some(found);
        }
        if let Some(found) = Self::from_brace_scan(text) {
            debug!(source = %found.source, len = found.document.len(), "policy extracted");
            return Some(found);
        }
        debug!(len = text.len(), "no policy document found");
        None
    }

    fn from_fenced_block(text: &str) -> Option<ExtractedPolicy> {
        let block = fenced_block(text)?;
        let document = block.body.trim();
        match serde_json::from_str(document) {
            Ok(value) => Some(ExtractedPolicy {
                document: document.to_string(),
                value,
                source: ExtractionSource::FencedBlock,
            }),
            Err(err) => {
                // A malformed fence must not hide a well-formed policy elsewhere.
                trace!(offset = block.offset, error = %err, "fenced block is not valid JSON");
                None
            }
        }
    }

    fn from_brace_scan(text: &str) -> Option<ExtractedPolicy> {
        let span = first_object_with_keys(text, "Version", "Statement")?;
        match serde_json::from_str(span.text) {
            Ok(value) => Some(ExtractedPolicy {
                document: span.text.to_string(),
                value,
                source: ExtractionSource::BraceScan,
            }),
            Err(err) => {
                trace!(offset = span.offset, error = %err, "policy-shaped object is not valid JSON");
                None
            }
        }
    }
}
