//! # policy-extract
//!
//! Finds the IAM policy document embedded in a generative model's free-text
//! answer.
//!
//! The crate is organised in two layers:
//!
//! 1. **[`scanner`]** -- explicit grammars for "```json" fenced blocks and
//!    balanced JSON objects, string-literal aware.
//! 2. **[`extractor`]** -- applies the fenced-block strategy, then the
//!    brace-scan strategy, and returns the first syntactically valid
//!    document as an [`ExtractedPolicy`].
//!
//! ## Quick start
//!
//! ```rust
//! use policy_extract::PolicyExtractor;
//!
//! let answer = "Sure!\n```json\n{\"Version\": \"2012-10-17\", \"Statement\": []}\n```";
//! let found = PolicyExtractor::new().extract(answer).unwrap();
//! assert_eq!(found.value["Version"], "2012-10-17");
//! ```

pub mod extractor;
pub mod scanner;

pub use extractor::{ExtractedPolicy, ExtractionSource, PolicyExtractor};
