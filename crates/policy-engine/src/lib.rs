//! # policy-engine
//!
//! Best-practice checks for AWS IAM policy documents. This crate decodes
//! policy JSON into a normalised [`Policy`], applies a fixed rule battery
//! driven by an injectable [`RuleSet`], and produces a [`ValidationReport`].
//!
//! ## Quick start
//!
//! ```rust
//! use policy_engine::PolicyValidator;
//!
//! let validator = PolicyValidator::default();
//! let report = validator.validate_str(
//!     r#"{"Version": "2012-10-17", "Statement": {"Action": "s3:*", "Resource": "*"}}"#,
//! );
//! assert!(!report.valid);
//! println!("{report}");
//! ```

pub mod loader;
mod report;
pub mod rules;
mod schema;
mod validator;

// Re-export primary public API at crate root.
pub use report::{ReportFormat, ValidationReport};
pub use rules::RuleSet;
pub use schema::{OneOrMany, Policy, Statement};
pub use validator::{PolicyValidator, POLICY_VERSION};
