use serde_json::error::Category;
use tracing::{debug, trace};

use crate::report::ValidationReport;
use crate::rules::RuleSet;
use crate::schema::{Policy, Statement};

/// Canonical policy language version.
pub const POLICY_VERSION: &str = "2012-10-17";

// ---------------------------------------------------------------------------
// PolicyValidator
// ---------------------------------------------------------------------------

/// Applies the best-practice rule battery to policy documents.
///
/// The validator only reads its [`RuleSet`], so one instance can be shared
/// across threads and tasks without locking. Every call builds its own
/// [`ValidationReport`].
#[derive(Debug, Clone, Default)]
pub struct PolicyValidator {
    rules: RuleSet,
}

impl PolicyValidator {
    /// Create a validator using the given rule set.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Return a reference to the injected rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    // -- Entry points ----------------------------------------------------------

    /// Validate JSON text. Decode failures become a failed report.
    pub fn validate_str(&self, text: &str) -> ValidationReport {
        match Policy::from_json(text) {
            Ok(policy) => self.validate(&policy),
            Err(err) => decode_failure(&err),
        }
    }

    /// Validate an already-parsed JSON value.
    pub fn validate_value(&self, value: &serde_json::Value) -> ValidationReport {
        match Policy::from_value(value) {
            Ok(policy) => self.validate(&policy),
            Err(err) => decode_failure(&err),
        }
    }

    /// Validate each policy independently, preserving input order.
    pub fn validate_batch(&self, policies: &[Policy]) -> Vec<ValidationReport> {
        policies.iter().map(|p| self.validate(p)).collect()
    }

    /// Run every rule against a decoded policy.
    pub fn validate(&self, policy: &Policy) -> ValidationReport {
        let mut report = ValidationReport::default();

        if policy.version.is_none() {
            report.block(
                "Missing 'Version' field in policy",
                Some(format!("Add 'Version': '{POLICY_VERSION}' to the policy")),
            );
        }

        // Without statements there is nothing further to inspect.
        let Some(statements) = policy.statements.as_deref() else {
            report.block("Missing 'Statement' field in policy", None);
            debug!(valid = report.valid, "policy has no Statement field");
            return report;
        };

        if statements.is_empty() {
            report.block(
                "'Statement' field contains no statements",
                Some("Add at least one statement to the policy".to_string()),
            );
        }

        for (idx, statement) in statements.iter().enumerate() {
            self.check_statement(idx + 1, statement, &mut report);
        }

        debug!(
            version = policy.version_str().unwrap_or_default(),
            statements = statements.len(),
            valid = report.valid,
            issues = report.issues.len(),
            "policy validated"
        );
        report
    }

    // -- Per-statement rules ---------------------------------------------------

    fn check_statement(&self, n: usize, statement: &Statement, report: &mut ValidationReport) {
        let actions = statement.actions.as_deref().unwrap_or_default();

        for action in actions.iter().filter(|a| self.rules.is_overly_permissive(a)) {
            trace!(statement = n, action = %action, "overly permissive action");
            report.block(
                format!("Statement {n} contains overly permissive action: {action}"),
                Some(format!(
                    "Replace '{action}' with specific actions needed for the use case"
                )),
            );
        }

        for action in actions.iter().filter(|a| self.rules.is_sensitive(a)) {
            trace!(statement = n, action = %action, "sensitive action");
            report.warn(
                format!("Statement {n} contains sensitive action: {action}"),
                format!("Review if '{action}' is absolutely necessary and consider adding conditions"),
            );
        }

        match statement.resources.as_deref() {
            Some(resources) => {
                for _ in resources.iter().filter(|r| *r == "*") {
                    report.block(
                        format!("Statement {n} applies to all resources ('*')"),
                        Some("Specify exact resource ARNs instead of using '*'".to_string()),
                    );
                }
            }
            None => report.block(
                format!("Statement {n} is missing 'Resource' field"),
                Some("Add specific resource ARNs to the statement".to_string()),
            ),
        }

        if !statement.has_condition {
            report.recommend(format!(
                "Consider adding conditions to Statement {n} for additional security"
            ));
        }
    }
}

/// Convert a decode error into the failed-report shape.
fn decode_failure(err: &serde_json::Error) -> ValidationReport {
    debug!(error = %err, "policy could not be decoded");
    match err.classify() {
        Category::Syntax | Category::Eof => {
            ValidationReport::failed("Invalid JSON format", "Check the policy syntax for errors")
        }
        Category::Data | Category::Io => ValidationReport::failed(
            format!("Validation error: {err}"),
            "Review the policy structure",
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
