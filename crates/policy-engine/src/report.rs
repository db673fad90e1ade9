use std::fmt;

use serde::{Deserialize, Serialize};

/// Headline used when no blocking issue was found.
const VALID_HEADLINE: &str = "✅ Policy is valid according to best practices.";
/// Headline used when at least one blocking issue was found.
const INVALID_HEADLINE: &str = "⚠️ Policy has some issues to address:";

/// The outcome of validating one policy document.
///
/// `valid` starts out `true` and is cleared by any blocking finding; it is
/// never set back. `issues` and `recommendations` are append-only and keep
/// the order in which rules fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Output flavours for [`ValidationReport::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl ValidationReport {
    /// A report for input that could not be decoded at all.
    pub fn failed(issue: impl Into<String>, recommendation: impl Into<String>) -> Self {
        Self {
            valid: false,
            issues: vec![issue.into()],
            recommendations: vec![recommendation.into()],
        }
    }

    /// Record a finding that makes the policy invalid.
    pub fn block(&mut self, issue: impl Into<String>, recommendation: Option<String>) {
        self.valid = false;
        self.issues.push(issue.into());
        if let Some(rec) = recommendation {
            self.recommendations.push(rec);
        }
    }

    /// Record a finding that is reported but does not invalidate the policy.
    pub fn warn(&mut self, issue: impl Into<String>, recommendation: impl Into<String>) {
        self.issues.push(issue.into());
        self.recommendations.push(recommendation.into());
    }

    /// Record a recommendation with no accompanying issue.
    pub fn recommend(&mut self, recommendation: impl Into<String>) {
        self.recommendations.push(recommendation.into());
    }

    pub fn headline(&self) -> &'static str {
        if self.valid {
            VALID_HEADLINE
        } else {
            INVALID_HEADLINE
        }
    }

    /// Render the report in the requested format.
    pub fn render(&self, format: ReportFormat) -> String {
        match format {
            ReportFormat::Text => self.to_string(),
            ReportFormat::Markdown => self.render_markdown(),
            // A struct of bools and strings always serializes.
            ReportFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
        }
    }

    fn render_markdown(&self) -> String {
        let mut out = format!("**{}**\n", self.headline());
        for (title, items) in self.sections() {
            out.push_str(&format!("\n### {title}:\n"));
            for item in items {
                out.push_str(&format!("- {item}\n"));
            }
        }
        out
    }

    /// Non-empty sections in display order.
    fn sections(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("Issues", self.issues.as_slice()),
            ("Recommendations", self.recommendations.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.headline())?;
        for (title, items) in self.sections() {
            writeln!(f, "\n{title}:")?;
            for item in items {
                writeln!(f, "- {item}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_empty() {
        let r = ValidationReport::default();
        assert!(r.valid);
        assert!(r.issues.is_empty());
        assert!(r.recommendations.is_empty());
    }

    #[test]
    fn block_invalidates_and_stays_invalid() {
        let mut r = ValidationReport::default();
        r.block("bad", None);
        r.warn("meh", "look again");
        r.recommend("extra");
        assert!(!r.valid);
        assert_eq!(r.issues, vec!["bad", "meh"]);
        assert_eq!(r.recommendations, vec!["look again", "extra"]);
    }

    #[test]
    fn warn_keeps_report_valid() {
        let mut r = ValidationReport::default();
        r.warn("sensitive", "review it");
        assert!(r.valid);
    }

    #[test]
    fn failed_has_single_pair() {
        let r = ValidationReport::failed("Invalid JSON format", "Check the policy syntax for errors");
        assert!(!r.valid);
        assert_eq!(r.issues.len(), 1);
        assert_eq!(r.recommendations.len(), 1);
    }

    #[test]
    fn text_rendering_omits_empty_sections() {
        let r = ValidationReport::default();
        assert_eq!(r.to_string(), format!("{VALID_HEADLINE}\n"));

        let mut r = ValidationReport::default();
        r.recommend("Consider adding conditions to Statement 1 for additional security");
        assert_eq!(
            r.to_string(),
            format!(
                "{VALID_HEADLINE}\n\nRecommendations:\n- Consider adding conditions to Statement 1 for additional security\n"
            )
        );
    }

    #[test]
    fn text_rendering_keeps_append_order() {
        let mut r = ValidationReport::default();
        r.block("first", Some("fix first".into()));
        r.block("second", Some("fix second".into()));
        let text = r.to_string();
        assert!(text.starts_with(INVALID_HEADLINE));
        let first = text.find("- first").unwrap();
        let second = text.find("- second").unwrap();
        let issues = text.find("Issues:").unwrap();
        let recs = text.find("Recommendations:").unwrap();
        assert!(issues < first && first < second && second < recs);
    }

    #[test]
    fn markdown_rendering() {
        let mut r = ValidationReport::default();
        r.block("bad", Some("fix".into()));
        let md = r.render(ReportFormat::Markdown);
        assert_eq!(
            md,
            format!("**{INVALID_HEADLINE}**\n\n### Issues:\n- bad\n\n### Recommendations:\n- fix\n")
        );
    }

    #[test]
    fn json_rendering_round_trips() {
        let mut r = ValidationReport::default();
        r.warn("w", "r");
        let back: ValidationReport =
            serde_json::from_str(&r.render(ReportFormat::Json)).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut r = ValidationReport::default();
        r.block("a", Some("b".into()));
        assert_eq!(r.render(ReportFormat::Text), r.render(ReportFormat::Text));
    }
}
