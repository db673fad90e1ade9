use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use policy_engine::{PolicyValidator, ReportFormat, ValidationReport};
use policy_extract::PolicyExtractor;
use policy_store::{PolicyStore, SavedPolicy};

use crate::cli::{ExtractArgs, ValidateArgs};

/// Characters of the source text quoted in a default save description.
const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// Shared state for every subcommand.
pub struct App {
    pub store: PolicyStore,
    pub validator: Arc<PolicyValidator>,
    pub extractor: PolicyExtractor,
    pub search_dirs: Arc<Vec<PathBuf>>,
}

impl App {
    // -- extract ---------------------------------------------------------------

    pub async fn extract(&self, args: ExtractArgs) -> Result<ExitCode> {
        let response = read_input(&args).await?;

        let Some(found) = self.extractor.extract(&response) else {
            warn!(len = response.len(), "no policy found in response");
            eprintln!("Error: Could not extract a valid policy from the response.");
            eprintln!("\nFull response:");
            eprintln!("{response}");
            return Ok(ExitCode::FAILURE);
        };
        info!(source = %found.source, "policy extracted");

        if args.json_only {
            println!("{}", serde_json::to_string_pretty(&found.value)?);
        } else {
            println!("{response}");
        }

        if args.validate {
            let report = self.validator.validate_value(&found.value);
            print_report("Policy Validation Results", &report, args.format.into());
        }

        if let Some(name) = args.save.as_deref() {
            let description = args
                .description
                .clone()
                .unwrap_or_else(|| default_description(&response));
            let path = self
                .store
                .save(&found.document, Some(name), Some(&description))
                .await
                .context("failed to save policy")?;
            println!("\nPolicy saved to: {}", path.display());
        }

        Ok(ExitCode::SUCCESS)
    }

    // -- validate --------------------------------------------------------------

    /// Validate every file concurrently; output follows argument order.
    pub async fn validate(&self, args: ValidateArgs) -> Result<ExitCode> {
        let handles: Vec<_> = args
            .filenames
            .iter()
            .cloned()
            .map(|filename| {
                let store = self.store.clone();
                let validator = Arc::clone(&self.validator);
                let search_dirs = Arc::clone(&self.search_dirs);
                tokio::spawn(async move {
                    let saved = store.find(&filename, &search_dirs).await?;
                    Ok::<_, policy_store::StoreError>(validator.validate_value(&saved.policy))
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (filename, handle) in args.filenames.iter().zip(handles) {
            let outcome = handle.await.context("validation task panicked")?;
            results.push((filename.as_str(), outcome));
        }

        let failures = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(files = results.len(), failures, "validation finished");

        let format = ReportFormat::from(args.format);
        if format == ReportFormat::Json {
            let entries: Vec<_> = results
                .iter()
                .map(|(file, outcome)| match outcome {
                    Ok(report) => json!({ "file": file, "report": report }),
                    Err(err) => json!({ "file": file, "error": err.to_string() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for (file, outcome) in &results {
                match outcome {
                    Ok(report) => {
                        print_report(&format!("Policy Validation Results: {file}"), report, format)
                    }
                    Err(err) => eprintln!("Error: {err}"),
                }
            }
        }

        Ok(if failures == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }

    // -- list / view -----------------------------------------------------------

    pub async fn list(&self) -> Result<ExitCode> {
        let policies = self.store.list().await?;
        if policies.is_empty() {
            println!("No saved policies found.");
            return Ok(ExitCode::SUCCESS);
        }

        println!("Found {} saved policies:", policies.len());
        for (i, name) in policies.iter().enumerate() {
            println!("{}. {name}", i + 1);
        }
        Ok(ExitCode::SUCCESS)
    }

    pub async fn view(&self, filename: &str) -> Result<ExitCode> {
        let saved = match self.store.find(filename, &self.search_dirs).await {
            Ok(saved) => saved,
            Err(err) => {
                eprintln!("Error: {err}");
                return Ok(ExitCode::FAILURE);
            }
        };
        print!("{}", render_saved(&saved)?);
        Ok(ExitCode::SUCCESS)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Positional text, then `--file`, then stdin.
async fn read_input(args: &ExtractArgs) -> Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    if let Some(path) = &args.file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(text.trim().to_string());
    }
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("failed to read stdin")?;
    Ok(text)
}

fn default_description(source: &str) -> String {
    let preview: String = source.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    format!("Policy extracted from: {preview}...")
}

fn print_report(title: &str, report: &ValidationReport, format: ReportFormat) {
    if format != ReportFormat::Json {
        println!("\n=== {title} ===");
    }
    print!("{}", report.render(format));
    if format == ReportFormat::Json {
        println!();
    }
}

/// Metadata lines followed by the pretty-printed policy.
fn render_saved(saved: &SavedPolicy) -> Result<String> {
    let mut out = String::new();
    out.push_str("\n=== Policy Metadata ===\n");
    for (key, value) in saved.metadata.iter().flatten() {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.push_str(&format!("{key}: {value}\n"));
    }
    out.push_str("\n=== Policy Content ===\n");
    out.push_str(&serde_json::to_string_pretty(&saved.policy)?);
    out.push('\n');
    Ok(out)
}
