mod cli;
mod commands;
mod config;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use policy_engine::{loader, PolicyValidator, RuleSet};
use policy_extract::PolicyExtractor;
use policy_store::PolicyStore;

use crate::cli::{Cli, Command};
use crate::commands::App;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // 1. Parse CLI args.
    let cli = Cli::parse();

    // 2. Load config, then merge CLI overrides.
    let mut cfg = config::load(&cli.config)?;

    if let Some(ref dir) = cli.policies_dir {
        cfg.policies_dir = dir.clone();
    }
    if let Some(ref rules) = cli.rules {
        cfg.rules_file = Some(rules.clone());
    }

    // 3. Init tracing-subscriber with JSON format on stderr; stdout carries
    //    command output.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    config::warn_if_missing(&cli.config);

    debug!(
        config_file = %cli.config.display(),
        policies_dir = %cfg.policies_dir.display(),
        rules_file = ?cfg.rules_file,
        "policy-guard starting"
    );

    // 4. Load the rule set.
    let rules = match &cfg.rules_file {
        Some(path) => loader::load_rules(path).context("failed to load rule set")?,
        None => RuleSet::default(),
    };
    info!(
        overly_permissive = rules.overly_permissive_actions.len(),
        sensitive = rules.sensitive_actions.len(),
        "rule set loaded"
    );

    // 5. Open the policy store.
    let store = PolicyStore::open(&cfg.policies_dir)
        .await
        .context("failed to open policy store")?;

    let app = App {
        store,
        validator: Arc::new(PolicyValidator::new(rules)),
        extractor: PolicyExtractor::new(),
        search_dirs: Arc::new(cfg.search_dirs),
    };

    // 6. Dispatch.
    match cli.command {
        Command::Extract(args) => app.extract(args).await,
        Command::Validate(args) => app.validate(args).await,
        Command::List => app.list().await,
        Command::View { filename } => app.view(&filename).await,
    }
}
