use clap::{Args, Parser, Subcommand, ValueEnum};
use policy_engine::ReportFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "policy-guard",
    version,
    about = "Extract IAM policies from model output and check them against best practices"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "policy-guard.yaml", global = true)]
    pub config: PathBuf,

    /// Directory holding saved policies (overrides config file setting)
    #[arg(long, global = true)]
    pub policies_dir: Option<PathBuf>,

    /// YAML rule-set file (overrides config file setting)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a policy from a model response
    Extract(ExtractArgs),
    /// Validate saved policies against best practices
    Validate(ValidateArgs),
    /// List saved policies
    List,
    /// Show a saved policy with its metadata
    View {
        /// Policy file name (searched in the policies directory, then the
        /// configured search directories)
        filename: String,
    },
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Model response text; read from stdin when neither this nor --file is
    /// given
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// File containing the model response
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Validate the extracted policy
    #[arg(long)]
    pub validate: bool,

    /// Print only the extracted policy, pretty-printed
    #[arg(long)]
    pub json_only: bool,

    /// Save the extracted policy under this name
    #[arg(long, value_name = "NAME")]
    pub save: Option<String>,

    /// Description stored with a saved policy
    #[arg(long, requires = "save")]
    pub description: Option<String>,

    /// Report format used with --validate
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Policy file names
    #[arg(required = true)]
    pub filenames: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Markdown,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => ReportFormat::Text,
            Format::Markdown => ReportFormat::Markdown,
            Format::Json => ReportFormat::Json,
        }
    }
}
