//! CLI interface for the ICP fit evaluator

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "icp-fit")]
#[command(about = "AI-powered Ideal Customer Profile fit evaluator")]
#[command(long_about = "Evaluate whether a candidate's profile or resume fits a job description and a set of ICP rules, using a hosted Gemini model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one candidate against a job description
    Evaluate {
        /// Job description text
        #[arg(long)]
        jd_text: Option<String>,

        /// Job description file (TXT, PDF), used when no JD text is given
        #[arg(long)]
        jd_file: Option<PathBuf>,

        /// Candidate "about" section or summary text
        #[arg(short, long)]
        about: Option<String>,

        /// File containing the candidate "about" text (TXT, PDF)
        #[arg(long, conflicts_with = "about")]
        about_file: Option<PathBuf>,

        /// Resume file (TXT, PDF)
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Candidate profile URL (not fetched)
        #[arg(long)]
        profile_url: Option<String>,

        /// ICP rules file (JSON); overrides the configured path
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Model to use; overrides the configured model
        #[arg(short, long)]
        model: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Print the composed prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,
    },

    /// Interactive session: evaluate candidates until `quit`
    Session {
        /// ICP rules file (JSON); overrides the configured path
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Model to use; overrides the configured model
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Validate the API key against the model
    Check,

    /// Show the ICP rules that evaluations will use
    Rules {
        /// ICP rules file (JSON); overrides the configured path
        path: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}
