//! ICP fit evaluator: checks candidates against Ideal Customer Profile rules with a hosted LLM

use clap::Parser;
use colored::Colorize;
use icp_fit_evaluator::cli::{self, Cli, Commands, ConfigAction};
use icp_fit_evaluator::config::Config;
use icp_fit_evaluator::error::{IcpError, Result};
use icp_fit_evaluator::input::InputManager;
use icp_fit_evaluator::llm::{
    preview_prompt, validate_credential, ApiKey, ClientSettings, Evaluator, GeminiModel,
    GenerativeModel, ReadyClient,
};
use icp_fit_evaluator::output::progress::with_spinner;
use icp_fit_evaluator::output::ReportGenerator;
use icp_fit_evaluator::processing::EvaluationInputs;
use icp_fit_evaluator::rules::{load_rules, RuleSet};
use icp_fit_evaluator::session::{run_session, Interrupts};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Evaluate {
            jd_text,
            jd_file,
            about,
            about_file,
            resume,
            profile_url,
            rules,
            model,
            output,
            save,
            dry_run,
        } => {
            if let Some(model) = model {
                config.service.model = model;
            }
            let format = match output {
                Some(output) => cli::parse_output_format(&output).map_err(IcpError::Validation)?,
                None => config.output.format,
            };

            // The credential gates everything that talks to the model
            let client = if dry_run { None } else { Some(connect(&config).await?) };

            let rules = load_rules_reporting(rules.as_deref().unwrap_or(&config.rules.path));

            let manager = InputManager::new();
            let about_text = match about_file {
                Some(path) => Some(manager.extract_path(&path).await?),
                None => about,
            };
            let jd_text = jd_text.filter(|t| !t.trim().is_empty());
            let jd_document = if jd_text.is_none() {
                manager.load_optional(jd_file.as_deref()).await?
            } else {
                None
            };

            let inputs = EvaluationInputs {
                job_description_text: jd_text,
                job_description_document: jd_document,
                about_text,
                resume_document: manager.load_optional(resume.as_deref()).await?,
                profile_url,
            };
            if let Some(notice) = inputs.profile_url_notice() {
                warn!("{}", notice);
                println!("{} {}", "⚠️ ".yellow(), notice);
            }

            let request = inputs.into_request()?;

            let Some(client) = client else {
                println!("{}", preview_prompt(&rules, &request)?);
                return Ok(());
            };

            let evaluator = Evaluator::new(rules, client);
            let mut interrupts = Interrupts::ctrl_c();
            let result = with_spinner(
                "Analyzing candidate fit... ⏳",
                interrupts.cancellable(evaluator.evaluate(&request)),
            )
            .await;
            drop(interrupts);
            let result = result?;

            let generator = ReportGenerator::new(config.output.color_output);
            println!("{}", generator.generate(format, &result)?);

            if let Some(path) = save {
                generator.save(format, &result, &path)?;
                println!("💾 Saved to {}", path.display());
            }
            Ok(())
        }

        Commands::Session { rules, model } => {
            if let Some(model) = model {
                config.service.model = model;
            }

            let client = connect(&config).await?;
            let rules = load_rules_reporting(rules.as_deref().unwrap_or(&config.rules.path));
            let evaluator = Evaluator::new(rules, client);

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            let summary = run_session(
                &evaluator,
                stdin,
                &mut stdout,
                config.output.format,
                config.output.color_output,
                Interrupts::ctrl_c(),
            )
            .await?;
            info!(
                "Session ended after {} evaluations ({} failed)",
                summary.evaluated, summary.failed
            );
            Ok(())
        }

        Commands::Check => {
            let api_key = config.api_key().unwrap_or_default();
            let model = GeminiModel::new(&config.service)?;
            let settings = ClientSettings::from(&config.service);

            let valid = with_spinner(
                "Validating API key...",
                validate_credential(&model, &api_key, settings.validation_timeout),
            )
            .await;

            if valid {
                println!("{} API key is valid for {}", "✅".green(), model.model_name());
                Ok(())
            } else {
                print_credential_help(&config.service.api_key_env);
                Err(IcpError::Credential("API key is invalid or missing".to_string()))
            }
        }

        Commands::Rules { path } => {
            let path = path.unwrap_or_else(|| config.rules.path.clone());
            let rules = load_rules_reporting(&path);
            println!("📋 {} ICP rules from {}", rules.len(), path.display());
            println!("{}", rules.to_pretty_json());
            Ok(())
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action.unwrap_or(ConfigAction::Show) {
                ConfigAction::Show => {
                    let content = toml::to_string_pretty(&config).map_err(|e| {
                        IcpError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("{}", content);
                }
                ConfigAction::Path => println!("{}", path.display()),
                ConfigAction::Reset => {
                    Config::default().save_to(&path)?;
                    println!("🔄 Configuration reset to defaults at {}", path.display());
                }
            }
            Ok(())
        }
    }
}

/// Validates the credential once; a failure halts with remediation steps.
async fn connect(config: &Config) -> Result<ReadyClient<GeminiModel>> {
    let outcome: Result<ReadyClient<GeminiModel>> = async {
        let api_key = config.api_key()?;
        let model = GeminiModel::new(&config.service)?;
        with_spinner(
            "Validating API key...",
            ReadyClient::connect(
                model,
                ApiKey::new(api_key),
                ClientSettings::from(&config.service),
            ),
        )
        .await
    }
    .await;

    if let Err(IcpError::Credential(_)) = &outcome {
        print_credential_help(&config.service.api_key_env);
    }
    outcome
}

fn load_rules_reporting(path: &Path) -> RuleSet {
    let load = load_rules(path);
    if let Some(warning) = load.warning() {
        warn!("{}", warning);
        println!("{} {}", "⚠️ ".yellow(), warning);
    }
    load.into_rules()
}

fn print_credential_help(env_var: &str) {
    eprintln!("{}", "❌ Invalid Google API Key".red().bold());
    eprintln!(
        "Your Google Gemini API key is invalid or missing.\n\n\
         👉 Fix:\n  \
         1. Visit https://aistudio.google.com/app/apikey\n  \
         2. Create a new API key.\n  \
         3. Add it to your .env file:\n       \
         {}=your_new_key_here\n  \
         4. Save and run again.",
        env_var
    );
}
