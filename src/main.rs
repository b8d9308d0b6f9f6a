//! smart-ats: resume vs. job description match analysis

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use smart_ats::cli::{self, AnalysisRequest, Cli, Commands, ConfigAction};
use smart_ats::config::{ApiKey, Config, OutputFormat};
use smart_ats::error::SmartAtsError;
use smart_ats::input::PdfExtractor;
use smart_ats::llm::GeminiClient;
use smart_ats::output::formatter::{resolve_save_path, save_report_to_file, ReportGenerator};
use smart_ats::output::AnalysisReport;
use smart_ats::processing::{AnalysisEngine, PromptPipeline, TextNormalizer};
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("{}", e.user_message());
            process::exit(e.exit_code());
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config.as_deref()).await {
        error!("Command failed: {:#}", e);
        match e.downcast_ref::<SmartAtsError>() {
            Some(app_error) => {
                eprintln!("Error: {}", app_error.user_message());
                process::exit(app_error.exit_code());
            }
            None => {
                eprintln!("Error: {:#}", e);
                process::exit(1);
            }
        }
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<&Path>) -> anyhow::Result<()> {
    match command {
        Commands::Analyze {
            input,
            output,
            save,
            model,
            no_color,
        } => {
            let request = AnalysisRequest::gather(ApiKey::from_env, &input).await?;

            let format = match output {
                Some(name) => cli::parse_output_format(&name).map_err(SmartAtsError::InvalidInput)?,
                None => config.output.format,
            };

            let mut generation = config.generation.clone();
            if let Some(model) = model {
                generation.model = model;
            }

            let engine = AnalysisEngine::new(GeminiClient::new(&generation, request.api_key)?);

            let spinner = (format == OutputFormat::Console).then(|| {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message(format!("Asking {} ...", generation.model));
                pb.enable_steady_tick(Duration::from_millis(120));
                pb
            });

            let outcome = engine.analyze(&request.job_description, &request.resume_pdf).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            let report = AnalysisReport::from_outcome(outcome?);

            let use_colors = config.output.color_output && !no_color && save.is_none();
            let rendered = ReportGenerator::with_options(use_colors, true, true).generate_report(&report, format)?;

            match save {
                Some(target) => {
                    let path = resolve_save_path(&target, format, &input.resume);
                    save_report_to_file(&rendered, &path)?;
                    info!("Report saved to {}", path.display());
                    println!("Report saved to {}", path.display());
                }
                None => println!("{}", rendered),
            }
        }

        Commands::Prompt { input } => {
            let (job_description, resume_pdf) = input.read().await?;
            let prepared = PromptPipeline::new().prepare(&job_description, &resume_pdf)?;
            let stats = prepared.stats();
            info!(
                "Prompt v{}: {} pages ({} empty), {} chars",
                prepared.prompt.template_version, stats.page_count, stats.empty_pages, stats.prompt_chars
            );
            println!("{}", prepared.prompt.as_str());
        }

        Commands::Extract { file, raw } => {
            let extracted = PdfExtractor
                .extract_file(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            eprintln!(
                "{}: {} pages, {} without text",
                file.display(),
                extracted.page_count(),
                extracted.empty_page_count()
            );
            if raw {
                println!("{}", extracted.text());
            } else {
                println!("{}", TextNormalizer::new().normalize(extracted.text()));
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("Current Configuration\n");
                println!("Model: {}", config.generation.model);
                println!("Endpoint: {}", config.generation.endpoint);
                println!("Timeout: {}s (connect {}s)", config.generation.timeout_secs, config.generation.connect_timeout_secs);
                if let Some(t) = config.generation.temperature {
                    println!("Temperature: {}", t);
                }
                if let Some(m) = config.generation.max_output_tokens {
                    println!("Max output tokens: {}", m);
                }
                println!("Output format: {:?}", config.output.format);
                println!("Colors: {}", config.output.color_output);
                let key_status = if ApiKey::from_env().is_ok() { "set" } else { "missing" };
                println!("\nGOOGLE_API_KEY: {}", key_status);
            }

            Some(ConfigAction::Path) => {
                let path = config_path.map(Path::to_path_buf).unwrap_or_else(Config::config_path);
                println!("{}", path.display());
            }

            Some(ConfigAction::Reset) => {
                let path = Config::default().save(config_path)?;
                println!("Configuration reset: {}", path.display());
            }
        },
    }

    Ok(())
}
