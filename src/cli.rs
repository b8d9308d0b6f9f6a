//! CLI interface for smart-ats

use crate::config::{ApiKey, OutputFormat};
use crate::error::Result;
use crate::input::manager::{InputManager, JobSource};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "smart-ats")]
#[command(version)]
#[command(about = "Compare a resume PDF against a job description")]
#[command(long_about = "Extracts and cleans the text of a resume PDF, combines it with a job description in a fixed \
ATS evaluation prompt and asks a hosted Gemini model for a match percentage, missing keywords and a profile summary.\n\n\
The API key is read from GOOGLE_API_KEY (a .env file in the working directory is honoured).")]
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
    /// Analyze a resume against a job description
    Analyze {
        #[command(flatten)]
        input: AnalysisInput,

        /// Output format: console, json, markdown, raw
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to a file, or into an existing directory under a generated name
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the prompt that would be sent, without calling the model
    Prompt {
        #[command(flatten)]
        input: AnalysisInput,
    },

    /// Show the text extracted from a PDF
    Extract {
        /// Path to the PDF
        file: PathBuf,

        /// Print the text as extracted, before cleaning
        #[arg(long)]
        raw: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
pub struct AnalysisInput {
    /// Path to the resume (PDF)
    #[arg(short, long)]
    pub resume: PathBuf,

    /// Path to the job description (TXT, MD)
    #[arg(short, long, conflicts_with = "job_text")]
    pub job: Option<PathBuf>,

    /// Job description given inline
    #[arg(long)]
    pub job_text: Option<String>,
}

impl AnalysisInput {
    /// Inline text wins over a file; with neither, the description is read
    /// from stdin.
    pub fn job_source(&self) -> JobSource {
        match (&self.job_text, &self.job) {
            (Some(text), _) => JobSource::Inline(text.clone()),
            (None, Some(path)) => JobSource::File(path.clone()),
            (None, None) => JobSource::Stdin,
        }
    }

    /// Read the job description and the resume bytes.
    pub async fn read(&self) -> Result<(String, Vec<u8>)> {
        let manager = InputManager::new();
        let job_description = manager.read_job_description(&self.job_source()).await?;
        let resume_pdf = manager.read_resume(&self.resume).await?;
        Ok((job_description, resume_pdf))
    }
}

/// Everything `analyze` needs before it can talk to the model.
#[derive(Debug)]
pub struct AnalysisRequest {
    pub api_key: ApiKey,
    pub job_description: String,
    pub resume_pdf: Vec<u8>,
}

impl AnalysisRequest {
    /// The credential is resolved before any input is touched, so a missing
    /// key fails without reading files or waiting on stdin.
    pub async fn gather<F>(credential: F, input: &AnalysisInput) -> Result<Self>
    where
        F: FnOnce() -> Result<ApiKey>,
    {
        let api_key = credential()?;
        let (job_description, resume_pdf) = input.read().await?;
        Ok(Self {
            api_key,
            job_description,
            resume_pdf,
        })
    }
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
pub fn parse_output_format(format: &str) -> std::result::Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "raw" | "text" => Ok(OutputFormat::Raw),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown, raw",
            format
        )),
    }
}
