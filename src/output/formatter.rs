//! Output formatters for analysis reports

use crate::config::OutputFormat;
use crate::error::{Result, SmartAtsError};
use crate::output::report::{AnalysisReport, AtsEvaluation};
use colored::{Color, Colorize};
use std::path::{Path, PathBuf};

/// Trait for rendering an [`AnalysisReport`] in one output format
pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
}

/// JSON for scripting and integration
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// The model's text and nothing else
pub struct RawFormatter;

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    raw_formatter: RawFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{}\n", title.color(Color::Blue).bold())
        } else {
            format!("\n{}\n", title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            85..=100 => ("STRONG MATCH", Color::Green),
            70..=84 => ("GOOD MATCH", Color::BrightGreen),
            50..=69 => ("PARTIAL MATCH", Color::Yellow),
            _ => ("WEAK MATCH", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("ATS Analysis Result"));

        match &report.evaluation {
            AtsEvaluation::Structured {
                match_percentage,
                missing_keywords,
                profile_summary,
            } => {
                output.push_str(&format!(
                    "JD Match Percentage: {}% {}\n",
                    match_percentage,
                    self.format_score_badge(*match_percentage)
                ));

                output.push_str(&self.format_header("Missing Keywords"));
                if missing_keywords.is_empty() {
                    output.push_str(&format!("  {}\n", self.colorize("none", Color::Green)));
                } else {
                    for keyword in missing_keywords {
                        output.push_str(&format!("  - {}\n", self.colorize(keyword, Color::Yellow)));
                    }
                }

                output.push_str(&self.format_header("Profile Summary"));
                output.push_str(&format!("  {}\n", profile_summary));
            }
            AtsEvaluation::Rejected { message } => {
                output.push_str(&self.colorize(message, Color::Red));
                output.push('\n');
            }
            AtsEvaluation::Unstructured => {
                output.push_str(report.raw_response.trim_end());
                output.push('\n');
            }
        }

        let meta = &report.metadata;
        let footer = format!(
            "\n{} | {} pages ({} empty) | {} resume words | {}ms",
            meta.model,
            meta.extraction.page_count,
            meta.extraction.empty_pages,
            meta.extraction.normalized_words,
            meta.processing_time_ms
        );
        output.push_str(&self.colorize(&footer, Color::BrightBlack));
        output.push('\n');

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut md = String::from("# ATS Analysis Result\n\n");

        match &report.evaluation {
            AtsEvaluation::Structured {
                match_percentage,
                missing_keywords,
                profile_summary,
            } => {
                md.push_str(&format!("**JD Match Percentage:** {}%\n\n", match_percentage));
                md.push_str("## Missing Keywords\n\n");
                if missing_keywords.is_empty() {
                    md.push_str("_None_\n");
                } else {
                    for keyword in missing_keywords {
                        md.push_str(&format!("- {}\n", keyword));
                    }
                }
                md.push_str(&format!("\n## Profile Summary\n\n{}\n", profile_summary));
            }
            AtsEvaluation::Rejected { message } => {
                md.push_str(&format!("> **Error:** {}\n", message));
            }
            AtsEvaluation::Unstructured => {
                md.push_str(report.raw_response.trim_end());
                md.push('\n');
            }
        }

        if self.include_metadata {
            let meta = &report.metadata;
            md.push_str("\n---\n\n");
            md.push_str(&format!(
                "- Generated: {}\n",
                meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
            md.push_str(&format!("- Model: `{}`\n", meta.model));
            md.push_str(&format!("- Prompt template: v{}\n", meta.template_version));
            md.push_str(&format!(
                "- Resume: {} pages ({} without text), {} words after cleaning\n",
                meta.extraction.page_count, meta.extraction.empty_pages, meta.extraction.normalized_words
            ));
            md.push_str(&format!("- Processing time: {}ms\n", meta.processing_time_ms));
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl OutputFormatter for RawFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        Ok(report.raw_response.clone())
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Raw
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, true, true)
    }

    pub fn with_options(use_colors: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            raw_formatter: RawFormatter,
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Raw => &self.raw_formatter,
        };
        debug_assert_eq!(formatter.supports_format(), format);
        formatter.format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                SmartAtsError::OutputFormatting(format!("Cannot create '{}': {}", parent.display(), e))
            })?;
        }
    }
    fs::write(file_path, content)
        .map_err(|e| SmartAtsError::OutputFormatting(format!("Cannot write '{}': {}", file_path.display(), e)))?;
    Ok(())
}

/// Where `--save` writes: a directory target gets a generated file name
/// derived from the resume, anything else is used as given.
pub fn resolve_save_path(target: &Path, format: OutputFormat, resume: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(suggest_filename(format, &resume.to_string_lossy(), true))
    } else {
        target.to_path_buf()
    }
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console | OutputFormat::Raw => format!("{}_ats{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_ats{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_ats{}.md", base_name, timestamp_suffix),
    }
}
