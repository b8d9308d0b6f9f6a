//! Report structures built around the model's reply
//!
//! The reply is free text. [`AtsEvaluation::parse`] looks for the three
//! sections the prompt asks for and falls back to [`AtsEvaluation::Unstructured`]
//! whenever one of them is missing; the raw text is always kept alongside.

use crate::processing::analyzer::{AnalysisOutcome, ExtractionStats};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtsEvaluation {
    /// All three conventional sections were found.
    Structured {
        match_percentage: u8,
        missing_keywords: Vec<String>,
        profile_summary: String,
    },
    /// The model declined the document as a resume.
    Rejected { message: String },
    /// Anything else; display the raw text.
    Unstructured,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub template_version: String,
    pub processing_time_ms: u64,
    pub extraction: ExtractionStats,
    pub tool_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub evaluation: AtsEvaluation,
    pub raw_response: String,
    pub metadata: ReportMetadata,
}

impl AnalysisReport {
    pub fn from_outcome(outcome: AnalysisOutcome) -> Self {
        let evaluation = AtsEvaluation::parse(&outcome.response);
        Self {
            evaluation,
            raw_response: outcome.response,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                model: outcome.model,
                template_version: outcome.template_version,
                processing_time_ms: outcome.processing_time_ms,
                extraction: outcome.stats,
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Preamble,
    Keywords,
    Summary,
}

struct SectionPatterns {
    percentage: Regex,
    keywords_header: Regex,
    summary_header: Regex,
    bullet: Regex,
    rejection: Regex,
}

impl SectionPatterns {
    fn new() -> Self {
        // Headers tolerate markdown decoration such as `**Missing Keywords:**` or `## Profile Summary`.
        Self {
            percentage: Regex::new(
                r"(?i)^[\s#*_]*JD\s+Match(?:\s+Percentage)?[\s*_]*:[\s*_]*(\d{1,3}(?:\.\d+)?)\s*%",
            )
            .expect("Invalid percentage regex"),
            keywords_header: Regex::new(r"(?i)^[\s#*_]*Missing\s+Keywords[\s*_]*:?[\s*_]*(.*)$")
                .expect("Invalid keywords header regex"),
            summary_header: Regex::new(r"(?i)^[\s#*_]*Profile\s+Summary[\s*_]*:?[\s*_]*(.*)$")
                .expect("Invalid summary header regex"),
            bullet: Regex::new(r"^\s*(?:[-*•+]|\d+[.)])\s+(.+)$").expect("Invalid bullet regex"),
            rejection: Regex::new(r"(?i)^[\s`*_]*Error\s*:\s*(.+)$").expect("Invalid rejection regex"),
        }
    }
}

impl AtsEvaluation {
    pub fn parse(response: &str) -> Self {
        let patterns = SectionPatterns::new();

        let mut percentage: Option<u8> = None;
        let mut keywords: Vec<String> = Vec::new();
        let mut saw_keywords = false;
        let mut summary: Vec<String> = Vec::new();
        let mut saw_summary = false;
        let mut section = Section::Preamble;

        for line in response.lines() {
            if let Some(caps) = patterns.percentage.captures(line) {
                percentage = caps[1]
                    .parse::<f32>()
                    .ok()
                    .filter(|p| (0.0..=100.0).contains(p))
                    .map(|p| p.round() as u8);
                section = Section::Preamble;
                continue;
            }
            if let Some(caps) = patterns.keywords_header.captures(line) {
                saw_keywords = true;
                section = Section::Keywords;
                keywords.extend(split_inline_keywords(&caps[1]));
                continue;
            }
            if let Some(caps) = patterns.summary_header.captures(line) {
                saw_summary = true;
                section = Section::Summary;
                let inline = caps[1].trim();
                if !inline.is_empty() {
                    summary.push(inline.to_string());
                }
                continue;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match section {
                Section::Keywords => {
                    let item = patterns
                        .bullet
                        .captures(line)
                        .map(|caps| caps[1].trim().to_string())
                        .unwrap_or_else(|| trimmed.to_string());
                    let item = strip_decoration(&item);
                    if !item.is_empty() && !is_none_marker(&item) {
                        keywords.push(item);
                    }
                }
                Section::Summary => summary.push(trimmed.to_string()),
                Section::Preamble => {}
            }
        }

        let profile_summary = summary.join(" ");
        if let (Some(match_percentage), true, true) = (percentage, saw_keywords, saw_summary) {
            if !profile_summary.is_empty() {
                return AtsEvaluation::Structured {
                    match_percentage,
                    missing_keywords: keywords,
                    profile_summary,
                };
            }
        }

        if let Some(first) = response.lines().map(str::trim).find(|l| !l.is_empty() && !l.starts_with("```")) {
            if let Some(caps) = patterns.rejection.captures(first) {
                return AtsEvaluation::Rejected {
                    message: caps[1].trim().trim_end_matches(['`', '*', '_']).trim().to_string(),
                };
            }
        }

        AtsEvaluation::Unstructured
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, AtsEvaluation::Structured { .. })
    }
}

fn split_inline_keywords(inline: &str) -> Vec<String> {
    inline
        .split(',')
        .map(strip_decoration)
        .filter(|k| !k.is_empty() && !is_none_marker(k))
        .collect()
}

fn strip_decoration(item: &str) -> String {
    item.trim().trim_matches(['*', '_', '`']).trim().to_string()
}

fn is_none_marker(item: &str) -> bool {
    matches!(item.to_lowercase().trim_end_matches('.'), "none" | "n/a" | "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "JD Match Percentage: 72%\n\nMissing Keywords:\n  - Kubernetes\n  - GraphQL\n\n\nProfile Summary:\n  Frontend engineer with four years of React experience.\n  Strong TypeScript background.\n";

    #[test]
    fn parses_the_requested_layout() {
        let evaluation = AtsEvaluation::parse(WELL_FORMED);
        assert_eq!(
            evaluation,
            AtsEvaluation::Structured {
                match_percentage: 72,
                missing_keywords: vec!["Kubernetes".into(), "GraphQL".into()],
                profile_summary: "Frontend engineer with four years of React experience. Strong TypeScript background."
                    .into(),
            }
        );
    }

    #[test]
    fn tolerates_markdown_decoration() {
        let response = "**JD Match Percentage:** 85.6%\n\n**Missing Keywords:**\n* `Terraform`\n* **AWS Lambda**\n\n## Profile Summary\nBackend developer focused on Rust services.";
        match AtsEvaluation::parse(response) {
            AtsEvaluation::Structured {
                match_percentage,
                missing_keywords,
                profile_summary,
            } => {
                assert_eq!(match_percentage, 86);
                assert_eq!(missing_keywords, vec!["Terraform", "AWS Lambda"]);
                assert_eq!(profile_summary, "Backend developer focused on Rust services.");
            }
            other => panic!("expected structured, got {:?}", other),
        }
    }

    #[test]
    fn inline_keywords_and_none_marker() {
        let response = "JD Match Percentage: 95%\nMissing Keywords: Docker, Helm\nProfile Summary: Platform engineer.";
        if let AtsEvaluation::Structured { missing_keywords, .. } = AtsEvaluation::parse(response) {
            assert_eq!(missing_keywords, vec!["Docker", "Helm"]);
        } else {
            panic!("expected structured");
        }

        let response = "JD Match Percentage: 100%\nMissing Keywords:\n  - None\nProfile Summary: Perfect fit.";
        if let AtsEvaluation::Structured { missing_keywords, .. } = AtsEvaluation::parse(response) {
            assert!(missing_keywords.is_empty());
        } else {
            panic!("expected structured");
        }
    }

    #[test]
    fn missing_section_falls_back_to_unstructured() {
        let response = "JD Match Percentage: 60%\nMissing Keywords:\n - Go\n";
        assert_eq!(AtsEvaluation::parse(response), AtsEvaluation::Unstructured);
        assert_eq!(AtsEvaluation::parse(""), AtsEvaluation::Unstructured);
        assert_eq!(AtsEvaluation::parse("The candidate looks great!"), AtsEvaluation::Unstructured);
    }

    #[test]
    fn out_of_range_percentage_is_not_trusted() {
        let response = "JD Match Percentage: 180%\nMissing Keywords:\n - Go\nProfile Summary: Something.";
        assert_eq!(AtsEvaluation::parse(response), AtsEvaluation::Unstructured);
    }

    #[test]
    fn invalid_resume_message_is_recognised() {
        let response = "```\nError: The uploaded document does not appear to be a valid resume. Please upload a professional resume in PDF format.\n```";
        assert_eq!(
            AtsEvaluation::parse(response),
            AtsEvaluation::Rejected {
                message: "The uploaded document does not appear to be a valid resume. Please upload a professional resume in PDF format."
                    .into()
            }
        );
    }

    #[test]
    fn report_keeps_raw_text() {
        let outcome = AnalysisOutcome {
            response: WELL_FORMED.to_string(),
            model: "gemini-1.5-flash-8b".into(),
            template_version: "1.0.0".into(),
            stats: ExtractionStats {
                page_count: 2,
                empty_pages: 0,
                extracted_chars: 1200,
                normalized_words: 180,
                prompt_chars: 5000,
            },
            processing_time_ms: 850,
        };
        let report = AnalysisReport::from_outcome(outcome);
        assert_eq!(report.raw_response, WELL_FORMED);
        assert!(report.evaluation.is_structured());
        assert_eq!(report.metadata.extraction.page_count, 2);
    }
}
