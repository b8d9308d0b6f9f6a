//! The request pipeline: extract, normalize, build the prompt, generate

use crate::error::Result;
use crate::input::pdf::{ExtractedDocument, PdfExtractor};
use crate::llm::client::GenerationClient;
use crate::llm::prompts::{PromptDocument, PromptParams, PromptTemplates};
use crate::processing::normalizer::{NormalizedText, TextNormalizer};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Everything produced before the model is called.
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub extracted: ExtractedDocument,
    pub resume: NormalizedText,
    pub prompt: PromptDocument,
}

impl PreparedPrompt {
    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            page_count: self.extracted.page_count(),
            empty_pages: self.extracted.empty_page_count(),
            extracted_chars: self.extracted.text().chars().count(),
            normalized_words: self.resume.word_count(),
            prompt_chars: self.prompt.text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub page_count: usize,
    pub empty_pages: usize,
    pub extracted_chars: usize,
    pub normalized_words: usize,
    pub prompt_chars: usize,
}

/// Result of one full round trip. `response` is the model's text, untouched.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub response: String,
    pub model: String,
    pub template_version: String,
    pub stats: ExtractionStats,
    pub processing_time_ms: u64,
}

/// The deterministic half of the pipeline; needs no credential.
#[derive(Default)]
pub struct PromptPipeline {
    normalizer: TextNormalizer,
    templates: PromptTemplates,
}

impl PromptPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&self, job_description: &str, resume_pdf: &[u8]) -> Result<PreparedPrompt> {
        let extracted = PdfExtractor.extract(resume_pdf)?;
        let resume = self.normalizer.normalize(extracted.text());
        let prompt = self.templates.render_ats_evaluation(&PromptParams {
            job_description,
            resume: &resume,
        })?;

        Ok(PreparedPrompt {
            extracted,
            resume,
            prompt,
        })
    }
}

pub struct AnalysisEngine<C> {
    pipeline: PromptPipeline,
    client: C,
}

impl<C: GenerationClient> AnalysisEngine<C> {
    pub fn new(client: C) -> Self {
        Self {
            pipeline: PromptPipeline::new(),
            client,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run one request end to end. Nothing is sent to the model unless the
    /// PDF was readable and the prompt rendered.
    pub async fn analyze(&self, job_description: &str, resume_pdf: &[u8]) -> Result<AnalysisOutcome> {
        let started = Instant::now();

        let prepared = self.pipeline.prepare(job_description, resume_pdf)?;
        let stats = prepared.stats();
        info!(
            "Prepared prompt: {} pages ({} empty), {} resume words, {} prompt chars",
            stats.page_count, stats.empty_pages, stats.normalized_words, stats.prompt_chars
        );

        let response = self.client.generate(prepared.prompt.as_str()).await?;

        Ok(AnalysisOutcome {
            response,
            model: self.client.model_name().to_string(),
            template_version: prepared.prompt.template_version,
            stats,
            processing_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}
