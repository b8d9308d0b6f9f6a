//! Text processing and the request pipeline

pub mod analyzer;
pub mod normalizer;

pub use analyzer::{AnalysisEngine, AnalysisOutcome, ExtractionStats, PreparedPrompt, PromptPipeline};
pub use normalizer::{NormalizedText, TextNormalizer};
