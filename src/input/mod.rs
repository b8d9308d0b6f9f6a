//! Input processing module
//! Handles file detection, PDF text extraction, and job description loading

pub mod file_detector;
pub mod manager;
pub mod pdf;
pub mod text_extractor;

pub use manager::{InputManager, JobSource};
pub use pdf::{ExtractedDocument, PageText, PdfExtractor};
