//! Input manager: loads the resume PDF and the job description

use crate::error::{Result, SmartAtsError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PlainTextExtractor, TextExtractor};
use log::info;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Where the job description comes from.
#[derive(Debug, Clone)]
pub enum JobSource {
    File(PathBuf),
    Inline(String),
    Stdin,
}

#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read the resume as raw bytes. Only the extension and existence are
    /// checked here; whether the bytes are a readable PDF is decided by the
    /// extractor.
    pub async fn read_resume(&self, path: &Path) -> Result<Vec<u8>> {
        self.ensure_exists(path)?;

        if FileType::from_path(path) != FileType::Pdf {
            return Err(SmartAtsError::InvalidInput(format!(
                "Resume must be a PDF file: {}",
                path.display()
            )));
        }

        info!("Reading resume PDF: {}", path.display());
        Ok(tokio::fs::read(path).await?)
    }

    pub async fn read_job_description(&self, source: &JobSource) -> Result<String> {
        let text = match source {
            JobSource::Inline(text) => text.clone(),
            JobSource::Stdin => {
                info!("Reading job description from stdin");
                let mut buf = String::new();
                tokio::io::stdin().read_to_string(&mut buf).await?;
                buf
            }
            JobSource::File(path) => {
                self.ensure_exists(path)?;
                match FileType::from_path(path) {
                    FileType::Text => {
                        info!("Reading plain text job description: {}", path.display());
                        PlainTextExtractor.extract(path).await?
                    }
                    FileType::Markdown => {
                        info!("Processing markdown job description: {}", path.display());
                        MarkdownExtractor.extract(path).await?
                    }
                    FileType::Pdf | FileType::Unknown => {
                        return Err(SmartAtsError::InvalidInput(format!(
                            "Unsupported job description file (expected .txt or .md): {}",
                            path.display()
                        )));
                    }
                }
            }
        };

        if text.trim().is_empty() {
            return Err(SmartAtsError::InvalidInput("Job description is empty".to_string()));
        }

        Ok(text)
    }

    fn ensure_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SmartAtsError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }
        Ok(())
    }
}
