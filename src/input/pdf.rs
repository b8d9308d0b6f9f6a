//! Page-wise PDF text extraction.
//!
//! The document is opened with [`lopdf`] and every page is extracted on its
//! own. A page that fails (parser error, panic inside the parser, no text) is
//! recorded as [`PageText::Empty`] and the rest of the document carries on;
//! only a document that cannot be opened at all is an error. Encrypted
//! documents are tried with the empty user password before giving up.

use crate::error::{Result, SmartAtsError};
use log::{debug, info, warn};
use lopdf::Document;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Once;
use tokio::fs;

/// How far into the buffer the `%PDF` marker may appear.
const HEADER_SEARCH_WINDOW: usize = 1024;

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static INSTALL_PANIC_HOOK: Once = Once::new();

/// Run `f`, turning a panic into `Err`. While `f` runs, the panic message is
/// not printed for this thread; other threads keep the previous hook.
fn catch_parser_panic<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    INSTALL_PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });

    QUIET_PANICS.with(|quiet| quiet.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|quiet| quiet.set(false));
    result
}

/// Text recovered from a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    Text(String),
    Empty,
}

impl PageText {
    pub fn as_str(&self) -> &str {
        match self {
            PageText::Text(text) => text,
            PageText::Empty => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PageText::Empty)
    }
}

/// The per-page results of one extraction together with their concatenation.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pages: Vec<PageText>,
    text: String,
}

impl ExtractedDocument {
    pub fn from_pages(pages: Vec<PageText>) -> Self {
        let text = pages.iter().map(PageText::as_str).collect::<String>();
        Self { pages, text }
    }

    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn empty_page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_empty()).count()
    }

    /// All page texts in page order, with nothing inserted between them.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

pub struct PdfExtractor;

impl PdfExtractor {
    pub async fn extract_file(&self, path: &Path) -> Result<ExtractedDocument> {
        let bytes = fs::read(path).await?;
        self.extract(&bytes)
    }

    /// Extract every page of an in-memory PDF.
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedDocument> {
        let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
        if !window.windows(4).any(|w| w == b"%PDF") {
            return Err(SmartAtsError::DocumentFormat(
                "missing %PDF header; the input is not a PDF document".to_string(),
            ));
        }

        let mut document = catch_parser_panic(|| Document::load_mem(bytes))
            .map_err(|_| {
                SmartAtsError::DocumentFormat("PDF parser panicked (malformed document)".to_string())
            })?
            .map_err(|e| SmartAtsError::DocumentFormat(format!("failed to parse PDF: {}", e)))?;

        // Owner-password-only documents open with the empty user password.
        if document.is_encrypted() {
            catch_parser_panic(|| document.decrypt(""))
                .map_err(|_| {
                    SmartAtsError::DocumentFormat("PDF parser panicked while decrypting".to_string())
                })?
                .map_err(|e| {
                    SmartAtsError::DocumentFormat(format!(
                        "PDF is encrypted and cannot be opened without a password: {}",
                        e
                    ))
                })?;
            debug!("Opened encrypted PDF with the empty user password");
        }

        let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
        let pages: Vec<PageText> = page_numbers
            .iter()
            .map(|&page_number| extract_page(&document, page_number))
            .collect();

        let extracted = ExtractedDocument::from_pages(pages);
        info!(
            "Extracted {} characters from {} pages ({} without text)",
            extracted.text().len(),
            extracted.page_count(),
            extracted.empty_page_count()
        );
        Ok(extracted)
    }
}

fn extract_page(document: &Document, page_number: u32) -> PageText {
    match catch_parser_panic(|| document.extract_text(&[page_number])) {
        Ok(Ok(text)) if !text.is_empty() => PageText::Text(text),
        Ok(Ok(_)) => {
            debug!("Page {}: no extractable text", page_number);
            PageText::Empty
        }
        Ok(Err(e)) => {
            debug!("Page {}: text extraction failed: {}", page_number, e);
            PageText::Empty
        }
        Err(_) => {
            warn!("Page {}: PDF parser panicked, treating page as empty", page_number);
            PageText::Empty
        }
    }
}
