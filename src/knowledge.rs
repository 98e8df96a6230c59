use lopdf::Document;
use std::fs;
use std::path::Path;

pub const SUMMARY_FILE: &str = "business_summary.txt";
pub const DETAILS_FILE: &str = "about_business.pdf";

/// Static business description loaded once at startup and never reloaded.
/// Missing or unreadable documents degrade to empty strings so the agent can
/// still come up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessKnowledge {
    pub summary: String,
    pub details: String,
}

impl BusinessKnowledge {
    pub fn load(dir: &Path) -> Self {
        Self {
            summary: load_text(&dir.join(SUMMARY_FILE)),
            details: load_pdf_text(&dir.join(DETAILS_FILE)),
        }
    }
}

pub fn load_text(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("[knowledge] failed to read {}: {err}", path.display());
            String::new()
        }
    }
}

pub fn load_pdf_text(path: &Path) -> String {
    match extract_pdf_text(path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!(
                "[knowledge] failed to extract text from {}: {err}",
                path.display()
            );
            String::new()
        }
    }
}

fn extract_pdf_text(path: &Path) -> Result<String, lopdf::Error> {
    let doc = Document::load(path)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    doc.extract_text(&pages)
}
