use crate::reader::DocumentReader;
use crate::shell::escape_html;
use anyhow::{anyhow, Context, Result};
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

pub struct PdfData {
    doc: Document,
}

impl PdfData {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path)
            .with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        Ok(Self { doc })
    }

    /// Text of each page in page-number order
    fn page_texts(&self) -> Result<Vec<String>> {
        let mut pages = Vec::new();

        // get_pages is keyed by 1-based page number, already sorted
        for page_number in self.doc.get_pages().keys() {
            // lopdf can panic on broken font encodings
            let text = panic::catch_unwind(AssertUnwindSafe(|| {
                self.doc.extract_text(&[*page_number])
            }))
            .map_err(|_| anyhow!("PDF text extraction panicked on page {}", page_number))?
            .with_context(|| format!("Failed to extract text from page {}", page_number))?;

            pages.push(text);
        }

        Ok(pages)
    }
}

impl DocumentReader for PdfData {
    fn body_html(&self) -> Result<String> {
        let pages = self.page_texts()?;
        Ok(pages_to_html(&pages))
    }
}

/// One `<section>` per page, separated by horizontal rules
pub fn pages_to_html(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, text)| {
            format!(
                "<section data-page='{}'>\n{}\n</section>",
                i + 1,
                page_fragment(text)
            )
        })
        .collect::<Vec<_>>()
        .join("\n<hr />\n")
}

fn page_fragment(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format!("<p>{}</p>", escape_html(line)))
        .collect::<Vec<_>>()
        .join("\n")
}
