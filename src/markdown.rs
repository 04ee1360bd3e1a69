use crate::reader::DocumentReader;
use anyhow::{Context, Result};
use pulldown_cmark::{html, Options, Parser};
use std::fs;
use std::path::Path;

pub struct MarkdownData {
    text: String,
}

impl MarkdownData {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read Markdown: {}", path.display()))?;
        Ok(Self::from_text(&String::from_utf8_lossy(&bytes)))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl DocumentReader for MarkdownData {
    fn body_html(&self) -> Result<String> {
        Ok(markdown_to_html(&self.text))
    }
}

/// Render Markdown with tables, footnotes and definition lists enabled
pub fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(md, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);

    out.trim_end().to_string()
}
