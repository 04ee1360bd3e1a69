use anyhow::Result;

/// Trait for reading source formats (DOCX, PDF, ODT, Markdown) into HTML
pub trait DocumentReader {
    /// Convert the whole document to an HTML body fragment
    fn body_html(&self) -> Result<String>;
}
