use crate::docx_html;
use crate::reader::DocumentReader;
use anyhow::{Context, Result};
use docx_rust::DocxFile;
use std::path::Path;

pub struct DocxData {
    /// DocxFile owns the raw data; Docx borrows from it, so parse on demand.
    file: DocxFile,
}

impl DocxData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = DocxFile::from_file(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Failed to open DOCX: {}", path.display()))?;
        Ok(Self { file })
    }

    fn parse(&self) -> Result<docx_rust::Docx<'_>> {
        self.file
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .context("Failed to parse DOCX content")
    }
}

impl DocumentReader for DocxData {
    fn body_html(&self) -> Result<String> {
        let docx = self.parse()?;
        Ok(docx_html::docx_to_html(&docx))
    }
}
