//! OpenDocument Text reader.
//!
//! An ODT file is a ZIP archive; the body lives in `content.xml`. Only
//! paragraph text is kept, every `text:p` in document order (including
//! paragraphs nested in tables, frames or notes).

use crate::reader::DocumentReader;
use crate::shell::escape_html;
use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

pub const NO_TEXT_PLACEHOLDER: &str = "<p>(Kein Text gefunden.)</p>";

pub struct OdtData {
    content_xml: String,
}

impl OdtData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open ODT: {}", path.display()))?;
        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to read ODT: {}", path.display()))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader).context("Not a ZIP archive")?;
        let mut file = archive
            .by_name("content.xml")
            .context("Missing content.xml")?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        Ok(Self {
            content_xml: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

impl DocumentReader for OdtData {
    fn body_html(&self) -> Result<String> {
        let paragraphs = extract_paragraphs(&self.content_xml)?;
        Ok(paragraphs_to_html(&paragraphs))
    }
}

fn paragraphs_to_html(paragraphs: &[String]) -> String {
    let body: Vec<String> = paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p)))
        .collect();

    if body.is_empty() {
        NO_TEXT_PLACEHOLDER.to_string()
    } else {
        body.join("\n")
    }
}

/// Text of every `text:p` element, ordered by where each paragraph starts
pub fn extract_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut paragraphs: Vec<String> = Vec::new();
    // Indices into `paragraphs` of the currently open text:p elements
    let mut open: Vec<usize> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"text:p" {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"text:p" => paragraphs.push(String::new()),
                b"text:s" => {
                    let spaces = " ".repeat(space_count(&e));
                    append(&mut paragraphs, &open, &spaces);
                }
                b"text:tab" => append(&mut paragraphs, &open, "\t"),
                b"text:line-break" => append(&mut paragraphs, &open, "\n"),
                _ => {}
            },
            Ok(Event::Text(e)) if !open.is_empty() => {
                let text = e.unescape().context("Invalid text in content.xml")?;
                append(&mut paragraphs, &open, &text);
            }
            Ok(Event::CData(e)) if !open.is_empty() => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                append(&mut paragraphs, &open, &text);
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"text:p" {
                    open.pop();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e).context("Malformed content.xml"),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

/// Nested paragraphs also contribute to their enclosing paragraph's text
fn append(paragraphs: &mut [String], open: &[usize], text: &str) {
    for &idx in open {
        paragraphs[idx].push_str(text);
    }
}

fn space_count(e: &BytesStart) -> usize {
    e.try_get_attribute("text:c")
        .ok()
        .flatten()
        .and_then(|attr| std::str::from_utf8(&attr.value).ok()?.trim().parse().ok())
        .unwrap_or(1)
}
