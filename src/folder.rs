//! Supplementary data read from an item folder: `meta.json`, the plain-text
//! description and the image files.

use crate::config::{DESCRIPTION_FILE, META_FILE};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "svg"];

/// Optional per-item metadata from `meta.json`.
///
/// Fields are read one by one: a value of an unexpected type only resets
/// that field, numbers and booleans are kept as their JSON text.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub cover: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub published: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub updated: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub eigenanteil: Option<String>,
    #[serde(deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub excerpt: Option<String>,
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        Value::String(tag) => vec![tag],
        _ => Vec::new(),
    })
}

/// One item folder and everything read from it besides the source document
#[derive(Debug, Clone)]
pub struct ItemFolder {
    pub slug: String,
    pub meta: Meta,
    pub has_meta: bool,
    pub description: String,
    /// Image file names, sorted
    pub images: Vec<String>,
}

impl ItemFolder {
    /// Read folder data. Missing or unreadable optional files become defaults,
    /// so every folder yields an item even when it cannot be listed.
    pub fn load(path: &Path, slug: &str) -> Self {
        let meta_path = path.join(META_FILE);
        let has_meta = meta_path.is_file();
        let meta = if has_meta {
            read_meta(&meta_path)
        } else {
            Meta::default()
        };

        let images = list_images(path).unwrap_or_else(|e| {
            warn!("  ! could not list images of {}: {:#}", slug, e);
            Vec::new()
        });

        Self {
            description: read_text_if_exists(&path.join(DESCRIPTION_FILE)),
            slug: slug.to_string(),
            images,
            meta,
            has_meta,
        }
    }

    /// Title derived from the folder name alone
    pub fn slug_title(&self) -> String {
        self.slug.replace('-', " ").trim().to_string()
    }

    /// `meta.title` when set, otherwise the folder-name title
    pub fn resolved_title(&self) -> String {
        match self.meta.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self.slug_title(),
        }
    }
}

fn read_meta(path: &Path) -> Meta {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("  ! could not read {}: {}", path.display(), e);
            return Meta::default();
        }
    };

    match serde_json::from_str(&String::from_utf8_lossy(&bytes)) {
        Ok(meta) => meta,
        Err(e) => {
            warn!("  ! ignoring malformed {}: {}", path.display(), e);
            Meta::default()
        }
    }
}

fn read_text_if_exists(path: &Path) -> String {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).trim().to_string(),
        Err(_) => String::new(),
    }
}

fn list_images(dir: &Path) -> Result<Vec<String>> {
    let mut images = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
        if is_image {
            images.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    images.sort();
    Ok(images)
}
