use crate::config::{Config, ARTICLE_FILE, META_FILE};
use crate::folder::ItemFolder;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One collection item as consumed by the site's client-side code
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    #[serde(rename = "type")]
    pub item_type: String,
    pub slug: String,
    pub title: String,
    pub published: String,
    pub updated: String,
    pub eigenanteil: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub description: String,
    pub images: Vec<String>,
    pub cover: String,
    pub content_url: String,
    pub meta_url: String,
}

#[derive(Debug, Serialize)]
struct CollectionIndex<'a> {
    items: &'a [IndexEntry],
}

impl IndexEntry {
    pub fn build(config: &Config, item: &ItemFolder, title: &str) -> Self {
        let base = config.item_base_url(&item.slug);
        let meta = &item.meta;

        let images: Vec<String> = item
            .images
            .iter()
            .map(|name| format!("{}/{}", base, name))
            .collect();

        let cover = non_empty(meta.cover.as_deref())
            .map(str::to_string)
            .or_else(|| images.first().cloned())
            .unwrap_or_default();

        let excerpt = non_empty(meta.excerpt.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| item.description.clone());

        Self {
            item_type: config.item_type.clone(),
            slug: item.slug.clone(),
            title: title.to_string(),
            published: meta.published.clone().unwrap_or_default(),
            updated: meta.updated.clone().unwrap_or_default(),
            eigenanteil: meta.eigenanteil.clone().unwrap_or_default(),
            tags: meta.tags.clone(),
            excerpt,
            description: item.description.clone(),
            images,
            cover,
            content_url: format!("{}/{}", base, ARTICLE_FILE),
            meta_url: if item.has_meta {
                format!("{}/{}", base, META_FILE)
            } else {
                String::new()
            },
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Serialize `{"items": [...]}` with two-space indentation, non-ASCII kept literal
pub fn render_index(entries: &[IndexEntry]) -> Result<String> {
    serde_json::to_string_pretty(&CollectionIndex { items: entries })
        .context("Failed to serialize collection index")
}

pub fn write_index(path: &Path, entries: &[IndexEntry]) -> Result<()> {
    let json = render_index(entries)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, json)
        .with_context(|| format!("Failed to write index: {}", path.display()))
}
