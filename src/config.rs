use crate::cli::{Cli, Mode};
use crate::shell::ShellTemplate;
use std::path::{Path, PathBuf};

/// Name of the generated article inside every item folder
pub const ARTICLE_FILE: &str = "article.html";
pub const META_FILE: &str = "meta.json";
pub const DESCRIPTION_FILE: &str = "beschreibung.txt";

/// Everything a run needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub mode: Mode,
    pub index_path: PathBuf,
    pub url_prefix: String,
    pub item_type: String,
    pub force: bool,
    pub shell: ShellTemplate,
}

impl Config {
    /// Config with defaults derived from the root directory
    pub fn new(root: impl Into<PathBuf>, mode: Mode) -> Self {
        let root = root.into();
        let name = collection_name(&root);
        let index_path = default_index_path(&root, &name);

        Self {
            index_path,
            url_prefix: format!("/assets/{}", name),
            item_type: "work".to_string(),
            force: false,
            shell: ShellTemplate::default(),
            root,
            mode,
        }
    }

    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Self::new(&cli.root, cli.mode);

        if let Some(ref index) = cli.index {
            config.index_path = index.clone();
        }
        if let Some(ref prefix) = cli.url_prefix {
            config.url_prefix = prefix.trim_end_matches('/').to_string();
        }
        config.item_type = cli.item_type.clone();
        config.force = cli.force;

        config
    }

    /// Site-absolute base URL for one item folder
    pub fn item_base_url(&self, slug: &str) -> String {
        format!("{}/{}", self.url_prefix, slug)
    }
}

fn collection_name(root: &Path) -> String {
    // `.` and `..` have no file name; fall back to the resolved directory.
    root.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        })
        .unwrap_or_else(|| "work".to_string())
}

fn default_index_path(root: &Path, name: &str) -> PathBuf {
    let file = format!("{}-index.json", name);
    match root.parent() {
        Some(parent) => parent.join(file),
        None => PathBuf::from(file),
    }
}
