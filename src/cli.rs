use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Convert item folders (DOCX, PDF, ODT, Markdown) to HTML articles
#[derive(Parser, Debug)]
#[command(name = "folio2html", version, about)]
pub struct Cli {
    /// Root directory holding one sub-folder per item
    #[arg(default_value = "assets/work")]
    pub root: PathBuf,

    /// Collection mode writes placeholders and a JSON index; blog mode only converts
    #[arg(short, long, value_enum, default_value_t = Mode::Collection)]
    pub mode: Mode,

    /// Index output path.
    /// Defaults to `<root name>-index.json` next to the root directory.
    #[arg(short, long)]
    pub index: Option<PathBuf>,

    /// Site-absolute URL prefix for index entries. Defaults to `/assets/<root name>`.
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// Value of the `type` field on every index entry
    #[arg(long, default_value = "work")]
    pub item_type: String,

    /// Reconvert even when article.html is newer than its source
    #[arg(short, long, default_value_t = false)]
    pub force: bool,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Metadata-aware titles, placeholder articles, JSON index
    Collection,
    /// Folder-name titles, folders without a source are skipped
    Blog,
}
