use crate::cli::Mode;
use crate::config::{Config, ARTICLE_FILE};
use crate::docx_reader::DocxData;
use crate::error::RunError;
use crate::folder::ItemFolder;
use crate::index::{self, IndexEntry};
use crate::markdown::MarkdownData;
use crate::odt_reader::OdtData;
use crate::pdf_reader::PdfData;
use crate::reader::DocumentReader;
use crate::shell::ShellTemplate;
use crate::source::{self, SourceFile, SourceKind};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const PLACEHOLDER_BODY: &str =
    "<p class='fineprint'>(Kein Artikel-Quelldokument gefunden.)</p>";

/// What happened to one item folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOutcome {
    Converted,
    UpToDate,
    /// Blog mode, no source document
    Skipped,
    /// Collection mode, no source document, placeholder article written
    Placeholder,
    /// Collection mode, no source document, existing article kept
    NoSource,
    Failed,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Slug and outcome per folder, in processing order
    pub outcomes: Vec<(String, FolderOutcome)>,
    pub index_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn count(&self, outcome: FolderOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }

    pub fn converted(&self) -> usize {
        self.count(FolderOutcome::Converted)
    }
}

/// Convert every item folder below `config.root` and, in collection mode,
/// write the collection index.
pub fn run(config: &Config) -> Result<RunSummary> {
    if !config.root.is_dir() {
        return Err(RunError::RootMissing(config.root.clone()).into());
    }

    let mut summary = RunSummary::default();
    let mut entries = Vec::new();

    for dir in item_folders(&config.root)? {
        let slug = dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let (outcome, entry) = process_folder(config, &dir, &slug);
        entries.extend(entry);
        summary.outcomes.push((slug, outcome));
    }

    match config.mode {
        Mode::Collection => {
            index::write_index(&config.index_path, &entries)?;
            info!(
                "Done. Converted {} article(s). Wrote {}",
                summary.converted(),
                config.index_path.display()
            );
            summary.index_path = Some(config.index_path.clone());
        }
        Mode::Blog => {
            info!("Done. Converted {} article(s).", summary.converted());
        }
    }

    Ok(summary)
}

/// Immediate sub-directories of the root, in lexical name order
fn item_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("Failed to list {}", root.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(dirs)
}

/// Convert one folder. In collection mode the index entry is produced even
/// when the folder cannot be listed or converted.
fn process_folder(config: &Config, dir: &Path, slug: &str) -> (FolderOutcome, Option<IndexEntry>) {
    let item = ItemFolder::load(dir, slug);
    let title = match config.mode {
        Mode::Collection => item.resolved_title(),
        Mode::Blog => item.slug_title(),
    };
    let out_html = dir.join(ARTICLE_FILE);

    let outcome = match source::pick_source(dir) {
        Ok(Some(src)) => convert_if_stale(config, &item.slug, &src, &title, &out_html),
        Err(e) => {
            error!("  ✗ ERROR reading {}: {}", item.slug, e);
            FolderOutcome::Failed
        }
        Ok(None) => match config.mode {
            Mode::Blog => {
                info!("– {}: no source document, skipping", item.slug);
                FolderOutcome::Skipped
            }
            Mode::Collection => write_placeholder(&config.shell, &item.slug, &title, &out_html),
        },
    };

    let entry = match config.mode {
        Mode::Collection => Some(IndexEntry::build(config, &item, &title)),
        Mode::Blog => None,
    };

    (outcome, entry)
}

fn convert_if_stale(
    config: &Config,
    slug: &str,
    src: &SourceFile,
    title: &str,
    out_html: &Path,
) -> FolderOutcome {
    if !config.force && is_up_to_date(out_html, src) {
        info!(
            "✓ {}: {} is up to date (source: {})",
            slug,
            ARTICLE_FILE,
            src.file_name()
        );
        return FolderOutcome::UpToDate;
    }

    info!("→ Converting: {} ({})", slug, src.file_name());
    let result = convert_file(&src.path, Some(src.kind), title, &config.shell).and_then(|html| {
        fs::write(out_html, html)
            .with_context(|| format!("Failed to write {}", out_html.display()))
    });

    match result {
        Ok(()) => {
            info!("  ✓ wrote {}", out_html.display());
            FolderOutcome::Converted
        }
        Err(e) => {
            error!("  ✗ ERROR converting {}: {:#}", slug, e);
            FolderOutcome::Failed
        }
    }
}

/// Up to date when the article exists and is not older than its source
fn is_up_to_date(out_html: &Path, src: &SourceFile) -> bool {
    match fs::metadata(out_html).and_then(|m| m.modified()) {
        Ok(out_modified) => out_modified >= src.modified,
        Err(_) => false,
    }
}

fn write_placeholder(shell: &ShellTemplate, slug: &str, title: &str, out_html: &Path) -> FolderOutcome {
    if out_html.exists() {
        debug!("{}: no source document, keeping existing {}", slug, ARTICLE_FILE);
        return FolderOutcome::NoSource;
    }

    match fs::write(out_html, shell.render(title, PLACEHOLDER_BODY)) {
        Ok(()) => {
            info!("○ {}: no source document, wrote placeholder", slug);
            FolderOutcome::Placeholder
        }
        Err(e) => {
            error!("  ✗ ERROR writing placeholder for {}: {}", slug, e);
            FolderOutcome::Failed
        }
    }
}

/// Convert one source file to a complete HTML document.
/// Without a recognized kind the article is empty.
pub fn convert_file(
    path: &Path,
    kind: Option<SourceKind>,
    title: &str,
    shell: &ShellTemplate,
) -> Result<String> {
    let body = match kind {
        Some(kind) => open_reader(kind, path)?.body_html()?,
        None => String::new(),
    };
    Ok(shell.render(title, &body))
}

fn open_reader(kind: SourceKind, path: &Path) -> Result<Box<dyn DocumentReader>> {
    Ok(match kind {
        SourceKind::Docx => Box::new(DocxData::open(path)?),
        SourceKind::Pdf => Box::new(PdfData::open(path)?),
        SourceKind::Odt => Box::new(OdtData::open(path)?),
        SourceKind::Markdown => Box::new(MarkdownData::open(path)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    const PAST: i64 = 1_600_000_000;

    fn work_root() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("work");
        fs::create_dir(&root).unwrap();
        (tmp, root)
    }

    fn add_file(root: &Path, slug: &str, name: &str, content: &str) -> PathBuf {
        let dir = root.join(slug);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(PAST, 0)).unwrap();
        path
    }

    fn read_index(config: &Config) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(&config.index_path).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = Config::new(tmp.path().join("nope"), Mode::Collection);

        let err = run(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::RootMissing(_))
        ));
        assert!(!config.index_path.exists());
    }

    #[test]
    fn test_blog_markdown_example() {
        let (_tmp, root) = work_root();
        add_file(&root, "sample-post", "notes.md", "# Hi\n\nWorld");
        let config = Config::new(&root, Mode::Blog);

        let summary = run(&config).unwrap();
        assert_eq!(summary.converted(), 1);
        assert!(summary.index_path.is_none());
        assert!(!config.index_path.exists());

        let html = fs::read_to_string(root.join("sample-post/article.html")).unwrap();
        assert!(html.contains("<title>sample post</title>"));
        let article = html
            .split("<article class=\"prose\">")
            .nth(1)
            .and_then(|rest| rest.split("</article>").next())
            .unwrap();
        assert!(article.contains("<h1>Hi</h1>"));
        assert!(article.contains("<p>World</p>"));
    }

    #[test]
    fn test_blog_ignores_meta_title_and_skips_missing_source() {
        let (_tmp, root) = work_root();
        add_file(&root, "a-post", "post.md", "text");
        add_file(&root, "a-post", "meta.json", r#"{"title": "Ignored"}"#);
        add_file(&root, "empty-post", "cover.png", "x");
        let config = Config::new(&root, Mode::Blog);

        let summary = run(&config).unwrap();
        assert_eq!(
            summary.outcomes,
            vec![
                ("a-post".to_string(), FolderOutcome::Converted),
                ("empty-post".to_string(), FolderOutcome::Skipped),
            ]
        );
        let html = fs::read_to_string(root.join("a-post/article.html")).unwrap();
        assert!(html.contains("<title>a post</title>"));
        assert!(!root.join("empty-post/article.html").exists());
    }

    #[test]
    fn test_collection_meta_and_cover_example() {
        let (_tmp, root) = work_root();
        add_file(&root, "proj", "meta.json", r#"{"title": "My Title", "tags": ["a","b"]}"#);
        add_file(&root, "proj", "cover.png", "png");
        add_file(&root, "proj", "text.md", "Hallo");
        let config = Config::new(&root, Mode::Collection);

        run(&config).unwrap();

        let index = read_index(&config);
        let entry = &index["items"][0];
        assert_eq!(entry["type"], "work");
        assert_eq!(entry["slug"], "proj");
        assert_eq!(entry["title"], "My Title");
        assert_eq!(entry["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(entry["cover"], "/assets/work/proj/cover.png");
        assert_eq!(entry["description"], "");
        assert_eq!(entry["contentUrl"], "/assets/work/proj/article.html");
        assert_eq!(entry["metaUrl"], "/assets/work/proj/meta.json");

        let html = fs::read_to_string(root.join("proj/article.html")).unwrap();
        assert!(html.contains("<title>My Title</title>"));
    }

    #[test]
    fn test_collection_missing_source_gets_placeholder_and_entry() {
        let (_tmp, root) = work_root();
        add_file(&root, "no-source", "beschreibung.txt", "Nur Text");
        let config = Config::new(&root, Mode::Collection);

        let summary = run(&config).unwrap();
        assert_eq!(summary.count(FolderOutcome::Placeholder), 1);

        let html = fs::read_to_string(root.join("no-source/article.html")).unwrap();
        assert!(html.contains(PLACEHOLDER_BODY));
        assert!(html.contains("<title>no source</title>"));

        let index = read_index(&config);
        let entry = &index["items"][0];
        assert_eq!(entry["excerpt"], "Nur Text");
        assert_eq!(entry["contentUrl"], "/assets/work/no-source/article.html");
        assert_eq!(entry["metaUrl"], "");

        // An existing article is never replaced by the placeholder
        fs::write(root.join("no-source/article.html"), "kept").unwrap();
        let summary = run(&config).unwrap();
        assert_eq!(summary.count(FolderOutcome::NoSource), 1);
        assert_eq!(fs::read_to_string(root.join("no-source/article.html")).unwrap(), "kept");
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let (_tmp, root) = work_root();
        add_file(&root, "one", "a.md", "# One");
        add_file(&root, "two", "b.md", "Zwei *Ä*");
        add_file(&root, "two", "meta.json", r#"{"excerpt": "Über"}"#);
        let config = Config::new(&root, Mode::Collection);

        let first = run(&config).unwrap();
        assert_eq!(first.converted(), 2);
        let html_before = fs::read(root.join("two/article.html")).unwrap();
        let index_before = fs::read(&config.index_path).unwrap();

        let second = run(&config).unwrap();
        assert_eq!(second.converted(), 0);
        assert_eq!(second.count(FolderOutcome::UpToDate), 2);
        assert_eq!(fs::read(root.join("two/article.html")).unwrap(), html_before);
        assert_eq!(fs::read(&config.index_path).unwrap(), index_before);
    }

    #[test]
    fn test_touched_source_is_reconverted() {
        let (_tmp, root) = work_root();
        let src = add_file(&root, "item", "a.md", "old");
        let config = Config::new(&root, Mode::Blog);
        run(&config).unwrap();

        let out = root.join("item/article.html");
        let out_mtime = FileTime::from_last_modification_time(&fs::metadata(&out).unwrap());
        fs::write(&src, "new").unwrap();
        set_file_mtime(&src, FileTime::from_unix_time(out_mtime.unix_seconds() + 10, 0)).unwrap();

        let summary = run(&config).unwrap();
        assert_eq!(summary.converted(), 1);
        assert!(fs::read_to_string(&out).unwrap().contains("<p>new</p>"));
    }

    #[test]
    fn test_force_reconverts_fresh_article() {
        let (_tmp, root) = work_root();
        add_file(&root, "item", "a.md", "text");
        let mut config = Config::new(&root, Mode::Blog);
        run(&config).unwrap();

        config.force = true;
        assert_eq!(run(&config).unwrap().converted(), 1);
    }

    #[test]
    fn test_bad_source_does_not_abort_batch() {
        let (_tmp, root) = work_root();
        add_file(&root, "a-broken", "scan.pdf", "not really a pdf");
        add_file(&root, "b-fine", "post.md", "ok");
        let config = Config::new(&root, Mode::Collection);

        let summary = run(&config).unwrap();
        assert_eq!(
            summary.outcomes,
            vec![
                ("a-broken".to_string(), FolderOutcome::Failed),
                ("b-fine".to_string(), FolderOutcome::Converted),
            ]
        );
        assert!(!root.join("a-broken/article.html").exists());

        let index = read_index(&config);
        assert_eq!(index["items"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unlistable_folder_still_gets_index_entry() {
        let (_tmp, root) = work_root();
        let config = Config::new(&root, Mode::Collection);

        let (outcome, entry) = process_folder(&config, &root.join("gone"), "gone");
        assert_eq!(outcome, FolderOutcome::Failed);
        let entry = entry.unwrap();
        assert_eq!(entry.slug, "gone");
        assert_eq!(entry.title, "gone");
        assert_eq!(entry.content_url, "/assets/work/gone/article.html");
        assert_eq!(entry.meta_url, "");
    }

    #[test]
    fn test_unlistable_folder_in_blog_mode_has_no_entry() {
        let (_tmp, root) = work_root();
        let config = Config::new(&root, Mode::Blog);

        let (outcome, entry) = process_folder(&config, &root.join("missing"), "missing");
        assert_eq!(outcome, FolderOutcome::Failed);
        assert!(entry.is_none());
    }

    #[test]
    fn test_folders_processed_in_lexical_order() {
        let (_tmp, root) = work_root();
        for slug in ["zeta", "alpha", "mid"] {
            add_file(&root, slug, "x.md", slug);
        }
        fs::write(root.join("stray.md"), "not an item").unwrap();
        let config = Config::new(&root, Mode::Collection);

        run(&config).unwrap();
        let index = read_index(&config);
        let slugs: Vec<&str> = index["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_unknown_extension_yields_empty_article() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.rtf");
        fs::write(&path, "{\\rtf1}").unwrap();

        let html = convert_file(&path, SourceKind::from_path(&path), "T", &ShellTemplate::default()).unwrap();
        assert!(html.contains("<article class=\"prose\">\n\n</article>"));
    }
}
