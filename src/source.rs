use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Recognized source formats, declared in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceKind {
    Docx,
    Pdf,
    Odt,
    Markdown,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(Self::Docx),
            "pdf" => Some(Self::Pdf),
            "odt" => Some(Self::Odt),
            "md" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Lower is preferred
    pub fn priority(self) -> usize {
        match self {
            Self::Docx => 0,
            Self::Pdf => 1,
            Self::Odt => 2,
            Self::Markdown => 3,
        }
    }
}

/// The authoritative source document of an item folder
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
    pub modified: SystemTime,
}

impl SourceFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Pick the best source document among the direct children of `dir`.
///
/// Ranking: format priority (DOCX > PDF > ODT > MD), then newest
/// modification time, then file name so equal timestamps stay deterministic.
pub fn pick_source(dir: &Path) -> io::Result<Option<SourceFile>> {
    let mut candidates = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let Some(kind) = SourceKind::from_path(&path) else {
            continue;
        };

        candidates.push(SourceFile {
            modified: metadata.modified()?,
            path,
            kind,
        });
    }

    candidates.sort_by(|a, b| {
        a.kind
            .priority()
            .cmp(&b.kind.priority())
            .then_with(|| b.modified.cmp(&a.modified))
            .then_with(|| a.path.cmp(&b.path))
    });

    Ok(candidates.into_iter().next())
}
