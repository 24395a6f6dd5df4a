//! Discovery of question sources in a database directory.

use std::path::{Path, PathBuf};

use crate::error::QuizError;

/// A question source file offered on the source-selection screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// File stem, used as the display name.
    pub name: String,
    pub path: PathBuf,
}

/// List the `.json` files directly inside `dir`, sorted by name.
///
/// A missing directory yields an empty list.
pub fn list_sources(dir: &Path) -> Result<Vec<SourceEntry>, QuizError> {
    if !dir.is_dir() {
        tracing::debug!("database directory {} not found", dir.display());
        return Ok(Vec::new());
    }

    let io_err = |source| QuizError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        sources.push(SourceEntry {
            name: stem.to_string_lossy().into_owned(),
            path,
        });
    }

    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}
