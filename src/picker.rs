//! Reading picked files from disk.
//!
//! The CLI stands in for the browser's file picker: paths are expanded
//! (directories walked recursively, hidden entries skipped), read into
//! [`ImageFile`]s with a content type guessed from the extension, and run
//! through the same [`accepts`] filter the form applies.

use crate::config::UploadConfig;
use crate::imaging::{Rejection, accepts};
use crate::types::{ImageFile, content_type_for_extension};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PickError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("not found: {0}")]
    NotFound(PathBuf),
}

/// A file read from disk, remembering where it came from.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub path: PathBuf,
    pub file: ImageFile,
}

/// Result of [`pick`]: accepted files in path order, plus refusals.
#[derive(Debug, Default)]
pub struct Picked {
    pub accepted: Vec<PickedFile>,
    pub rejected: Vec<(String, Rejection)>,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Expand `paths` into a list of files. Directories contribute their files
/// sorted by path; explicit file arguments keep their given order.
pub fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, PickError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            let walker = WalkDir::new(path)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
            for entry in walker {
                let entry = entry.map_err(|source| PickError::Walk {
                    path: path.clone(),
                    source,
                })?;
                if entry.file_type().is_file() {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        } else {
            return Err(PickError::NotFound(path.clone()));
        }
    }
    Ok(files)
}

/// Read one file into memory.
pub fn read_file(path: &Path) -> Result<ImageFile, PickError> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = path
        .extension()
        .and_then(|e| e.to_str())
        .map(content_type_for_extension)
        .unwrap_or("application/octet-stream");
    let last_modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(ImageFile {
        name,
        content_type: content_type.to_string(),
        bytes,
        last_modified,
    })
}

/// Expand, read and filter `paths`.
pub fn pick(paths: &[PathBuf], upload: &UploadConfig) -> Result<Picked, PickError> {
    let mut picked = Picked::default();
    for path in expand_paths(paths)? {
        let file = read_file(&path)?;
        match accepts(&file, upload) {
            Ok(()) => picked.accepted.push(PickedFile { path, file }),
            Err(rejection) => {
                log::warn!("skipping {}: {:?}", path.display(), rejection);
                picked.rejected.push((file.name, rejection));
            }
        }
    }
    Ok(picked)
}
