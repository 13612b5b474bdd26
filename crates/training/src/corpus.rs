//! Corpus loading.
//!
//! A corpus directory is read as the concatenation of its `.txt` files,
//! visited in file-name order, separated by a blank line. Other entries are
//! skipped.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use subword_core::{Result, TokenizerError};

/// File extension of corpus documents.
pub const CORPUS_EXTENSION: &str = "txt";

/// Separator placed between documents.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Read every `.txt` file of a directory into one string.
pub fn read_corpus_dir(dir: impl AsRef<Path>) -> Result<String> {
    let paths = corpus_files(dir.as_ref())?;
    info!("reading {} corpus files from {}", paths.len(), dir.as_ref().display());
    read_corpus_files(&paths)
}

/// Read the given files, in order, into one string.
pub fn read_corpus_files<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let mut documents = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TokenizerError::io(path, e))?;
        debug!("read {} bytes from {}", text.len(), path.display());
        documents.push(text);
    }

    Ok(documents.join(DOCUMENT_SEPARATOR))
}

/// List the corpus documents of a directory, sorted by file name.
pub fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| TokenizerError::io(dir, e))?;
    let mut paths = Vec::new();

    for entry in entries {
        let path = entry.map_err(|e| TokenizerError::io(dir, e))?.path();
        let is_text = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == CORPUS_EXTENSION);

        if path.is_file() && is_text {
            paths.push(path);
        } else {
            debug!("skipping corpus entry {}", path.display());
        }
    }

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}
