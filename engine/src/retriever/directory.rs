//! Directory-backed corpus
//!
//! Every regular file in the corpus directory is one document. Files are
//! enumerated in file-name order and re-read on every call; nothing is cached.

use super::{select_context, Context, Document, Retriever};
use sdk::errors::AdvisorError;
use std::fs;
use std::path::{Path, PathBuf};

/// Retriever that scans a directory of UTF-8 text files
#[derive(Debug, Clone)]
pub struct DirectoryRetriever {
    dir: PathBuf,
}

impl DirectoryRetriever {
    /// Open a corpus directory.
    ///
    /// # Errors
    ///
    /// Returns `AdvisorError::CorpusUnavailable` if `dir` does not exist or is
    /// not a directory. Called once at startup so a bad deployment fails fast.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, AdvisorError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(AdvisorError::CorpusUnavailable(dir));
        }
        Ok(Self { dir })
    }

    /// Paths of all documents, sorted by file name
    fn document_paths(&self) -> Result<Vec<PathBuf>, AdvisorError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            AdvisorError::CorpusRead(format!("cannot list corpus directory: {}", e))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AdvisorError::CorpusRead(format!("cannot list corpus directory: {}", e))
            })?;
            let path = entry.path();
            if path.is_file() {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Keys (file names) of all documents in enumeration order
    pub fn document_keys(&self) -> Result<Vec<String>, AdvisorError> {
        Ok(self
            .document_paths()?
            .iter()
            .map(|p| document_key(p))
            .collect())
    }

}

fn document_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_document(path: &Path) -> Result<Document, AdvisorError> {
    let key = document_key(path);
    let text = fs::read_to_string(path)
        .map_err(|e| AdvisorError::CorpusRead(format!("{}: {}", key, e)))?;
    Ok(Document { key, text })
}

impl Retriever for DirectoryRetriever {
    fn name(&self) -> &str {
        "directory"
    }

    fn select(&self, query: &str) -> Result<Context, AdvisorError> {
        let paths = self.document_paths()?;
        let context = select_context(paths.iter().map(|p| read_document(p)), query)?;

        tracing::debug!(
            corpus_size = paths.len(),
            matched = context.len(),
            "Selected context documents"
        );

        Ok(context)
    }
}
