use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::TopicEntry;

/// Topic entries read from a corpus directory, plus the files that were skipped.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub entries: Vec<TopicEntry>,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
pub struct CorpusLoader;

impl CorpusLoader {
    pub fn new() -> Self { Self }

    /// Loads every `*.json` file under `dir`. Each file holds an array of topic entries.
    ///
    /// A file that cannot be read, parsed or validated is skipped with a warning;
    /// the remaining files still load.
    pub fn load_dir(&self, dir: &Path) -> Result<Corpus> {
        if !dir.is_dir() {
            return Err(Error::Corpus(format!("corpus directory {} does not exist", dir.display())));
        }
        let files = self.list_json_files(dir);
        let mut corpus = Corpus::default();
        for path in files {
            match self.load_file(&path) {
                Ok(entries) => {
                    info!(file = %path.display(), topics = entries.len(), "loaded corpus file");
                    corpus.entries.extend(entries);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping malformed corpus file");
                    corpus.skipped.push(SkippedFile { path, reason: e.to_string() });
                }
            }
        }
        if corpus.entries.is_empty() {
            warn!(dir = %dir.display(), "no topics found in corpus directory");
        }
        Ok(corpus)
    }

    pub fn load_file(&self, path: &Path) -> Result<Vec<TopicEntry>> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Corpus(format!("cannot read {}: {}", path.display(), e)))?;
        let entries: Vec<TopicEntry> = serde_json::from_str(&raw)
            .map_err(|e| Error::Corpus(format!("cannot parse {}: {}", path.display(), e)))?;
        for entry in &entries {
            entry.validate()?;
        }
        Ok(entries)
    }

    fn list_json_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        files.sort();
        files
    }
}
