use std::path::{Path, PathBuf};

/// Local directory of downloaded artifacts, keyed by file name.
///
/// A same-named file is the only cache-hit signal; content is never compared.
/// Files are written once (via a `.part` rename) and never rewritten.
#[derive(Debug, Clone)]
pub struct LogCache {
    dir: PathBuf,
}

impl LogCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.path_for(file_name).is_file()
    }
}
