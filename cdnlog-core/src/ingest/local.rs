use crate::ingest::error::SourceError;
use crate::ingest::lines::{LineStream, Lines, decoded};
use glob::glob;
use std::fs::File;
use std::iter;
use std::path::{Path, PathBuf};

/// Discovers files matching a glob pattern relative to `root`, in sorted order.
///
/// Unreadable entries are silently filtered out.
pub fn discover(root: &Path, glob_pattern: &str) -> Result<Vec<PathBuf>, SourceError> {
    let pattern = resolve_glob(root, glob_pattern);
    let mut paths: Vec<_> = glob(&pattern)
        .map_err(|e| SourceError::Glob {
            pattern: pattern.clone(),
            source: e,
        })?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();

    paths.sort();
    Ok(paths)
}

/// Joins `pattern` to `root`. Special characters in `root` are escaped so only
/// the pattern part is interpreted as a glob.
pub fn resolve_glob(root: &Path, pattern: &str) -> String {
    let root = glob::Pattern::escape(&root.to_string_lossy());
    Path::new(&root).join(pattern).to_string_lossy().into_owned()
}

/// Lines from every file in `dir` matching `pattern`, one file fully before the next.
///
/// A missing directory or an empty match set yields an empty stream with a warning.
pub fn local_lines(dir: &Path, pattern: &str, compressed_suffix: &str) -> LineStream {
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "log directory does not exist");
        return Box::new(iter::empty());
    }

    let files = match discover(dir, pattern) {
        Ok(files) => files,
        Err(e) => {
            tracing::error!(error = %e, "cannot list log files");
            return Box::new(iter::empty());
        }
    };

    if files.is_empty() {
        tracing::warn!(path = %dir.display(), pattern, "no log files matched");
        return Box::new(iter::empty());
    }

    tracing::info!(count = files.len(), "found log files to process");

    let suffix = compressed_suffix.to_string();
    Box::new(files.into_iter().flat_map(move |path| {
        tracing::info!(file = %path.display(), "reading log file");
        file_lines(&path, &suffix)
    }))
}

/// Lines of a single file, gunzipped when its name ends with `compressed_suffix`.
///
/// An unopenable file is logged and yields nothing.
pub fn file_lines(path: &Path, compressed_suffix: &str) -> LineStream {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "cannot open log file");
            return Box::new(iter::empty());
        }
    };

    let compressed = is_compressed(path, compressed_suffix);
    Box::new(Lines::new(
        decoded(file, compressed),
        path.display().to_string(),
    ))
}

pub(crate) fn is_compressed(path: &Path, compressed_suffix: &str) -> bool {
    !compressed_suffix.is_empty()
        && path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(compressed_suffix))
}
