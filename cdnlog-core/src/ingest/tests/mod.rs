use crate::cloud::RemoteLogArtifact;
use crate::conf::types::{InputConfig, SourceType};
use crate::ingest::lines::LineStream;
use crate::ingest::local::{discover, local_lines};
use crate::ingest::{ArtifactSource, CachePolicy, LogCache, ingest, pending_artifacts, remote_lines};
use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;
use tempfile::tempdir;

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn input(path: &Path, source_type: SourceType) -> InputConfig {
    InputConfig {
        source_type,
        path: path.to_path_buf(),
        file_pattern: "*".to_string(),
        compressed_suffix: ".gz".to_string(),
        api: None,
    }
}

//-----------------------------------------------------------------------------
// Local source
//-----------------------------------------------------------------------------

#[test]
fn reads_plain_and_gzip_files_in_sorted_order() {
    // Arrange
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.log.gz"), gzip("b1\nb2\n")).unwrap();
    fs::write(dir.path().join("a.log"), "a1\r\na2\n").unwrap();
    fs::write(dir.path().join("c.txt"), "ignored\n").unwrap();

    // Act
    let lines: Vec<String> = local_lines(dir.path(), "*.log*", ".gz").collect();

    // Assert
    assert_eq!(lines, vec!["a1", "a2", "b1", "b2"]);
}

#[test]
fn reads_concatenated_gzip_members() {
    let dir = tempdir().unwrap();
    let mut bytes = gzip("first\n");
    bytes.extend(gzip("second\n"));
    fs::write(dir.path().join("multi.gz"), bytes).unwrap();

    let lines: Vec<String> = local_lines(dir.path(), "*.gz", ".gz").collect();

    assert_eq!(lines, vec!["first", "second"]);
}

#[test]
fn missing_directory_yields_nothing() {
    let dir = tempdir().unwrap();

    let lines: Vec<String> = local_lines(&dir.path().join("absent"), "*.log", ".gz").collect();

    assert!(lines.is_empty());
}

#[test]
fn empty_directory_yields_nothing() {
    let dir = tempdir().unwrap();

    let lines: Vec<String> = ingest(&input(dir.path(), SourceType::Local)).collect();

    assert!(lines.is_empty());
}

#[test]
fn corrupt_gzip_is_skipped_and_next_file_still_read() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.gz"), b"definitely not gzip").unwrap();
    fs::write(dir.path().join("b.log"), "ok\n").unwrap();

    let lines: Vec<String> = local_lines(dir.path(), "*", ".gz").collect();

    assert_eq!(lines, vec!["ok"]);
}

#[test]
fn invalid_utf8_is_replaced_not_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.log"), b"ok\xff\xfe\nnext\n").unwrap();

    let lines: Vec<String> = local_lines(dir.path(), "*.log", ".gz").collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ok"));
    assert_eq!(lines[1], "next");
}

#[test]
fn last_line_without_newline_is_kept() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "one\ntwo").unwrap();

    let lines: Vec<String> = local_lines(dir.path(), "*.log", ".gz").collect();

    assert_eq!(lines, vec!["one", "two"]);
}

#[test]
fn discover_skips_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("nested.log")).unwrap();
    fs::write(dir.path().join("a.log"), "").unwrap();

    let files = discover(dir.path(), "*.log").unwrap();

    assert_eq!(files, vec![dir.path().join("a.log")]);
}

//-----------------------------------------------------------------------------
// Coordinator
//-----------------------------------------------------------------------------

#[test]
fn unsupported_source_type_yields_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "line\n").unwrap();

    let cfg = input(dir.path(), SourceType::Unsupported("s3".to_string()));

    assert_eq!(ingest(&cfg).count(), 0);
}

#[test]
fn api_mode_without_api_block_yields_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "line\n").unwrap();

    let cfg = input(dir.path(), SourceType::Api);

    assert_eq!(ingest(&cfg).count(), 0);
}

//-----------------------------------------------------------------------------
// Remote source with cache
//-----------------------------------------------------------------------------

/// Serves `<name>\n` as the single line of every artifact and records downloads.
#[derive(Clone)]
struct FakeSource {
    names: Vec<&'static str>,
    downloads: Rc<RefCell<Vec<String>>>,
}

impl FakeSource {
    fn new(names: &[&'static str]) -> Self {
        Self {
            names: names.to_vec(),
            downloads: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl ArtifactSource for FakeSource {
    fn list_artifacts(&self) -> Vec<RemoteLogArtifact> {
        self.names
            .iter()
            .map(|n| RemoteLogArtifact::from_link(&format!("https://cdn.test/logs/{n}?sig=1")).unwrap())
            .collect()
    }

    fn fetch_lines(
        &self,
        artifact: &RemoteLogArtifact,
        cache_path: Option<&Path>,
        _compressed_suffix: &str,
    ) -> LineStream {
        self.downloads.borrow_mut().push(artifact.file_name.clone());
        let body = format!("{}\n", artifact.file_name);
        if let Some(path) = cache_path {
            fs::write(path, &body).unwrap();
        }
        Box::new(std::iter::once(artifact.file_name.clone()))
    }
}

const DEDUP: CachePolicy = CachePolicy {
    skip_existing: true,
    write_through: true,
};

#[test]
fn rerun_with_unchanged_listing_downloads_nothing() {
    // Arrange
    let dir = tempdir().unwrap();
    let source = FakeSource::new(&["a.log", "b.log"]);

    // Act
    let first: Vec<String> =
        remote_lines(source.clone(), LogCache::new(dir.path()), DEDUP, ".gz").collect();
    let downloads_after_first = source.downloads.borrow().len();
    let second: Vec<String> =
        remote_lines(source.clone(), LogCache::new(dir.path()), DEDUP, ".gz").collect();

    // Assert
    assert_eq!(first, vec!["a.log", "b.log"]);
    assert_eq!(downloads_after_first, 2);
    assert!(second.is_empty());
    assert_eq!(source.downloads.borrow().len(), 2);
}

#[test]
fn only_uncached_artifacts_are_fetched() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "cached\n").unwrap();
    let source = FakeSource::new(&["a.log", "b.log"]);

    let lines: Vec<String> =
        remote_lines(source.clone(), LogCache::new(dir.path()), DEDUP, ".gz").collect();

    assert_eq!(lines, vec!["b.log"]);
    assert_eq!(*source.downloads.borrow(), vec!["b.log".to_string()]);
}

#[test]
fn duplicate_listing_entry_replays_from_cache() {
    let dir = tempdir().unwrap();
    let source = FakeSource::new(&["a.log", "a.log"]);

    let lines: Vec<String> =
        remote_lines(source.clone(), LogCache::new(dir.path()), DEDUP, ".gz").collect();

    assert_eq!(lines, vec!["a.log", "a.log"]);
    assert_eq!(source.downloads.borrow().len(), 1);
}

#[test]
fn without_dedup_everything_is_fetched_again() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.log"), "cached\n").unwrap();
    let source = FakeSource::new(&["a.log"]);
    let policy = CachePolicy {
        skip_existing: false,
        write_through: false,
    };

    let lines: Vec<String> =
        remote_lines(source.clone(), LogCache::new(dir.path()), policy, ".gz").collect();

    assert_eq!(lines, vec!["a.log"]);
    assert_eq!(source.downloads.borrow().len(), 1);
    assert_eq!(fs::read_to_string(dir.path().join("a.log")).unwrap(), "cached\n");
}

#[test]
fn refetch_never_overwrites_cached_artifact() {
    // Arrange
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.log"), "ORIGINAL\n").unwrap();
    let source = FakeSource::new(&["a.log", "b.log"]);
    let policy = CachePolicy {
        skip_existing: false,
        write_through: true,
    };

    // Act
    let lines: Vec<String> =
        remote_lines(source.clone(), LogCache::new(dir.path()), policy, ".gz").collect();

    // Assert
    assert_eq!(lines, vec!["a.log", "b.log"]);
    assert_eq!(source.downloads.borrow().len(), 2);
    assert_eq!(fs::read_to_string(dir.path().join("b.log")).unwrap(), "ORIGINAL\n");
    assert_eq!(fs::read_to_string(dir.path().join("a.log")).unwrap(), "a.log\n");
}

#[test]
fn streaming_without_write_through_leaves_cache_empty() {
    let dir = tempdir().unwrap();
    let source = FakeSource::new(&["a.log"]);
    let policy = CachePolicy {
        skip_existing: true,
        write_through: false,
    };

    let lines: Vec<String> =
        remote_lines(source, LogCache::new(dir.path()), policy, ".gz").collect();

    assert_eq!(lines, vec!["a.log"]);
    assert!(!dir.path().join("a.log").exists());
}

#[test]
fn pending_artifacts_subtracts_cached_names() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.log"), "").unwrap();
    let listed = FakeSource::new(&["a.log", "b.log", "c.log"]).list_artifacts();

    let pending = pending_artifacts(listed, &LogCache::new(dir.path()), DEDUP);

    let names: Vec<_> = pending.iter().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["a.log", "c.log"]);
}
