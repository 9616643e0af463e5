//! Catalog of dump files
//!
//! Builds a profile for every dump under a directory so a single profile
//! (usually a freshly scanned card) can be matched against the whole
//! collection.
//!
//! # Example
//!
//! ```rust,no_run
//! use nfc_compare::catalog::CatalogIndex;
//! use nfc_compare::core::builder::{build_from_scan, ProfileBuilder};
//! use nfc_compare::core::config::Config;
//! use nfc_compare::reader::ScanResult;
//! use std::path::Path;
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let shutdown = Arc::new(AtomicBool::new(false));
//! let index = CatalogIndex::build(
//!     Path::new("./dumps"),
//!     &config.catalog,
//!     &config.loader,
//!     &ProfileBuilder::new(),
//!     shutdown,
//!     |p| println!("{}/{}", p.current, p.total),
//! )
//! .unwrap();
//!
//! let card = build_from_scan(&ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]));
//! for entry in index.find_matches(&card) {
//!     println!("{}", entry.path.display());
//! }
//! ```

use crate::core::builder::ProfileBuilder;
use crate::core::config::{CatalogConfig, LoaderConfig};
use crate::core::error::{NfcError, Result};
use crate::core::loader::load_profile;
use crate::core::profile::Profile;
use log::{info, trace, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// Progress information for catalog building
#[derive(Debug, Clone)]
pub struct CatalogProgress {
    /// Files processed so far
    pub current: usize,
    /// Total files to process
    pub total: usize,
    pub current_file: Option<PathBuf>,
    /// Files that failed to load
    pub errors: usize,
}

/// One dump and the profile built from it
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub path: PathBuf,
    pub profile: Profile,
}

/// Catalog statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogStats {
    /// Profiles built
    pub total_files: usize,
    /// Profiles with a recovered UID
    pub with_uid: usize,
    /// Profiles with an NDEF digest
    pub with_ndef: usize,
    /// Profiles with nothing recorded
    pub blank: usize,
    /// Files that failed to load
    pub errors: usize,
    /// Entries per extractor name
    pub by_extractor: HashMap<String, usize>,
    pub build_time_ms: u64,
}

/// Profiles built from a directory of dumps
#[derive(Debug, Default)]
pub struct CatalogIndex {
    root: PathBuf,
    entries: Vec<CatalogEntry>,
    stats: CatalogStats,
}

impl CatalogIndex {
    /// Walk `dir` and build a profile for every matching file
    ///
    /// Files that fail to load are counted in [`CatalogStats::errors`] and
    /// skipped. If `shutdown_flag` is raised before the walk finishes the
    /// build stops and returns [`NfcError::Interrupted`].
    pub fn build<F>(
        dir: &Path,
        config: &CatalogConfig,
        loader: &LoaderConfig,
        builder: &ProfileBuilder,
        shutdown_flag: Arc<AtomicBool>,
        progress_callback: F,
    ) -> Result<Self>
    where
        F: Fn(CatalogProgress) + Send + Sync,
    {
        let start_time = Instant::now();
        let mut index = Self {
            root: dir.to_path_buf(),
            ..Default::default()
        };

        let files = collect_files(dir, config)?;
        let total = files.len();

        if total == 0 {
            info!("No dump files found in {}", dir.display());
            return Ok(index);
        }

        info!("Found {} dump file(s) in {}", total, dir.display());

        let processed = AtomicUsize::new(0);
        let errors = AtomicUsize::new(0);

        let built: Vec<Option<CatalogEntry>> = files
            .par_iter()
            .map(|path| {
                if shutdown_flag.load(Ordering::Relaxed) {
                    return None;
                }

                let current = processed.fetch_add(1, Ordering::Relaxed) + 1;
                progress_callback(CatalogProgress {
                    current,
                    total,
                    current_file: Some(path.clone()),
                    errors: errors.load(Ordering::Relaxed),
                });

                match load_profile(path, loader, builder) {
                    Ok(profile) => {
                        trace!("Catalogued {}", path.display());
                        Some(CatalogEntry {
                            path: path.clone(),
                            profile,
                        })
                    }
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        errors.fetch_add(1, Ordering::Relaxed);
                        None
                    }
                }
            })
            .collect();

        if shutdown_flag.load(Ordering::SeqCst) {
            info!("Catalog build interrupted");
            return Err(NfcError::Interrupted(format!(
                "catalog build of {} stopped after {} of {} file(s)",
                dir.display(),
                processed.load(Ordering::Relaxed),
                total
            )));
        }

        index.entries = built.into_iter().flatten().collect();
        index.entries.sort_by(|a, b| a.path.cmp(&b.path));
        index.stats.errors = errors.load(Ordering::Relaxed);
        index.stats.build_time_ms = start_time.elapsed().as_millis() as u64;
        index.compute_stats();

        info!(
            "Catalog built: {} profiles ({} with UID, {} with NDEF), {} errors in {}ms",
            index.stats.total_files,
            index.stats.with_uid,
            index.stats.with_ndef,
            index.stats.errors,
            index.stats.build_time_ms
        );

        Ok(index)
    }

    fn compute_stats(&mut self) {
        let stats = &mut self.stats;
        stats.total_files = self.entries.len();
        stats.with_uid = self
            .entries
            .iter()
            .filter(|e| e.profile.uid_len() > 0)
            .count();
        stats.with_ndef = self
            .entries
            .iter()
            .filter(|e| e.profile.ndef_present())
            .count();
        stats.blank = self.entries.iter().filter(|e| e.profile.is_blank()).count();
        stats.by_extractor.clear();
        for entry in &self.entries {
            *stats
                .by_extractor
                .entry(entry.profile.source().to_string())
                .or_insert(0) += 1;
        }
    }

    /// Entries whose profile compares Equal to `profile`
    ///
    /// Blank entries compare Equal to any other blank profile, so a blank
    /// probe matches every blank dump.
    pub fn find_matches(&self, profile: &Profile) -> Vec<&CatalogEntry> {
        self.entries
            .par_iter()
            .filter(|e| e.profile.compare(profile).is_equal())
            .collect()
    }

    /// Directory the catalog was built from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collect the files under `dir` that the catalog should load
fn collect_files(dir: &Path, config: &CatalogConfig) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(NfcError::LoadFailed(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .follow_links(config.follow_symlinks)
        .max_depth(max_depth);

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Error walking {}: {}", dir.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && extension_allowed(entry.path(), &config.extensions) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// An empty extension list accepts every file
fn extension_allowed(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::build_from_scan;
    use crate::reader::ScanResult;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn catalog_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("office.nfc"), b"UID: 04 A1 B2 C3\n").unwrap();
        fs::write(dir.path().join("gym.nfc"), b"UID: 04 11 22 33\n").unwrap();
        fs::write(dir.path().join("tag.bin"), [0xD1, 0x01, 0x00]).unwrap();
        fs::write(dir.path().join("empty.nfc"), b"").unwrap();
        fs::write(dir.path().join("notes.md"), b"UID: 04 A1 B2 C3").unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("old").join("office_copy.nfc"), b"UID: 04A1B2C3").unwrap();
        dir
    }

    fn build(dir: &Path, config: &CatalogConfig) -> CatalogIndex {
        CatalogIndex::build(
            dir,
            config,
            &LoaderConfig::default(),
            &ProfileBuilder::new(),
            Arc::new(AtomicBool::new(false)),
            |_| {},
        )
        .unwrap()
    }

    #[test]
    fn test_build_and_stats() {
        let dir = catalog_dir();
        let index = build(dir.path(), &CatalogConfig::default());

        assert_eq!(index.len(), 4);
        assert_eq!(index.stats().errors, 1);
        assert_eq!(index.stats().with_uid, 3);
        assert_eq!(index.stats().with_ndef, 1);
        assert_eq!(index.stats().by_extractor.get("file (uid-text)"), Some(&3));
        assert_eq!(index.root(), dir.path());
    }

    #[test]
    fn test_non_recursive() {
        let dir = catalog_dir();
        let config = CatalogConfig {
            recursive: false,
            ..Default::default()
        };
        let index = build(dir.path(), &config);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_empty_extension_list_accepts_all() {
        let dir = catalog_dir();
        let config = CatalogConfig {
            extensions: Vec::new(),
            ..Default::default()
        };
        let index = build(dir.path(), &config);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_find_matches() {
        let dir = catalog_dir();
        let index = build(dir.path(), &CatalogConfig::default());

        let card = build_from_scan(&ScanResult::with_uid(&[0x04, 0xA1, 0xB2, 0xC3]));
        let mut names: Vec<_> = index
            .find_matches(&card)
            .iter()
            .map(|e| e.path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["office.nfc", "office_copy.nfc"]);

        let stranger = build_from_scan(&ScanResult::with_uid(&[0x99]));
        assert!(index.find_matches(&stranger).is_empty());
    }

    #[test]
    fn test_progress_reported() {
        let dir = catalog_dir();
        let seen = Mutex::new(Vec::new());
        CatalogIndex::build(
            dir.path(),
            &CatalogConfig::default(),
            &LoaderConfig::default(),
            &ProfileBuilder::new(),
            Arc::new(AtomicBool::new(false)),
            |p| seen.lock().unwrap().push((p.current, p.total)),
        )
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|&(_, total)| total == 5));
    }

    #[test]
    fn test_shutdown_is_interrupted() {
        let dir = catalog_dir();
        let err = CatalogIndex::build(
            dir.path(),
            &CatalogConfig::default(),
            &LoaderConfig::default(),
            &ProfileBuilder::new(),
            Arc::new(AtomicBool::new(true)),
            |_| {},
        )
        .unwrap_err();
        assert_eq!(err.kind(), "Interrupted");
        assert!(err.to_string().contains("0 of 5"));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = CatalogIndex::build(
            &dir.path().join("absent"),
            &CatalogConfig::default(),
            &LoaderConfig::default(),
            &ProfileBuilder::new(),
            Arc::new(AtomicBool::new(false)),
            |_| {},
        )
        .unwrap_err();
        assert_eq!(err.kind(), "LoadFailed");
    }
}
