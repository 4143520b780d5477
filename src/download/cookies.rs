//! Cookie credential management for the extraction tool.
//!
//! The `cookies/` directory holds one or more Netscape-format credential
//! files exported from authenticated browser sessions. Any of them works;
//! selection is random per invocation to spread load across accounts.

use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};

use crate::download::error::AcquireError;

/// A directory of interchangeable cookie credential files.
#[derive(Debug, Clone)]
pub struct CookieJar {
    dir: PathBuf,
}

impl CookieJar {
    /// Creates a jar over `dir`. The directory may not exist yet; every
    /// lookup re-reads it so freshly dropped credentials are picked up
    /// without a restart.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Lists available credential files (`*.txt`).
    pub fn list(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().map(|ext| ext == "txt").unwrap_or(false))
            .collect();
        files.sort();
        files
    }

    /// Picks one credential at random.
    ///
    /// Random choice is a load-distribution heuristic, not a correctness
    /// requirement - any valid credential works. An empty jar is
    /// [`AcquireError::MissingCredential`], distinct from an asset that was
    /// merely not found.
    pub fn pick(&self) -> Result<PathBuf, AcquireError> {
        let files = self.list();
        files
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(AcquireError::MissingCredential)
    }

    /// Number of available credential files.
    pub fn available(&self) -> usize {
        self.list().len()
    }

    /// The jar's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Validates Netscape HTTP Cookie File format.
///
/// The format starts with "# Netscape HTTP Cookie File" or "# HTTP Cookie
/// File" and carries tab-separated lines:
/// domain\tflag\tpath\tsecure\texpiration\tname\tvalue
pub fn looks_like_netscape(contents: &str) -> bool {
    let has_header = contents.lines().any(|line| {
        line.trim().starts_with("# Netscape HTTP Cookie File") || line.trim().starts_with("# HTTP Cookie File")
    });

    let has_cookies = contents.lines().any(|line| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#') && trimmed.split('\t').count() >= 7
    });

    has_header && has_cookies
}
