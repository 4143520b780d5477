//! Local cache probe for previously acquired assets.
//!
//! The downloads directory is a flat, append-only store keyed by
//! `{video_id}.{extension}`. Existence on disk is the only lifecycle
//! signal; eviction is an external concern.

use std::path::{Path, PathBuf};

use crate::download::request::MediaKind;

/// Checks the downloads directory for an already-fetched asset.
///
/// Extensions are tried in the fixed priority order for `kind`; the first
/// existing file wins. Pure filesystem check: no side effects, no network.
///
/// The check is race-tolerant by design. Another task may be writing a
/// sibling file concurrently; a `None` here means "proceed to fetch", not
/// a guarantee that no file will appear.
pub fn probe(downloads_dir: &Path, video_id: &str, kind: MediaKind) -> Option<PathBuf> {
    probe_extensions(downloads_dir, video_id, kind.extensions())
}

/// Probe with an explicit extension set, first match wins.
pub fn probe_extensions(downloads_dir: &Path, video_id: &str, extensions: &[&str]) -> Option<PathBuf> {
    for ext in extensions {
        let candidate = downloads_dir.join(format!("{}.{}", video_id, ext));
        if candidate.is_file() {
            log::debug!("cache hit: {}", candidate.display());
            return Some(candidate);
        }
    }
    None
}
