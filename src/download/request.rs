//! Request and outcome types for the acquisition engine.

use std::path::{Path, PathBuf};

use crate::core::config;

/// What kind of asset the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Recognized cache extensions for this kind, in priority order.
    /// The first existing `downloads/{id}.{ext}` wins.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Audio => &["mp3", "m4a", "webm"],
            MediaKind::Video => &["mp4", "webm", "mkv"],
        }
    }
}

/// A single acquisition request. Immutable, constructed per call.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    /// Platform video id (flat key into the downloads directory)
    pub video_id: String,
    /// Audio or video asset
    pub kind: MediaKind,
    /// Whether a direct stream URL is an acceptable outcome. When false,
    /// the stream-resolution step is skipped and only file outcomes are
    /// produced.
    pub want_direct_stream: bool,
    /// Ceiling for locally downloaded files, in megabytes
    pub size_limit_mb: u64,
}

impl AcquisitionRequest {
    /// Creates an audio request with default limits.
    pub fn audio(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            kind: MediaKind::Audio,
            want_direct_stream: false,
            size_limit_mb: config::limits::DEFAULT_SIZE_LIMIT_MB,
        }
    }

    /// Creates a video request with default limits. Video playback flows
    /// accept direct streams by default.
    pub fn video(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            kind: MediaKind::Video,
            want_direct_stream: true,
            size_limit_mb: config::limits::DEFAULT_SIZE_LIMIT_MB,
        }
    }

    /// Overrides the size limit.
    #[must_use]
    pub fn with_size_limit_mb(mut self, limit_mb: u64) -> Self {
        self.size_limit_mb = limit_mb;
        self
    }

    /// Overrides direct-stream acceptance.
    #[must_use]
    pub fn with_direct_stream(mut self, want: bool) -> Self {
        self.want_direct_stream = want;
        self
    }
}

/// How an acquired asset is delivered to the caller.
///
/// Replaces the ambiguous `(value, bool)` convention: a local file is a
/// path under the downloads directory, a direct stream is a URL servable
/// without a local copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Path to a file in the downloads directory
    LocalFile(PathBuf),
    /// URL pointing at media bytes
    DirectStream(String),
}

/// Terminal result of an acquisition. No retries happen above this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionOutcome {
    delivery: Option<Delivery>,
}

impl AcquisitionOutcome {
    /// A successful local-file outcome.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            delivery: Some(Delivery::LocalFile(path.into())),
        }
    }

    /// A successful direct-stream outcome.
    pub fn stream(url: impl Into<String>) -> Self {
        Self {
            delivery: Some(Delivery::DirectStream(url.into())),
        }
    }

    /// Terminal failure: no path, no stream.
    pub fn failed() -> Self {
        Self { delivery: None }
    }

    /// Whether the acquisition produced anything.
    pub fn succeeded(&self) -> bool {
        self.delivery.is_some()
    }

    /// The delivered asset, if any.
    pub fn delivery(&self) -> Option<&Delivery> {
        self.delivery.as_ref()
    }

    /// Local file path, if the outcome is a file.
    pub fn path(&self) -> Option<&Path> {
        match &self.delivery {
            Some(Delivery::LocalFile(p)) => Some(p.as_path()),
            _ => None,
        }
    }

    /// Stream URL, if the outcome is a direct stream.
    pub fn stream_url(&self) -> Option<&str> {
        match &self.delivery {
            Some(Delivery::DirectStream(u)) => Some(u.as_str()),
            _ => None,
        }
    }

    /// Whether the outcome is a direct stream rather than a local file.
    pub fn is_direct_stream(&self) -> bool {
        matches!(self.delivery, Some(Delivery::DirectStream(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_priority_order() {
        assert_eq!(MediaKind::Audio.extensions(), &["mp3", "m4a", "webm"]);
        assert_eq!(MediaKind::Video.extensions(), &["mp4", "webm", "mkv"]);
    }

    #[test]
    fn test_request_constructors() {
        let req = AcquisitionRequest::audio("abc123");
        assert_eq!(req.kind, MediaKind::Audio);
        assert!(!req.want_direct_stream);

        let req = AcquisitionRequest::video("abc123").with_size_limit_mb(50);
        assert_eq!(req.kind, MediaKind::Video);
        assert!(req.want_direct_stream);
        assert_eq!(req.size_limit_mb, 50);
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = AcquisitionOutcome::local("downloads/x.mp3");
        assert!(ok.succeeded());
        assert!(!ok.is_direct_stream());
        assert_eq!(ok.path().unwrap(), Path::new("downloads/x.mp3"));
        assert!(ok.stream_url().is_none());

        let stream = AcquisitionOutcome::stream("http://cdn/x");
        assert!(stream.succeeded());
        assert!(stream.is_direct_stream());
        assert_eq!(stream.stream_url().unwrap(), "http://cdn/x");
        assert!(stream.path().is_none());

        let failed = AcquisitionOutcome::failed();
        assert!(!failed.succeeded());
        assert!(failed.path().is_none());
        assert!(failed.stream_url().is_none());
    }
}
