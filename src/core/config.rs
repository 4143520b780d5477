use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the acquisition engine

/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Downloads folder path
/// Read from DOWNLOADS_DIR environment variable, defaults to "downloads".
/// Supports tilde (~) expansion for home directory.
pub static DOWNLOADS_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("DOWNLOADS_DIR").unwrap_or_else(|_| "downloads".to_string());
    shellexpand::tilde(&raw).to_string()
});

/// Cookies folder path
/// Read from COOKIES_DIR environment variable, defaults to "cookies".
/// The directory holds one or more Netscape cookie files; any of them may be
/// used interchangeably for extraction-tool authentication.
pub static COOKIES_DIR: Lazy<String> = Lazy::new(|| {
    let raw = env::var("COOKIES_DIR").unwrap_or_else(|_| "cookies".to_string());
    shellexpand::tilde(&raw).to_string()
});

/// Base URL of the remote audio transcoding API
/// Empty string disables the remote audio path.
pub static API_URL: Lazy<String> = Lazy::new(|| env::var("API_URL").unwrap_or_default());

/// Base URL of the remote video transcoding API
/// Empty string disables the remote video path.
pub static VIDEO_API_URL: Lazy<String> = Lazy::new(|| env::var("VIDEO_API_URL").unwrap_or_default());

/// API key appended to every remote API request (`?api={key}`)
pub static API_KEY: Lazy<String> = Lazy::new(|| env::var("API_KEY").unwrap_or_default());

/// Operator escape hatch: when set, failed remote video fetches redirect to
/// the audio acquisition path instead of falling back to local extraction.
/// Used to conserve bandwidth/API quota when remote video is disabled
/// operationally. Read from PREFER_AUDIO_FALLBACK ("1"/"true").
pub static PREFER_AUDIO_FALLBACK: Lazy<bool> = Lazy::new(|| {
    env::var("PREFER_AUDIO_FALLBACK")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
});

/// Remote API poll loop configuration
pub mod poll {
    use super::Duration;

    /// Delay between polls for audio jobs (in seconds)
    pub const AUDIO_DELAY_SECS: u64 = 4;

    /// Delay between polls for video jobs (in seconds)
    pub const VIDEO_DELAY_SECS: u64 = 8;

    /// Hard cap on poll iterations per fetch. Bounds only the
    /// "downloading" loop; terminal statuses abort before this matters.
    pub const MAX_ATTEMPTS: u32 = 10;

    /// Audio poll delay duration
    pub fn audio_delay() -> Duration {
        Duration::from_secs(AUDIO_DELAY_SECS)
    }

    /// Video poll delay duration
    pub fn video_delay() -> Duration {
        Duration::from_secs(VIDEO_DELAY_SECS)
    }
}

/// Size limits for local bounded downloads
pub mod limits {
    /// Default ceiling for a locally downloaded video (in megabytes).
    /// Larger videos are refused before any download starts.
    pub const DEFAULT_SIZE_LIMIT_MB: u64 = 250;
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Connect timeout for HTTP requests (in seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Total timeout for HTTP requests, sized for asset downloads (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 600;

    /// Connect timeout duration
    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Subprocess (extraction tool) configuration
pub mod subprocess {
    use super::Duration;

    /// Maximum number of concurrent extraction-tool processes
    pub const MAX_CONCURRENT: usize = 4;

    /// Timeout for metadata-only invocations (in seconds)
    pub const PROBE_TIMEOUT_SECS: u64 = 30;

    /// Timeout for URL-resolution invocations (in seconds)
    pub const RESOLVE_TIMEOUT_SECS: u64 = 120;

    /// Timeout for full download invocations (in seconds)
    pub const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

    /// Metadata probe timeout duration
    pub fn probe_timeout() -> Duration {
        Duration::from_secs(PROBE_TIMEOUT_SECS)
    }

    /// URL resolution timeout duration
    pub fn resolve_timeout() -> Duration {
        Duration::from_secs(RESOLVE_TIMEOUT_SECS)
    }

    /// Download timeout duration
    pub fn download_timeout() -> Duration {
        Duration::from_secs(DOWNLOAD_TIMEOUT_SECS)
    }
}

/// Rendered-image cache configuration
pub mod render {
    /// Directory for rendered now-playing images
    pub const CACHE_DIR: &str = "cache";
}
