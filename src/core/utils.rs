//! URL and video-id helpers shared across the acquisition engine.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical watch URL prefix
pub const WATCH_BASE: &str = "https://www.youtube.com/watch?v=";

/// Canonical playlist URL prefix
pub const PLAYLIST_BASE: &str = "https://youtube.com/playlist?list=";

/// Matches links that belong to the source platform
static PLATFORM_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:youtube\.com|youtu\.be)").expect("static regex must compile"));

/// Returns `true` if the link points at the source platform.
pub fn is_platform_url(link: &str) -> bool {
    PLATFORM_URL_RE.is_match(link)
}

/// Builds a canonical watch URL from a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_BASE, video_id)
}

/// Builds a canonical playlist URL from a list id.
pub fn playlist_url(list_id: &str) -> String {
    format!("{}{}", PLAYLIST_BASE, list_id)
}

/// Extracts a video id from a watch link, a short link, or a raw id.
///
/// Tracking parameters after `&` are dropped. A string that is not a
/// recognizable link is returned as-is and treated as a raw id.
pub fn video_id_from_link(link: &str) -> String {
    let link = link.trim();

    if let Some(idx) = link.find("v=") {
        let tail = &link[idx + 2..];
        return tail.split('&').next().unwrap_or(tail).to_string();
    }

    if let Some(idx) = link.find("youtu.be/") {
        let tail = &link[idx + "youtu.be/".len()..];
        return tail
            .split(|c| c == '?' || c == '&' || c == '/')
            .next()
            .unwrap_or(tail)
            .to_string();
    }

    link.to_string()
}
