//! Local extraction-tool fallback.
//!
//! Wraps the yt-dlp-shaped CLI behind a bounded subprocess pool. Used when
//! the remote API is unavailable or disabled: resolving direct stream URLs,
//! probing media metadata, and performing bounded-size local downloads.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command as TokioCommand;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::core::config;
use crate::download::cookies::CookieJar;
use crate::download::error::AcquireError;

/// Format selector for direct stream resolution, capped at 720p/1280 width
const STREAM_FORMAT: &str = "best[height<=?720][width<=?1280]";

/// Format selector for bounded local downloads: best capped video plus
/// best m4a audio, merged into an mp4 container
const MERGE_FORMAT: &str = "(bestvideo[height<=?720][width<=?1280][ext=mp4])+(bestaudio[ext=m4a])";

/// Result of a metadata-only probe (`-J` dump).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInfo {
    /// Media id as reported by the tool
    pub id: String,
    /// Container extension the download would produce
    pub ext: String,
    /// Sum of the reported per-format file sizes, in bytes. Formats
    /// without a size contribute zero, so this is a lower bound.
    pub total_filesize: u64,
}

impl ProbeInfo {
    /// Total size in whole megabytes.
    pub fn total_size_mb(&self) -> u64 {
        self.total_filesize / (1024 * 1024)
    }
}

/// One downloadable format from the metadata dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfo {
    pub format: String,
    pub filesize: u64,
    pub format_id: String,
    pub ext: String,
    pub format_note: String,
    /// The link the formats were listed for
    pub source_url: String,
}

/// Bounded runner for the local extraction tool.
///
/// Subprocesses are blocking OS processes; the semaphore keeps their count
/// bounded so they never starve the async scheduler polling other
/// requests, and every invocation carries a deadline.
#[derive(Debug, Clone)]
pub struct YtDlp {
    bin: String,
    jar: CookieJar,
    permits: Arc<Semaphore>,
}

impl YtDlp {
    /// Creates a runner with the default concurrency bound.
    pub fn new(bin: impl Into<String>, jar: CookieJar) -> Self {
        Self::with_concurrency(bin, jar, config::subprocess::MAX_CONCURRENT)
    }

    /// Creates a runner with an explicit concurrency bound.
    pub fn with_concurrency(bin: impl Into<String>, jar: CookieJar, max_concurrent: usize) -> Self {
        Self {
            bin: bin.into(),
            jar,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// The credential jar backing this runner.
    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    /// Runs the tool with `args` under the pool bound and `deadline`.
    async fn run(&self, args: &[&str], deadline: Duration) -> Result<Output, AcquireError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AcquireError::Tool("subprocess pool closed".to_string()))?;

        let result = timeout(deadline, TokioCommand::new(&self.bin).args(args).output()).await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AcquireError::Tool(format!("failed to execute {}: {}", self.bin, e))),
            Err(_) => Err(AcquireError::Timeout(format!(
                "{} did not finish within {:?}",
                self.bin, deadline
            ))),
        }
    }

    /// Resolves a direct stream URL for `link` (print-URL mode).
    ///
    /// Returns the first stdout line on success. A run that produces no
    /// stdout surfaces the tool's stderr as [`AcquireError::Tool`] failure
    /// text rather than an exception.
    pub async fn resolve_stream_url(&self, link: &str) -> Result<String, AcquireError> {
        let cookie = self.jar.pick()?;
        let cookie = cookie.to_string_lossy();

        let args = [
            "--cookies",
            cookie.as_ref(),
            "-g",
            "-f",
            STREAM_FORMAT,
            "--no-warnings",
            "--no-playlist",
            link,
        ];
        let output = self.run(&args, config::subprocess::resolve_timeout()).await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if let Some(url) = stdout.lines().find(|l| !l.trim().is_empty()) {
            return Ok(url.trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(AcquireError::Tool(
            stderr
                .trim()
                .lines()
                .next_back()
                .unwrap_or("stream resolution produced no output")
                .to_string(),
        ))
    }

    /// Metadata-only probe: one `-J` invocation, no download.
    pub async fn probe(&self, link: &str) -> Result<ProbeInfo, AcquireError> {
        let cookie = self.jar.pick()?;
        let cookie = cookie.to_string_lossy();

        let args = ["--cookies", cookie.as_ref(), "-J", "--no-warnings", "--no-playlist", link];
        let output = self.run(&args, config::subprocess::probe_timeout()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquireError::Tool(
                stderr.trim().lines().next_back().unwrap_or("metadata probe failed").to_string(),
            ));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// Lists downloadable formats for `link`.
    ///
    /// DASH-only entries and entries missing any of format / filesize /
    /// format_id / ext / format_note are dropped.
    pub async fn list_formats(&self, link: &str) -> Result<Vec<FormatInfo>, AcquireError> {
        let cookie = self.jar.pick()?;
        let cookie = cookie.to_string_lossy();

        let args = ["--cookies", cookie.as_ref(), "-J", "--no-warnings", "--no-playlist", link];
        let output = self.run(&args, config::subprocess::probe_timeout()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquireError::Tool(
                stderr.trim().lines().next_back().unwrap_or("format listing failed").to_string(),
            ));
        }

        parse_formats(&String::from_utf8_lossy(&output.stdout), link)
    }

    /// Bounded local download into `downloads_dir`.
    ///
    /// Probes the reported size first and refuses with
    /// [`AcquireError::SizeExceeded`] before any download invocation when
    /// it exceeds `max_size_mb` - the guard against unbounded disk usage.
    /// If the target file already exists, the download is skipped.
    pub async fn download_bounded(
        &self,
        link: &str,
        max_size_mb: u64,
        downloads_dir: &Path,
    ) -> Result<PathBuf, AcquireError> {
        let info = self.probe(link).await?;

        let size_mb = info.total_size_mb();
        if size_mb > max_size_mb {
            log::info!(
                "refusing local download of {}: {} MB over the {} MB limit",
                link,
                size_mb,
                max_size_mb
            );
            return Err(AcquireError::SizeExceeded {
                size_mb,
                limit_mb: max_size_mb,
            });
        }

        let target = downloads_dir.join(format!("{}.{}", info.id, info.ext));
        if target.is_file() {
            log::debug!("bounded download skipped, already on disk: {}", target.display());
            return Ok(target);
        }

        tokio::fs::create_dir_all(downloads_dir).await?;
        let template = downloads_dir.join("%(id)s.%(ext)s");
        let template = template.to_string_lossy();

        let cookie = self.jar.pick()?;
        let cookie = cookie.to_string_lossy();
        let args = [
            "--cookies",
            cookie.as_ref(),
            "-f",
            MERGE_FORMAT,
            "-o",
            template.as_ref(),
            "--no-warnings",
            "--no-playlist",
            link,
        ];
        let output = self.run(&args, config::subprocess::download_timeout()).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AcquireError::Tool(
                stderr.trim().lines().next_back().unwrap_or("download failed").to_string(),
            ));
        }

        if !target.is_file() {
            return Err(AcquireError::Tool(format!(
                "download reported success but {} is missing",
                target.display()
            )));
        }

        log::info!("local asset saved: {}", target.display());
        Ok(target)
    }
}

/// Parses a `-J` metadata dump into [`ProbeInfo`].
fn parse_probe_output(stdout: &str) -> Result<ProbeInfo, AcquireError> {
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).map_err(|e| AcquireError::Tool(format!("unparseable metadata dump: {}", e)))?;

    let id = value
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AcquireError::Tool("metadata dump carries no id".to_string()))?
        .to_string();

    let ext = value.get("ext").and_then(|v| v.as_str()).unwrap_or("mp4").to_string();

    let total_filesize = value
        .get("formats")
        .and_then(|v| v.as_array())
        .map(|formats| {
            formats
                .iter()
                .filter_map(|f| f.get("filesize").and_then(|s| s.as_u64()))
                .sum()
        })
        .unwrap_or(0);

    Ok(ProbeInfo {
        id,
        ext,
        total_filesize,
    })
}

/// Parses a `-J` dump into the filtered format list.
fn parse_formats(stdout: &str, link: &str) -> Result<Vec<FormatInfo>, AcquireError> {
    let value: serde_json::Value =
        serde_json::from_str(stdout.trim()).map_err(|e| AcquireError::Tool(format!("unparseable metadata dump: {}", e)))?;

    let formats = value
        .get("formats")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut result = Vec::new();
    for f in &formats {
        let format = match f.get("format").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => continue,
        };
        if format.to_lowercase().contains("dash") {
            continue;
        }
        let (filesize, format_id, ext, format_note) = match (
            f.get("filesize").and_then(|v| v.as_u64()),
            f.get("format_id").and_then(|v| v.as_str()),
            f.get("ext").and_then(|v| v.as_str()),
            f.get("format_note").and_then(|v| v.as_str()),
        ) {
            (Some(a), Some(b), Some(c), Some(d)) => (a, b, c, d),
            _ => continue,
        };

        result.push(FormatInfo {
            format: format.to_string(),
            filesize,
            format_id: format_id.to_string(),
            ext: ext.to_string(),
            format_note: format_note.to_string(),
            source_url: link.to_string(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{
        "id": "abc123",
        "ext": "mp4",
        "formats": [
            {"format": "18 - 640x360", "filesize": 1048576, "format_id": "18", "ext": "mp4", "format_note": "360p"},
            {"format": "sb0 - storyboard DASH", "filesize": 999, "format_id": "sb0", "ext": "mhtml", "format_note": "storyboard"},
            {"format": "251 - audio only", "filesize": 2097152, "format_id": "251", "ext": "webm", "format_note": "medium"},
            {"format": "137 - 1920x1080", "format_id": "137", "ext": "mp4", "format_note": "1080p"}
        ]
    }"#;

    #[test]
    fn test_parse_probe_sums_known_filesizes() {
        let info = parse_probe_output(DUMP).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.ext, "mp4");
        // 1 MiB + storyboard 999 B + 2 MiB; the sizeless 1080p entry adds nothing
        assert_eq!(info.total_filesize, 1048576 + 999 + 2097152);
        assert_eq!(info.total_size_mb(), 3);
    }

    #[test]
    fn test_parse_probe_without_id_fails() {
        let err = parse_probe_output(r#"{"ext": "mp4"}"#).unwrap_err();
        assert!(matches!(err, AcquireError::Tool(_)));
    }

    #[test]
    fn test_parse_formats_filters_dash_and_incomplete() {
        let formats = parse_formats(DUMP, "http://watch/abc123").unwrap();
        // DASH storyboard dropped, sizeless 1080p dropped
        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].format_id, "18");
        assert_eq!(formats[1].format_id, "251");
        assert!(formats.iter().all(|f| f.source_url == "http://watch/abc123"));
    }

    #[test]
    fn test_parse_probe_rejects_garbage() {
        assert!(parse_probe_output("not json").is_err());
    }
}
