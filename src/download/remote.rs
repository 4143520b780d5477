//! Client for the remote transcoding/caching API.
//!
//! The remote side is a job-style service: a GET for a video id returns a
//! status token, not the asset, until processing completes. The client
//! polls the same endpoint with a bounded loop, then streams the finished
//! asset into the downloads directory.

use std::path::PathBuf;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::core::config;
use crate::download::error::AcquireError;

/// Transient per-request job state reported by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, processing not started
    Pending,
    /// Asset is being produced; keep polling
    Downloading,
    /// Asset ready; payload carries `link` and `format`
    Done,
    /// Any unrecognized status. The service encodes permanent failure
    /// in-band, so this aborts the fetch instead of retrying.
    Failed,
}

impl JobStatus {
    /// Parses the wire `status` string.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "done" => JobStatus::Done,
            "downloading" => JobStatus::Downloading,
            "pending" | "queued" => JobStatus::Pending,
            _ => JobStatus::Failed,
        }
    }

    /// Whether the job is still processing and worth another poll.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Downloading)
    }
}

/// Status payload returned by `GET {base}/{video_id}?api={key}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl JobResponse {
    /// Parsed job status.
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(&self.status)
    }
}

/// HTTP client for the remote acquisition API.
///
/// Holds a shared `reqwest::Client` (one connection pool across all
/// concurrent requests) injected at construction.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    api_key: String,
    downloads_dir: PathBuf,
}

impl RemoteClient {
    /// Creates a client writing into `downloads_dir`.
    pub fn new(http: reqwest::Client, api_key: impl Into<String>, downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Fetches the asset for `video_id` via the job API at `endpoint_base`.
    ///
    /// Polls until the job reports `done`, then streams the linked asset to
    /// `downloads/{video_id}.{format}` and returns that path. The loop is
    /// capped at [`config::poll::MAX_ATTEMPTS`] iterations; between polls it
    /// suspends for `poll_delay` without blocking other tasks.
    ///
    /// Any terminal signal - unrecognized status, non-200 response, request
    /// error, malformed payload - aborts the whole fetch immediately.
    /// Retrying those would spin forever against a permanently failed job.
    pub async fn fetch(
        &self,
        video_id: &str,
        endpoint_base: &str,
        poll_delay: Duration,
    ) -> Result<PathBuf, AcquireError> {
        let status_url = format!(
            "{}/{}?api={}",
            endpoint_base.trim_end_matches('/'),
            video_id,
            self.api_key
        );

        for attempt in 1..=config::poll::MAX_ATTEMPTS {
            let resp = self.http.get(&status_url).send().await?;

            if !resp.status().is_success() {
                return Err(AcquireError::RemoteTerminal(format!(
                    "status endpoint returned HTTP {}",
                    resp.status()
                )));
            }

            let job: JobResponse = resp
                .json()
                .await
                .map_err(|e| AcquireError::Network(format!("malformed status payload: {}", e)))?;

            match job.job_status() {
                JobStatus::Done => {
                    let link = job.link.as_deref().ok_or_else(|| {
                        AcquireError::RemoteTerminal("job done but payload carries no link".to_string())
                    })?;
                    let ext = job.format.as_deref().unwrap_or("mp3").to_lowercase();
                    return self.download_asset(video_id, link, &ext).await;
                }
                JobStatus::Downloading | JobStatus::Pending => {
                    log::debug!(
                        "remote job for {} still processing (poll {}/{}), sleeping {:?}",
                        video_id,
                        attempt,
                        config::poll::MAX_ATTEMPTS,
                        poll_delay
                    );
                    tokio::time::sleep(poll_delay).await;
                }
                JobStatus::Failed => {
                    return Err(AcquireError::RemoteTerminal(format!(
                        "job reported status \"{}\"",
                        job.status
                    )));
                }
            }
        }

        Err(AcquireError::PollBudgetExhausted(config::poll::MAX_ATTEMPTS))
    }

    /// Streams the finished asset to `downloads/{video_id}.{ext}`.
    ///
    /// Bytes land in a `.part` sibling first and the final name appears
    /// only via rename after the stream is fully written and closed, so a
    /// crashed transfer never masquerades as a cached asset.
    async fn download_asset(&self, video_id: &str, link: &str, ext: &str) -> Result<PathBuf, AcquireError> {
        tokio::fs::create_dir_all(&self.downloads_dir).await?;

        let target = self.downloads_dir.join(format!("{}.{}", video_id, ext));
        let part = self.downloads_dir.join(format!("{}.{}.part", video_id, ext));

        let resp = self.http.get(link).send().await?;
        if !resp.status().is_success() {
            return Err(AcquireError::RemoteTerminal(format!(
                "asset link returned HTTP {}",
                resp.status()
            )));
        }

        let mut file = tokio::fs::File::create(&part).await?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(c) => c,
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(&part).await;
                    return Err(AcquireError::Network(format!("asset stream interrupted: {}", e)));
                }
            };
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&part, &target).await?;

        log::info!("remote asset saved: {}", target.display());
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(JobStatus::parse("done"), JobStatus::Done);
        assert_eq!(JobStatus::parse("DONE"), JobStatus::Done);
        assert_eq!(JobStatus::parse("downloading"), JobStatus::Downloading);
        assert_eq!(JobStatus::parse("pending"), JobStatus::Pending);
        assert_eq!(JobStatus::parse("queued"), JobStatus::Pending);
        assert_eq!(JobStatus::parse("error"), JobStatus::Failed);
        assert_eq!(JobStatus::parse(""), JobStatus::Failed);
    }

    #[test]
    fn test_in_progress_statuses_keep_polling() {
        assert!(JobStatus::Pending.is_in_progress());
        assert!(JobStatus::Downloading.is_in_progress());
        assert!(!JobStatus::Done.is_in_progress());
        assert!(!JobStatus::Failed.is_in_progress());
    }

    #[test]
    fn test_job_response_tolerates_missing_fields() {
        let job: JobResponse = serde_json::from_str(r#"{"status":"downloading"}"#).unwrap();
        assert_eq!(job.job_status(), JobStatus::Downloading);
        assert!(job.link.is_none());
        assert!(job.format.is_none());

        let job: JobResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(job.job_status(), JobStatus::Failed);
    }
}
