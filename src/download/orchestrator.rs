//! Acquisition orchestrator.
//!
//! Decides, per request, which strategy to try and in what order, and
//! normalizes the heterogeneous results into one [`AcquisitionOutcome`].
//! The ordering encodes a cost gradient: cheapest first (cache, remote
//! CDN), most expensive last (local transcode), with an operator escape
//! hatch in between.

use std::path::PathBuf;
use std::time::Duration;

use crate::core::{config, error::AppResult, utils};
use crate::download::cache;
use crate::download::cookies::CookieJar;
use crate::download::error::AcquireError;
use crate::download::remote::RemoteClient;
use crate::download::request::{AcquisitionOutcome, AcquisitionRequest, MediaKind};
use crate::download::ytdlp::YtDlp;

/// Explicit snapshot of the engine configuration.
///
/// Built from the environment in production ([`AcquirerConfig::from_env`])
/// and by hand in tests - no ambient state is consulted after
/// construction.
#[derive(Debug, Clone)]
pub struct AcquirerConfig {
    /// Remote audio API base URL; empty disables the remote audio path
    pub audio_api_url: String,
    /// Remote video API base URL; empty disables the remote video path
    pub video_api_url: String,
    /// API key appended to remote status requests
    pub api_key: String,
    /// Flat asset store keyed by `{id}.{ext}`
    pub downloads_dir: PathBuf,
    /// Directory of interchangeable cookie credential files
    pub cookies_dir: PathBuf,
    /// Extraction tool binary
    pub ytdl_bin: String,
    /// Delay between remote polls for audio jobs
    pub audio_poll_delay: Duration,
    /// Delay between remote polls for video jobs
    pub video_poll_delay: Duration,
    /// Redirect failed remote video fetches to the audio path instead of
    /// local extraction (bandwidth/quota conservation)
    pub prefer_audio_fallback: bool,
}

impl AcquirerConfig {
    /// Production constructor: snapshots the env-backed configuration.
    pub fn from_env() -> Self {
        Self {
            audio_api_url: config::API_URL.clone(),
            video_api_url: config::VIDEO_API_URL.clone(),
            api_key: config::API_KEY.clone(),
            downloads_dir: PathBuf::from(config::DOWNLOADS_DIR.as_str()),
            cookies_dir: PathBuf::from(config::COOKIES_DIR.as_str()),
            ytdl_bin: config::YTDL_BIN.clone(),
            audio_poll_delay: config::poll::audio_delay(),
            video_poll_delay: config::poll::video_delay(),
            prefer_audio_fallback: *config::PREFER_AUDIO_FALLBACK,
        }
    }
}

/// Arbitrates between the acquisition strategies.
///
/// One instance serves many concurrent requests; it owns the shared HTTP
/// client (one connection pool) and the bounded extraction-tool runner.
#[derive(Debug, Clone)]
pub struct Acquirer {
    remote: RemoteClient,
    ytdlp: YtDlp,
    cfg: AcquirerConfig,
}

impl Acquirer {
    /// Builds an acquirer with its own HTTP client (connect and total
    /// timeouts applied, so abandoned requests cannot leak connections).
    pub fn new(cfg: AcquirerConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config::network::connect_timeout())
            .timeout(config::network::timeout())
            .build()?;
        Ok(Self::with_http(cfg, http))
    }

    /// Builds an acquirer around an injected HTTP client.
    pub fn with_http(cfg: AcquirerConfig, http: reqwest::Client) -> Self {
        let remote = RemoteClient::new(http, cfg.api_key.clone(), cfg.downloads_dir.clone());
        let jar = CookieJar::new(cfg.cookies_dir.clone());
        let ytdlp = YtDlp::new(cfg.ytdl_bin.clone(), jar);
        Self { remote, ytdlp, cfg }
    }

    /// The configuration this acquirer was built with.
    pub fn config(&self) -> &AcquirerConfig {
        &self.cfg
    }

    /// Acquires an asset for `req`.
    ///
    /// Never panics and never escalates component failures; a request that
    /// exhausts every strategy yields a failed outcome, and one failed
    /// request does not affect others.
    pub async fn download(&self, req: &AcquisitionRequest) -> AcquisitionOutcome {
        match req.kind {
            MediaKind::Audio => self.acquire_audio(&req.video_id).await,
            MediaKind::Video => self.acquire_video(req).await,
        }
    }

    /// Audio path: cache, then the remote audio endpoint.
    ///
    /// On remote failure this returns a best-effort `downloads/{id}.mp3`
    /// guess WITHOUT verifying existence - a preserved legacy contract.
    /// Callers must treat the path as optimistic and re-check the file
    /// before use.
    async fn acquire_audio(&self, video_id: &str) -> AcquisitionOutcome {
        if let Some(path) = cache::probe(&self.cfg.downloads_dir, video_id, MediaKind::Audio) {
            return AcquisitionOutcome::local(path);
        }

        if let Some(path) = self
            .remote_fetch(video_id, &self.cfg.audio_api_url, self.cfg.audio_poll_delay)
            .await
        {
            return AcquisitionOutcome::local(path);
        }

        let guessed = self.cfg.downloads_dir.join(format!("{}.mp3", video_id));
        log::warn!(
            "remote audio fetch failed for {}; returning unverified path {}",
            video_id,
            guessed.display()
        );
        AcquisitionOutcome::local(guessed)
    }

    /// Video path, in cost order: cache, remote endpoint, operator
    /// redirect, direct stream resolution, bounded local download.
    async fn acquire_video(&self, req: &AcquisitionRequest) -> AcquisitionOutcome {
        let video_id = req.video_id.as_str();

        if let Some(path) = cache::probe(&self.cfg.downloads_dir, video_id, MediaKind::Video) {
            return AcquisitionOutcome::local(path);
        }

        if let Some(path) = self
            .remote_fetch(video_id, &self.cfg.video_api_url, self.cfg.video_poll_delay)
            .await
        {
            return AcquisitionOutcome::local(path);
        }

        if self.cfg.prefer_audio_fallback {
            log::info!(
                "remote video fetch failed for {}; prefer-audio fallback active, redirecting",
                video_id
            );
            return self.acquire_audio(video_id).await;
        }

        let link = utils::watch_url(video_id);

        if req.want_direct_stream {
            match self.ytdlp.resolve_stream_url(&link).await {
                Ok(url) => return AcquisitionOutcome::stream(url),
                Err(e) => {
                    log::warn!("stream resolution failed for {} ({}): {}", video_id, e.subcategory(), e);
                }
            }
        }

        match self
            .ytdlp
            .download_bounded(&link, req.size_limit_mb, &self.cfg.downloads_dir)
            .await
        {
            Ok(path) => AcquisitionOutcome::local(path),
            Err(e) => {
                log::warn!("local download failed for {} ({}): {}", video_id, e.subcategory(), e);
                AcquisitionOutcome::failed()
            }
        }
    }

    /// Remote fetch with the degrade-to-`None` boundary: failures are
    /// logged with their subcategory and swallowed here so the policy
    /// ladder can continue.
    async fn remote_fetch(&self, video_id: &str, endpoint_base: &str, delay: Duration) -> Option<PathBuf> {
        if endpoint_base.is_empty() {
            log::debug!("remote endpoint not configured, skipping for {}", video_id);
            return None;
        }

        match self.remote.fetch(video_id, endpoint_base, delay).await {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("remote fetch failed for {} ({}): {}", video_id, e.subcategory(), e);
                None
            }
        }
    }

    /// Direct access to the extraction-tool runner, for callers that need
    /// format listings or stream URLs outside the policy ladder.
    pub fn ytdlp(&self) -> &YtDlp {
        &self.ytdlp
    }

    /// Convenience wrapper: resolve a stream URL for a raw link.
    pub async fn resolve_stream_url(&self, link: &str) -> Result<String, AcquireError> {
        self.ytdlp.resolve_stream_url(link).await
    }
}
