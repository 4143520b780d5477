//! Now-playing renderer collaborator boundary.
//!
//! Image drawing is out of scope; a backend implements
//! [`NowPlayingRenderer`] and draws into the target path it is given.
//! The one capability the engine owns is caching: rendered images are
//! keyed by video id and style so every "skin" variant reuses the same
//! pipeline instead of duplicating it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::metadata::VideoDetails;

/// Rendering failures.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Could not fetch the source thumbnail
    #[error("thumbnail fetch failed: {0}")]
    Thumbnail(String),

    /// Backend drawing failure
    #[error("render backend failed: {0}")]
    Backend(String),

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Color palette preset for the rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Palette {
    Midnight,
    Sunset,
    Mono,
}

impl Palette {
    fn key(&self) -> &'static str {
        match self {
            Palette::Midnight => "midnight",
            Palette::Sunset => "sunset",
            Palette::Mono => "mono",
        }
    }
}

/// Overall layout preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutPreset {
    Card,
    FullBleed,
    Compact,
}

impl LayoutPreset {
    fn key(&self) -> &'static str {
        match self {
            LayoutPreset::Card => "card",
            LayoutPreset::FullBleed => "fullbleed",
            LayoutPreset::Compact => "compact",
        }
    }
}

/// Player control icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSet {
    Solid,
    Outline,
    Minimal,
}

impl IconSet {
    fn key(&self) -> &'static str {
        match self {
            IconSet::Solid => "solid",
            IconSet::Outline => "outline",
            IconSet::Minimal => "minimal",
        }
    }
}

/// Style configuration for a now-playing image.
///
/// One renderer parameterized by this struct replaces the per-skin
/// renderer copies the bot used to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NowPlayingStyle {
    pub palette: Palette,
    pub layout: LayoutPreset,
    pub icons: IconSet,
}

impl Default for NowPlayingStyle {
    fn default() -> Self {
        Self {
            palette: Palette::Midnight,
            layout: LayoutPreset::Card,
            icons: IconSet::Solid,
        }
    }
}

impl NowPlayingStyle {
    /// Stable key used in cache file names, e.g. "card-midnight-solid".
    pub fn cache_key(&self) -> String {
        format!("{}-{}-{}", self.layout.key(), self.palette.key(), self.icons.key())
    }
}

/// Renderer contract: draw a now-playing image for `details` with `style`
/// into `target`.
#[async_trait]
pub trait NowPlayingRenderer: Send + Sync {
    async fn render(
        &self,
        details: &VideoDetails,
        style: &NowPlayingStyle,
        target: &Path,
    ) -> Result<(), RenderError>;
}

/// File-cache wrapper around any renderer.
///
/// Rendered images land in `cache_dir/{id}_{style}.png`; an existing file
/// short-circuits the backend entirely.
pub struct CachingRenderer<R> {
    inner: R,
    cache_dir: PathBuf,
}

impl<R: NowPlayingRenderer> CachingRenderer<R> {
    pub fn new(inner: R, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache path for a given video and style.
    pub fn cache_path(&self, video_id: &str, style: &NowPlayingStyle) -> PathBuf {
        self.cache_dir.join(format!("{}_{}.png", video_id, style.cache_key()))
    }

    /// Returns the cached image path, rendering it first if needed.
    pub async fn render(&self, details: &VideoDetails, style: &NowPlayingStyle) -> Result<PathBuf, RenderError> {
        let target = self.cache_path(&details.id, style);
        if target.is_file() {
            log::debug!("render cache hit: {}", target.display());
            return Ok(target);
        }

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        self.inner.render(details, style, &target).await?;
        Ok(target)
    }
}

/// Downloads the source thumbnail to `target`.
///
/// Bytes go through a `.part` sibling and an atomic rename, the same
/// discipline the asset downloads use, so a crashed fetch never leaves a
/// half-written image that later short-circuits rendering.
pub async fn fetch_thumbnail(client: &reqwest::Client, url: &str, target: &Path) -> Result<(), RenderError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| RenderError::Thumbnail(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(RenderError::Thumbnail(format!("HTTP {}", resp.status())));
    }

    let bytes = resp.bytes().await.map_err(|e| RenderError::Thumbnail(e.to_string()))?;

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let part = target.with_extension("part");
    let mut file = tokio::fs::File::create(&part).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);
    tokio::fs::rename(&part, target).await?;

    Ok(())
}
