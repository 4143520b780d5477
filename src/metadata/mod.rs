//! Metadata search-provider collaborator boundary.
//!
//! The engine does not search the platform itself; a provider implements
//! [`MetadataResolver`] and the rest of the bot consumes the returned
//! [`VideoDetails`]. What lives here is the contract, the data types, and
//! a bounded cache wrapper so repeated lookups for the same link do not
//! hit the provider again.

use async_trait::async_trait;
use moka::future::Cache;
use thiserror::Error;

use crate::core::utils;

/// Metadata lookup failures.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Provider-side failure (network, quota, parse)
    #[error("provider error: {0}")]
    Provider(String),

    /// Nothing matched the link or query
    #[error("no result for query")]
    NotFound,
}

/// Full metadata for one video, as consumed by the now-playing renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    /// Human-readable duration, e.g. "3:45"
    pub duration: String,
    pub duration_secs: u64,
    pub thumbnail_url: String,
    pub channel: String,
    /// Human-readable view count, e.g. "1.2M views"
    pub views: String,
    /// Human-readable published time, e.g. "2 years ago"
    pub published: String,
}

/// Compact track descriptor for queue entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub link: String,
    pub video_id: String,
    pub duration: String,
    pub thumbnail_url: String,
}

impl From<&VideoDetails> for Track {
    fn from(d: &VideoDetails) -> Self {
        Track {
            title: d.title.clone(),
            link: utils::watch_url(&d.id),
            video_id: d.id.clone(),
            duration: d.duration.clone(),
            thumbnail_url: d.thumbnail_url.clone(),
        }
    }
}

/// Search-provider contract.
///
/// Implementations wrap whatever search backend the deployment uses.
/// Playlist enumeration is intentionally minimal: id lists only.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Full details for a canonical watch URL or raw id.
    async fn details(&self, link: &str) -> Result<VideoDetails, MetadataError>;

    /// Compact track form. Default goes through [`Self::details`].
    async fn track(&self, link: &str) -> Result<Track, MetadataError> {
        let details = self.details(link).await?;
        Ok(Track::from(&details))
    }

    /// Video ids of a playlist, capped at `limit`.
    async fn playlist_ids(&self, link: &str, limit: usize) -> Result<Vec<String>, MetadataError>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Bounded result cache in front of any resolver.
///
/// The parent bot used to memoize search results in module globals; here
/// the cache is an explicit dependency with an explicit capacity,
/// constructed at process start.
pub struct CachedResolver<R> {
    inner: R,
    details_cache: Cache<String, VideoDetails>,
}

impl<R: MetadataResolver> CachedResolver<R> {
    /// Wraps `inner` with a cache holding up to `capacity` entries.
    pub fn new(inner: R, capacity: u64) -> Self {
        Self {
            inner,
            details_cache: Cache::new(capacity),
        }
    }

    /// The wrapped resolver.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: MetadataResolver> MetadataResolver for CachedResolver<R> {
    async fn details(&self, link: &str) -> Result<VideoDetails, MetadataError> {
        if let Some(hit) = self.details_cache.get(link).await {
            log::debug!("metadata cache hit for {}", link);
            return Ok(hit);
        }

        let details = self.inner.details(link).await?;
        self.details_cache.insert(link.to_string(), details.clone()).await;
        Ok(details)
    }

    async fn playlist_ids(&self, link: &str, limit: usize) -> Result<Vec<String>, MetadataError> {
        // Playlists mutate; pass through uncached
        self.inner.playlist_ids(link, limit).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
