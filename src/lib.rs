//! Jukecore - media resolution and acquisition core for a Telegram music bot
//!
//! This library contains everything the bot needs to turn a video reference
//! into a playable asset: cache probing, the remote transcoding-API client,
//! the local yt-dlp fallback, and the orchestrator that arbitrates between
//! them. Telegram handling, playback, and image drawing live elsewhere.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging, and URL/id utilities
//! - `download`: The acquisition engine (cache, remote client, cookies,
//!   extraction tool, orchestrator)
//! - `metadata`: Search-provider collaborator boundary and cached wrapper
//! - `render`: Now-playing renderer collaborator boundary

pub mod core;
pub mod download;
pub mod metadata;
pub mod render;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult};
pub use crate::download::{
    Acquirer, AcquirerConfig, AcquireError, AcquisitionOutcome, AcquisitionRequest, Delivery, MediaKind,
};
pub use crate::metadata::{CachedResolver, MetadataResolver, Track, VideoDetails};
pub use crate::render::{CachingRenderer, NowPlayingRenderer, NowPlayingStyle};
