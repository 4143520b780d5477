//! Logging initialization and startup diagnostics

use anyhow::Result;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::Path;

use crate::core::config;

/// Initialize the console logger.
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger() -> Result<()> {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs acquisition configuration at application startup.
///
/// Validates and logs:
/// - Remote API endpoint configuration (audio/video)
/// - Cookies directory existence and credential count
/// - Downloads directory path
pub fn log_acquisition_configuration() {
    log::info!("Acquisition configuration:");

    if config::API_URL.is_empty() {
        log::warn!("  audio API: not configured (API_URL empty) - remote audio path disabled");
    } else {
        log::info!("  audio API: {}", *config::API_URL);
    }

    if config::VIDEO_API_URL.is_empty() {
        log::warn!("  video API: not configured (VIDEO_API_URL empty) - remote video path disabled");
    } else {
        log::info!("  video API: {}", *config::VIDEO_API_URL);
    }

    let cookies_dir = Path::new(config::COOKIES_DIR.as_str());
    if cookies_dir.is_dir() {
        let count = std::fs::read_dir(cookies_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| e.path().extension().map(|ext| ext == "txt").unwrap_or(false))
                    .count()
            })
            .unwrap_or(0);
        if count == 0 {
            log::warn!(
                "  cookies: directory {} exists but holds no .txt credentials - local extraction will fail",
                cookies_dir.display()
            );
        } else {
            log::info!("  cookies: {} credential file(s) in {}", count, cookies_dir.display());
        }
    } else {
        log::warn!(
            "  cookies: directory {} not found - local extraction will fail",
            cookies_dir.display()
        );
    }

    log::info!("  downloads: {}", *config::DOWNLOADS_DIR);
    log::info!("  prefer-audio-on-video-fallback: {}", *config::PREFER_AUDIO_FALLBACK);
}
