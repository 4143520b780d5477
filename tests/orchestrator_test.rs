//! End-to-end orchestrator tests: policy ladder, flag redirects, and the
//! preserved legacy audio contract.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jukecore::download::{Acquirer, AcquirerConfig, AcquisitionRequest, Delivery};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIDEO_ID: &str = "dQw4w9WgXcQ";
const API_KEY: &str = "test-key";

fn config(downloads: &Path, cookies: &Path) -> AcquirerConfig {
    AcquirerConfig {
        audio_api_url: String::new(),
        video_api_url: String::new(),
        api_key: API_KEY.to_string(),
        downloads_dir: downloads.to_path_buf(),
        cookies_dir: cookies.to_path_buf(),
        ytdl_bin: "/nonexistent/yt-dlp".to_string(),
        audio_poll_delay: Duration::from_millis(10),
        video_poll_delay: Duration::from_millis(10),
        prefer_audio_fallback: false,
    }
}

/// Fake tool that drops a marker file when invoked, to prove the local
/// extraction path was (or was not) taken.
fn write_marker_tool(dir: &Path, marker: &Path) -> PathBuf {
    let bin = dir.join("yt-dlp");
    let script = format!("#!/bin/sh\n: > \"{}\"\nexit 1\n", marker.display());
    std::fs::write(&bin, script).unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();
    bin
}

async fn mount_done(server: &MockServer, id: &str, ext: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", id)))
        .and(query_param("api", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "done",
            "link": format!("{}/asset/{}.{}", server.uri(), id, ext),
            "format": ext,
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/asset/{}.{}", id, ext)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_audio_end_to_end_via_remote() {
    let server = MockServer::start().await;
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap();

    mount_done(&server, VIDEO_ID, "mp3", b"AUDIO BODY").await;

    let mut cfg = config(downloads.path(), cookies.path());
    cfg.audio_api_url = server.uri();

    let acquirer = Acquirer::new(cfg).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::audio(VIDEO_ID)).await;

    assert!(outcome.succeeded());
    assert!(!outcome.is_direct_stream());
    let path = outcome.path().unwrap();
    assert_eq!(path, downloads.path().join(format!("{}.mp3", VIDEO_ID)));
    assert_eq!(std::fs::read(path).unwrap(), b"AUDIO BODY");
}

#[tokio::test]
async fn test_audio_cache_hit_skips_network() {
    let server = MockServer::start().await;
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap();

    // Any request to the server would violate this expectation
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let cached = downloads.path().join(format!("{}.mp3", VIDEO_ID));
    std::fs::write(&cached, b"cached").unwrap();

    let mut cfg = config(downloads.path(), cookies.path());
    cfg.audio_api_url = server.uri();

    let acquirer = Acquirer::new(cfg).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::audio(VIDEO_ID)).await;

    assert_eq!(outcome.path().unwrap(), cached);
}

#[tokio::test]
async fn test_audio_failure_returns_unverified_guess() {
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap();

    // No remote endpoint configured: the legacy contract still hands back
    // a downloads/{id}.mp3 guess that does not exist on disk.
    let acquirer = Acquirer::new(config(downloads.path(), cookies.path())).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::audio(VIDEO_ID)).await;

    let guess = outcome.path().unwrap();
    assert_eq!(guess, downloads.path().join(format!("{}.mp3", VIDEO_ID)));
    assert!(!guess.exists(), "guessed path is intentionally unverified");
}

#[tokio::test]
async fn test_video_remote_success_is_local_file() {
    let server = MockServer::start().await;
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap();

    mount_done(&server, VIDEO_ID, "mp4", b"VIDEO BODY").await;

    let mut cfg = config(downloads.path(), cookies.path());
    cfg.video_api_url = server.uri();

    let acquirer = Acquirer::new(cfg).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::video(VIDEO_ID)).await;

    assert!(outcome.succeeded());
    assert!(!outcome.is_direct_stream());
    assert_eq!(
        std::fs::read(outcome.path().unwrap()).unwrap(),
        b"VIDEO BODY"
    );
}

#[tokio::test]
async fn test_prefer_audio_flag_redirects_and_never_extracts_locally() {
    let server = MockServer::start().await;
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();
    let marker = tools.path().join("extraction-ran");

    // Remote video terminally fails; remote audio succeeds.
    Mock::given(method("GET"))
        .and(path(format!("/video/{}", VIDEO_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "error"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/audio/{}", VIDEO_ID)))
        .and(query_param("api", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "done",
            "link": format!("{}/asset/{}.mp3", server.uri(), VIDEO_ID),
            "format": "mp3",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/asset/{}.mp3", VIDEO_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"FALLBACK AUDIO".to_vec()))
        .mount(&server)
        .await;

    // Give the local path a working cookie and a marker tool so an
    // accidental extraction attempt would be visible.
    std::fs::write(
        cookies.path().join("account1.txt"),
        "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\tTRUE\t0\tSID\tv\n",
    )
    .unwrap();
    let bin = write_marker_tool(tools.path(), &marker);

    let mut cfg = config(downloads.path(), cookies.path());
    cfg.audio_api_url = format!("{}/audio", server.uri());
    cfg.video_api_url = format!("{}/video", server.uri());
    cfg.ytdl_bin = bin.to_string_lossy().to_string();
    cfg.prefer_audio_fallback = true;

    let acquirer = Acquirer::new(cfg).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::video(VIDEO_ID)).await;

    // The audio path ran to completion...
    assert_eq!(
        std::fs::read(outcome.path().unwrap()).unwrap(),
        b"FALLBACK AUDIO"
    );
    // ...and the local extraction tool was never touched.
    assert!(!marker.exists(), "local extraction must not run under the flag");
}

#[tokio::test]
async fn test_video_exhausting_all_strategies_fails() {
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap(); // empty jar: MissingCredential

    let acquirer = Acquirer::new(config(downloads.path(), cookies.path())).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::video(VIDEO_ID)).await;

    assert!(!outcome.succeeded());
    assert!(outcome.path().is_none());
    assert!(outcome.stream_url().is_none());
}

#[tokio::test]
async fn test_video_direct_stream_resolution() {
    let downloads = tempfile::tempdir().unwrap();
    let cookies = tempfile::tempdir().unwrap();
    let tools = tempfile::tempdir().unwrap();

    std::fs::write(
        cookies.path().join("account1.txt"),
        "# Netscape HTTP Cookie File\n.youtube.com\tTRUE\t/\tTRUE\t0\tSID\tv\n",
    )
    .unwrap();

    let bin = tools.path().join("yt-dlp");
    std::fs::write(
        &bin,
        "#!/bin/sh\ncase \"$*\" in *\" -g \"*) echo \"https://cdn.example/direct\";; *) exit 1;; esac\n",
    )
    .unwrap();
    std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut cfg = config(downloads.path(), cookies.path());
    cfg.ytdl_bin = bin.to_string_lossy().to_string();

    let acquirer = Acquirer::new(cfg).unwrap();
    let outcome = acquirer.download(&AcquisitionRequest::video(VIDEO_ID)).await;

    assert!(outcome.is_direct_stream());
    assert_eq!(
        outcome.delivery().unwrap(),
        &Delivery::DirectStream("https://cdn.example/direct".to_string())
    );
}
