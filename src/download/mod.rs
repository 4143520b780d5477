//! Download acquisition engine
//!
//! Strategy chain for turning a video id into a playable asset:
//! local cache probe, remote job-API client, cookie-authenticated
//! extraction-tool fallback, and the orchestrator that arbitrates
//! between them.

pub mod cache;
pub mod cookies;
pub mod error;
pub mod orchestrator;
pub mod remote;
pub mod request;
pub mod ytdlp;

// Re-exports for convenience
pub use cookies::CookieJar;
pub use error::AcquireError;
pub use orchestrator::{Acquirer, AcquirerConfig};
pub use remote::{JobStatus, RemoteClient};
pub use request::{AcquisitionOutcome, AcquisitionRequest, Delivery, MediaKind};
pub use ytdlp::{FormatInfo, ProbeInfo, YtDlp};
