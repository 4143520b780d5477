use thiserror::Error;

/// Structured error type for acquisition operations.
///
/// Categorized variants keep logging and degradation decisions honest:
/// every component maps its failures here, and only the orchestrator
/// decides what the caller ultimately sees.
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Transport-level failure talking to the remote API (request error,
    /// malformed JSON body)
    #[error("network error: {0}")]
    Network(String),

    /// The remote job reported a terminal state: unrecognized status,
    /// non-200 response, or a "done" payload missing its link. Never
    /// retried — the service encodes permanent failure in-band.
    #[error("remote job failed terminally: {0}")]
    RemoteTerminal(String),

    /// The bounded poll loop ran out of iterations while the job was
    /// still processing
    #[error("poll budget exhausted after {0} iterations")]
    PollBudgetExhausted(u32),

    /// No cookie credential file is available. Fatal for the local
    /// extraction path only, not for the orchestrator.
    #[error("no cookie credential available")]
    MissingCredential,

    /// Bounded download refused: the reported size exceeds the limit.
    /// A policy decision, not a fault.
    #[error("refused download: {size_mb} MB exceeds limit of {limit_mb} MB")]
    SizeExceeded { size_mb: u64, limit_mb: u64 },

    /// Extraction tool exited non-zero; carries the failure text
    #[error("extraction tool failed: {0}")]
    Tool(String),

    /// Subprocess or HTTP call exceeded its deadline
    #[error("timed out: {0}")]
    Timeout(String),

    /// Filesystem failure while writing or renaming assets
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquireError {
    /// Returns subcategory for logs and counters
    pub fn subcategory(&self) -> &'static str {
        match self {
            AcquireError::Network(_) => "network",
            AcquireError::RemoteTerminal(_) => "remote_terminal",
            AcquireError::PollBudgetExhausted(_) => "poll_budget",
            AcquireError::MissingCredential => "missing_credential",
            AcquireError::SizeExceeded { .. } => "size_exceeded",
            AcquireError::Tool(_) => "tool",
            AcquireError::Timeout(_) => "timeout",
            AcquireError::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for AcquireError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AcquireError::Timeout(err.to_string())
        } else {
            AcquireError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subcategory() {
        assert_eq!(AcquireError::MissingCredential.subcategory(), "missing_credential");
        assert_eq!(AcquireError::Network("x".into()).subcategory(), "network");
        assert_eq!(
            AcquireError::SizeExceeded { size_mb: 300, limit_mb: 250 }.subcategory(),
            "size_exceeded"
        );
    }

    #[test]
    fn test_size_exceeded_display() {
        let err = AcquireError::SizeExceeded { size_mb: 300, limit_mb: 250 };
        assert_eq!(err.to_string(), "refused download: 300 MB exceeds limit of 250 MB");
    }
}
