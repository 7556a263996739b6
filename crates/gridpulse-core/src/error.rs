//! Error types for decoding grid payloads and their envelopes.
//!
//! Encoding writes into an in-memory sink and cannot fail, so there is no
//! encode error type.

/// Errors that abort a decode. Everything else is absorbed and reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("stream truncated at byte {offset}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("{domain} data from future version {found} (this build supports up to {supported})")]
    FutureVersion {
        domain: &'static str,
        found: u32,
        supported: u32,
    },
    #[error("unknown {domain} format version {found}")]
    UnknownVersion { domain: &'static str, found: u32 },
    #[error("container tag mismatch: expected {expected:?}, got {found:?}")]
    TagMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("container tag is not valid UTF-8")]
    InvalidTag,
    #[error("envelope declares {declared} payload bytes but only {available} are available")]
    LengthMismatch { declared: usize, available: usize },
}

impl DecodeError {
    /// Whether this error means the stream ended early.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            DecodeError::Truncated { .. } | DecodeError::LengthMismatch { .. }
        )
    }
}
