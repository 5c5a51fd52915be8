//! Error taxonomy for source lookups.

use thiserror::Error;

/// Everything that can go wrong while fetching external data.
///
/// Carries enough context (offending parameter, HTTP status, decode message)
/// for the message to be surfaced verbatim in the resource's Synced
/// condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The spec's source parameters fail kind-specific validation.
    /// Raised by the router before any network or API call is attempted.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The backing store or endpoint could not be reached, or the named
    /// entry does not exist
    #[error("source unreachable: {0}")]
    SourceUnreachable(String),

    /// The endpoint answered, but outside the HTTP success range
    #[error("source responded with failure status {0}")]
    SourceRespondedWithFailure(u16),

    /// The response arrived but is not valid JSON
    #[error("cannot decode source payload: {0}")]
    DecodeFailure(String),
}
