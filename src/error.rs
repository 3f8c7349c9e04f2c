//! Error types for the modemstat library.

use thiserror::Error;

/// Errors that can occur during the SRP authentication handshake.
///
/// Variants split into two classes: transport failures (`Transport`,
/// `HttpStatus`) which a caller may retry with a fresh handshake, and
/// terminal failures. `BadCsrf` and `MalformedChallenge` indicate the
/// modem's API no longer matches this client; `Rejected` means the modem
/// refused the credential proof and must not be retried with the same
/// credentials.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Connection-level failure talking to the modem.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A handshake request returned an unexpected HTTP status.
    #[error("authentication request failed with HTTP status {0}")]
    HttpStatus(u16),

    /// The CSRF endpoint did not return a 64-character token.
    #[error("bad csrf response")]
    BadCsrf,

    /// The challenge or proof reply did not have the expected shape
    /// (non-JSON body, undecodable hex, empty or invalid values).
    #[error("malformed challenge: {0}")]
    MalformedChallenge(String),

    /// The modem rejected the credential proof. Wrong password?
    #[error("authentication rejected: {0}")]
    Rejected(String),
}

impl AuthError {
    /// Whether a caller may meaningfully retry with a fresh handshake.
    ///
    /// Only transport-level failures qualify; protocol mismatches need a
    /// code change and a rejected proof needs different credentials.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::Transport(_) | AuthError::HttpStatus(_))
    }
}

/// Errors that can occur while retrieving the stats page.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Authentication handshake failed before the page was requested.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Connection-level failure on the stats page request.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The stats page request returned an unexpected HTTP status.
    #[error("stats page request failed with HTTP status {0}")]
    HttpStatus(u16),
}

/// Errors that can occur while extracting metrics from the stats page.
///
/// Either means the page structure changed or the modem returned an
/// unexpected page; both are fatal for the run, with no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No section labeled with the given title was found.
    #[error("section \"{0}\" not found in page")]
    SectionNotFound(String),

    /// The labeled section held fewer than two unit-suffixed values.
    #[error("expected two \"{unit}\" values under \"{label}\"")]
    MissingValues { label: String, unit: String },
}
