//! Authentication handshake and stats page retrieval.
//!
//! Drives the four-message exchange the modem's web UI uses: fetch a CSRF
//! token, POST the client ephemeral, receive the salt/server-ephemeral
//! challenge, POST the proof. The cookie store of the underlying HTTP
//! client is the authenticated session; both POSTs carry the same CSRF
//! token, unmodified.
//!
//! Everything is sequential and blocking; each step depends on the
//! previous response and fails fast with a typed [`AuthError`]. There are
//! no retries here - a failed handshake cannot be resumed and a retry
//! (caller's choice, transport failures only) starts over with a fresh
//! CSRF token and a fresh ephemeral.
//!
//! Intermediate wire values (csrf, A, s, B, M) are logged at debug level
//! to help diagnose firmware quirks. That is a deliberate trade-off: the
//! proof and public ephemerals are not reusable across handshakes, but
//! operators who consider them sensitive should not enable debug logging.
//! The secret exponent and the derived session key are never logged, and
//! both are dropped when the handshake scope ends.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{AuthError, FetchError};
use crate::srp::{self, SrpEphemeral};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Challenge body returned by the first authenticate POST.
#[derive(Debug, Deserialize)]
struct Challenge {
    s: String,
    #[serde(rename = "B")]
    b: String,
}

/// Reply to the proof POST. `{}` on success; an `error` field means the
/// modem rejected the proof.
#[derive(Debug, Deserialize)]
struct ProofReply {
    error: Option<String>,
}

/// Client for one modem session: authenticates, then fetches the stats page.
pub struct Fetcher {
    client: Client,
    top_url: String,
    username: String,
    password: String,
    authenticated: bool,
}

impl Fetcher {
    /// Build a fetcher for the configured modem. No network traffic yet.
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            top_url: format!("http://{}", config.address),
            username: config.username.clone(),
            password: config.password.clone(),
            authenticated: false,
        })
    }

    /// Authenticate with the modem.
    ///
    /// On success the client's cookie store holds the session and further
    /// requests on this fetcher are authenticated. On failure the session
    /// is unusable; see [`AuthError::is_retryable`] for which failures a
    /// caller may retry with a fresh handshake.
    pub fn connect(&mut self) -> Result<(), AuthError> {
        // Fetch CSRF. Bound to both authenticate POSTs below.
        let csrf_url = format!("{}/login.lp?action=getcsrf", self.top_url);
        let csrf = self.client.get(&csrf_url).send()?.text()?;
        if csrf.len() != 64 {
            debug!("csrf {}", csrf);
            return Err(AuthError::BadCsrf);
        }
        debug!("csrf: {}", csrf);

        // Send the first SRP request: identity and public ephemeral
        let ephemeral = SrpEphemeral::generate();
        let a_hex = srp::bytes_to_hex(&ephemeral.public_bytes());
        debug!("A: {} {}", a_hex.len(), a_hex);

        let auth_url = format!("{}/authenticate", self.top_url);
        let auth1 = self
            .client
            .post(&auth_url)
            .form(&[
                ("I", self.username.as_str()),
                ("A", a_hex.as_str()),
                ("CSRFtoken", csrf.as_str()),
            ])
            .send()?;
        let status = auth1.status();
        if status != StatusCode::OK {
            debug!("{}", auth1.text().unwrap_or_default());
            return Err(AuthError::HttpStatus(status.as_u16()));
        }

        let challenge: Challenge = auth1
            .json()
            .map_err(|e| AuthError::MalformedChallenge(e.to_string()))?;
        debug!("s: {} {}", challenge.s.len(), challenge.s);
        debug!("B: {} {}", challenge.b.len(), challenge.b);

        let salt = srp::hex_to_bytes(&challenge.s)
            .map_err(|e| AuthError::MalformedChallenge(e.to_string()))?;
        let b_pub = srp::hex_to_bytes(&challenge.b)
            .map_err(|e| AuthError::MalformedChallenge(e.to_string()))?;

        let session =
            srp::derive_session(&ephemeral, &self.username, &self.password, &salt, &b_pub)
                .map_err(|e| AuthError::MalformedChallenge(e.to_string()))?;
        let m_hex = srp::bytes_to_hex(&session.proof);
        debug!("M: {} {}", m_hex.len(), m_hex);

        // Send our response to the SRP challenge, same CSRF token
        let auth2 = self
            .client
            .post(&auth_url)
            .form(&[("M", m_hex.as_str()), ("CSRFtoken", csrf.as_str())])
            .send()?;
        let status = auth2.status();
        if status != StatusCode::OK {
            debug!("{}", auth2.text().unwrap_or_default());
            return Err(AuthError::HttpStatus(status.as_u16()));
        }

        // `{}` means success; anything with an `error` field is a
        // rejection, regardless of what else the body holds. The modem
        // sends no server proof (M2), so there is nothing left to verify.
        let reply: ProofReply = auth2
            .json()
            .map_err(|e| AuthError::MalformedChallenge(e.to_string()))?;
        if let Some(error) = reply.error {
            return Err(AuthError::Rejected(error));
        }

        self.authenticated = true;
        Ok(())
    }

    /// Retrieve the broadband stats page, authenticating first if needed.
    ///
    /// One round trip beyond authentication; the body is returned verbatim.
    pub fn fetch(&mut self) -> Result<String, FetchError> {
        if !self.authenticated {
            self.connect()?;
        }

        let modem_url = format!("{}/modals/broadband-bridge-modal.lp", self.top_url);
        let resp = self.client.get(&modem_url).send()?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        Ok(resp.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_deserializes() {
        let challenge: Challenge = serde_json::from_str(r#"{"s": "ab12", "B": "cd34"}"#).unwrap();
        assert_eq!(challenge.s, "ab12");
        assert_eq!(challenge.b, "cd34");

        // Field names are exact; a reply missing either is malformed
        assert!(serde_json::from_str::<Challenge>(r#"{"s": "ab12"}"#).is_err());
        assert!(serde_json::from_str::<Challenge>(r#"{"s": "ab12", "b": "cd34"}"#).is_err());
    }

    #[test]
    fn test_proof_reply_deserializes() {
        let ok: ProofReply = serde_json::from_str("{}").unwrap();
        assert!(ok.error.is_none());

        let rejected: ProofReply =
            serde_json::from_str(r#"{"error": "failed", "other": 1}"#).unwrap();
        assert_eq!(rejected.error.as_deref(), Some("failed"));
    }
}
