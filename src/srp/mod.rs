//! SRP (Secure Remote Password) client for the modem's login endpoint.
//!
//! # Protocol Parameters
//! - Group: RFC 5054 2048-bit (`N`, `g = 2`)
//! - Hash: SHA-256
//! - Multiplier k: fixed vendor constant, NOT the standard `H(N | PAD(g))`
//! - Hash inputs: minimal big-endian byte strings (no padding to group size)
//!
//! The TGiiNet-1 firmware substitutes its own 256-bit `k` into the SRP-6a
//! equations. Deriving `k` the standard way produces proofs the modem
//! rejects, which is why [`DEVICE_K_HEX`] is an explicit constant here and
//! why this module does the group math by hand instead of going through the
//! `srp` crate's client (that client derives `k` internally). Only the
//! group constants are taken from `srp`.
//!
//! The modem never sends a server proof (M2), so there is nothing to verify
//! after [`derive_session`]; the handshake ends with the client proof.

use num_bigint::BigUint;
use rand::RngCore;
use sha2::{Digest, Sha256};
use ::srp::groups::G_2048;
use thiserror::Error;

/// Multiplier constant the TGiiNet-1 firmware uses in place of the
/// standard SRP-6a `k = H(N | PAD(g))` derivation.
pub const DEVICE_K_HEX: &str = "05b9e8ef059c6b32ea59fc1d322d37f04aa30bae5aa9003b8321e21ddb04e300";

/// Client ephemeral key pair: secret exponent `a` and public `A = g^a mod N`.
///
/// Generated once per handshake and held only in memory; a failed handshake
/// requires a fresh ephemeral.
pub struct SrpEphemeral {
    secret: BigUint,
    public: BigUint,
}

/// SRP session result: client proof `M` and shared session key `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrpSession {
    /// Client proof M = H((H(N) XOR H(g)) | H(I) | s | A | B | K)
    pub proof: Vec<u8>,
    /// Shared session key K = H(S)
    pub key: Vec<u8>,
}

/// SRP-related errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SrpError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Convert bytes to lowercase hex string (the modem's wire encoding).
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

/// Convert hex string to bytes.
pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, SrpError> {
    let hex = hex.trim();
    if hex.is_empty() {
        return Err(SrpError::InvalidHex("empty hex string".to_string()));
    }

    if hex.len() % 2 != 0 {
        return Err(SrpError::InvalidHex(format!(
            "odd length hex string: {}",
            hex.len()
        )));
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| SrpError::InvalidHex(format!("invalid hex at position {}: {}", i, e)))
        })
        .collect()
}

fn device_k() -> BigUint {
    // DEVICE_K_HEX is a compile-time constant of valid hex
    let bytes = hex_to_bytes(DEVICE_K_HEX).unwrap_or_default();
    BigUint::from_bytes_be(&bytes)
}

fn sha256(data: &[u8]) -> Vec<u8> {
    Sha256::digest(data).to_vec()
}

/// Compute u = H(A | B), minimal big-endian encodings.
fn compute_u(a_pub: &BigUint, b_pub: &BigUint) -> BigUint {
    let mut hasher = Sha256::new();
    hasher.update(a_pub.to_bytes_be());
    hasher.update(b_pub.to_bytes_be());
    BigUint::from_bytes_be(&hasher.finalize())
}

/// Compute x = H(s | H(I | ":" | P)).
fn compute_x(salt: &BigUint, identity: &str, password: &str) -> BigUint {
    let mut inner_hasher = Sha256::new();
    inner_hasher.update(identity.as_bytes());
    inner_hasher.update(b":");
    inner_hasher.update(password.as_bytes());
    let inner = inner_hasher.finalize();

    let mut hasher = Sha256::new();
    hasher.update(salt.to_bytes_be());
    hasher.update(inner);
    BigUint::from_bytes_be(&hasher.finalize())
}

/// Compute M = H((H(N) XOR H(g)) | H(I) | s | A | B | K).
fn compute_m(
    salt: &BigUint,
    identity: &str,
    a_pub: &BigUint,
    b_pub: &BigUint,
    key: &[u8],
) -> Vec<u8> {
    let h_n = sha256(&G_2048.n.to_bytes_be());
    let h_g = sha256(&G_2048.g.to_bytes_be());
    let h_n_xor_h_g: Vec<u8> = h_n.iter().zip(h_g.iter()).map(|(a, b)| a ^ b).collect();
    let h_i = sha256(identity.as_bytes());

    let mut hasher = Sha256::new();
    hasher.update(&h_n_xor_h_g);
    hasher.update(&h_i);
    hasher.update(salt.to_bytes_be());
    hasher.update(a_pub.to_bytes_be());
    hasher.update(b_pub.to_bytes_be());
    hasher.update(key);
    hasher.finalize().to_vec()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Client Operations
// ═══════════════════════════════════════════════════════════════════════════════

impl SrpEphemeral {
    /// Generate a fresh ephemeral with a 256-bit random secret exponent.
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_secret(&secret)
    }

    /// Build an ephemeral from a fixed secret exponent.
    ///
    /// Deterministic counterpart of [`SrpEphemeral::generate`]; the
    /// handshake math is a pure function of the secret and the server
    /// challenge, which is what makes it testable.
    pub fn from_secret(secret: &[u8]) -> Self {
        let secret = BigUint::from_bytes_be(secret);
        let public = G_2048.g.modpow(&secret, &G_2048.n);
        Self { secret, public }
    }

    /// Public ephemeral A as minimal big-endian bytes.
    pub fn public_bytes(&self) -> Vec<u8> {
        self.public.to_bytes_be()
    }
}

/// Derive the session key and client proof from the server challenge.
///
/// Computes, with the device `k` substituted wherever SRP-6a specifies it:
/// - `x = H(s | H(I | ":" | P))`
/// - `u = H(A | B)`
/// - premaster `S = (B - k*g^x) ^ (a + u*x) mod N`
/// - `K = H(S)` and the client proof `M`
///
/// # Arguments
/// * `ephemeral` - Client ephemeral generated for this handshake
/// * `identity` - Username as sent in the first authentication request
/// * `password` - Password (never sent on the wire)
/// * `salt` - Salt `s` from the server challenge, raw bytes
/// * `server_public` - Server ephemeral `B` from the challenge, raw bytes
///
/// # Errors
/// `InvalidParameter` if the salt is empty or `B` is empty or `B mod N == 0`
/// (a malicious or broken server ephemeral would fix the premaster at zero).
pub fn derive_session(
    ephemeral: &SrpEphemeral,
    identity: &str,
    password: &str,
    salt: &[u8],
    server_public: &[u8],
) -> Result<SrpSession, SrpError> {
    if salt.is_empty() {
        return Err(SrpError::InvalidParameter("empty salt".to_string()));
    }
    if server_public.is_empty() {
        return Err(SrpError::InvalidParameter(
            "empty server public ephemeral".to_string(),
        ));
    }

    let salt = BigUint::from_bytes_be(salt);
    let b_pub = BigUint::from_bytes_be(server_public) % &G_2048.n;

    // Classic SRP safety check: B mod N must not be 0
    if b_pub == BigUint::default() {
        return Err(SrpError::InvalidParameter(
            "server public ephemeral is invalid".to_string(),
        ));
    }

    let u = compute_u(&ephemeral.public, &b_pub);
    let x = compute_x(&salt, identity, password);
    let k = device_k();

    // S = (B - k*g^x) ^ (a + u*x) mod N
    let kg_x = (&k * G_2048.g.modpow(&x, &G_2048.n)) % &G_2048.n;
    let base = ((&G_2048.n + &b_pub) - &kg_x) % &G_2048.n;
    let exp = (&u * &x) + &ephemeral.secret;
    let s = base.modpow(&exp, &G_2048.n);

    // K = H(S)
    let key = sha256(&s.to_bytes_be());

    let proof = compute_m(&salt, identity, &ephemeral.public, &b_pub, &key);

    Ok(SrpSession { proof, key })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
