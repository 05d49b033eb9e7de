use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Bytes of CSPRNG entropy behind each code verifier.
const VERIFIER_ENTROPY_BYTES: usize = 64;

/// Challenge derivation methods defined by the PKCE exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeChallengeMethod {
    S256,
    /// Fallback when no SHA-256 capability is present. The challenge equals
    /// the verifier, so the exchange no longer proves possession; treat it as
    /// reduced security.
    Plain,
}

impl CodeChallengeMethod {
    /// Wire form sent in `code_challenge_method` parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeChallengeMethod::S256 => "S256",
            CodeChallengeMethod::Plain => "plain",
        }
    }
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform SHA-256 capability used to derive code challenges.
///
/// Injectable so hosts on constrained platforms can report the primitive
/// missing (`None`), which switches challenge derivation to the plain-text
/// fallback and withdraws the native-app transport.
pub trait DigestProvider {
    fn sha256(&self, data: &[u8]) -> Option<[u8; 32]>;
}

/// Digest provider backed by the bundled SHA-256 implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDigest;

impl DigestProvider for SystemDigest {
    fn sha256(&self, data: &[u8]) -> Option<[u8; 32]> {
        Some(Sha256::digest(data).into())
    }
}

/// A code verifier and the challenge derived from it.
///
/// The verifier must never travel in an authorization request; only the
/// challenge and method do. Hand the verifier to the verifier store so the
/// token exchange can present it later.
#[derive(Debug, Clone)]
pub struct PkcePair {
    verifier: String,
    challenge: String,
    method: CodeChallengeMethod,
}

impl PkcePair {
    /// Generate a fresh pair using the bundled SHA-256.
    pub fn generate() -> Self {
        Self::generate_with(&SystemDigest)
    }

    /// Generate a fresh pair, deriving the challenge through `digest`.
    pub fn generate_with(digest: &dyn DigestProvider) -> Self {
        let verifier = generate_verifier();
        let (challenge, method) = derive_challenge(digest, &verifier);
        Self {
            verifier,
            challenge,
            method,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    pub fn method(&self) -> CodeChallengeMethod {
        self.method
    }
}

/// Generate a code verifier: 64 random bytes, base64url without padding.
pub fn generate_verifier() -> String {
    let mut entropy = [0u8; VERIFIER_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut entropy);
    URL_SAFE_NO_PAD.encode(entropy)
}

/// Derive the challenge for an existing verifier.
///
/// S256 hashes the verifier's byte form; verifiers are ASCII, so this matches
/// what the provider hashes on its side. Without a digest capability the
/// verifier itself is the challenge under the `plain` method.
pub fn derive_challenge(
    digest: &dyn DigestProvider,
    verifier: &str,
) -> (String, CodeChallengeMethod) {
    match digest.sha256(verifier.as_bytes()) {
        Some(hash) => (URL_SAFE_NO_PAD.encode(hash), CodeChallengeMethod::S256),
        None => (verifier.to_owned(), CodeChallengeMethod::Plain),
    }
}

/// Challenge method the given capability would yield. Used to gate transport
/// availability before any verifier exists.
pub fn challenge_method(digest: &dyn DigestProvider) -> CodeChallengeMethod {
    if digest.sha256(&[]).is_some() {
        CodeChallengeMethod::S256
    } else {
        CodeChallengeMethod::Plain
    }
}
