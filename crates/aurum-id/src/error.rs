use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by authorization, callback parsing, and token requests.
///
/// User cancellation is never represented here; it is a first-class outcome
/// (`CallbackResult::Cancelled`), not a failure.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// Transport-level failure: connect, timeout, or an undecodable body.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-success response from `auth/token`; `error` is present when the
    /// body carried the provider's documented JSON error shape.
    #[error("token endpoint rejected the request ({status})")]
    TokenEndpoint {
        status: StatusCode,
        error: Option<TokenApiError>,
    },
    /// Non-success response from `auth/revoke`.
    #[error("revoke endpoint rejected the request ({status})")]
    RevokeEndpoint {
        status: StatusCode,
        error: Option<RevokeApiError>,
    },
    /// A success callback or redirect did not carry the `code` parameter the
    /// provider contract requires. Fails the current flow only.
    #[error("authorization callback is missing the code parameter")]
    MissingAuthorizationCode,
}

impl AuthError {
    /// Human-readable message from the provider, when the response carried one.
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            AuthError::TokenEndpoint {
                error: Some(error), ..
            } => error.message.as_deref(),
            AuthError::RevokeEndpoint {
                error: Some(error), ..
            } => error.message.as_deref(),
            _ => None,
        }
    }
}

/// Structured rejection parsed from a token-endpoint error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenApiError {
    pub code: TokenErrorCode,
    pub message: Option<String>,
}

/// Structured rejection parsed from a revoke-endpoint error body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokeApiError {
    pub code: RevokeErrorCode,
    pub message: Option<String>,
}

/// Closed set of `error` strings documented for `auth/token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenErrorCode {
    /// A required parameter, cookie, or header is missing.
    InvalidRequest,
    /// The redirect URI does not match the client registration.
    InvalidClient,
    /// The code or refresh token passed is invalid or expired.
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    /// Provider-side fault; the request may be repeated by the caller.
    ServerError,
    /// The client is requesting tokens too often.
    LimitExceeded,
    /// Any error string outside the documented set.
    Unknown,
}

impl TokenErrorCode {
    pub fn from_provider(code: &str) -> Self {
        match code {
            "invalid_request" => TokenErrorCode::InvalidRequest,
            "invalid_client" => TokenErrorCode::InvalidClient,
            "invalid_grant" => TokenErrorCode::InvalidGrant,
            "unauthorized_client" => TokenErrorCode::UnauthorizedClient,
            "unsupported_grant_type" => TokenErrorCode::UnsupportedGrantType,
            "server_error" => TokenErrorCode::ServerError,
            "limit_exceeded" => TokenErrorCode::LimitExceeded,
            _ => TokenErrorCode::Unknown,
        }
    }
}

/// Closed set of `error` strings documented for `auth/revoke`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeErrorCode {
    /// The token owner is not part of the client's audience.
    InvalidGrant,
    /// No token was present in the request.
    InvalidRequest,
    Unknown,
}

impl RevokeErrorCode {
    pub fn from_provider(code: &str) -> Self {
        match code {
            "invalid_grant" => RevokeErrorCode::InvalidGrant,
            "invalid_request" => RevokeErrorCode::InvalidRequest,
            _ => RevokeErrorCode::Unknown,
        }
    }
}
