//! Client SDK for "Sign in with Aurum ID" partner authorization.
//!
//! Implements the PKCE authorization-code flow against the Aurum identity
//! provider over two interchangeable transports: the Aurum companion app,
//! launched through a partner app link, and an embedded web surface driven
//! by the host. Both transports hand back the same callback shape, which
//! [`AurumIdAuth`] classifies and exchanges for tokens.
//!
//! The crate is deliberately UI-free. Hosts launch links, own web surfaces,
//! and store tokens; this crate builds the requests, keeps the pending code
//! verifier, talks to the token endpoints, and decides what a callback means.
//!
//! ```no_run
//! use aurum_id::{AppLinkResolver, AuthConfig, AurumIdAuth, FileVerifierStore};
//! use url::Url;
//!
//! struct NeverInstalled;
//!
//! impl AppLinkResolver for NeverInstalled {
//!     fn can_handle(&self, _uri: &Url, _category: &str) -> bool {
//!         false
//!     }
//! }
//!
//! # fn main() -> Result<(), aurum_id::AuthError> {
//! let auth = AurumIdAuth::new(
//!     AuthConfig::new("client-id", "myapp://signin", "com.example.app"),
//!     FileVerifierStore::with_default_locator()?,
//!     NeverInstalled,
//! )?;
//! let callback = Url::parse("https://example.com/cb").expect("static URL");
//! let request = auth.create_web_view_request(&callback)?;
//! # let _ = request;
//! # Ok(())
//! # }
//! ```

mod api;
mod app_link;
mod config;
mod error;
mod orchestrator;
mod payload;
mod pkce;
mod verifier_store;
mod webview;

pub use api::{web_view_auth_url, Endpoints, PartnerTokenClient, TokenKind};
pub use app_link::{
    app_link_base, auth_code, auth_status_code, create_app_link, create_return_cancel_link,
    create_return_code_link, parse_callback, require_auth_code, AppLinkResolver, AuthStatusCode,
    CallbackResult, PARTNER_AUTH_CATEGORY,
};
pub use config::{AuthConfig, ConfigError, ConfigLocator, SDK_VERSION};
pub use error::{AuthError, RevokeApiError, RevokeErrorCode, TokenApiError, TokenErrorCode};
pub use orchestrator::{AppAuthRequest, AurumIdAuth};
pub use payload::TokenPayload;
pub use pkce::{
    challenge_method, derive_challenge, generate_verifier, CodeChallengeMethod, DigestProvider,
    PkcePair, SystemDigest,
};
pub use verifier_store::{FileVerifierStore, VerifierStore};
pub use webview::{
    NavigationDirective, SessionCookieStore, WebViewAuthFlow, WebViewOutcome, WebViewRequest,
};
