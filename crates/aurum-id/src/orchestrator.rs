use tracing::info;
use url::Url;

use crate::api::{PartnerTokenClient, TokenKind};
use crate::app_link::{self, AppLinkResolver, AuthStatusCode, CallbackResult, PARTNER_AUTH_CATEGORY};
use crate::config::{AuthConfig, SDK_VERSION};
use crate::error::AuthError;
use crate::payload::TokenPayload;
use crate::pkce::{self, CodeChallengeMethod, DigestProvider, PkcePair, SystemDigest};
use crate::verifier_store::VerifierStore;
use crate::webview::WebViewRequest;

/// Launch payload for the native-app transport: the partner link plus the
/// intent category it must be launched under. The host performs the launch.
#[derive(Debug, Clone)]
pub struct AppAuthRequest {
    pub uri: Url,
    pub category: &'static str,
}

/// Entry point for Aurum ID partner authorization.
///
/// One value serves any number of attempts. No flow state lives in memory
/// beyond what the verifier store persists: a request hands the host a URI,
/// the callback later arrives through the platform's link delivery, and the
/// exchange reads the verifier back from the store. Process death between
/// those steps is fine; rebuild this value and continue with the callback.
///
/// Starting a new attempt overwrites the stored verifier, so only the most
/// recent attempt can complete; the provider rejects the older code.
pub struct AurumIdAuth<S> {
    config: AuthConfig,
    api: PartnerTokenClient,
    store: S,
    resolver: Box<dyn AppLinkResolver + Send + Sync>,
    digest: Box<dyn DigestProvider + Send + Sync>,
}

impl<S: VerifierStore> AurumIdAuth<S> {
    pub fn new(
        config: AuthConfig,
        store: S,
        resolver: impl AppLinkResolver + Send + Sync + 'static,
    ) -> Result<Self, AuthError> {
        Ok(Self {
            config,
            api: PartnerTokenClient::new()?,
            store,
            resolver: Box::new(resolver),
            digest: Box::new(SystemDigest),
        })
    }

    /// Swap the token client, e.g. one pointed at a mock server.
    pub fn with_token_client(mut self, api: PartnerTokenClient) -> Self {
        self.api = api;
        self
    }

    /// Swap the SHA-256 capability reported by the platform.
    pub fn with_digest(mut self, digest: impl DigestProvider + Send + Sync + 'static) -> Self {
        self.digest = Box::new(digest);
        self
    }

    /// Whether the native-app transport can be offered right now.
    ///
    /// True only when an installed handler accepts the partner link and the
    /// platform can derive S256 challenges. The plain-text fallback withdraws
    /// this transport while the embedded web transport keeps working; that
    /// asymmetry matches the provider's historical client behavior and is
    /// kept deliberately.
    pub fn is_app_auth_available(&self) -> bool {
        self.resolver
            .can_handle(&app_link::app_link_base(), PARTNER_AUTH_CATEGORY)
            && pkce::challenge_method(self.digest.as_ref()) == CodeChallengeMethod::S256
    }

    /// Begin an attempt over the native-app transport.
    ///
    /// Generates a fresh verifier/challenge pair and persists the verifier
    /// before returning. Availability is probe-only; building a request does
    /// not check it, so hosts normally consult
    /// [`is_app_auth_available`](Self::is_app_auth_available) first.
    pub fn create_app_auth_request(&self, callback_url: &Url) -> Result<AppAuthRequest, AuthError> {
        let pair = PkcePair::generate_with(self.digest.as_ref());
        self.store.put(pair.verifier())?;
        info!("created app auth request");
        Ok(AppAuthRequest {
            uri: app_link::create_app_link(
                &self.config.client_id,
                pair.challenge(),
                pair.method(),
                callback_url,
                &self.config.caller_identity,
                &self.config.redirect_uri,
                SDK_VERSION,
            ),
            category: PARTNER_AUTH_CATEGORY,
        })
    }

    /// Begin an attempt over the embedded web transport.
    pub fn create_web_view_request(&self, callback_url: &Url) -> Result<WebViewRequest, AuthError> {
        let pair = PkcePair::generate_with(self.digest.as_ref());
        self.store.put(pair.verifier())?;
        info!("created web view auth request");
        Ok(WebViewRequest {
            client_id: self.config.client_id.clone(),
            code_challenge: pair.challenge().to_owned(),
            code_challenge_method: pair.method(),
            redirect_uri: self.config.redirect_uri.clone(),
            callback_url: callback_url.clone(),
        })
    }

    /// Status literal carried by a returned callback URI, if recognizable.
    pub fn status_code(&self, callback: &Url) -> Option<AuthStatusCode> {
        app_link::auth_status_code(callback)
    }

    /// Full classification of a returned callback URI.
    pub fn parse_callback(&self, callback: &Url) -> Result<CallbackResult, AuthError> {
        app_link::parse_callback(callback)
    }

    /// Exchange a success callback for tokens using the stored verifier.
    ///
    /// Callers check the callback status first; this only requires the code
    /// to be present. A callback from an attempt whose verifier was since
    /// overwritten fails at the provider, not here.
    pub async fn token_payload(&self, callback: &Url) -> Result<TokenPayload, AuthError> {
        let code = app_link::require_auth_code(callback)?;
        let verifier = self.store.get()?;
        self.api
            .exchange_code(&code, &verifier, &self.config.client_id, &self.config.redirect_uri)
            .await
    }

    /// Obtain a fresh payload from a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPayload, AuthError> {
        self.api
            .refresh_token(refresh_token, &self.config.client_id)
            .await
    }

    /// Invalidate a session by its access token.
    pub async fn sign_out_by_access_token(&self, access_token: &str) -> Result<(), AuthError> {
        self.api
            .revoke(access_token, TokenKind::Access, &self.config.client_id)
            .await
    }

    /// Invalidate a session by its refresh token.
    pub async fn sign_out_by_refresh_token(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.api
            .revoke(refresh_token, TokenKind::Refresh, &self.config.client_id)
            .await
    }
}
