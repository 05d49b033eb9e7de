use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::SDK_VERSION;
use crate::error::{AuthError, RevokeApiError, RevokeErrorCode, TokenApiError, TokenErrorCode};
use crate::payload::TokenPayload;
use crate::pkce::CodeChallengeMethod;

const PROVIDER_HOST: &str = "https://id.aurum.finance";
const AUTHORIZE_PATH: &str = "auth/authorize";

const HEADER_SSO_NO_ADAPTER: &str = "X-SSO-No-Adapter";

const FIELD_GRANT_TYPE: &str = "grant_type";
const FIELD_CODE: &str = "code";
const FIELD_REDIRECT_URI: &str = "redirect_uri";
const FIELD_VENDOR: &str = "vendor";
const FIELD_CODE_VERIFIER: &str = "code_verifier";
const FIELD_CLIENT_ID: &str = "client_id";
const FIELD_CLIENT_VERSION: &str = "client_version";
const FIELD_REFRESH_TOKEN: &str = "refresh_token";
const FIELD_TOKEN: &str = "token";
const FIELD_TOKEN_TYPE_HINT: &str = "token_type_hint";
const FIELD_CODE_CHALLENGE: &str = "code_challenge";
const FIELD_CODE_CHALLENGE_METHOD: &str = "code_challenge_method";
const FIELD_RESPONSE_TYPE: &str = "response_type";
const FIELD_RESPONSE_MODE: &str = "response_mode";

const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
const GRANT_REFRESH_TOKEN: &str = "refresh_token";
const RESPONSE_TYPE_CODE: &str = "code";
const RESPONSE_MODE_QUERY: &str = "query";

/// Vendor discriminator the provider expects from this SDK family.
const VENDOR: &str = "aurum_mobile";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = "aurum-id/0.1.0";

/// Which token a revoke call names in `token_type_hint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    fn type_hint(self) -> &'static str {
        match self {
            TokenKind::Access => "access_token",
            TokenKind::Refresh => "refresh_token",
        }
    }
}

/// Token and revoke endpoint addressing; overridable for tests.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub token_url: Url,
    pub revoke_url: Url,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_url: Url::parse("https://id.aurum.finance/auth/token")
                .expect("valid token endpoint"),
            revoke_url: Url::parse("https://id.aurum.finance/auth/revoke")
                .expect("valid revoke endpoint"),
        }
    }
}

/// Authorization-page URL loaded by the embedded web transport.
pub fn web_view_auth_url(
    client_id: &str,
    code_challenge: &str,
    method: CodeChallengeMethod,
    redirect_uri: &str,
) -> Url {
    let mut url = Url::parse(PROVIDER_HOST).expect("valid provider host");
    url.set_path(AUTHORIZE_PATH);
    url.query_pairs_mut()
        .append_pair(FIELD_CLIENT_ID, client_id)
        .append_pair(FIELD_CODE_CHALLENGE, code_challenge)
        .append_pair(FIELD_CODE_CHALLENGE_METHOD, method.as_str())
        .append_pair(FIELD_REDIRECT_URI, redirect_uri)
        .append_pair(FIELD_RESPONSE_TYPE, RESPONSE_TYPE_CODE)
        .append_pair(FIELD_RESPONSE_MODE, RESPONSE_MODE_QUERY);
    url
}

/// HTTP client for the provider's token and revoke endpoints.
///
/// Stateless between calls. Every operation is a single request with no
/// retries; dropping the returned future aborts the request, which is how a
/// caller cancels an in-flight exchange.
#[derive(Debug, Clone)]
pub struct PartnerTokenClient {
    http: Client,
    endpoints: Endpoints,
}

impl PartnerTokenClient {
    /// Client against the fixed provider endpoints, with 60 s connect and
    /// overall timeouts.
    pub fn new() -> Result<Self, AuthError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(REQUEST_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoints: Endpoints::default(),
        })
    }

    /// Swap in a host-configured HTTP client (proxies, trust material).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Redirect token traffic, primarily at a mock server in tests.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Exchange an authorization code and its verifier for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        client_id: &str,
        redirect_uri: &str,
    ) -> Result<TokenPayload, AuthError> {
        debug!("exchanging authorization code");
        let form = [
            (FIELD_GRANT_TYPE, GRANT_AUTHORIZATION_CODE),
            (FIELD_CODE, code),
            (FIELD_REDIRECT_URI, redirect_uri),
            (FIELD_VENDOR, VENDOR),
            (FIELD_CODE_VERIFIER, code_verifier),
            (FIELD_CLIENT_ID, client_id),
            (FIELD_CLIENT_VERSION, SDK_VERSION),
        ];
        let response = self
            .post(self.endpoints.token_url.clone(), client_id, &form)
            .await?;
        Self::handle_token_response(response).await
    }

    /// Trade a refresh token for a fresh payload. No verifier is involved.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
        client_id: &str,
    ) -> Result<TokenPayload, AuthError> {
        debug!("refreshing token");
        let form = [
            (FIELD_GRANT_TYPE, GRANT_REFRESH_TOKEN),
            (FIELD_REFRESH_TOKEN, refresh_token),
            (FIELD_VENDOR, VENDOR),
            (FIELD_CLIENT_ID, client_id),
            (FIELD_CLIENT_VERSION, SDK_VERSION),
        ];
        let response = self
            .post(self.endpoints.token_url.clone(), client_id, &form)
            .await?;
        Self::handle_token_response(response).await
    }

    /// Revoke a token. Any 2xx means revoked; the response body is ignored.
    pub async fn revoke(
        &self,
        token: &str,
        kind: TokenKind,
        client_id: &str,
    ) -> Result<(), AuthError> {
        debug!(kind = kind.type_hint(), "revoking token");
        let form = [(FIELD_TOKEN, token), (FIELD_TOKEN_TYPE_HINT, kind.type_hint())];
        let response = self
            .post(self.endpoints.revoke_url.clone(), client_id, &form)
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        warn!(status = %status, "revoke endpoint rejected the request");
        let error = parse_error_body(response)
            .await
            .map(|(code, message)| RevokeApiError {
                code: RevokeErrorCode::from_provider(&code),
                message,
            });
        Err(AuthError::RevokeEndpoint { status, error })
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: Url,
        client_id: &str,
        form: &T,
    ) -> Result<Response, AuthError> {
        let response = self
            .http
            .post(url)
            .basic_auth(client_id, Some(""))
            .header(reqwest::header::ACCEPT, "application/json")
            .header(HEADER_SSO_NO_ADAPTER, "true")
            .form(form)
            .send()
            .await?;
        Ok(response)
    }

    async fn handle_token_response(response: Response) -> Result<TokenPayload, AuthError> {
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "token endpoint rejected the request");
            let error = parse_error_body(response)
                .await
                .map(|(code, message)| TokenApiError {
                    code: TokenErrorCode::from_provider(&code),
                    message,
                });
            return Err(AuthError::TokenEndpoint { status, error });
        }
        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    error_message: Option<String>,
}

/// Best-effort read of the provider's error shape. `None` when the body is
/// missing, unreadable, or not the documented JSON.
async fn parse_error_body(response: Response) -> Option<(String, Option<String>)> {
    let text = response.text().await.ok()?;
    let body: ErrorBody = serde_json::from_str(&text).ok()?;
    Some((body.error?, body.error_message))
}
