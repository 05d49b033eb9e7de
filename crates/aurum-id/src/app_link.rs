use tracing::debug;
use url::Url;

use crate::error::AuthError;
use crate::pkce::CodeChallengeMethod;

/// Intent category the Aurum companion app registers for partner
/// authorization. Callers launching the app link must attach it so the link
/// cannot be claimed by an arbitrary browser.
pub const PARTNER_AUTH_CATEGORY: &str = "finance.aurum.partner.AURUM_APP";

const APP_LINK_BASE: &str = "https://www.aurum.finance/partner_auth";

const QUERY_CLIENT_ID: &str = "clientId";
const QUERY_CODE_CHALLENGE: &str = "code_challenge";
const QUERY_CODE_CHALLENGE_METHOD: &str = "code_challenge_method";
const QUERY_CALLBACK_URL: &str = "callback_url";
const QUERY_PACKAGE_NAME: &str = "package_name";
const QUERY_REDIRECT_URI: &str = "redirect_uri";
const QUERY_PARTNER_SDK_VERSION: &str = "partner_sdk_version";
const QUERY_AUTH_STATUS_CODE: &str = "auth_status_code";
const QUERY_CODE: &str = "code";

const STATUS_SUCCESS: &str = "success";
const STATUS_CANCELLED_BY_USER: &str = "cancelled_by_user";

/// Base link the companion app resolves; also the probe target for
/// [`AppLinkResolver`].
pub fn app_link_base() -> Url {
    Url::parse(APP_LINK_BASE).expect("static app link base parses")
}

/// Host-side probe answering whether an installed handler accepts the
/// partner authorization link under the given category.
///
/// A positive answer is a hint, not a guarantee: the handler can disappear
/// between probe and launch, so launch failures still need handling.
pub trait AppLinkResolver {
    fn can_handle(&self, uri: &Url, category: &str) -> bool;
}

/// Status literal carried back to the partner application when the provider
/// returns control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatusCode {
    Success,
    CancelledByUser,
}

/// Classified authorization callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    Success { code: String },
    Cancelled,
    /// The status parameter is absent or outside the recognized literals.
    /// The URI is not part of an authorization flow; ignore it.
    Unrecognized,
}

/// Build the authorization link the companion app consumes.
///
/// Parameter order matches what the companion app historically expects.
pub fn create_app_link(
    client_id: &str,
    code_challenge: &str,
    method: CodeChallengeMethod,
    callback_url: &Url,
    caller_identity: &str,
    redirect_uri: &str,
    sdk_version: &str,
) -> Url {
    let mut uri = app_link_base();
    uri.query_pairs_mut()
        .append_pair(QUERY_CLIENT_ID, client_id)
        .append_pair(QUERY_CODE_CHALLENGE, code_challenge)
        .append_pair(QUERY_CODE_CHALLENGE_METHOD, method.as_str())
        .append_pair(QUERY_CALLBACK_URL, callback_url.as_str())
        .append_pair(QUERY_PACKAGE_NAME, caller_identity)
        .append_pair(QUERY_REDIRECT_URI, redirect_uri)
        .append_pair(QUERY_PARTNER_SDK_VERSION, sdk_version);
    uri
}

fn query_param(uri: &Url, name: &str) -> Option<String> {
    uri.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Status carried by a callback URI, if any recognized literal is present.
pub fn auth_status_code(uri: &Url) -> Option<AuthStatusCode> {
    match query_param(uri, QUERY_AUTH_STATUS_CODE)?.as_str() {
        STATUS_SUCCESS => Some(AuthStatusCode::Success),
        STATUS_CANCELLED_BY_USER => Some(AuthStatusCode::CancelledByUser),
        _ => None,
    }
}

/// Authorization code carried by a callback URI.
pub fn auth_code(uri: &Url) -> Option<String> {
    query_param(uri, QUERY_CODE)
}

/// Authorization code from a success callback. The provider contract puts a
/// code on every success completion, so absence fails the current flow.
pub fn require_auth_code(uri: &Url) -> Result<String, AuthError> {
    auth_code(uri).ok_or(AuthError::MissingAuthorizationCode)
}

/// Classify a callback URI into success, cancellation, or noise.
pub fn parse_callback(uri: &Url) -> Result<CallbackResult, AuthError> {
    match auth_status_code(uri) {
        Some(AuthStatusCode::Success) => Ok(CallbackResult::Success {
            code: require_auth_code(uri)?,
        }),
        Some(AuthStatusCode::CancelledByUser) => Ok(CallbackResult::Cancelled),
        None => {
            debug!("callback carries no recognized auth status; ignoring");
            Ok(CallbackResult::Unrecognized)
        }
    }
}

/// Callback link announcing a successful completion with its code. Used by
/// the embedded web transport to re-enter the companion-app contract.
pub fn create_return_code_link(callback_url: &Url, code: &str) -> Url {
    let mut uri = callback_url.clone();
    uri.query_pairs_mut()
        .append_pair(QUERY_AUTH_STATUS_CODE, STATUS_SUCCESS)
        .append_pair(QUERY_CODE, code);
    uri
}

/// Callback link announcing a user cancellation.
pub fn create_return_cancel_link(callback_url: &Url) -> Url {
    let mut uri = callback_url.clone();
    uri.query_pairs_mut()
        .append_pair(QUERY_AUTH_STATUS_CODE, STATUS_CANCELLED_BY_USER);
    uri
}
