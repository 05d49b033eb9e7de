use tracing::debug;
use url::Url;

use crate::api;
use crate::app_link;
use crate::error::AuthError;
use crate::pkce::CodeChallengeMethod;

/// Everything the embedded web transport needs for one authorization
/// attempt. Produced by the orchestrator; the host carries it to whatever
/// web surface the platform offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebViewRequest {
    pub client_id: String,
    pub code_challenge: String,
    pub code_challenge_method: CodeChallengeMethod,
    pub redirect_uri: String,
    /// Link the outcome is delivered on, identical in role to the native
    /// transport's callback.
    pub callback_url: Url,
}

/// Host adapter over the web surface's cookie manager.
pub trait SessionCookieStore {
    /// Drop session cookies set against `origin`.
    fn remove_session_cookies(&mut self, origin: &Url);
}

/// What the surface should do with an intercepted navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDirective {
    /// Not a completion; let the surface load the target.
    Open,
    /// The attempt is finished. Tear the surface down and deliver the
    /// outcome's callback exactly as a companion-app return would be.
    Complete(WebViewOutcome),
}

/// Terminal result of an embedded attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebViewOutcome {
    Success { callback: Url },
    Cancelled { callback: Url },
}

impl WebViewOutcome {
    /// Callback link to feed back into callback parsing.
    pub fn callback(&self) -> &Url {
        match self {
            WebViewOutcome::Success { callback } | WebViewOutcome::Cancelled { callback } => {
                callback
            }
        }
    }
}

/// Drives one authorization attempt through a host-owned web surface.
///
/// The host loads [`start_url`](Self::start_url), forwards every navigation
/// attempt to [`handle_navigation`](Self::handle_navigation), and reports
/// surface loss or user dismissal. The flow only classifies; it never touches
/// the surface itself. Platforms that deliver the same navigation through
/// more than one hook are fine: completion is idempotent.
pub struct WebViewAuthFlow<C> {
    request: WebViewRequest,
    cookies: C,
    start_url: Url,
    last_target: Url,
    outcome: Option<WebViewOutcome>,
}

impl<C: SessionCookieStore> WebViewAuthFlow<C> {
    pub fn new(request: WebViewRequest, cookies: C) -> Self {
        let start_url = api::web_view_auth_url(
            &request.client_id,
            &request.code_challenge,
            request.code_challenge_method,
            &request.redirect_uri,
        );
        Self {
            last_target: start_url.clone(),
            start_url,
            request,
            cookies,
            outcome: None,
        }
    }

    /// Authorization page the surface loads first.
    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    /// Classify a navigation attempt.
    ///
    /// Completion is any target whose string form starts with the configured
    /// redirect URI; the provider puts the code there, so its absence fails
    /// the flow. Before a success is signaled, session cookies of the last
    /// pre-redirect target are dropped so a later attempt in the same surface
    /// cannot ride this one's login session.
    pub fn handle_navigation(&mut self, target: &str) -> Result<NavigationDirective, AuthError> {
        if let Some(outcome) = &self.outcome {
            return Ok(NavigationDirective::Complete(outcome.clone()));
        }
        if !target.starts_with(&self.request.redirect_uri) {
            if let Ok(parsed) = Url::parse(target) {
                self.last_target = parsed;
            }
            return Ok(NavigationDirective::Open);
        }
        let redirect = Url::parse(target)?;
        let code = app_link::require_auth_code(&redirect)?;
        self.cookies.remove_session_cookies(&self.last_target);
        debug!("web authorization completed");
        let outcome = WebViewOutcome::Success {
            callback: app_link::create_return_code_link(&self.request.callback_url, &code),
        };
        self.outcome = Some(outcome.clone());
        Ok(NavigationDirective::Complete(outcome))
    }

    /// The surface's renderer or process went away. Indistinguishable from
    /// the user abandoning the attempt, so it cancels rather than errors.
    pub fn handle_render_process_gone(&mut self) -> WebViewOutcome {
        self.cancel()
    }

    /// Cancel the attempt (back navigation, dialog dismissal).
    pub fn cancel(&mut self) -> WebViewOutcome {
        if let Some(outcome) = &self.outcome {
            return outcome.clone();
        }
        debug!("web authorization cancelled");
        let outcome = WebViewOutcome::Cancelled {
            callback: app_link::create_return_cancel_link(&self.request.callback_url),
        };
        self.outcome = Some(outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app_link::{parse_callback, CallbackResult};

    #[derive(Clone, Default)]
    struct RecordingCookies {
        cleared: Rc<RefCell<Vec<Url>>>,
    }

    impl SessionCookieStore for RecordingCookies {
        fn remove_session_cookies(&mut self, origin: &Url) {
            self.cleared.borrow_mut().push(origin.clone());
        }
    }

    fn request() -> WebViewRequest {
        WebViewRequest {
            client_id: "c1".into(),
            code_challenge: "ch".into(),
            code_challenge_method: CodeChallengeMethod::S256,
            redirect_uri: "mobile://".into(),
            callback_url: Url::parse("https://partner.com/cb").unwrap(),
        }
    }

    fn flow() -> (WebViewAuthFlow<RecordingCookies>, Rc<RefCell<Vec<Url>>>) {
        let cookies = RecordingCookies::default();
        let cleared = cookies.cleared.clone();
        (WebViewAuthFlow::new(request(), cookies), cleared)
    }

    #[test]
    fn start_url_is_the_authorization_page() {
        let (flow, _) = flow();
        let url = flow.start_url();
        assert_eq!(url.host_str(), Some("id.aurum.finance"));
        assert_eq!(url.path(), "/auth/authorize");
        assert!(url.query().unwrap().contains("code_challenge=ch"));
        assert!(url.query().unwrap().contains("response_mode=query"));
    }

    #[test]
    fn foreign_navigation_is_opened() {
        let (mut flow, cleared) = flow();
        let directive = flow
            .handle_navigation("https://id.aurum.finance/login?step=2")
            .unwrap();
        assert_eq!(directive, NavigationDirective::Open);
        assert!(cleared.borrow().is_empty());
    }

    #[test]
    fn redirect_completes_with_companion_style_callback() {
        let (mut flow, _) = flow();
        let directive = flow.handle_navigation("mobile://?code=xyz").unwrap();
        let NavigationDirective::Complete(WebViewOutcome::Success { callback }) = directive else {
            panic!("expected success completion");
        };
        assert_eq!(
            callback.as_str(),
            "https://partner.com/cb?auth_status_code=success&code=xyz"
        );
        assert_eq!(
            parse_callback(&callback).unwrap(),
            CallbackResult::Success { code: "xyz".into() }
        );
    }

    #[test]
    fn success_clears_cookies_of_last_provider_page() {
        let (mut flow, cleared) = flow();
        flow.handle_navigation("https://id.aurum.finance/login")
            .unwrap();
        flow.handle_navigation("mobile://?code=xyz").unwrap();
        let cleared = cleared.borrow();
        assert_eq!(cleared.len(), 1);
        assert_eq!(cleared[0].as_str(), "https://id.aurum.finance/login");
    }

    #[test]
    fn without_navigation_the_start_page_cookies_are_cleared() {
        let (mut flow, cleared) = flow();
        let start = flow.start_url().clone();
        flow.handle_navigation("mobile://?code=xyz").unwrap();
        assert_eq!(cleared.borrow()[0], start);
    }

    #[test]
    fn redirect_without_code_fails_the_flow() {
        let (mut flow, cleared) = flow();
        let err = flow.handle_navigation("mobile://landing").unwrap_err();
        assert!(matches!(err, AuthError::MissingAuthorizationCode));
        assert!(cleared.borrow().is_empty());
    }

    #[test]
    fn duplicate_interception_hooks_are_idempotent() {
        let (mut flow, cleared) = flow();
        let first = flow.handle_navigation("mobile://?code=xyz").unwrap();
        let second = flow.handle_navigation("mobile://?code=xyz").unwrap();
        assert_eq!(first, second);
        // Cookies are invalidated once per attempt.
        assert_eq!(cleared.borrow().len(), 1);
    }

    #[test]
    fn cancel_returns_a_cancellation_callback() {
        let (mut flow, _) = flow();
        let WebViewOutcome::Cancelled { callback } = flow.cancel() else {
            panic!("expected cancellation");
        };
        assert_eq!(
            callback.as_str(),
            "https://partner.com/cb?auth_status_code=cancelled_by_user"
        );
        assert_eq!(parse_callback(&callback).unwrap(), CallbackResult::Cancelled);
    }

    #[test]
    fn renderer_loss_is_treated_as_cancellation() {
        let (mut flow, _) = flow();
        let outcome = flow.handle_render_process_gone();
        assert!(matches!(outcome, WebViewOutcome::Cancelled { .. }));
    }
}
