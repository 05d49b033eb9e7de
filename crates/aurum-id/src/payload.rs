use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Token material issued by a successful token-endpoint response.
///
/// The crate holds no token state; the host application decides where this
/// lands (keychain, encrypted prefs) and when to refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// User identity in JWT form; not issued for every client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    pub refresh_token: String,
}

impl TokenPayload {
    /// Instant the access token expires, given the receipt time the caller
    /// recorded when the payload arrived.
    pub fn expires_at(&self, received_at: DateTime<Utc>) -> DateTime<Utc> {
        received_at + Duration::seconds(self.expires_in)
    }
}
