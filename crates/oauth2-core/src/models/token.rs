use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An issued grant as the OAuth2 server sees it.
///
/// One token may carry an authorization code, an access token and a refresh token at
/// the same time (e.g. the authorization-code exchange issues access + refresh on one
/// object). A key counts as present when its string is non-empty.
///
/// Lifetimes (`*_expires_in`) are persisted as whole milliseconds, matching the
/// `BIGINT` columns; any sub-millisecond remainder is dropped when the token is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub client_id: String,
    pub user_id: String,
    pub redirect_uri: String,
    pub scope: String,

    pub code: String,
    pub code_challenge: String,
    pub code_challenge_method: String,
    pub code_create_at: Option<DateTime<Utc>>,
    #[serde(with = "duration_millis")]
    pub code_expires_in: Duration,

    pub access: String,
    pub access_create_at: Option<DateTime<Utc>>,
    #[serde(with = "duration_millis")]
    pub access_expires_in: Duration,

    pub refresh: String,
    pub refresh_create_at: Option<DateTime<Utc>>,
    #[serde(with = "duration_millis")]
    pub refresh_expires_in: Duration,
}

impl Token {
    pub fn new(client_id: String, user_id: String, redirect_uri: String, scope: String) -> Self {
        Self {
            client_id,
            user_id,
            redirect_uri,
            scope,
            ..Self::default()
        }
    }

    pub fn with_code(mut self, code: String, create_at: DateTime<Utc>, expires_in: Duration) -> Self {
        self.code = code;
        self.code_create_at = Some(create_at);
        self.code_expires_in = expires_in;
        self
    }

    pub fn with_access(
        mut self,
        access: String,
        create_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        self.access = access;
        self.access_create_at = Some(create_at);
        self.access_expires_in = expires_in;
        self
    }

    pub fn with_refresh(
        mut self,
        refresh: String,
        create_at: DateTime<Utc>,
        expires_in: Duration,
    ) -> Self {
        self.refresh = refresh;
        self.refresh_create_at = Some(create_at);
        self.refresh_expires_in = expires_in;
        self
    }

    pub fn code_expires_at(&self) -> Option<DateTime<Utc>> {
        expires_at(&self.code, self.code_create_at, self.code_expires_in)
    }

    pub fn access_expires_at(&self) -> Option<DateTime<Utc>> {
        expires_at(&self.access, self.access_create_at, self.access_expires_in)
    }

    pub fn refresh_expires_at(&self) -> Option<DateTime<Utc>> {
        expires_at(&self.refresh, self.refresh_create_at, self.refresh_expires_in)
    }
}

fn expires_at(
    key: &str,
    create_at: Option<DateTime<Utc>>,
    expires_in: Duration,
) -> Option<DateTime<Utc>> {
    if key.is_empty() {
        return None;
    }
    let ttl = chrono::Duration::from_std(expires_in).ok()?;
    create_at?.checked_add_signed(ttl)
}

/// Durations travel as whole milliseconds in the stored payload; sub-millisecond
/// precision is truncated and values beyond `u64::MAX` ms saturate.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
