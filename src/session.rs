use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::roles::RoleSet;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Storage key of the JSON-serialized `UserInfo`.
pub const USER_INFO_KEY: &str = "userInfo";

/// UserInfo
///
/// The profile half of the session record, stored as JSON under `userInfo`.
/// `roles` keeps the backend's raw spelling; `role_set` is the canonical view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "type", default)]
    pub token_type: String,
}

impl UserInfo {
    pub fn role_set(&self) -> RoleSet {
        let (set, unknown) = RoleSet::from_names(&self.roles);
        if !unknown.is_empty() {
            tracing::debug!(?unknown, "Session carries roles outside the known set");
        }
        set
    }
}

// Backends disagree on whether ids are numbers or strings.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        Some(Id::Str(s)) => s,
        Some(Id::Num(n)) => n.to_string(),
        None => String::new(),
    })
}

/// SessionRecord
///
/// The locally cached token and profile bundle. A record only exists when the
/// access token is present and non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_info: UserInfo,
}

impl SessionRecord {
    pub fn role_set(&self) -> RoleSet {
        self.user_info.role_set()
    }
}

/// SessionStorage
///
/// A string key/value store standing in for the client's persistent storage.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String);
    fn remove_item(&mut self, key: &str);
}

/// MemoryStorage
///
/// In-process storage, used by tests and by anything that needs a session outside
/// an HTTP request.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// CookieStorage
///
/// The browser's persistent storage as seen from the server: one cookie per key.
/// Writes accumulate in the jar's delta and reach the client when the jar is
/// returned as part of the response.
#[derive(Debug, Clone, Default)]
pub struct CookieStorage {
    jar: CookieJar,
    secure: bool,
}

impl CookieStorage {
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }
}

impl SessionStorage for CookieStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.jar.get(key).map(|c| c.value().to_string())
    }

    fn set_item(&mut self, key: &str, value: String) {
        let cookie = Cookie::build((key.to_string(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .build();
        self.jar = std::mem::take(&mut self.jar).add(cookie);
    }

    fn remove_item(&mut self, key: &str) {
        let cookie = Cookie::build((key.to_string(), "")).path("/").build();
        self.jar = std::mem::take(&mut self.jar).remove(cookie);
    }
}

/// SessionProvider
///
/// The single owner of the session record. Every read and write of the three
/// storage keys goes through here.
#[derive(Debug, Clone, Default)]
pub struct SessionProvider<S> {
    storage: S,
}

impl<S: SessionStorage> SessionProvider<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the current record, or `None` when no non-empty access token is stored.
    /// A token without a readable `userInfo` still counts as a session, one with no roles.
    pub fn get_session(&self) -> Option<SessionRecord> {
        let access_token = self
            .storage
            .get_item(ACCESS_TOKEN_KEY)
            .filter(|t| !t.is_empty())?;

        let user_info = match self.storage.get_item(USER_INFO_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Stored userInfo is unreadable; treating as no roles");
                UserInfo::default()
            }),
            None => UserInfo::default(),
        };

        Some(SessionRecord {
            access_token,
            refresh_token: self
                .storage
                .get_item(REFRESH_TOKEN_KEY)
                .filter(|t| !t.is_empty()),
            user_info,
        })
    }

    pub fn set_session(&mut self, record: &SessionRecord) -> Result<(), serde_json::Error> {
        let user_info = serde_json::to_string(&record.user_info)?;
        self.storage
            .set_item(ACCESS_TOKEN_KEY, record.access_token.clone());
        match &record.refresh_token {
            Some(token) => self.storage.set_item(REFRESH_TOKEN_KEY, token.clone()),
            None => self.storage.remove_item(REFRESH_TOKEN_KEY),
        }
        self.storage.set_item(USER_INFO_KEY, user_info);
        Ok(())
    }

    pub fn clear_session(&mut self) {
        self.storage.remove_item(ACCESS_TOKEN_KEY);
        self.storage.remove_item(REFRESH_TOKEN_KEY);
        self.storage.remove_item(USER_INFO_KEY);
    }

    pub fn is_logged_in(&self) -> bool {
        self.get_session().is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
