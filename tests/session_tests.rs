use axum::http::{HeaderMap, HeaderValue, header};
use axum_extra::extract::cookie::CookieJar;
use greenloop_storefront::{
    models::AuthResponse,
    roles::Role,
    session::{
        ACCESS_TOKEN_KEY, CookieStorage, MemoryStorage, REFRESH_TOKEN_KEY, SessionProvider,
        SessionRecord, SessionStorage, USER_INFO_KEY, UserInfo,
    },
};

fn sample_record() -> SessionRecord {
    SessionRecord {
        access_token: "access-1".to_string(),
        refresh_token: Some("refresh-1".to_string()),
        user_info: UserInfo {
            user_id: "42".to_string(),
            email: "an@greenloop.vn".to_string(),
            roles: vec!["Staff".to_string(), "CUSTOMER".to_string()],
            token_type: "Bearer".to_string(),
        },
    }
}

// --- MemoryStorage ---

#[test]
fn test_set_then_get_returns_same_record() {
    let mut provider = SessionProvider::new(MemoryStorage::new());
    assert!(!provider.is_logged_in());

    provider.set_session(&sample_record()).unwrap();
    assert!(provider.is_logged_in());
    assert_eq!(provider.get_session(), Some(sample_record()));

    let roles: Vec<Role> = provider.get_session().unwrap().role_set().known().collect();
    assert_eq!(roles, vec![Role::Customer, Role::Staff]);
}

#[test]
fn test_clear_session_removes_all_three_keys() {
    let mut provider = SessionProvider::new(MemoryStorage::new());
    provider.set_session(&sample_record()).unwrap();
    provider.clear_session();

    assert_eq!(provider.get_session(), None);
    let storage = provider.storage();
    assert!(storage.get_item(ACCESS_TOKEN_KEY).is_none());
    assert!(storage.get_item(REFRESH_TOKEN_KEY).is_none());
    assert!(storage.get_item(USER_INFO_KEY).is_none());
}

#[test]
fn test_missing_refresh_token_removes_stale_one() {
    let mut provider = SessionProvider::new(MemoryStorage::new());
    provider.set_session(&sample_record()).unwrap();

    let record = SessionRecord {
        refresh_token: None,
        ..sample_record()
    };
    provider.set_session(&record).unwrap();

    assert!(provider.storage().get_item(REFRESH_TOKEN_KEY).is_none());
    assert_eq!(provider.get_session().unwrap().refresh_token, None);
}

#[test]
fn test_empty_access_token_is_no_session() {
    let mut storage = MemoryStorage::new();
    storage.set_item(ACCESS_TOKEN_KEY, String::new());
    storage.set_item(USER_INFO_KEY, r#"{"roles":["ADMIN"]}"#.to_string());

    assert_eq!(SessionProvider::new(storage).get_session(), None);
}

#[test]
fn test_corrupt_user_info_means_no_roles() {
    let mut storage = MemoryStorage::new();
    storage.set_item(ACCESS_TOKEN_KEY, "access-1".to_string());
    storage.set_item(USER_INFO_KEY, "{not json".to_string());

    let session = SessionProvider::new(storage).get_session().unwrap();
    assert_eq!(session.access_token, "access-1");
    assert_eq!(session.user_info, UserInfo::default());
    assert!(session.role_set().is_empty());
}

#[test]
fn test_user_info_accepts_numeric_id_and_type_key() {
    let info: UserInfo = serde_json::from_str(
        r#"{"userId":15,"email":"a@b.vn","roles":["admin","ROOT"],"type":"Bearer"}"#,
    )
    .unwrap();
    assert_eq!(info.user_id, "15");
    assert_eq!(info.token_type, "Bearer");
    // Unknown role names stay in the canonical view, upper-cased.
    let roles = info.role_set();
    assert_eq!(roles.iter().collect::<Vec<_>>(), vec!["ADMIN", "ROOT"]);
    assert_eq!(roles.known().collect::<Vec<_>>(), vec![Role::Admin]);
}

#[test]
fn test_auth_response_becomes_session_record() {
    let auth: AuthResponse = serde_json::from_str(
        r#"{"accessToken":"a","refreshToken":"r","userId":"u-1","email":"x@y.vn","roles":["SUPPORT_STAFF"],"type":"Bearer"}"#,
    )
    .unwrap();
    let record = SessionRecord::from(auth);
    assert_eq!(record.access_token, "a");
    assert_eq!(record.refresh_token.as_deref(), Some("r"));
    assert_eq!(record.user_info.user_id, "u-1");
    assert!(record.role_set().contains(Role::SupportStaff));
}

// --- CookieStorage ---

#[test]
fn test_cookie_storage_writes_http_only_cookies() {
    let mut provider = SessionProvider::new(CookieStorage::new(CookieJar::new(), true));
    provider.set_session(&sample_record()).unwrap();

    let jar = provider.into_storage().into_jar();
    let access = jar.get(ACCESS_TOKEN_KEY).unwrap();
    assert_eq!(access.value(), "access-1");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(access.secure(), Some(true));
    assert_eq!(access.path(), Some("/"));

    let info: UserInfo = serde_json::from_str(jar.get(USER_INFO_KEY).unwrap().value()).unwrap();
    assert_eq!(info, sample_record().user_info);
}

#[test]
fn test_cookie_storage_reads_percent_encoded_request_cookies() {
    let info = serde_json::to_string(&sample_record().user_info).unwrap();
    let encoded: String = url::form_urlencoded::byte_serialize(info.as_bytes()).collect();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_str(&format!(
            "accessToken=access-1; refreshToken=refresh-1; userInfo={encoded}"
        ))
        .unwrap(),
    );

    let jar = CookieJar::from_headers(&headers);
    let session = SessionProvider::new(CookieStorage::new(jar, false))
        .get_session()
        .unwrap();
    assert_eq!(session, sample_record());
}

#[test]
fn test_cookie_storage_clear_removes_cookies() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        HeaderValue::from_static("accessToken=access-1; userInfo=%7B%7D"),
    );
    let jar = CookieJar::from_headers(&headers);

    let mut provider = SessionProvider::new(CookieStorage::new(jar, false));
    assert!(provider.is_logged_in());
    provider.clear_session();
    assert!(!provider.is_logged_in());
}
