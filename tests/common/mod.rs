#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request};
use greenloop_storefront::{
    AppConfig, AppState, create_router,
    api::{ApiState, StorefrontApi},
    error::ApiError,
    listing::{EventFilter, ShopFilter},
    models::{
        AssetUpload, AuthResponse, Category, CategoryRequest, Event, EventRegistration,
        ForgotPasswordRequest, LoginRequest, MessageResponse, Page, Product, ProductAsset,
        RegisterRequest, ResendOtpRequest, ResetPasswordRequest, VerifyEmailRequest,
    },
    session::UserInfo,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::Serialize;
use std::sync::{Arc, Mutex};

// --- Stub Backend ---

/// StubApi
///
/// In-memory stand-in for the REST backend. Records every call so tests can
/// assert that validation failures never reach it.
#[derive(Default)]
pub struct StubApi {
    pub calls: Mutex<Vec<String>>,
    pub login_response: Option<AuthResponse>,
    pub fail_with: Option<(u16, String)>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

impl StubApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call.into());
        match &self.fail_with {
            Some((status, message)) => Err(ApiError::Backend {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn product_page(&self, filter: &ShopFilter) -> Page<Product> {
        Page {
            content: self.products.clone(),
            total_elements: self.products.len() as i64,
            total_pages: 1,
            number: filter.page as i32 - 1,
            size: filter.size as i32,
        }
    }
}

#[async_trait]
impl StorefrontApi for StubApi {
    async fn list_categories(&self, _token: Option<&str>) -> Result<Vec<Category>, ApiError> {
        self.record("list_categories")?;
        Ok(self.categories.clone())
    }
    async fn create_category(
        &self,
        token: &str,
        req: &CategoryRequest,
    ) -> Result<Category, ApiError> {
        self.record(format!("create_category:{token}:{}", req.name))?;
        Ok(Category {
            id: 99,
            name: req.name.clone(),
            description: req.description.clone(),
            active: true,
        })
    }
    async fn update_category(
        &self,
        _token: &str,
        id: i64,
        req: &CategoryRequest,
    ) -> Result<Category, ApiError> {
        self.record(format!("update_category:{id}"))?;
        Ok(Category {
            id,
            name: req.name.clone(),
            description: req.description.clone(),
            active: true,
        })
    }
    async fn set_category_active(
        &self,
        _token: &str,
        id: i64,
        active: bool,
    ) -> Result<Category, ApiError> {
        self.record(format!("set_category_active:{id}:{active}"))?;
        Ok(Category {
            id,
            name: "Áo khoác".to_string(),
            description: None,
            active,
        })
    }
    async fn list_products(
        &self,
        _token: Option<&str>,
        filter: &ShopFilter,
    ) -> Result<Page<Product>, ApiError> {
        self.record("list_products")?;
        Ok(self.product_page(filter))
    }
    async fn get_product(&self, _token: Option<&str>, id: i64) -> Result<Product, ApiError> {
        self.record(format!("get_product:{id}"))?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ApiError::Backend {
                status: 404,
                message: "Không tìm thấy sản phẩm".to_string(),
            })
    }
    async fn upload_product_asset(
        &self,
        _token: &str,
        product_id: i64,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError> {
        self.record(format!(
            "upload_product_asset:{product_id}:{}:{}",
            upload.file_name,
            upload.bytes.len()
        ))?;
        Ok(ProductAsset {
            id: 7,
            url: format!("https://cdn.test/{}", upload.file_name),
            kind: Some("IMAGE".to_string()),
        })
    }
    async fn replace_product_asset(
        &self,
        _token: &str,
        product_id: i64,
        asset_id: i64,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError> {
        self.record(format!("replace_product_asset:{product_id}:{asset_id}"))?;
        Ok(ProductAsset {
            id: asset_id,
            url: format!("https://cdn.test/{}", upload.file_name),
            kind: None,
        })
    }
    async fn delete_product_asset(
        &self,
        _token: &str,
        product_id: i64,
        asset_id: i64,
    ) -> Result<(), ApiError> {
        self.record(format!("delete_product_asset:{product_id}:{asset_id}"))
    }
    async fn list_events(
        &self,
        _token: Option<&str>,
        _filter: &EventFilter,
    ) -> Result<Page<Event>, ApiError> {
        self.record("list_events")?;
        Ok(Page::default())
    }
    async fn list_my_registrations(
        &self,
        token: &str,
        _filter: &EventFilter,
    ) -> Result<Page<EventRegistration>, ApiError> {
        self.record(format!("list_my_registrations:{token}"))?;
        Ok(Page::default())
    }
    async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.record(format!("register:{}", req.email))?;
        Ok(MessageResponse {
            message: Some("OTP sent".to_string()),
        })
    }
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.record(format!("login:{}", req.email))?;
        self.login_response.clone().ok_or(ApiError::Backend {
            status: 401,
            message: "Sai email hoặc mật khẩu".to_string(),
        })
    }
    async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<MessageResponse, ApiError> {
        self.record(format!("verify_email:{}:{}", req.email, req.otp))?;
        Ok(MessageResponse::default())
    }
    async fn resend_otp(&self, req: &ResendOtpRequest) -> Result<MessageResponse, ApiError> {
        self.record(format!("resend_otp:{}", req.email))?;
        Ok(MessageResponse::default())
    }
    async fn forgot_password(
        &self,
        req: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.record(format!("forgot_password:{}", req.email))?;
        Ok(MessageResponse::default())
    }
    async fn reset_password(
        &self,
        req: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.record(format!("reset_password:{}", req.email))?;
        Ok(MessageResponse::default())
    }
}

// --- Router Setup ---

pub fn app_with(stub: Arc<StubApi>) -> Router {
    app_with_config(stub, AppConfig::default())
}

pub fn app_with_config(stub: Arc<StubApi>, config: AppConfig) -> Router {
    let api = stub as ApiState;
    create_router(AppState::new(api, config))
}

// --- Cookies ---

fn encode_value(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// `Cookie` header value carrying a session with the given roles.
pub fn session_cookie(token: &str, roles: &[&str]) -> String {
    session_cookie_as("member@greenloop.vn", token, roles)
}

pub fn session_cookie_as(email: &str, token: &str, roles: &[&str]) -> String {
    let info = UserInfo {
        user_id: "42".to_string(),
        email: email.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        token_type: "Bearer".to_string(),
    };
    let info = serde_json::to_string(&info).unwrap();
    format!(
        "accessToken={}; refreshToken=refresh-1; userInfo={}",
        encode_value(token),
        encode_value(&info)
    )
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &impl Serialize) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// --- Tokens ---

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    exp: i64,
}

/// HS256 token expiring `offset_secs` from now (negative for already expired).
pub fn jwt_expiring_in(offset_secs: i64) -> String {
    let claims = TestClaims {
        sub: "42".to_string(),
        exp: chrono::Utc::now().timestamp() + offset_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

/// Token with the given header algorithm and a dummy signature. The storefront
/// never verifies signatures, so this is enough to exercise expiry parsing.
pub fn unsigned_jwt(alg: &str, exp: i64) -> String {
    use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
    let header = serde_json::json!({ "alg": alg, "typ": "JWT" });
    let claims = serde_json::json!({ "sub": "42", "exp": exp });
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"not-a-real-signature")
    )
}
