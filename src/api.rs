use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, multipart};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{ApiError, GENERIC_ERROR_MESSAGE},
    listing::{EventFilter, ShopFilter},
    models::{
        ActiveStatusRequest, AssetUpload, AuthResponse, Category, CategoryRequest, Event,
        EventRegistration, ForgotPasswordRequest, LoginRequest, MessageResponse, Page, Product,
        ProductAsset, RegisterRequest, ResendOtpRequest, ResetPasswordRequest, VerifyEmailRequest,
    },
};

/// StorefrontApi
///
/// Contract of the GreenLoop REST backend as the storefront consumes it. Handlers
/// only see this trait, so tests can swap in a stub without a network.
///
/// `token` is the session's access token; calls that need one take `&str`, calls
/// that work anonymously but benefit from one take `Option<&str>`.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    // --- Categories ---
    async fn list_categories(&self, token: Option<&str>) -> Result<Vec<Category>, ApiError>;
    async fn create_category(&self, token: &str, req: &CategoryRequest)
    -> Result<Category, ApiError>;
    async fn update_category(
        &self,
        token: &str,
        id: i64,
        req: &CategoryRequest,
    ) -> Result<Category, ApiError>;
    async fn set_category_active(
        &self,
        token: &str,
        id: i64,
        active: bool,
    ) -> Result<Category, ApiError>;

    // --- Products ---
    async fn list_products(
        &self,
        token: Option<&str>,
        filter: &ShopFilter,
    ) -> Result<Page<Product>, ApiError>;
    async fn get_product(&self, token: Option<&str>, id: i64) -> Result<Product, ApiError>;

    // --- Product Assets (multipart) ---
    async fn upload_product_asset(
        &self,
        token: &str,
        product_id: i64,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError>;
    async fn replace_product_asset(
        &self,
        token: &str,
        product_id: i64,
        asset_id: i64,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError>;
    async fn delete_product_asset(
        &self,
        token: &str,
        product_id: i64,
        asset_id: i64,
    ) -> Result<(), ApiError>;

    // --- Events ---
    async fn list_events(
        &self,
        token: Option<&str>,
        filter: &EventFilter,
    ) -> Result<Page<Event>, ApiError>;
    async fn list_my_registrations(
        &self,
        token: &str,
        filter: &EventFilter,
    ) -> Result<Page<EventRegistration>, ApiError>;

    // --- Auth ---
    async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError>;
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<MessageResponse, ApiError>;
    async fn resend_otp(&self, req: &ResendOtpRequest) -> Result<MessageResponse, ApiError>;
    async fn forgot_password(
        &self,
        req: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError>;
    async fn reset_password(&self, req: &ResetPasswordRequest)
    -> Result<MessageResponse, ApiError>;
}

/// ApiState
///
/// The concrete type used to share backend access across the application state.
pub type ApiState = Arc<dyn StorefrontApi>;

/// HttpStorefrontApi
///
/// `StorefrontApi` over HTTP with reqwest. One client, shared connection pool.
#[derive(Clone)]
pub struct HttpStorefrontApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStorefrontApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = check_status(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        // Acknowledgements sometimes come back with an empty body.
        let body: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        query: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::GET, path, token).query(query))
            .await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(self.request(Method::POST, path, token).json(body))
            .await
    }

    async fn send_asset(
        &self,
        method: Method,
        path: &str,
        token: &str,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError> {
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)?;
        let form = multipart::Form::new().part("file", part);
        self.send_json(self.request(method, path, Some(token)).multipart(form))
            .await
    }
}

/// Maps non-2xx responses to `ApiError::Backend`, keeping the backend's own
/// `message` when the body carries one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string());

    Err(ApiError::Backend {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn list_categories(&self, token: Option<&str>) -> Result<Vec<Category>, ApiError> {
        self.get("/categories", token, &[]).await
    }

    async fn create_category(
        &self,
        token: &str,
        req: &CategoryRequest,
    ) -> Result<Category, ApiError> {
        self.post("/categories", Some(token), req).await
    }

    // The backend updates categories with POST, not PUT.
    async fn update_category(
        &self,
        token: &str,
        id: i64,
        req: &CategoryRequest,
    ) -> Result<Category, ApiError> {
        self.post(&format!("/categories/{id}"), Some(token), req)
            .await
    }

    async fn set_category_active(
        &self,
        token: &str,
        id: i64,
        active: bool,
    ) -> Result<Category, ApiError> {
        let builder = self
            .request(
                Method::PUT,
                &format!("/categories/{id}/active-status"),
                Some(token),
            )
            .json(&ActiveStatusRequest { active });
        self.send_json(builder).await
    }

    async fn list_products(
        &self,
        token: Option<&str>,
        filter: &ShopFilter,
    ) -> Result<Page<Product>, ApiError> {
        self.get("/products", token, &filter.backend_params()).await
    }

    async fn get_product(&self, token: Option<&str>, id: i64) -> Result<Product, ApiError> {
        self.get(&format!("/products/{id}"), token, &[]).await
    }

    async fn upload_product_asset(
        &self,
        token: &str,
        product_id: i64,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError> {
        self.send_asset(
            Method::POST,
            &format!("/products/{product_id}/assets"),
            token,
            upload,
        )
        .await
    }

    async fn replace_product_asset(
        &self,
        token: &str,
        product_id: i64,
        asset_id: i64,
        upload: AssetUpload,
    ) -> Result<ProductAsset, ApiError> {
        self.send_asset(
            Method::PUT,
            &format!("/products/{product_id}/assets/{asset_id}"),
            token,
            upload,
        )
        .await
    }

    async fn delete_product_asset(
        &self,
        token: &str,
        product_id: i64,
        asset_id: i64,
    ) -> Result<(), ApiError> {
        let builder = self.request(
            Method::DELETE,
            &format!("/products/{product_id}/assets/{asset_id}"),
            Some(token),
        );
        check_status(builder.send().await?).await?;
        Ok(())
    }

    async fn list_events(
        &self,
        token: Option<&str>,
        filter: &EventFilter,
    ) -> Result<Page<Event>, ApiError> {
        self.get("/events", token, &filter.backend_params()).await
    }

    async fn list_my_registrations(
        &self,
        token: &str,
        filter: &EventFilter,
    ) -> Result<Page<EventRegistration>, ApiError> {
        self.get(
            "/events/my-registrations",
            Some(token),
            &filter.backend_params(),
        )
        .await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        self.post("/auth/register", None, req).await
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post("/auth/login", None, req).await
    }

    async fn verify_email(&self, req: &VerifyEmailRequest) -> Result<MessageResponse, ApiError> {
        self.post("/auth/verify-email", None, req).await
    }

    async fn resend_otp(&self, req: &ResendOtpRequest) -> Result<MessageResponse, ApiError> {
        self.post("/auth/resend-otp", None, req).await
    }

    async fn forgot_password(
        &self,
        req: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post("/auth/forgot-password", None, req).await
    }

    async fn reset_password(
        &self,
        req: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post("/auth/reset-password", None, req).await
    }
}
