use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::session::{SessionRecord, UserInfo, string_or_number};

// --- Backend Entities (transient copies, camelCase on the wire) ---

/// Category
///
/// A product category as owned by the backend. Inactive categories stay listed in
/// the back office but disappear from the shop filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// ProductAsset
///
/// An image (or other media) attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductAsset {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Product
///
/// A secondhand item listed in the shop. Prices are whole đồng.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub assets: Vec<ProductAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[ts(type = "string")]
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub capacity: Option<i32>,
    #[serde(default)]
    pub registered_count: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EventRegistration {
    pub id: i64,
    pub event: Event,
    #[ts(type = "string")]
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub status: String,
}

/// Page
///
/// Paginated listing as returned by the backend. `number` is zero-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i32,
    pub number: i32,
    pub size: i32,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            number: 0,
            size: 0,
        }
    }
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ActiveStatusRequest {
    pub active: bool,
}

/// Credentials as forwarded to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginForm
///
/// What the login screen submits: credentials plus the path the gate recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

impl LoginForm {
    pub fn credentials(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        }
    }
}

/// `confirm_password` is checked locally and never sent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct EmailRequest {
    pub email: String,
}

pub type ResendOtpRequest = EmailRequest;
pub type ForgotPasswordRequest = EmailRequest;

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
    #[serde(default, skip_serializing)]
    pub confirm_password: String,
}

// --- Auth Responses ---

/// AuthResponse
///
/// Successful login (or verified registration). Carries everything the session
/// record is made of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "type", default)]
    pub token_type: String,
}

impl From<AuthResponse> for SessionRecord {
    fn from(auth: AuthResponse) -> Self {
        SessionRecord {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            user_info: UserInfo {
                user_id: auth.user_id,
                email: auth.email,
                roles: auth.roles,
                token_type: auth.token_type,
            },
        }
    }
}

/// Plain acknowledgement from the backend (OTP sent, password reset, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// AssetUpload
///
/// A file received from the back office, on its way to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
