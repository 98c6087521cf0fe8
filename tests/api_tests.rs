use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use greenloop_storefront::{
    HttpStorefrontApi, StorefrontApi,
    error::{ApiError, GENERIC_ERROR_MESSAGE},
    listing::{ShopFilter, ShopQuery},
    models::{ActiveStatusRequest, AssetUpload, CategoryRequest, LoginRequest, ResendOtpRequest},
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::net::TcpListener;

// --- Mock Backend ---

type Seen = Arc<Mutex<Vec<String>>>;

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

async fn products(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    seen.lock()
        .unwrap()
        .push(format!("GET /products {} {}", bearer(&headers), pairs.join("&")));
    Json(json!({
        "content": [{ "id": 5, "name": "Túi vải", "price": 45000, "status": "AVAILABLE" }],
        "totalElements": 13,
        "totalPages": 2,
        "number": 1,
        "size": 12
    }))
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] == "secret1" {
        Json(json!({
            "accessToken": "jwt-a",
            "refreshToken": "jwt-r",
            "userId": 77,
            "email": body["email"],
            "roles": ["CUSTOMER"],
            "type": "Bearer"
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Sai email hoặc mật khẩu" })),
        )
            .into_response()
    }
}

async fn create_category(Json(body): Json<Value>) -> impl IntoResponse {
    (
        StatusCode::CONFLICT,
        Json(json!({ "message": format!("Danh mục {} đã tồn tại", body["name"].as_str().unwrap_or_default()) })),
    )
}

async fn set_active(
    Path(id): Path<i64>,
    Json(body): Json<ActiveStatusRequest>,
) -> Json<Value> {
    Json(json!({ "id": id, "name": "Sách", "active": body.active }))
}

async fn upload(
    State(seen): State<Seen>,
    Path(product_id): Path<i64>,
    mut multipart: Multipart,
) -> Json<Value> {
    let field = multipart.next_field().await.unwrap().unwrap();
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let bytes = field.bytes().await.unwrap();
    seen.lock().unwrap().push(format!(
        "UPLOAD {product_id} {name} {file_name} {content_type} {}",
        bytes.len()
    ));
    Json(json!({ "id": 3, "url": format!("https://cdn.greenloop.vn/{file_name}") }))
}

async fn spawn_backend() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let api = Router::new()
        .route("/products", get(products))
        .route("/auth/login", post(login))
        // Acknowledged with an empty body.
        .route("/auth/resend-otp", post(|| async { StatusCode::OK }))
        .route(
            "/categories",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "stack trace") })
                .post(create_category),
        )
        .route("/categories/{id}/active-status", put(set_active))
        .route("/products/{id}/assets", post(upload))
        .route(
            "/products/{id}/assets/{asset_id}",
            delete(|| async { StatusCode::NO_CONTENT }),
        )
        .with_state(seen.clone());
    let router = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://127.0.0.1:{port}/api/"), seen)
}

fn client(base_url: &str) -> HttpStorefrontApi {
    HttpStorefrontApi::new(base_url, Duration::from_secs(5)).expect("client")
}

// --- Tests ---

#[tokio::test]
async fn test_list_products_sends_filter_and_bearer() {
    let (base_url, seen) = spawn_backend().await;
    let api = client(&base_url);

    let filter = ShopFilter::from_query(ShopQuery {
        page: Some(2),
        category: Some("4".to_string()),
        search: Some(" túi ".to_string()),
        sort: Some("price_desc".to_string()),
        ..ShopQuery::default()
    });
    let page = api.list_products(Some("tok-1"), &filter).await.unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(page.content[0].name, "Túi vải");
    assert_eq!(page.total_elements, 13);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["GET /products Bearer tok-1 categoryId=4&page=1&search=túi&size=12&sort=price,desc"]
    );
}

#[tokio::test]
async fn test_login_decodes_numeric_user_id() {
    let (base_url, _) = spawn_backend().await;
    let api = client(&base_url);

    let auth = api
        .login(&LoginRequest {
            email: "an@greenloop.vn".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(auth.user_id, "77");
    assert_eq!(auth.access_token, "jwt-a");
    assert_eq!(auth.token_type, "Bearer");
}

#[tokio::test]
async fn test_backend_error_field_is_used_as_message() {
    let (base_url, _) = spawn_backend().await;
    let api = client(&base_url);

    let err = api
        .login(&LoginRequest {
            email: "an@greenloop.vn".to_string(),
            password: "nope".to_string(),
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Backend { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Sai email hoặc mật khẩu");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = api
        .create_category(
            "tok",
            &CategoryRequest {
                name: "Sách".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Danh mục Sách đã tồn tại");
}

#[tokio::test]
async fn test_unreadable_error_body_falls_back_to_generic_message() {
    let (base_url, _) = spawn_backend().await;
    let err = client(&base_url).list_categories(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Backend { status: 500, .. }));
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_empty_acknowledgement_decodes() {
    let (base_url, _) = spawn_backend().await;
    let ack = client(&base_url)
        .resend_otp(&ResendOtpRequest {
            email: "an@greenloop.vn".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn test_set_category_active_uses_put() {
    let (base_url, _) = spawn_backend().await;
    let category = client(&base_url)
        .set_category_active("tok", 9, false)
        .await
        .unwrap();
    assert_eq!(category.id, 9);
    assert!(!category.active);
}

#[tokio::test]
async fn test_asset_upload_and_delete() {
    let (base_url, seen) = spawn_backend().await;
    let api = client(&base_url);

    let asset = api
        .upload_product_asset(
            "tok",
            12,
            AssetUpload {
                file_name: "bag.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![1, 2, 3, 4],
            },
        )
        .await
        .unwrap();
    assert_eq!(asset.url, "https://cdn.greenloop.vn/bag.png");
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["UPLOAD 12 file bag.png image/png 4"]
    );

    api.delete_product_asset("tok", 12, 3).await.unwrap();
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Port 9 (discard) is closed on test machines.
    let err = HttpStorefrontApi::new("http://127.0.0.1:9/api", Duration::from_secs(2))
        .unwrap()
        .list_categories(None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}
