use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
};

use crate::{
    AppState,
    auth::AuthSession,
    error::{AppError, AppResult, FieldErrors},
    listing::{Pagination, ShopFilter, ShopQuery},
    models::{ActiveStatusRequest, AssetUpload, Category, CategoryRequest, Product, ProductAsset},
    validation,
    views::{AdminDashboardView, AdminSection, CategoriesView, PageView, ShopView},
};

const ADMIN_SECTIONS: &[(&str, &str)] = &[
    ("/admin/products", "Sản phẩm"),
    ("/admin/categories", "Danh mục"),
];

/// dashboard
///
/// [Admin Route] Back-office landing page.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Dashboard page model"),
        (status = 303, description = "Redirected by the access gate")
    )
)]
pub async fn dashboard(session: AuthSession) -> Json<PageView<AdminDashboardView>> {
    let view = AdminDashboardView {
        roles: session.0.role_set().names(),
        email: session.0.user_info.email,
        sections: ADMIN_SECTIONS
            .iter()
            .map(|(path, title)| AdminSection {
                path: path.to_string(),
                title: title.to_string(),
            })
            .collect(),
    };
    Json(PageView::for_path("/admin", "admin_dashboard", view))
}

// --- Categories ---

#[utoipa::path(
    get,
    path = "/admin/categories",
    responses((status = 200, description = "All categories, active or not"))
)]
pub async fn list_categories(
    session: AuthSession,
    State(state): State<AppState>,
) -> AppResult<Json<PageView<CategoriesView>>> {
    let categories = state.api.list_categories(Some(session.token())).await?;
    Ok(Json(PageView::for_path(
        "/admin/categories",
        "admin_categories",
        CategoriesView { categories },
    )))
}

fn trimmed(form: CategoryRequest) -> CategoryRequest {
    CategoryRequest {
        name: form.name.trim().to_string(),
        description: form
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 422, description = "Invalid form")
    )
)]
pub async fn create_category(
    session: AuthSession,
    State(state): State<AppState>,
    Json(form): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validation::validate_category(&form)?;
    let category = state
        .api
        .create_category(session.token(), &trimmed(form))
        .await?;
    tracing::info!(category_id = category.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    post,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses((status = 200, description = "Updated", body = Category))
)]
pub async fn update_category(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<CategoryRequest>,
) -> AppResult<Json<Category>> {
    validation::validate_category(&form)?;
    let category = state
        .api
        .update_category(session.token(), id, &trimmed(form))
        .await?;
    Ok(Json(category))
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}/active-status",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = ActiveStatusRequest,
    responses((status = 200, description = "Status changed", body = Category))
)]
pub async fn set_category_active(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ActiveStatusRequest>,
) -> AppResult<Json<Category>> {
    let category = state
        .api
        .set_category_active(session.token(), id, payload.active)
        .await?;
    tracing::info!(category_id = id, active = payload.active, "Category status changed");
    Ok(Json(category))
}

// --- Products ---

/// list_products
///
/// [Admin Route] Same listing as the shop, but every category is offered as a
/// filter and the page renders in the admin shell.
#[utoipa::path(
    get,
    path = "/admin/products",
    params(ShopQuery),
    responses((status = 200, description = "Admin product listing page model"))
)]
pub async fn list_products(
    session: AuthSession,
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> AppResult<Json<PageView<ShopView>>> {
    let filter = ShopFilter::from_query(query);
    let token = Some(session.token());
    let page = state.api.list_products(token, &filter).await?;
    let categories = state.api.list_categories(token).await?;

    let view = ShopView {
        pagination: Pagination::from_page(&page),
        products: page.content,
        categories,
        filter,
    };
    Ok(Json(PageView::for_path(
        "/admin/products",
        "admin_products",
        view,
    )))
}

#[utoipa::path(
    get,
    path = "/admin/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses((status = 200, description = "Admin product page model"))
)]
pub async fn product_detail(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PageView<Product>>> {
    let product = state.api.get_product(Some(session.token()), id).await?;
    Ok(Json(PageView::for_path(
        &format!("/admin/products/{id}"),
        "admin_product_detail",
        product,
    )))
}

fn upload_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Pulls the `file` field out of a multipart body. A missing or empty file is a
/// field error, reported before the backend is contacted.
async fn read_upload(mut multipart: Multipart) -> AppResult<AssetUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(upload_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(upload_error)?;
        if bytes.is_empty() {
            break;
        }
        return Ok(AssetUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let mut errors = FieldErrors::new();
    errors.insert("file", "Vui lòng chọn tệp để tải lên".to_string());
    Err(AppError::Validation(errors))
}

#[utoipa::path(
    post,
    path = "/admin/products/{id}/assets",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 201, description = "Uploaded", body = ProductAsset),
        (status = 413, description = "File larger than the configured limit"),
        (status = 422, description = "No file")
    )
)]
pub async fn upload_asset(
    session: AuthSession,
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProductAsset>)> {
    let upload = read_upload(multipart).await?;
    let asset = state
        .api
        .upload_product_asset(session.token(), product_id, upload)
        .await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

#[utoipa::path(
    put,
    path = "/admin/products/{id}/assets/{asset_id}",
    params(
        ("id" = i64, Path, description = "Product ID"),
        ("asset_id" = i64, Path, description = "Asset ID")
    ),
    responses((status = 200, description = "Replaced", body = ProductAsset))
)]
pub async fn replace_asset(
    session: AuthSession,
    State(state): State<AppState>,
    Path((product_id, asset_id)): Path<(i64, i64)>,
    multipart: Multipart,
) -> AppResult<Json<ProductAsset>> {
    let upload = read_upload(multipart).await?;
    let asset = state
        .api
        .replace_product_asset(session.token(), product_id, asset_id, upload)
        .await?;
    Ok(Json(asset))
}

#[utoipa::path(
    delete,
    path = "/admin/products/{id}/assets/{asset_id}",
    params(
        ("id" = i64, Path, description = "Product ID"),
        ("asset_id" = i64, Path, description = "Asset ID")
    ),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_asset(
    session: AuthSession,
    State(state): State<AppState>,
    Path((product_id, asset_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    state
        .api
        .delete_product_asset(session.token(), product_id, asset_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
