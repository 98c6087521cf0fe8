use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

use crate::models::Page;

pub const DEFAULT_SHOP_PAGE_SIZE: u32 = 12;
pub const MAX_SHOP_PAGE_SIZE: u32 = 48;
pub const DEFAULT_EVENT_PAGE_SIZE: u32 = 9;
pub const MAX_EVENT_PAGE_SIZE: u32 = 30;
const PAGE_WINDOW: u32 = 5;

/// ShopQuery
///
/// Raw query parameters of `GET /shop` and `GET /admin/products`. Everything is
/// optional; `ShopFilter::from_query` turns it into a usable filter.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ShopQuery {
    /// One-based page number.
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Category id, or `all`.
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    /// `newest`, `price_asc`, `price_desc` or `name_asc`.
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ShopSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
}

impl ShopSort {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "price_asc" => ShopSort::PriceAsc,
            "price_desc" => ShopSort::PriceDesc,
            "name_asc" => ShopSort::NameAsc,
            _ => ShopSort::Newest,
        }
    }

    /// Backend `sort` parameter, `field,direction`.
    pub fn as_backend_param(self) -> &'static str {
        match self {
            ShopSort::Newest => "createdAt,desc",
            ShopSort::PriceAsc => "price,asc",
            ShopSort::PriceDesc => "price,desc",
            ShopSort::NameAsc => "name,asc",
        }
    }
}

/// ShopFilter
///
/// Normalised shop listing state, echoed back to the screen so its controls can
/// show what is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShopFilter {
    pub page: u32,
    pub size: u32,
    pub category_id: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort: ShopSort,
}

impl Default for ShopFilter {
    fn default() -> Self {
        Self::from_query(ShopQuery::default())
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ShopFilter {
    pub fn from_query(query: ShopQuery) -> Self {
        let category_id = non_blank(query.category)
            .filter(|c| !c.eq_ignore_ascii_case("all"))
            .and_then(|c| c.parse().ok());

        Self {
            page: query.page.unwrap_or(1).max(1),
            size: query
                .size
                .unwrap_or(DEFAULT_SHOP_PAGE_SIZE)
                .clamp(1, MAX_SHOP_PAGE_SIZE),
            category_id,
            status: non_blank(query.status).map(|s| s.to_ascii_uppercase()),
            search: non_blank(query.search),
            sort: query.sort.as_deref().map(ShopSort::parse).unwrap_or_default(),
        }
    }

    /// Query pairs for `GET /products`. The backend pages from zero.
    pub fn backend_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", (self.page - 1).to_string()),
            ("size", self.size.to_string()),
            ("sort", self.sort.as_backend_param().to_string()),
        ];
        if let Some(category_id) = self.category_id {
            params.push(("categoryId", category_id.to_string()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.clone()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct EventQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EventFilter {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::from_query(EventQuery::default())
    }
}

impl EventFilter {
    pub fn from_query(query: EventQuery) -> Self {
        Self {
            page: query.page.unwrap_or(1).max(1),
            size: query
                .size
                .unwrap_or(DEFAULT_EVENT_PAGE_SIZE)
                .clamp(1, MAX_EVENT_PAGE_SIZE),
            search: non_blank(query.search),
        }
    }

    pub fn backend_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", (self.page - 1).to_string()),
            ("size", self.size.to_string()),
        ];
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        params
    }
}

/// Pagination
///
/// Pager state for a listing screen, one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub has_prev: bool,
    pub has_next: bool,
    /// Up to five page numbers around the current page.
    pub pages: Vec<u32>,
}

impl Pagination {
    pub fn new(current_page: u32, total_pages: u32, total_items: u64) -> Self {
        let current_page = current_page.max(1);
        let pages = if total_pages == 0 {
            Vec::new()
        } else {
            let half = PAGE_WINDOW / 2;
            let last_start = total_pages.saturating_sub(PAGE_WINDOW - 1).max(1);
            let start = current_page.saturating_sub(half).clamp(1, last_start);
            let end = (start + PAGE_WINDOW - 1).min(total_pages);
            (start..=end).collect()
        };

        Self {
            current_page,
            total_pages,
            total_items,
            has_prev: current_page > 1,
            has_next: current_page < total_pages,
            pages,
        }
    }

    /// Pager for a backend page, whose `number` is zero-based.
    pub fn from_page<T>(page: &Page<T>) -> Self {
        Self::new(
            u32::try_from(page.number).unwrap_or(0) + 1,
            u32::try_from(page.total_pages).unwrap_or(0),
            u64::try_from(page.total_elements).unwrap_or(0),
        )
    }
}
