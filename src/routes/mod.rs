/// Router Module Index
///
/// Splits the storefront's routes into the three access tiers. Each tier is
/// wrapped by `create_router` with the gate it needs.
use crate::views::Layout;

/// Routes anyone may visit.
pub mod public;

/// Routes that need a signed-in user; anonymous visitors are sent to `/login`.
pub mod authenticated;

/// The back office under `/admin`, behind the role gate.
pub mod admin;

/// Path prefix of the back office.
pub const ADMIN_PREFIX: &str = "/admin";

/// RouteDef
///
/// One entry of the static navigation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub path: &'static str,
    pub view: &'static str,
    pub layout: Layout,
}

const fn page(path: &'static str, view: &'static str, layout: Layout) -> RouteDef {
    RouteDef { path, view, layout }
}

/// Every screen the storefront serves. `{id}` segments match any single segment.
pub const ROUTE_TABLE: &[RouteDef] = &[
    page("/", "home", Layout::Public),
    page("/shop", "shop", Layout::Public),
    page("/shop/{id}", "product_detail", Layout::Public),
    page("/events", "events", Layout::Public),
    page("/events/mine", "my_events", Layout::Public),
    page("/login", "login", Layout::Public),
    page("/register", "register", Layout::Public),
    page("/chat", "chat", Layout::Public),
    page("/chat/{id}", "chat_detail", Layout::Public),
    page("/admin", "admin_dashboard", Layout::Admin),
    page("/admin/categories", "admin_categories", Layout::Admin),
    page("/admin/products", "admin_products", Layout::Admin),
    page("/admin/products/{id}", "admin_product_detail", Layout::Admin),
];

fn matches(pattern: &str, path: &str) -> bool {
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with('{') && p.ends_with('}') && !s.is_empty() => {}
            (Some(p), Some(s)) if p == s => {}
            _ => return false,
        }
    }
}

/// Looks up the screen registered for `path` (query string ignored).
pub fn resolve(path: &str) -> Option<&'static RouteDef> {
    let path = path.split('?').next().unwrap_or_default();
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    ROUTE_TABLE.iter().find(|route| matches(route.path, path))
}

/// The shell for `path`: whatever the table says, and the admin shell for any
/// unregistered path under the back-office prefix.
pub fn layout_for(path: &str) -> Layout {
    match resolve(path) {
        Some(route) => route.layout,
        None => {
            let bare = path.split('?').next().unwrap_or_default();
            if bare == ADMIN_PREFIX || bare.starts_with("/admin/") {
                Layout::Admin
            } else {
                Layout::Public
            }
        }
    }
}
