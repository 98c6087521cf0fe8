//! Page models: what each screen receives to render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    chat::{Conversation, ConversationSummary},
    dates::{self, EventStatus},
    listing::{EventFilter, Pagination, ShopFilter},
    models::{Category, Event, EventRegistration, Product},
};

/// Which shell wraps a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Layout {
    Public,
    Admin,
}

/// PageView
///
/// Envelope of every screen response: shell, view name, optional one-shot notice
/// (e.g. the access-denied message), and the screen's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView<T> {
    pub layout: Layout,
    pub view: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub data: T,
}

impl<T> PageView<T> {
    /// Wraps `data` for the screen registered at `path`; the layout comes from the
    /// route table.
    pub fn for_path(path: &str, view: &str, data: T) -> Self {
        Self {
            layout: crate::routes::layout_for(path),
            view: view.to_string(),
            notice: None,
            data,
        }
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HomeView {
    pub signed_in_as: Option<String>,
    pub new_arrivals: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShopView {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub filter: ShopFilter,
    pub pagination: Pagination,
}

/// EventCard
///
/// An event with its schedule already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EventCard {
    pub event: Event,
    pub status: EventStatus,
    pub starts_at: String,
    pub days_until: i64,
    pub seats_left: Option<i32>,
}

impl EventCard {
    pub fn new(event: Event, now: DateTime<Utc>) -> Self {
        Self {
            status: dates::event_status(event.start_time, event.end_time, now),
            starts_at: dates::format_date_time(event.start_time),
            days_until: dates::days_until(event.start_time, now),
            seats_left: event
                .capacity
                .map(|capacity| (capacity - event.registered_count).max(0)),
            event,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EventsView {
    pub events: Vec<EventCard>,
    pub filter: EventFilter,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegistrationCard {
    pub registration: EventRegistration,
    pub card: EventCard,
    pub registered: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MyEventsView {
    pub registrations: Vec<RegistrationCard>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginView {
    /// Where to go after a successful login, as recorded by the access gate.
    pub redirect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterView {
    pub min_password_length: usize,
    pub otp_length: usize,
}

/// Result of `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResult {
    pub redirect_to: String,
    pub email: String,
    /// Canonical (upper-cased) role names.
    pub roles: Vec<String>,
}

/// SessionStatus
///
/// What the header bar needs to know about the visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionStatus {
    pub logged_in: bool,
    pub email: Option<String>,
    pub roles: Vec<String>,
    #[ts(type = "string | null")]
    pub token_expires_at: Option<DateTime<Utc>>,
    pub token_expired: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminSection {
    pub path: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminDashboardView {
    pub email: String,
    pub roles: Vec<String>,
    pub sections: Vec<AdminSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoriesView {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatListView {
    pub conversations: Vec<ConversationSummary>,
}

/// A conversation with each message's age pre-rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatView {
    pub conversation: Conversation,
    pub message_ages: Vec<String>,
}
