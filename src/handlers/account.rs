use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthSession,
    chat::ChatExchange,
    dates,
    error::{AppError, AppResult},
    listing::{EventFilter, EventQuery, Pagination},
    views::{ChatListView, ChatView, EventCard, MyEventsView, PageView, RegistrationCard},
};

/// my_events
///
/// [Authenticated Route] The signed-in user's event registrations.
#[utoipa::path(
    get,
    path = "/events/mine",
    params(EventQuery),
    responses(
        (status = 200, description = "My registrations page model"),
        (status = 303, description = "Not signed in; redirected to login")
    )
)]
pub async fn my_events(
    session: AuthSession,
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<PageView<MyEventsView>>> {
    let filter = EventFilter::from_query(query);
    let page = state
        .api
        .list_my_registrations(session.token(), &filter)
        .await?;
    let now = Utc::now();

    let view = MyEventsView {
        pagination: Pagination::from_page(&page),
        registrations: page
            .content
            .into_iter()
            .map(|registration| RegistrationCard {
                card: EventCard::new(registration.event.clone(), now),
                registered: dates::format_date(registration.registered_at),
                registration,
            })
            .collect(),
    };
    Ok(Json(PageView::for_path("/events/mine", "my_events", view)))
}

/// chat_list
///
/// [Authenticated Route] The user's support conversations, newest activity first.
#[utoipa::path(
    get,
    path = "/chat",
    responses((status = 200, description = "Conversation list page model"))
)]
pub async fn chat_list(
    session: AuthSession,
    State(state): State<AppState>,
) -> Json<PageView<ChatListView>> {
    let conversations = state.chat.list(session.owner()).await;
    Json(PageView::for_path(
        "/chat",
        "chat",
        ChatListView { conversations },
    ))
}

#[utoipa::path(
    get,
    path = "/chat/{id}",
    params(("id" = Uuid, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Conversation page model"),
        (status = 404, description = "No such conversation for this user")
    )
)]
pub async fn chat_detail(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PageView<ChatView>>> {
    let conversation = state
        .chat
        .get(session.owner(), id)
        .await
        .ok_or(AppError::NotFound)?;
    let now = Utc::now();
    let message_ages = conversation
        .messages
        .iter()
        .map(|m| dates::relative_time(m.sent_at, now))
        .collect();

    Ok(Json(PageView::for_path(
        &format!("/chat/{id}"),
        "chat_detail",
        ChatView {
            conversation,
            message_ages,
        },
    )))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub text: String,
}

/// chat_send
///
/// [Authenticated Route] Posts a message; the response arrives after the
/// simulated typing delay, together with the canned support reply.
#[utoipa::path(
    post,
    path = "/chat/{id}/messages",
    params(("id" = Uuid, Path, description = "Conversation ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message and reply", body = ChatExchange),
        (status = 422, description = "Empty or oversized message")
    )
)]
pub async fn chat_send(
    session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<ChatExchange>> {
    let exchange = state.chat.send(session.owner(), id, &payload.text).await?;
    Ok(Json(exchange))
}
