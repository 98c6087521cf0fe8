use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, FieldErrors};

pub const MAX_MESSAGE_LEN: usize = 1000;
pub const SUPPORT_CONVERSATION_TITLE: &str = "Hỗ trợ GreenLoop";
pub const DEFAULT_MAX_CONVERSATIONS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Sender {
    User,
    Support,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[ts(type = "string")]
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Conversation {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Row of the conversation list: title plus the latest message preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub last_message: Option<String>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Conversation> for ConversationSummary {
    fn from(c: &Conversation) -> Self {
        Self {
            id: c.id,
            title: c.title.clone(),
            last_message: c.messages.last().map(|m| m.text.clone()),
            updated_at: c.updated_at,
        }
    }
}

/// The user message as stored plus the support reply appended after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ChatExchange {
    pub sent: ChatMessage,
    pub reply: ChatMessage,
}

/// Picks the canned support reply for a user message.
pub fn canned_reply(text: &str) -> &'static str {
    let text = text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if mentions(&["đơn hàng", "giao hàng", "order", "ship"]) {
        "Bạn vui lòng cung cấp mã đơn hàng, nhân viên hỗ trợ sẽ kiểm tra tình trạng đơn cho bạn ngay."
    } else if mentions(&["quyên góp", "tặng", "donate", "điểm", "eco"]) {
        "Mỗi món đồ quyên góp được duyệt sẽ được cộng điểm Eco vào tài khoản. Bạn có thể dùng điểm Eco để đổi ưu đãi khi mua sắm."
    } else if mentions(&["sự kiện", "event", "đăng ký"]) {
        "Bạn có thể xem và đăng ký các sự kiện sắp diễn ra tại trang Sự kiện. Vé đã đăng ký nằm trong mục Sự kiện của tôi."
    } else {
        "Cảm ơn bạn đã liên hệ GreenLoop! Nhân viên hỗ trợ sẽ phản hồi bạn trong giây lát."
    }
}

/// ChatStore
///
/// Per-process conversation state for the chat-support screen. Conversations are
/// owned by the signed-in user's email; one user never sees another's.
///
/// Nothing is persisted and nothing is shared between processes. The store holds
/// at most `max_conversations`; opening one more evicts the conversation with the
/// oldest activity.
pub struct ChatStore {
    conversations: RwLock<HashMap<Uuid, Conversation>>,
    typing_delay: Duration,
    max_conversations: usize,
}

/// ChatState
///
/// The concrete type used to share the chat store across the application state.
pub type ChatState = Arc<ChatStore>;

impl ChatStore {
    pub fn new(typing_delay: Duration) -> Self {
        Self::with_capacity(typing_delay, DEFAULT_MAX_CONVERSATIONS)
    }

    pub fn with_capacity(typing_delay: Duration, max_conversations: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            typing_delay,
            max_conversations: max_conversations.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Conversations of `owner`, most recently active first. The support
    /// conversation is opened on first use.
    pub async fn list(&self, owner: &str) -> Vec<ConversationSummary> {
        self.ensure_support_conversation(owner).await;
        let conversations = self.conversations.read().await;
        let mut summaries: Vec<ConversationSummary> = conversations
            .values()
            .filter(|c| c.owner == owner)
            .map(ConversationSummary::from)
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    pub async fn get(&self, owner: &str, id: Uuid) -> Option<Conversation> {
        self.conversations
            .read()
            .await
            .get(&id)
            .filter(|c| c.owner == owner)
            .cloned()
    }

    /// Returns the id of the owner's support conversation, creating it if needed.
    pub async fn ensure_support_conversation(&self, owner: &str) -> Uuid {
        let mut conversations = self.conversations.write().await;
        if let Some(existing) = conversations
            .values()
            .find(|c| c.owner == owner && c.title == SUPPORT_CONVERSATION_TITLE)
        {
            return existing.id;
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            title: SUPPORT_CONVERSATION_TITLE.to_string(),
            messages: vec![ChatMessage {
                id: Uuid::new_v4(),
                sender: Sender::Support,
                text: "Xin chào! GreenLoop có thể giúp gì cho bạn?".to_string(),
                sent_at: now,
            }],
            updated_at: now,
        };
        let id = conversation.id;

        while conversations.len() >= self.max_conversations {
            let Some(stale) = conversations
                .values()
                .min_by_key(|c| c.updated_at)
                .map(|c| c.id)
            else {
                break;
            };
            conversations.remove(&stale);
            tracing::debug!(conversation = %stale, "Evicted least recently active conversation");
        }

        conversations.insert(id, conversation);
        id
    }

    /// Appends the user's message, waits out the typing delay, then appends the
    /// canned reply. The lock is not held during the delay.
    pub async fn send(&self, owner: &str, id: Uuid, text: &str) -> Result<ChatExchange, AppError> {
        let text = validate_message(text)?;

        let sent = ChatMessage {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.clone(),
            sent_at: Utc::now(),
        };
        self.append(owner, id, sent.clone()).await?;

        if !self.typing_delay.is_zero() {
            tokio::time::sleep(self.typing_delay).await;
        }

        let reply = ChatMessage {
            id: Uuid::new_v4(),
            sender: Sender::Support,
            text: canned_reply(&text).to_string(),
            sent_at: Utc::now(),
        };
        self.append(owner, id, reply.clone()).await?;

        tracing::debug!(conversation = %id, "Support reply appended");
        Ok(ChatExchange { sent, reply })
    }

    async fn append(&self, owner: &str, id: Uuid, message: ChatMessage) -> Result<(), AppError> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(&id)
            .filter(|c| c.owner == owner)
            .ok_or(AppError::NotFound)?;
        conversation.updated_at = message.sent_at;
        conversation.messages.push(message);
        Ok(())
    }
}

fn validate_message(text: &str) -> Result<String, AppError> {
    let text = text.trim();
    let mut errors = FieldErrors::new();
    if text.is_empty() {
        errors.insert("text", "Vui lòng nhập nội dung tin nhắn".to_string());
    } else if text.chars().count() > MAX_MESSAGE_LEN {
        errors.insert("text", format!("Tin nhắn tối đa {MAX_MESSAGE_LEN} ký tự"));
    }
    if errors.is_empty() {
        Ok(text.to_string())
    } else {
        Err(AppError::Validation(errors))
    }
}
