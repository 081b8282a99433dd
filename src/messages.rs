use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::kind::Kind;

/// Message written by a user for one or more recipients
#[derive(Clone, Debug)]
pub struct Message {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: Kind,
    pub video_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub recipients: Vec<MessageRecipient>,
}

/// Link between a message and one of its recipients
///
/// Carries the public details of the recipient
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct MessageRecipient {
    pub id: Uuid,
    pub message_id: Uuid,
    pub recipient_id: Uuid,
    pub recipient_name: String,
    pub recipient_email: String,
}
