//! Database storage types and functions

use chrono::NaiveDateTime;
use sqlx::migrate::Migrator;
use uuid::Uuid;

use crate::entries::Entry;
use crate::entries::PublicEntry;
use crate::kind::Kind;
use crate::messages::Message;
use crate::messages::MessageRecipient;

/// Migrator to run migrations on startup
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// `SQLx` type for the kind of entries and messages
#[derive(PartialEq, Debug, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum KindType {
    /// Text
    Text,

    /// Video
    Video,
}

impl KindType {
    /// Create kind type from kind
    pub fn from_kind(kind: Kind) -> Self {
        match kind {
            Kind::Text => KindType::Text,
            Kind::Video => KindType::Video,
        }
    }

    /// Create kind from kind type
    pub fn to_kind(&self) -> Kind {
        match self {
            KindType::Text => Kind::Text,
            KindType::Video => Kind::Video,
        }
    }
}

/// `SQLx` version of entry
#[derive(sqlx::FromRow)]
pub struct SqlxEntry {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub entry_type: KindType,
    pub is_public: bool,
    pub video_url: Option<String>,
    pub entry_interval: i64,
    pub next_entry_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// `SQLx` version of a public entry, joined with its author
#[derive(sqlx::FromRow)]
pub struct SqlxPublicEntry {
    #[sqlx(flatten)]
    pub entry: SqlxEntry,
    pub author_name: String,
}

/// `SQLx` version of message, without recipients
#[derive(sqlx::FromRow)]
pub struct SqlxMessage {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub message_type: KindType,
    pub video_url: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Entry {
    /// Create entry from `SQLx` version
    pub fn from_sqlx_entry(entry: SqlxEntry) -> Self {
        Self {
            id: entry.id,
            author_id: entry.author_id,
            title: entry.title,
            content: entry.content,
            kind: entry.entry_type.to_kind(),
            is_public: entry.is_public,
            video_url: entry.video_url,
            entry_interval: entry.entry_interval,
            next_entry_date: entry.next_entry_date,
            created_at: entry.created_at,
        }
    }

    /// Maybe create entry from `SQLx` version
    pub fn from_sqlx_entry_optional(entry: Option<SqlxEntry>) -> Option<Self> {
        entry.map(Self::from_sqlx_entry)
    }

    /// Create multiple entries from `SQLx` version
    pub fn from_sqlx_entry_multiple(entries: Vec<SqlxEntry>) -> Vec<Self> {
        entries.into_iter().map(Self::from_sqlx_entry).collect()
    }
}

impl PublicEntry {
    /// Create multiple public entries from `SQLx` version
    pub fn from_sqlx_public_entry_multiple(entries: Vec<SqlxPublicEntry>) -> Vec<Self> {
        entries
            .into_iter()
            .map(|public_entry| Self {
                entry: Entry::from_sqlx_entry(public_entry.entry),
                author_name: public_entry.author_name,
            })
            .collect()
    }
}

impl Message {
    /// Create message from `SQLx` version and its recipients
    pub fn from_sqlx_message(message: SqlxMessage, recipients: Vec<MessageRecipient>) -> Self {
        Self {
            id: message.id,
            author_id: message.author_id,
            title: message.title,
            content: message.content,
            kind: message.message_type.to_kind(),
            video_url: message.video_url,
            created_at: message.created_at,
            recipients,
        }
    }

    /// Create multiple messages from `SQLx` version
    ///
    /// Recipients are matched to their message, recipients without a matching message are
    /// dropped
    pub fn from_sqlx_message_multiple(
        messages: Vec<SqlxMessage>,
        mut recipients: Vec<MessageRecipient>,
    ) -> Vec<Self> {
        messages
            .into_iter()
            .map(|message| {
                let (own, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut recipients)
                    .into_iter()
                    .partition(|recipient| recipient.message_id == message.id);
                recipients = rest;

                Self::from_sqlx_message(message, own)
            })
            .collect()
    }
}
