//! All things related to the storage of users, entries and messages

use core::fmt;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::QueryBuilder;
use sqlx::Sqlite;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use url::Url;
use uuid::Uuid;

pub use Config as DatabaseConfig;
pub use form_types::*;

use crate::entries::Entry;
use crate::entries::PublicEntry;
use crate::messages::Message;
use crate::messages::MessageRecipient;
use crate::users::User;
use crate::utils::env_var_or_else;
use types::KindType;
use types::MIGRATOR;
use types::SqlxEntry;
use types::SqlxMessage;
use types::SqlxPublicEntry;

mod form_types;
mod types;

/// Used when `DATABASE_URL` is not set
const DEFAULT_DATABASE_URL: &str = "sqlite://omega.db";

/// Emails bound in a single lookup query, SQLite limits the number of bind parameters
const MAX_EMAILS_PER_QUERY: usize = 500;

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),

    /// A unique constraint was violated
    Conflict(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
            Error::Conflict(error) => write!(f, "Conflict: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Database configuration
pub enum Config {
    /// Detect configuration from environment
    DetectConfig,

    /// Use existing connection
    #[cfg_attr(not(test), expect(dead_code))]
    ExistingConnection(SqlitePool),
}

/// SQLite storage
#[derive(Clone)]
pub struct Database {
    /// Pool of connections
    connection_pool: SqlitePool,
}

impl Database {
    /// Create a new SQLite storage
    pub async fn from_config(config: Config) -> Result<Self> {
        match config {
            Config::DetectConfig => Self::new().await,
            Config::ExistingConnection(pool) => Self::new_with_pool(pool).await,
        }
    }

    /// Create SQLite storage
    ///
    /// Use the `DATABASE_URL` environment variable, the database file is created when missing
    ///
    /// Migrations will be run
    async fn new() -> Result<Self> {
        let database_connection_string =
            env_var_or_else("DATABASE_URL", || DEFAULT_DATABASE_URL.to_string());

        let options = SqliteConnectOptions::from_str(&database_connection_string)
            .map_err(connection_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        let connection_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create SQLite storage with existing pool
    ///
    /// Migrations will be run
    async fn new_with_pool(connection_pool: SqlitePool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(Self { connection_pool })
    }
}

impl Database {
    /// Finds a single user by its ID
    pub async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, email, hashed_password, created_at
            FROM users
            WHERE id = ?
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    /// Finds a single user by its email address
    ///
    /// Emails are compared case-insensitive
    pub async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, name, email, hashed_password, created_at
            FROM users
            WHERE email = ?
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    /// Finds all users matching any of the email addresses
    ///
    /// Unknown addresses are skipped, every user is returned once, in the order of `emails`
    pub async fn find_all_users_by_emails(&self, emails: &[String]) -> Result<Vec<User>> {
        let mut users = Vec::new();

        for chunk in emails.chunks(MAX_EMAILS_PER_QUERY) {
            let mut query = QueryBuilder::<Sqlite>::new(
                r"
                SELECT id, name, email, hashed_password, created_at
                FROM users
                WHERE email IN (",
            );

            let mut separated = query.separated(", ");
            for email in chunk {
                separated.push_bind(email);
            }
            separated.push_unseparated(")");

            let found = query
                .build_query_as::<User>()
                .fetch_all(&self.connection_pool)
                .await
                .map_err(connection_error)?;

            users.extend(found);
        }

        // first position of every email, matching the ASCII-only `NOCASE` collation
        let positions = emails
            .iter()
            .enumerate()
            .rev()
            .map(|(position, email)| (email.to_ascii_lowercase(), position))
            .collect::<BTreeMap<_, _>>();

        users.sort_by_key(|user| positions.get(&user.email.to_ascii_lowercase()).copied());
        users.dedup_by_key(|user| user.id);

        Ok(users)
    }

    /// Create a single user
    ///
    /// A taken email address results in [`Error::Conflict`](Error::Conflict)
    pub async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, name, email, hashed_password, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, email, hashed_password, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.name)
        .bind(values.email)
        .bind(values.hashed_password)
        .bind(Utc::now().naive_utc())
        .fetch_one(&self.connection_pool)
        .await
        .map_err(write_error)?;

        Ok(user)
    }

    /// Create an entry
    pub async fn create_entry(&self, values: &CreateEntryValues<'_>) -> Result<Entry> {
        let entry = sqlx::query_as::<_, SqlxEntry>(
            r"
            INSERT INTO entries (
                id,
                author_id,
                title,
                content,
                entry_type,
                is_public,
                video_url,
                entry_interval,
                next_entry_date,
                created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                author_id,
                title,
                content,
                entry_type,
                is_public,
                video_url,
                entry_interval,
                next_entry_date,
                created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.title)
        .bind(values.content)
        .bind(KindType::from_kind(values.kind))
        .bind(values.is_public)
        .bind(values.video_url.map(Url::as_str))
        .bind(values.entry_interval)
        .bind(values.next_entry_date)
        .bind(values.created_at)
        .fetch_one(&self.connection_pool)
        .await
        .map(Entry::from_sqlx_entry)
        .map_err(write_error)?;

        Ok(entry)
    }

    /// Find all entries of an author, newest first
    pub async fn find_all_entries_by_author(&self, user: &User) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as::<_, SqlxEntry>(
            r"
            SELECT
                id,
                author_id,
                title,
                content,
                entry_type,
                is_public,
                video_url,
                entry_interval,
                next_entry_date,
                created_at
            FROM entries
            WHERE author_id = ?
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map(Entry::from_sqlx_entry_multiple)
        .map_err(connection_error)?;

        Ok(entries)
    }

    /// Find the most recent entry of an author
    pub async fn find_latest_entry_by_author(&self, user: &User) -> Result<Option<Entry>> {
        let entry = sqlx::query_as::<_, SqlxEntry>(
            r"
            SELECT
                id,
                author_id,
                title,
                content,
                entry_type,
                is_public,
                video_url,
                entry_interval,
                next_entry_date,
                created_at
            FROM entries
            WHERE author_id = ?
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(user.id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Entry::from_sqlx_entry_optional)
        .map_err(connection_error)?;

        Ok(entry)
    }

    /// Find all public entries of all authors, newest first
    pub async fn find_all_public_entries(&self) -> Result<Vec<PublicEntry>> {
        let entries = sqlx::query_as::<_, SqlxPublicEntry>(
            r"
            SELECT
                entries.id,
                entries.author_id,
                entries.title,
                entries.content,
                entries.entry_type,
                entries.is_public,
                entries.video_url,
                entries.entry_interval,
                entries.next_entry_date,
                entries.created_at,
                users.name AS author_name
            FROM entries
            INNER JOIN users ON users.id = entries.author_id
            WHERE entries.is_public = TRUE
            ORDER BY entries.created_at DESC, entries.rowid DESC
            ",
        )
        .fetch_all(&self.connection_pool)
        .await
        .map(PublicEntry::from_sqlx_public_entry_multiple)
        .map_err(connection_error)?;

        Ok(entries)
    }

    /// Create a message together with its recipient links
    ///
    /// Either everything is stored or nothing is
    pub async fn create_message(&self, values: &CreateMessageValues<'_>) -> Result<Message> {
        let mut transaction = self
            .connection_pool
            .begin()
            .await
            .map_err(connection_error)?;

        let message = sqlx::query_as::<_, SqlxMessage>(
            r"
            INSERT INTO messages (id, author_id, title, content, message_type, video_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, author_id, title, content, message_type, video_url, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.title)
        .bind(values.content)
        .bind(KindType::from_kind(values.kind))
        .bind(values.video_url.map(Url::as_str))
        .bind(Utc::now().naive_utc())
        .fetch_one(&mut *transaction)
        .await
        .map_err(write_error)?;

        let mut recipients = Vec::with_capacity(values.recipients.len());

        for recipient in values.recipients {
            let recipient_link = MessageRecipient {
                id: Uuid::new_v4(),
                message_id: message.id,
                recipient_id: recipient.id,
                recipient_name: recipient.name.clone(),
                recipient_email: recipient.email.clone(),
            };

            sqlx::query(
                r"
                INSERT INTO message_recipients (id, message_id, recipient_id)
                VALUES (?, ?, ?)
                ",
            )
            .bind(recipient_link.id)
            .bind(recipient_link.message_id)
            .bind(recipient_link.recipient_id)
            .execute(&mut *transaction)
            .await
            .map_err(write_error)?;

            recipients.push(recipient_link);
        }

        transaction.commit().await.map_err(connection_error)?;

        Ok(Message::from_sqlx_message(message, recipients))
    }

    /// Find all messages written by an author, newest first
    ///
    /// Recipients are included
    pub async fn find_all_messages_by_author(&self, user: &User) -> Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, SqlxMessage>(
            r"
            SELECT id, author_id, title, content, message_type, video_url, created_at
            FROM messages
            WHERE author_id = ?
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let recipients = sqlx::query_as::<_, MessageRecipient>(
            r"
            SELECT
                message_recipients.id,
                message_recipients.message_id,
                message_recipients.recipient_id,
                users.name AS recipient_name,
                users.email AS recipient_email
            FROM message_recipients
            INNER JOIN messages ON messages.id = message_recipients.message_id
            INNER JOIN users ON users.id = message_recipients.recipient_id
            WHERE messages.author_id = ?
            ORDER BY message_recipients.rowid
            ",
        )
        .bind(user.id)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(Message::from_sqlx_message_multiple(messages, recipients))
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}

/// Convert `SQLx` errors of writes, unique violations become conflicts
fn write_error(err: sqlx::Error) -> Error {
    match err.as_database_error() {
        Some(database_error) if database_error.is_unique_violation() => {
            Error::Conflict(database_error.message().to_string())
        }
        _ => connection_error(err),
    }
}
