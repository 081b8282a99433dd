//! Entries API endpoints
//!
//! Journal entries of the current user and the public listing

use axum::Extension;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::database::CreateEntryValues;
use crate::database::Database;
use crate::entries::Entry;
use crate::entries::PublicEntry;
use crate::entries::can_create_entry;
use crate::entries::entry_interval;
use crate::entries::next_allowed_date;
use crate::kind::Kind;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::Success;
use super::request::parse_body;
use super::request::required;

/// Entry response going to the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    /// Entry ID
    pub id: Uuid,

    /// Author of the entry
    pub author_id: Uuid,

    /// Title
    pub title: String,

    /// Content, can be empty for videos
    pub content: String,

    /// Kind of entry
    #[serde(rename = "type")]
    pub kind: Kind,

    /// Visible on the public listing
    pub is_public: bool,

    /// Location of the video
    pub video_url: Option<String>,

    /// Days between this entry and the next
    pub entry_interval: i64,

    /// From when the next entry is allowed
    pub next_entry_date: DateTime<Utc>,

    /// Creation date
    pub created_at: DateTime<Utc>,
}

impl EntryResponse {
    /// Create a response from an [`Entry`](Entry)
    fn from_entry(entry: Entry) -> Self {
        Self {
            id: entry.id,
            author_id: entry.author_id,
            title: entry.title,
            content: entry.content,
            kind: entry.kind,
            is_public: entry.is_public,
            video_url: entry.video_url,
            entry_interval: entry.entry_interval,
            next_entry_date: entry.next_entry_date.and_utc(),
            created_at: entry.created_at.and_utc(),
        }
    }

    /// Create a response from multiple [`Entry`](Entry)s
    fn from_entry_multiple(entries: Vec<Entry>) -> Vec<Self> {
        entries.into_iter().map(Self::from_entry).collect()
    }
}

/// Author details shown on public entries
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    /// Display name of the author
    pub name: String,
}

/// Public entry response, with its author
#[derive(Debug, Serialize)]
pub struct PublicEntryResponse {
    #[serde(flatten)]
    pub entry: EntryResponse,

    pub author: AuthorResponse,
}

impl PublicEntryResponse {
    fn from_public_entry_multiple(entries: Vec<PublicEntry>) -> Vec<Self> {
        entries
            .into_iter()
            .map(|public_entry| Self {
                entry: EntryResponse::from_entry(public_entry.entry),
                author: AuthorResponse {
                    name: public_entry.author_name,
                },
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse<E>
where
    E: Serialize,
{
    entries: Vec<E>,
}

#[derive(Debug, Serialize)]
pub struct SingleEntryResponse {
    entry: EntryResponse,
}

/// List all entries of the current user, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/entries
/// ```
///
/// Response:
/// ```json
/// { "entries": [ { "id": "<uuid>", "title": "Day one", ... } ] }
/// ```
pub async fn list(
    Extension(database): Extension<Database>,
    current_user: CurrentUser,
) -> Result<Success<EntriesResponse<EntryResponse>>, Error> {
    let entries = database
        .find_all_entries_by_author(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(EntriesResponse {
        entries: EntryResponse::from_entry_multiple(entries),
    }))
}

/// List all public entries of everybody, newest first
///
/// No token needed
///
/// Request:
/// ```sh
/// curl -v http://localhost:6000/entries/public
/// ```
///
/// Response:
/// ```json
/// { "entries": [ { "id": "<uuid>", ..., "author": { "name": "Ada" } } ] }
/// ```
pub async fn list_public(
    Extension(database): Extension<Database>,
) -> Result<Success<EntriesResponse<PublicEntryResponse>>, Error> {
    let entries = database
        .find_all_public_entries()
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(EntriesResponse {
        entries: PublicEntryResponse::from_public_entry_multiple(entries),
    }))
}

/// Entry status of the current user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatusResponse {
    /// Is a new entry allowed right now
    can_create_entry: bool,

    /// From when the next entry is allowed, `null` without entries
    next_entry_date: Option<DateTime<Utc>>,
}

/// Can the current user write a new entry?
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/entries/status
/// ```
///
/// Response:
/// ```json
/// { "canCreateEntry": false, "nextEntryDate": "2026-11-17T10:00:00Z" }
/// ```
pub async fn status(
    Extension(database): Extension<Database>,
    current_user: CurrentUser,
) -> Result<Success<EntryStatusResponse>, Error> {
    let last_entry = database
        .find_latest_entry_by_author(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(EntryStatusResponse {
        can_create_entry: can_create_entry(last_entry.as_ref(), Utc::now().naive_utc()),
        next_entry_date: last_entry.map(|entry| entry.next_entry_date.and_utc()),
    }))
}

/// Create entry form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryForm {
    /// Title of the entry
    title: Option<String>,
    /// Content, required for text entries
    content: Option<String>,
    /// Kind of entry
    #[serde(rename = "type")]
    kind: Option<Kind>,
    /// Show the entry on the public listing, private by default
    is_public: Option<bool>,
    /// Days until the next entry is allowed, 30 by default
    entry_interval: Option<i64>,
    /// Location of the video, required for video entries
    video_url: Option<String>,
}

/// Create an entry based on the [`CreateEntryForm`](CreateEntryForm) form
///
/// Only allowed once the interval of the previous entry has passed
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Day one", "content": "Dear diary", "type": "text", "entryInterval": 5 }' \
///     http://localhost:6000/entries
/// ```
///
/// Response
/// ```json
/// { "entry": { "id": "<uuid>", "title": "Day one", ... } }
/// ```
pub async fn create(
    Extension(database): Extension<Database>,
    current_user: CurrentUser,
    Form(form): Form<CreateEntryForm>,
) -> Result<Success<SingleEntryResponse>, Error> {
    let (Some(title), Some(kind)) = (required(form.title), form.kind) else {
        return Err(Error::bad_request("Title and type are required"));
    };

    let body = parse_body(kind, form.content, form.video_url, "entries")?;

    let entry_interval = entry_interval(form.entry_interval)
        .map_err(|_| Error::bad_request("Entry interval must be at least 1 day"))?;

    let now = Utc::now().naive_utc();

    let next_entry_date = next_allowed_date(now, entry_interval)
        .ok_or_else(|| Error::bad_request("Entry interval is too large"))?;

    let last_entry = database
        .find_latest_entry_by_author(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    if let Some(last_entry) = last_entry.filter(|entry| !can_create_entry(Some(entry), now)) {
        let allowed_from = last_entry
            .next_entry_date
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        return Err(Error::bad_request("Next entry is not allowed yet")
            .with_description(format!("Next entry allowed from {allowed_from}")));
    }

    let values = CreateEntryValues {
        user: &current_user,
        title: &title,
        content: &body.content,
        kind,
        is_public: form.is_public.unwrap_or(false),
        video_url: body.video_url.as_ref(),
        entry_interval,
        next_entry_date,
        created_at: now,
    };

    let entry = database
        .create_entry(&values)
        .await
        .map_err(Error::internal_server_error)?;

    tracing::debug!("User {} created entry {}", current_user.id, entry.id);

    Ok(Success::ok(SingleEntryResponse {
        entry: EntryResponse::from_entry(entry),
    }))
}
