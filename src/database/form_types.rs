//! Form types

use chrono::NaiveDateTime;
use url::Url;

use crate::kind::Kind;
use crate::users::User;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// Display name
    pub name: &'a str,

    /// Email address, unique across users
    pub email: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create an Entry
pub struct CreateEntryValues<'a> {
    /// The author of the entry
    pub user: &'a User,

    /// Title of the entry
    pub title: &'a str,

    /// Content of the entry, can be empty for videos
    pub content: &'a str,

    /// Kind of entry
    pub kind: Kind,

    /// Visible on the public listing
    pub is_public: bool,

    /// Location of the video, if any
    pub video_url: Option<&'a Url>,

    /// Days until the next entry is allowed
    pub entry_interval: i64,

    /// From when the next entry is allowed
    pub next_entry_date: NaiveDateTime,

    /// Creation date
    pub created_at: NaiveDateTime,
}

/// Values to create a Message
pub struct CreateMessageValues<'a> {
    /// The author of the message
    pub user: &'a User,

    /// Title of the message
    pub title: &'a str,

    /// Content of the message, can be empty for videos
    pub content: &'a str,

    /// Kind of message
    pub kind: Kind,

    /// Location of the video, if any
    pub video_url: Option<&'a Url>,

    /// Users receiving the message, at least one
    pub recipients: &'a [User],
}
