//! Messages API endpoints
//!
//! Messages written by the current user to other users

use std::collections::BTreeSet;

use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::database::CreateMessageValues;
use crate::database::Database;
use crate::kind::Kind;
use crate::messages::Message;
use crate::messages::MessageRecipient;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::Success;
use super::request::parse_body;
use super::request::required;
use super::users::UserResponse;

/// Public details of a recipient
#[derive(Debug, Serialize)]
pub struct RecipientDetailsResponse {
    pub name: String,
    pub email: String,
}

/// Recipient link of a message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResponse {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub recipient: RecipientDetailsResponse,
}

impl RecipientResponse {
    fn from_message_recipient(recipient: MessageRecipient) -> Self {
        Self {
            id: recipient.id,
            recipient_id: recipient.recipient_id,
            recipient: RecipientDetailsResponse {
                name: recipient.recipient_name,
                email: recipient.recipient_email,
            },
        }
    }
}

/// Message response going to the user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    /// Message ID
    pub id: Uuid,

    /// Author of the message
    pub author_id: Uuid,

    /// Title
    pub title: String,

    /// Content, can be empty for videos
    pub content: String,

    /// Kind of message
    #[serde(rename = "type")]
    pub kind: Kind,

    /// Location of the video
    pub video_url: Option<String>,

    /// Creation date
    pub created_at: DateTime<Utc>,

    /// Everybody receiving the message
    pub recipients: Vec<RecipientResponse>,
}

impl MessageResponse {
    /// Create a response from a [`Message`](Message)
    fn from_message(message: Message) -> Self {
        Self {
            id: message.id,
            author_id: message.author_id,
            title: message.title,
            content: message.content,
            kind: message.kind,
            video_url: message.video_url,
            created_at: message.created_at.and_utc(),
            recipients: message
                .recipients
                .into_iter()
                .map(RecipientResponse::from_message_recipient)
                .collect(),
        }
    }

    /// Create a response from multiple [`Message`](Message)s
    fn from_message_multiple(messages: Vec<Message>) -> Vec<Self> {
        messages.into_iter().map(Self::from_message).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    user: UserResponse,
    messages: Vec<MessageResponse>,
}

#[derive(Debug, Serialize)]
pub struct SingleMessageResponse {
    message: MessageResponse,
}

/// List all messages written by the current user, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:6000/messages
/// ```
///
/// Response:
/// ```json
/// { "user": { "id": "<uuid>", ... }, "messages": [ { "id": "<uuid>", "recipients": [ ... ] } ] }
/// ```
pub async fn list(
    Extension(database): Extension<Database>,
    current_user: CurrentUser,
) -> Result<Success<MessagesResponse>, Error> {
    let messages = database
        .find_all_messages_by_author(&current_user)
        .await
        .map_err(Error::internal_server_error)?;

    Ok(Success::ok(MessagesResponse {
        user: UserResponse::from_user(&current_user),
        messages: MessageResponse::from_message_multiple(messages),
    }))
}

/// Create message form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageForm {
    /// Title of the message
    title: Option<String>,
    /// Content, required for text messages
    content: Option<String>,
    /// Kind of message
    #[serde(rename = "type")]
    kind: Option<Kind>,
    /// Email addresses of the recipients, unknown addresses are skipped
    recipient_emails: Option<Vec<String>>,
    /// Location of the video, required for video messages
    video_url: Option<String>,
}

/// Create a message based on the [`CreateMessageForm`](CreateMessageForm) form
///
/// At least one of the recipient emails has to belong to a user
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Hi", "content": "Hello!", "type": "text", "recipientEmails": ["bob@example.com"] }' \
///     http://localhost:6000/messages
/// ```
///
/// Response
/// ```json
/// { "message": { "id": "<uuid>", "title": "Hi", "recipients": [ ... ] } }
/// ```
pub async fn create(
    Extension(database): Extension<Database>,
    current_user: CurrentUser,
    Form(form): Form<CreateMessageForm>,
) -> Result<Success<SingleMessageResponse>, Error> {
    // every address once, compared like the `NOCASE` email column
    let mut seen_emails = BTreeSet::new();
    let recipient_emails = form
        .recipient_emails
        .unwrap_or_default()
        .into_iter()
        .filter_map(|email| required(Some(email)))
        .filter(|email| seen_emails.insert(email.to_ascii_lowercase()))
        .collect::<Vec<String>>();

    let (Some(title), Some(kind)) = (required(form.title), form.kind) else {
        return Err(Error::bad_request("Title, type, and recipients are required"));
    };

    if recipient_emails.is_empty() {
        return Err(Error::bad_request("Title, type, and recipients are required"));
    }

    let body = parse_body(kind, form.content, form.video_url, "messages")?;

    let recipients = database
        .find_all_users_by_emails(&recipient_emails)
        .await
        .map_err(Error::internal_server_error)?;

    if recipients.is_empty() {
        return Err(Error::bad_request("No valid recipients found"));
    }

    let values = CreateMessageValues {
        user: &current_user,
        title: &title,
        content: &body.content,
        kind,
        video_url: body.video_url.as_ref(),
        recipients: &recipients,
    };

    let message = database
        .create_message(&values)
        .await
        .map_err(Error::internal_server_error)?;

    tracing::debug!(
        "User {} sent message {} to {} recipient(s)",
        current_user.id,
        message.id,
        message.recipients.len()
    );

    Ok(Success::ok(SingleMessageResponse {
        message: MessageResponse::from_message(message),
    }))
}
