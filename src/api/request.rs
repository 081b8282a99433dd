//! API request helpers

use axum::extract::FromRequest;
use axum::extract::Json;
use axum::extract::Request;
use axum::extract::rejection::JsonRejection;
use serde::de::DeserializeOwned;
use url::Url;

use crate::kind::Kind;

use super::Error;

/// Parse and validate a URL
///
/// ```rust,ignore
/// let url = "https://www.example.com/";
/// assert!(parse_url(url).is_ok())
/// ```
pub fn parse_url<I>(url: I) -> Result<Url, Error>
where
    I: AsRef<str>,
{
    Url::parse(url.as_ref())
        .map_err(|err| Error::bad_request("Invalid video URL").with_description(err))
}

/// Get a required, non-blank text field, trimmed
pub fn required(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Validated body of an entry or message
#[derive(Debug)]
pub struct Body {
    /// Content, empty for videos without content
    pub content: String,

    /// Location of the video, only for videos
    pub video_url: Option<Url>,
}

/// Validate the body fields against the kind
///
/// Text requires content, video requires a valid URL. `subject` names the thing in errors,
/// like `entries`.
pub fn parse_body(
    kind: Kind,
    content: Option<String>,
    video_url: Option<String>,
    subject: &str,
) -> Result<Body, Error> {
    match kind {
        Kind::Text => {
            // content keeps its whitespace
            let content = content
                .filter(|content| !content.trim().is_empty())
                .ok_or_else(|| {
                    Error::bad_request(format!("Content is required for text {subject}"))
                })?;

            Ok(Body {
                content,
                video_url: None,
            })
        }
        Kind::Video => {
            let video_url = required(video_url).ok_or_else(|| {
                Error::bad_request(format!("Video URL is required for video {subject}"))
            })?;

            Ok(Body {
                content: content.unwrap_or_default(),
                video_url: Some(parse_url(video_url)?),
            })
        }
    }
}

fn parse_json<J>(json: Result<Json<J>, JsonRejection>) -> Result<J, Error> {
    match json {
        Ok(Json(json)) => Ok(json),
        Err(err) => match err {
            JsonRejection::JsonDataError(err) => {
                Err(Error::bad_request("Data error").with_description(err.body_text()))
            }
            JsonRejection::JsonSyntaxError(err) => {
                Err(Error::bad_request("JSON syntax error").with_description(err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_err) => Err(Error::bad_request(
                "Missing `application/json` content type",
            )),
            JsonRejection::BytesRejection(err) => {
                Err(Error::bad_request("Invalid characters in JSON").with_description(err))
            }
            err => Err(Error::bad_request("Unknown JSON error").with_description(err)),
        },
    }
}

/// Wrapper for the JSON extractor
///
/// Every rejection becomes a `400 Bad Request` in the API error format
pub struct Form<F>(pub F);

impl<S, F> FromRequest<S> for Form<F>
where
    S: Send + Sync,
    F: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let json = Json::<F>::from_request(req, state).await;

        parse_json(json).map(Form)
    }
}
