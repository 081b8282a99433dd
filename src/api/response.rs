//! API response helpers

use std::fmt::Display;

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: V,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data,
        }
    }

    pub fn created(data: V) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            data,
        }
    }
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        (self.status_code, Json(self.data)).into_response()
    }
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn unauthorized<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::UNAUTHORIZED,
            message: message.to_string(),
            description: None,
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.to_string(),
            description: None,
        }
    }

    /// Something went wrong on our side
    ///
    /// The cause is logged, the client only gets a generic message
    pub fn internal_server_error<C>(cause: C) -> Self
    where
        C: Display,
    {
        tracing::error!("Internal server error: {cause}");

        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
            description: None,
        }
    }

    pub fn with_description<M>(self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }

    #[cfg(test)]
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }
}

#[derive(Serialize)]
struct ErrorWrapper<D>
where
    D: Serialize,
{
    error: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<D>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                error: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}
