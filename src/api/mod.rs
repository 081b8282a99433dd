//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use response::Error;
pub use response::Success;

mod current_user;
mod entries;
mod messages;
mod request;
mod response;
mod users;

#[cfg(test)]
pub use current_user::issue_session;
#[cfg(test)]
pub use current_user::validate_session;

/// Get the Axum router for all API routes
pub fn router() -> Router {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/entries", get(entries::list).post(entries::create))
        .route("/entries/public", get(entries::list_public))
        .route("/entries/status", get(entries::status))
        .route("/messages", get(messages::list).post(messages::create))
        .fallback(not_found)
}

/// Nothing lives here
async fn not_found() -> Error {
    Error::not_found("Not found")
}
