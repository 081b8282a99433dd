//! User API
//!
//! Registration and login, both hand out a session token

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::database::CreateUserValues;
use crate::database::Database;
use crate::database::Error as DatabaseError;
use crate::password::hash;
use crate::password::verify;
use crate::users::User;

use super::current_user::SESSION_DURATION;
use super::current_user::issue_session;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::request::required;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The display name
    pub name: String,

    /// The email address
    pub email: String,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Session handed out after registration or login
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// The token to provide to follow up requests in the Authorization header
    token: String,

    /// In how many seconds does the token expire
    expires_in: i64,

    /// The user the token belongs to
    user: UserResponse,
}

impl SessionResponse {
    /// Issue a new session for a user
    fn issue(jwt_keys: &JwtKeys, user: &User) -> Result<Self, Error> {
        Ok(Self {
            token: issue_session(jwt_keys, user.id)?,
            expires_in: SESSION_DURATION,
            user: UserResponse::from_user(user),
        })
    }
}

/// Register form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    /// Display name of the new user
    name: Option<String>,
    /// Email address of the new user
    email: Option<String>,
    /// Password of the new user
    password: Option<String>,
}

/// Register a new user and start a session
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "name": "Ada", "email": "ada@example.com", "password": "verysecret" }' \
///     http://localhost:6000/register
/// ```
///
/// Response
/// ```json
/// { "token": "some token", "expiresIn": 604800, "user": { "id": "<uuid>", ... } }
/// ```
pub async fn register(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(database): Extension<Database>,
    Form(form): Form<RegisterForm>,
) -> Result<Success<SessionResponse>, Error> {
    let (Some(name), Some(email), Some(password)) = (
        required(form.name),
        required(form.email),
        form.password.filter(|password| !password.is_empty()),
    ) else {
        return Err(Error::bad_request("Name, email and password are required"));
    };

    let existing_user = database
        .find_single_user_by_email(&email)
        .await
        .map_err(Error::internal_server_error)?;

    if existing_user.is_some() {
        return Err(Error::bad_request("User with this email already exists"));
    }

    let hashed_password = hash(&password).map_err(Error::internal_server_error)?;

    let values = CreateUserValues {
        name: &name,
        email: &email,
        hashed_password: &hashed_password,
    };

    let user = database.create_user(&values).await.map_err(|err| match err {
        // registered in between the check and the insert
        DatabaseError::Conflict(_) => Error::bad_request("User with this email already exists"),
        err @ DatabaseError::Connection(_) => Error::internal_server_error(err),
    })?;

    tracing::info!("Registered user {}", user.id);

    Ok(Success::created(SessionResponse::issue(&jwt_keys, &user)?))
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address of the user
    email: String,
    /// Password of the user
    password: String,
}

/// Get a token for a user "session"
///
/// The token can then be used to access the rest of the API routes by using it in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "email": "ada@example.com", "password": "verysecret" }' \
///     http://localhost:6000/login
/// ```
pub async fn login(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(database): Extension<Database>,
    Form(form): Form<LoginForm>,
) -> Result<Success<SessionResponse>, Error> {
    let user = database
        .find_single_user_by_email(form.email.trim())
        .await
        .map_err(Error::internal_server_error)?;

    match user {
        Some(user) if verify(&user.hashed_password, &form.password) => {
            Ok(Success::ok(SessionResponse::issue(&jwt_keys, &user)?))
        }
        _ => Err(Error::bad_request("Invalid credentials")),
    }
}
