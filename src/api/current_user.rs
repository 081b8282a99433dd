//! Current user service
//!
//! Issue session tokens and get the current user from the request based on the Authorization
//! header

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::api::Error;
use crate::database::Database;
use crate::mode::Mode;
use crate::users::User;

/// Sessions are valid for a week
pub const SESSION_DURATION: i64 = 7 * 24 * 60 * 60;

/// Secret used when none is configured outside of production
const DEVELOPMENT_SECRET: &str = "omega-development-secret-not-for-production";

/// The signing secret is missing in production
#[derive(Debug)]
pub struct MissingSecret;

impl std::error::Error for MissingSecret {}

impl fmt::Display for MissingSecret {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "`JWT_SECRET` must be set in production")
    }
}

/// The keys used for encoding/decoding JWT tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Create the keys for a mode from an optional secret
    ///
    /// Production never falls back to the development secret
    pub fn from_mode(mode: Mode, secret: Option<&str>) -> Result<Self, MissingSecret> {
        match secret {
            Some(secret) => Ok(Self::new(secret.as_bytes())),
            None if mode.is_production() => Err(MissingSecret),
            None => {
                tracing::warn!("`JWT_SECRET` is not set, using the development secret");
                Ok(Self::new(DEVELOPMENT_SECRET.as_bytes()))
            }
        }
    }
}

/// The JWT claims to identify a user
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The user ID
    sub: Uuid,

    /// When the token was issued, in seconds since the epoch
    iat: i64,

    /// When the token expires, in seconds since the epoch
    exp: i64,
}

/// Issue a session token for a user
pub fn issue_session(jwt_keys: &JwtKeys, user_id: Uuid) -> Result<String, Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + SESSION_DURATION,
    };

    encode(&Header::default(), &claims, &jwt_keys.encoding).map_err(Error::internal_server_error)
}

/// Validate a session token
///
/// Gives the user ID when the signature and expiry check out, `None` otherwise
pub fn validate_session(jwt_keys: &JwtKeys, token: &str) -> Option<Uuid> {
    use jsonwebtoken::Validation;
    use jsonwebtoken::decode;

    match decode::<Claims>(token, &jwt_keys.decoding, &Validation::default()) {
        Ok(token_data) => Some(token_data.claims.sub),
        Err(err) => {
            tracing::debug!("Invalid session token: {err}");
            None
        }
    }
}

/// Current user service
#[derive(Clone)]
pub struct CurrentUser {
    /// The actual user
    user: Arc<User>,
}

impl CurrentUser {
    /// Create the current user from a user
    fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
        }
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the token from the authorization header
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|err| match err.reason() {
                    TypedHeaderRejectionReason::Missing => Error::unauthorized("Unauthorized"),
                    _ => Error::unauthorized("Invalid token"),
                })?;

        let Extension(jwt_keys) = parts
            .extract::<Extension<JwtKeys>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get JWT keys"))?;

        let Extension(database) = parts
            .extract::<Extension<Database>>()
            .await
            .map_err(|_| Error::internal_server_error("Could not get a database pool"))?;

        let id = validate_session(&jwt_keys, bearer.token())
            .ok_or_else(|| Error::unauthorized("Invalid token"))?;

        let user = database
            .find_single_user_by_id(&id)
            .await
            .map_err(Error::internal_server_error)?;

        // a valid token for a user that no longer exists
        user.map(CurrentUser::new)
            .ok_or_else(|| Error::unauthorized("Invalid token"))
    }
}
