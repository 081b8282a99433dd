#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::JwtKeys;
use crate::api::router;
use crate::database::Database;
use crate::database::DatabaseConfig;
use crate::mode::Mode;
use crate::utils::env_var;
use crate::utils::env_var_or_else;

mod api;
mod database;
mod entries;
mod graceful_shutdown;
mod kind;
mod messages;
mod mode;
mod password;
#[cfg(test)]
mod tests;
mod users;
mod utils;

const DEFAULT_RUST_LOG: &str = "omega=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let mode = Mode::from_env();
    tracing::info!("Starting in {mode:?} mode");

    let jwt_keys = setup_jwt_keys(mode)?;

    let app = setup_app(DatabaseConfig::DetectConfig, jwt_keys).await?;

    let address = setup_address()?;
    let listener = TcpListener::bind(address).await?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if any of its dependencies fail to load:
/// - Database connection
/// - Migrations
pub async fn setup_app(database_config: DatabaseConfig, jwt_keys: JwtKeys) -> Result<Router> {
    let database = Database::from_config(database_config).await?;

    Ok(create_router(database, jwt_keys))
}

/// Create the router for Omega
fn create_router(database: Database, jwt_keys: JwtKeys) -> Router {
    router()
        .layer(TraceLayer::new_for_http())
        .layer(Extension(database))
        .layer(Extension(jwt_keys))
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

/// Signing keys for the session tokens
///
/// Fails in production when `JWT_SECRET` is missing
fn setup_jwt_keys(mode: Mode) -> Result<JwtKeys> {
    let jwt_secret = env_var("JWT_SECRET");

    Ok(JwtKeys::from_mode(mode, jwt_secret.as_deref())?)
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Some(port) = env_var("PORT") {
        let port = port.parse::<u16>()?;

        address.set_port(port);
    }

    Ok(address)
}
