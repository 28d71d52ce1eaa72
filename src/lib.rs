//! Multi-user task tracker.
//!
//! Users register or log in with a username and manage their own tasks. The
//! requester is carried in a signed cookie and every task statement is
//! scoped by owner.

pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod identity;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;
pub mod view;

use sqlx::{Pool, Sqlite};

use crate::identity::IdentityCodec;

// Struct representing the application state
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub identity: IdentityCodec,
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
