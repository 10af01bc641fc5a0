//! Console appointment book.
//!
//! `auth` handles accounts, `appointments` holds the agenda logic
//! (including the no-double-booking rule), `shell` is the interactive
//! menu surface. Everything persists through one sqlx SQLite pool held
//! in [`state::AppState`].

pub mod appointments;
pub mod auth;
pub mod config;
pub mod error;
pub mod shell;
pub mod state;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    pool
}
