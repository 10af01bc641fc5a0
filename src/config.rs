use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
}

impl AppConfig {
    /// `DATABASE_URL` wins; otherwise a SQLite file under the platform
    /// data directory, created on first run.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => default_database_url()?,
        };
        Ok(Self { database_url })
    }
}

fn default_database_url() -> anyhow::Result<String> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("apptbook");
    std::fs::create_dir_all(&dir)?;
    Ok(format!(
        "sqlite://{}?mode=rwc",
        dir.join("apptbook.db").display()
    ))
}
