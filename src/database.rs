use color_eyre::{Result, eyre::Context};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use std::path::Path;
use std::time::Duration;

pub struct Database {
    pub(crate) conn: DatabaseConnection,
}

impl Database {
    /// Open or create a database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        log::debug!("Opening database at: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(format!(
                "Failed to create database directory: {}",
                parent.display()
            ))?;
        }

        // Create SQLite connection URL
        let url = format!("sqlite://{}?mode=rwc", path.display());

        // sqlx enables `PRAGMA foreign_keys` on every pooled SQLite connection
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(16)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);

        let conn = SeaDatabase::connect(opt)
            .await
            .context(format!("Failed to open database: {}", path.display()))?;

        Self::migrate(conn).await
    }

    /// Apply pending migrations and wrap the connection.
    pub async fn migrate(conn: DatabaseConnection) -> Result<Self> {
        log::debug!("Running database migrations");
        migration::Migrator::up(&conn, None)
            .await
            .context("Failed to run database migrations")?;

        log::info!("Database ready");
        Ok(Database { conn })
    }
}
