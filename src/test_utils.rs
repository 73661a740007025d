use std::sync::Arc;

use sea_orm::{ConnectOptions, ConnectionTrait, Database as SeaDatabase};

use crate::database::Database;

/// Fresh in-memory database with the real migrations applied.
///
/// The pool is pinned to a single connection: every SQLite `:memory:`
/// connection is its own database.
pub async fn test_db() -> Arc<Database> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let conn = SeaDatabase::connect(opt).await.unwrap();

    // Enable foreign keys
    conn.execute_unprepared("PRAGMA foreign_keys = ON")
        .await
        .unwrap();

    Arc::new(Database::migrate(conn).await.unwrap())
}
