//! # jarima-store
//!
//! SQLite-backed persistence for collected messages. Records are inserted
//! once, looked up by id or by receipt number, and only ever mutated to
//! flip the soft-delete flag — never physically removed.

use jarima_core::config::StoreConfig;
use jarima_core::message::{MessageDraft, StoredMessage};
use jarima_core::{shellexpand, JarimaError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Persistent message store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, JarimaError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| JarimaError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| JarimaError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // Every pooled connection to ":memory:" would get its own database.
        let max_connections = if db_path == ":memory:" { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await
            .map_err(|e| JarimaError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Message store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Insert a classified draft. Returns the identity the store assigned;
    /// identities are assigned exactly once and never reused.
    pub async fn add(&self, draft: &MessageDraft) -> Result<i64, JarimaError> {
        let result = sqlx::query(
            "INSERT INTO messages (
                sender, received_date, text, classification,
                car_number, article, street, date_of_fine,
                receipt_number, amount, term_days, last_date_of_payment,
                parsed, created_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.sender)
        .bind(draft.received_date)
        .bind(&draft.text)
        .bind(draft.classification)
        .bind(&draft.car_number)
        .bind(&draft.article)
        .bind(&draft.street)
        .bind(draft.date_of_fine)
        .bind(&draft.receipt_number)
        .bind(draft.amount)
        .bind(draft.term_days)
        .bind(draft.last_date_of_payment)
        .bind(draft.parsed)
        .bind(draft.created_date)
        .execute(&self.pool)
        .await
        .map_err(|e| JarimaError::Store(format!("insert failed: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Find the originating fine for a receipt number. The lookup is
    /// case-insensitive and goes through the NOCASE index.
    pub async fn find_fine_by_receipt(
        &self,
        receipt_number: &str,
    ) -> Result<Option<StoredMessage>, JarimaError> {
        sqlx::query_as::<_, StoredMessage>(
            "SELECT * FROM messages \
             WHERE receipt_number = ? COLLATE NOCASE \
             AND classification = 'fine' \
             ORDER BY id LIMIT 1",
        )
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| JarimaError::Store(format!("receipt lookup failed: {e}")))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<StoredMessage>, JarimaError> {
        sqlx::query_as::<_, StoredMessage>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| JarimaError::Store(format!("id lookup failed: {e}")))
    }

    /// Flip the soft-delete flag after the device confirmed the slot clear.
    pub async fn mark_deleted(&self, id: i64) -> Result<(), JarimaError> {
        sqlx::query("UPDATE messages SET deleted = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| JarimaError::Store(format!("update failed: {e}")))?;
        Ok(())
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), JarimaError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| JarimaError::Store(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        JarimaError::Store(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| JarimaError::Store(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    JarimaError::Store(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}
