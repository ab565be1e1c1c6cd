//! Repository for the `statuses` table.

use atelier_core::Status;
use sqlx::{PgConnection, PgPool};

use crate::models::status::StatusRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, code, created_at";

/// Provides lookup and idempotent insert for status values.
pub struct StatusRepo;

impl StatusRepo {
    /// Return the row for `status`, inserting it if it does not exist yet.
    pub async fn find_or_create(
        conn: &mut PgConnection,
        status: &Status,
    ) -> Result<StatusRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO statuses (name, code) VALUES ($1, $2)
             ON CONFLICT (name, code) DO UPDATE SET name = EXCLUDED.name
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StatusRow>(&query)
            .bind(status.name())
            .bind(status.code())
            .fetch_one(conn)
            .await
    }

    /// Find all statuses with the given code, oldest first.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Vec<StatusRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM statuses WHERE code = $1 ORDER BY id ASC");
        sqlx::query_as::<_, StatusRow>(&query)
            .bind(code)
            .fetch_all(pool)
            .await
    }

    /// List all statuses ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<StatusRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM statuses ORDER BY id ASC");
        sqlx::query_as::<_, StatusRow>(&query).fetch_all(pool).await
    }
}
