//! Repository for the `status_lists` and `status_list_statuses` tables.

use atelier_core::StatusList;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::status::{StatusListEntryRow, StatusListRow};
use crate::repositories::StatusRepo;

/// Column list for the `status_lists` table.
const COLUMNS: &str = "id, uid, name, target_entity_type, created_at";

/// Column list for member queries joined with `statuses`.
const ENTRY_COLUMNS: &str = "sls.status_list_id, sls.position, s.id AS status_id, s.name, s.code";

/// Convert a list index to the `position` column type.
fn position_column(position: usize) -> Result<i32, sqlx::Error> {
    i32::try_from(position).map_err(|_| {
        sqlx::Error::Protocol(format!("status list position {position} exceeds the column range"))
    })
}

/// Provides CRUD operations for status lists and their ordered members.
pub struct StatusListRepo;

impl StatusListRepo {
    /// Insert a list and its members in one transaction.
    pub async fn create(pool: &PgPool, list: &StatusList) -> Result<StatusListRow, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = Self::create_in(&mut *tx, list).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Insert a list and its members on an open connection, typically inside
    /// a caller's transaction.
    pub async fn create_in(
        conn: &mut PgConnection,
        list: &StatusList,
    ) -> Result<StatusListRow, sqlx::Error> {
        let insert_query = format!(
            "INSERT INTO status_lists (uid, name, target_entity_type, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, StatusListRow>(&insert_query)
            .bind(list.id())
            .bind(list.name())
            .bind(list.target_entity_type())
            .bind(list.created_at())
            .fetch_one(&mut *conn)
            .await?;

        for (position, status) in list.statuses().iter().enumerate() {
            let status_row = StatusRepo::find_or_create(&mut *conn, status).await?;
            sqlx::query(
                "INSERT INTO status_list_statuses (status_list_id, status_id, position)
                 VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(status_row.id)
            .bind(position_column(position)?)
            .execute(&mut *conn)
            .await?;
        }

        tracing::debug!(
            status_list_id = row.id,
            target_entity_type = %row.target_entity_type,
            statuses = list.len(),
            "Inserted status list"
        );
        Ok(row)
    }

    /// Find a list by its domain identity.
    pub async fn find_by_uid(pool: &PgPool, uid: Uuid) -> Result<Option<StatusListRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM status_lists WHERE uid = $1");
        sqlx::query_as::<_, StatusListRow>(&query)
            .bind(uid)
            .fetch_optional(pool)
            .await
    }

    /// All lists declared for `entity_type`, earliest first.
    pub async fn find_for_entity_type(
        pool: &PgPool,
        entity_type: &str,
    ) -> Result<Vec<StatusListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM status_lists
             WHERE target_entity_type = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, StatusListRow>(&query)
            .bind(entity_type)
            .fetch_all(pool)
            .await
    }

    /// Members of a list, ordered by position.
    pub async fn entries(
        pool: &PgPool,
        status_list_id: i64,
    ) -> Result<Vec<StatusListEntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS}
             FROM status_list_statuses sls
             JOIN statuses s ON s.id = sls.status_id
             WHERE sls.status_list_id = $1
             ORDER BY sls.position ASC"
        );
        sqlx::query_as::<_, StatusListEntryRow>(&query)
            .bind(status_list_id)
            .fetch_all(pool)
            .await
    }

    /// List all status lists ordered by target type, then creation.
    pub async fn list(pool: &PgPool) -> Result<Vec<StatusListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM status_lists ORDER BY target_entity_type, created_at, id"
        );
        sqlx::query_as::<_, StatusListRow>(&query).fetch_all(pool).await
    }

    /// Permanently delete a list and its member rows. Returns `true` if a row
    /// was removed.
    pub async fn delete(pool: &PgPool, uid: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM status_lists WHERE uid = $1")
            .bind(uid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
