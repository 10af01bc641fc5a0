use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// Appointment record in the database. `starts_at` is the calendar slot
/// the conflict rule keys on; the owner never changes after creation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub user_id: i64,
    pub starts_at: NaiveDateTime,
    pub title: String,
    pub description: String,
    pub address: String,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    /// Insert a new appointment. Violates the `(user_id, starts_at)`
    /// unique index if the owner already has that slot booked.
    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        starts_at: NaiveDateTime,
        title: &str,
        description: &str,
        address: &str,
    ) -> sqlx::Result<Appointment> {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (user_id, starts_at, title, description, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, starts_at, title, description, address, created_at
            "#,
        )
        .bind(user_id)
        .bind(starts_at)
        .bind(title)
        .bind(description)
        .bind(address)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, user_id, starts_at, title, description, address, created_at
            FROM appointments
            WHERE user_id = $1
            ORDER BY starts_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Overwrite every mutable field of one row. `None` means no row with
    /// that id. Changing `starts_at` into another row's slot violates the
    /// unique index; re-saving the row's own slot does not.
    pub async fn update(
        db: &SqlitePool,
        id: i64,
        starts_at: NaiveDateTime,
        title: &str,
        description: &str,
        address: &str,
    ) -> sqlx::Result<Option<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET starts_at = $2, title = $3, description = $4, address = $5
            WHERE id = $1
            RETURNING id, user_id, starts_at, title, description, address, created_at
            "#,
        )
        .bind(id)
        .bind(starts_at)
        .bind(title)
        .bind(description)
        .bind(address)
        .fetch_optional(db)
        .await
    }

    /// Physically remove one row; returns whether anything was deleted.
    pub async fn delete(db: &SqlitePool, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Owner-scoped case-sensitive substring match on title. `instr`
    /// rather than LIKE: LIKE is case-insensitive for ASCII in SQLite.
    pub async fn search_by_title(
        db: &SqlitePool,
        user_id: i64,
        needle: &str,
    ) -> sqlx::Result<Vec<Appointment>> {
        sqlx::query_as::<_, Appointment>(
            r#"
            SELECT id, user_id, starts_at, title, description, address, created_at
            FROM appointments
            WHERE user_id = $1 AND instr(title, $2) > 0
            ORDER BY starts_at, id
            "#,
        )
        .bind(user_id)
        .bind(needle)
        .fetch_all(db)
        .await
    }

    /// Does the owner already have an appointment at exactly this slot?
    pub async fn slot_taken(
        db: &SqlitePool,
        user_id: i64,
        starts_at: NaiveDateTime,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM appointments
                WHERE user_id = $1 AND starts_at = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(starts_at)
        .fetch_one(db)
        .await
    }
}
