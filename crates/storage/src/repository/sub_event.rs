use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::SubEvent;

const SUB_EVENT_COLUMNS: &str = r#"
    sub_event_id, event_id, name, participation_mode, round_format,
    participants_per_group, qualifiers_per_group, current_round, total_rounds,
    is_finalized, criteria, created_at
"#;

/// Repository for SubEvent database operations
pub struct SubEventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SubEventRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a sub-event by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<SubEvent> {
        let sub_event = sqlx::query_as::<_, SubEvent>(&format!(
            "SELECT {SUB_EVENT_COLUMNS} FROM sub_events WHERE sub_event_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(sub_event)
    }

    /// List the sub-events of an event
    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<SubEvent>> {
        let sub_events = sqlx::query_as::<_, SubEvent>(&format!(
            "SELECT {SUB_EVENT_COLUMNS} FROM sub_events WHERE event_id = $1 ORDER BY created_at, name"
        ))
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(sub_events)
    }

    /// Move the round pointer inside an open transaction
    pub async fn update_round(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        current_round: i32,
        is_finalized: bool,
    ) -> Result<SubEvent> {
        let sub_event = sqlx::query_as::<_, SubEvent>(&format!(
            r#"
            UPDATE sub_events
            SET current_round = $2, is_finalized = $3
            WHERE sub_event_id = $1
            RETURNING {SUB_EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(current_round)
        .bind(is_finalized)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(sub_event)
    }
}
