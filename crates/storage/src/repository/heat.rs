use chrono::NaiveDateTime;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Heat, HeatParticipant, HeatStatus, NewHeat};

const HEAT_COLUMNS: &str = r#"
    heat_id, sub_event_id, round_number, heat_number, status, venue,
    scheduled_at, capacity, created_at, completed_at
"#;

/// Repository for Heat database operations
pub struct HeatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HeatRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a heat by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Heat> {
        let heat = sqlx::query_as::<_, Heat>(&format!(
            "SELECT {HEAT_COLUMNS} FROM heats WHERE heat_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(heat)
    }

    /// List the heats of one round
    pub async fn list_by_round(&self, sub_event_id: Uuid, round_number: i32) -> Result<Vec<Heat>> {
        let heats = sqlx::query_as::<_, Heat>(&format!(
            r#"
            SELECT {HEAT_COLUMNS}
            FROM heats
            WHERE sub_event_id = $1 AND round_number = $2
            ORDER BY heat_number
            "#
        ))
        .bind(sub_event_id)
        .bind(round_number)
        .fetch_all(self.pool)
        .await?;

        Ok(heats)
    }

    /// Get the roster of a heat in lane order
    pub async fn roster(&self, heat_id: Uuid) -> Result<Vec<HeatParticipant>> {
        let participants = sqlx::query_as::<_, HeatParticipant>(
            r#"
            SELECT heat_id, registration_id, lane
            FROM heat_participants
            WHERE heat_id = $1
            ORDER BY lane
            "#,
        )
        .bind(heat_id)
        .fetch_all(self.pool)
        .await?;

        Ok(participants)
    }

    /// Change the status of a heat
    pub async fn update_status(&self, id: Uuid, status: HeatStatus) -> Result<Heat> {
        let heat = sqlx::query_as::<_, Heat>(&format!(
            "UPDATE heats SET status = $2 WHERE heat_id = $1 RETURNING {HEAT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(heat)
    }

    /// Set venue and scheduled time of a heat
    pub async fn schedule(
        &self,
        id: Uuid,
        venue: Option<String>,
        scheduled_at: Option<NaiveDateTime>,
    ) -> Result<Heat> {
        let heat = sqlx::query_as::<_, Heat>(&format!(
            r#"
            UPDATE heats
            SET venue = $2, scheduled_at = $3
            WHERE heat_id = $1
            RETURNING {HEAT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(venue)
        .bind(scheduled_at)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(heat)
    }

    /// Insert a heat and its roster inside an open transaction
    pub async fn insert(tx: &mut Transaction<'_, Postgres>, new: &NewHeat) -> Result<Heat> {
        let completed_at = (new.status == HeatStatus::Completed)
            .then(|| chrono::Utc::now().naive_utc());

        let heat = sqlx::query_as::<_, Heat>(&format!(
            r#"
            INSERT INTO heats (heat_id, sub_event_id, round_number, heat_number, status, capacity, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {HEAT_COLUMNS}
            "#
        ))
        .bind(new.heat_id)
        .bind(new.sub_event_id)
        .bind(new.round_number)
        .bind(new.heat_number)
        .bind(new.status)
        .bind(new.capacity)
        .bind(completed_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            StorageError::from_unique(
                e,
                &format!(
                    "heat {} of round {} already exists",
                    new.heat_number, new.round_number
                ),
            )
        })?;

        for (lane, registration_id) in new.registration_ids.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO heat_participants (heat_id, registration_id, lane)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(new.heat_id)
            .bind(registration_id)
            .bind(lane as i32 + 1)
            .execute(&mut **tx)
            .await?;
        }

        Ok(heat)
    }

    /// Mark a heat completed inside an open transaction, keeping the first completion time
    pub async fn complete(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        completed_at: NaiveDateTime,
    ) -> Result<Heat> {
        let heat = sqlx::query_as::<_, Heat>(&format!(
            r#"
            UPDATE heats
            SET status = 'COMPLETED', completed_at = COALESCE(completed_at, $2)
            WHERE heat_id = $1
            RETURNING {HEAT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(completed_at)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(heat)
    }
}
