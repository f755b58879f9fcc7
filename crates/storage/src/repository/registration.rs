use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Registration;

/// Repository for Registration database operations
pub struct RegistrationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RegistrationRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the registrations of a sub-event in registration order
    pub async fn list_by_sub_event(&self, sub_event_id: Uuid) -> Result<Vec<Registration>> {
        let registrations = sqlx::query_as::<_, Registration>(
            r#"
            SELECT registration_id, sub_event_id, participation, department, year,
                   division, status, current_round, created_at
            FROM registrations
            WHERE sub_event_id = $1
            ORDER BY created_at, registration_id
            "#,
        )
        .bind(sub_event_id)
        .fetch_all(self.pool)
        .await?;

        Ok(registrations)
    }

    /// Record that the given registrations reached `round_number`
    pub async fn promote(
        tx: &mut Transaction<'_, Postgres>,
        registration_ids: &[Uuid],
        round_number: i32,
    ) -> Result<u64> {
        if registration_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET current_round = $2
            WHERE registration_id = ANY($1)
            "#,
        )
        .bind(registration_ids)
        .bind(round_number)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
