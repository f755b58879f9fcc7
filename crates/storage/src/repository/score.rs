use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewScore, Score};

const SCORE_COLUMNS: &str = r#"
    score_id, sub_event_id, registration_id, heat_id, round_number,
    criteria_scores, total_score, position, time_taken, qualified_for_next,
    is_bye, judged_by, created_at, updated_at
"#;

/// Repository for Score database operations
pub struct ScoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the scores of a sub-event, optionally for a single round
    pub async fn list_by_sub_event(
        &self,
        sub_event_id: Uuid,
        round_number: Option<i32>,
    ) -> Result<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(&format!(
            r#"
            SELECT {SCORE_COLUMNS}
            FROM scores
            WHERE sub_event_id = $1 AND ($2::INTEGER IS NULL OR round_number = $2)
            ORDER BY round_number, position NULLS LAST, created_at
            "#
        ))
        .bind(sub_event_id)
        .bind(round_number)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }

    /// List the scores recorded for a heat
    pub async fn list_by_heat(&self, heat_id: Uuid) -> Result<Vec<Score>> {
        let scores = sqlx::query_as::<_, Score>(&format!(
            r#"
            SELECT {SCORE_COLUMNS}
            FROM scores
            WHERE heat_id = $1
            ORDER BY position NULLS LAST, created_at
            "#
        ))
        .bind(heat_id)
        .fetch_all(self.pool)
        .await?;

        Ok(scores)
    }

    /// Insert or overwrite the score of a registration for a round
    pub async fn upsert(tx: &mut Transaction<'_, Postgres>, score: &NewScore) -> Result<Score> {
        let stored = sqlx::query_as::<_, Score>(&format!(
            r#"
            INSERT INTO scores (
                sub_event_id, registration_id, heat_id, round_number, criteria_scores,
                total_score, position, time_taken, qualified_for_next, is_bye, judged_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (sub_event_id, registration_id, round_number)
            DO UPDATE SET
                heat_id = EXCLUDED.heat_id,
                criteria_scores = EXCLUDED.criteria_scores,
                total_score = EXCLUDED.total_score,
                position = EXCLUDED.position,
                time_taken = EXCLUDED.time_taken,
                qualified_for_next = EXCLUDED.qualified_for_next,
                is_bye = EXCLUDED.is_bye,
                judged_by = EXCLUDED.judged_by,
                updated_at = NOW()
            RETURNING {SCORE_COLUMNS}
            "#
        ))
        .bind(score.sub_event_id)
        .bind(score.registration_id)
        .bind(score.heat_id)
        .bind(score.round_number)
        .bind(Json(&score.criteria_scores))
        .bind(score.total_score)
        .bind(score.position)
        .bind(score.time_taken)
        .bind(score.qualified_for_next)
        .bind(score.is_bye)
        .bind(score.judged_by.as_deref())
        .fetch_one(&mut **tx)
        .await?;

        Ok(stored)
    }
}
