use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RoundAdvance, TournamentStore};
use crate::error::Result;
use crate::models::{
    Event, Heat, HeatParticipant, HeatStatus, NewHeat, NewScore, Registration, Score, SubEvent,
};
use crate::repository::{
    event::EventRepository, heat::HeatRepository, registration::RegistrationRepository,
    score::ScoreRepository, sub_event::SubEventRepository,
};

/// `TournamentStore` backed by the Postgres repositories.
///
/// Each multi-row write runs in its own transaction; dropping the
/// transaction on an early `?` rolls it back.
pub struct PgStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgStore<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl<'a> TournamentStore for PgStore<'a> {
    async fn find_event(&self, event_id: Uuid) -> Result<Event> {
        EventRepository::new(self.pool).find_by_id(event_id).await
    }

    async fn find_sub_event(&self, sub_event_id: Uuid) -> Result<SubEvent> {
        SubEventRepository::new(self.pool)
            .find_by_id(sub_event_id)
            .await
    }

    async fn list_sub_events(&self, event_id: Uuid) -> Result<Vec<SubEvent>> {
        SubEventRepository::new(self.pool)
            .list_by_event(event_id)
            .await
    }

    async fn list_registrations(&self, sub_event_id: Uuid) -> Result<Vec<Registration>> {
        RegistrationRepository::new(self.pool)
            .list_by_sub_event(sub_event_id)
            .await
    }

    async fn find_heat(&self, heat_id: Uuid) -> Result<Heat> {
        HeatRepository::new(self.pool).find_by_id(heat_id).await
    }

    async fn list_heats(&self, sub_event_id: Uuid, round_number: i32) -> Result<Vec<Heat>> {
        HeatRepository::new(self.pool)
            .list_by_round(sub_event_id, round_number)
            .await
    }

    async fn heat_roster(&self, heat_id: Uuid) -> Result<Vec<HeatParticipant>> {
        HeatRepository::new(self.pool).roster(heat_id).await
    }

    async fn list_scores(
        &self,
        sub_event_id: Uuid,
        round_number: Option<i32>,
    ) -> Result<Vec<Score>> {
        ScoreRepository::new(self.pool)
            .list_by_sub_event(sub_event_id, round_number)
            .await
    }

    async fn heat_scores(&self, heat_id: Uuid) -> Result<Vec<Score>> {
        ScoreRepository::new(self.pool).list_by_heat(heat_id).await
    }

    async fn create_heats(&self, heats: &[NewHeat], byes: &[NewScore]) -> Result<Vec<Heat>> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(heats.len());
        for heat in heats {
            created.push(HeatRepository::insert(&mut tx, heat).await?);
        }

        for bye in byes {
            ScoreRepository::upsert(&mut tx, bye).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn record_heat_results(
        &self,
        heat_id: Uuid,
        scores: &[NewScore],
        completed_at: NaiveDateTime,
    ) -> Result<Vec<Score>> {
        let mut tx = self.pool.begin().await?;

        let mut stored = Vec::with_capacity(scores.len());
        for score in scores {
            stored.push(ScoreRepository::upsert(&mut tx, score).await?);
        }

        HeatRepository::complete(&mut tx, heat_id, completed_at).await?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn update_heat_status(&self, heat_id: Uuid, status: HeatStatus) -> Result<Heat> {
        HeatRepository::new(self.pool)
            .update_status(heat_id, status)
            .await
    }

    async fn schedule_heat(
        &self,
        heat_id: Uuid,
        venue: Option<String>,
        scheduled_at: Option<NaiveDateTime>,
    ) -> Result<Heat> {
        HeatRepository::new(self.pool)
            .schedule(heat_id, venue, scheduled_at)
            .await
    }

    async fn advance_round(&self, sub_event_id: Uuid, advance: &RoundAdvance) -> Result<SubEvent> {
        let mut tx = self.pool.begin().await?;

        let sub_event = SubEventRepository::update_round(
            &mut tx,
            sub_event_id,
            advance.current_round,
            advance.is_finalized,
        )
        .await?;

        RegistrationRepository::promote(&mut tx, &advance.promoted, advance.current_round).await?;

        tx.commit().await?;
        Ok(sub_event)
    }
}
