//! Fixtures shared by the service tests.

use sqlx::types::Json;
use uuid::Uuid;

use super::TournamentService;
use crate::models::{
    CriteriaDefinitions, Event, Member, Participation, ParticipationMode, Registration,
    RegistrationStatus, RoundFormat, SubEvent,
};
use crate::store::MemoryStore;

pub(crate) struct Fixture {
    pub service: TournamentService<MemoryStore>,
    pub event_id: Uuid,
    pub sub_event_id: Uuid,
    pub registrations: Vec<Uuid>,
}

pub(crate) fn event() -> Event {
    Event {
        event_id: Uuid::new_v4(),
        name: "Spring Fest".to_string(),
        slug: "spring-fest".to_string(),
        created_at: chrono::Utc::now().naive_utc(),
    }
}

pub(crate) fn sub_event(
    event_id: Uuid,
    format: RoundFormat,
    per_group: i32,
    qualifiers: i32,
    total_rounds: i32,
) -> SubEvent {
    SubEvent {
        sub_event_id: Uuid::new_v4(),
        event_id,
        name: "Sub-event".to_string(),
        participation_mode: ParticipationMode::Solo,
        round_format: format,
        participants_per_group: per_group,
        qualifiers_per_group: qualifiers,
        current_round: 1,
        total_rounds,
        is_finalized: false,
        criteria: Json(CriteriaDefinitions::new()),
        created_at: chrono::Utc::now().naive_utc(),
    }
}

pub(crate) fn solo(sub_event_id: Uuid, name: &str, department: &str, year: i32) -> Registration {
    registration(
        sub_event_id,
        Participation::Solo {
            participant: Member {
                user_id: Uuid::new_v4(),
                name: name.to_string(),
            },
        },
        department,
        year,
    )
}

pub(crate) fn team(
    sub_event_id: Uuid,
    team_name: &str,
    members: usize,
    department: &str,
    year: i32,
) -> Registration {
    let member = |idx: usize| Member {
        user_id: Uuid::new_v4(),
        name: format!("{} member {}", team_name, idx),
    };

    registration(
        sub_event_id,
        Participation::Group {
            team_name: team_name.to_string(),
            leader: member(0),
            members: (1..=members).map(member).collect(),
        },
        department,
        year,
    )
}

fn registration(
    sub_event_id: Uuid,
    participation: Participation,
    department: &str,
    year: i32,
) -> Registration {
    Registration {
        registration_id: Uuid::new_v4(),
        sub_event_id,
        participation: Json(participation),
        department: department.to_string(),
        year,
        division: "A".to_string(),
        status: RegistrationStatus::Approved,
        current_round: 1,
        created_at: chrono::Utc::now().naive_utc(),
    }
}

/// A sub-event with `entrants` approved solo registrations.
pub(crate) fn fixture(
    format: RoundFormat,
    per_group: i32,
    qualifiers: i32,
    total_rounds: i32,
    entrants: usize,
) -> Fixture {
    let store = MemoryStore::new();
    let event = event();
    let sub_event = sub_event(event.event_id, format, per_group, qualifiers, total_rounds);
    let (event_id, sub_event_id) = (event.event_id, sub_event.sub_event_id);

    store.insert_event(event);
    store.insert_sub_event(sub_event);

    let registrations = (0..entrants)
        .map(|idx| {
            let registration = solo(sub_event_id, &format!("Entrant {}", idx + 1), "CSE", 2);
            let id = registration.registration_id;
            store.insert_registration(registration);
            id
        })
        .collect();

    Fixture {
        service: TournamentService::new(store),
        event_id,
        sub_event_id,
        registrations,
    }
}
