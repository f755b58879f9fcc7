use std::collections::HashSet;

use uuid::Uuid;

use crate::models::{ParticipationMode, Registration, Score};

/// Registrations eligible to compete in `round_number`.
///
/// Only registrations whose participation matches `mode` are drawn: a team
/// never enters a solo sub-event and vice versa.
///
/// Round 1 takes every approved registration. Later rounds take the approved
/// registrations that qualified out of the previous round; a registration
/// with several qualifying scores still appears once. Input order is kept.
pub fn resolve_pool(
    mode: ParticipationMode,
    round_number: i32,
    registrations: Vec<Registration>,
    previous_round_scores: &[Score],
) -> Vec<Registration> {
    let qualified: Option<HashSet<Uuid>> = (round_number > 1).then(|| {
        previous_round_scores
            .iter()
            .filter(|score| score.round_number == round_number - 1 && score.qualified_for_next)
            .map(|score| score.registration_id)
            .collect()
    });

    let mut seen = HashSet::new();

    registrations
        .into_iter()
        .filter(|registration| registration.is_eligible())
        .filter(|registration| registration.participation.mode() == mode)
        .filter(|registration| {
            qualified
                .as_ref()
                .is_none_or(|ids| ids.contains(&registration.registration_id))
        })
        .filter(|registration| seen.insert(registration.registration_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rust_decimal::Decimal;
    use sqlx::types::Json;

    use super::*;
    use crate::models::{Member, Participation, RegistrationStatus};

    fn registration(status: RegistrationStatus) -> Registration {
        Registration {
            registration_id: Uuid::new_v4(),
            sub_event_id: Uuid::nil(),
            participation: Json(Participation::Solo {
                participant: Member {
                    user_id: Uuid::new_v4(),
                    name: "Entrant".to_string(),
                },
            }),
            department: "CSE".to_string(),
            year: 2,
            division: "A".to_string(),
            status,
            current_round: 1,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn team(status: RegistrationStatus) -> Registration {
        let mut registration = registration(status);
        registration.participation = Json(Participation::Group {
            team_name: "Relay Kings".to_string(),
            leader: Member {
                user_id: Uuid::new_v4(),
                name: "Ravi".to_string(),
            },
            members: Vec::new(),
        });
        registration
    }

    fn score(registration_id: Uuid, round_number: i32, qualified: bool) -> Score {
        let now = chrono::Utc::now().naive_utc();
        Score {
            score_id: Uuid::new_v4(),
            sub_event_id: Uuid::nil(),
            registration_id,
            heat_id: None,
            round_number,
            criteria_scores: Json(BTreeMap::new()),
            total_score: Decimal::ZERO,
            position: None,
            time_taken: None,
            qualified_for_next: qualified,
            is_bye: false,
            judged_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_first_round_takes_approved_only() {
        let approved = registration(RegistrationStatus::Approved);
        let pending = registration(RegistrationStatus::Pending);
        let cancelled = registration(RegistrationStatus::Cancelled);
        let approved_id = approved.registration_id;

        let pool = resolve_pool(
            ParticipationMode::Solo,
            1,
            vec![approved, pending, cancelled],
            &[],
        );

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].registration_id, approved_id);
    }

    #[test]
    fn test_later_round_takes_previous_qualifiers() {
        let a = registration(RegistrationStatus::Approved);
        let b = registration(RegistrationStatus::Approved);
        let c = registration(RegistrationStatus::Approved);
        let scores = vec![
            score(a.registration_id, 1, true),
            score(b.registration_id, 1, false),
            score(c.registration_id, 2, true),
        ];
        let a_id = a.registration_id;

        let pool = resolve_pool(ParticipationMode::Solo, 2, vec![a, b, c], &scores);

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].registration_id, a_id);
    }

    #[test]
    fn test_pool_is_deduplicated() {
        let a = registration(RegistrationStatus::Approved);
        let scores = vec![
            score(a.registration_id, 1, true),
            score(a.registration_id, 1, true),
        ];

        let pool = resolve_pool(ParticipationMode::Solo, 2, vec![a.clone(), a], &scores);

        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_withdrawn_qualifier_excluded() {
        let a = registration(RegistrationStatus::Cancelled);
        let scores = vec![score(a.registration_id, 1, true)];

        assert!(resolve_pool(ParticipationMode::Solo, 2, vec![a], &scores).is_empty());
    }

    #[test]
    fn test_participation_must_match_mode() {
        let solo = registration(RegistrationStatus::Approved);
        let group = team(RegistrationStatus::Approved);
        let (solo_id, group_id) = (solo.registration_id, group.registration_id);

        let solo_pool = resolve_pool(
            ParticipationMode::Solo,
            1,
            vec![solo.clone(), group.clone()],
            &[],
        );
        let group_pool = resolve_pool(ParticipationMode::Group, 1, vec![solo, group], &[]);

        assert_eq!(solo_pool.len(), 1);
        assert_eq!(solo_pool[0].registration_id, solo_id);
        assert_eq!(group_pool.len(), 1);
        assert_eq!(group_pool[0].registration_id, group_id);
    }
}
