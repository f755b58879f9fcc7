use rand::Rng;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::models::{HeatStatus, NewHeat, NewScore, SubEvent};

/// Roster of one heat before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatPlan {
    pub heat_number: i32,
    pub registration_ids: Vec<Uuid>,
}

/// Number of heats needed to seat `pool_size` entrants at `capacity` per heat.
pub fn heat_count(pool_size: usize, capacity: usize) -> usize {
    pool_size.div_ceil(capacity.max(1))
}

/// Shuffles the pool uniformly and cuts it into heats of `capacity`.
///
/// Heats are numbered from 1 and only the last one may be short.
pub fn plan_heats<R: Rng + ?Sized>(
    mut registration_ids: Vec<Uuid>,
    capacity: usize,
    rng: &mut R,
) -> Vec<HeatPlan> {
    registration_ids.shuffle(rng);

    registration_ids
        .chunks(capacity.max(1))
        .enumerate()
        .map(|(idx, chunk)| HeatPlan {
            heat_number: idx as i32 + 1,
            registration_ids: chunk.to_vec(),
        })
        .collect()
}

/// A lone entrant in a heat built for several has nobody to race.
pub fn is_bye(plan: &HeatPlan, capacity: usize) -> bool {
    capacity > 1 && plan.registration_ids.len() == 1
}

/// Turns plans into rows to write: heats with rosters, plus an automatic
/// advance score for every bye. Bye heats are created already completed.
pub fn build_heats(
    sub_event: &SubEvent,
    round_number: i32,
    plans: Vec<HeatPlan>,
) -> (Vec<NewHeat>, Vec<NewScore>) {
    let capacity = sub_event.capacity();
    let mut heats = Vec::with_capacity(plans.len());
    let mut byes = Vec::new();

    for plan in plans {
        let heat_id = Uuid::new_v4();
        let bye = is_bye(&plan, capacity);

        if bye {
            byes.push(NewScore::bye(
                sub_event.sub_event_id,
                plan.registration_ids[0],
                heat_id,
                round_number,
            ));
        }

        heats.push(NewHeat {
            heat_id,
            sub_event_id: sub_event.sub_event_id,
            round_number,
            heat_number: plan.heat_number,
            capacity: sub_event.participants_per_group,
            status: if bye {
                HeatStatus::Completed
            } else {
                HeatStatus::Pending
            },
            registration_ids: plan.registration_ids,
        });
    }

    (heats, byes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sqlx::types::Json;

    use super::*;
    use crate::models::{CriteriaDefinitions, ParticipationMode, RoundFormat};

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn sub_event(per_group: i32) -> SubEvent {
        SubEvent {
            sub_event_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            name: "100m".to_string(),
            participation_mode: ParticipationMode::Solo,
            round_format: RoundFormat::Time,
            participants_per_group: per_group,
            qualifiers_per_group: 1,
            current_round: 1,
            total_rounds: 2,
            is_finalized: false,
            criteria: Json(CriteriaDefinitions::new()),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_heat_count_rounds_up() {
        assert_eq!(heat_count(12, 5), 3);
        assert_eq!(heat_count(10, 5), 2);
        assert_eq!(heat_count(1, 5), 1);
        assert_eq!(heat_count(0, 5), 0);
    }

    #[test]
    fn test_partition_covers_pool_exactly_once() {
        let mut rng = StdRng::seed_from_u64(7);

        for pool_size in 1..=40 {
            for capacity in 1..=9 {
                let pool = ids(pool_size);
                let plans = plan_heats(pool.clone(), capacity, &mut rng);

                assert_eq!(plans.len(), heat_count(pool_size, capacity));

                let seated: Vec<Uuid> = plans
                    .iter()
                    .flat_map(|plan| plan.registration_ids.iter().copied())
                    .collect();
                assert_eq!(seated.len(), pool_size);
                assert_eq!(
                    seated.iter().collect::<HashSet<_>>(),
                    pool.iter().collect::<HashSet<_>>()
                );

                for plan in &plans[..plans.len() - 1] {
                    assert_eq!(plan.registration_ids.len(), capacity);
                }
            }
        }
    }

    #[test]
    fn test_remainder_goes_to_last_heat() {
        let mut rng = StdRng::seed_from_u64(42);

        let plans = plan_heats(ids(12), 5, &mut rng);

        let sizes: Vec<usize> = plans.iter().map(|p| p.registration_ids.len()).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
        let numbers: Vec<i32> = plans.iter().map(|p| p.heat_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_shuffle_changes_order() {
        let pool = ids(30);
        let mut rng = StdRng::seed_from_u64(1);

        let plans = plan_heats(pool.clone(), 30, &mut rng);

        assert_ne!(plans[0].registration_ids, pool);
    }

    #[test]
    fn test_single_entrant_heat_becomes_bye() {
        let event = sub_event(4);
        let plans = vec![
            HeatPlan {
                heat_number: 1,
                registration_ids: ids(4),
            },
            HeatPlan {
                heat_number: 2,
                registration_ids: ids(1),
            },
        ];
        let lone = plans[1].registration_ids[0];

        let (heats, byes) = build_heats(&event, 1, plans);

        assert_eq!(heats[0].status, HeatStatus::Pending);
        assert_eq!(heats[1].status, HeatStatus::Completed);
        assert_eq!(byes.len(), 1);
        assert_eq!(byes[0].registration_id, lone);
        assert_eq!(byes[0].heat_id, Some(heats[1].heat_id));
        assert!(byes[0].is_bye);
        assert!(byes[0].qualified_for_next);
    }

    #[test]
    fn test_solo_capacity_heats_are_not_byes() {
        let event = sub_event(1);
        let mut rng = StdRng::seed_from_u64(3);
        let plans = plan_heats(ids(3), 1, &mut rng);

        let (heats, byes) = build_heats(&event, 1, plans);

        assert!(byes.is_empty());
        assert!(heats.iter().all(|h| h.status == HeatStatus::Pending));
    }
}
