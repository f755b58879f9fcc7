use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ParticipationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "registration_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Member {
    pub user_id: Uuid,
    pub name: String,
}

/// Who is behind a registration: a single participant or a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Participation {
    Solo {
        participant: Member,
    },
    Group {
        team_name: String,
        leader: Member,
        members: Vec<Member>,
    },
}

impl Participation {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Solo { participant } => &participant.name,
            Self::Group { team_name, .. } => team_name,
        }
    }

    /// Number of people competing under this registration, the leader included.
    pub fn head_count(&self) -> usize {
        match self {
            Self::Solo { .. } => 1,
            Self::Group { members, .. } => 1 + members.len(),
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Self::Group { .. })
    }

    pub fn mode(&self) -> ParticipationMode {
        match self {
            Self::Solo { .. } => ParticipationMode::Solo,
            Self::Group { .. } => ParticipationMode::Group,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Registration {
    pub registration_id: Uuid,
    pub sub_event_id: Uuid,
    #[schema(value_type = Participation)]
    pub participation: Json<Participation>,
    pub department: String,
    pub year: i32,
    pub division: String,
    pub status: RegistrationStatus,
    pub current_round: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Registration {
    pub fn is_eligible(&self) -> bool {
        self.status == RegistrationStatus::Approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> Member {
        Member {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_solo_head_count() {
        let solo = Participation::Solo {
            participant: member("Asha"),
        };
        assert_eq!(solo.head_count(), 1);
        assert_eq!(solo.display_name(), "Asha");
        assert!(!solo.is_team());
        assert_eq!(solo.mode(), ParticipationMode::Solo);
    }

    #[test]
    fn test_group_counts_leader_and_members() {
        let group = Participation::Group {
            team_name: "Relay Kings".to_string(),
            leader: member("Ravi"),
            members: vec![member("Meera"), member("Kabir")],
        };
        assert_eq!(group.head_count(), 3);
        assert_eq!(group.display_name(), "Relay Kings");
        assert!(group.is_team());
        assert_eq!(group.mode(), ParticipationMode::Group);
    }

    #[test]
    fn test_participation_tagged_serialization() {
        let solo = Participation::Solo {
            participant: member("Asha"),
        };
        let value = serde_json::to_value(&solo).unwrap();
        assert_eq!(value["type"], "solo");
        assert_eq!(value["participant"]["name"], "Asha");
    }
}
