mod event;
mod heat;
mod registration;
mod score;
mod sub_event;

pub use event::Event;
pub use heat::{Heat, HeatParticipant, HeatStatus, NewHeat};
pub use registration::{Member, Participation, Registration, RegistrationStatus};
pub use score::{NewScore, Score};
pub use sub_event::{
    CriteriaDefinitions, CriterionDefinition, ParticipationMode, RoundFormat, SubEvent,
};
