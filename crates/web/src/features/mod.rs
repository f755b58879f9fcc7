pub mod events;
pub mod heats;
pub mod sub_events;
