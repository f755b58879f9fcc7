pub mod event;
pub mod heat;
pub mod registration;
pub mod score;
pub mod sub_event;
