pub mod common;
pub mod heat;
pub mod ranking;
pub mod round;
pub mod scoring;
