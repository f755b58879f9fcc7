pub mod heat_generation;
pub mod leaderboard;
pub mod participant_pool;
pub mod qualification;
pub mod round_controller;
pub mod scoring;

#[cfg(test)]
mod test_support;

pub use round_controller::TournamentService;
