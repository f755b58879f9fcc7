use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    /// A unique-key clash. Raised only by `from_unique` and by the in-memory
    /// store's duplicate checks; other constraint failures stay `Database`.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// True for a mapped `ConstraintViolation` or a raw Postgres 23505.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::ConstraintViolation(_) => true,
            StorageError::Database(sqlx::Error::Database(e)) => {
                e.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Maps a unique-key violation raised by Postgres into `ConstraintViolation`,
    /// leaving every other error untouched.
    pub(crate) fn from_unique(error: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = error
            && db_err.code().as_deref() == Some("23505")
        {
            return StorageError::ConstraintViolation(message.to_string());
        }
        StorageError::from(error)
    }
}

/// Failures of the heat tournament engine, reported to callers as-is.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("No eligible participants for round {round}")]
    EmptyPool { round: i32 },

    #[error("Heats for round {round} already exist")]
    DuplicateRound { round: i32 },

    #[error("Registration {0} is not a participant of this heat")]
    InvalidParticipant(uuid::Uuid),

    #[error("Round {round} is not complete: {detail}")]
    IncompleteRound { round: i32, detail: String },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Round {round} is closed: {reason}")]
    RoundClosed { round: i32, reason: String },

    #[error("Invalid heat transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type TournamentResult<T> = std::result::Result<T, TournamentError>;

impl TournamentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TournamentError::Storage(StorageError::NotFound))
    }
}
