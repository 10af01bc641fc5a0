use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Domain errors. All of these are printed at the shell boundary and the
/// menu loop continues; none of them terminate the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error("that username is already taken")]
    AlreadyExists,

    #[error("another appointment is already scheduled at that date and time")]
    Conflict,

    #[error("no appointment with that id")]
    NotFound,

    #[error("{0}")]
    Parse(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl Error {
    /// Remap a store unique-constraint violation into `kind`, leaving any
    /// other database error untouched. Both `users.username` and
    /// `appointments (user_id, starts_at)` uniqueness surface this way.
    pub(crate) fn on_unique_violation(self, kind: Error) -> Error {
        match &self {
            Error::Db(sqlx::Error::Database(db)) if db.is_unique_violation() => kind,
            _ => self,
        }
    }
}
