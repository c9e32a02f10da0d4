use thiserror::Error;

/// Everything the store can report, classified. Constraint failures that
/// slip past the gateway's own checks are mapped from the driver's extended
/// result codes so callers only ever match on this enum.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A field-level rule was violated; nothing was written.
    #[error("{field} {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A write referenced a parent row that does not exist.
    #[error("referenced {0} does not exist")]
    ForeignKey(&'static str),

    /// A unique column already holds this value.
    #[error("{0} is already taken")]
    UniqueConstraint(&'static str),

    /// No row with the requested id.
    #[error("no such row")]
    NotFound,

    /// The store is unreachable or cannot be opened.
    #[error("database unavailable: {0}")]
    Connection(String),

    /// The credential hasher was invoked in breach of its contract.
    #[error("credential error: {0}")]
    InvalidCredential(#[from] tally_auth::CredentialError),

    /// Anything else the driver reported.
    #[error("database error: {0}")]
    Internal(String),
}

// SQLite extended result codes, per https://sqlite.org/rescode.html
const SQLITE_CONSTRAINT_FOREIGNKEY: i32 = 787;
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match &err {
            rusqlite::Error::SqliteFailure(cause, message) => match cause.code {
                ErrorCode::ConstraintViolation => {
                    classify_constraint(cause.extended_code, message.as_deref())
                }
                ErrorCode::CannotOpen
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::NotADatabase => Self::Connection(err.to_string()),
                _ => Self::Internal(err.to_string()),
            },
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound,
            _ => Self::Internal(err.to_string()),
        }
    }
}

fn classify_constraint(extended_code: i32, message: Option<&str>) -> StoreError {
    match extended_code {
        SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::ForeignKey("row"),
        SQLITE_CONSTRAINT_UNIQUE => {
            // the driver names the column as "<table>.<column>"
            let field = match message {
                Some(m) if m.contains("user.email") => "email",
                _ => "unique field",
            };
            StoreError::UniqueConstraint(field)
        }
        _ => StoreError::Internal(format!(
            "constraint violation (extended code {extended_code})"
        )),
    }
}
