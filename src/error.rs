use thiserror::Error;

/// Failures of the key-value store itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode store value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to persist store at {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Validation and lookup failures of task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("task title is required")]
    MissingTitle,

    #[error("task tag is required")]
    MissingTag,

    #[error("invalid deadline '{0}': use YYYY-MM-DD")]
    InvalidDeadline(String),

    #[error("task {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Registration, login and profile failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username is required")]
    EmptyUsername,

    #[error("password is required")]
    EmptyPassword,

    #[error("'{0}' is a reserved name")]
    ReservedUsername(String),

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("incorrect password")]
    WrongPassword,

    #[error("no user is logged in")]
    NotLoggedIn,

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
