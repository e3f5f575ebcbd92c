use thiserror::Error;

/// Errors surfaced by the persistence layer.
///
/// Lookup misses are not errors; `find_*` return `Ok(None)` for those.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A keyed lookup matched more than one row. The schema makes this
    /// structurally impossible, so hitting it means the store can no longer
    /// be trusted.
    #[error("more than one user matched {column}={value}: {rows} rows")]
    NotUnique {
        column: &'static str,
        value: String,
        rows: usize,
    },

    /// Insert hit the primary-key constraint: a record with this email
    /// already exists. Recoverable — callers re-read and answer from the
    /// existing record.
    #[error("user already exists")]
    AlreadyExists,

    /// A keyed update affected more than a single row. Invariant breach,
    /// never swallowed.
    #[error("confirm for email={email} affected {rows} rows, expected exactly one")]
    Fatal { email: String, rows: u64 },

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Errors from outbound transports (email, operator chat). These never fail
/// the enclosing request; callers log and move on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("invalid mailbox address: {0}")]
    Address(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: status={status}, body={body}")]
    Api { status: u16, body: String },
}
