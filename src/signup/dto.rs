use serde::Deserialize;

/// Form body of `POST /register`.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// New pending record created, confirmation email dispatched.
    Registered,
    /// Record exists but was never confirmed; no new email is sent so a
    /// repeat form submission cannot be used to spam the inbox.
    AlreadyPending,
    /// Record exists and is confirmed; nothing to do.
    AlreadyConfirmed,
    /// Email failed shape validation; the store was never touched.
    InvalidEmail,
    /// Storage failure; details stay in the logs and the operator channel.
    InternalError,
}

/// What the HTTP layer renders back after a registration attempt.
#[derive(Debug)]
pub struct RegisterResult {
    pub outcome: RegisterOutcome,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// Unknown token, or a valid one consumed by a concurrent request.
    /// Deliberately indistinguishable to the caller.
    TokenNotFound,
    /// Empty token; no lookup is attempted.
    InvalidRequest,
    /// A keyed update touched more than one row. Signals an invariant
    /// breach in the store.
    Fatal,
    InternalError,
}

/// What the HTTP layer renders back after a confirmation attempt.
#[derive(Debug)]
pub struct ConfirmResult {
    pub outcome: ConfirmOutcome,
    pub message: String,
}
