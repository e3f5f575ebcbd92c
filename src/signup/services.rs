use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::signup::dto::{ConfirmOutcome, ConfirmResult, RegisterOutcome, RegisterResult};
use crate::signup::repo::User;
use crate::signup::token::confirmation_token;
use crate::state::AppState;
use crate::error::StoreError;

const EMAIL_SUBJECT: &str = "guestlist: confirm your email";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Run the registration state machine for a submitted form.
///
/// Exactly one pending record may come into existence per email, no matter
/// how many submissions race: lookups decide the friendly answer, the
/// store's primary key decides the race, and an insert conflict is resolved
/// by re-reading the record the other request created.
pub async fn register(state: &AppState, raw_email: &str, nickname: Option<&str>) -> RegisterResult {
    let email = raw_email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "rejected registration with invalid email");
        return RegisterResult {
            outcome: RegisterOutcome::InvalidEmail,
            message: "Please provide a valid email address.".to_string(),
        };
    }
    let nickname = nickname.map(str::trim).filter(|n| !n.is_empty());

    match User::find_by_email(&state.db, &email).await {
        Ok(Some(user)) => existing_user_result(&user),
        Ok(None) => register_new(state, &email, nickname).await,
        Err(e) => storage_failure(state, "read user by email", &email, &e).await,
    }
}

async fn register_new(state: &AppState, email: &str, nickname: Option<&str>) -> RegisterResult {
    let now = state.clock.now();
    let user = User {
        email: email.to_string(),
        nickname: nickname.map(String::from),
        token: confirmation_token(email, now),
        registered_at: now,
        confirmed: false,
        confirmed_at: None,
    };

    match user.insert(&state.db).await {
        Ok(()) => {
            info!(email = %user.email, "new user registered");
            send_confirmation_email(state, &user).await;
            alert_operator(
                state,
                &format!(
                    "[guestlist] New user registered: [{}] - {}",
                    user.email,
                    user.nickname.as_deref().unwrap_or("<no nickname>")
                ),
            )
            .await;
            RegisterResult {
                outcome: RegisterOutcome::Registered,
                message: format!(
                    "Thank you for registering! Please check your inbox and confirm your email ({}).",
                    user.email
                ),
            }
        }
        // Another request inserted this email between our lookup and the
        // insert; answer from the record that won the race.
        Err(StoreError::AlreadyExists) => match User::find_by_email(&state.db, email).await {
            Ok(Some(existing)) => existing_user_result(&existing),
            Ok(None) => {
                error!(email = %email, "user vanished after duplicate-insert conflict");
                internal_error_result()
            }
            Err(e) => storage_failure(state, "re-read user after insert conflict", email, &e).await,
        },
        Err(e) => {
            error!(email = %email, error = %e, "cannot insert new user");
            alert_operator(
                state,
                &format!("[guestlist] Cannot insert new user [{}]: {}", email, e),
            )
            .await;
            internal_error_result()
        }
    }
}

fn existing_user_result(user: &User) -> RegisterResult {
    if user.confirmed {
        RegisterResult {
            outcome: RegisterOutcome::AlreadyConfirmed,
            message: format!(
                "Person using email [{}] is already registered, thank you!",
                user.email
            ),
        }
    } else {
        RegisterResult {
            outcome: RegisterOutcome::AlreadyPending,
            message: format!(
                "Person using email [{}] is already registered but didn't confirm \
                 their email. Please check your inbox and spam folder.",
                user.email
            ),
        }
    }
}

/// Run the confirmation flow for a token from a visited link.
pub async fn confirm(state: &AppState, token: &str) -> ConfirmResult {
    if token.is_empty() {
        warn!("confirmation request without a token");
        return ConfirmResult {
            outcome: ConfirmOutcome::InvalidRequest,
            message: "This confirmation link is incomplete.".to_string(),
        };
    }

    match User::find_by_token(&state.db, token).await {
        Ok(Some(user)) => apply_confirm(state, &user).await,
        Ok(None) => {
            info!(token = %token, "confirmation token not found");
            token_not_found_result()
        }
        Err(e) => {
            error!(token = %token, error = %e, "cannot read user by token");
            alert_operator(
                state,
                &format!("[guestlist] Error while reading user by token: {}", e),
            )
            .await;
            ConfirmResult {
                outcome: ConfirmOutcome::InternalError,
                message: generic_failure_message(),
            }
        }
    }
}

async fn apply_confirm(state: &AppState, user: &User) -> ConfirmResult {
    let now = state.clock.now();
    match User::confirm(&state.db, &user.email, &user.token, now).await {
        Ok(1) => {
            info!(email = %user.email, "user confirmed their email");
            alert_operator(
                state,
                &format!("[guestlist] User [{}] confirmed their email", user.email),
            )
            .await;
            ConfirmResult {
                outcome: ConfirmOutcome::Confirmed,
                message: format!(
                    "Email [{}] has been confirmed. Thank you for registration!",
                    user.email
                ),
            }
        }
        // Consumed between lookup and update; indistinguishable from an
        // unknown token on purpose.
        Ok(_) => {
            info!(email = %user.email, "confirmation token already consumed");
            token_not_found_result()
        }
        Err(e @ StoreError::Fatal { .. }) => {
            error!(email = %user.email, error = %e, "confirm affected multiple rows");
            alert_operator(
                state,
                &format!("[guestlist] FATAL while confirming [{}]: {}", user.email, e),
            )
            .await;
            ConfirmResult {
                outcome: ConfirmOutcome::Fatal,
                message: generic_failure_message(),
            }
        }
        Err(e) => {
            error!(email = %user.email, error = %e, "error while confirming user");
            alert_operator(
                state,
                &format!("[guestlist] Error while confirming [{}]: {}", user.email, e),
            )
            .await;
            ConfirmResult {
                outcome: ConfirmOutcome::InternalError,
                message: generic_failure_message(),
            }
        }
    }
}

async fn send_confirmation_email(state: &AppState, user: &User) {
    let link = format!(
        "{}/confirm/{}",
        state.config.base_url.trim_end_matches('/'),
        user.token
    );
    let body = format!("Please confirm your email by clicking the link: {link}");
    if let Err(e) = state.mailer.send(&user.email, EMAIL_SUBJECT, &body).await {
        error!(email = %user.email, error = %e, "cannot send confirmation email");
    }
}

/// Best-effort operator alert; a dead chat channel never fails a request.
async fn alert_operator(state: &AppState, text: &str) {
    if let Err(e) = state.notifier.send(text).await {
        warn!(error = %e, "operator notification failed");
    }
}

async fn storage_failure(
    state: &AppState,
    op: &str,
    email: &str,
    err: &StoreError,
) -> RegisterResult {
    error!(email = %email, error = %err, "storage failure during {op}");
    alert_operator(
        state,
        &format!("[guestlist] Storage failure ({op}) for [{email}]: {err}"),
    )
    .await;
    internal_error_result()
}

fn internal_error_result() -> RegisterResult {
    RegisterResult {
        outcome: RegisterOutcome::InternalError,
        message: generic_failure_message(),
    }
}

fn token_not_found_result() -> ConfirmResult {
    ConfirmResult {
        outcome: ConfirmOutcome::TokenNotFound,
        message: "Something went wrong. This confirmation link is invalid or has \
                  already been used."
            .to_string(),
    }
}

fn generic_failure_message() -> String {
    "Something went wrong on our side. Please try again later.".to_string()
}
