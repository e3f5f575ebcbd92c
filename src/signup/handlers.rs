use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Form;
use tracing::instrument;

use crate::signup::dto::{ConfirmOutcome, RegisterForm, RegisterOutcome};
use crate::signup::{pages, services};
use crate::state::AppState;

pub async fn index() -> Html<String> {
    Html(pages::landing())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn policy() -> Html<String> {
    Html(pages::policy())
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> (StatusCode, Html<String>) {
    let result = services::register(&state, &form.email, form.nickname.as_deref()).await;
    let body = match result.outcome {
        RegisterOutcome::Registered => pages::notice(&result.message),
        _ => pages::error(&result.message),
    };
    (register_status(result.outcome), Html(body))
}

#[instrument(skip(state))]
pub async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> (StatusCode, Html<String>) {
    let result = services::confirm(&state, &token).await;
    let body = match result.outcome {
        ConfirmOutcome::Confirmed => pages::notice(&result.message),
        _ => pages::error(&result.message),
    };
    (confirm_status(result.outcome), Html(body))
}

fn register_status(outcome: RegisterOutcome) -> StatusCode {
    match outcome {
        RegisterOutcome::Registered
        | RegisterOutcome::AlreadyPending
        | RegisterOutcome::AlreadyConfirmed => StatusCode::OK,
        RegisterOutcome::InvalidEmail => StatusCode::BAD_REQUEST,
        RegisterOutcome::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn confirm_status(outcome: ConfirmOutcome) -> StatusCode {
    match outcome {
        ConfirmOutcome::Confirmed => StatusCode::OK,
        ConfirmOutcome::TokenNotFound => StatusCode::NOT_FOUND,
        ConfirmOutcome::InvalidRequest => StatusCode::BAD_REQUEST,
        ConfirmOutcome::Fatal | ConfirmOutcome::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_outcomes_map_to_statuses() {
        assert_eq!(register_status(RegisterOutcome::Registered), StatusCode::OK);
        assert_eq!(
            register_status(RegisterOutcome::AlreadyPending),
            StatusCode::OK
        );
        assert_eq!(
            register_status(RegisterOutcome::InvalidEmail),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            register_status(RegisterOutcome::InternalError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn confirm_outcomes_map_to_statuses() {
        assert_eq!(confirm_status(ConfirmOutcome::Confirmed), StatusCode::OK);
        assert_eq!(
            confirm_status(ConfirmOutcome::TokenNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            confirm_status(ConfirmOutcome::InvalidRequest),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            confirm_status(ConfirmOutcome::Fatal),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
