use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use eyre::eyre;
use gym_api::middleware::error_handling::{status_code, AppError};
use gym_core::errors::{EntityKind, GymError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

#[rstest]
#[case(GymError::Validation("bad".into()), StatusCode::BAD_REQUEST)]
#[case(GymError::Authentication("invalid credentials".into()), StatusCode::UNAUTHORIZED)]
#[case(GymError::NotFound("member".into()), StatusCode::NOT_FOUND)]
#[case(GymError::InvalidReference(EntityKind::Plan), StatusCode::UNPROCESSABLE_ENTITY)]
#[case(GymError::DuplicateIdentity("a@b.c".into()), StatusCode::CONFLICT)]
#[case(GymError::AlreadyBooked, StatusCode::CONFLICT)]
#[case(GymError::AlreadyCheckedIn, StatusCode::CONFLICT)]
#[case(GymError::SessionFull, StatusCode::CONFLICT)]
#[case(GymError::InvalidState("cancelled".into()), StatusCode::CONFLICT)]
#[case(GymError::Timeout, StatusCode::GATEWAY_TIMEOUT)]
#[case(GymError::Internal(eyre!("hasher")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_status_codes(#[case] err: GymError, #[case] expected: StatusCode) {
    assert_eq!(status_code(&err), expected);
}

async fn body_of(err: GymError) -> (StatusCode, Value) {
    let response = AppError(err).into_response();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_body_carries_display_text() {
    let (status, body) = body_of(GymError::InvalidReference(EntityKind::Session)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({"error": "Referenced class session does not exist"}));
}

#[tokio::test]
async fn test_persistence_detail_stays_out_of_the_body() {
    let (status, body) = body_of(GymError::Persistence(eyre!(
        "duplicate key value violates constraint \"users_email_key\""
    )))
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Persistence failure"}));
}
