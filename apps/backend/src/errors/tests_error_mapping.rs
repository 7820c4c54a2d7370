// Unit tests for error mapping - pure domain errors without HTTP plumbing
use crate::domain::Role;
use crate::errors::{DomainError, ErrorCode};
use crate::AppError;

#[test]
fn maps_role_full_to_409() {
    let app: AppError = DomainError::RoleFull(Role::Host).into();
    assert_eq!(app.code(), ErrorCode::MatchFull);
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_identity_failures_to_401() {
    let app: AppError = DomainError::CannotReconnect.into();
    assert_eq!(app.code().as_str(), "CANNOT_RECONNECT");
    assert_eq!(app.status().as_u16(), 401);

    let app: AppError = DomainError::NotAParticipant("p-1".into()).into();
    assert_eq!(app.code(), ErrorCode::NotAParticipant);
    assert_eq!(app.status().as_u16(), 401);
}

#[test]
fn maps_not_found_to_404() {
    let app: AppError = DomainError::not_found("room-a").into();
    assert_eq!(app.code(), ErrorCode::MatchNotFound);
    assert_eq!(app.status().as_u16(), 404);
    assert!(app.detail().contains("room-a"));
}

#[test]
fn maps_readiness_failures_to_503() {
    let timeout: AppError = DomainError::InitializationTimeout.into();
    assert_eq!(timeout.status().as_u16(), 503);
    assert_eq!(timeout.code(), ErrorCode::InitializationTimeout);

    let upstream: AppError = DomainError::upstream("geo api down").into();
    assert_eq!(upstream.status().as_u16(), 503);
    assert_eq!(upstream.code(), ErrorCode::UpstreamContentFailure);
}

#[test]
fn race_loss_is_only_already_finished() {
    assert!(DomainError::AlreadyFinished(2).is_race_loss());
    assert!(!DomainError::AllRoundsPlayed.is_race_loss());
    assert!(!DomainError::NoSuchRound(5).is_race_loss());
}

#[test]
fn humanizes_codes_for_problem_titles() {
    assert_eq!(AppError::humanize_code("INVALID_ROOM_HASH"), "Invalid Room Hash");
}
