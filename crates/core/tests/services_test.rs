use std::sync::Arc;

use chrono::{TimeZone, Utc};
use gym_core::clock::FixedClock;
use gym_core::errors::GymError;
use gym_core::mock::{MockHasher, MockStore};
use gym_core::models::class::NewSession;
use gym_core::models::user::{NewIdentity, RegisterRequest, Role};
use gym_core::services::{ServiceSettings, Services};
use uuid::Uuid;

fn services(store: MockStore, hasher: MockHasher) -> Services {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    Services::new(
        Arc::new(store),
        Arc::new(hasher),
        Arc::new(clock),
        ServiceSettings::default(),
    )
}

fn identity(role: Role) -> NewIdentity {
    NewIdentity {
        first_name: "Liya".to_string(),
        last_name: "Haile".to_string(),
        email: "liya@example.com".to_string(),
        phone_number: None,
        date_of_birth: None,
        gender: None,
        fitness_goals: None,
        emergency_contact_name: None,
        emergency_contact_phone: None,
        role,
    }
}

#[tokio::test]
async fn test_member_registration_requires_plan_before_touching_store() {
    let mut store = MockStore::new();
    store.expect_begin().never();
    let mut hasher = MockHasher::new();
    hasher.expect_hash().never();

    let services = services(store, hasher);
    let err = services
        .registration
        .register(RegisterRequest {
            identity: identity(Role::Member),
            password: "secret".to_string(),
            plan_id: None,
            membership_start: None,
            membership_end: None,
            auto_renew: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GymError::Validation(msg) if msg.contains("plan_id")));
}

#[tokio::test]
async fn test_hasher_failure_is_internal() {
    let mut store = MockStore::new();
    store.expect_begin().never();
    let mut hasher = MockHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Err(GymError::Internal(eyre::eyre!("out of memory"))));

    let services = services(store, hasher);
    let err = services
        .registration
        .register(RegisterRequest {
            identity: identity(Role::Trainer),
            password: "secret".to_string(),
            plan_id: None,
            membership_start: None,
            membership_end: None,
            auto_renew: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GymError::Internal(_)));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_persistence() {
    let mut store = MockStore::new();
    store
        .expect_begin()
        .times(1)
        .returning(|| Err(GymError::persistence(eyre::eyre!("connection refused"))));

    let services = services(store, MockHasher::plain());
    let err = services.plans.list().await.unwrap_err();

    assert!(matches!(err, GymError::Persistence(_)));
    assert_eq!(err.to_string(), "Persistence failure");
}

#[tokio::test]
async fn test_session_window_checked_before_store() {
    let mut store = MockStore::new();
    store.expect_begin().never();

    let services = services(store, MockHasher::plain());
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let err = services
        .catalog
        .create_session(NewSession {
            class_id: Uuid::new_v4(),
            starts_at: start,
            ends_at: start,
            capacity: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, GymError::Validation(_)));
}
