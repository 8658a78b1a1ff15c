mod common;

use std::time::Duration;

use chrono::TimeZone;
use chrono::Utc;
use common::faults::Fault;
use common::{jan_1, TestContext};
use gym_core::errors::{EntityKind, GymError};
use gym_core::models::membership::MembershipStatus;
use gym_core::models::plan::BillingCycle;
use gym_core::models::user::{RegisterRequest, Role};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

#[tokio::test]
async fn test_member_registration_creates_user_member_and_membership() {
    let ctx = TestContext::new();
    let plan = ctx.plan(BillingCycle::Monthly).await;

    let mut request = TestContext::register_request("New@Example.com ", Role::Member, Some(plan.id));
    request.membership_start = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    request.membership_end = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

    let response = ctx.services.registration.register(request).await.unwrap();

    assert_eq!(response.user.email, "new@example.com");
    assert_eq!(response.user.password_hash, "hashed:correct horse");
    let member = response.member.expect("member profile");
    assert_eq!(member.user_id, response.user.id);
    assert_eq!(member.emergency_contact.name.as_deref(), Some("Kin"));
    let membership = response.membership.expect("membership");
    assert_eq!(membership.member_id, member.id);
    assert_eq!(membership.status, MembershipStatus::Active);
    assert!(membership.auto_renew);

    let counts = ctx.db.counts().await;
    assert_eq!((counts.users, counts.members, counts.memberships), (1, 1, 1));
}

#[tokio::test]
async fn test_default_window_is_one_month_from_now() {
    let ctx = TestContext::new();
    let plan = ctx.plan(BillingCycle::Monthly).await;

    let response = ctx
        .services
        .registration
        .register(TestContext::register_request("a@example.com", Role::Member, Some(plan.id)))
        .await
        .unwrap();

    let membership = response.membership.unwrap();
    assert_eq!(membership.start_date, jan_1());
    assert_eq!(membership.end_date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn test_unknown_plan_leaves_no_rows() {
    let ctx = TestContext::new();

    let err = ctx
        .services
        .registration
        .register(TestContext::register_request(
            "ghost@example.com",
            Role::Member,
            Some(Uuid::new_v4()),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, GymError::InvalidReference(EntityKind::Plan)));
    let counts = ctx.db.counts().await;
    assert_eq!((counts.users, counts.members, counts.memberships), (0, 0, 0));
}

#[tokio::test]
async fn test_bad_window_rejected_without_writes() {
    let ctx = TestContext::new();
    let plan = ctx.plan(BillingCycle::Monthly).await;

    let mut request = TestContext::register_request("w@example.com", Role::Member, Some(plan.id));
    request.membership_start = Some(jan_1());
    request.membership_end = Some(jan_1());

    let err = ctx.services.registration.register(request).await.unwrap_err();
    assert!(matches!(err, GymError::Validation(_)));
    assert_eq!(ctx.db.counts().await.users, 0);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected_case_insensitively() {
    let ctx = TestContext::new();
    ctx.trainer("coach@example.com").await;

    let err = ctx
        .services
        .registration
        .register(TestContext::register_request("COACH@example.com", Role::Trainer, None))
        .await
        .unwrap_err();

    assert!(matches!(err, GymError::DuplicateIdentity(email) if email == "coach@example.com"));
    assert_eq!(ctx.db.counts().await.users, 1);
}

#[tokio::test]
async fn test_trainer_registration_has_no_profile() {
    let ctx = TestContext::new();

    let response = ctx
        .services
        .registration
        .register(TestContext::register_request("t@example.com", Role::Trainer, None))
        .await
        .unwrap();

    assert!(response.member.is_none());
    assert!(response.membership.is_none());
    assert_eq!(ctx.db.counts().await.members, 0);
}

#[tokio::test]
async fn test_login_and_user_listing() {
    let ctx = TestContext::new();
    ctx.member("m@example.com").await;
    ctx.trainer("t@example.com").await;

    let user = ctx
        .services
        .identity
        .login(" M@example.com", "correct horse")
        .await
        .unwrap();
    assert_eq!(user.email, "m@example.com");

    let wrong = ctx.services.identity.login("m@example.com", "nope").await;
    let unknown = ctx.services.identity.login("x@example.com", "correct horse").await;
    for result in [wrong, unknown] {
        assert!(matches!(result, Err(GymError::Authentication(msg)) if msg == "invalid credentials"));
    }

    let trainers = ctx.services.identity.list_users(Some(Role::Trainer)).await.unwrap();
    assert_eq!(trainers.len(), 1);
    assert_eq!(trainers[0].email, "t@example.com");
    assert_eq!(ctx.services.identity.list_users(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_membership_write_failure_leaves_no_rows() {
    let ctx = TestContext::with_fault(Fault::FailMembershipInsert, Duration::from_secs(5));
    let plan = ctx.plan(BillingCycle::Monthly).await;

    let err = ctx
        .services
        .registration
        .register(TestContext::register_request("late@example.com", Role::Member, Some(plan.id)))
        .await
        .unwrap_err();

    assert!(matches!(err, GymError::Internal(_)));
    let counts = ctx.db.counts().await;
    assert_eq!((counts.users, counts.members, counts.memberships), (0, 0, 0));
    assert_eq!(counts.plans, 1);
}

#[rstest]
#[case::plan(Role::Trainer, |r: &mut RegisterRequest| r.plan_id = Some(Uuid::new_v4()))]
#[case::start(Role::Admin, |r: &mut RegisterRequest| r.membership_start = Some(jan_1()))]
#[case::end(Role::Trainer, |r: &mut RegisterRequest| r.membership_end = Some(jan_1()))]
#[case::auto_renew(Role::Admin, |r: &mut RegisterRequest| r.auto_renew = Some(false))]
#[tokio::test]
async fn test_membership_fields_rejected_for_non_members(
    #[case] role: Role,
    #[case] set: fn(&mut RegisterRequest),
) {
    let ctx = TestContext::new();
    let mut request = TestContext::register_request("staff@example.com", role, None);
    set(&mut request);

    let err = ctx.services.registration.register(request).await.unwrap_err();

    assert!(matches!(err, GymError::Validation(msg) if msg.contains("only accepted when registering a member")));
    assert_eq!(ctx.db.counts().await.users, 0);
}
