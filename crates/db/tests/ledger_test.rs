mod common;

use std::time::Duration;

use common::faults::Fault;
use common::TestContext;
use gym_core::errors::{EntityKind, GymError};
use gym_core::models::attendance::CheckinMethod;
use gym_core::models::member::{CreateMemberRequest, EmergencyContact, UpdateMemberRequest};
use gym_core::models::payment::{PaymentStatus, RecordPaymentRequest, DEFAULT_CURRENCY};
use gym_core::models::plan::{BillingCycle, UpdatePlanRequest};
use gym_core::models::user::Role;
use gym_core::store::Database;
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

fn payment(member_id: Uuid, amount_cents: i64) -> RecordPaymentRequest {
    RecordPaymentRequest {
        member_id,
        amount_cents,
        currency: None,
        method: "telebirr".to_string(),
        status: None,
        reference: Some("TX-1".to_string()),
    }
}

#[tokio::test]
async fn test_payment_defaults_and_listing() {
    let ctx = TestContext::new();
    let member = ctx.member("m@example.com").await;

    let first = ctx.services.payments.record(payment(member.id, 50_000)).await.unwrap();
    assert_eq!(first.currency, DEFAULT_CURRENCY);
    assert_eq!(first.status, PaymentStatus::Pending);

    ctx.clock.advance(chrono::Duration::minutes(5));
    let mut request = payment(member.id, 75_000);
    request.currency = Some("usd".to_string());
    request.status = Some(PaymentStatus::Completed);
    let second = ctx.services.payments.record(request).await.unwrap();
    assert_eq!(second.currency, "USD");

    let listed = ctx.services.payments.list_by_member(member.id).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(ctx.services.payments.list_all().await.unwrap().len(), 2);
}

#[rstest]
#[case(0, "telebirr")]
#[case(-100, "cash")]
#[case(100, "  ")]
#[tokio::test]
async fn test_payment_validation(#[case] amount_cents: i64, #[case] method: &str) {
    let ctx = TestContext::new();
    let member = ctx.member("m@example.com").await;
    let mut request = payment(member.id, amount_cents);
    request.method = method.to_string();

    let err = ctx.services.payments.record(request).await.unwrap_err();
    assert!(matches!(err, GymError::Validation(_)));
}

#[tokio::test]
async fn test_payment_for_unknown_member() {
    let ctx = TestContext::new();
    let err = ctx
        .services
        .payments
        .record(payment(Uuid::new_v4(), 100))
        .await
        .unwrap_err();
    assert!(matches!(err, GymError::InvalidReference(EntityKind::Member)));
}

#[tokio::test]
async fn test_member_profile_rules() {
    let ctx = TestContext::new();
    let trainer = ctx.trainer("t@example.com").await;
    let user = ctx
        .services
        .registration
        .register(TestContext::register_request("walkin@example.com", Role::Admin, None))
        .await
        .unwrap()
        .user;

    let request = |user_id| CreateMemberRequest {
        user_id,
        first_name: "Walk".to_string(),
        last_name: "In".to_string(),
        date_of_birth: None,
        gender: None,
        emergency_contact: None,
        notes: None,
    };

    let err = ctx.services.members.create(request(Uuid::new_v4())).await.unwrap_err();
    assert!(matches!(err, GymError::InvalidReference(EntityKind::User)));

    for user_id in [trainer.id, user.id] {
        let err = ctx.services.members.create(request(user_id)).await.unwrap_err();
        assert!(matches!(err, GymError::Validation(_)));
    }

    let existing = ctx.member("m@example.com").await;
    let err = ctx.services.members.create(request(existing.user_id)).await.unwrap_err();
    assert!(matches!(err, GymError::Validation(msg) if msg.contains("already")));
}

#[tokio::test]
async fn test_member_update_and_cascading_delete() {
    let ctx = TestContext::new();
    let member = ctx.member("m@example.com").await;
    let session = ctx.session(None).await;
    ctx.services.bookings.book(member.id, session.id).await.unwrap();
    ctx.services
        .attendance
        .check_in(member.id, session.id, CheckinMethod::Qr)
        .await
        .unwrap();
    ctx.services.payments.record(payment(member.id, 100)).await.unwrap();

    let updated = ctx
        .services
        .members
        .update(
            member.id,
            UpdateMemberRequest {
                notes: Some("prefers mornings".to_string()),
                emergency_contact: Some(EmergencyContact {
                    name: Some("Sibling".to_string()),
                    phone: None,
                }),
                ..UpdateMemberRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.notes.as_deref(), Some("prefers mornings"));
    assert_eq!(ctx.services.members.get(member.id).await.unwrap(), updated);

    ctx.services.members.delete(member.id).await.unwrap();
    let counts = ctx.db.counts().await;
    assert_eq!(
        (counts.members, counts.memberships, counts.bookings, counts.attendance, counts.payments),
        (0, 0, 0, 0, 0)
    );
    assert_eq!(counts.users, 2);

    let err = ctx.services.members.delete(member.id).await.unwrap_err();
    assert!(matches!(err, GymError::NotFound(_)));
}

#[tokio::test]
async fn test_plan_update_revalidates() {
    let ctx = TestContext::new();
    let plan = ctx.plan(BillingCycle::Quarterly).await;

    let err = ctx
        .services
        .plans
        .update(
            plan.id,
            UpdatePlanRequest {
                price_cents: Some(-1),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GymError::Validation(_)));
    assert_eq!(ctx.services.plans.get(plan.id).await.unwrap().price_cents, 120_000);

    let updated = ctx
        .services
        .plans
        .update(
            plan.id,
            UpdatePlanRequest {
                billing_cycle: Some(BillingCycle::Annual),
                ..UpdatePlanRequest::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.billing_cycle, BillingCycle::Annual);
}

#[test_log::test(tokio::test)]
async fn test_timed_out_operation_writes_nothing() {
    let ctx = TestContext::with_timeout(Duration::from_millis(50));
    let holder = ctx.db.clone();

    // Another unit of work holds the store, so the listing never starts.
    let blocking = holder.begin().await.unwrap();
    let err = ctx.services.plans.list().await.unwrap_err();
    assert!(matches!(err, GymError::Timeout));
    drop(blocking);

    assert_eq!(ctx.db.counts().await.plans, 0);
    assert!(ctx.services.plans.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_write_timed_out_midway_commits_nothing() {
    let ctx = TestContext::with_fault(
        Fault::StallMemberInsert(Duration::from_millis(250)),
        Duration::from_millis(50),
    );
    let plan = ctx.plan(BillingCycle::Monthly).await;

    let err = ctx
        .services
        .registration
        .register(TestContext::register_request("slow@example.com", Role::Member, Some(plan.id)))
        .await
        .unwrap_err();
    assert!(matches!(err, GymError::Timeout));

    let counts = ctx.db.counts().await;
    assert_eq!((counts.users, counts.members, counts.memberships), (0, 0, 0));
    assert!(ctx.services.identity.list_users(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_commit_in_flight_at_deadline_reports_its_outcome() {
    let ctx = TestContext::with_fault(
        Fault::StallCommit(Duration::from_millis(150)),
        Duration::from_millis(50),
    );

    let response = ctx
        .services
        .registration
        .register(TestContext::register_request("desk@example.com", Role::Admin, None))
        .await
        .unwrap();

    let users = ctx.services.identity.list_users(None).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, response.user.id);
}
