#![allow(dead_code)]

pub mod faults;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use gym_core::clock::FixedClock;
use gym_core::mock::MockHasher;
use gym_core::models::{
    class::{Class, ClassSession, CreateClassRequest, NewSession},
    gym::CreateGymRequest,
    member::Member,
    plan::{BillingCycle, CreatePlanRequest, Plan},
    user::{NewIdentity, RegisterRequest, RegisterResponse, Role, User},
};
use gym_core::models::membership::OverlapPolicy;
use gym_core::services::{ServiceSettings, Services};
use gym_core::store::Database;
use gym_db::MemoryDatabase;
use serde_json::json;
use uuid::Uuid;

use self::faults::{Fault, FaultyDatabase};

pub fn jan_1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub struct TestContext {
    pub db: MemoryDatabase,
    pub clock: Arc<FixedClock>,
    pub services: Services,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_overlap_policy(policy: OverlapPolicy) -> Self {
        Self::with_settings(ServiceSettings {
            overlap_policy: policy,
            ..ServiceSettings::default()
        })
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_settings(ServiceSettings {
            operation_timeout: timeout,
            ..ServiceSettings::default()
        })
    }

    /// Services run against a store that injects `fault`; `db` still reads
    /// the committed state.
    pub fn with_fault(fault: Fault, timeout: Duration) -> Self {
        let db = MemoryDatabase::new();
        let store = Arc::new(FaultyDatabase::new(db.clone(), fault));
        let settings = ServiceSettings {
            operation_timeout: timeout,
            ..ServiceSettings::default()
        };
        Self::over(db, store, settings)
    }

    fn with_settings(settings: ServiceSettings) -> Self {
        let db = MemoryDatabase::new();
        Self::over(db.clone(), Arc::new(db), settings)
    }

    fn over(db: MemoryDatabase, store: Arc<dyn Database>, settings: ServiceSettings) -> Self {
        let clock = Arc::new(FixedClock::new(jan_1()));
        let services = Services::new(
            store,
            Arc::new(MockHasher::plain()),
            clock.clone(),
            settings,
        );
        Self { db, clock, services }
    }

    pub async fn plan(&self, cycle: BillingCycle) -> Plan {
        self.services
            .plans
            .create(CreatePlanRequest {
                title: format!("{cycle} access"),
                description: None,
                price_cents: 120_000,
                billing_cycle: cycle,
                session_quota: None,
                access: "all".to_string(),
            })
            .await
            .expect("plan created")
    }

    pub fn register_request(email: &str, role: Role, plan_id: Option<Uuid>) -> RegisterRequest {
        RegisterRequest {
            identity: NewIdentity {
                first_name: "Test".to_string(),
                last_name: "Person".to_string(),
                email: email.to_string(),
                phone_number: Some("+251911000000".to_string()),
                date_of_birth: None,
                gender: Some("female".to_string()),
                fitness_goals: None,
                emergency_contact_name: Some("Kin".to_string()),
                emergency_contact_phone: Some("+251911111111".to_string()),
                role,
            },
            password: "correct horse".to_string(),
            plan_id,
            membership_start: None,
            membership_end: None,
            auto_renew: None,
        }
    }

    /// Registers a member on a fresh monthly plan.
    pub async fn member(&self, email: &str) -> Member {
        let plan = self.plan(BillingCycle::Monthly).await;
        let response: RegisterResponse = self
            .services
            .registration
            .register(Self::register_request(email, Role::Member, Some(plan.id)))
            .await
            .expect("member registered");
        response.member.expect("member profile")
    }

    pub async fn trainer(&self, email: &str) -> User {
        self.services
            .registration
            .register(Self::register_request(email, Role::Trainer, None))
            .await
            .expect("trainer registered")
            .user
    }

    pub async fn class(&self, capacity: i32) -> Class {
        let gym = self
            .services
            .catalog
            .create_gym(CreateGymRequest {
                name: "Bole Fitness".to_string(),
                address: Some("Addis Ababa".to_string()),
                phone: None,
                timezone: Some("Africa/Addis_Ababa".to_string()),
                opening_hours: json!({"mon": "06:00-22:00"}),
                settings: json!({}),
            })
            .await
            .expect("gym created");
        let trainer = self.trainer(&format!("coach-{}@example.com", Uuid::new_v4())).await;
        self.services
            .catalog
            .create_class(CreateClassRequest {
                gym_id: gym.id,
                trainer_id: trainer.id,
                title: "Spin".to_string(),
                description: None,
                capacity,
                duration_minutes: 45,
                recurring_rule: None,
            })
            .await
            .expect("class created")
    }

    pub async fn session(&self, capacity: Option<i32>) -> ClassSession {
        let class = self.class(20).await;
        let starts_at = jan_1() + chrono::Duration::days(1);
        self.services
            .catalog
            .create_session(NewSession {
                class_id: class.id,
                starts_at,
                ends_at: starts_at + chrono::Duration::minutes(45),
                capacity,
            })
            .await
            .expect("session created")
    }
}
