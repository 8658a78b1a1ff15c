#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use gym_api::{build_router, ApiState};
use gym_core::clock::FixedClock;
use gym_core::mock::MockHasher;
use gym_core::services::{ServiceSettings, Services};
use gym_core::store::Database;
use gym_db::MemoryDatabase;
use serde_json::{json, Value};

pub struct TestApp {
    pub server: TestServer,
    pub db: MemoryDatabase,
}

impl TestApp {
    /// A server over a fresh in-memory store, with the clock pinned to
    /// 2024-01-01 and a transparent password hasher.
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        let server = server_over(Arc::new(db.clone()));
        Self { server, db }
    }

    pub async fn plan(&self) -> Value {
        self.server
            .post("/plans")
            .json(&json!({
                "title": "Monthly unlimited",
                "description": null,
                "price_cents": 150000,
                "billing_cycle": "monthly",
                "session_quota": null,
                "access": "all"
            }))
            .await
            .json::<Value>()
    }

    pub async fn register(&self, email: &str, role: &str, plan_id: Option<&Value>) -> Value {
        self.server
            .post("/auth/register")
            .json(&json!({
                "first_name": "Abebe",
                "last_name": "Bikila",
                "email": email,
                "phone_number": null,
                "date_of_birth": null,
                "gender": null,
                "fitness_goals": "marathon",
                "emergency_contact_name": null,
                "emergency_contact_phone": null,
                "role": role,
                "password": "correct horse",
                "plan_id": plan_id,
                "membership_start": null,
                "membership_end": null,
                "auto_renew": null
            }))
            .await
            .json::<Value>()
    }

    /// Registers a member on a new plan and returns the member profile.
    pub async fn member(&self, email: &str) -> Value {
        let plan = self.plan().await;
        let response = self.register(email, "member", Some(&plan["id"])).await;
        response["member"].clone()
    }

    /// Creates a gym, a trainer, a class and one session of `capacity` seats.
    pub async fn session(&self, capacity: i32) -> Value {
        let gym = self
            .server
            .post("/gyms")
            .json(&json!({"name": "Bole Fitness", "address": null, "phone": null, "timezone": null}))
            .await
            .json::<Value>();
        let trainer = self
            .register(&format!("coach-{}@example.com", uuid::Uuid::new_v4()), "trainer", None)
            .await;
        let class = self
            .server
            .post("/classes")
            .json(&json!({
                "gym_id": gym["id"],
                "trainer_id": trainer["user"]["id"],
                "title": "Spin",
                "description": null,
                "capacity": 20,
                "duration_minutes": 45,
                "recurring_rule": null
            }))
            .await
            .json::<Value>();
        self.server
            .post("/sessions")
            .json(&json!({
                "class_id": class["id"],
                "starts_at": "2024-01-02T06:00:00Z",
                "ends_at": "2024-01-02T06:45:00Z",
                "capacity": capacity
            }))
            .await
            .json::<Value>()
    }
}

pub fn server_over(db: Arc<dyn Database>) -> TestServer {
    let clock = Arc::new(FixedClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let services = Services::new(
        db.clone(),
        Arc::new(MockHasher::plain()),
        clock,
        ServiceSettings::default(),
    );
    let state = Arc::new(ApiState { services, db });
    TestServer::new(build_router(state)).unwrap()
}
