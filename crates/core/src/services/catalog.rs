//! Gyms, classes and their scheduled sessions.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::class::{
    Class, ClassSession, CreateClassRequest, NewSession, SessionStatus,
};
use crate::models::gym::{CreateGymRequest, Gym, UpdateGymRequest};
use crate::models::user::Role;
use crate::services::{finish, ServiceContext};
use crate::store::Transaction;
use crate::time::ensure_window;

fn gym_not_found(id: Uuid) -> GymError {
    GymError::NotFound(format!("Gym with ID {id} not found"))
}

fn class_not_found(id: Uuid) -> GymError {
    GymError::NotFound(format!("Class with ID {id} not found"))
}

fn session_not_found(id: Uuid) -> GymError {
    GymError::NotFound(format!("Session with ID {id} not found"))
}

async fn insert_class_checked(tx: &mut dyn Transaction, class: &Class) -> GymResult<()> {
    if tx.find_gym_by_id(class.gym_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Gym));
    }
    match tx.find_user_by_id(class.trainer_id).await? {
        Some(user) if user.role == Role::Trainer => {}
        _ => return Err(GymError::InvalidReference(EntityKind::Trainer)),
    }
    tx.insert_class(class).await
}

async fn insert_session_checked(
    tx: &mut dyn Transaction,
    new: NewSession,
    now: DateTime<Utc>,
) -> GymResult<ClassSession> {
    let class = tx
        .find_class_by_id(new.class_id)
        .await?
        .ok_or(GymError::InvalidReference(EntityKind::Class))?;

    let session = ClassSession {
        id: Uuid::new_v4(),
        class_id: class.id,
        starts_at: new.starts_at,
        ends_at: new.ends_at,
        capacity: new.capacity.unwrap_or_else(|| class.session_capacity()),
        status: SessionStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };
    tx.insert_session(&session).await?;
    Ok(session)
}

async fn close_session(
    tx: &mut dyn Transaction,
    id: Uuid,
    target: SessionStatus,
    now: DateTime<Utc>,
) -> GymResult<ClassSession> {
    let mut session = tx
        .lock_session(id)
        .await?
        .ok_or_else(|| session_not_found(id))?;
    session.close(target, now)?;
    tx.update_session(&session).await?;
    Ok(session)
}

/// Class & Session Catalog.
#[derive(Clone)]
pub struct CatalogService {
    ctx: ServiceContext,
}

impl CatalogService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn create_gym(&self, request: CreateGymRequest) -> GymResult<Gym> {
        self.ctx
            .within("catalog.create_gym", self.create_gym_inner(request))
            .await
    }

    pub async fn list_gyms(&self) -> GymResult<Vec<Gym>> {
        self.ctx.within("catalog.list_gyms", self.list_gyms_inner()).await
    }

    pub async fn get_gym(&self, id: Uuid) -> GymResult<Gym> {
        self.ctx.within("catalog.get_gym", self.get_gym_inner(id)).await
    }

    pub async fn update_gym(&self, id: Uuid, update: UpdateGymRequest) -> GymResult<Gym> {
        self.ctx
            .within("catalog.update_gym", self.update_gym_inner(id, update))
            .await
    }

    pub async fn create_class(&self, request: CreateClassRequest) -> GymResult<Class> {
        self.ctx
            .within("catalog.create_class", self.create_class_inner(request))
            .await
    }

    pub async fn list_classes(&self) -> GymResult<Vec<Class>> {
        self.ctx
            .within("catalog.list_classes", self.list_classes_inner())
            .await
    }

    pub async fn get_class(&self, id: Uuid) -> GymResult<Class> {
        self.ctx.within("catalog.get_class", self.get_class_inner(id)).await
    }

    /// Schedules one occurrence of a class. Without an explicit capacity the
    /// session inherits the class capacity.
    pub async fn create_session(&self, new: NewSession) -> GymResult<ClassSession> {
        self.ctx
            .within("catalog.create_session", self.create_session_inner(new))
            .await
    }

    /// All sessions ordered by start time, or only those of `class_id`.
    pub async fn list_sessions(&self, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>> {
        self.ctx
            .within("catalog.list_sessions", self.list_sessions_inner(class_id))
            .await
    }

    pub async fn get_session(&self, id: Uuid) -> GymResult<ClassSession> {
        self.ctx
            .within("catalog.get_session", self.get_session_inner(id))
            .await
    }

    pub async fn cancel_session(&self, id: Uuid) -> GymResult<ClassSession> {
        self.ctx
            .within(
                "catalog.cancel_session",
                self.close_session_inner(id, SessionStatus::Cancelled),
            )
            .await
    }

    pub async fn complete_session(&self, id: Uuid) -> GymResult<ClassSession> {
        self.ctx
            .within(
                "catalog.complete_session",
                self.close_session_inner(id, SessionStatus::Completed),
            )
            .await
    }

    async fn create_gym_inner(&self, request: CreateGymRequest) -> GymResult<Gym> {
        if request.name.trim().is_empty() {
            return Err(GymError::Validation("Gym name cannot be empty".to_string()));
        }
        let now = self.ctx.clock.now();
        let gym = Gym {
            id: Uuid::new_v4(),
            name: request.name,
            address: request.address,
            phone: request.phone,
            timezone: request.timezone,
            opening_hours: request.opening_hours,
            settings: request.settings,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.ctx.db.begin().await?;
        let result = tx.insert_gym(&gym).await;
        finish(tx, result).await?;

        info!(gym_id = %gym.id, name = %gym.name, "gym created");
        Ok(gym)
    }

    async fn list_gyms_inner(&self) -> GymResult<Vec<Gym>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_gyms().await;
        let gyms = finish(tx, result).await?;
        debug!(count = gyms.len(), "listed gyms");
        Ok(gyms)
    }

    async fn get_gym_inner(&self, id: Uuid) -> GymResult<Gym> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_gym_by_id(id).await;
        finish(tx, result).await?.ok_or_else(|| gym_not_found(id))
    }

    async fn update_gym_inner(&self, id: Uuid, update: UpdateGymRequest) -> GymResult<Gym> {
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(GymError::Validation("Gym name cannot be empty".to_string()));
        }
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = async {
            let mut gym = tx.find_gym_by_id(id).await?.ok_or_else(|| gym_not_found(id))?;
            gym.apply(update, now);
            tx.update_gym(&gym).await?;
            Ok::<_, GymError>(gym)
        }
        .await;
        let gym = finish(tx, result).await?;
        info!(gym_id = %id, "gym updated");
        Ok(gym)
    }

    async fn create_class_inner(&self, request: CreateClassRequest) -> GymResult<Class> {
        if request.title.trim().is_empty() {
            return Err(GymError::Validation("Class title cannot be empty".to_string()));
        }
        if request.capacity <= 0 {
            return Err(GymError::Validation("Class capacity must be positive".to_string()));
        }
        if request.duration_minutes <= 0 {
            return Err(GymError::Validation("Class duration must be positive".to_string()));
        }

        let now = self.ctx.clock.now();
        let class = Class {
            id: Uuid::new_v4(),
            gym_id: request.gym_id,
            title: request.title,
            description: request.description,
            trainer_id: request.trainer_id,
            capacity: request.capacity,
            recurring_rule: request.recurring_rule,
            duration_minutes: request.duration_minutes,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.ctx.db.begin().await?;
        let result = insert_class_checked(tx.as_mut(), &class).await;
        finish(tx, result).await?;

        info!(class_id = %class.id, gym_id = %class.gym_id, "class created");
        Ok(class)
    }

    async fn list_classes_inner(&self) -> GymResult<Vec<Class>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_classes().await;
        let classes = finish(tx, result).await?;
        debug!(count = classes.len(), "listed classes");
        Ok(classes)
    }

    async fn get_class_inner(&self, id: Uuid) -> GymResult<Class> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_class_by_id(id).await;
        finish(tx, result).await?.ok_or_else(|| class_not_found(id))
    }

    async fn create_session_inner(&self, new: NewSession) -> GymResult<ClassSession> {
        ensure_window(new.starts_at, new.ends_at)?;
        if matches!(new.capacity, Some(capacity) if capacity <= 0) {
            return Err(GymError::Validation(
                "Session capacity must be positive when set".to_string(),
            ));
        }

        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = insert_session_checked(tx.as_mut(), new, now).await;
        let session = finish(tx, result).await?;

        info!(
            session_id = %session.id,
            class_id = %session.class_id,
            capacity = session.capacity,
            "session scheduled"
        );
        Ok(session)
    }

    async fn list_sessions_inner(&self, class_id: Option<Uuid>) -> GymResult<Vec<ClassSession>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_sessions(class_id).await;
        let sessions = finish(tx, result).await?;
        debug!(class_id = ?class_id, count = sessions.len(), "listed sessions");
        Ok(sessions)
    }

    async fn get_session_inner(&self, id: Uuid) -> GymResult<ClassSession> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_session_by_id(id).await;
        finish(tx, result).await?.ok_or_else(|| session_not_found(id))
    }

    async fn close_session_inner(
        &self,
        id: Uuid,
        target: SessionStatus,
    ) -> GymResult<ClassSession> {
        let now = self.ctx.clock.now();
        let mut tx = self.ctx.db.begin().await?;
        let result = close_session(tx.as_mut(), id, target, now).await;
        let session = finish(tx, result).await.inspect_err(|err| {
            if err.is_conflict() {
                warn!(session_id = %id, error = %err, "session transition rejected");
            }
        })?;
        info!(session_id = %id, status = %session.status, "session closed");
        Ok(session)
    }
}
