use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::PasswordHasher;
use crate::errors::{GymError, GymResult};
use crate::models::user::{normalize_email, Role, User};
use crate::services::{finish, ServiceContext};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Read side of the identity store plus credential checks.
#[derive(Clone)]
pub struct IdentityService {
    ctx: ServiceContext,
    hasher: Arc<dyn PasswordHasher>,
}

impl IdentityService {
    pub fn new(ctx: ServiceContext, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { ctx, hasher }
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> GymResult<User> {
        self.ctx
            .within("identity.login", self.login_inner(email, password))
            .await
    }

    pub async fn list_users(&self, role: Option<Role>) -> GymResult<Vec<User>> {
        self.ctx
            .within("identity.list_users", self.list_users_inner(role))
            .await
    }

    pub async fn get_user(&self, id: Uuid) -> GymResult<User> {
        self.ctx.within("identity.get_user", self.get_user_inner(id)).await
    }

    async fn login_inner(&self, email: &str, password: &str) -> GymResult<User> {
        let email = normalize_email(email);
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_user_by_email(&email).await;
        let user = finish(tx, result).await?;

        match user {
            Some(user) if self.hasher.verify(password, &user.password_hash) => {
                info!(user_id = %user.id, "user logged in");
                Ok(user)
            }
            _ => {
                warn!("login rejected");
                Err(GymError::Authentication(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    async fn list_users_inner(&self, role: Option<Role>) -> GymResult<Vec<User>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_users(role).await;
        let users = finish(tx, result).await?;
        debug!(role = ?role, count = users.len(), "listed users");
        Ok(users)
    }

    async fn get_user_inner(&self, id: Uuid) -> GymResult<User> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.find_user_by_id(id).await;
        finish(tx, result)
            .await?
            .ok_or_else(|| GymError::NotFound(format!("User with ID {id} not found")))
    }
}
