//! Domain operations.
//!
//! Each operation acquires one transaction, runs its checks and writes on it
//! and commits; any error rolls the whole transaction back. Every operation
//! runs under the caller-configured deadline, and a timed-out operation drops
//! its uncommitted transaction. The deadline covers the work, not the
//! commit: once a commit has started the operation runs to completion, so
//! [`GymError::Timeout`] always means nothing was written.

pub mod attendance;
pub mod bookings;
pub mod catalog;
pub mod identity;
pub mod members;
pub mod memberships;
pub mod payments;
pub mod plans;
pub mod registration;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::auth::PasswordHasher;
use crate::clock::Clock;
use crate::errors::{GymError, GymResult};
use crate::models::membership::OverlapPolicy;
use crate::store::{Database, Transaction};

tokio::task_local! {
    /// Raised by [`finish`] when the running operation starts committing.
    static COMMITTING: Arc<AtomicBool>;
}

pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Caller-tunable knobs shared by all services.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    pub operation_timeout: Duration,
    pub overlap_policy: OverlapPolicy,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            overlap_policy: OverlapPolicy::Allow,
        }
    }
}

/// Collaborators every service needs.
#[derive(Clone)]
pub struct ServiceContext {
    pub db: Arc<dyn Database>,
    pub clock: Arc<dyn Clock>,
    pub timeout: Duration,
}

impl ServiceContext {
    /// Runs `operation` under the configured deadline.
    ///
    /// If the deadline passes before the operation reaches its commit, the
    /// operation is dropped along with its transaction. If it passes while
    /// the commit is in flight, the commit's own outcome is returned.
    pub async fn within<T, F>(&self, operation: &'static str, fut: F) -> GymResult<T>
    where
        F: Future<Output = GymResult<T>>,
    {
        let committing = Arc::new(AtomicBool::new(false));
        let work = COMMITTING.scope(committing.clone(), fut);
        tokio::pin!(work);

        let outcome = tokio::time::timeout(self.timeout, &mut work).await;
        match outcome {
            Ok(result) => result,
            Err(_) if committing.load(Ordering::SeqCst) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "deadline passed during commit, waiting for it"
                );
                work.await
            }
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "operation timed out");
                Err(GymError::Timeout)
            }
        }
    }
}

/// Commits on success, rolls back on failure, and hands back the result.
pub async fn finish<T>(tx: Box<dyn Transaction>, result: GymResult<T>) -> GymResult<T> {
    match result {
        Ok(value) => {
            let _ = COMMITTING.try_with(|flag| flag.store(true, Ordering::SeqCst));
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Every service, wired to the same store, clock and settings.
#[derive(Clone)]
pub struct Services {
    pub registration: registration::RegistrationService,
    pub identity: identity::IdentityService,
    pub members: members::MemberService,
    pub plans: plans::PlanService,
    pub memberships: memberships::MembershipService,
    pub catalog: catalog::CatalogService,
    pub bookings: bookings::BookingService,
    pub attendance: attendance::AttendanceService,
    pub payments: payments::PaymentService,
}

impl Services {
    pub fn new(
        db: Arc<dyn Database>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        settings: ServiceSettings,
    ) -> Self {
        let ctx = ServiceContext {
            db,
            clock,
            timeout: settings.operation_timeout,
        };

        Self {
            registration: registration::RegistrationService::new(
                ctx.clone(),
                hasher.clone(),
                settings.overlap_policy,
            ),
            identity: identity::IdentityService::new(ctx.clone(), hasher),
            members: members::MemberService::new(ctx.clone()),
            plans: plans::PlanService::new(ctx.clone()),
            memberships: memberships::MembershipService::new(ctx.clone(), settings.overlap_policy),
            catalog: catalog::CatalogService::new(ctx.clone()),
            bookings: bookings::BookingService::new(ctx.clone()),
            attendance: attendance::AttendanceService::new(ctx.clone()),
            payments: payments::PaymentService::new(ctx),
        }
    }
}
