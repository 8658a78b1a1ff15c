use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::{EntityKind, GymError, GymResult};
use crate::models::payment::{Payment, RecordPaymentRequest, DEFAULT_CURRENCY};
use crate::services::{finish, ServiceContext};
use crate::store::Transaction;

async fn record_in(tx: &mut dyn Transaction, payment: &Payment) -> GymResult<()> {
    if tx.find_member_by_id(payment.member_id).await?.is_none() {
        return Err(GymError::InvalidReference(EntityKind::Member));
    }
    tx.insert_payment(payment).await
}

/// Append-only payment ledger.
#[derive(Clone)]
pub struct PaymentService {
    ctx: ServiceContext,
}

impl PaymentService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn record(&self, request: RecordPaymentRequest) -> GymResult<Payment> {
        self.ctx.within("payment.record", self.record_inner(request)).await
    }

    /// Newest first.
    pub async fn list_by_member(&self, member_id: Uuid) -> GymResult<Vec<Payment>> {
        self.ctx
            .within("payment.list_by_member", self.list_by_member_inner(member_id))
            .await
    }

    pub async fn list_all(&self) -> GymResult<Vec<Payment>> {
        self.ctx.within("payment.list_all", self.list_all_inner()).await
    }

    async fn record_inner(&self, request: RecordPaymentRequest) -> GymResult<Payment> {
        if request.amount_cents <= 0 {
            return Err(GymError::Validation(
                "Payment amount must be positive".to_string(),
            ));
        }
        if request.method.trim().is_empty() {
            return Err(GymError::Validation(
                "Payment method cannot be empty".to_string(),
            ));
        }
        let currency = match request.currency {
            Some(currency) if !currency.trim().is_empty() => currency.trim().to_uppercase(),
            _ => DEFAULT_CURRENCY.to_string(),
        };

        let now = self.ctx.clock.now();
        let payment = Payment {
            id: Uuid::new_v4(),
            member_id: request.member_id,
            amount_cents: request.amount_cents,
            currency,
            method: request.method.trim().to_string(),
            status: request.status.unwrap_or_default(),
            reference: request.reference,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.ctx.db.begin().await?;
        let result = record_in(tx.as_mut(), &payment).await;
        finish(tx, result).await?;

        info!(
            payment_id = %payment.id,
            member_id = %payment.member_id,
            amount_cents = payment.amount_cents,
            currency = %payment.currency,
            status = %payment.status,
            "payment recorded"
        );
        Ok(payment)
    }

    async fn list_by_member_inner(&self, member_id: Uuid) -> GymResult<Vec<Payment>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_payments_by_member(member_id).await;
        let payments = finish(tx, result).await?;
        debug!(%member_id, count = payments.len(), "listed payments");
        Ok(payments)
    }

    async fn list_all_inner(&self) -> GymResult<Vec<Payment>> {
        let mut tx = self.ctx.db.begin().await?;
        let result = tx.list_payments().await;
        let payments = finish(tx, result).await?;
        debug!(count = payments.len(), "listed all payments");
        Ok(payments)
    }
}
