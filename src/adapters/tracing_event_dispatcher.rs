//! Lifecycle listener that only records structured log events.

use async_trait::async_trait;

use crate::domain::{PaymentContext, RedsysApiMethod};
use crate::ports::PaymentEventDispatcher;

#[derive(Debug, Default, Clone)]
pub struct TracingEventDispatcher;

impl TracingEventDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentEventDispatcher for TracingEventDispatcher {
    async fn order_load(&self, ctx: &PaymentContext, method: &RedsysApiMethod) {
        tracing::debug!(
            order_id = %ctx.order_id,
            payment_method = method.payment_name(),
            "payment order loaded"
        );
    }

    async fn order_created(&self, ctx: &PaymentContext, method: &RedsysApiMethod) {
        tracing::debug!(
            order_id = %ctx.order_id,
            payment_method = method.payment_name(),
            "payment order created"
        );
    }

    async fn order_done(&self, ctx: &PaymentContext, method: &RedsysApiMethod) {
        tracing::info!(
            order_id = %ctx.order_id,
            amount = ctx.amount,
            payment_method = method.payment_name(),
            "payment order done"
        );
    }

    async fn order_failed(&self, ctx: &PaymentContext, method: &RedsysApiMethod) {
        tracing::warn!(
            order_id = %ctx.order_id,
            amount = ctx.amount,
            payment_method = method.payment_name(),
            "payment order failed"
        );
    }

    async fn order_success(&self, ctx: &PaymentContext, method: &RedsysApiMethod) {
        tracing::info!(
            order_id = %ctx.order_id,
            amount = ctx.amount,
            transaction_id = method.transaction_id.as_deref().unwrap_or_default(),
            "payment order paid"
        );
    }
}
