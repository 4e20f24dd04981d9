//! Redsys web service payment manager.
//!
//! One call to [`RedsysApiManager::process_payment`] is one attempt: sign the
//! request, call the gateway, parse the answer, store it, then tell the
//! lifecycle listeners how it went. Nothing is kept between attempts, so a
//! single manager can be shared between tasks.

use std::sync::Arc;

use crate::domain::{
    PaymentContext, PaymentRequest, PaymentStatus, RedsysApiMethod, RefundRequest, Transaction,
    TransactionKind,
};
use crate::error::PaymentError;
use crate::ports::{PaymentEventDispatcher, TransactionRepository};
use crate::redsys::request::{build_payment, build_refund};
use crate::redsys::{GatewayResponse, GatewayTransport, MerchantCredentials, ResponseData};

pub const PAYMENT_NAME: &str = "RedsysWebservice";

/// Result of an authorized operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOutcome {
    /// Order reference sent to the gateway (order id plus random suffix).
    pub gateway_order: String,
    pub authorization_code: Option<String>,
    pub response: ResponseData,
    pub transaction: Transaction,
}

#[derive(Clone)]
pub struct RedsysApiManager {
    credentials: MerchantCredentials,
    transport: Arc<dyn GatewayTransport>,
    repository: Arc<dyn TransactionRepository>,
    dispatcher: Arc<dyn PaymentEventDispatcher>,
}

impl RedsysApiManager {
    pub fn new(
        credentials: MerchantCredentials,
        transport: Arc<dyn GatewayTransport>,
        repository: Arc<dyn TransactionRepository>,
        dispatcher: Arc<dyn PaymentEventDispatcher>,
    ) -> Self {
        Self {
            credentials,
            transport,
            repository,
            dispatcher,
        }
    }

    pub fn payment_name(&self) -> &'static str {
        PAYMENT_NAME
    }

    pub fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    /// Charges the method's card for the context amount.
    ///
    /// Listeners see `order_failed` alone when the gateway cannot be reached
    /// or answers garbage. Once an answer is stored they see `order_load`,
    /// `order_created` and `order_done`, followed by `order_success` or
    /// `order_failed`.
    pub async fn process_payment(
        &self,
        ctx: &PaymentContext,
        method: &mut RedsysApiMethod,
    ) -> Result<PaymentOutcome, PaymentError> {
        let card = method.card_details()?;
        let request = PaymentRequest::new(&ctx.order_id, ctx.amount, card)?;
        let signed = build_payment(&self.credentials, &request);

        tracing::info!(
            order_id = %ctx.order_id,
            gateway_order = %signed.transaction_id,
            amount = ctx.amount,
            "submitting payment"
        );

        let raw = match self.transport.call(&signed.xml).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(order_id = %ctx.order_id, error = %e, "gateway call failed");
                method.status = PaymentStatus::Failed;
                self.dispatcher.order_failed(ctx, method).await;
                return Err(PaymentError::Transport(e));
            }
        };

        let response = match GatewayResponse::parse(raw) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(order_id = %ctx.order_id, error = %e, "unreadable gateway answer");
                method.status = PaymentStatus::Failed;
                self.dispatcher.order_failed(ctx, method).await;
                return Err(PaymentError::Xml(e));
            }
        };

        let transaction = self
            .store_transaction(&ctx.order_id, ctx.amount, &response)
            .await?;

        self.dispatcher.order_load(ctx, method).await;
        self.dispatcher.order_created(ctx, method).await;
        self.dispatcher.order_done(ctx, method).await;

        if !response.is_authorized() {
            let error = declined(&response);
            tracing::warn!(
                order_id = %ctx.order_id,
                response_code = response.response_code().unwrap_or_default(),
                error_code = response.error_code().unwrap_or_default(),
                "payment declined"
            );
            method.status = PaymentStatus::Failed;
            self.dispatcher.order_failed(ctx, method).await;
            return Err(error);
        }

        method.transaction_id = response.authorization_code().map(str::to_string);
        method.status = PaymentStatus::Paid;
        method.response = Some(response.data().clone());

        tracing::info!(
            order_id = %ctx.order_id,
            authorization_code = method.transaction_id.as_deref().unwrap_or_default(),
            "payment authorized"
        );
        self.dispatcher.order_success(ctx, method).await;

        Ok(PaymentOutcome {
            gateway_order: signed.transaction_id,
            authorization_code: method.transaction_id.clone(),
            response: response.data().clone(),
            transaction,
        })
    }

    /// Refunds the context amount of a previous payment. No lifecycle
    /// listeners are involved.
    pub async fn process_refund(&self, ctx: &PaymentContext) -> Result<PaymentOutcome, PaymentError> {
        let request = RefundRequest::new(&ctx.order_id, ctx.amount)?;
        let signed = build_refund(&self.credentials, &request);

        tracing::info!(
            order_id = %ctx.order_id,
            gateway_order = %signed.transaction_id,
            amount = ctx.amount,
            "submitting refund"
        );

        let raw = self.transport.call(&signed.xml).await.map_err(|e| {
            tracing::error!(order_id = %ctx.order_id, error = %e, "gateway call failed");
            PaymentError::Transport(e)
        })?;
        let response = GatewayResponse::parse(raw)?;

        let transaction = self
            .store_transaction(&ctx.order_id, ctx.amount, &response)
            .await?;

        if !response.is_authorized() {
            tracing::warn!(
                order_id = %ctx.order_id,
                response_code = response.response_code().unwrap_or_default(),
                error_code = response.error_code().unwrap_or_default(),
                "refund declined"
            );
            return Err(declined(&response));
        }

        tracing::info!(order_id = %ctx.order_id, "refund accepted");

        Ok(PaymentOutcome {
            gateway_order: signed.transaction_id,
            authorization_code: response.authorization_code().map(str::to_string),
            response: response.data().clone(),
            transaction,
        })
    }

    async fn store_transaction(
        &self,
        order_id: &str,
        amount: i64,
        response: &GatewayResponse,
    ) -> Result<Transaction, PaymentError> {
        let transaction = Transaction::new(
            order_id.to_string(),
            amount,
            TransactionKind::Response,
            response.response_code().unwrap_or_default().to_string(),
            response.error_code().unwrap_or_default().to_string(),
            response.authorization_code().unwrap_or_default().to_string(),
            response.raw().to_string(),
        );

        let stored = self.repository.insert(&transaction).await.map_err(|e| {
            tracing::error!(order_id = %order_id, error = %e, "failed to store transaction");
            PaymentError::Repository(e)
        })?;

        tracing::debug!(transaction = %stored.id(), "transaction stored");
        Ok(stored)
    }
}

fn declined(response: &GatewayResponse) -> PaymentError {
    PaymentError::Declined {
        response_code: response.response_code().map(str::to_string),
        error_code: response.error_code().map(str::to_string),
        message: response.decline_message(),
    }
}
