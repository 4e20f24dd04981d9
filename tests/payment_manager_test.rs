use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redsys_api::adapters::InMemoryTransactionRepository;
use redsys_api::domain::{
    Currency, PaymentContext, PaymentStatus, RedsysApiMethod, Transaction, TransactionKind,
};
use redsys_api::ports::{
    PaymentEventDispatcher, RepositoryError, RepositoryResult, TransactionRepository,
};
use redsys_api::redsys::{GatewayTransport, MerchantCredentials, TransportError};
use redsys_api::{PaymentError, RedsysApiManager};
use uuid::Uuid;

const AUTHORIZED: &str = "<RETORNOXML><CODIGO>0</CODIGO><OPERACION>\
    <Ds_Amount>500</Ds_Amount><Ds_Response>000</Ds_Response>\
    <Ds_AuthorisationCode>ABC123</Ds_AuthorisationCode></OPERACION></RETORNOXML>";

const DECLINED: &str = "<RETORNOXML><CODIGO>0</CODIGO><OPERACION>\
    <Ds_Response>0190</Ds_Response></OPERACION></RETORNOXML>";

const REJECTED: &str = "<RETORNOXML><CODIGO>SIS0051</CODIGO></RETORNOXML>";

/// Replays canned gateway answers and records every payload it is sent.
#[derive(Default)]
struct ScriptedTransport {
    answers: Mutex<VecDeque<Result<String, TransportError>>>,
    payloads: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn answering(answer: Result<String, TransportError>) -> Arc<Self> {
        let transport = Self::default();
        transport.answers.lock().unwrap().push_back(answer);
        Arc::new(transport)
    }

    fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl GatewayTransport for ScriptedTransport {
    async fn call(&self, payload: &str) -> Result<String, TransportError> {
        self.payloads.lock().unwrap().push(payload.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::InvalidResponse("no answer scripted".into())))
    }
}

#[derive(Default)]
struct RecordingDispatcher {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingDispatcher {
    fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl PaymentEventDispatcher for RecordingDispatcher {
    async fn order_load(&self, _ctx: &PaymentContext, _method: &RedsysApiMethod) {
        self.record("load");
    }

    async fn order_created(&self, _ctx: &PaymentContext, _method: &RedsysApiMethod) {
        self.record("created");
    }

    async fn order_done(&self, _ctx: &PaymentContext, _method: &RedsysApiMethod) {
        self.record("done");
    }

    async fn order_failed(&self, _ctx: &PaymentContext, _method: &RedsysApiMethod) {
        self.record("failed");
    }

    async fn order_success(&self, _ctx: &PaymentContext, _method: &RedsysApiMethod) {
        self.record("success");
    }
}

/// Store whose every operation fails, counting the insert attempts.
#[derive(Default)]
struct UnavailableRepository {
    inserts: Mutex<usize>,
}

impl UnavailableRepository {
    fn inserts(&self) -> usize {
        *self.inserts.lock().unwrap()
    }
}

#[async_trait]
impl TransactionRepository for UnavailableRepository {
    async fn insert(&self, _tx: &Transaction) -> RepositoryResult<Transaction> {
        *self.inserts.lock().unwrap() += 1;
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn get_by_id(&self, _id: Uuid) -> RepositoryResult<Transaction> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_created_between(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> RepositoryResult<Vec<Transaction>> {
        Err(RepositoryError::Database(sqlx::Error::PoolTimedOut))
    }
}

struct Harness {
    manager: RedsysApiManager,
    transport: Arc<ScriptedTransport>,
    repository: Arc<InMemoryTransactionRepository>,
    dispatcher: Arc<RecordingDispatcher>,
}

fn credentials() -> MerchantCredentials {
    MerchantCredentials::new(
        "999008881".to_string(),
        "qwertyasdf0123456789".to_string(),
        "1".to_string(),
        Currency::Eur,
    )
}

fn harness(answer: Result<String, TransportError>) -> Harness {
    let transport = ScriptedTransport::answering(answer);
    let repository = Arc::new(InMemoryTransactionRepository::new());
    let dispatcher = Arc::new(RecordingDispatcher::default());

    Harness {
        manager: RedsysApiManager::new(
            credentials(),
            transport.clone(),
            repository.clone(),
            dispatcher.clone(),
        ),
        transport,
        repository,
        dispatcher,
    }
}

fn card() -> RedsysApiMethod {
    RedsysApiMethod::new("4548812049400004", "Jane Doe", 2049, 12, "123")
}

#[tokio::test]
async fn test_authorized_payment_is_stored_and_notified_once() {
    let h = harness(Ok(AUTHORIZED.to_string()));
    let ctx = PaymentContext::new("1000", 500);
    let mut method = card();

    let outcome = h.manager.process_payment(&ctx, &mut method).await.unwrap();

    assert_eq!(outcome.authorization_code.as_deref(), Some("ABC123"));
    assert!(outcome.gateway_order.starts_with("1000-"));
    assert_eq!(method.status, PaymentStatus::Paid);
    assert_eq!(method.transaction_id.as_deref(), Some("ABC123"));
    assert_eq!(
        method.response.as_ref().and_then(|r| r.get("Ds_Response")),
        Some("000")
    );

    let stored = h.repository.all().await;
    assert_eq!(stored.len(), 1);
    let tx = &stored[0];
    assert_eq!(tx.order_id(), "1000");
    assert_eq!(tx.amount(), 500);
    assert_eq!(tx.kind(), TransactionKind::Response);
    assert_eq!(tx.kind().code(), 1);
    assert_eq!(tx.return_code(), "000");
    assert_eq!(tx.authorization_code(), "ABC123");
    assert_eq!(tx.message(), AUTHORIZED);

    assert_eq!(h.dispatcher.events(), vec!["load", "created", "done", "success"]);
}

#[tokio::test]
async fn test_payment_request_carries_signed_fields() {
    let h = harness(Ok(AUTHORIZED.to_string()));
    let ctx = PaymentContext::new("1000", 500);

    let outcome = h.manager.process_payment(&ctx, &mut card()).await.unwrap();

    let payloads = h.transport.payloads();
    assert_eq!(payloads.len(), 1);
    let sent = &payloads[0];
    assert!(sent.starts_with("<DATOSENTRADA>"));
    assert!(sent.contains("<DS_MERCHANT_AMOUNT>500</DS_MERCHANT_AMOUNT>"));
    assert!(sent.contains(&format!(
        "<DS_MERCHANT_ORDER>{}</DS_MERCHANT_ORDER>",
        outcome.gateway_order
    )));
    assert!(sent.contains("<DS_MERCHANT_TRANSACTIONTYPE>A</DS_MERCHANT_TRANSACTIONTYPE>"));
    assert!(sent.contains("<DS_MERCHANT_EXPIRYDATE>4912</DS_MERCHANT_EXPIRYDATE>"));
    assert!(sent.contains("<DS_MERCHANT_MERCHANTSIGNATURE>"));
}

#[tokio::test]
async fn test_transport_failure_only_notifies_failure() {
    let h = harness(Err(TransportError::Fault("SIS unavailable".to_string())));
    let ctx = PaymentContext::new("1000", 500);
    let mut method = card();

    let err = h.manager.process_payment(&ctx, &mut method).await.unwrap_err();

    assert!(matches!(err, PaymentError::Transport(_)));
    assert_eq!(method.status, PaymentStatus::Failed);
    assert!(method.transaction_id.is_none());
    assert!(h.repository.all().await.is_empty());
    assert_eq!(h.dispatcher.events(), vec!["failed"]);
}

#[tokio::test]
async fn test_declined_payment_is_stored_and_reported() {
    let h = harness(Ok(DECLINED.to_string()));
    let ctx = PaymentContext::new("1000", 500);
    let mut method = card();

    let err = h.manager.process_payment(&ctx, &mut method).await.unwrap_err();

    match err {
        PaymentError::Declined {
            response_code,
            message,
            ..
        } => {
            assert_eq!(response_code.as_deref(), Some("0190"));
            assert!(!message.is_empty());
        }
        other => panic!("expected decline, got {:?}", other),
    }
    assert_eq!(method.status, PaymentStatus::Failed);
    assert!(method.transaction_id.is_none());

    let stored = h.repository.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].return_code(), "0190");
    assert_eq!(stored[0].authorization_code(), "");

    assert_eq!(h.dispatcher.events(), vec!["load", "created", "done", "failed"]);
}

#[tokio::test]
async fn test_gateway_error_code_is_described() {
    let h = harness(Ok(REJECTED.to_string()));
    let ctx = PaymentContext::new("1000", 500);

    let err = h.manager.process_payment(&ctx, &mut card()).await.unwrap_err();

    match err {
        PaymentError::Declined {
            response_code,
            error_code,
            message,
        } => {
            assert!(response_code.is_none());
            assert_eq!(error_code.as_deref(), Some("SIS0051"));
            assert_ne!(message, "Error desconocido");
        }
        other => panic!("expected decline, got {:?}", other),
    }
    assert_eq!(h.repository.all().await[0].error_code(), "SIS0051");
}

#[tokio::test]
async fn test_malformed_answer_fails_without_storing() {
    let h = harness(Ok("<RETORNOXML><CODIGO>0</RETORNOXML>".to_string()));
    let ctx = PaymentContext::new("1000", 500);
    let mut method = card();

    let err = h.manager.process_payment(&ctx, &mut method).await.unwrap_err();

    assert!(matches!(err, PaymentError::Xml(_)));
    assert!(h.repository.all().await.is_empty());
    assert_eq!(h.dispatcher.events(), vec!["failed"]);
}

#[tokio::test]
async fn test_invalid_card_never_reaches_gateway() {
    let h = harness(Ok(AUTHORIZED.to_string()));
    let ctx = PaymentContext::new("1000", 500);
    let mut method = RedsysApiMethod::new("4548", "Jane Doe", 2049, 12, "123");

    let err = h.manager.process_payment(&ctx, &mut method).await.unwrap_err();

    assert!(matches!(err, PaymentError::InvalidRequest(_)));
    assert!(h.transport.payloads().is_empty());
    assert!(h.dispatcher.events().is_empty());
    assert_eq!(method.status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_refund_is_stored_without_notifications() {
    let h = harness(Ok(AUTHORIZED.to_string()));
    let ctx = PaymentContext::new("1000", 500);

    let outcome = h.manager.process_refund(&ctx).await.unwrap();

    assert!(outcome.gateway_order.starts_with("1000-"));
    let sent = &h.transport.payloads()[0];
    assert!(sent.contains("<DS_MERCHANT_TRANSACTIONTYPE>3</DS_MERCHANT_TRANSACTIONTYPE>"));
    assert!(!sent.contains("DS_MERCHANT_PAN"));

    let stored = h.repository.all().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind(), TransactionKind::Response);
    assert!(h.dispatcher.events().is_empty());
}

#[tokio::test]
async fn test_declined_refund_is_stored() {
    let h = harness(Ok(DECLINED.to_string()));
    let ctx = PaymentContext::new("1000", 500);

    let err = h.manager.process_refund(&ctx).await.unwrap_err();

    assert!(err.is_declined());
    assert_eq!(h.repository.all().await.len(), 1);
    assert!(h.dispatcher.events().is_empty());
}

#[tokio::test]
async fn test_refund_transport_failure_stores_nothing() {
    let h = harness(Err(TransportError::Status {
        status: 503,
        body: "maintenance".to_string(),
    }));

    let err = h
        .manager
        .process_refund(&PaymentContext::new("1000", 500))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "transport");
    assert!(h.repository.all().await.is_empty());
}

fn unavailable_store_manager(
    answer: &str,
) -> (RedsysApiManager, Arc<UnavailableRepository>, Arc<RecordingDispatcher>) {
    let repository = Arc::new(UnavailableRepository::default());
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let manager = RedsysApiManager::new(
        credentials(),
        ScriptedTransport::answering(Ok(answer.to_string())),
        repository.clone(),
        dispatcher.clone(),
    );
    (manager, repository, dispatcher)
}

#[tokio::test]
async fn test_payment_storage_failure_fires_no_hooks() {
    let (manager, repository, dispatcher) = unavailable_store_manager(AUTHORIZED);
    let ctx = PaymentContext::new("1000", 500);
    let mut method = card();

    let err = manager.process_payment(&ctx, &mut method).await.unwrap_err();

    assert_eq!(err.kind(), "repository");
    assert!(matches!(err, PaymentError::Repository(_)));
    assert_eq!(repository.inserts(), 1);
    assert!(dispatcher.events().is_empty());
    assert_ne!(method.status, PaymentStatus::Paid);
    assert!(method.transaction_id.is_none());
    assert!(method.response.is_none());
}

#[tokio::test]
async fn test_refund_storage_failure_is_reported() {
    let (manager, repository, dispatcher) = unavailable_store_manager(AUTHORIZED);

    let err = manager
        .process_refund(&PaymentContext::new("1000", 500))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "repository");
    assert_eq!(repository.inserts(), 1);
    assert!(dispatcher.events().is_empty());
}
