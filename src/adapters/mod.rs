pub mod memory_transaction_repository;
pub mod postgres_transaction_repository;
pub mod tracing_event_dispatcher;

pub use memory_transaction_repository::InMemoryTransactionRepository;
pub use postgres_transaction_repository::PostgresTransactionRepository;
pub use tracing_event_dispatcher::TracingEventDispatcher;
