pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use domain::error::Error;
pub use domain::identity::IdentityStore;
pub use domain::profiles::ProfileDirectory;
pub use domain::waves::WaveLedger;
pub use storage::document::DocumentStore;
pub use storage::memory::MemoryStore;
pub use storage::postgres::PostgresStore;
