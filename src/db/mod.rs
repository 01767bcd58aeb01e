//! Persistence for users and journal entries.
//!
//! Backed by libsql: a file-based database for deployments and an in-memory
//! one for tests. The auth core sees only the [`traits::CredentialStore`]
//! seam; entry CRUD is concrete on [`store::JournalStore`].

/// The libsql-backed store.
pub mod store;
/// The store seam consumed by the auth core.
pub mod traits;

pub use store::JournalStore;
pub use traits::CredentialStore;
