//! Persistence layer.
//!
//! ```text
//! ┌───────────────┐
//! │ AccessEngine  │  (computes the actor's scope)
//! └───────┬───────┘
//!         │ Storage trait, scope passed with every call
//!         ↓
//! ┌───────────────┐      ┌───────────────┐
//! │PostgresStorage│      │ MemoryStorage │
//! └───────┬───────┘      └───────────────┘
//!         │
//!         ↓
//! ┌───────────────┐
//! │ Repositories  │  (db::handlers, one per table)
//! └───────┬───────┘
//!         ↓
//!     PostgreSQL
//! ```
//!
//! - [`storage`]: the [`Storage`] trait the access engine talks to
//! - [`postgres`]: the production implementation over a `PgPool`
//! - [`memory`]: an in-process implementation for development and tests
//! - [`handlers`]: the per-table sqlx repositories behind [`postgres`]
//! - [`models`]: storage request/response records and lead scope predicates
//! - [`errors`]: [`errors::DbError`], shared by both implementations
//!
//! Schema migrations live in `migrations/` and are embedded with
//! [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod storage;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
pub use storage::Storage;
