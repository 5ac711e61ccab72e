//! PostgreSQL repositories, one per table.
//!
//! Each repository wraps a borrowed `PgConnection` (a pooled connection or an
//! open transaction) and issues runtime-checked sqlx queries. Tenant-owned
//! tables take their scope in `new()`:
//!
//! ```ignore
//! use crmctl::db::handlers::{Leads, Repository};
//! use crmctl::db::models::leads::{LeadFilter, LeadScope};
//!
//! let mut conn = pool.acquire().await?;
//! let visible = Leads::new(&mut conn, LeadScope::assigned_to(org_id, agent_id))
//!     .list(&LeadFilter::new(0, 10))
//!     .await?;
//! ```
//!
//! - [`Accounts`]: login accounts, plus the agent-profile lookup used to resolve actors
//! - [`Organisations`]: the one-per-organisor tenant rows
//! - [`Agents`], [`Categories`], [`Leads`]: tenant-scoped CRUD

pub mod accounts;
pub mod agents;
pub mod categories;
pub mod leads;
pub mod organisations;
pub mod repository;

pub use accounts::Accounts;
pub use agents::Agents;
pub use categories::Categories;
pub use leads::Leads;
pub use organisations::Organisations;
pub use repository::Repository;
