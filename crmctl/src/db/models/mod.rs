//! Storage record models.
//!
//! Request types (`*CreateDBRequest`, `*UpdateDBRequest`) are what the access
//! engine hands to a [`crate::db::Storage`] implementation; response types
//! (`*DBResponse`) are the rows it returns. Both are distinct from the API
//! models so the wire format and the schema can evolve independently.
//!
//! Row predicates that carry an actor's visibility ([`leads::LeadScope`],
//! [`leads::LeadFilter`]) also live here so every storage backend applies the
//! same ones.

pub mod accounts;
pub mod agents;
pub mod categories;
pub mod leads;
pub mod organisations;
