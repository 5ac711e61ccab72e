//! Common type definitions shared by the access engine, storage and API layers.
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`AccountId`]: login account identifier
//! - [`OrganisationId`]: tenant identifier, owned by an organisor account
//! - [`AgentId`]: agent profile identifier (distinct from the agent's account)
//! - [`CategoryId`]: lead category identifier
//! - [`LeadId`]: lead identifier
//!
//! # Access Vocabulary
//!
//! - [`Resource`]: which entity type a request touches
//! - [`Operation`]: what the request does to it
//!
//! The decision of which rows a given actor may touch lives in
//! [`crate::access::scope`], which maps `(actor, resource, operation)` to a
//! row predicate.

use std::fmt;
use uuid::Uuid;

pub type AccountId = Uuid;
pub type OrganisationId = Uuid;
pub type AgentId = Uuid;
pub type CategoryId = Uuid;
pub type LeadId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

// Entity types that requests are scoped over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Leads,
    Categories,
    Agents,
}

// Operations that can be performed on resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
    /// Setting the agent a lead is assigned to
    AssignAgent,
    /// Setting the category a lead is filed under
    Categorise,
}

impl Resource {
    /// Name used in "not found" responses
    pub fn singular(&self) -> &'static str {
        match self {
            Resource::Leads => "Lead",
            Resource::Categories => "Category",
            Resource::Agents => "Agent",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Leads => write!(f, "leads"),
            Resource::Categories => write!(f, "categories"),
            Resource::Agents => write!(f, "agents"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "List"),
            Operation::Read => write!(f, "Read"),
            Operation::Create => write!(f, "Create"),
            Operation::Update => write!(f, "Update"),
            Operation::Delete => write!(f, "Delete"),
            Operation::AssignAgent => write!(f, "Assign agent to"),
            Operation::Categorise => write!(f, "Categorise"),
        }
    }
}
