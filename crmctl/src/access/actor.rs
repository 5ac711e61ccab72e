//! The authenticated actor a request runs as.

use crate::api::models::accounts::{MeResponse, Role};
use crate::db::models::accounts::AccountDBResponse;
use crate::types::{AgentId, OrganisationId};

/// Role-specific position of an actor inside its organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Organisor { organisation_id: OrganisationId },
    Agent { organisation_id: OrganisationId, agent_id: AgentId },
}

/// An account resolved to the organisation it works in.
#[derive(Debug, Clone)]
pub struct Actor {
    pub account: AccountDBResponse,
    pub kind: ActorKind,
}

impl Actor {
    pub fn organisation_id(&self) -> OrganisationId {
        match self.kind {
            ActorKind::Organisor { organisation_id } | ActorKind::Agent { organisation_id, .. } => organisation_id,
        }
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        match self.kind {
            ActorKind::Organisor { .. } => None,
            ActorKind::Agent { agent_id, .. } => Some(agent_id),
        }
    }

    pub fn role(&self) -> Role {
        match self.kind {
            ActorKind::Organisor { .. } => Role::Organisor,
            ActorKind::Agent { .. } => Role::Agent,
        }
    }

    pub fn is_organisor(&self) -> bool {
        matches!(self.kind, ActorKind::Organisor { .. })
    }
}

impl From<Actor> for MeResponse {
    fn from(actor: Actor) -> Self {
        Self {
            organisation_id: actor.organisation_id(),
            agent_id: actor.agent_id(),
            account: actor.account.into(),
        }
    }
}
