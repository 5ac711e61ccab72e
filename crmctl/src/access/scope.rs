//! The visibility table.
//!
//! [`scope`] is the only place that decides which rows an actor may touch.
//! Every engine operation asks it first and hands the resulting [`Scope`] to
//! storage, which applies it in the same statement as the read or write.
//!
//! | Role      | Leads                               | Categories          | Agents            |
//! |-----------|-------------------------------------|---------------------|-------------------|
//! | Organisor | all in organisation, every op       | all in org, every op | all in org, every op |
//! | Agent     | assigned to self: list, read, categorise | all in org: list, read | none        |

use super::actor::{Actor, ActorKind};
use crate::db::models::leads::LeadScope;
use crate::types::{AgentId, OrganisationId, Operation, Resource};

/// Row predicate produced by [`scope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every row of the organisation
    Organisation(OrganisationId),
    /// Leads of the organisation assigned to one agent
    AssignedTo { organisation: OrganisationId, agent: AgentId },
}

impl Scope {
    pub fn organisation_id(&self) -> OrganisationId {
        match *self {
            Scope::Organisation(organisation) | Scope::AssignedTo { organisation, .. } => organisation,
        }
    }

    pub fn lead_scope(&self) -> LeadScope {
        match *self {
            Scope::Organisation(organisation) => LeadScope::organisation(organisation),
            Scope::AssignedTo { organisation, agent } => LeadScope::assigned_to(organisation, agent),
        }
    }
}

/// Which rows of `resource` the actor may subject to `operation`, or `None` if
/// the role may not perform it at all.
pub fn scope(actor: &Actor, resource: Resource, operation: Operation) -> Option<Scope> {
    match actor.kind {
        ActorKind::Organisor { organisation_id } => Some(Scope::Organisation(organisation_id)),
        ActorKind::Agent {
            organisation_id,
            agent_id,
        } => match (resource, operation) {
            (Resource::Leads, Operation::List | Operation::Read | Operation::Categorise) => Some(Scope::AssignedTo {
                organisation: organisation_id,
                agent: agent_id,
            }),
            (Resource::Categories, Operation::List | Operation::Read) => Some(Scope::Organisation(organisation_id)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::accounts::Role;
    use crate::db::models::accounts::AccountDBResponse;
    use chrono::Utc;
    use uuid::Uuid;

    const ALL_OPERATIONS: [Operation; 7] = [
        Operation::List,
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::AssignAgent,
        Operation::Categorise,
    ];

    fn actor(kind: ActorKind) -> Actor {
        let role = match kind {
            ActorKind::Organisor { .. } => Role::Organisor,
            ActorKind::Agent { .. } => Role::Agent,
        };
        Actor {
            account: AccountDBResponse {
                id: Uuid::new_v4(),
                username: "someone".to_string(),
                email: "someone@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                role,
                password_hash: String::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            kind,
        }
    }

    #[test]
    fn organisor_is_scoped_to_own_organisation_for_everything() {
        let organisation_id = Uuid::new_v4();
        let organisor = actor(ActorKind::Organisor { organisation_id });

        for resource in [Resource::Leads, Resource::Categories, Resource::Agents] {
            for operation in ALL_OPERATIONS {
                assert_eq!(
                    scope(&organisor, resource, operation),
                    Some(Scope::Organisation(organisation_id)),
                    "{resource} {operation}"
                );
            }
        }
    }

    #[test]
    fn agent_sees_only_assigned_leads() {
        let organisation = Uuid::new_v4();
        let agent = Uuid::new_v4();
        let actor = actor(ActorKind::Agent {
            organisation_id: organisation,
            agent_id: agent,
        });
        let assigned = Some(Scope::AssignedTo { organisation, agent });

        assert_eq!(scope(&actor, Resource::Leads, Operation::List), assigned);
        assert_eq!(scope(&actor, Resource::Leads, Operation::Read), assigned);
        assert_eq!(scope(&actor, Resource::Leads, Operation::Categorise), assigned);
        for operation in [Operation::Create, Operation::Update, Operation::Delete, Operation::AssignAgent] {
            assert_eq!(scope(&actor, Resource::Leads, operation), None, "{operation}");
        }
    }

    #[test]
    fn agent_reads_categories_and_never_agents() {
        let organisation = Uuid::new_v4();
        let actor = actor(ActorKind::Agent {
            organisation_id: organisation,
            agent_id: Uuid::new_v4(),
        });

        assert_eq!(
            scope(&actor, Resource::Categories, Operation::List),
            Some(Scope::Organisation(organisation))
        );
        assert_eq!(scope(&actor, Resource::Categories, Operation::Create), None);
        assert_eq!(scope(&actor, Resource::Categories, Operation::Delete), None);
        for operation in ALL_OPERATIONS {
            assert_eq!(scope(&actor, Resource::Agents, operation), None);
        }
    }

    #[test]
    fn scope_converts_to_lead_predicate() {
        let organisation = Uuid::new_v4();
        let agent = Uuid::new_v4();

        assert_eq!(Scope::Organisation(organisation).lead_scope(), LeadScope::organisation(organisation));
        assert_eq!(
            Scope::AssignedTo { organisation, agent }.lead_scope(),
            LeadScope::assigned_to(organisation, agent)
        );
        assert_eq!(Scope::AssignedTo { organisation, agent }.organisation_id(), organisation);
    }
}
