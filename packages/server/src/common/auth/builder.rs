use super::{AdminCapability, AuthError};
use crate::common::entity_ids::MemberId;
use crate::domains::member::MemberRole;

/// Entry point for authorization checks
///
/// Usage:
/// ```rust,ignore
/// Actor::new(member_id, role)
///     .can(AdminCapability::RetrySwaps)
///     .check()?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    actor_id: MemberId,
    role: MemberRole,
}

impl Actor {
    /// Create a new actor for authorization checks
    ///
    /// `role` comes from the verified token, not from the request body.
    pub fn new(actor_id: MemberId, role: MemberRole) -> Self {
        Self { actor_id, role }
    }

    pub fn id(&self) -> MemberId {
        self.actor_id
    }

    pub fn role(&self) -> MemberRole {
        self.role
    }

    /// True when the actor is `member_id` or holds `capability`
    pub fn is_self_or(&self, member_id: MemberId, capability: AdminCapability) -> bool {
        self.actor_id == member_id || capability.granted_to(self.role)
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            actor: self,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    actor: Actor,
    capability: AdminCapability,
}

impl CapabilityBuilder {
    /// Perform the authorization check
    pub fn check(self) -> Result<(), AuthError> {
        if self.capability.granted_to(self.actor.role) {
            return Ok(());
        }

        match self.capability {
            AdminCapability::RetrySwaps => Err(AuthError::AdminRequired),
            other => Err(AuthError::PermissionDenied(format!(
                "{:?} requires a moderator or admin role",
                other
            ))),
        }
    }
}
