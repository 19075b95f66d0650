/// Authorization module for the swap engine
///
/// Provides a fluent API for role checks in activity code:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, AdminCapability};
///
/// Actor::new(member_id, role)
///     .can(AdminCapability::RetrySwaps)
///     .check()?;
/// ```
///
/// Identity itself (who the caller is, their role) arrives from the identity
/// service; this module only decides what that identity may do.
mod builder;
mod capability;
mod errors;

pub use builder::{Actor, CapabilityBuilder};
pub use capability::AdminCapability;
pub use errors::AuthError;
