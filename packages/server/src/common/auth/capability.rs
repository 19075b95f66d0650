use crate::domains::member::MemberRole;

/// Privileged operations on swaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Re-run a rejected swap through the pipeline
    RetrySwaps,

    /// Read any member's swap, including withheld moderation reasons
    ViewAnySwap,

    /// Work the manual review queue
    ReviewSwaps,

    /// Read aggregate swap statistics
    ViewSwapStats,
}

impl AdminCapability {
    /// Whether `role` grants this capability
    pub fn granted_to(&self, role: MemberRole) -> bool {
        match self {
            AdminCapability::RetrySwaps => role == MemberRole::Admin,
            AdminCapability::ViewAnySwap
            | AdminCapability::ReviewSwaps
            | AdminCapability::ViewSwapStats => {
                matches!(role, MemberRole::Admin | MemberRole::Moderator)
            }
        }
    }
}
