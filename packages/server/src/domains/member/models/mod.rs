pub mod member;

pub use member::{Member, MemberRole, MemberStats, MemberStatsDelta};
