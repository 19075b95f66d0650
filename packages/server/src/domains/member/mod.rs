//! Member domain - the slice of a user the swap engine reads and updates
//!
//! Registration, login and profiles belong to the identity service. The
//! engine only needs role, standing, and the stats counters it increments.

pub mod models;

pub use models::member::{Member, MemberRole, MemberStats, MemberStatsDelta};
