//! Auth domain - verifies bearer tokens minted by the identity service
//!
//! Login and session issuance happen elsewhere. This service only needs to
//! know who is calling and with which role.

pub mod jwt;

pub use jwt::{Claims, JwtService};
