//! Locations stories attach to
//!
//! A submission's coordinates resolve to an existing location when one lies
//! within [`SAME_LOCATION_RADIUS_METERS`](crate::common::utils::SAME_LOCATION_RADIUS_METERS),
//! otherwise a new one is created. Counters and the popularity score are
//! refreshed every time a story attaches.

pub mod models;

pub use models::location::{Location, NewLocation};
