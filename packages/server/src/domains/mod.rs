// Business domains
pub mod auth;
pub mod locations;
pub mod member;
pub mod scoring;
pub mod stories;
pub mod swaps;
pub mod tag;
