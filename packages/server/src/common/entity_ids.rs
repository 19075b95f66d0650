//! Typed ID definitions for the swap engine's entities.
//!
//! Stories and swaps reference each other only through these ids; the
//! orchestrating activity performs the lookups.
//!
//! ```rust
//! use storyswap_core::common::{StoryId, SwapId};
//!
//! let story_id = StoryId::new();
//! let swap_id = SwapId::new();
//!
//! // This would be a compile error:
//! // let wrong: SwapId = story_id;
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Member entities (users, as supplied by the identity service).
pub struct Member;

/// Marker type for Story entities.
pub struct Story;

/// Marker type for Swap entities (one member's attempt to unlock one story).
pub struct Swap;

/// Marker type for Location entities.
pub struct Location;

/// Marker type for Tag entities.
pub struct Tag;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type MemberId = Id<Member>;
pub type StoryId = Id<Story>;
pub type SwapId = Id<Swap>;
pub type LocationId = Id<Location>;
pub type TagId = Id<Tag>;
