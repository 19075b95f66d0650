//! Popularity scoring for stories, tags and locations
//!
//! Pure functions only. Callers recompute synchronously whenever one of the
//! inputs changes and write the result back.

pub mod popularity;

pub use popularity::{
    evaluate_tag_scores, location_score, score_story, story_score, tag_score, tag_trending_score,
    TRENDING_THRESHOLD,
};
