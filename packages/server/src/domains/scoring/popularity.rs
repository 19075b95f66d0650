use chrono::{DateTime, Utc};

use crate::domains::stories::{Engagement, Story};
use crate::domains::tag::{Tag, TagScores};

/// Trending score a tag must exceed to be marked trending
pub const TRENDING_THRESHOLD: f64 = 100.0;

const SECONDS_PER_DAY: f64 = 86_400.0;
const LOCATION_RECENCY_WINDOW_DAYS: f64 = 30.0;

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let seconds = (to - from).num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_DAY).max(0.0)
}

/// Engagement-weighted score decayed by age
///
/// `floor((views + likes*5 + unlocks*10 + comments*3 + shares*8) * age_factor)`
/// where `age_factor = max(0.1, 1 - days_since_published * 0.1)`.
/// Without a publish time the age factor is 1.
pub fn story_score(
    engagement: &Engagement,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let raw = engagement.views
        + engagement.likes * 5
        + engagement.unlocks * 10
        + engagement.comments * 3
        + engagement.shares * 8;

    let Some(published_at) = published_at else {
        return raw;
    };
    let age_factor = (1.0 - days_between(published_at, now) * 0.1).max(0.1);
    (raw as f64 * age_factor).floor() as i64
}

/// Score for a story in its current state
pub fn score_story(story: &Story, now: DateTime<Utc>) -> i64 {
    let published_at = story.published_at.filter(|_| story.is_published());
    story_score(&story.engagement, published_at, now)
}

pub fn tag_score(tag: &Tag) -> i64 {
    tag.total_stories * 10
        + tag.active_stories * 20
        + tag.total_views
        + if tag.is_official { 50 } else { 0 }
        + if tag.is_featured { 30 } else { 0 }
}

pub fn tag_trending_score(total_stories: i64, popularity_score: i64) -> f64 {
    let story_component = if total_stories > 5 {
        total_stories as f64 * 0.3
    } else {
        0.0
    };
    story_component + popularity_score as f64 * 0.1
}

/// Recompute popularity and the trending flag
///
/// `trending_since` is stamped when the flag flips on and kept while the tag
/// stays above the threshold.
pub fn evaluate_tag_scores(tag: &Tag, now: DateTime<Utc>) -> TagScores {
    let popularity_score = tag_score(tag);
    let is_trending = tag_trending_score(tag.total_stories, popularity_score) > TRENDING_THRESHOLD;

    let trending_since = match (is_trending, tag.is_trending) {
        (true, true) => tag.trending_since.or(Some(now)),
        (true, false) => Some(now),
        (false, _) => None,
    };

    TagScores {
        popularity_score,
        is_trending,
        trending_since,
    }
}

/// `story_count*10 + max(0, 30 - days_since_last_story)`, floored
pub fn location_score(
    story_count: i64,
    last_story_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let recency = last_story_at
        .map(|at| (LOCATION_RECENCY_WINDOW_DAYS - days_between(at, now)).max(0.0))
        .unwrap_or(0.0);
    story_count * 10 + recency.floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn engagement(views: i64, likes: i64, unlocks: i64, comments: i64, shares: i64) -> Engagement {
        Engagement {
            views,
            likes,
            unlocks,
            comments,
            shares,
            saves: 0,
        }
    }

    #[test]
    fn test_story_score_fresh() {
        let now = Utc::now();
        let e = engagement(10, 2, 1, 1, 1);
        // 10 + 10 + 10 + 3 + 8
        assert_eq!(story_score(&e, Some(now), now), 41);
    }

    #[test]
    fn test_story_score_decays_to_floor() {
        let now = Utc::now();
        let e = engagement(100, 0, 0, 0, 0);
        assert_eq!(story_score(&e, Some(now - Duration::days(5)), now), 50);
        assert_eq!(story_score(&e, Some(now - Duration::days(30)), now), 10);
    }

    #[test]
    fn test_saves_do_not_count() {
        let now = Utc::now();
        let mut e = engagement(0, 0, 0, 0, 0);
        e.saves = 40;
        assert_eq!(story_score(&e, Some(now), now), 0);
    }

    #[test]
    fn test_unpublished_story_keeps_raw_weight() {
        let e = engagement(1000, 2, 1, 0, 0);
        assert_eq!(story_score(&e, None, Utc::now()), 1020);
    }

    #[test]
    fn test_archived_story_is_not_decayed() {
        use crate::common::MemberId;
        use crate::domains::stories::{NewStory, StoryContent, StoryStatus, SwapSettings};

        let now = Utc::now();
        let mut story = Story::publish(
            NewStory {
                title: "Old pier".into(),
                content: StoryContent::from_parts(Some("Gulls over the pier."), vec![]),
                author_id: MemberId::new(),
                location_id: None,
                tag_ids: vec![],
                swap_settings: SwapSettings::default(),
            },
            now - Duration::days(30),
        );
        story.engagement = engagement(200, 0, 0, 0, 0);
        assert_eq!(score_story(&story, now), 20);

        story.status = StoryStatus::Archived;
        assert_eq!(score_story(&story, now), 200);
    }

    #[test]
    fn test_story_score_non_increasing_with_age() {
        let now = Utc::now();
        let e = engagement(37, 4, 3, 2, 1);
        let mut previous = i64::MAX;
        for hours in (0..24 * 20).step_by(7) {
            let score = story_score(&e, Some(now - Duration::hours(hours)), now);
            assert!(score <= previous, "score rose at {hours}h: {score} > {previous}");
            previous = score;
        }
    }

    #[test]
    fn test_story_score_non_decreasing_in_each_counter() {
        let now = Utc::now();
        let published = Some(now - Duration::hours(40));
        let base = engagement(5, 5, 5, 5, 5);

        for counter in 0..5 {
            let mut previous = story_score(&base, published, now);
            for step in 1..50 {
                let mut e = base;
                match counter {
                    0 => e.views += step,
                    1 => e.likes += step,
                    2 => e.unlocks += step,
                    3 => e.comments += step,
                    _ => e.shares += step,
                }
                let score = story_score(&e, published, now);
                assert!(score >= previous);
                previous = score;
            }
        }
    }

    fn tag(total_stories: i64, active_stories: i64, total_views: i64) -> Tag {
        let mut tag = Tag::new("harbor", "Harbor", Utc::now());
        tag.total_stories = total_stories;
        tag.active_stories = active_stories;
        tag.total_views = total_views;
        tag
    }

    #[test]
    fn test_tag_score_weights() {
        let mut t = tag(2, 1, 7);
        assert_eq!(tag_score(&t), 20 + 20 + 7);
        t.is_official = true;
        t.is_featured = true;
        assert_eq!(tag_score(&t), 47 + 80);
    }

    #[test]
    fn test_tag_trending_score_ignores_small_story_counts() {
        assert_eq!(tag_trending_score(5, 100), 10.0);
        assert!((tag_trending_score(10, 100) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_tag_trending_flips_on_and_stamps_since() {
        let now = Utc::now();
        let t = tag(20, 20, 500);
        // popularity 200 + 400 + 500 = 1100, trending 6 + 110
        let scores = evaluate_tag_scores(&t, now);
        assert_eq!(scores.popularity_score, 1100);
        assert!(scores.is_trending);
        assert_eq!(scores.trending_since, Some(now));
    }

    #[test]
    fn test_tag_trending_since_is_sticky() {
        let earlier = Utc::now() - Duration::days(3);
        let now = Utc::now();
        let mut t = tag(20, 20, 600);
        t.is_trending = true;
        t.trending_since = Some(earlier);

        let scores = evaluate_tag_scores(&t, now);
        assert!(scores.is_trending);
        assert_eq!(scores.trending_since, Some(earlier));
    }

    #[test]
    fn test_tag_trending_turns_off_below_threshold() {
        let mut t = tag(1, 1, 0);
        t.is_trending = true;
        t.trending_since = Some(Utc::now());

        let scores = evaluate_tag_scores(&t, Utc::now());
        assert!(!scores.is_trending);
        assert_eq!(scores.trending_since, None);
    }

    #[test]
    fn test_location_score() {
        let now = Utc::now();
        assert_eq!(location_score(3, Some(now), now), 60);
        assert_eq!(location_score(3, Some(now - Duration::days(10)), now), 50);
        assert_eq!(location_score(3, Some(now - Duration::days(90)), now), 30);
        assert_eq!(location_score(0, None, now), 0);
    }
}
