use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::content::{ContentType, MediaItem, StoryContent};
use crate::common::utils::valid_coordinates;
use crate::domains::locations::NewLocation;

/// Location as typed by the submitter
///
/// Coordinates are optional on the wire so that a half-filled location can be
/// reported as missing rather than failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(strip_option, into)))]
pub struct SubmittedLocation {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
}

impl SubmittedLocation {
    /// Both coordinates present, finite, and in range
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if valid_coordinates(lat, lng) => Some((lat, lng)),
            _ => None,
        }
    }

    pub fn to_new_location(&self) -> Option<NewLocation> {
        let (latitude, longitude) = self.coordinates()?;
        Some(NewLocation {
            latitude,
            longitude,
            address: self.address.clone(),
            city: self.city.clone(),
            region: self.region.clone(),
            country: self.country.clone(),
            postal_code: self.postal_code.clone(),
        })
    }
}

/// A story as submitted, either to unlock another story or to publish directly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct StorySubmission {
    #[builder(setter(into))]
    pub title: String,
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub text: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub location: Option<SubmittedLocation>,
    #[builder(default)]
    #[serde(default)]
    pub tags: Vec<String>,
}

impl StorySubmission {
    /// Trimmed text, None when blank
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.as_ref().and_then(SubmittedLocation::coordinates)
    }

    /// Content types present in this submission, text first
    pub fn content_types(&self) -> Vec<ContentType> {
        let mut types = Vec::new();
        if self.trimmed_text().is_some() {
            types.push(ContentType::Text);
        }
        for item in &self.media {
            let kind = item.kind.content_type();
            if !types.contains(&kind) {
                types.push(kind);
            }
        }
        types
    }

    pub fn to_content(&self) -> StoryContent {
        StoryContent::from_parts(self.trimmed_text(), self.media.clone())
    }
}
