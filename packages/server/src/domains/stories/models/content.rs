use serde::{Deserialize, Serialize};

use crate::common::utils::{generate_snippet, word_count, SNIPPET_LENGTH};

/// Shape of a story's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    Audio,
    Photo,
    Video,
    Mixed,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentType::Text => write!(f, "text"),
            ContentType::Audio => write!(f, "audio"),
            ContentType::Photo => write!(f, "photo"),
            ContentType::Video => write!(f, "video"),
            ContentType::Mixed => write!(f, "mixed"),
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "text" => Ok(ContentType::Text),
            "audio" => Ok(ContentType::Audio),
            "photo" => Ok(ContentType::Photo),
            "video" => Ok(ContentType::Video),
            "mixed" => Ok(ContentType::Mixed),
            _ => Err(anyhow::anyhow!("Invalid content type: {}", s)),
        }
    }
}

/// Kind of an uploaded media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Audio,
    Photo,
    Video,
}

impl MediaKind {
    pub fn content_type(self) -> ContentType {
        match self {
            MediaKind::Audio => ContentType::Audio,
            MediaKind::Photo => ContentType::Photo,
            MediaKind::Video => ContentType::Video,
        }
    }
}

/// Reference to media stored elsewhere; only the URL is kept here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub body: String,
    pub word_count: u32,
}

impl TextBody {
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let word_count = word_count(&body);
        Self { body, word_count }
    }
}

/// Typed story content with its derived snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryContent {
    pub content_type: ContentType,
    pub text: Option<TextBody>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    pub snippet: Option<String>,
}

impl StoryContent {
    /// Build content from optional text and media
    ///
    /// Text alone is `text`; media of a single kind without text takes that
    /// kind; anything else is `mixed`. Blank text is treated as absent.
    pub fn from_parts(text: Option<&str>, media: Vec<MediaItem>) -> Self {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(TextBody::new);

        let content_type = match (&text, media.first()) {
            (Some(_), None) => ContentType::Text,
            (None, Some(first)) if media.iter().all(|m| m.kind == first.kind) => {
                first.kind.content_type()
            }
            (None, None) => ContentType::Text,
            _ => ContentType::Mixed,
        };

        let snippet = text
            .as_ref()
            .map(|t| generate_snippet(&t.body, SNIPPET_LENGTH));

        Self {
            content_type,
            text,
            media,
            snippet,
        }
    }

    pub fn text_body(&self) -> Option<&str> {
        self.text.as_ref().map(|t| t.body.as_str())
    }

    pub fn has_media(&self) -> bool {
        !self.media.is_empty()
    }

    /// Locked rendering: media dropped, body replaced by the snippet
    pub fn redacted(&self) -> Self {
        Self {
            content_type: self.content_type,
            text: self.snippet.as_ref().map(|s| TextBody::new(s.clone())),
            media: Vec::new(),
            snippet: self.snippet.clone(),
        }
    }
}
