use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

const POST_URL_BASE: &str = "https://www.instagram.com/p";

/// A classified post as returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "instagram_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media_type: MediaKind,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(
        rename = "post_timestamp",
        default,
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_category: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(rename = "drink_category", default)]
    pub category: Option<String>,
}

impl Post {
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn link(&self) -> String {
        match self.permalink.as_deref().map(str::trim) {
            Some(link) if !link.is_empty() => link.to_string(),
            _ => format!("{}/{}/", POST_URL_BASE, self.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Image,
    Video,
    CarouselAlbum,
    Other(String),
}

impl MediaKind {
    pub fn as_str(&self) -> &str {
        match self {
            MediaKind::Image => "IMAGE",
            MediaKind::Video => "VIDEO",
            MediaKind::CarouselAlbum => "CAROUSEL_ALBUM",
            MediaKind::Other(raw) => raw,
        }
    }
}

impl From<&str> for MediaKind {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IMAGE" => MediaKind::Image,
            "VIDEO" | "REELS" => MediaKind::Video,
            "CAROUSEL_ALBUM" => MediaKind::CarouselAlbum,
            _ => MediaKind::Other(raw.to_string()),
        }
    }
}

impl Serialize for MediaKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MediaKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().map(MediaKind::from).unwrap_or_default())
    }
}

// The service emits RFC 3339, Graph API style `+0000` offsets, or naive
// datetimes straight out of SQLite depending on where the row came from.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    parse_timestamp(&raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp: {raw}")))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_row() {
        let json = serde_json::json!({
            "instagram_id": "1789",
            "username": "alice",
            "caption": "Friday negroni",
            "media_type": "VIDEO",
            "media_url": "https://cdn.example/1789.mp4",
            "post_timestamp": "2024-03-01T18:30:00",
            "ai_category": "Genel",
            "ai_summary": null,
            "drink_category": "Cin Kokteyli"
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.id, "1789");
        assert_eq!(post.media_type, MediaKind::Video);
        assert_eq!(post.category(), Some("Cin Kokteyli"));
        assert_eq!(post.permalink, None);
        assert_eq!(
            post.created_at.unwrap().to_rfc3339(),
            "2024-03-01T18:30:00+00:00"
        );
        assert_eq!(post.link(), "https://www.instagram.com/p/1789/");
    }

    #[test]
    fn accepts_graph_api_offsets_and_missing_fields() {
        let json = serde_json::json!({
            "instagram_id": "42",
            "username": "bob",
            "permalink": "https://www.instagram.com/p/abc/",
            "media_type": null,
            "post_timestamp": "2024-03-01T18:30:00+0000"
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.media_type, MediaKind::Image);
        assert!(post.created_at.is_some());
        assert_eq!(post.category(), None);
        assert_eq!(post.link(), "https://www.instagram.com/p/abc/");
    }

    #[test]
    fn unknown_media_kind_is_preserved() {
        assert_eq!(
            MediaKind::from("STORY"),
            MediaKind::Other("STORY".to_string())
        );
        assert_eq!(MediaKind::from("STORY").as_str(), "STORY");
    }
}
