use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::{Rfc2822, Rfc3339};

/// Preview metadata for an archived conversation.
///
/// Fetched lazily for the sidebar list and addressed by its position in
/// that list. Read-only; the full message history is loaded separately by
/// index when the conversation is resumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// First message of the conversation, for preview.
    #[serde(default)]
    pub first: Option<String>,

    /// Last message of the conversation, for preview.
    #[serde(default)]
    pub last: Option<String>,

    /// When the conversation started, as reported by the service.
    #[serde(default)]
    pub started_at: Option<String>,

    /// When the conversation was archived.
    #[serde(default)]
    pub ended_at: Option<String>,

    /// Number of messages in the conversation.
    #[serde(default)]
    pub length: Option<u64>,
}

/// Maximum preview title length, in characters.
const TITLE_CHARS: usize = 40;

impl ConversationSummary {
    /// Returns a short display title derived from the first message.
    pub fn title(&self) -> String {
        match self.first.as_deref().filter(|f| !f.is_empty()) {
            Some(first) => first.chars().take(TITLE_CHARS).collect(),
            None => "Untitled Chat".to_string(),
        }
    }

    /// Returns the start timestamp formatted for display.
    ///
    /// The service encodes datetimes as RFC 2822 strings; RFC 3339 is
    /// accepted as a fallback and anything else is shown raw.
    pub fn started_display(&self) -> String {
        match self.started_at.as_deref() {
            Some(raw) => parse_timestamp(raw)
                .and_then(|dt| dt.format(&Rfc2822).ok())
                .unwrap_or_else(|| raw.to_string()),
            None => String::new(),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(first: Option<&str>, started_at: Option<&str>) -> ConversationSummary {
        ConversationSummary {
            first: first.map(String::from),
            last: None,
            started_at: started_at.map(String::from),
            ended_at: None,
            length: None,
        }
    }

    #[test]
    fn title_truncates_to_forty_chars() {
        let long = "x".repeat(100);
        let s = summary(Some(&long), None);
        assert_eq!(s.title().chars().count(), 40);
    }

    #[test]
    fn title_falls_back_when_empty() {
        assert_eq!(summary(None, None).title(), "Untitled Chat");
        assert_eq!(summary(Some(""), None).title(), "Untitled Chat");
    }

    #[test]
    fn started_display_accepts_rfc2822() {
        let s = summary(None, Some("Wed, 27 Aug 2025 12:00:00 GMT"));
        assert!(s.started_display().contains("2025"));
    }

    #[test]
    fn started_display_keeps_unparseable_raw() {
        let s = summary(None, Some("yesterday-ish"));
        assert_eq!(s.started_display(), "yesterday-ish");
    }

    #[test]
    fn deserializes_preview_payload() {
        let json = serde_json::json!({
            "first": "What does clause 4 say?",
            "last": "The answer is not found in the document.",
            "started_at": "Wed, 27 Aug 2025 12:00:00 GMT",
            "ended_at": "Wed, 27 Aug 2025 12:30:00 GMT",
            "length": 6
        });
        let s: ConversationSummary = serde_json::from_value(json).unwrap();
        assert_eq!(s.length, Some(6));
        assert_eq!(s.title(), "What does clause 4 say?");
    }
}
