use serde::{Deserialize, Serialize};

/// One scraped post/article as delivered by the upstream content
/// extractors. Every field is optional on the wire and unknown fields
/// are ignored, so extractor-specific extras (platform, sentiment,
/// char counts, ...) pass through harmlessly. Only `url` and `title`
/// are echoed back; the rest feeds extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Story {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub combined_text: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: i64,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_fields_default_when_absent() {
        let story: Story = serde_json::from_value(json!({})).unwrap();
        assert_eq!(story.url, "");
        assert_eq!(story.title, "");
        assert!(story.comments.is_empty());
    }

    #[test]
    fn extractor_extras_on_the_wire_are_ignored() {
        let v = json!({
            "ok": true,
            "platform": "reddit",
            "url": "https://example.test/post/1",
            "title": "Semis thread",
            "author": "someone",
            "score": 42,
            "created_utc": 1700000000,
            "chars": 1234,
            "excerpt": "NVDA looks strong",
            "comments_excerpt": "...",
            "sentiment": 0.7,
            "interest": 0.3,
            "comments": [{"author": "a", "score": 1, "created_utc": 0, "body": "Keep: NVDA"}]
        });

        let story: Story = serde_json::from_value(v).unwrap();
        assert_eq!(story.url, "https://example.test/post/1");
        assert_eq!(story.title, "Semis thread");
        assert_eq!(story.excerpt, "NVDA looks strong");
        assert_eq!(story.comments.len(), 1);
        assert_eq!(story.comments[0].body, "Keep: NVDA");
    }
}
