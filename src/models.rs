use serde::{Deserialize, Serialize};

/// Body of `POST /api/demo/ai`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub task: Option<String>,
    pub text: Option<String>,
    pub prompt: Option<String>,
    pub target_lang: Option<String>,
}

/// Body of `POST /api/demo/db`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GuestbookPost {
    pub name: Option<String>,
    pub message: Option<String>,
}

/// A row of the `guestbook` table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GuestbookEntry {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub created_at: Option<String>,
}

/// Body of `POST /api/demo/kv`. Both fields are optional; `set` wins.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct CounterUpdate {
    pub increment: Option<i64>,
    pub set: Option<i64>,
}

/// Bookkeeping stored next to the counter value.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CounterMetadata {
    pub created: Option<String>,
    pub last_updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_count: Option<u64>,
}

impl CounterMetadata {
    /// Records one more update at `now`, stamping `created` on first use.
    pub fn touch(mut self, now: &str) -> Self {
        if self.created.is_none() {
            self.created = Some(now.to_string());
        }
        self.last_updated = Some(now.to_string());
        self.update_count = Some(self.update_count.unwrap_or(0) + 1);
        self
    }
}

/// Body of `POST /api/demo/storage`.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    pub content_type: Option<String>,
    #[serde(default)]
    pub is_base64: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn touch_stamps_created_once_and_counts_updates() {
        let first = CounterMetadata::default().touch("t1");
        assert_eq!(first.created.as_deref(), Some("t1"));
        assert_eq!(first.update_count, Some(1));

        let second = first.touch("t2");
        assert_eq!(second.created.as_deref(), Some("t1"));
        assert_eq!(second.last_updated.as_deref(), Some("t2"));
        assert_eq!(second.update_count, Some(2));
    }

    #[test]
    fn empty_metadata_serializes_without_update_count() {
        let value = serde_json::to_value(CounterMetadata::default()).unwrap();
        assert_eq!(value, json!({ "created": null, "lastUpdated": null }));
    }

    #[test]
    fn upload_request_reads_camel_case_fields() {
        let upload: UploadRequest = serde_json::from_value(json!({
            "name": "a.txt",
            "content": "aGk=",
            "contentType": "text/plain",
            "isBase64": true
        }))
        .unwrap();
        assert_eq!(upload.content_type.as_deref(), Some("text/plain"));
        assert!(upload.is_base64);
    }
}
