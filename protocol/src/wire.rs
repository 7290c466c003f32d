//! JSON bodies exchanged with the chat backend.

use serde::Deserialize;
use serde::Serialize;

use crate::message::MessageRole;
use crate::message::Submission;

/// Body of `POST {base}/api/chat/`.
///
/// The backend distinguishes "no images" as an explicit `null`, so an empty
/// attachment set must serialize as `"images": null` rather than `[]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub images: Option<Vec<String>>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, images: Vec<String>) -> Self {
        Self {
            message: message.into(),
            images: if images.is_empty() {
                None
            } else {
                Some(images)
            },
        }
    }
}

impl From<Submission> for ChatRequest {
    fn from(submission: Submission) -> Self {
        Self::new(submission.text, submission.images)
    }
}

/// Body of a successful chat response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub role: MessageRole,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_image_set_serializes_as_null() {
        let request = ChatRequest::new("ls -la", Vec::new());
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({ "message": "ls -la", "images": null })
        );
    }

    #[test]
    fn attachments_pass_through_verbatim() {
        let uri = "data:image/png;base64,iVBORw0KGgo=".to_string();
        let request = ChatRequest::new("what is this?", vec![uri.clone()]);
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains(&uri));

        let parsed: ChatRequest = serde_json::from_str(&json).expect("round trip");
        assert_eq!(parsed.images, Some(vec![uri]));
    }

    #[test]
    fn reply_parses_backend_shape() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"response":"howdy","role":"assistant"}"#).expect("parse");
        assert_eq!(reply.response, "howdy");
        assert_eq!(reply.role, MessageRole::Assistant);
    }
}
