use serde::Deserialize;
use serde::Serialize;

/// Who authored a message. Matches the backend's role enum.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One entry in the session transcript.
///
/// Messages are created on submission (user) or when the transport settles
/// (assistant) and are never mutated afterwards. They live only as long as
/// the session; nothing is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Unique within a session, strictly increasing in append order.
    pub seq: u64,
    pub body: String,
    pub role: MessageRole,
    /// Display-formatted wall-clock time (e.g. `14:05`, or `Just now` for
    /// the greeting).
    pub sent_at: String,
    /// Image attachments as `data:` URIs, in the order they finished
    /// encoding. Empty for assistant messages.
    pub attachments: Vec<String>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// One user-initiated unit of text plus optional images, handed from the
/// composer to the transport exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub text: String,
    /// Data URIs of every attachment that had finished encoding at submit
    /// time.
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn roles_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).expect("serialize"),
            "\"assistant\""
        );
        assert_eq!(
            serde_json::from_str::<MessageRole>("\"user\"").expect("deserialize"),
            MessageRole::User
        );
    }
}
