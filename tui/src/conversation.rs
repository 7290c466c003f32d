//! The session transcript: an append-only sequence of messages.

use nesti_protocol::Message;
use nesti_protocol::MessageRole;

/// Nesti's opening line, shown before any user input.
pub(crate) const GREETING: &str =
    "Howdy, young G! I'm Nesti. What command line wisdom can this old penguin share with ya today?";

/// Append-only conversation store.
///
/// Sequence ids are assigned from the store length at call time. That is
/// safe here because the busy flag guarantees a single submission in flight:
/// the user message is appended synchronously before the request is issued,
/// and the assistant message is appended when it settles, with no
/// opportunity for interleaving.
#[derive(Debug)]
pub(crate) struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// An empty store seeded with the greeting.
    pub(crate) fn with_greeting() -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
        };
        conversation.push(GREETING.to_string(), MessageRole::Assistant, "Just now", Vec::new());
        conversation
    }

    pub(crate) fn push_user(
        &mut self,
        body: String,
        attachments: Vec<String>,
        sent_at: &str,
    ) -> u64 {
        self.push(body, MessageRole::User, sent_at, attachments)
    }

    pub(crate) fn push_assistant(&mut self, body: String, sent_at: &str) -> u64 {
        self.push(body, MessageRole::Assistant, sent_at, Vec::new())
    }

    fn push(
        &mut self,
        body: String,
        role: MessageRole,
        sent_at: &str,
        attachments: Vec<String>,
    ) -> u64 {
        let seq = self.messages.len() as u64 + 1;
        self.messages.push(Message {
            seq,
            body,
            role,
            sent_at: sent_at.to_string(),
            attachments,
        });
        seq
    }

    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn len(&self) -> usize {
        self.messages.len()
    }
}
