//! The composer is the bottom-pane input state machine.
//!
//! It owns:
//!
//! - the single-line text buffer and its cursor,
//! - the attachment set (encoded data URIs plus a pending-encode counter),
//! - the attach-path mini prompt opened with Ctrl+O.
//!
//! Submission gating lives here: [`Composer::take_submission`] returns
//! `None` for whitespace-only input with no attachments, leaving all state
//! untouched. The busy gate (no submission while a request is in flight) is
//! the app's responsibility, since the composer has no view of the network.

use nesti_protocol::ImageFormat;
use nesti_protocol::Submission;

pub(crate) const PLACEHOLDER: &str = "Type your command...";

/// A fully-encoded image attachment awaiting submission.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attachment {
    pub(crate) format: ImageFormat,
    pub(crate) data_uri: String,
}

#[derive(Debug, Default)]
pub(crate) struct Composer {
    text: String,
    /// Cursor position in chars, 0..=text.chars().count().
    cursor: usize,
    attachments: Vec<Attachment>,
    /// Encodes started but not yet settled. Late arrivals after a submission
    /// join the next submission's attachment set, mirroring the original
    /// front-end's callback behavior.
    pending_encodes: usize,
    /// `Some` while the attach-path prompt is open.
    attach_prompt: Option<String>,
}

impl Composer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub(crate) fn pending_encodes(&self) -> usize {
        self.pending_encodes
    }

    pub(crate) fn attach_prompt(&self) -> Option<&str> {
        self.attach_prompt.as_deref()
    }

    /// Cursor column in display cells, relative to the start of the text.
    pub(crate) fn cursor_col(&self) -> usize {
        use unicode_width::UnicodeWidthChar;
        self.text
            .chars()
            .take(self.cursor)
            .map(|c| UnicodeWidthChar::width(c).unwrap_or(0))
            .sum()
    }

    fn byte_offset(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    pub(crate) fn insert_char(&mut self, c: char) {
        if let Some(prompt) = &mut self.attach_prompt {
            prompt.push(c);
            return;
        }
        let at = self.byte_offset();
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub(crate) fn insert_str(&mut self, s: &str) {
        if let Some(prompt) = &mut self.attach_prompt {
            prompt.push_str(s);
            return;
        }
        let at = self.byte_offset();
        self.text.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(prompt) = &mut self.attach_prompt {
            prompt.pop();
            return;
        }
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset();
        self.text.remove(at);
    }

    pub(crate) fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub(crate) fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub(crate) fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub(crate) fn open_attach_prompt(&mut self) {
        if self.attach_prompt.is_none() {
            self.attach_prompt = Some(String::new());
        }
    }

    pub(crate) fn cancel_attach_prompt(&mut self) {
        self.attach_prompt = None;
    }

    /// Close the attach prompt and return its contents, if non-empty.
    pub(crate) fn take_attach_path(&mut self) -> Option<String> {
        let path = self.attach_prompt.take()?;
        let path = path.trim().to_string();
        if path.is_empty() { None } else { Some(path) }
    }

    pub(crate) fn note_encode_started(&mut self) {
        self.pending_encodes += 1;
    }

    /// Settle one pending encode. `None` means the image was dropped
    /// (unreadable file, encode failure); no error is surfaced.
    pub(crate) fn finish_encode(&mut self, attachment: Option<Attachment>) {
        self.pending_encodes = self.pending_encodes.saturating_sub(1);
        if let Some(attachment) = attachment {
            self.attachments.push(attachment);
        }
    }

    pub(crate) fn drop_last_attachment(&mut self) {
        self.attachments.pop();
    }

    /// Emit a submission if there is anything to send, clearing local state.
    ///
    /// Whatever has finished encoding at this moment is included; encodes
    /// still pending stay pending and will join the next submission.
    pub(crate) fn take_submission(&mut self) -> Option<Submission> {
        if self.text.trim().is_empty() && self.attachments.is_empty() {
            return None;
        }
        let text = self.text.trim().to_string();
        let images = std::mem::take(&mut self.attachments)
            .into_iter()
            .map(|attachment| attachment.data_uri)
            .collect();
        self.text.clear();
        self.cursor = 0;
        Some(Submission { text, images })
    }
}
