//! Transcript cells for the conversation view.
//!
//! Each message renders as a cell: a header line (author, timestamp, copy
//! acknowledgment), the wrapped body, and an attachment summary when images
//! rode along. Terminals cannot show thumbnails, so the summary labels stand
//! in for the original front-end's preview strip.

use nesti_protocol::Message;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::ui_colors::accent_color;
use crate::ui_colors::dim_color;
use crate::ui_colors::primary_color;

/// Represents one message in the conversation history. Returns its
/// `Vec<Line<'static>>` representation to make it easy to display in a
/// scrollable transcript.
pub(crate) trait HistoryCell: std::fmt::Debug {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>>;

    fn desired_height(&self, width: u16) -> u16 {
        self.display_lines(width)
            .len()
            .try_into()
            .unwrap_or(u16::MAX)
    }
}

#[derive(Debug)]
pub(crate) struct UserMessageCell {
    message: Message,
    selected: bool,
    copied: bool,
}

#[derive(Debug)]
pub(crate) struct AssistantMessageCell {
    message: Message,
    selected: bool,
    copied: bool,
}

pub(crate) fn cell_for_message(
    message: &Message,
    selected: bool,
    copied: bool,
) -> Box<dyn HistoryCell> {
    if message.is_user() {
        Box::new(UserMessageCell {
            message: message.clone(),
            selected,
            copied,
        })
    } else {
        Box::new(AssistantMessageCell {
            message: message.clone(),
            selected,
            copied,
        })
    }
}

fn header_line(
    author: Span<'static>,
    sent_at: &str,
    selected: bool,
    copied: bool,
) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    if selected {
        spans.push("▌ ".fg(accent_color()));
    }
    spans.push(author);
    spans.push(" · ".fg(dim_color()));
    spans.push(Span::from(sent_at.to_string()).fg(dim_color()));
    if copied {
        spans.push(" · copied ✓".fg(accent_color()));
    }
    Line::from(spans)
}

fn body_lines(body: &str, width: u16) -> Vec<Line<'static>> {
    let wrap_width = usize::from(width.saturating_sub(2)).max(1);
    let mut lines = Vec::new();
    for source_line in body.lines() {
        if source_line.is_empty() {
            lines.push(Line::from("  "));
            continue;
        }
        for wrapped in textwrap::wrap(source_line, wrap_width) {
            lines.push(Line::from(format!("  {wrapped}")));
        }
    }
    if lines.is_empty() {
        lines.push(Line::from("  "));
    }
    lines
}

fn attachment_line(attachments: &[String]) -> Option<Line<'static>> {
    if attachments.is_empty() {
        return None;
    }
    let labels: Vec<&str> = attachments.iter().map(|uri| format_label(uri)).collect();
    let noun = if attachments.len() == 1 {
        "image"
    } else {
        "images"
    };
    let summary = format!(
        "  └ {} {noun} attached ({})",
        attachments.len(),
        labels.join(", ")
    );
    Some(Line::from(summary).fg(dim_color()))
}

fn format_label(data_uri: &str) -> &'static str {
    if data_uri.starts_with("data:image/png") {
        "PNG"
    } else if data_uri.starts_with("data:image/jpeg") || data_uri.starts_with("data:image/jpg") {
        "JPEG"
    } else {
        "IMG"
    }
}

impl HistoryCell for UserMessageCell {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = vec![header_line(
            "$> you".fg(primary_color()).bold(),
            &self.message.sent_at,
            self.selected,
            self.copied,
        )];
        lines.extend(body_lines(&self.message.body, width));
        lines.extend(attachment_line(&self.message.attachments));
        lines.push(Line::from(""));
        lines
    }
}

impl HistoryCell for AssistantMessageCell {
    fn display_lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = vec![header_line(
            "nesti".fg(accent_color()).bold(),
            &self.message.sent_at,
            self.selected,
            self.copied,
        )];
        lines.extend(body_lines(&self.message.body, width));
        lines.push(Line::from(""));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nesti_protocol::MessageRole;
    use pretty_assertions::assert_eq;

    fn message(role: MessageRole, body: &str, attachments: Vec<String>) -> Message {
        Message {
            seq: 1,
            body: body.to_string(),
            role,
            sent_at: "10:30".to_string(),
            attachments,
        }
    }

    fn rendered_text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn user_cell_shows_prompt_author_and_timestamp() {
        let cell = cell_for_message(&message(MessageRole::User, "uptime", Vec::new()), false, false);
        let text = rendered_text(&cell.display_lines(40));
        assert_eq!(text, vec!["$> you · 10:30", "  uptime", ""]);
    }

    #[test]
    fn assistant_cell_uses_nesti_author() {
        let cell = cell_for_message(
            &message(MessageRole::Assistant, "try `ls -la`", Vec::new()),
            false,
            false,
        );
        let text = rendered_text(&cell.display_lines(40));
        assert_eq!(text[0], "nesti · 10:30");
    }

    #[test]
    fn long_bodies_wrap_to_width() {
        let body = "word ".repeat(20);
        let cell = cell_for_message(&message(MessageRole::Assistant, body.trim(), Vec::new()), false, false);
        let lines = cell.display_lines(20);
        assert!(lines.len() > 3);
        for text in rendered_text(&lines) {
            assert!(text.chars().count() <= 20, "line too wide: {text:?}");
        }
    }

    #[test]
    fn attachments_render_a_summary_line() {
        let attachments = vec![
            "data:image/png;base64,AA==".to_string(),
            "data:image/jpeg;base64,BB==".to_string(),
        ];
        let cell = cell_for_message(&message(MessageRole::User, "look", attachments), false, false);
        let text = rendered_text(&cell.display_lines(60));
        assert!(
            text.contains(&"  └ 2 images attached (PNG, JPEG)".to_string()),
            "missing summary in {text:?}"
        );
    }

    #[test]
    fn selection_and_copy_marks_appear_in_the_header() {
        let cell = cell_for_message(&message(MessageRole::User, "hi", Vec::new()), true, true);
        let text = rendered_text(&cell.display_lines(40));
        assert_eq!(text[0], "▌ $> you · 10:30 · copied ✓");
    }

    #[test]
    fn empty_bodies_still_occupy_a_line() {
        let cell = cell_for_message(&message(MessageRole::User, "", Vec::new()), false, false);
        // Header, empty body placeholder, trailing blank.
        assert_eq!(cell.desired_height(40), 3);
    }
}
