//! The Nesti session: state, event loop, and full-frame rendering.
//!
//! All state transitions are driven by discrete events — key presses,
//! pastes, encode completions, the transport settling — processed one at a
//! time on the UI task. The only suspension point is the network call, which
//! runs on the chat worker; while it is outstanding the busy flag keeps the
//! composer from emitting another submission (the single-flight rule).
//!
//! Session state machine: `Idle → Submitting` on an accepted submission,
//! `Submitting → Idle` when the reply (or the fallback) arrives. In-flight
//! requests cannot be cancelled and have no timeout.

use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use nesti_protocol::ImageFormat;
use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::text::Text;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::chat_client::ChatClient;
use crate::chat_client::ChatOp;
use crate::chat_client::spawn_chat_worker;
use crate::clipboard;
use crate::composer::Attachment;
use crate::composer::Composer;
use crate::composer::PLACEHOLDER;
use crate::conversation::Conversation;
use crate::history_cell::cell_for_message;
use crate::pasted_paths::normalize_pasted_path;
use crate::terminal::TerminalGuard;
use crate::terminal::Tui;
use crate::thinking::ThinkingIndicator;
use crate::ui_colors::accent_color;
use crate::ui_colors::alert_color;
use crate::ui_colors::dim_color;
use crate::ui_colors::primary_color;
use crate::version::NESTI_VERSION;

const COPY_ACK_TTL: Duration = Duration::from_secs(2);
const ANIMATION_TICK: Duration = Duration::from_millis(150);
const PAGE_SCROLL: usize = 5;
const INPUT_PROMPT: &str = "$> ";
const ATTACH_PROMPT: &str = "attach> ";
const FOOTER_HINTS: &str = "Enter send · Ctrl+O attach · Ctrl+V paste image · Ctrl+X drop image \
                            · Ctrl+Y copy · Ctrl+↑/↓ select · PgUp/PgDn scroll · Ctrl+C quit";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the chat backend, e.g. `http://localhost:8000`.
    pub base_url: String,
}

/// Summary returned when the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of user messages submitted during the session.
    pub messages_sent: u64,
}

/// Initialize the terminal, run a chat session until the user quits, and
/// restore the terminal.
pub async fn run_app(config: AppConfig) -> anyhow::Result<SessionSummary> {
    let (event_tx, event_rx) = unbounded_channel();
    let event_tx = AppEventSender::new(event_tx);
    let (op_tx, op_rx) = unbounded_channel();

    let client = ChatClient::new(&config.base_url)?;
    let worker = spawn_chat_worker(client, op_rx, event_tx.clone());

    let mut guard = TerminalGuard::new()?;
    let app = App::new(event_tx, op_tx);
    let result = app.run(guard.terminal_mut(), event_rx).await;

    drop(guard);
    worker.abort();
    result
}

pub(crate) struct App {
    conversation: Conversation,
    composer: Composer,
    thinking: ThinkingIndicator,
    /// True from submission acceptance until the transport settles.
    busy: bool,
    /// Backend reachability from the startup probe; `None` until it lands.
    health: Option<bool>,
    /// Index of the selected message, for the copy affordance.
    selected: Option<usize>,
    /// Sequence id currently showing a "copied" acknowledgment.
    copied_seq: Option<u64>,
    /// Manual scroll offset in lines, measured up from the newest line.
    scroll_from_bottom: usize,
    messages_sent: u64,
    should_exit: bool,
    event_tx: AppEventSender,
    op_tx: UnboundedSender<ChatOp>,
}

impl App {
    pub(crate) fn new(event_tx: AppEventSender, op_tx: UnboundedSender<ChatOp>) -> Self {
        Self {
            conversation: Conversation::with_greeting(),
            composer: Composer::new(),
            thinking: ThinkingIndicator::new(),
            busy: false,
            health: None,
            selected: None,
            copied_seq: None,
            scroll_from_bottom: 0,
            messages_sent: 0,
            should_exit: false,
            event_tx,
            op_tx,
        }
    }

    pub(crate) async fn run(
        mut self,
        terminal: &mut Tui,
        mut event_rx: UnboundedReceiver<AppEvent>,
    ) -> anyhow::Result<SessionSummary> {
        let _ = self.op_tx.send(ChatOp::CheckHealth);

        let mut terminal_events = EventStream::new();
        let mut ticker = tokio::time::interval(ANIMATION_TICK);

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            tokio::select! {
                Some(event) = terminal_events.next() => match event {
                    Ok(Event::Key(key)) => self.handle_key(key),
                    Ok(Event::Paste(pasted)) => self.handle_paste(pasted),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::error!("terminal event stream failed: {err}");
                        self.should_exit = true;
                    }
                },
                Some(event) = event_rx.recv() => self.handle_app_event(event),
                _ = ticker.tick() => {
                    if self.busy {
                        self.thinking.tick();
                    }
                }
            }

            if self.should_exit {
                break;
            }
        }

        Ok(SessionSummary {
            messages_sent: self.messages_sent,
        })
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (key.code, ctrl) {
            (KeyCode::Char('c'), true) => self.should_exit = true,
            (KeyCode::Char('o'), true) => self.composer.open_attach_prompt(),
            (KeyCode::Char('v'), true) => self.request_clipboard_image(),
            (KeyCode::Char('x'), true) => self.composer.drop_last_attachment(),
            (KeyCode::Char('y'), true) => self.copy_message(),
            (KeyCode::Up, true) => self.select_prev(),
            (KeyCode::Down, true) => self.select_next(),
            (KeyCode::PageUp, _) => {
                // Clamped to the transcript length at draw time.
                self.scroll_from_bottom += PAGE_SCROLL;
            }
            (KeyCode::PageDown, _) => {
                self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(PAGE_SCROLL);
            }
            (KeyCode::Esc, _) => {
                if self.composer.attach_prompt().is_some() {
                    self.composer.cancel_attach_prompt();
                } else {
                    self.selected = None;
                }
            }
            (KeyCode::Enter, _) => {
                if self.composer.attach_prompt().is_some() {
                    if let Some(path) = self.composer.take_attach_path() {
                        self.attach_path(PathBuf::from(path));
                    }
                } else {
                    self.submit();
                }
            }
            (KeyCode::Backspace, _) => self.composer.backspace(),
            (KeyCode::Left, false) => self.composer.move_left(),
            (KeyCode::Right, false) => self.composer.move_right(),
            (KeyCode::Home, _) => self.composer.move_home(),
            (KeyCode::End, _) => self.composer.move_end(),
            (KeyCode::Char(c), false) => self.composer.insert_char(c),
            _ => {}
        }
    }

    /// Bracketed paste. A paste naming a single PNG/JPEG path becomes an
    /// attachment (suppressing paste-as-text); anything else is inserted
    /// literally.
    fn handle_paste(&mut self, pasted: String) {
        if self.composer.attach_prompt().is_none()
            && let Some(path) = normalize_pasted_path(&pasted)
            && ImageFormat::from_path(&path).is_some()
        {
            self.attach_path(path);
            return;
        }
        let sanitized = pasted.replace(['\r', '\n'], " ");
        self.composer.insert_str(&sanitized);
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::AssistantReply(body) => {
                self.conversation.push_assistant(body, &now_timestamp());
                self.busy = false;
                self.scroll_from_bottom = 0;
            }
            AppEvent::HealthResult(healthy) => self.health = Some(healthy),
            AppEvent::AttachmentReady(attachment) => {
                self.composer.finish_encode(Some(attachment));
            }
            AppEvent::AttachmentFailed => self.composer.finish_encode(None),
            AppEvent::CopyAckExpired(seq) => {
                if self.copied_seq == Some(seq) {
                    self.copied_seq = None;
                }
            }
        }
    }

    /// Accept the composer's submission, if any: append the user message,
    /// raise the busy flag, then hand the request to the chat worker. Append
    /// always happens before the op is sent.
    fn submit(&mut self) {
        if self.busy {
            return;
        }
        let Some(submission) = self.composer.take_submission() else {
            return;
        };

        self.conversation.push_user(
            submission.text.clone(),
            submission.images.clone(),
            &now_timestamp(),
        );
        self.busy = true;
        self.thinking.reset();
        self.messages_sent += 1;
        self.selected = None;
        self.scroll_from_bottom = 0;

        let _ = self.op_tx.send(ChatOp::SendChat {
            message: submission.text,
            images: submission.images,
        });
    }

    /// Start encoding a local image file into a data URI. Files whose
    /// declared type is not PNG/JPEG are dropped without any user-visible
    /// error.
    fn attach_path(&mut self, path: PathBuf) {
        let Some(format) = ImageFormat::from_path(&path) else {
            tracing::debug!("ignoring non-image attachment: {}", path.display());
            return;
        };
        self.composer.note_encode_started();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            match tokio::fs::read(&path).await {
                Ok(bytes) => tx.send(AppEvent::AttachmentReady(Attachment {
                    format,
                    data_uri: format.to_data_uri(&bytes),
                })),
                Err(err) => {
                    tracing::warn!("failed to read {}: {err}", path.display());
                    tx.send(AppEvent::AttachmentFailed);
                }
            }
        });
    }

    /// Pull raw image data off the system clipboard (Ctrl+V).
    fn request_clipboard_image(&mut self) {
        self.composer.note_encode_started();
        let tx = self.event_tx.clone();
        tokio::task::spawn_blocking(move || match clipboard::read_image_data_uri() {
            Some(data_uri) => tx.send(AppEvent::AttachmentReady(Attachment {
                format: ImageFormat::Png,
                data_uri,
            })),
            None => tx.send(AppEvent::AttachmentFailed),
        });
    }

    /// Copy the selected (or newest) message body and show the 2-second
    /// acknowledgment. Clipboard failures are logged, never surfaced.
    fn copy_message(&mut self) {
        let index = self
            .selected
            .unwrap_or_else(|| self.conversation.len().saturating_sub(1));
        let Some(message) = self.conversation.messages().get(index) else {
            return;
        };
        if !clipboard::copy_text(&message.body) {
            return;
        }

        let seq = message.seq;
        self.copied_seq = Some(seq);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(COPY_ACK_TTL).await;
            tx.send(AppEvent::CopyAckExpired(seq));
        });
    }

    fn select_prev(&mut self) {
        let len = self.conversation.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            None => len - 1,
            Some(0) => 0,
            Some(index) => index - 1,
        });
    }

    fn select_next(&mut self) {
        let len = self.conversation.len();
        if len == 0 {
            return;
        }
        self.selected = match self.selected {
            None => None,
            Some(index) => Some((index + 1).min(len - 1)),
        };
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chips_visible = self.composer.attach_prompt().is_some()
            || !self.composer.attachments().is_empty()
            || self.composer.pending_encodes() > 0;

        let [header_area, transcript_area, thinking_area, chips_area, input_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(u16::from(self.busy)),
                Constraint::Length(u16::from(chips_visible)),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .areas(frame.area());

        self.draw_header(frame, header_area);
        self.draw_transcript(frame, transcript_area);
        if self.busy {
            frame.render_widget(self.thinking.line(), thinking_area);
        }
        if chips_visible {
            self.draw_chips(frame, chips_area);
        }
        self.draw_input(frame, input_area);
        frame.render_widget(
            Paragraph::new(Line::from(FOOTER_HINTS).fg(dim_color())),
            footer_area,
        );

        self.place_cursor(frame, chips_area, input_area);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let health = match self.health {
            None => Span::from("… checking backend").fg(dim_color()),
            Some(true) => Span::from("● backend online").fg(accent_color()),
            Some(false) => Span::from("○ backend offline").fg(alert_color()),
        };
        let left = Line::from(vec![
            Span::from("terminal@linuxgrandfa").fg(primary_color()).bold(),
            Span::from(" · ").fg(dim_color()),
            health,
        ]);
        frame.render_widget(Paragraph::new(left), area);
        frame.render_widget(
            Paragraph::new(Line::from(format!("v{NESTI_VERSION}")).fg(dim_color()))
                .alignment(Alignment::Right),
            area,
        );
    }

    fn draw_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line<'static>> = Vec::new();
        for (index, message) in self.conversation.messages().iter().enumerate() {
            let selected = self.selected == Some(index);
            let copied = self.copied_seq == Some(message.seq);
            lines.extend(cell_for_message(message, selected, copied).display_lines(area.width));
        }

        let total = lines.len();
        let max_scroll = total.saturating_sub(usize::from(area.height));
        self.scroll_from_bottom = self.scroll_from_bottom.min(max_scroll);
        let offset = max_scroll - self.scroll_from_bottom;

        frame.render_widget(
            Paragraph::new(Text::from(lines)).scroll((offset.try_into().unwrap_or(u16::MAX), 0)),
            area,
        );
    }

    fn draw_chips(&self, frame: &mut Frame, area: Rect) {
        if let Some(prompt) = self.composer.attach_prompt() {
            let line = Line::from(vec![
                Span::from(ATTACH_PROMPT).fg(accent_color()).bold(),
                Span::from(prompt.to_string()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        for (index, attachment) in self.composer.attachments().iter().enumerate() {
            spans.push(
                Span::from(format!("[{} {}] ", index + 1, attachment.format.label()))
                    .fg(accent_color()),
            );
        }
        let pending = self.composer.pending_encodes();
        if pending > 0 {
            spans.push(Span::from(format!("({pending} encoding…) ")).fg(dim_color()));
        }
        if !self.composer.attachments().is_empty() {
            spans.push(Span::from("· Ctrl+X removes last").fg(dim_color()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn draw_input(&self, frame: &mut Frame, area: Rect) {
        let border_color = if self.busy { dim_color() } else { accent_color() };
        let block = Block::bordered().border_style(border_color);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let content = if self.composer.text().is_empty() {
            Line::from(vec![
                Span::from(INPUT_PROMPT).fg(primary_color()).bold(),
                Span::from(PLACEHOLDER).fg(dim_color()),
            ])
        } else {
            Line::from(vec![
                Span::from(INPUT_PROMPT).fg(primary_color()).bold(),
                Span::from(self.composer.text().to_string()).fg(primary_color()),
            ])
        };
        frame.render_widget(Paragraph::new(content), inner);
    }

    fn place_cursor(&self, frame: &mut Frame, chips_area: Rect, input_area: Rect) {
        if let Some(prompt) = self.composer.attach_prompt() {
            use unicode_width::UnicodeWidthStr;
            let x = chips_area.x
                + u16::try_from(ATTACH_PROMPT.width() + prompt.width()).unwrap_or(u16::MAX);
            frame.set_cursor_position(Position::new(x.min(chips_area.right()), chips_area.y));
            return;
        }

        let prompt_cols = INPUT_PROMPT.chars().count();
        let x = input_area.x
            + 1
            + u16::try_from(prompt_cols + self.composer.cursor_col()).unwrap_or(u16::MAX);
        let max_x = input_area.right().saturating_sub(2);
        frame.set_cursor_position(Position::new(x.min(max_x), input_area.y + 1));
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%H:%M").to_string()
}
