use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use crate::backend::{ChatClient, ChatError};
use crate::layout::{self, TranscriptLine};
use crate::session::ChatSession;
use crate::tui::AppEvent;

/// Reports the exchange outcome exactly once.
///
/// If the owning task finishes without calling `complete` (panic, abort) the
/// drop reports `ChatError::Interrupted`, so the session always leaves pending.
struct ExchangeGuard {
    events: Option<UnboundedSender<AppEvent>>,
}

impl ExchangeGuard {
    fn new(events: UnboundedSender<AppEvent>) -> Self {
        Self { events: Some(events) }
    }

    fn complete(mut self, outcome: Result<String, ChatError>) {
        if let Some(events) = self.events.take() {
            let _ = events.send(AppEvent::Exchange(outcome));
        }
    }
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        if let Some(events) = self.events.take() {
            tracing::warn!("exchange task ended without a result");
            let _ = events.send(AppEvent::Exchange(Err(ChatError::Interrupted)));
        }
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,

    // The one chat session this window hosts
    pub session: ChatSession,
    pub cursor: usize, // char position in the draft

    // Transcript viewport
    pub chat_scroll: usize, // first visible transcript line
    pub chat_height: u16,
    pub chat_width: u16,
    pub follow_tail: bool,
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    client: ChatClient,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(client: ChatClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            follow_tail: true,
            chat_area: None,
            animation_frame: 0,
            client,
            events,
        }
    }

    /// Submit the draft and start its exchange in the background.
    ///
    /// Returns false when nothing was sent (blank draft or already pending).
    pub fn send_draft(&mut self) -> bool {
        let Some(message) = self.session.submit() else {
            return false;
        };
        self.cursor = 0;
        self.animation_frame = 0;
        self.follow_tail = true;

        let client = self.client.clone();
        let guard = ExchangeGuard::new(self.events.clone());
        tokio::spawn(async move {
            let outcome = client.send(&message).await;
            guard.complete(outcome);
        });
        true
    }

    pub fn finish_exchange(&mut self, outcome: Result<String, ChatError>) {
        self.session.resolve(outcome);
        self.follow_tail = true;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Draft editing
    pub fn insert_char(&mut self, c: char) {
        let mut draft = self.session.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.insert(byte_pos, c);
        self.session.update_draft(draft);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.remove_at_cursor();
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.draft_len() {
            self.remove_at_cursor();
        }
    }

    pub fn clear_draft(&mut self) {
        self.session.update_draft(String::new());
        self.cursor = 0;
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.draft_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.draft_len();
    }

    fn draft_len(&self) -> usize {
        self.session.draft().chars().count()
    }

    fn remove_at_cursor(&mut self) {
        let mut draft = self.session.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.remove(byte_pos);
        self.session.update_draft(draft);
    }

    // Transcript scrolling
    pub fn scroll_up(&mut self, lines: usize) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.follow_tail = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.max_scroll();
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
        self.follow_tail = self.chat_scroll == max;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    /// Keep a scrolled-back view inside the transcript after a relayout
    pub fn clamp_scroll(&mut self) {
        self.chat_scroll = self.chat_scroll.min(self.max_scroll());
    }

    pub fn max_scroll(&self) -> usize {
        self.transcript_lines().len().saturating_sub(self.visible_height())
    }

    /// The transcript exactly as the chat panel draws it
    pub fn transcript_lines(&self) -> Vec<TranscriptLine> {
        // Defaults until the first render reports real dimensions
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };
        layout::transcript_lines(&self.session, wrap_width)
    }

    fn visible_height(&self) -> usize {
        if self.chat_height > 0 { self.chat_height as usize } else { 20 }
    }
}
