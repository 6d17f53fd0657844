//! Line layout of the transcript
//!
//! The chat panel draws exactly these lines, unwrapped, so scroll bounds
//! computed from them always match the screen.

use ratatui::text::Span;
use crate::session::{ChatSession, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Label(Sender),
    Body(Sender),
    Blank,
    TypingLabel,
    Typing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub kind: LineKind,
    pub text: String,
}

impl TranscriptLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

/// Terminal columns taken by `s` (double-width glyphs count as two)
fn display_width(s: &str) -> usize {
    Span::raw(s).width()
}

/// Wrap text to fit within a given width, returning multiple lines.
/// Breaks at word boundaries; a word wider than the line is split.
pub fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = display_width(word);

        if current_len > 0 && current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current_line));
            current_len = 0;
        }

        if word_len <= width {
            current_line.push_str(word);
            current_len = word_len;
            continue;
        }

        // Hard-split an overlong word; the tail stays open for the next word
        for c in word.chars() {
            let mut buf = [0u8; 4];
            let c_len = display_width(c.encode_utf8(&mut buf));
            if current_len > 0 && current_len + c_len > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            current_line.push(c);
            current_len += c_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Every line the chat panel draws, in order, wrapped to `width` columns
pub fn transcript_lines(session: &ChatSession, width: usize) -> Vec<TranscriptLine> {
    let mut lines = Vec::new();

    for msg in session.transcript().messages() {
        lines.push(TranscriptLine::new(LineKind::Label(msg.sender), label(msg.sender)));
        if msg.text.is_empty() {
            lines.push(TranscriptLine::new(LineKind::Body(msg.sender), ""));
        }
        for line in msg.text.lines() {
            for wrapped in wrap_text_to_width(line, width) {
                lines.push(TranscriptLine::new(LineKind::Body(msg.sender), wrapped));
            }
        }
        lines.push(TranscriptLine::new(LineKind::Blank, ""));
    }

    if session.is_pending() {
        lines.push(TranscriptLine::new(LineKind::TypingLabel, label(Sender::Bot)));
        lines.push(TranscriptLine::new(LineKind::Typing, ""));
    }

    lines
}

fn label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Bot => "Assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text_to_width("aaaaaaaaaaaaaaa bbbbbbbbbbbbbbb cccccccccccccc", 20);
        assert_eq!(lines, vec!["aaaaaaaaaaaaaaa", "bbbbbbbbbbbbbbb", "cccccccccccccc"]);
    }

    #[test]
    fn word_wrap_can_need_more_lines_than_character_count() {
        let text = "aaaaaaaaaaaaaaa bbbbbbbbbbbbbbb cccccccccccccc ddddddddddddd ZZEND5xx";
        let by_chars = text.chars().count().div_ceil(20);
        let lines = wrap_text_to_width(text, 20);
        assert!(lines.len() > by_chars);
        assert_eq!(lines.last().map(String::as_str), Some("ZZEND5xx"));
    }

    #[test]
    fn overlong_word_is_split() {
        let lines = wrap_text_to_width("abcdefghij xy", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn double_width_glyphs_count_two_columns() {
        // Each glyph is two columns wide, so three fit in six
        let lines = wrap_text_to_width("予約予約予約", 6);
        assert_eq!(lines, vec!["予約予", "約予約"]);
    }

    #[test]
    fn blank_text_is_one_empty_line() {
        assert_eq!(wrap_text_to_width("", 10), vec![String::new()]);
        assert_eq!(wrap_text_to_width("   ", 10), vec![String::new()]);
    }

    #[test]
    fn pending_session_ends_with_typing_lines() {
        let mut session = ChatSession::new();
        session.update_draft("Monday?");
        session.submit();

        let lines = transcript_lines(&session, 40);
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineKind::Label(Sender::User),
                LineKind::Body(Sender::User),
                LineKind::Blank,
                LineKind::TypingLabel,
                LineKind::Typing,
            ]
        );
    }
}
