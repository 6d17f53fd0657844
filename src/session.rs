//! Conversation state for one chat session
//!
//! The session owns the transcript, the draft, and the `pending` flag. It never
//! touches the network itself: `submit` hands back the text to send and
//! `resolve` takes the outcome, so whoever drives the exchange decides how it
//! runs while every state transition stays here.

use crate::backend::ChatError;

pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), sender: Sender::User }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { text: text.into(), sender: Sender::Bot }
    }
}

/// Append-only message log, oldest first
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    transcript: Transcript,
    draft: String,
    pending: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Commit the draft as a user message and mark an exchange in flight.
    ///
    /// Returns the text to send, or `None` when the draft is blank or another
    /// exchange is still pending; in that case nothing changes.
    pub fn submit(&mut self) -> Option<String> {
        if self.pending || self.draft.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.draft);
        self.transcript.push(Message::user(text.clone()));
        self.pending = true;
        tracing::debug!(chars = text.chars().count(), "submitted draft");
        Some(text)
    }

    /// Record the outcome of the in-flight exchange and return to idle.
    pub fn resolve(&mut self, outcome: Result<String, ChatError>) {
        if !self.pending {
            tracing::warn!("exchange resolved with none pending, ignoring");
            return;
        }

        let reply = match outcome {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "chat exchange failed");
                FALLBACK_REPLY.to_string()
            }
        };
        self.transcript.push(Message::bot(reply));
        self.pending = false;
        tracing::debug!(messages = self.transcript.messages().len(), "exchange resolved");
    }
}
