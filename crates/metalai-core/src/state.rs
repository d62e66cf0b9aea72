//! UI-agnostic conversation state
//!
//! `ChatWidget` holds everything the chat window renders: the message list,
//! the draft in the input box and the open/loading flags. Frontends feed it
//! user actions and service outcomes; it never performs I/O itself.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;

/// Bot text shown in place of a reply whenever the exchange fails.
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting. Please try again.";

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    sender: Sender,
    text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Visible state of the widget, derived from the open and loading flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Closed,
    Idle,
    Awaiting,
}

#[derive(Debug, Default)]
pub struct ChatWidget {
    messages: Vec<ChatMessage>,
    draft: String,
    loading: bool,
    open: bool,
}

impl ChatWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> WidgetState {
        match (self.open, self.loading) {
            (false, _) => WidgetState::Closed,
            (true, false) => WidgetState::Idle,
            (true, true) => WidgetState::Awaiting,
        }
    }

    /// Whether the send affordance should be enabled
    pub fn can_send(&self) -> bool {
        !self.loading && !self.draft.trim().is_empty()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    /// Commit the draft as a user message.
    ///
    /// Returns the text to dispatch to the chatbot service, or `None` when the
    /// draft is blank or a request is already in flight. In both of those
    /// cases nothing changes.
    pub fn submit(&mut self) -> Option<String> {
        if self.draft.trim().is_empty() {
            return None;
        }
        if self.loading {
            debug!("submit ignored, a reply is still pending");
            return None;
        }

        let text = std::mem::take(&mut self.draft);
        self.messages.push(ChatMessage::user(text.clone()));
        self.loading = true;
        Some(text)
    }

    /// Apply the outcome of the in-flight request.
    ///
    /// Returns `false` if no request was pending, in which case the outcome is
    /// dropped.
    pub fn resolve(&mut self, outcome: Result<String, ChatError>) -> bool {
        if !self.loading {
            debug!("dropping chatbot outcome with no pending request");
            return false;
        }

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chatbot exchange failed, showing fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };
        self.messages.push(ChatMessage::bot(reply));
        self.loading = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget_with_draft(text: &str) -> ChatWidget {
        let mut widget = ChatWidget::new();
        widget.toggle_open();
        widget.set_draft(text);
        widget
    }

    #[test]
    fn test_starts_closed_and_empty() {
        let widget = ChatWidget::new();
        assert_eq!(widget.state(), WidgetState::Closed);
        assert!(widget.messages().is_empty());
        assert!(!widget.is_loading());
        assert_eq!(widget.draft(), "");
    }

    #[test]
    fn test_submit_appends_user_message_before_reply() {
        let mut widget = widget_with_draft("  How much CO2 per tonne of aluminium?");

        let dispatched = widget.submit();

        assert_eq!(dispatched.as_deref(), Some("  How much CO2 per tonne of aluminium?"));
        assert_eq!(widget.messages(), &[ChatMessage::user("  How much CO2 per tonne of aluminium?")]);
        assert_eq!(widget.draft(), "");
        assert!(widget.is_loading());
        assert_eq!(widget.state(), WidgetState::Awaiting);
    }

    #[test]
    fn test_blank_submit_is_noop() {
        for draft in ["", " ", "\t\n  "] {
            let mut widget = widget_with_draft(draft);
            assert_eq!(widget.submit(), None);
            assert!(widget.messages().is_empty());
            assert_eq!(widget.draft(), draft);
            assert!(!widget.is_loading());
            assert_eq!(widget.state(), WidgetState::Idle);
        }
    }

    #[test]
    fn test_submit_while_awaiting_is_refused() {
        let mut widget = widget_with_draft("first");
        widget.submit();
        widget.set_draft("second");

        assert_eq!(widget.submit(), None);
        assert_eq!(widget.messages().len(), 1);
        assert_eq!(widget.draft(), "second");
        assert!(!widget.can_send());
    }

    #[test]
    fn test_successful_reply_scenario() {
        let mut widget = widget_with_draft("Hello");
        assert!(!widget.is_loading());

        widget.submit();
        assert!(widget.is_loading());

        assert!(widget.resolve(Ok("Hi there!".to_string())));
        assert!(!widget.is_loading());
        assert_eq!(
            widget.messages(),
            &[ChatMessage::user("Hello"), ChatMessage::bot("Hi there!")]
        );
        assert_eq!(widget.state(), WidgetState::Idle);
    }

    #[test]
    fn test_failure_appends_fallback() {
        let mut widget = widget_with_draft("Hello");
        widget.submit();

        widget.resolve(Err(ChatError::Status(503)));

        assert!(!widget.is_loading());
        assert_eq!(widget.messages().len(), 2);
        assert_eq!(widget.messages()[1], ChatMessage::bot(FALLBACK_REPLY));
        assert_eq!(widget.messages()[1].sender(), Sender::Bot);
    }

    #[test]
    fn test_resolve_without_pending_request_is_dropped() {
        let mut widget = ChatWidget::new();
        assert!(!widget.resolve(Ok("stray".to_string())));
        assert!(widget.messages().is_empty());
    }

    #[test]
    fn test_toggle_open_twice_restores_visibility() {
        let mut widget = ChatWidget::new();
        widget.toggle_open();
        assert_eq!(widget.state(), WidgetState::Idle);
        widget.toggle_open();
        assert_eq!(widget.state(), WidgetState::Closed);
    }

    #[test]
    fn test_reply_lands_after_widget_closed() {
        let mut widget = widget_with_draft("Hello");
        widget.submit();
        widget.toggle_open();
        assert_eq!(widget.state(), WidgetState::Closed);

        widget.resolve(Ok("Hi".to_string()));
        widget.toggle_open();

        assert_eq!(widget.state(), WidgetState::Idle);
        assert_eq!(widget.messages().last(), Some(&ChatMessage::bot("Hi")));
    }

    #[test]
    fn test_can_send() {
        let mut widget = ChatWidget::new();
        assert!(!widget.can_send());
        widget.set_draft("   ");
        assert!(!widget.can_send());
        widget.set_draft("recycled steel");
        assert!(widget.can_send());
    }

    #[test]
    fn test_message_serializes_with_lowercase_sender() {
        let json = serde_json::to_value(ChatMessage::bot("ok")).unwrap();
        assert_eq!(json, serde_json::json!({ "sender": "bot", "text": "ok" }));
    }
}
