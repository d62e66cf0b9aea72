use std::sync::Arc;

use metalai_core::{ChatError, ChatService, ChatWidget, WidgetState};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::error;

use crate::ui;

pub struct App {
    pub should_quit: bool,
    pub widget: ChatWidget,

    // Input box
    pub draft_cursor: usize, // cursor position in chars

    // Chat area
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for typing indicator

    // Click targets (updated during render)
    pub launcher_area: Option<Rect>,
    pub close_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    pub reply_task: Option<JoinHandle<Result<String, ChatError>>>,
    service: Arc<dyn ChatService>,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl App {
    pub fn new(service: Arc<dyn ChatService>) -> Self {
        Self {
            should_quit: false,
            widget: ChatWidget::new(),
            draft_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            launcher_area: None,
            close_area: None,
            chat_area: None,
            reply_task: None,
            service,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.widget.state()
    }

    pub fn toggle_open(&mut self) {
        self.widget.toggle_open();
        if self.widget.is_open() {
            self.draft_cursor = self.widget.draft().chars().count();
            self.scroll_to_bottom();
        }
    }

    // Draft editing. Input is disabled while a reply is pending.
    pub fn insert_char(&mut self, c: char) {
        if self.widget.is_loading() {
            return;
        }
        let mut draft = self.widget.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.draft_cursor);
        draft.insert(byte_pos, c);
        self.widget.set_draft(draft);
        self.draft_cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.widget.is_loading() || self.draft_cursor == 0 {
            return;
        }
        self.draft_cursor -= 1;
        let mut draft = self.widget.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.draft_cursor);
        draft.remove(byte_pos);
        self.widget.set_draft(draft);
    }

    pub fn delete(&mut self) {
        if self.widget.is_loading() {
            return;
        }
        let mut draft = self.widget.draft().to_string();
        if self.draft_cursor < draft.chars().count() {
            let byte_pos = char_to_byte_index(&draft, self.draft_cursor);
            draft.remove(byte_pos);
            self.widget.set_draft(draft);
        }
    }

    pub fn cursor_left(&mut self) {
        self.draft_cursor = self.draft_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.widget.draft().chars().count();
        self.draft_cursor = (self.draft_cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.draft_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.draft_cursor = self.widget.draft().chars().count();
    }

    /// Submit the draft and spawn the request in the background
    pub fn send_message(&mut self) {
        let Some(message) = self.widget.submit() else {
            return;
        };
        self.draft_cursor = 0;
        self.animation_frame = 0;

        // Scroll to bottom so the typing indicator is visible
        self.scroll_to_bottom();

        let service = Arc::clone(&self.service);
        self.reply_task = Some(tokio::spawn(async move { service.send(&message).await }));
    }

    /// Fold a finished reply task into the conversation
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }

        if let Some(task) = self.reply_task.take() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "reply task failed");
                    Err(ChatError::Aborted(e.to_string()))
                }
            };
            self.widget.resolve(outcome);
            self.scroll_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.widget.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.total_chat_lines().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_to_bottom(&mut self) {
        let total_lines = self.total_chat_lines();
        let visible_height = self.visible_height();
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered height of the conversation, measured on the paragraph
    /// `ui::render` draws
    fn total_chat_lines(&self) -> u16 {
        let width = if self.chat_width > 0 {
            self.chat_width
        } else {
            40
        };
        let lines =
            ui::conversation_paragraph(&self.widget, self.animation_frame).line_count(width);
        // Paragraph scroll offsets are u16
        u16::try_from(lines).unwrap_or(u16::MAX)
    }
}
