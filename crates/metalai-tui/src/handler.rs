use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use metalai_core::WidgetState;
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_reply().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit that works in any state
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.state() {
        WidgetState::Closed => handle_closed(app, key),
        WidgetState::Idle | WidgetState::Awaiting => handle_open(app, key),
    }
}

fn handle_closed(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('o') => app.toggle_open(),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_open(app: &mut App, key: KeyEvent) {
    let half_page = (app.chat_height / 2).max(1);

    match key.code {
        // Minimise back to the launcher
        KeyCode::Esc => app.toggle_open(),

        // Enter behaves exactly like the send button
        KeyCode::Enter => app.send_message(),

        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(half_page),
        KeyCode::PageDown => app.scroll_down(half_page),

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.insert_char(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;
    let hit = |area: Option<Rect>| area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let open = app.widget.is_open();
            if (!open && hit(app.launcher_area)) || (open && hit(app.close_area)) {
                app.toggle_open();
            }
        }
        MouseEventKind::ScrollDown if hit(app.chat_area) => app.scroll_down(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollUp if hit(app.chat_area) => app.scroll_up(MOUSE_SCROLL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_replying, wait_for_reply};
    use metalai_core::ChatMessage;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    async fn type_keys(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_submits_like_send_button() {
        let mut app = app_replying(Ok("Hi there!"));
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.state(), WidgetState::Idle);

        type_keys(&mut app, "Hello").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.widget.messages()[0], ChatMessage::user("Hello"));

        wait_for_reply(&mut app).await;
        assert_eq!(app.widget.messages()[1], ChatMessage::bot("Hi there!"));
    }

    #[tokio::test]
    async fn test_enter_while_awaiting_sends_nothing_more() {
        let mut app = app_replying(Ok("ok"));
        app.toggle_open();
        type_keys(&mut app, "first").await;
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert!(app.widget.is_loading());

        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        wait_for_reply(&mut app).await;
        assert_eq!(app.widget.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_escape_minimises_then_quits() {
        let mut app = app_replying(Ok("ok"));
        app.toggle_open();

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.state(), WidgetState::Closed);
        assert!(!app.should_quit);

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_q_is_typed_when_open() {
        let mut app = app_replying(Ok("ok"));
        app.toggle_open();
        type_keys(&mut app, "q").await;
        assert_eq!(app.widget.draft(), "q");
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_from_any_state() {
        let mut app = app_replying(Ok("ok"));
        app.toggle_open();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(ctrl_c)).await.unwrap();
        assert!(app.should_quit);
        assert_eq!(app.widget.draft(), "");
    }

    #[tokio::test]
    async fn test_clicks_toggle_via_launcher_and_close_button() {
        let mut app = app_replying(Ok("ok"));
        app.launcher_area = Some(Rect::new(50, 20, 10, 3));
        app.close_area = Some(Rect::new(70, 2, 3, 1));

        handle_event(&mut app, click(0, 0)).await.unwrap();
        assert_eq!(app.state(), WidgetState::Closed);

        handle_event(&mut app, click(55, 21)).await.unwrap();
        assert_eq!(app.state(), WidgetState::Idle);

        handle_event(&mut app, click(71, 2)).await.unwrap();
        assert_eq!(app.state(), WidgetState::Closed);
    }

    #[test]
    fn test_point_in_rect_edges() {
        let rect = Rect::new(2, 2, 3, 3);
        assert!(point_in_rect(2, 2, rect));
        assert!(point_in_rect(4, 4, rect));
        assert!(!point_in_rect(5, 4, rect));
        assert!(!point_in_rect(1, 2, rect));
    }
}
