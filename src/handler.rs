use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: usize = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // The next render re-wraps at the new size and clamps the scroll
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Exchange(outcome) => app.finish_exchange(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,

        // Submission is refused by the session while an exchange is pending
        KeyCode::Enter => {
            app.send_draft();
        }

        KeyCode::Char('u') if ctrl => app.clear_draft(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),

        KeyCode::PageUp => {
            let half = (app.chat_height as usize / 2).max(1);
            app.scroll_up(half);
        }
        KeyCode::PageDown => {
            let half = (app.chat_height as usize / 2).max(1);
            app.scroll_down(half);
        }

        KeyCode::Char(c) if !ctrl => app.insert_char(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let over_chat = app
        .chat_area
        .is_some_and(|area| point_in_rect(mouse.column, mouse.row, area));
    if !over_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollDown => app.scroll_down(MOUSE_SCROLL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ChatClient, ChatError};
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn type_keys(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn enter_submits_and_reply_event_resolves() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Your appointment is confirmed."
            })))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(ChatClient::new(&server.uri()), tx);

        type_keys(&mut app, "Tuesday please");
        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.session.is_pending());
        assert_eq!(app.session.transcript().messages().len(), 1);

        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event);

        let last = app.session.transcript().messages().last().unwrap();
        assert_eq!(last.text, "Your appointment is confirmed.");
        assert!(!app.session.is_pending());
    }

    #[tokio::test]
    async fn other_keys_do_not_submit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(ChatClient::new("http://127.0.0.1:1"), tx);

        type_keys(&mut app, "hello");
        handle_event(&mut app, key(KeyCode::Tab));
        handle_event(&mut app, key(KeyCode::Left));
        assert!(app.session.transcript().is_empty());
        assert_eq!(app.session.draft(), "hello");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn ctrl_keys_do_not_edit_draft() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(ChatClient::new("http://127.0.0.1:1"), tx);

        type_keys(&mut app, "abc");
        handle_event(&mut app, ctrl('u'));
        assert_eq!(app.session.draft(), "");

        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn draft_stays_editable_while_pending() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(ChatClient::new("http://127.0.0.1:1"), tx);

        type_keys(&mut app, "first");
        handle_event(&mut app, key(KeyCode::Enter));
        type_keys(&mut app, "next");
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.session.draft(), "next");
        assert_eq!(app.session.transcript().messages().len(), 1);

        handle_event(&mut app, AppEvent::Exchange(Err(ChatError::Interrupted)));
        assert!(!app.session.is_pending());
        assert_eq!(app.session.transcript().messages().len(), 2);
    }
}
