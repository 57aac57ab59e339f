//! Terminal frontend: owns the draw/poll loop and maps keys onto `CallApp` actions.

mod meter;
mod render;

pub use render::draw;

use crate::app::{CallApp, Phase};
use crate::log_debug;
use crate::terminal_restore::TerminalRestoreGuard;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

const BUSY_POLL: Duration = Duration::from_millis(50);
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Configure the terminal, run the call screen until the user quits, and restore it.
///
/// # Errors
///
/// Returns an error if terminal setup, drawing, or event polling fails.
pub fn run_ui(app: &mut CallApp<'_>) -> Result<()> {
    let terminal_guard = TerminalRestoreGuard::new();
    terminal_guard.enable_raw_mode()?;
    let mut stdout = io::stdout();
    terminal_guard.enter_alt_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app_loop(&mut terminal, app);

    drop(terminal);
    terminal_guard.restore();

    result
}

fn app_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut CallApp<'_>,
) -> Result<()> {
    terminal.draw(|frame| draw(frame, app))?;

    loop {
        app.poll();

        // Spinners animate while waiting on the service.
        let busy = matches!(app.phase(), Phase::Starting | Phase::Ending);
        let poll_duration = if busy || app.has_pending_work() {
            BUSY_POLL
        } else {
            IDLE_POLL
        };

        let mut should_draw = app.take_redraw_request() || busy;
        let mut should_quit = false;

        if event::poll(poll_duration)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    should_quit = handle_key_event(app, key);
                    should_draw = true;
                }
                Event::Resize(_, _) => should_draw = true,
                _ => {}
            }
        }

        if should_draw {
            terminal.draw(|frame| draw(frame, app))?;
        }

        if should_quit {
            break;
        }
    }
    Ok(())
}

/// Apply one key press. Returns true when the user asked to quit.
fn handle_key_event(app: &mut CallApp<'_>, key: KeyEvent) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
        log_debug("quit requested");
        return true;
    }

    match app.phase() {
        Phase::Idle => handle_form_key(app, key, ctrl),
        Phase::Active => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('e')) {
                app.stop();
            }
        }
        Phase::Resulted => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char('n')) {
                app.new_call();
            }
        }
        Phase::Starting | Phase::Ending => {}
    }
    false
}

fn handle_form_key(app: &mut CallApp<'_>, key: KeyEvent, ctrl: bool) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.form_mut().focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.form_mut().focus_prev(),
        KeyCode::Backspace => app.form_mut().backspace(),
        KeyCode::Char('u') if ctrl => app.form_mut().clear_focused(),
        KeyCode::Enter => {
            if !app.start() {
                // Jump to the first blank field, or just advance while a start is settling.
                let form = app.form_mut();
                match form.first_missing() {
                    Some(field) => form.set_focus(field),
                    None => form.focus_next(),
                }
            }
        }
        KeyCode::Char(c) if !ctrl => {
            app.form_mut().push_char(c);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{fill_form, FakeBackend};
    use crate::contact::ContactField;
    use crate::session::CallEvent;

    fn press(app: &mut CallApp<'_>, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn type_text(app: &mut CallApp<'_>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_fills_the_focused_field_and_tab_advances() {
        let backend = FakeBackend::default();
        let mut app = CallApp::mount(&backend);
        type_text(&mut app, "Ada");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Lovelace");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.form().value(ContactField::FirstName), "Ada");
        assert_eq!(app.form().value(ContactField::LastName), "Lovelac");
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.form().focused(), ContactField::FirstName);
    }

    #[test]
    fn ctrl_u_clears_only_the_focused_field() {
        let backend = FakeBackend::default();
        let mut app = CallApp::mount(&backend);
        fill_form(&mut app);
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
        );
        assert_eq!(app.form().value(ContactField::FirstName), "");
        assert_eq!(app.form().value(ContactField::LastName), "Lovelace");
    }

    #[test]
    fn enter_on_incomplete_form_moves_focus_instead_of_starting() {
        let backend = FakeBackend::default();
        let mut app = CallApp::mount(&backend);
        type_text(&mut app, "Ada");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.form().focused(), ContactField::LastName);
        assert!(backend.started.borrow().is_empty());
    }

    #[test]
    fn enter_jumps_to_the_first_blank_field() {
        let backend = FakeBackend::default();
        let mut app = CallApp::mount(&backend);
        fill_form(&mut app);
        app.form_mut().set_value(ContactField::Email, "  ");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.form().focused(), ContactField::Email);
        assert!(backend.started.borrow().is_empty());
    }

    #[test]
    fn enter_drives_start_stop_and_new_call() {
        let backend = FakeBackend::default();
        let mut app = CallApp::mount(&backend);
        fill_form(&mut app);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.phase(), Phase::Starting);

        // Keys other than quit are ignored while waiting.
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.form().value(ContactField::FirstName), "Ada");

        backend.resolve_start("call-1");
        backend.events.publish(CallEvent::CallStart);
        app.poll();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.phase(), Phase::Ending);
        assert_eq!(*backend.fetched.borrow(), vec!["call-1".to_string()]);

        backend.resolve_fetch(Default::default());
        app.poll();
        assert_eq!(app.phase(), Phase::Resulted);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.phase(), Phase::Idle);
    }

    #[test]
    fn esc_and_ctrl_c_quit_from_any_phase() {
        let backend = FakeBackend::default();
        let mut app = CallApp::mount(&backend);
        assert!(press(&mut app, KeyCode::Esc));
        backend.events.publish(CallEvent::CallStart);
        app.poll();
        assert!(handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
        ));
        assert_eq!(app.phase(), Phase::Active);
    }
}
