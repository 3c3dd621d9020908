use crate::application::{App, AppMode};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Help => Self::handle_help_mode(app, key),
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('q') | KeyCode::Char('c') => app.should_quit = true,
                KeyCode::Char('r') => app.restart(),
                KeyCode::Char('e') => app.edit_shortcut(),
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::F(1) => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }
            KeyCode::Enter => app.confirm(),
            KeyCode::Esc => app.back(),
            KeyCode::Up | KeyCode::BackTab => app.focus_prev(),
            KeyCode::Down | KeyCode::Tab => app.focus_next(),
            KeyCode::Left => app.cycle_choice(false),
            KeyCode::Right => app.cycle_choice(true),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) if !app.wizard.is_finished() => app.type_char(c),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{FixedClock, NoticeLog, Wizard};
    use crate::domain::{PRE_APPROVAL, SELL_MY_CAR, WizardDefinition};
    use crate::infrastructure::{MemorySink, MemoryStore};
    use chrono::NaiveDate;

    fn app(definition: &'static WizardDefinition) -> App {
        let notices = NoticeLog::new();
        let wizard = Wizard::new(definition, Box::new(MemoryStore::new()))
            .with_notifier(notices.clone())
            .with_clock(FixedClock(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
        App::new(wizard, Box::new(MemorySink::new()), notices)
    }

    fn press(app: &mut App, key: KeyCode) {
        InputHandler::handle_key_event(app, key, KeyModifiers::NONE);
    }

    #[test]
    fn test_help_mode_toggle_and_scroll() {
        let mut app = app(&PRE_APPROVAL);

        press(&mut app, KeyCode::F(1));
        assert!(matches!(app.mode, AppMode::Help));

        press(&mut app, KeyCode::PageDown);
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.help_scroll, 6);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.help_scroll, 5);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.help_scroll, 0);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.help_scroll, 0);

        press(&mut app, KeyCode::Esc);
        assert!(matches!(app.mode, AppMode::Normal));
    }

    #[test]
    fn test_help_mode_swallows_typing() {
        let mut app = app(&SELL_MY_CAR);
        press(&mut app, KeyCode::F(1));
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.wizard.fields().text("vin"), "");
    }

    #[test]
    fn test_arrows_and_enter_walk_the_wizard() {
        let mut app = app(&PRE_APPROVAL);

        // Enter without a selection stays put
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.current_step(), 1);

        press(&mut app, KeyCode::Right);
        assert_eq!(app.wizard.fields().text("vehicleType"), "coupe");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.wizard.current_step(), 2);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.wizard.current_step(), 1);
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut app = app(&SELL_MY_CAR);
        press(&mut app, KeyCode::Down);
        for ch in "2019".chars() {
            press(&mut app, KeyCode::Char(ch));
        }
        assert_eq!(app.wizard.fields().text("year"), "2019");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.wizard.fields().text("year"), "201");
    }

    #[test]
    fn test_control_keys() {
        let mut app = app(&PRE_APPROVAL);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);

        InputHandler::handle_key_event(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(app.wizard.current_step(), 1);
        assert_eq!(app.wizard.fields().text("vehicleType"), "");

        // Ctrl+Q is not typed into the form
        InputHandler::handle_key_event(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
