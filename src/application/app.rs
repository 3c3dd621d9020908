//! Terminal session state around a [`Wizard`].

use crate::domain::{FieldKind, FieldSpec, FieldValue, format_currency};
use crate::infrastructure::SubmissionSink;

use super::ports::{Notice, NoticeLog};
use super::state::Wizard;

/// Represents the current mode of the terminal front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Filling in the current step.
    Normal,
    /// Help screen is displayed.
    Help,
}

/// Everything the terminal UI needs to render and drive one wizard.
pub struct App {
    pub wizard: Wizard,
    pub sink: Box<dyn SubmissionSink>,
    pub notices: NoticeLog,
    pub mode: AppMode,
    /// Index of the focused field within the current step.
    pub focus: usize,
    pub help_scroll: usize,
    pub should_quit: bool,
}

impl App {
    /// `notices` should be the same log the wizard notifies into.
    pub fn new(wizard: Wizard, sink: Box<dyn SubmissionSink>, notices: NoticeLog) -> Self {
        Self { wizard, sink, notices, mode: AppMode::Normal, focus: 0, help_scroll: 0, should_quit: false }
    }

    /// Fields shown on the current step, in display order.
    pub fn step_fields(&self) -> Vec<&'static FieldSpec> {
        let definition = self.wizard.definition();
        definition
            .step(self.wizard.current_step())
            .map(|step| step.fields.iter().filter_map(|name| definition.field(name)).collect())
            .unwrap_or_default()
    }

    pub fn focused_field(&self) -> Option<&'static FieldSpec> {
        self.step_fields().get(self.focus).copied()
    }

    pub fn latest_notice(&self) -> Option<Notice> {
        self.notices.latest()
    }

    /// Display form of a field's value.
    pub fn display_value(&self, spec: &FieldSpec) -> String {
        match (spec.kind, self.wizard.fields().get(spec.name)) {
            (FieldKind::Currency, Some(FieldValue::Text(digits))) => format_currency(digits),
            (_, Some(FieldValue::Text(text))) => text.clone(),
            (_, Some(FieldValue::Number(Some(n)))) => n.to_string(),
            (_, Some(FieldValue::Flag(Some(true)))) => "Yes".to_string(),
            (_, Some(FieldValue::Flag(Some(false)))) => "No".to_string(),
            _ => String::new(),
        }
    }

    pub fn focus_next(&mut self) {
        let count = self.step_fields().len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_prev(&mut self) {
        let count = self.step_fields().len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    fn reset_focus(&mut self) {
        self.focus = 0;
        self.notices.clear();
    }

    pub fn type_char(&mut self, ch: char) {
        let Some(spec) = self.focused_field() else { return };
        match spec.kind {
            FieldKind::Flag => match ch.to_ascii_lowercase() {
                'y' => self.answer_flag(true),
                'n' => self.answer_flag(false),
                _ => {}
            },
            FieldKind::Choice(_) | FieldKind::Derived { .. } => {}
            _ => {
                let mut value = self.wizard.fields().text(spec.name).to_string();
                value.push(ch);
                self.edit(spec.name, &value);
            }
        }
    }

    pub fn backspace(&mut self) {
        let Some(spec) = self.focused_field() else { return };
        if matches!(spec.kind, FieldKind::Choice(_) | FieldKind::Flag | FieldKind::Derived { .. }) {
            return;
        }
        let mut value = self.wizard.fields().text(spec.name).to_string();
        value.pop();
        self.edit(spec.name, &value);
    }

    /// Moves a choice field to the previous or next allowed token.
    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(spec) = self.focused_field() else { return };
        let FieldKind::Choice(options) = spec.kind else { return };
        if options.is_empty() {
            return;
        }
        let current = options.iter().position(|o| *o == self.wizard.fields().text(spec.name));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => options.len() - 1,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        self.edit(spec.name, options[next]);
    }

    pub fn answer_flag(&mut self, answer: bool) {
        let Some(spec) = self.focused_field() else { return };
        if let Err(err) = self.wizard.set_flag(spec.name, answer) {
            tracing::debug!(error = %err, "flag not set");
        }
    }

    fn edit(&mut self, name: &str, value: &str) {
        if let Err(err) = self.wizard.set_field(name, value) {
            tracing::debug!(field = name, error = %err, "edit rejected");
        }
    }

    /// Enter: advance, or submit from the final step, or dismiss the success
    /// screen.
    pub fn confirm(&mut self) {
        if self.wizard.is_finished() {
            self.wizard.acknowledge();
            self.reset_focus();
            return;
        }
        if self.wizard.is_final_step() {
            self.submit();
            return;
        }
        let before = self.wizard.current_step();
        if self.wizard.go_next().is_ok() && self.wizard.current_step() != before {
            self.reset_focus();
        }
    }

    pub fn back(&mut self) {
        let before = self.wizard.current_step();
        if let Err(err) = self.wizard.go_back() {
            tracing::debug!(error = %err, "back ignored");
        }
        if self.wizard.current_step() != before {
            self.reset_focus();
        }
    }

    /// Jumps to the wizard's first edit shortcut, if it has one.
    pub fn edit_shortcut(&mut self) {
        let Some(&target) = self.wizard.definition().edit_shortcuts.first() else { return };
        if target < self.wizard.current_step() && self.wizard.go_to_step(target).is_ok() {
            self.reset_focus();
        }
    }

    pub fn submit(&mut self) {
        if let Err(err) = self.wizard.submit(self.sink.as_mut()) {
            tracing::debug!(error = %err, "submission did not complete");
        }
    }

    pub fn restart(&mut self) {
        self.wizard.restart();
        self.reset_focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::FixedClock;
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

    #[test]
    fn test_app_default_state() {
        let app = app(&PRE_APPROVAL);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.focus, 0);
        assert_eq!(app.focused_field().map(|f| f.name), Some("vehicleType"));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_cycle_choice_wraps() {
        let mut app = app(&PRE_APPROVAL);
        app.cycle_choice(false);
        assert_eq!(app.wizard.fields().text("vehicleType"), "truck");
        app.cycle_choice(true);
        assert_eq!(app.wizard.fields().text("vehicleType"), "coupe");
    }

    #[test]
    fn test_confirm_advances_and_resets_focus() {
        let mut app = app(&PRE_APPROVAL);
        app.confirm();
        assert_eq!(app.wizard.current_step(), 1);
        assert_eq!(app.latest_notice().unwrap().title, "Selection Required");

        app.cycle_choice(true);
        app.confirm();
        assert_eq!(app.wizard.current_step(), 2);
        assert!(app.latest_notice().is_none());
    }

    #[test]
    fn test_currency_display_is_grouped() {
        let mut app = app(&PRE_APPROVAL);
        app.wizard.set_field("annualIncome", "65a000").unwrap();
        let spec = PRE_APPROVAL.field("annualIncome").unwrap();
        assert_eq!(app.wizard.fields().text("annualIncome"), "65000");
        assert_eq!(app.display_value(spec), "65,000");
    }

    #[test]
    fn test_type_and_backspace_on_focused_text() {
        let mut app = app(&SELL_MY_CAR);
        app.focus_next();
        assert_eq!(app.focused_field().map(|f| f.name), Some("year"));
        for ch in "20x19".chars() {
            app.type_char(ch);
        }
        assert_eq!(app.wizard.fields().text("year"), "2019");
        app.backspace();
        assert_eq!(app.wizard.fields().text("year"), "201");
    }

    #[test]
    fn test_focus_wraps_both_ways() {
        let mut app = app(&SELL_MY_CAR);
        app.focus_prev();
        assert_eq!(app.focused_field().map(|f| f.name), Some("vin"));
        app.focus_next();
        assert_eq!(app.focus, 0);
    }

    #[test]
    fn test_flag_answers_by_key() {
        let mut app = app(&SELL_MY_CAR);
        app.wizard.set_field("year", "2019").unwrap();
        app.wizard.set_field("make", "Honda").unwrap();
        app.wizard.set_field("model", "Civic").unwrap();
        app.wizard.set_field("odometer", "84000").unwrap();
        app.wizard.set_field("transmission", "manual").unwrap();
        app.confirm();
        app.confirm();
        assert_eq!(app.wizard.current_step(), 3);

        app.type_char('Y');
        assert_eq!(app.display_value(SELL_MY_CAR.field("hasExteriorDamage").unwrap()), "Yes");
        app.focus_next();
        app.type_char('n');
        assert_eq!(app.wizard.fields().flag("hasInteriorDamage"), Some(false));
    }

    #[test]
    fn test_edit_shortcut_returns_to_vehicle_step() {
        let mut sell = app(&SELL_MY_CAR);
        sell.wizard.set_field("year", "2019").unwrap();
        sell.wizard.set_field("make", "Honda").unwrap();
        sell.wizard.set_field("model", "Civic").unwrap();
        sell.confirm();
        assert_eq!(sell.wizard.current_step(), 2);
        sell.edit_shortcut();
        assert_eq!(sell.wizard.current_step(), 1);

        let mut pre = app(&PRE_APPROVAL);
        pre.cycle_choice(true);
        pre.confirm();
        pre.edit_shortcut();
        assert_eq!(pre.wizard.current_step(), 2);
    }

    #[test]
    fn test_back_and_restart() {
        let mut app = app(&PRE_APPROVAL);
        app.cycle_choice(true);
        app.confirm();
        app.focus = 0;
        app.back();
        assert_eq!(app.wizard.current_step(), 1);
        app.restart();
        assert_eq!(app.wizard.fields().text("vehicleType"), "");
    }
}
