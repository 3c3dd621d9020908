//! Collaborator interfaces the wizard talks to: notifications, telemetry and
//! the clock used for age derivation.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, NaiveDate};

use crate::domain::{MAX_AGE, MIN_AGE, Message, Reason, StepSpec, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, title: title.into(), detail: detail.into() }
    }

    pub fn from_message(kind: NoticeKind, message: Message) -> Self {
        Self { kind, title: message.title.to_string(), detail: message.detail.to_string() }
    }

    pub fn error(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, title: title.into(), detail: detail.into() }
    }

    /// The message shown for a failed step.
    pub fn for_validation(err: &ValidationError, step: Option<&StepSpec>) -> Self {
        let missing = step
            .map(|s| s.missing_for(&err.fields))
            .filter(|m| !m.is_empty())
            .unwrap_or("Please complete this step");
        let single_choice = step.is_some_and(|s| s.fields.len() == 1 && s.fields.first() == err.fields.first());
        match err.reason {
            Reason::Missing if single_choice => Self::error("Selection Required", missing),
            Reason::Missing => Self::error("Input Required", missing),
            Reason::NotAllowed => Self::error("Selection Required", missing),
            Reason::NotNumeric => Self::error("Invalid Input", "Please enter numbers only"),
            Reason::OutOfRange if err.names("age") => {
                Self::error("Invalid Age", format!("You must be between {MIN_AGE} and {MAX_AGE} years old"))
            }
            Reason::OutOfRange => Self::error("Invalid Input", "Months must be between 0 and 11"),
            Reason::InvalidEmail => Self::error("Invalid Email", "Please enter a valid email address"),
            Reason::TooShort => Self::error("Invalid Input", "A VIN is 17 characters long"),
        }
    }
}

/// Where notices go. Rendering them is the front-end's concern.
pub trait NotificationPort {
    fn notify(&mut self, notice: Notice);
}

/// Drops every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl NotificationPort for SilentNotifier {
    fn notify(&mut self, _notice: Notice) {}
}

/// Collects notices into a shared list the front-end (or a test) can read.
#[derive(Debug, Default, Clone)]
pub struct NoticeLog {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn all(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

impl NotificationPort for NoticeLog {
    fn notify(&mut self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// Analytics events emitted by the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    FormStart { form: &'static str },
    StepCompleted { form: &'static str, step: usize },
    FormSubmit { form: &'static str },
}

pub trait TelemetrySink {
    fn track(&mut self, event: TelemetryEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn track(&mut self, _event: TelemetryEvent) {}
}

/// Emits each event as a structured log record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn track(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::FormStart { form } => {
                tracing::info!(target: "telemetry", event = "form_start", form_type = form);
            }
            TelemetryEvent::StepCompleted { form, step } => {
                tracing::info!(target: "telemetry", event = "step_completed", form_type = form, step = step);
            }
            TelemetryEvent::FormSubmit { form } => {
                tracing::info!(target: "telemetry", event = "form_submit", form_type = form);
            }
        }
    }
}

/// Shared list of tracked events, for tests.
#[derive(Debug, Default, Clone)]
pub struct TelemetryLog {
    events: Rc<RefCell<Vec<TelemetryEvent>>>,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.borrow().clone()
    }
}

impl TelemetrySink for TelemetryLog {
    fn track(&mut self, event: TelemetryEvent) {
        self.events.borrow_mut().push(event);
    }
}

/// Source of "today" for age calculation.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PRE_APPROVAL;

    #[test]
    fn test_single_choice_step_asks_for_selection() {
        let err = ValidationError::new(1, Reason::Missing, vec!["vehicleType"]);
        let notice = Notice::for_validation(&err, PRE_APPROVAL.step(1));
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.title, "Selection Required");
        assert_eq!(notice.detail, "Please select a vehicle type");
    }

    #[test]
    fn test_input_step_asks_for_input() {
        let err = ValidationError::new(7, Reason::Missing, vec!["hoursPerWeek"]);
        let notice = Notice::for_validation(&err, PRE_APPROVAL.step(7));
        assert_eq!(notice.title, "Input Required");
    }

    #[test]
    fn test_income_notice_names_the_missing_figure() {
        let err = ValidationError::new(7, Reason::Missing, vec!["hoursPerWeek"]);
        let notice = Notice::for_validation(&err, PRE_APPROVAL.step(7));
        assert_eq!(notice.title, "Input Required");
        assert_eq!(notice.detail, "Please enter your hourly wage and hours per week");

        let err = ValidationError::new(7, Reason::Missing, vec!["annualIncome"]);
        let notice = Notice::for_validation(&err, PRE_APPROVAL.step(7));
        assert_eq!(notice.detail, "Please enter your annual income");
    }

    #[test]
    fn test_age_out_of_range_message() {
        let err = ValidationError::new(12, Reason::OutOfRange, vec!["age"]);
        let notice = Notice::for_validation(&err, PRE_APPROVAL.step(12));
        assert_eq!(notice.title, "Invalid Age");
    }

    #[test]
    fn test_notice_log_is_shared_between_clones() {
        let log = NoticeLog::new();
        let mut port = log.clone();
        port.notify(Notice::success("Saved", ""));
        assert_eq!(log.latest().map(|n| n.title), Some("Saved".to_string()));
        log.clear();
        assert!(log.all().is_empty());
    }

    #[test]
    fn test_fixed_clock() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(FixedClock(day).today(), day);
    }
}
