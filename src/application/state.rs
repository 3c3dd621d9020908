//! Wizard state and the step sequencer.
//!
//! A [`Wizard`] owns the state of one application in progress: which step is
//! showing and every field entered so far. It validates before advancing,
//! writes every change to its persistence store, and guards the final
//! submission against re-entry.

use std::fmt;

use crate::domain::{
    FieldKind, FieldValue, Fields, SubmissionError, SubmissionPayload, Validation, WizardDefinition, WizardError,
    WizardResult, age_from_digits, assemble, currency_digits, validate, validate_through,
};
use crate::infrastructure::{PersistenceStore, SavedProgress, SubmissionSink, load_progress, save_progress};

use super::ports::{
    Clock, NoopTelemetry, Notice, NoticeKind, NotificationPort, SilentNotifier, SystemClock, TelemetryEvent, TelemetrySink,
};

/// Direction of the last transition, for slide animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// The single mutable entity of a wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardState {
    /// 1-based; `total_steps + 1` is the terminal pseudo-step.
    pub current_step_index: usize,
    pub fields: Fields,
}

impl WizardState {
    pub fn initial(definition: &WizardDefinition) -> Self {
        Self { current_step_index: 1, fields: Fields::initial(definition) }
    }
}

/// A running wizard bound to its collaborators.
///
/// # Examples
///
/// ```
/// use dealer_wizard::application::Wizard;
/// use dealer_wizard::domain::PRE_APPROVAL;
/// use dealer_wizard::infrastructure::MemoryStore;
///
/// let mut wizard = Wizard::new(&PRE_APPROVAL, Box::new(MemoryStore::new()));
/// assert_eq!(wizard.current_step(), 1);
///
/// assert!(wizard.go_next().is_err());
/// wizard.set_field("vehicleType", "sedan").unwrap();
/// wizard.go_next().unwrap();
/// assert_eq!(wizard.current_step(), 2);
/// ```
pub struct Wizard {
    definition: &'static WizardDefinition,
    state: WizardState,
    direction: Direction,
    submitting: bool,
    store: Box<dyn PersistenceStore>,
    notifier: Box<dyn NotificationPort>,
    telemetry: Box<dyn TelemetrySink>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("definition", &self.definition.id)
            .field("state", &self.state)
            .field("direction", &self.direction)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    /// Opens `definition`, resuming from `store` when it holds usable saved
    /// progress. Unusable progress is logged and ignored.
    pub fn new(definition: &'static WizardDefinition, store: Box<dyn PersistenceStore>) -> Self {
        let state = match load_progress(store.as_ref(), definition) {
            Ok(Some(saved)) => {
                tracing::info!(form = definition.id, step = saved.current_step_index, "resuming saved progress");
                WizardState { current_step_index: saved.current_step_index, fields: saved.fields }
            }
            Ok(None) => WizardState::initial(definition),
            Err(err) => {
                tracing::warn!(form = definition.id, error = %err, "discarding saved progress");
                WizardState::initial(definition)
            }
        };

        Self {
            definition,
            state,
            direction: Direction::Forward,
            submitting: false,
            store,
            notifier: Box::new(SilentNotifier),
            telemetry: Box::new(NoopTelemetry),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_notifier(mut self, notifier: impl NotificationPort + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_telemetry(mut self, telemetry: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Box::new(telemetry);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn definition(&self) -> &'static WizardDefinition {
        self.definition
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn fields(&self) -> &Fields {
        &self.state.fields
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step_index
    }

    pub fn total_steps(&self) -> usize {
        self.definition.total_steps()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the application has been submitted.
    pub fn is_finished(&self) -> bool {
        self.state.current_step_index == self.definition.terminal_step()
    }

    pub fn is_final_step(&self) -> bool {
        self.state.current_step_index == self.definition.total_steps()
    }

    /// Fraction of the steps reached, `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let total = self.total_steps().max(1);
        self.current_step().min(total) as f64 / total as f64
    }

    /// Rough minutes left, one per remaining step.
    pub fn minutes_remaining(&self) -> usize {
        (self.total_steps() + 1).saturating_sub(self.current_step()).max(1)
    }

    /// Checks the current step without moving.
    pub fn validate_current(&self) -> Validation {
        validate(self.definition, self.current_step(), &self.state.fields)
    }

    /// Sets a field from raw input, normalizing by kind: numeric kinds keep
    /// only digits, dates keep at most eight, and derived fields are
    /// recomputed.
    pub fn set_field(&mut self, name: &str, raw: &str) -> WizardResult<()> {
        self.ensure_editable()?;
        let spec = self
            .definition
            .field(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;

        let value = match spec.kind {
            FieldKind::Choice(_) | FieldKind::Text => raw.to_string(),
            FieldKind::Digits | FieldKind::Currency => currency_digits(raw),
            FieldKind::DigitsUpTo(max) => currency_digits(raw).chars().take(max).collect(),
            FieldKind::Date => currency_digits(raw).chars().take(8).collect(),
            FieldKind::Derived { .. } | FieldKind::Flag => {
                return Err(WizardError::NotEditable(name.to_string()));
            }
        };
        self.state.fields.set(spec.name, FieldValue::Text(value));
        self.refresh_derived(spec.name);
        self.persist();
        Ok(())
    }

    /// Answers a yes/no field.
    pub fn set_flag(&mut self, name: &str, answer: bool) -> WizardResult<()> {
        self.ensure_editable()?;
        let spec = self
            .definition
            .field(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
        if spec.kind != FieldKind::Flag {
            return Err(WizardError::NotEditable(name.to_string()));
        }
        self.state.fields.set(spec.name, FieldValue::Flag(Some(answer)));
        self.persist();
        Ok(())
    }

    fn refresh_derived(&mut self, source: &str) {
        let today = self.clock.today();
        let digits = self.state.fields.text(source).to_string();
        for dependent in self.definition.dependents_of(source) {
            let age = age_from_digits(&digits, today);
            self.state.fields.set(dependent.name, FieldValue::Number(age));
        }
    }

    /// Advances one step if the current step validates. On failure a notice
    /// names the first failing requirement and the step does not change.
    pub fn go_next(&mut self) -> WizardResult<()> {
        self.ensure_editable()?;
        let step = self.current_step();
        if let Err(err) = self.validate_current() {
            tracing::debug!(form = self.definition.id, step, reason = err.reason.code(), "step rejected");
            self.notifier.notify(Notice::for_validation(&err, self.definition.step(step)));
            return Err(err.into());
        }
        if self.is_final_step() {
            return Err(WizardError::AtFinalStep);
        }

        if step == 1 {
            self.telemetry.track(TelemetryEvent::FormStart { form: self.definition.id });
        }
        self.telemetry.track(TelemetryEvent::StepCompleted { form: self.definition.id, step });
        self.move_to(step + 1, Direction::Forward);
        Ok(())
    }

    /// Steps back one, never below step 1. Never validates. A no-op once
    /// submitted.
    pub fn go_back(&mut self) -> WizardResult<()> {
        if self.submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        let step = self.current_step();
        if self.is_finished() || step <= 1 {
            return Ok(());
        }
        self.move_to(step - 1, Direction::Backward);
        Ok(())
    }

    /// Jumps straight to step `n` for edit shortcuts. Earlier steps are
    /// always reachable; a later step only when every step before it
    /// validates.
    pub fn go_to_step(&mut self, n: usize) -> WizardResult<()> {
        self.ensure_editable()?;
        let current = self.current_step();
        let unreachable = WizardError::StepUnreachable { step: n, current };
        if n < 1 || n > self.total_steps() {
            return Err(unreachable);
        }
        if n > current && validate_through(self.definition, n - 1, &self.state.fields).is_err() {
            return Err(unreachable);
        }
        if n != current {
            let direction = if n > current { Direction::Forward } else { Direction::Backward };
            self.move_to(n, direction);
        }
        Ok(())
    }

    /// Edits and moves are refused once submitted and while a submission is
    /// outstanding.
    fn ensure_editable(&self) -> WizardResult<()> {
        if self.submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        if self.is_finished() {
            return Err(WizardError::Finished);
        }
        Ok(())
    }

    fn move_to(&mut self, step: usize, direction: Direction) {
        tracing::debug!(form = self.definition.id, from = self.current_step(), to = step, "step change");
        self.direction = direction;
        self.state.current_step_index = step;
        self.persist();
    }

    /// Validates the whole application and returns the payload to send,
    /// marking a submission as outstanding. Pair with
    /// [`finish_submission`](Self::finish_submission).
    pub fn begin_submission(&mut self) -> WizardResult<SubmissionPayload> {
        if self.submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        if self.is_finished() {
            return Err(WizardError::Finished);
        }
        if !self.is_final_step() {
            return Err(WizardError::NotOnFinalStep { current: self.current_step(), total: self.total_steps() });
        }

        let checked = self
            .validate_current()
            .and_then(|()| validate_through(self.definition, self.total_steps(), &self.state.fields));
        if let Err(err) = checked {
            self.notifier.notify(Notice::for_validation(&err, self.definition.step(err.step)));
            return Err(err.into());
        }

        self.submitting = true;
        Ok(assemble(self.definition, &self.state.fields))
    }

    /// Records the sink's answer for the outstanding submission. Success
    /// moves to the terminal pseudo-step and clears saved progress; failure
    /// leaves the step, fields and saved progress as they were.
    pub fn finish_submission(&mut self, outcome: Result<(), SubmissionError>) -> WizardResult<()> {
        if !self.submitting {
            return Err(WizardError::NoSubmission);
        }
        self.submitting = false;

        match outcome {
            Ok(()) => {
                tracing::info!(form = self.definition.id, "application submitted");
                self.direction = Direction::Forward;
                self.state.current_step_index = self.definition.terminal_step();
                self.clear_saved();
                self.telemetry.track(TelemetryEvent::FormSubmit { form: self.definition.id });
                self.notifier.notify(Notice::from_message(NoticeKind::Success, self.definition.submitted));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(form = self.definition.id, error = %err, "submission failed");
                self.notifier.notify(Notice::from_message(NoticeKind::Error, self.definition.submit_failed));
                Err(err.into())
            }
        }
    }

    /// Validates, hands the row to `sink` and records the outcome.
    pub fn submit(&mut self, sink: &mut dyn SubmissionSink) -> WizardResult<()> {
        let payload = self.begin_submission()?;
        let outcome = payload
            .to_row()
            .map_err(|e| SubmissionError::Storage(e.to_string()))
            .and_then(|row| sink.insert(&row));
        self.finish_submission(outcome)
    }

    /// Discards everything entered and starts over at step 1.
    pub fn restart(&mut self) {
        self.state = WizardState::initial(self.definition);
        self.direction = Direction::Forward;
        self.submitting = false;
        self.clear_saved();
    }

    /// Dismisses the success screen. Returns `false` when not finished.
    pub fn acknowledge(&mut self) -> bool {
        if !self.is_finished() {
            return false;
        }
        self.restart();
        true
    }

    fn persist(&mut self) {
        let progress = SavedProgress::new(self.state.fields.clone(), self.state.current_step_index);
        if let Err(err) = save_progress(self.store.as_mut(), self.definition, &progress) {
            tracing::warn!(form = self.definition.id, error = %err, "could not save progress");
        }
    }

    fn clear_saved(&mut self) {
        if let Err(err) = self.store.remove(self.definition.storage_key) {
            tracing::warn!(form = self.definition.id, error = %err, "could not clear saved progress");
        }
    }
}
