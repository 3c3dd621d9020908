use thiserror::Error;

/// Why a step failed its validation predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// A required field is empty.
    Missing,
    /// A choice field holds a token outside its allowed set.
    NotAllowed,
    /// A numeric field does not parse as a non-negative integer.
    NotNumeric,
    /// A bounded value (months at address, age) is outside its range.
    OutOfRange,
    /// The email does not look like `local@domain.tld`.
    InvalidEmail,
    /// A value is shorter than the minimum length (VIN).
    TooShort,
}

impl Reason {
    pub fn code(self) -> &'static str {
        match self {
            Reason::Missing => "missing",
            Reason::NotAllowed => "not_allowed",
            Reason::NotNumeric => "not_numeric",
            Reason::OutOfRange => "out_of_range",
            Reason::InvalidEmail => "invalid_email",
            Reason::TooShort => "too_short",
        }
    }
}

/// A step predicate failed. `fields` names the offending field(s) of the
/// first failing requirement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("step {step} is invalid ({}): {}", .reason.code(), .fields.join(", "))]
pub struct ValidationError {
    pub step: usize,
    pub reason: Reason,
    pub fields: Vec<&'static str>,
}

impl ValidationError {
    pub fn new(step: usize, reason: Reason, fields: Vec<&'static str>) -> Self {
        Self { step, reason, fields }
    }

    pub fn names(&self, field: &str) -> bool {
        self.fields.iter().any(|f| *f == field)
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("saved progress is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("saved progress has unsupported version {0}")]
    UnsupportedVersion(u32),

    #[error("saved step {step} is outside 1..={total}")]
    StepOutOfRange { step: usize, total: usize },

    #[error("saved field `{0}` does not match its declared kind")]
    FieldKind(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("could not reach submission endpoint: {0}")]
    Transport(String),

    #[error("submission rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("could not record submission: {0}")]
    Storage(String),
}

/// Errors returned by the [`Wizard`](crate::application::Wizard) API.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("a submission is already in progress")]
    SubmissionInProgress,

    #[error("submission is only possible from step {total}, currently on step {current}")]
    NotOnFinalStep { current: usize, total: usize },

    #[error("step {step} cannot be reached from step {current}")]
    StepUnreachable { step: usize, current: usize },

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("field `{0}` cannot be edited this way")]
    NotEditable(String),

    #[error("the final step is completed by submitting")]
    AtFinalStep,

    #[error("no submission is in progress")]
    NoSubmission,

    #[error("the application has already been submitted")]
    Finished,
}

pub type WizardResult<T> = Result<T, WizardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_names_fields() {
        let err = ValidationError::new(7, Reason::Missing, vec!["hourlyWage", "hoursPerWeek"]);
        assert_eq!(err.to_string(), "step 7 is invalid (missing): hourlyWage, hoursPerWeek");
        assert!(err.names("hoursPerWeek"));
        assert!(!err.names("annualIncome"));
    }

    #[test]
    fn test_wizard_error_wraps_validation() {
        let err: WizardError = ValidationError::new(1, Reason::NotAllowed, vec!["vehicleType"]).into();
        assert!(matches!(err, WizardError::Validation(ref v) if v.step == 1));
        assert!(err.to_string().contains("not_allowed"));
    }
}
