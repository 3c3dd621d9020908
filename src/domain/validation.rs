//! Step validation: a pure function of `(step, fields)` per wizard instance.

use std::sync::LazyLock;

use regex::Regex;

use super::definition::{Rule, WizardDefinition};
use super::errors::{Reason, ValidationError};
use super::fields::{FieldKind, Fields};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

pub type Validation = Result<(), ValidationError>;

/// Checks the predicate registered for `step`. Steps without a predicate
/// (including the terminal pseudo-step) always pass. The first failing rule
/// is reported.
///
/// # Examples
///
/// ```
/// use dealer_wizard::domain::{validate, Fields, Reason, PRE_APPROVAL};
///
/// let fields = Fields::initial(&PRE_APPROVAL);
/// let err = validate(&PRE_APPROVAL, 1, &fields).unwrap_err();
/// assert_eq!(err.reason, Reason::Missing);
/// assert_eq!(err.fields, vec!["vehicleType"]);
/// ```
pub fn validate(definition: &WizardDefinition, step: usize, fields: &Fields) -> Validation {
    let Some(spec) = definition.step(step) else {
        return Ok(());
    };
    let checker = Checker { definition, fields, step };
    spec.rules.iter().try_for_each(|rule| checker.check(rule))
}

/// Validates steps `1..=last` in order, stopping at the first failure.
pub fn validate_through(definition: &WizardDefinition, last: usize, fields: &Fields) -> Validation {
    (1..=last.min(definition.total_steps())).try_for_each(|step| validate(definition, step, fields))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

struct Checker<'a> {
    definition: &'a WizardDefinition,
    fields: &'a Fields,
    step: usize,
}

impl Checker<'_> {
    fn fail(&self, reason: Reason, fields: Vec<&'static str>) -> Validation {
        Err(ValidationError::new(self.step, reason, fields))
    }

    fn kind(&self, field: &str) -> Option<FieldKind> {
        self.definition.field(field).map(|f| f.kind)
    }

    fn check(&self, rule: &Rule) -> Validation {
        match *rule {
            Rule::Choice(field) => self.check_choice(field),
            Rule::Required(names) => self.check_required(names),
            Rule::OptionalDigits(field) => {
                let value = self.fields.text(field).trim();
                if value.is_empty() || is_digits(value) {
                    Ok(())
                } else {
                    self.fail(Reason::NotNumeric, vec![field])
                }
            }
            Rule::Answered(flags) => {
                let unanswered: Vec<_> = flags.iter().copied().filter(|f| self.fields.flag(f).is_none()).collect();
                if unanswered.is_empty() {
                    Ok(())
                } else {
                    self.fail(Reason::Missing, unanswered)
                }
            }
            Rule::MinLength { field, min } => {
                let value = self.fields.text(field).trim();
                if value.is_empty() {
                    self.fail(Reason::Missing, vec![field])
                } else if value.chars().count() < min {
                    self.fail(Reason::TooShort, vec![field])
                } else {
                    Ok(())
                }
            }
            Rule::Email(field) => {
                let value = self.fields.text(field).trim();
                if value.is_empty() {
                    self.fail(Reason::Missing, vec![field])
                } else if !is_valid_email(value) {
                    self.fail(Reason::InvalidEmail, vec![field])
                } else {
                    Ok(())
                }
            }
            Rule::Branch { selector, branches } => {
                let token = self.fields.text(selector);
                if token.is_empty() {
                    return self.fail(Reason::Missing, vec![selector]);
                }
                match branches.iter().find(|(t, _)| *t == token) {
                    Some((_, rules)) => rules.iter().try_for_each(|r| self.check(r)),
                    None => self.fail(Reason::NotAllowed, vec![selector]),
                }
            }
            Rule::Tenure { years, months } => self.check_tenure(years, months),
            Rule::Age { date, age, min, max } => {
                let raw = self.fields.text(date);
                match self.fields.number(age) {
                    Some(_) if raw.len() != 8 => self.fail(Reason::Missing, vec![date]),
                    None => self.fail(Reason::Missing, vec![date]),
                    Some(years) if years < min || years > max => self.fail(Reason::OutOfRange, vec![age]),
                    Some(_) => Ok(()),
                }
            }
        }
    }

    fn check_choice(&self, field: &'static str) -> Validation {
        let value = self.fields.text(field);
        if value.is_empty() {
            return self.fail(Reason::Missing, vec![field]);
        }
        match self.kind(field) {
            Some(FieldKind::Choice(allowed)) if !allowed.contains(&value) => {
                self.fail(Reason::NotAllowed, vec![field])
            }
            _ => Ok(()),
        }
    }

    fn check_required(&self, names: &'static [&'static str]) -> Validation {
        let missing: Vec<_> = names
            .iter()
            .copied()
            .filter(|f| self.fields.text(f).trim().is_empty())
            .collect();
        if !missing.is_empty() {
            return self.fail(Reason::Missing, missing);
        }
        let malformed: Vec<_> = names
            .iter()
            .copied()
            .filter(|f| self.definition.field(f).is_some_and(|spec| spec.is_numeric()))
            .filter(|f| !is_digits(self.fields.text(f)))
            .collect();
        if malformed.is_empty() {
            Ok(())
        } else {
            self.fail(Reason::NotNumeric, malformed)
        }
    }

    fn check_tenure(&self, years: &'static str, months: &'static str) -> Validation {
        let parse = |field: &'static str| -> Result<u64, ValidationError> {
            let value = self.fields.text(field).trim();
            if value.is_empty() {
                return Ok(0);
            }
            value
                .parse::<u64>()
                .map_err(|_| ValidationError::new(self.step, Reason::NotNumeric, vec![field]))
        };
        let y = parse(years)?;
        let m = parse(months)?;
        if y == 0 && m == 0 {
            return self.fail(Reason::Missing, vec![years, months]);
        }
        if m > 11 {
            return self.fail(Reason::OutOfRange, vec![months]);
        }
        Ok(())
    }
}
