//! Derived-field calculators: currency display and age from a birth date.

use chrono::{Datelike, NaiveDate};

/// Strips every non-digit character. The result is the value of record for
/// numeric fields.
///
/// # Examples
///
/// ```
/// use dealer_wizard::domain::currency_digits;
///
/// assert_eq!(currency_digits("$65,000.00"), "6500000");
/// assert_eq!(currency_digits("n/a"), "");
/// ```
pub fn currency_digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Renders the digits of `raw` with comma thousands separators. Leading zeros
/// are dropped; an input without digits renders as the empty string.
///
/// # Examples
///
/// ```
/// use dealer_wizard::domain::format_currency;
///
/// assert_eq!(format_currency("65000"), "65,000");
/// assert_eq!(format_currency("1234567"), "1,234,567");
/// assert_eq!(format_currency(""), "");
/// ```
pub fn format_currency(raw: &str) -> String {
    let digits = currency_digits(raw);
    if digits.is_empty() {
        return String::new();
    }
    let significant = digits.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };

    let mut out = String::with_capacity(significant.len() + significant.len() / 3);
    for (i, ch) in significant.chars().enumerate() {
        if i > 0 && (significant.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parses an 8-digit `DDMMYYYY` string into a calendar date. Anything that is
/// not exactly eight digits, or names a day that does not exist, is `None`.
pub fn parse_birth_date(digits: &str) -> Option<NaiveDate> {
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day = digits[0..2].parse().ok()?;
    let month = digits[2..4].parse().ok()?;
    let year = digits[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whole years between `birth` and `today`, one less if the birthday has not
/// yet come round this year.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i64 {
    let mut age = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Age for a `DDMMYYYY` string as of `today`, `None` when the date is unknown.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use dealer_wizard::domain::age_from_digits;
///
/// let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// assert_eq!(age_from_digits("15031990", today), Some(35));
/// assert_eq!(age_from_digits("1503199", today), None);
/// ```
pub fn age_from_digits(digits: &str, today: NaiveDate) -> Option<i64> {
    parse_birth_date(digits).map(|birth| age_on(birth, today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency("1"), "1");
        assert_eq!(format_currency("999"), "999");
        assert_eq!(format_currency("1000"), "1,000");
        assert_eq!(format_currency("$ 12 345"), "12,345");
        assert_eq!(format_currency("007"), "7");
        assert_eq!(format_currency("000"), "0");
    }

    #[test]
    fn test_format_currency_is_stable_on_its_output() {
        let once = format_currency("abc1234567xyz");
        assert_eq!(format_currency(&once), once);
        assert_eq!(currency_digits(&once), "1234567");
    }

    #[test]
    fn test_age_reference_scenario() {
        assert_eq!(age_from_digits("15031990", date(2025, 6, 1)), Some(35));
    }

    #[test]
    fn test_age_birthday_not_yet_reached() {
        assert_eq!(age_on(date(1990, 6, 2), date(2025, 6, 1)), 34);
        assert_eq!(age_on(date(1990, 6, 1), date(2025, 6, 1)), 35);
        assert_eq!(age_on(date(1990, 12, 31), date(2025, 1, 1)), 34);
    }

    #[test]
    fn test_age_unknown_for_wrong_length_or_impossible_date() {
        let today = date(2025, 6, 1);
        assert_eq!(age_from_digits("", today), None);
        assert_eq!(age_from_digits("150319900", today), None);
        assert_eq!(age_from_digits("31022000", today), None);
        assert_eq!(age_from_digits("15a31990", today), None);
    }

    #[test]
    fn test_future_birth_date_is_negative() {
        assert_eq!(age_from_digits("01012030", date(2025, 6, 1)), Some(-5));
    }
}
