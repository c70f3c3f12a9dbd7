//! Format checks shared by the entity validators.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use matricula_core::FieldError;
use regex::Regex;
use serde_json::Value;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub const REQUIRED_FIELD_MESSAGE: &str = "Campo obrigatório";

/// `None` and the empty string both count as missing.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(str::is_empty)
}

/// The value when it is present and non-empty.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// A field is required on create, and on update once the key is sent.
pub(crate) fn is_missing(value: Option<&str>, is_update: bool) -> bool {
    (!is_update || value.is_some()) && is_blank(value)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Strips everything but ASCII digits.
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(char::is_ascii_digit).collect()
}

/// Eleven digits, not all the same. Check digits are not verified.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits = normalize_cpf(cpf);
    if digits.len() != 11 {
        return false;
    }

    let first = digits.as_bytes()[0];
    !digits.bytes().all(|b| b == first)
}

pub fn char_len_between(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

/// Parses an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (taken as UTC) or a plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Some(date_time.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A whole, non-negative number (or numeric string) that fits in an `i32`.
pub fn parse_non_negative_int(value: &Value) -> Option<i32> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if number.is_finite() && number >= 0.0 && number.fract() == 0.0 && number <= f64::from(i32::MAX) {
        Some(number as i32)
    } else {
        None
    }
}

/// Password policy: every failed rule is reported on the `password` field.
pub fn validate_password(password: &str) -> Vec<FieldError> {
    let field = "password";
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push(FieldError::new(field, "Senha deve ter no mínimo 8 caracteres"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(field, "Senha deve conter pelo menos um número"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(
            field,
            "Senha deve conter pelo menos uma letra maiúscula",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(
            field,
            "Senha deve conter pelo menos uma letra minúscula",
        ));
    }

    errors
}
