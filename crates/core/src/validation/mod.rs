//! Declarative form validation for trade and strategy submissions.
//!
//! Every schema turns raw form values into a typed payload or a list of
//! field-scoped messages. Nothing here touches the network.

pub mod strategy;
pub mod trade;

use chrono::{DateTime, NaiveDate};
use std::fmt;

pub use strategy::StrategySchema;
pub use trade::{ImageRequirement, TradeSchema};

/// Largest accepted image upload, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5_000_000;

/// MIME types accepted for the setup image.
pub const ACCEPTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A single failed rule on a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire/form name of the field (e.g. `entryPrice`).
    pub field: String,
    pub message: String,
}

/// All rule failures of one validation pass, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// True if at least one rule failed on `field`.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The first message for `field`, which is what a form shows inline.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Every message for `field`, in rule order.
    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A schema validates one kind of raw input into a typed payload.
pub trait Schema {
    type Input;
    type Output;

    fn validate(&self, input: &Self::Input) -> Result<Self::Output, ValidationErrors>;
}

// ── Field rules shared by both schemas ──────────────────────────────

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub(crate) fn check_date(raw: &str, field: &str, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let date = parse_date(raw);
    if date.is_none() {
        errors.add(field, "Invalid date");
    }
    date
}

pub(crate) fn check_non_empty(raw: &str, field: &str, message: &str, errors: &mut ValidationErrors) {
    if raw.is_empty() {
        errors.add(field, message);
    }
}

/// Outcome of coercing a raw form string into a number.
pub(crate) enum Coerced {
    Blank,
    Number(f64),
    NotANumber,
}

pub(crate) fn coerce_number(raw: &str) -> Coerced {
    let raw = raw.trim();
    if raw.is_empty() {
        return Coerced::Blank;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Coerced::Number(n),
        _ => Coerced::NotANumber,
    }
}

/// Required numeric field with an inclusive lower bound.
pub(crate) fn check_number_min(
    raw: &str,
    field: &str,
    min: f64,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    match coerce_number(raw) {
        Coerced::Blank => {
            errors.add(field, "Required");
            None
        }
        Coerced::NotANumber => {
            errors.add(field, "Expected number, received nan");
            None
        }
        Coerced::Number(n) if n < min => {
            errors.add(field, format!("Number must be greater than or equal to {min}"));
            None
        }
        Coerced::Number(n) => Some(n),
    }
}

/// Optional numeric field: blank means absent.
pub(crate) fn check_optional_number(
    raw: Option<&str>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<f64> {
    match coerce_number(raw.unwrap_or_default()) {
        Coerced::Blank => None,
        Coerced::NotANumber => {
            errors.add(field, "Expected number, received nan");
            None
        }
        Coerced::Number(n) => Some(n),
    }
}
