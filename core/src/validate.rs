//! Declarative validation of bound instances.
//!
//! Rules are attached to schema fields (see [`crate::Schema::with_rule`]) and
//! evaluated after binding. Every failed rule contributes one
//! [`ValidationFailure`]; the aggregated [`ValidationReport`] renders them as
//! a newline-joined message.
//!
//! What happens to a failing report depends on the [`ValidationPolicy`]
//! selected by the caller.
//!
//! # Examples
//!
//! ```
//! use yaclap_core::*;
//!
//! #[derive(Debug, Default)]
//! struct Login {
//!     user: String,
//! }
//!
//! impl Bindable for Login {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new()
//!             .field("User", |l| &mut l.user)
//!             .with_rule(Rule::required().with_message("user is mandatory"))
//!     }
//! }
//!
//! let parsed = tokenize(["--password", "x"], &ParserConfig::default()).unwrap();
//! let bound = bind::<Login>(&parsed, ValidationPolicy::ReportOnly).unwrap();
//! assert!(bound.has_errors());
//! assert_eq!(bound.validation().message(), "user is mandatory");
//! ```

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Schema;

/// What to do when validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPolicy {
    /// Return the instance together with the failing report.
    #[default]
    ReportOnly,
    /// Abort with [`BindError::Validation`](crate::BindError::Validation).
    FailFast,
}

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Display name of the field, or `None` for type-level checks.
    pub field: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// Aggregated result of validating one instance.
///
/// # Examples
///
/// ```
/// use yaclap_core::ValidationReport;
///
/// let report = ValidationReport::default();
/// assert!(report.is_valid());
/// assert_eq!(report.message(), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// The error flag: `true` when at least one rule failed.
    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    /// All failure messages joined by newlines, in rule order.
    pub fn message(&self) -> String {
        self.failures
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn push(&mut self, field: Option<&str>, message: String) {
        self.failures.push(ValidationFailure {
            field: field.map(String::from),
            message,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Field-level validation rule.
///
/// Rules other than [`Rule::Required`] only apply to values that are
/// present, so an absent optional field passes a range or pattern check.
#[derive(Debug, Clone)]
pub enum Rule {
    /// The field must hold a value: non-blank string, `Some`, non-empty
    /// collection. Numbers, booleans, dates and GUIDs always hold one.
    Required { message: Option<String> },
    /// Numeric value within `min..=max`.
    Range {
        min: f64,
        max: f64,
        message: Option<String>,
    },
    /// String length (in characters) within `min..=max`.
    Length {
        min: usize,
        max: usize,
        message: Option<String>,
    },
    /// String must match the regular expression.
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
}

impl Rule {
    pub fn required() -> Self {
        Self::Required { message: None }
    }

    pub fn range(min: f64, max: f64) -> Self {
        Self::Range {
            min,
            max,
            message: None,
        }
    }

    pub fn length(min: usize, max: usize) -> Self {
        Self::Length {
            min,
            max,
            message: None,
        }
    }

    /// Builds a pattern rule.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            message: None,
        })
    }

    /// Replaces the default message.
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        let text = Some(text.into());
        match &mut self {
            Self::Required { message }
            | Self::Range { message, .. }
            | Self::Length { message, .. }
            | Self::Pattern { message, .. } => *message = text,
        }
        self
    }

    /// Checks `state`, returning the failure message if the rule is broken.
    pub(crate) fn evaluate(&self, field: &str, state: &FieldState) -> Option<String> {
        match self {
            Self::Required { message } => state.missing.then(|| {
                message
                    .clone()
                    .unwrap_or_else(|| format!("The {field} field is required."))
            }),
            Self::Range { min, max, message } => {
                let value = state.number.filter(|_| !state.missing)?;
                (value < *min || value > *max).then(|| {
                    message.clone().unwrap_or_else(|| {
                        format!("The field {field} must be between {min} and {max}.")
                    })
                })
            }
            Self::Length { min, max, message } => {
                let text = state.text.as_deref()?;
                let len = text.chars().count();
                (len < *min || len > *max).then(|| {
                    message.clone().unwrap_or_else(|| {
                        format!(
                            "The field {field} must be a string with a minimum length of {min} and a maximum length of {max}."
                        )
                    })
                })
            }
            Self::Pattern { regex, message } => {
                let text = state.text.as_deref().filter(|t| !t.is_empty())?;
                (!regex.is_match(text)).then(|| {
                    message.clone().unwrap_or_else(|| {
                        format!(
                            "The field {field} must match the regular expression '{}'.",
                            regex.as_str()
                        )
                    })
                })
            }
        }
    }
}

impl<T> Schema<T> {
    /// Runs every field rule, then every type-level check, against `target`.
    ///
    /// Takes `&mut T` because field accessors are declared as
    /// `fn(&mut T) -> &mut V`; the instance is not modified.
    pub fn validate(&self, target: &mut T) -> ValidationReport {
        let mut report = ValidationReport::default();
        for field in &self.fields {
            if field.rules.is_empty() {
                continue;
            }
            let state = field.state(target);
            for rule in &field.rules {
                if let Some(message) = rule.evaluate(&field.name, &state) {
                    debug!(field = %field.name, %message, "validation rule failed");
                    report.push(Some(&field.name), message);
                }
            }
        }
        for check in &self.checks {
            if let Err(message) = check(&*target) {
                debug!(type_name = %self.type_name(), %message, "type check failed");
                report.push(None, message);
            }
        }
        report
    }
}

/// Snapshot of a field's value as seen by rules.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldState {
    pub(crate) missing: bool,
    pub(crate) number: Option<f64>,
    pub(crate) text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldState {
        FieldState {
            missing: value.trim().is_empty(),
            number: None,
            text: Some(value.to_string()),
        }
    }

    fn number(value: f64) -> FieldState {
        FieldState {
            missing: false,
            number: Some(value),
            text: None,
        }
    }

    #[test]
    fn test_required_default_and_custom_message() {
        let rule = Rule::required();
        assert_eq!(
            rule.evaluate("Name", &text("  ")),
            Some("The Name field is required.".to_string())
        );
        assert_eq!(rule.evaluate("Name", &text("bob")), None);

        let custom = Rule::required().with_message("Name option is required");
        assert_eq!(
            custom.evaluate("Name", &text("")),
            Some("Name option is required".to_string())
        );
    }

    #[test]
    fn test_required_passes_for_numbers() {
        assert_eq!(Rule::required().evaluate("Count", &number(0.0)), None);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let rule = Rule::range(1.0, 10.0);
        assert_eq!(rule.evaluate("Port", &number(1.0)), None);
        assert_eq!(rule.evaluate("Port", &number(10.0)), None);
        assert_eq!(
            rule.evaluate("Port", &number(11.0)),
            Some("The field Port must be between 1 and 10.".to_string())
        );
        assert_eq!(rule.evaluate("Port", &FieldState::default()), None);
    }

    #[test]
    fn test_length_counts_characters() {
        let rule = Rule::length(2, 3);
        assert_eq!(rule.evaluate("Code", &text("äöü")), None);
        assert!(rule.evaluate("Code", &text("a")).is_some());
        assert!(rule.evaluate("Code", &text("abcd")).is_some());
    }

    #[test]
    fn test_pattern_skips_empty_values() {
        let rule = Rule::pattern(r"^\d{3}$").unwrap().with_message("three digits");
        assert_eq!(rule.evaluate("Pin", &text("123")), None);
        assert_eq!(rule.evaluate("Pin", &text("")), None);
        assert_eq!(
            rule.evaluate("Pin", &text("12a")),
            Some("three digits".to_string())
        );
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        assert!(Rule::pattern("(").is_err());
    }

    #[test]
    fn test_report_message_joins_with_newlines() {
        let mut report = ValidationReport::default();
        report.push(Some("A"), "first".to_string());
        report.push(None, "second".to_string());
        assert!(report.has_errors());
        assert_eq!(report.message(), "first\nsecond");
        assert_eq!(report.to_string(), "first\nsecond");
        assert_eq!(report.failures()[0].field.as_deref(), Some("A"));
    }
}
