//! Populating typed instances from a [`ParseResult`].
//!
//! Binding walks the target's [`Schema`]: every declared field whose option
//! name was recorded receives the coerced value, every other field keeps the
//! value it already had. Afterwards the schema's rules run and the outcome is
//! handled according to the caller's [`ValidationPolicy`].

use tracing::{debug, warn};

use crate::error::BindError;
use crate::schema::{Bindable, FieldKind, Schema, schema_of};
use crate::tokenize::ParseResult;
use crate::validate::{ValidationPolicy, ValidationReport};

/// A populated instance together with its validation outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Bound<T> {
    value: T,
    validation: ValidationReport,
}

impl<T> Bound<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, ValidationReport) {
        (self.value, self.validation)
    }

    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    /// `true` when validation reported at least one failure.
    pub fn has_errors(&self) -> bool {
        self.validation.has_errors()
    }

    /// Newline-joined validation messages (empty when valid).
    pub fn errors(&self) -> String {
        self.validation.message()
    }

    /// Converts the value, keeping the validation report.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Bound<U> {
        Bound {
            value: f(self.value),
            validation: self.validation,
        }
    }
}

/// Instantiates `T` with [`Default`], binds `parsed` and validates.
///
/// The schema of `T` is built on the first call and reused afterwards.
///
/// # Errors
///
/// - [`BindError::UnsupportedFieldType`] if the schema declares a collection
///   field.
/// - [`BindError::Validation`] if a rule fails under
///   [`ValidationPolicy::FailFast`].
///
/// # Examples
///
/// ```
/// use yaclap_core::*;
///
/// #[derive(Debug, Default)]
/// struct Options {
///     flag1: bool,
///     option1: String,
/// }
///
/// impl Bindable for Options {
///     fn schema() -> Schema<Self> {
///         Schema::<Self>::new()
///             .field("Flag1", |o| &mut o.flag1)
///             .field("Option1", |o| &mut o.option1)
///     }
/// }
///
/// let parsed = tokenize(["--flag1", "--option1", "value1"], &ParserConfig::default()).unwrap();
/// let options = bind::<Options>(&parsed, ValidationPolicy::ReportOnly)
///     .unwrap()
///     .into_value();
/// assert!(options.flag1);
/// assert_eq!(options.option1, "value1");
/// ```
pub fn bind<T: Bindable>(
    parsed: &ParseResult,
    policy: ValidationPolicy,
) -> Result<Bound<T>, BindError> {
    bind_with(T::default(), &*schema_of::<T>(), parsed, policy)
}

/// Binds `parsed` onto an existing `value` and validates it.
///
/// Used when something other than [`Default`] creates the instance, or when
/// positional arguments were already mapped onto it.
pub fn bind_with<T>(
    mut value: T,
    schema: &Schema<T>,
    parsed: &ParseResult,
    policy: ValidationPolicy,
) -> Result<Bound<T>, BindError> {
    bind_into(&mut value, schema, parsed)?;
    let validation = schema.validate(&mut value);

    if validation.has_errors() {
        warn!(
            type_name = %schema.type_name(),
            failures = validation.failures().len(),
            ?policy,
            "validation failed"
        );
        if policy == ValidationPolicy::FailFast {
            return Err(BindError::Validation(validation));
        }
    }

    Ok(Bound { value, validation })
}

/// Copies recorded option values onto the fields of `target`. No validation.
///
/// # Errors
///
/// Returns [`BindError::UnsupportedFieldType`] before touching `target` if
/// the schema declares a collection field, whether or not it was given.
pub fn bind_into<T>(
    target: &mut T,
    schema: &Schema<T>,
    parsed: &ParseResult,
) -> Result<(), BindError> {
    if let Some(field) = schema
        .fields
        .iter()
        .find(|f| f.kind == FieldKind::Collection)
    {
        warn!(
            type_name = %schema.type_name(),
            field = %field.name,
            "collection fields cannot be bound"
        );
        return Err(BindError::UnsupportedFieldType {
            field: field.name.clone(),
            kind: field.kind,
        });
    }

    for field in &schema.fields {
        if let Some(raw) = parsed.value(&field.key) {
            debug!(
                type_name = %schema.type_name(),
                field = %field.name,
                kind = %field.kind,
                "binding option"
            );
            field.assign(target, raw);
        }
    }

    Ok(())
}
