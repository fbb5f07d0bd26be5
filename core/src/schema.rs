//! Explicit option schemas for bindable types.
//!
//! A [`Schema`] declares, once per target type, which option names map onto
//! which fields. Each field is described by a name and a typed accessor
//! (`fn(&mut T) -> &mut V`); the value type `V` decides how raw tokens are
//! coerced (see [`FieldValue`]).
//!
//! # Examples
//!
//! ```
//! use yaclap_core::*;
//!
//! #[derive(Debug, Default)]
//! struct Serve {
//!     port: u32,
//!     verbose: bool,
//!     root: String,
//! }
//!
//! impl Bindable for Serve {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new()
//!             .field("Port", |s| &mut s.port)
//!             .with_rule(Rule::range(1.0, 65535.0))
//!             .field("Verbose", |s| &mut s.verbose)
//!             .field("Root", |s| &mut s.root)
//!     }
//! }
//!
//! let schema = Serve::schema();
//! assert_eq!(schema.type_name(), "Serve");
//! let kinds: Vec<_> = schema.fields().map(|f| (f.key, f.kind)).collect();
//! assert_eq!(
//!     kinds,
//!     vec![
//!         ("port", FieldKind::Integer),
//!         ("verbose", FieldKind::Bool),
//!         ("root", FieldKind::String),
//!     ]
//! );
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::coerce::Coerce;
use crate::validate::{FieldState, Rule};

/// Coarse classification of a field's value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Bool,
    String,
    Integer,
    Float,
    Decimal,
    DateTime,
    Guid,
    /// Multi-valued field. Declaring one is allowed, binding it is not.
    Collection,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
            Self::DateTime => "date-time",
            Self::Guid => "guid",
            Self::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// A type that can be populated from a raw option value.
///
/// Conversions go through [`Coerce`], so they never fail: malformed input
/// yields the type's zero value.
pub trait FieldValue: Sized + 'static {
    const KIND: FieldKind;

    /// Converts a raw token.
    fn coerce(raw: &str) -> Self;

    /// Whether the value counts as absent for [`Rule::Required`].
    fn is_missing(&self) -> bool {
        false
    }

    /// Numeric view used by [`Rule::Range`].
    fn as_number(&self) -> Option<f64> {
        None
    }

    /// Text view used by [`Rule::Length`] and [`Rule::Pattern`].
    fn as_text(&self) -> Option<&str> {
        None
    }
}

impl FieldValue for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn coerce(raw: &str) -> Self {
        raw.to_bool()
    }
}

impl FieldValue for String {
    const KIND: FieldKind = FieldKind::String;

    fn coerce(raw: &str) -> Self {
        raw.to_string()
    }

    fn is_missing(&self) -> bool {
        self.trim().is_empty()
    }

    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

macro_rules! numeric_field {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                fn coerce(raw: &str) -> Self {
                    raw.parse_or(<$ty>::default())
                }

                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

numeric_field! {
    i32 => Integer,
    i64 => Integer,
    u32 => Integer,
    u64 => Integer,
    f32 => Float,
    f64 => Float,
}

impl FieldValue for Decimal {
    const KIND: FieldKind = FieldKind::Decimal;

    fn coerce(raw: &str) -> Self {
        raw.to_decimal(Decimal::ZERO)
    }

    fn as_number(&self) -> Option<f64> {
        self.to_f64()
    }
}

impl FieldValue for NaiveDateTime {
    const KIND: FieldKind = FieldKind::DateTime;

    fn coerce(raw: &str) -> Self {
        raw.to_date_time(None)
    }
}

impl FieldValue for Uuid {
    const KIND: FieldKind = FieldKind::Guid;

    fn coerce(raw: &str) -> Self {
        raw.to_guid(None)
    }
}

impl FieldValue for Vec<String> {
    const KIND: FieldKind = FieldKind::Collection;

    fn coerce(raw: &str) -> Self {
        vec![raw.to_string()]
    }

    fn is_missing(&self) -> bool {
        self.is_empty()
    }
}

impl<V: FieldValue> FieldValue for Option<V> {
    const KIND: FieldKind = V::KIND;

    fn coerce(raw: &str) -> Self {
        Some(V::coerce(raw))
    }

    fn is_missing(&self) -> bool {
        self.as_ref().is_none_or(V::is_missing)
    }

    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(V::as_number)
    }

    fn as_text(&self) -> Option<&str> {
        self.as_ref().and_then(V::as_text)
    }
}

/// Type-erased access to one field of `T`.
trait Slot<T>: Send + Sync {
    fn assign(&self, target: &mut T, raw: &str);
    fn state(&self, target: &mut T) -> FieldState;
}

struct Accessor<T, V> {
    access: fn(&mut T) -> &mut V,
}

impl<T: 'static, V: FieldValue> Slot<T> for Accessor<T, V> {
    fn assign(&self, target: &mut T, raw: &str) {
        *(self.access)(target) = V::coerce(raw);
    }

    fn state(&self, target: &mut T) -> FieldState {
        let value = (self.access)(target);
        FieldState {
            missing: value.is_missing(),
            number: value.as_number(),
            text: value.as_text().map(String::from),
        }
    }
}

pub(crate) struct Field<T> {
    pub(crate) name: String,
    pub(crate) key: String,
    pub(crate) kind: FieldKind,
    pub(crate) rules: Vec<Rule>,
    slot: Box<dyn Slot<T>>,
}

impl<T> Field<T> {
    pub(crate) fn assign(&self, target: &mut T, raw: &str) {
        self.slot.assign(target, raw);
    }

    pub(crate) fn state(&self, target: &mut T) -> FieldState {
        self.slot.state(target)
    }
}

/// Read-only description of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo<'a> {
    /// Name as declared, used in validation messages.
    pub name: &'a str,
    /// Lowercased option name matched against parsed options.
    pub key: &'a str,
    pub kind: FieldKind,
}

type Check<T> = fn(&T) -> Result<(), String>;

/// Declared option fields and validation rules for `T`.
pub struct Schema<T> {
    type_name: String,
    pub(crate) fields: Vec<Field<T>>,
    pub(crate) checks: Vec<Check<T>>,
}

impl<T: 'static> Schema<T> {
    /// Creates an empty schema named after `T` (last path segment).
    pub fn new() -> Self {
        let full = std::any::type_name::<T>();
        let base = full.split('<').next().unwrap_or(full);
        let short = base.rsplit("::").next().unwrap_or(base);
        Self {
            type_name: short.to_string(),
            fields: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Overrides the type name used for type-name resolution.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.type_name = name.into();
        self
    }

    /// Declares a field bound to option `name` (matched case-insensitively).
    pub fn field<V: FieldValue>(mut self, name: &str, access: fn(&mut T) -> &mut V) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            key: name.to_lowercase(),
            kind: V::KIND,
            rules: Vec::new(),
            slot: Box::new(Accessor { access }),
        });
        self
    }

    /// Attaches `rule` to the most recently declared field.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        match self.fields.last_mut() {
            Some(field) => field.rules.push(rule),
            None => warn!(
                type_name = %self.type_name,
                "validation rule declared before any field; ignored"
            ),
        }
        self
    }

    /// Shorthand for `with_rule(Rule::required())`.
    pub fn required(self) -> Self {
        self.with_rule(Rule::required())
    }

    /// Adds a type-level check run after field rules.
    pub fn check(mut self, check: fn(&T) -> Result<(), String>) -> Self {
        self.checks.push(check);
        self
    }
}

impl<T> Schema<T> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = FieldInfo<'_>> {
        self.fields.iter().map(|f| FieldInfo {
            name: &f.name,
            key: &f.key,
            kind: f.kind,
        })
    }

    /// Looks up a field by option name, case-insensitively.
    pub fn find_field(&self, name: &str) -> Option<FieldInfo<'_>> {
        let key = name.to_lowercase();
        self.fields().find(|f| f.key == key)
    }
}

impl<T: 'static> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// A type that can be instantiated and populated from parsed options.
///
/// [`schema`](Bindable::schema) is called once per type; the binder and the
/// registry share the result (see [`schema_of`]).
pub trait Bindable: Default + 'static {
    fn schema() -> Schema<Self>;
}

type SchemaCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static SCHEMAS: LazyLock<SchemaCache> = LazyLock::new(Default::default);

/// The schema of `T`, built on first use and shared afterwards.
///
/// Keeps compiled [`Rule::Pattern`] regexes alive across calls.
pub fn schema_of<T: Bindable>() -> Arc<Schema<T>> {
    let id = TypeId::of::<T>();
    let cached = SCHEMAS
        .read()
        .ok()
        .and_then(|schemas| schemas.get(&id).cloned())
        .and_then(|schema| schema.downcast::<Schema<T>>().ok());
    if let Some(schema) = cached {
        return schema;
    }

    let built = Arc::new(T::schema());
    let Ok(mut schemas) = SCHEMAS.write() else {
        warn!(type_name = %built.type_name(), "schema cache unavailable");
        return built;
    };
    // Another thread may have won the race; keep the first one stored.
    let entry = schemas
        .entry(id)
        .or_insert_with(|| Arc::clone(&built) as Arc<dyn Any + Send + Sync>);
    Arc::clone(entry).downcast::<Schema<T>>().unwrap_or(built)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Sample {
        name: String,
        count: i32,
        ratio: Option<f64>,
        tags: Vec<String>,
    }

    fn schema() -> Schema<Sample> {
        Schema::<Sample>::new()
            .field("Name", |s| &mut s.name)
            .required()
            .field("Count", |s| &mut s.count)
            .field("Ratio", |s| &mut s.ratio)
            .field("Tags", |s| &mut s.tags)
    }

    #[test]
    fn test_type_name_is_last_path_segment() {
        assert_eq!(schema().type_name(), "Sample");
        assert_eq!(schema().named("Custom").type_name(), "Custom");
        assert_eq!(Schema::<Option<Sample>>::new().type_name(), "Option");
    }

    #[test]
    fn test_field_kinds_follow_value_types() {
        let schema = schema();
        let kinds: Vec<FieldKind> = schema.fields().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FieldKind::String,
                FieldKind::Integer,
                FieldKind::Float,
                FieldKind::Collection,
            ]
        );
    }

    #[test]
    fn test_find_field_is_case_insensitive() {
        let schema = schema();
        let field = schema.find_field("COUNT").unwrap();
        assert_eq!(field.name, "Count");
        assert_eq!(field.key, "count");
        assert!(schema.find_field("missing").is_none());
    }

    #[test]
    fn test_rules_attach_to_latest_field() {
        let schema = schema();
        assert_eq!(schema.fields[0].rules.len(), 1);
        assert!(schema.fields[1].rules.is_empty());

        let orphan = Schema::<Sample>::new().required();
        assert!(orphan.fields.is_empty());
    }

    #[test]
    fn test_assign_coerces_raw_values() {
        let schema = schema();
        let mut sample = Sample::default();
        schema.fields[0].assign(&mut sample, "alice");
        schema.fields[1].assign(&mut sample, "not a number");
        schema.fields[2].assign(&mut sample, "0.25");
        assert_eq!(sample.name, "alice");
        assert_eq!(sample.count, 0);
        assert_eq!(sample.ratio, Some(0.25));
    }

    #[derive(Debug, Default)]
    struct Cached {
        code: String,
    }

    static CACHED_BUILDS: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    impl Bindable for Cached {
        fn schema() -> Schema<Self> {
            CACHED_BUILDS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Schema::<Self>::new().field("Code", |c| &mut c.code)
        }
    }

    #[test]
    fn test_schema_of_builds_once_per_type() {
        let first = schema_of::<Cached>();
        let second = schema_of::<Cached>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(CACHED_BUILDS.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(second.type_name(), "Cached");
    }

    #[test]
    fn test_option_values_report_missing() {
        let schema = schema();
        let mut sample = Sample::default();
        assert!(schema.fields[2].state(&mut sample).missing);
        assert!(schema.fields[0].state(&mut sample).missing);
        assert!(!schema.fields[1].state(&mut sample).missing);
        sample.ratio = Some(2.0);
        assert_eq!(schema.fields[2].state(&mut sample).number, Some(2.0));
    }
}
