//! Command registry and dispatch.
//!
//! A [`CommandRegistry`] maps command names (optionally paired with a
//! subcommand) to target types. Each [`CommandMapping`] knows how to create
//! its target, map positional arguments onto it, bind options and validate,
//! and finally convert the result into the registry's output type `C`,
//! typically an application enum with one variant per command.
//!
//! Keys are unique: [`CommandRegistry::new`] rejects duplicate
//! command/subcommand pairs, so exact resolution never depends on
//! registration order.
//!
//! # Examples
//!
//! ```
//! use yaclap_core::*;
//!
//! #[derive(Debug, Default)]
//! struct Delete {
//!     file: String,
//!     confirm: bool,
//! }
//!
//! impl Bindable for Delete {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new().field("Confirm", |d| &mut d.confirm)
//!     }
//! }
//!
//! #[derive(Debug)]
//! enum Action {
//!     Delete(Delete),
//! }
//!
//! impl From<Delete> for Action {
//!     fn from(d: Delete) -> Self {
//!         Action::Delete(d)
//!     }
//! }
//!
//! let registry = CommandRegistry::<Action>::new([CommandMapping::with_mapper(
//!     "delete",
//!     |args, d: &mut Delete| d.file = defaulting_index(args, 1, "").to_string(),
//! )])
//! .unwrap();
//!
//! let parsed = tokenize(["delete", "a.txt", "--confirm"], &ParserConfig::default()).unwrap();
//! let mapping = registry.resolve(&parsed).unwrap();
//! assert_eq!(mapping.command(), "delete");
//!
//! let Action::Delete(delete) = mapping
//!     .build(&parsed, ValidationPolicy::FailFast)
//!     .unwrap()
//!     .into_value();
//! assert_eq!(delete.file, "a.txt");
//! assert!(delete.confirm);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::binder::{Bound, bind_with};
use crate::error::{BindError, CommandError, RegistryError};
use crate::schema::{Bindable, Schema, schema_of};
use crate::tokenize::ParseResult;
use crate::validate::ValidationPolicy;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;
type Mapper<T> = Box<dyn Fn(&[String], &mut T) + Send + Sync>;

/// Type-erased construction of one target type.
trait Target<C>: Send + Sync {
    fn type_name(&self) -> &str;
    fn build(
        &self,
        parsed: &ParseResult,
        positional: &[String],
        policy: ValidationPolicy,
    ) -> Result<Bound<C>, BindError>;
}

struct TypedTarget<T, C> {
    schema: Arc<Schema<T>>,
    factory: Factory<T>,
    mapper: Option<Mapper<T>>,
    output: PhantomData<fn() -> C>,
}

impl<T, C> Target<C> for TypedTarget<T, C>
where
    T: Bindable + Into<C>,
{
    fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    fn build(
        &self,
        parsed: &ParseResult,
        positional: &[String],
        policy: ValidationPolicy,
    ) -> Result<Bound<C>, BindError> {
        let mut value = (self.factory)();
        if let Some(mapper) = &self.mapper {
            mapper(positional, &mut value);
        }
        Ok(bind_with(value, &*self.schema, parsed, policy)?.map(Into::into))
    }
}

/// Associates a command name with a target type.
pub struct CommandMapping<C> {
    command: String,
    sub_command: Option<String>,
    target: Box<dyn Target<C>>,
}

impl<C: 'static> CommandMapping<C> {
    /// Maps `command` to `T`, created with [`Default`], options only.
    pub fn new<T>(command: &str) -> Self
    where
        T: Bindable + Into<C>,
    {
        Self::from_parts(command, Box::new(T::default), None)
    }

    /// Maps `T` under its own type name, for type-name resolution.
    pub fn of<T>() -> Self
    where
        T: Bindable + Into<C>,
    {
        let name = schema_of::<T>().type_name().to_string();
        Self::new::<T>(&name)
    }

    /// Maps `command` to `T`, filling fields from positional arguments with
    /// `mapper` before options are bound.
    ///
    /// The mapper receives the positional tokens of the invocation command
    /// first: `["replace", "a.txt", "b.txt"]` for
    /// `replace a.txt b.txt --archive`.
    pub fn with_mapper<T>(
        command: &str,
        mapper: impl Fn(&[String], &mut T) + Send + Sync + 'static,
    ) -> Self
    where
        T: Bindable + Into<C>,
    {
        Self::from_parts(command, Box::new(T::default), Some(Box::new(mapper)))
    }

    /// Like [`with_mapper`](Self::with_mapper), with a custom instance
    /// factory (e.g. to inject services into the command).
    pub fn with_factory<T>(
        command: &str,
        factory: impl Fn() -> T + Send + Sync + 'static,
        mapper: impl Fn(&[String], &mut T) + Send + Sync + 'static,
    ) -> Self
    where
        T: Bindable + Into<C>,
    {
        Self::from_parts(command, Box::new(factory), Some(Box::new(mapper)))
    }

    fn from_parts<T>(command: &str, factory: Factory<T>, mapper: Option<Mapper<T>>) -> Self
    where
        T: Bindable + Into<C>,
    {
        Self {
            command: command.trim().to_lowercase(),
            sub_command: None,
            target: Box::new(TypedTarget {
                schema: schema_of::<T>(),
                factory,
                mapper,
                output: PhantomData,
            }),
        }
    }
}

impl<C> CommandMapping<C> {
    /// Restricts the mapping to invocations with this subcommand.
    pub fn sub_command(mut self, name: &str) -> Self {
        self.sub_command = Some(name.trim().to_lowercase());
        self
    }

    /// Lowercased command name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Lowercased subcommand name, if the mapping has one.
    pub fn sub_command_name(&self) -> Option<&str> {
        self.sub_command.as_deref()
    }

    /// Name of the target type.
    pub fn type_name(&self) -> &str {
        self.target.type_name()
    }

    /// Creates, maps, binds and validates the target for `parsed`.
    ///
    /// # Errors
    ///
    /// See [`bind`](crate::bind).
    pub fn build(
        &self,
        parsed: &ParseResult,
        policy: ValidationPolicy,
    ) -> Result<Bound<C>, BindError> {
        let positional = positional_tokens(parsed);
        debug!(
            command = %self.command,
            type_name = %self.type_name(),
            positional = positional.len(),
            "building command"
        );
        self.target.build(parsed, &positional, policy)
    }

    fn key(&self) -> String {
        match &self.sub_command {
            Some(sub) => format!("{} {}", self.command, sub),
            None => self.command.clone(),
        }
    }

    fn matches(&self, command: &str, sub_command: Option<&str>) -> bool {
        self.command == command && self.sub_command.as_deref() == sub_command
    }
}

impl<C> fmt::Debug for CommandMapping<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMapping")
            .field("command", &self.command)
            .field("sub_command", &self.sub_command)
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// All positional tokens of an invocation, command first.
fn positional_tokens(parsed: &ParseResult) -> Vec<String> {
    let mut tokens = Vec::with_capacity(parsed.arguments().len() + 2);
    if parsed.has_command() {
        tokens.push(parsed.command().to_string());
    }
    if parsed.has_sub_command() {
        tokens.push(parsed.sub_command().to_string());
    }
    tokens.extend(parsed.arguments().iter().cloned());
    tokens
}

/// Command and subcommand of an invocation, as typed. Arguments-first
/// parses have no command, so the leading positional arguments stand in.
fn invocation(parsed: &ParseResult) -> (String, Option<String>) {
    let mut iter = positional_tokens(parsed).into_iter();
    let command = iter.next().unwrap_or_default();
    (command, iter.next())
}

/// Read-only set of command mappings.
pub struct CommandRegistry<C> {
    mappings: Vec<CommandMapping<C>>,
}

impl<C> CommandRegistry<C> {
    /// Builds a registry, rejecting blank names and duplicate keys.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyCommandName`] or
    /// [`RegistryError::DuplicateCommand`].
    pub fn new(
        mappings: impl IntoIterator<Item = CommandMapping<C>>,
    ) -> Result<Self, RegistryError> {
        let mappings: Vec<_> = mappings.into_iter().collect();
        let mut seen = HashSet::new();
        for mapping in &mappings {
            if mapping.command.is_empty() {
                return Err(RegistryError::EmptyCommandName);
            }
            let key = mapping.key();
            if !seen.insert(key.clone()) {
                return Err(RegistryError::DuplicateCommand(key));
            }
        }
        Ok(Self { mappings })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandMapping<C>> {
        self.mappings.iter()
    }

    /// Exact, case-insensitive lookup.
    pub fn find(&self, command: &str, sub_command: Option<&str>) -> Option<&CommandMapping<C>> {
        let command = command.to_lowercase();
        let sub_command = sub_command.map(str::to_lowercase);
        self.mappings
            .iter()
            .find(|m| m.matches(&command, sub_command.as_deref()))
    }

    /// Resolves the mapping for an invocation by exact name.
    ///
    /// A mapping for the command/subcommand pair wins over a command-only
    /// mapping.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotFound`] carrying the command name as typed.
    pub fn resolve(&self, parsed: &ParseResult) -> Result<&CommandMapping<C>, CommandError> {
        let (command, sub_command) = invocation(parsed);
        let found = sub_command
            .as_deref()
            .and_then(|sub| self.find(&command, Some(sub)))
            .or_else(|| self.find(&command, None));

        match found {
            Some(mapping) => {
                debug!(
                    command = %command,
                    type_name = %mapping.type_name(),
                    "resolved command"
                );
                Ok(mapping)
            }
            None => Err(CommandError::NotFound(command)),
        }
    }

    /// Resolves by loose type-name match.
    ///
    /// The command and subcommand are concatenated into one key, matched
    /// case-insensitively; the first mapping (in registration order) whose
    /// type name contains it wins, so `cmd1 subcmd1` finds a type named
    /// `Cmd1SubCmd1`. An invocation without a command has an empty key and
    /// resolves to the first mapping.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotFound`] carrying the composite key as typed.
    pub fn resolve_by_type_name(
        &self,
        parsed: &ParseResult,
    ) -> Result<&CommandMapping<C>, CommandError> {
        let typed = format!("{}{}", parsed.command(), parsed.sub_command());
        let key = typed.to_lowercase();

        match self
            .mappings
            .iter()
            .find(|m| m.type_name().to_lowercase().contains(&key))
        {
            Some(mapping) => {
                debug!(key = %key, type_name = %mapping.type_name(), "resolved type");
                Ok(mapping)
            }
            None => Err(CommandError::NotFound(typed)),
        }
    }
}

impl<C> fmt::Debug for CommandRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.mappings.iter()).finish()
    }
}
