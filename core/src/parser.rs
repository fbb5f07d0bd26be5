//! High-level entry points.
//!
//! [`Parser`] bundles a [`ParserConfig`] with a [`ValidationPolicy`] and
//! drives the tokenize → resolve → bind pipeline. The free functions cover
//! the common presets:
//!
//! | function            | layout          | resolution        | validation  |
//! |---------------------|-----------------|-------------------|-------------|
//! | [`parse`]           | command first   | none              | none        |
//! | [`parse_as`]        | command first   | fixed type        | report only |
//! | [`parse_typed`]     | command first   | type-name match   | report only |
//! | [`parse_command`]   | arguments first | exact name        | fail fast   |

use tracing::debug;

use crate::binder::{Bound, bind};
use crate::error::Result;
use crate::registry::CommandRegistry;
use crate::schema::Bindable;
use crate::tokenize::{ParseResult, ParserConfig, tokenize};
use crate::validate::{ValidationPolicy, ValidationReport};

/// Outcome of a typed parse: the invocation's command names plus the bound
/// data and its validation report.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<C> {
    command: String,
    sub_command: String,
    data: C,
    validation: ValidationReport,
}

impl<C> Parsed<C> {
    fn new(parsed: &ParseResult, bound: Bound<C>) -> Self {
        let (data, validation) = bound.into_parts();
        Self {
            command: parsed.command().to_string(),
            sub_command: parsed.sub_command().to_string(),
            data,
            validation,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn sub_command(&self) -> &str {
        &self.sub_command
    }

    pub fn has_sub_command(&self) -> bool {
        !self.sub_command.is_empty()
    }

    pub fn data(&self) -> &C {
        &self.data
    }

    pub fn into_data(self) -> C {
        self.data
    }

    pub fn validation(&self) -> &ValidationReport {
        &self.validation
    }

    /// The error flag: `true` when validation failed.
    pub fn has_errors(&self) -> bool {
        self.validation.has_errors()
    }

    /// Newline-joined validation messages.
    pub fn errors(&self) -> String {
        self.validation.message()
    }
}

/// Configured parser.
///
/// # Examples
///
/// ```
/// use yaclap_core::{Parser, ValidationPolicy};
///
/// let parser = Parser::new().prefix("/").validation(ValidationPolicy::FailFast);
/// let parsed = parser.parse(["build", "/release"]).unwrap();
/// assert_eq!(parsed.command(), "build");
/// assert!(parsed.flag("release"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parser {
    config: ParserConfig,
    policy: ValidationPolicy,
}

impl Parser {
    /// Command-first layout, `--` prefix, report-only validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments-first layout with fail-fast validation, the preset used for
    /// command dispatch.
    pub fn for_commands() -> Self {
        Self {
            config: ParserConfig::default().arguments_first(true),
            policy: ValidationPolicy::FailFast,
        }
    }

    pub fn from_config(config: ParserConfig) -> Self {
        Self {
            config,
            policy: ValidationPolicy::default(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    pub fn arguments_first(mut self, enabled: bool) -> Self {
        self.config.arguments_first = enabled;
        self
    }

    pub fn validation(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Tokenizes without binding.
    pub fn parse<I>(&self, tokens: I) -> Result<ParseResult>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Ok(tokenize(tokens, &self.config)?)
    }

    /// Tokenizes and binds onto `T` regardless of the command given.
    pub fn parse_as<T, I>(&self, tokens: I) -> Result<Parsed<T>>
    where
        T: Bindable,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let parsed = self.parse(tokens)?;
        let bound = bind::<T>(&parsed, self.policy)?;
        Ok(Parsed::new(&parsed, bound))
    }

    /// Tokenizes, picks the target by type name and binds.
    pub fn parse_typed<C, I>(&self, tokens: I, registry: &CommandRegistry<C>) -> Result<Parsed<C>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let parsed = self.parse(tokens)?;
        let mapping = registry.resolve_by_type_name(&parsed)?;
        let bound = mapping.build(&parsed, self.policy)?;
        Ok(Parsed::new(&parsed, bound))
    }

    /// Tokenizes, picks the target by exact command name, maps positional
    /// arguments, binds and validates.
    pub fn parse_command<C, I>(&self, tokens: I, registry: &CommandRegistry<C>) -> Result<Bound<C>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let parsed = self.parse(tokens)?;
        let mapping = registry.resolve(&parsed)?;
        let bound = mapping.build(&parsed, self.policy)?;
        debug!(
            command = %mapping.command(),
            valid = bound.validation().is_valid(),
            "dispatched command"
        );
        Ok(bound)
    }
}

/// Tokenizes with the default configuration.
///
/// ```
/// let parsed = yaclap_core::parse(["command", "sub", "--flag1"]).unwrap();
/// assert!(parsed.has_command());
/// assert!(parsed.has_sub_command());
/// assert!(parsed.flag("FLAG1"));
/// ```
pub fn parse<I>(tokens: I) -> Result<ParseResult>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Parser::new().parse(tokens)
}

/// Binds the tokens onto `T` with report-only validation.
pub fn parse_as<T, I>(tokens: I) -> Result<Parsed<T>>
where
    T: Bindable,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Parser::new().parse_as(tokens)
}

/// Resolves the target among `registry` by type name and binds it with
/// report-only validation.
pub fn parse_typed<C, I>(tokens: I, registry: &CommandRegistry<C>) -> Result<Parsed<C>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Parser::new().parse_typed(tokens, registry)
}

/// Dispatches an arguments-first invocation to its command, failing on
/// validation errors.
pub fn parse_command<C, I>(tokens: I, registry: &CommandRegistry<C>) -> Result<C>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Ok(Parser::for_commands()
        .parse_command(tokens, registry)?
        .into_value())
}
