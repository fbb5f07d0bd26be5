//! Token stream tokenizer.
//!
//! Turns the raw argument vector a program receives into a [`ParseResult`]:
//! an optional leading command and subcommand, positional arguments, and a
//! map of lowercased option names to their raw string values.
//!
//! Two layouts are supported, selected by [`ParserConfig::arguments_first`]:
//!
//! - **command first** (default): `cmd [sub] [args...] [--opt [value]]...`.
//!   The first and second unprefixed tokens become the command and
//!   subcommand.
//! - **arguments first**: `[args...] [--opt [value]]...`. No command is
//!   extracted and every positional token must precede the first option.
//!
//! Values are stored exactly as given; coercion happens at bind time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coerce::Coerce;
use crate::error::ParseError;

/// Prefix that marks an option or flag token.
pub const DEFAULT_PREFIX: &str = "--";

/// Value recorded for an option given without a value.
pub const FLAG_VALUE: &str = "true";

/// Tokenizer settings.
///
/// # Examples
///
/// ```
/// use yaclap_core::ParserConfig;
///
/// let config = ParserConfig::default();
/// assert_eq!(config.prefix, "--");
/// assert!(!config.arguments_first);
///
/// let slash = ParserConfig::default().with_prefix("/");
/// assert_eq!(slash.prefix, "/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Prefix identifying option/flag tokens.
    pub prefix: String,
    /// Require all positional arguments to precede options, and skip
    /// command/subcommand extraction.
    pub arguments_first: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            arguments_first: false,
        }
    }
}

impl ParserConfig {
    /// Replaces the option prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Switches to arguments-first layout.
    pub fn arguments_first(mut self, enabled: bool) -> Self {
        self.arguments_first = enabled;
        self
    }

    fn option_name<'a>(&self, token: &'a str) -> Option<&'a str> {
        token.strip_prefix(self.prefix.as_str())
    }

    fn is_option(&self, token: &str) -> bool {
        token.starts_with(self.prefix.as_str())
    }
}

/// Structured view of a token stream.
///
/// Constructed once by [`tokenize`] and read-only afterwards. All option
/// lookups are case-insensitive: names are lowercased when recorded and when
/// queried.
///
/// # Examples
///
/// ```
/// use yaclap_core::{ParserConfig, tokenize};
///
/// let parsed = tokenize(
///     ["remote", "add", "origin", "--Verbose", "--url", "https://example.com"],
///     &ParserConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(parsed.command(), "remote");
/// assert_eq!(parsed.sub_command(), "add");
/// assert_eq!(parsed.arguments(), ["origin"]);
/// assert!(parsed.flag("verbose"));
/// assert_eq!(parsed.option("URL"), Some("https://example.com"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    command: String,
    sub_command: String,
    arguments: Vec<String>,
    options: BTreeMap<String, String>,
}

impl ParseResult {
    /// The leading command, or `""` when absent.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn has_command(&self) -> bool {
        !self.command.is_empty()
    }

    /// The subcommand following the command, or `""` when absent.
    pub fn sub_command(&self) -> &str {
        &self.sub_command
    }

    pub fn has_sub_command(&self) -> bool {
        !self.sub_command.is_empty()
    }

    /// Positional arguments in input order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Recorded options as `(lowercased name, raw value)` pairs, sorted by
    /// name.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if `name` was given, whatever its value.
    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(&name.to_lowercase())
    }

    /// Raw recorded value for `name`, flag or option.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.options.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Returns `true` if `name` was given and its value reads as true.
    ///
    /// A bare `--name` records `"true"`, so it counts as a set flag; so does
    /// `--name yes`.
    pub fn flag(&self, name: &str) -> bool {
        self.value(name).is_some_and(|v| v.to_bool())
    }

    /// Returns `true` if `name` was given with a value that does not read
    /// as a boolean true.
    pub fn has_option(&self, name: &str) -> bool {
        self.value(name).is_some_and(|v| !v.to_bool())
    }

    /// Value of option `name`; `None` when absent or when it is a set flag.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.value(name).filter(|v| !v.to_bool())
    }

    /// Returns `true` if no command, argument or option was recorded.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
            && self.sub_command.is_empty()
            && self.arguments.is_empty()
            && self.options.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Command,
    SubCommand,
    Arguments,
}

/// Tokenizes `tokens` according to `config`.
///
/// # Errors
///
/// - [`ParseError::EmptyPrefix`] if `config.prefix` is empty.
/// - [`ParseError::DuplicateOption`] when an option name repeats
///   (case-insensitively).
/// - [`ParseError::PositionalAfterOption`] in arguments-first mode when a
///   positional token follows an option.
///
/// # Examples
///
/// ```
/// use yaclap_core::{ParseError, ParserConfig, tokenize};
///
/// let config = ParserConfig::default().arguments_first(true);
/// let parsed = tokenize(["copy", "a.txt", "--force"], &config).unwrap();
/// assert!(!parsed.has_command());
/// assert_eq!(parsed.arguments(), ["copy", "a.txt"]);
///
/// let err = tokenize(["copy", "--to", "b.txt", "a.txt"], &config);
/// assert!(matches!(err, Err(ParseError::PositionalAfterOption { .. })));
/// ```
pub fn tokenize<I>(tokens: I, config: &ParserConfig) -> Result<ParseResult, ParseError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if config.prefix.is_empty() {
        return Err(ParseError::EmptyPrefix);
    }

    let mut queue = tokens
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .peekable();
    let mut result = ParseResult::default();
    let mut stage = if config.arguments_first {
        Stage::Arguments
    } else {
        Stage::Command
    };
    let mut last_option: Option<String> = None;

    while let Some(token) = queue.next() {
        if let Some(stripped) = config.option_name(&token) {
            // A bare prefix is recorded under the empty name.
            let name = stripped.to_lowercase();
            let value = queue
                .next_if(|next| !config.is_option(next))
                .unwrap_or_else(|| FLAG_VALUE.to_string());
            if result.options.contains_key(&name) {
                return Err(ParseError::DuplicateOption(name));
            }
            result.options.insert(name.clone(), value);
            last_option = Some(name);
            stage = Stage::Arguments;
            continue;
        }

        if token.is_empty() {
            continue;
        }

        match stage {
            Stage::Command => {
                result.command = token;
                stage = Stage::SubCommand;
            }
            Stage::SubCommand => {
                result.sub_command = token;
                stage = Stage::Arguments;
            }
            Stage::Arguments => {
                if config.arguments_first {
                    if let Some(option) = last_option {
                        return Err(ParseError::PositionalAfterOption {
                            argument: token,
                            option,
                        });
                    }
                }
                result.arguments.push(token);
            }
        }
    }

    debug!(
        command = %result.command,
        sub_command = %result.sub_command,
        arguments = result.arguments.len(),
        options = result.options.len(),
        "tokenized arguments"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tokens: &[&str]) -> ParseResult {
        tokenize(tokens, &ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let parsed = parse(&[]);
        assert!(parsed.is_empty());
        assert!(!parsed.has_command());
        assert!(!parsed.has_sub_command());
    }

    #[test]
    fn test_single_empty_token_is_not_a_command() {
        let parsed = parse(&[""]);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_command_and_sub_command() {
        let parsed = parse(&["command"]);
        assert_eq!(parsed.command(), "command");
        assert!(!parsed.has_sub_command());

        let parsed = parse(&["command", "sub"]);
        assert_eq!(parsed.command(), "command");
        assert_eq!(parsed.sub_command(), "sub");
        assert!(parsed.arguments().is_empty());
    }

    #[test]
    fn test_single_flag() {
        let parsed = parse(&["--flag1"]);
        assert!(!parsed.has_command());
        assert!(parsed.flag("flag1"));
        assert!(!parsed.has_option("flag1"));
        assert_eq!(parsed.value("flag1"), Some(FLAG_VALUE));
    }

    #[test]
    fn test_flags_and_options() {
        let parsed = parse(&["--flag1", "--option1", "option1value", "--flag2", "--flag3"]);
        assert!(parsed.flag("flag1"));
        assert!(parsed.flag("flag2"));
        assert!(parsed.flag("flag3"));
        assert_eq!(parsed.option("option1"), Some("option1value"));
        assert!(!parsed.flag("flagx"));
        assert_eq!(parsed.option("option2"), None);
    }

    #[test]
    fn test_option_names_are_case_insensitive() {
        let parsed = parse(&["--Flag1", "--OPTION1", "Value"]);
        assert!(parsed.flag("flag1"));
        assert!(parsed.flag("FLAG1"));
        assert_eq!(parsed.option("Option1"), Some("Value"));
        let names: Vec<&str> = parsed.options().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["flag1", "option1"]);
    }

    #[test]
    fn test_option_value_with_spaces_is_kept_verbatim() {
        let parsed = parse(&["--flag1", "--option1", "two words"]);
        assert_eq!(parsed.option("option1"), Some("two words"));
    }

    #[test]
    fn test_truthy_option_value_reads_as_flag() {
        let parsed = parse(&["--debug", "yes", "--level", "0"]);
        assert!(parsed.flag("debug"));
        assert!(!parsed.has_option("debug"));
        assert!(parsed.has_option("level"));
        assert_eq!(parsed.value("debug"), Some("yes"));
    }

    #[test]
    fn test_empty_string_can_be_an_option_value() {
        let parsed = parse(&["--name", ""]);
        assert_eq!(parsed.value("name"), Some(""));
        assert!(parsed.has_option("name"));
    }

    #[test]
    fn test_positional_arguments_after_sub_command() {
        let parsed = parse(&["replace", "filename1", "filename2", "--archive"]);
        assert_eq!(parsed.command(), "replace");
        assert_eq!(parsed.sub_command(), "filename1");
        assert_eq!(parsed.arguments(), ["filename2"]);
        assert!(parsed.flag("archive"));
    }

    #[test]
    fn test_command_mode_allows_arguments_after_options() {
        let parsed = parse(&["cmd", "sub", "--flag", "--opt", "v", "tail"]);
        assert_eq!(parsed.arguments(), ["tail"]);
        assert_eq!(parsed.option("opt"), Some("v"));

        let parsed = parse(&["--flag", "--opt", "--x", "--y", "z", "--w"]);
        assert!(!parsed.has_command());
        assert_eq!(parsed.option("y"), Some("z"));
    }

    #[test]
    fn test_leading_option_prevents_command_extraction() {
        let parsed = parse(&["--verbose", "--level", "2", "build"]);
        assert!(!parsed.has_command());
        assert!(!parsed.has_sub_command());
        assert_eq!(parsed.arguments(), ["build"]);
    }

    #[test]
    fn test_arguments_first_collects_positionals() {
        let config = ParserConfig::default().arguments_first(true);
        let parsed = tokenize(["delete", "file.txt", "--confirm"], &config).unwrap();
        assert!(!parsed.has_command());
        assert_eq!(parsed.arguments(), ["delete", "file.txt"]);
        assert!(parsed.flag("confirm"));
    }

    #[test]
    fn test_arguments_first_rejects_late_positional() {
        let config = ParserConfig::default().arguments_first(true);
        let err = tokenize(["delete", "--confirm", "--key", "k", "file.txt"], &config)
            .unwrap_err();
        assert_eq!(
            err,
            ParseError::PositionalAfterOption {
                argument: "file.txt".to_string(),
                option: "key".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_option_is_rejected() {
        let err = tokenize(["--name", "a", "--NAME", "b"], &ParserConfig::default())
            .unwrap_err();
        assert_eq!(err, ParseError::DuplicateOption("name".to_string()));
    }

    #[test]
    fn test_bare_prefix_is_an_empty_option_name() {
        let parsed = parse(&["cmd", "--", "x"]);
        assert_eq!(parsed.command(), "cmd");
        assert_eq!(parsed.value(""), Some("x"));
        assert!(parsed.arguments().is_empty());

        let parsed = parse(&["cmd", "sub", "--"]);
        assert_eq!(parsed.sub_command(), "sub");
        assert!(parsed.flag(""));
    }

    #[test]
    fn test_custom_prefix() {
        let config = ParserConfig::default().with_prefix("/");
        let parsed = tokenize(["build", "/Release", "/out", "bin"], &config).unwrap();
        assert_eq!(parsed.command(), "build");
        assert!(parsed.flag("release"));
        assert_eq!(parsed.option("out"), Some("bin"));
        // With a custom prefix, "--" tokens are ordinary values.
        let parsed = tokenize(["/name", "--x"], &config).unwrap();
        assert_eq!(parsed.option("name"), Some("--x"));
    }

    #[test]
    fn test_empty_prefix_is_rejected() {
        let config = ParserConfig::default().with_prefix("");
        assert_eq!(
            tokenize(["a"], &config).unwrap_err(),
            ParseError::EmptyPrefix
        );
    }
}
