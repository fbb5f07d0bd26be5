//! Command-line argument parsing with typed binding.
//!
//! This crate turns the raw token vector a program receives into structured
//! data:
//!
//! - [`tokenize`] / [`parse`]: split tokens into an optional command and
//!   subcommand, positional arguments, flags and `--name value` options
//!   ([`ParseResult`]).
//! - [`Schema`] / [`Bindable`]: declare, once per type, which option names
//!   populate which fields, with declarative [`Rule`]s.
//! - [`bind`]: populate and validate an instance, with lenient [`Coerce`]
//!   conversions for every supported value type.
//! - [`CommandRegistry`]: map command names to target types and dispatch.
//!
//! Validation outcome handling is explicit through [`ValidationPolicy`].
//!
//! # Example
//!
//! ```
//! use yaclap_core::*;
//!
//! #[derive(Debug, Default)]
//! struct Replace {
//!     source: String,
//!     destination: String,
//!     archive: bool,
//! }
//!
//! impl Bindable for Replace {
//!     fn schema() -> Schema<Self> {
//!         Schema::<Self>::new()
//!             .field("Archive", |r| &mut r.archive)
//!             .check(|r| {
//!                 if r.source.is_empty() {
//!                     Err("a source file is required".to_string())
//!                 } else {
//!                     Ok(())
//!                 }
//!             })
//!     }
//! }
//!
//! #[derive(Debug)]
//! enum FileCommand {
//!     Replace(Replace),
//! }
//!
//! impl From<Replace> for FileCommand {
//!     fn from(r: Replace) -> Self {
//!         FileCommand::Replace(r)
//!     }
//! }
//!
//! let registry = CommandRegistry::<FileCommand>::new([CommandMapping::with_mapper(
//!     "replace",
//!     |args, r: &mut Replace| {
//!         r.source = defaulting_index(args, 1, "").to_string();
//!         r.destination = defaulting_index(args, 2, "").to_string();
//!     },
//! )])
//! .unwrap();
//!
//! let FileCommand::Replace(cmd) =
//!     parse_command(to_args_array("replace|filename1|filename2|--archive"), &registry).unwrap();
//! assert_eq!(cmd.source, "filename1");
//! assert_eq!(cmd.destination, "filename2");
//! assert!(cmd.archive);
//!
//! let err = parse_command(["replace"], &registry).unwrap_err();
//! assert!(matches!(err, Error::Bind(BindError::Validation(_))));
//! ```

mod binder;
mod coerce;
mod error;
mod parser;
mod registry;
mod schema;
mod tokenize;
mod validate;

pub use binder::{Bound, bind, bind_into, bind_with};
pub use coerce::{Coerce, date_time_min, defaulting_index, to_args_array};
pub use error::{BindError, CommandError, Error, ParseError, RegistryError, Result};
pub use parser::{Parsed, Parser, parse, parse_as, parse_command, parse_typed};
pub use registry::{CommandMapping, CommandRegistry};
pub use schema::{Bindable, FieldInfo, FieldKind, FieldValue, Schema, schema_of};
pub use tokenize::{DEFAULT_PREFIX, FLAG_VALUE, ParseResult, ParserConfig, tokenize};
pub use validate::{Rule, ValidationFailure, ValidationPolicy, ValidationReport};
