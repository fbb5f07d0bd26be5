//! Command dispatch example.
//!
//! Registers four file commands (`add`, `update`, `replace`, `delete`), maps
//! their positional arguments onto fields and dispatches invocations with
//! fail-fast validation.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p yaclap-demos --example file_commands
//! cargo run -p yaclap-demos --example file_commands -- replace a.txt b.txt --archive
//! ```
//!
//! Without arguments a few sample invocations are dispatched.

use yaclap_core::{
    Bindable, CommandMapping, CommandRegistry, Schema, defaulting_index, parse_command,
    to_args_array,
};

#[derive(Debug, Default)]
struct Add {
    filename: String,
    key: String,
    debug: bool,
}

impl Bindable for Add {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field("Key", |c| &mut c.key)
            .required()
            .field("Debug", |c| &mut c.debug)
    }
}

#[derive(Debug, Default)]
struct Update {
    filename: String,
    key: String,
}

impl Bindable for Update {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().field("Key", |c| &mut c.key)
    }
}

#[derive(Debug, Default)]
struct Replace {
    source: String,
    destination: String,
    archive: bool,
}

impl Bindable for Replace {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field("Archive", |c| &mut c.archive)
            .check(|c| {
                if c.source.is_empty() || c.destination.is_empty() {
                    Err("replace needs a source and a destination file".to_string())
                } else {
                    Ok(())
                }
            })
    }
}

#[derive(Debug, Default)]
struct Delete {
    filename: String,
    confirm: bool,
}

impl Bindable for Delete {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field("Filename", |c| &mut c.filename)
            .required()
            .field("Confirm", |c| &mut c.confirm)
    }
}

#[derive(Debug)]
enum FileCommand {
    Add(Add),
    Update(Update),
    Replace(Replace),
    Delete(Delete),
}

impl From<Add> for FileCommand {
    fn from(c: Add) -> Self {
        FileCommand::Add(c)
    }
}

impl From<Update> for FileCommand {
    fn from(c: Update) -> Self {
        FileCommand::Update(c)
    }
}

impl From<Replace> for FileCommand {
    fn from(c: Replace) -> Self {
        FileCommand::Replace(c)
    }
}

impl From<Delete> for FileCommand {
    fn from(c: Delete) -> Self {
        FileCommand::Delete(c)
    }
}

fn registry() -> CommandRegistry<FileCommand> {
    CommandRegistry::new([
        CommandMapping::with_mapper("add", |args, c: &mut Add| {
            c.filename = defaulting_index(args, 1, "").to_string();
        }),
        CommandMapping::with_mapper("update", |args, c: &mut Update| {
            c.filename = defaulting_index(args, 1, "").to_string();
        }),
        CommandMapping::with_mapper("replace", |args, c: &mut Replace| {
            c.source = defaulting_index(args, 1, "").to_string();
            c.destination = defaulting_index(args, 2, "").to_string();
        }),
        CommandMapping::with_mapper("delete", |args, c: &mut Delete| {
            c.filename = defaulting_index(args, 1, "").to_string();
        }),
    ])
    .expect("command names are unique")
}

fn execute(command: &FileCommand) {
    match command {
        FileCommand::Add(c) => println!("  add '{}' with key '{}' (debug: {})", c.filename, c.key, c.debug),
        FileCommand::Update(c) => println!("  update '{}' with key '{}'", c.filename, c.key),
        FileCommand::Replace(c) => println!(
            "  replace '{}' with '{}'{}",
            c.source,
            c.destination,
            if c.archive { ", archiving the original" } else { "" }
        ),
        FileCommand::Delete(c) if c.confirm => println!("  delete '{}'", c.filename),
        FileCommand::Delete(c) => println!("  would delete '{}' (pass --confirm)", c.filename),
    }
}

fn main() {
    let registry = registry();

    let given: Vec<String> = std::env::args().skip(1).collect();
    let invocations = if given.is_empty() {
        [
            "add|notes.txt|--key|k-1|--debug",
            "update|notes.txt|--key|k-2",
            "replace|old.txt|new.txt|--archive",
            "delete|old.txt",
            "delete",
            "replace|old.txt|--archive|new.txt",
            "rename|a.txt|b.txt",
        ]
        .iter()
        .map(|line| to_args_array(line))
        .collect()
    } else {
        vec![given]
    };

    for tokens in invocations {
        println!("$ {}", tokens.join(" "));
        match parse_command(&tokens, &registry) {
            Ok(command) => execute(&command),
            Err(err) => println!("  error: {err}"),
        }
    }
}
