//! Typed binding example.
//!
//! Shows the three ways of reading an invocation:
//!
//! 1. the raw [`ParseResult`](yaclap_core::ParseResult), printed as JSON;
//! 2. binding onto a single options type with report-only validation;
//! 3. picking the target among several types by command/subcommand name.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p yaclap-demos --example typed_options
//! ```

use chrono::NaiveDateTime;
use yaclap_core::{
    Bindable, CommandMapping, CommandRegistry, Rule, Schema, parse, parse_as, parse_typed,
    to_args_array,
};

#[derive(Debug, Default)]
struct ScheduleOptions {
    name: String,
    retries: u32,
    start: NaiveDateTime,
    owner: Option<String>,
    dry_run: bool,
}

impl Bindable for ScheduleOptions {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field("Name", |o| &mut o.name)
            .with_rule(Rule::required().with_message("Name option is required"))
            .with_rule(Rule::length(0, 16))
            .field("Retries", |o| &mut o.retries)
            .with_rule(Rule::range(0.0, 5.0))
            .field("Start", |o| &mut o.start)
            .field("Owner", |o| &mut o.owner)
            .field("DryRun", |o| &mut o.dry_run)
    }
}

#[derive(Debug, Default)]
struct Cmd1SubCmd1 {
    flag1: bool,
    option1: String,
}

impl Bindable for Cmd1SubCmd1 {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new()
            .field("Flag1", |c| &mut c.flag1)
            .field("Option1", |c| &mut c.option1)
    }
}

#[derive(Debug, Default)]
struct Cmd2SubCmd1 {
    option2: i32,
}

impl Bindable for Cmd2SubCmd1 {
    fn schema() -> Schema<Self> {
        Schema::<Self>::new().field("Option2", |c| &mut c.option2)
    }
}

#[derive(Debug)]
enum Spike {
    One(Cmd1SubCmd1),
    Two(Cmd2SubCmd1),
}

impl From<Cmd1SubCmd1> for Spike {
    fn from(c: Cmd1SubCmd1) -> Self {
        Spike::One(c)
    }
}

impl From<Cmd2SubCmd1> for Spike {
    fn from(c: Cmd2SubCmd1) -> Self {
        Spike::Two(c)
    }
}

fn main() {
    println!("== raw parse ==");
    let parsed = parse(to_args_array("remote|add|origin|--verbose|--url|https://example.com")).unwrap();
    println!("{}", serde_json::to_string_pretty(&parsed).unwrap());
    println!();

    println!("== single type ==");
    for line in [
        "--name|nightly|--retries|3|--start|2024-03-01 02:00|--dryrun",
        "--name|a-name-that-is-far-too-long|--retries|9",
        "--owner|ops",
    ] {
        let parsed = parse_as::<ScheduleOptions, _>(to_args_array(line)).unwrap();
        println!("$ {}", line.replace('|', " "));
        println!("  {:?}", parsed.data());
        if parsed.has_errors() {
            for message in parsed.errors().lines() {
                println!("  invalid: {message}");
            }
        }
    }
    println!();

    println!("== resolved by type name ==");
    let registry = CommandRegistry::<Spike>::new([
        CommandMapping::of::<Cmd1SubCmd1>(),
        CommandMapping::of::<Cmd2SubCmd1>(),
    ])
    .unwrap();
    for line in [
        "cmd1|subcmd1|--flag1|--option1|value1",
        "cmd2|subcmd1|--option2|42",
        "cmd3|subcmd1",
    ] {
        println!("$ {}", line.replace('|', " "));
        match parse_typed(to_args_array(line), &registry) {
            Ok(parsed) => println!("  {:?}", parsed.data()),
            Err(err) => println!("  error: {err}"),
        }
    }
}
