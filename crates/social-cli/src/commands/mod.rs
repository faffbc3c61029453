//! Subcommand implementations
//!
//! Each subcommand opens the store from the shared configuration, builds an
//! engine command or query, and prints the result as JSON on stdout.

pub mod create;
pub mod delete;
pub mod demo;
pub mod link;
pub mod show;
pub mod sync;

use serde_json::Value;
use social_core::model::EntityRecord;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json(value: &Value) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn record_json(record: &EntityRecord) -> Result<Value, serde_json::Error> {
    serde_json::to_value(record)
}
