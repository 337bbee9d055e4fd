//! CLI subcommand implementations for the montax binary.

pub mod inspect_cmd;
pub mod search_cmd;
