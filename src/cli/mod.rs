//! Command-line interface: `show`, `list`, `export`, `fork` and `replays`

pub mod commands;

pub use commands::{Cli, Commands, run};
