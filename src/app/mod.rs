pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::{execute, run};
