//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};
use courier_lib::DEFAULT_SECRET_ENV;

/// Input file (positional). `-` or no file reads stdin.
pub fn input_path_arg() -> Arg {
    Arg::new("input_path")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .conflicts_with("input_text")
        .help("Input file (reads stdin when omitted)")
}

/// Inline input (-t/--text).
pub fn input_text_arg() -> Arg {
    Arg::new("input_text")
        .short('t')
        .long("text")
        .value_name("TEXT")
        .help("Inline input text")
}

/// Environment variable holding the secret (--secret-env).
pub fn secret_env_arg() -> Arg {
    Arg::new("secret_env")
        .long("secret-env")
        .value_name("NAME")
        .default_value(DEFAULT_SECRET_ENV)
        .help("Environment variable holding the shared secret")
}

/// Output compact JSON (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON")
}

/// Input is an encrypted payload (--encrypted).
pub fn encrypted_arg() -> Arg {
    Arg::new("encrypted")
        .long("encrypted")
        .action(ArgAction::SetTrue)
        .help("Input is an encrypted payload rather than tree JSON")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Verbosity level (-v, -vv), accepted by every subcommand.
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .global(true)
        .help("Log verbosity (-v info, -vv debug, -vvv trace)")
}
