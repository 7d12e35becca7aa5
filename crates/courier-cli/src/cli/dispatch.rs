//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check_secret::CheckSecretArgs;
use crate::commands::decrypt::DecryptArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::encrypt::EncryptArgs;

pub struct EncryptParams {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub secret_env: String,
}

impl EncryptParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            secret_env: parse_secret_env(m),
        }
    }
}

impl From<EncryptParams> for EncryptArgs {
    fn from(p: EncryptParams) -> Self {
        Self {
            input_path: p.input_path,
            input_text: p.input_text,
            secret_env: p.secret_env,
        }
    }
}

pub struct DecryptParams {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub secret_env: String,
    pub compact: bool,
}

impl DecryptParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            secret_env: parse_secret_env(m),
            compact: m.get_flag("compact"),
        }
    }
}

impl From<DecryptParams> for DecryptArgs {
    fn from(p: DecryptParams) -> Self {
        Self {
            input_path: p.input_path,
            input_text: p.input_text,
            secret_env: p.secret_env,
            compact: p.compact,
        }
    }
}

pub struct DumpParams {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub encrypted: bool,
    pub secret_env: String,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            input_path: m.get_one::<PathBuf>("input_path").cloned(),
            input_text: m.get_one::<String>("input_text").cloned(),
            encrypted: m.get_flag("encrypted"),
            secret_env: parse_secret_env(m),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            input_path: p.input_path,
            input_text: p.input_text,
            encrypted: p.encrypted,
            secret_env: p.secret_env,
            colors: p.color.into(),
        }
    }
}

pub struct CheckSecretParams {
    pub secret_env: String,
}

impl CheckSecretParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            secret_env: parse_secret_env(m),
        }
    }
}

impl From<CheckSecretParams> for CheckSecretArgs {
    fn from(p: CheckSecretParams) -> Self {
        Self {
            secret_env: p.secret_env,
        }
    }
}

/// Number of `-v` flags given anywhere on the command line.
pub fn verbosity(m: &ArgMatches) -> u8 {
    m.get_count("verbose")
}

fn parse_secret_env(m: &ArgMatches) -> String {
    m.get_one::<String>("secret_env")
        .cloned()
        .unwrap_or_else(|| courier_lib::DEFAULT_SECRET_ENV.to_owned())
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
