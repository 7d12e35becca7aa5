use std::io::IsTerminal;

use courier_lib::Colors;

mod args;
mod commands;
mod dispatch;

#[cfg(test)]
mod dispatch_tests;

pub use commands::build_cli;
pub use dispatch::{CheckSecretParams, DecryptParams, DumpParams, EncryptParams, verbosity};

/// When `dump` colors its tree view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Only when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stdout().is_terminal(),
        }
    }
}

impl From<ColorChoice> for Colors {
    fn from(choice: ColorChoice) -> Self {
        Colors::new(choice.enabled())
    }
}
