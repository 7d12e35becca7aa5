pub mod check_secret;
pub mod decrypt;
pub mod dump;
pub mod encrypt;
pub mod input;

#[cfg(test)]
mod input_tests;

use std::fmt::Display;

/// Report `err` on stderr and exit with status 1.
pub fn fail(err: impl Display) -> ! {
    eprintln!("error: {err}");
    std::process::exit(1);
}
