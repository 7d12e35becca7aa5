//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("courier")
        .about("Encrypt, decrypt and inspect portable predicate trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(encrypt_command())
        .subcommand(decrypt_command())
        .subcommand(dump_command())
        .subcommand(check_secret_command())
}

/// Encrypt a portable tree document.
pub fn encrypt_command() -> Command {
    Command::new("encrypt")
        .about("Encrypt a portable tree JSON document")
        .after_help(
            r#"EXAMPLES:
  courier encrypt tree.json
  courier encrypt -t '{"version":1,"root":...}'
  courier encrypt tree.json --secret-env ORDERS_SECRET"#,
        )
        .arg(input_path_arg())
        .arg(input_text_arg())
        .arg(secret_env_arg())
}

/// Decrypt a payload back to tree JSON.
pub fn decrypt_command() -> Command {
    Command::new("decrypt")
        .about("Decrypt a payload to portable tree JSON")
        .after_help(
            r#"EXAMPLES:
  courier decrypt payload.txt
  courier decrypt -t 'q0Jd...' --compact"#,
        )
        .arg(input_path_arg())
        .arg(input_text_arg())
        .arg(secret_env_arg())
        .arg(compact_arg())
}

/// Show a tree as an indented node listing.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show a portable tree as an indented node listing")
        .after_help(
            r#"EXAMPLES:
  courier dump tree.json
  courier dump payload.txt --encrypted
  courier dump tree.json --color never"#,
        )
        .arg(input_path_arg())
        .arg(input_text_arg())
        .arg(encrypted_arg())
        .arg(secret_env_arg())
        .arg(color_arg())
}

/// Check the configured secret against the strength policy.
pub fn check_secret_command() -> Command {
    Command::new("check-secret")
        .about("Check the configured secret against the strength policy")
        .arg(secret_env_arg())
}
