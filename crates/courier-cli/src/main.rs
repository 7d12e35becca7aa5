mod cli;
mod commands;

use cli::{CheckSecretParams, DecryptParams, DumpParams, EncryptParams, build_cli, verbosity};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = build_cli().get_matches();

    let Some((name, m)) = matches.subcommand() else {
        commands::fail("a subcommand is required");
    };
    init_tracing(verbosity(m));

    match name {
        "encrypt" => commands::encrypt::run(EncryptParams::from_matches(m).into()),
        "decrypt" => commands::decrypt::run(DecryptParams::from_matches(m).into()),
        "dump" => commands::dump::run(DumpParams::from_matches(m).into()),
        "check-secret" => commands::check_secret::run(CheckSecretParams::from_matches(m).into()),
        other => commands::fail(format!("unknown subcommand `{other}`")),
    }
}

/// Logs go to stderr. `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
