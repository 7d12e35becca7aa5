//! Tests for CLI dispatch logic.

use std::path::PathBuf;

use super::*;
use courier_lib::Colors;

use crate::cli::commands::{check_secret_command, decrypt_command, dump_command, encrypt_command};
use crate::commands::dump::DumpArgs;

#[test]
fn encrypt_reads_file_or_text() {
    let m = encrypt_command()
        .try_get_matches_from(["encrypt", "tree.json"])
        .unwrap();
    let params = EncryptParams::from_matches(&m);
    assert_eq!(params.input_path, Some(PathBuf::from("tree.json")));
    assert_eq!(params.input_text, None);

    let m = encrypt_command()
        .try_get_matches_from(["encrypt", "-t", "{}"])
        .unwrap();
    let params = EncryptParams::from_matches(&m);
    assert_eq!(params.input_path, None);
    assert_eq!(params.input_text.as_deref(), Some("{}"));
}

#[test]
fn file_and_text_conflict() {
    let result = encrypt_command().try_get_matches_from(["encrypt", "tree.json", "-t", "{}"]);

    assert!(result.is_err());
}

#[test]
fn secret_env_has_default() {
    let m = check_secret_command()
        .try_get_matches_from(["check-secret"])
        .unwrap();
    assert_eq!(
        CheckSecretParams::from_matches(&m).secret_env,
        "COURIER_SECRET_KEY"
    );

    let m = check_secret_command()
        .try_get_matches_from(["check-secret", "--secret-env", "ORDERS_SECRET"])
        .unwrap();
    assert_eq!(CheckSecretParams::from_matches(&m).secret_env, "ORDERS_SECRET");
}

#[test]
fn decrypt_compact_flag() {
    let m = decrypt_command()
        .try_get_matches_from(["decrypt", "payload.txt", "--compact"])
        .unwrap();
    let params = DecryptParams::from_matches(&m);

    assert!(params.compact);
    assert_eq!(params.input_path, Some(PathBuf::from("payload.txt")));
}

#[test]
fn dump_color_and_encrypted() {
    let m = dump_command()
        .try_get_matches_from(["dump", "payload.txt", "--encrypted", "--color", "never"])
        .unwrap();
    let params = DumpParams::from_matches(&m);

    assert!(params.encrypted);
    assert_eq!(params.color, ColorChoice::Never);

    let m = dump_command().try_get_matches_from(["dump"]).unwrap();
    let params = DumpParams::from_matches(&m);
    assert!(!params.encrypted);
    assert_eq!(params.color, ColorChoice::Auto);
}

#[test]
fn color_choice_selects_palette() {
    let colors_for = |when: &str| {
        let m = dump_command()
            .try_get_matches_from(["dump", "--color", when])
            .unwrap();
        DumpArgs::from(DumpParams::from_matches(&m)).colors
    };

    assert_eq!(colors_for("always"), Colors::ANSI);
    assert_eq!(colors_for("never"), Colors::PLAIN);
    assert!(!colors_for("never").is_enabled());
}

#[test]
fn dump_rejects_unknown_color() {
    let result = dump_command().try_get_matches_from(["dump", "--color", "sometimes"]);

    assert!(result.is_err());
}

#[test]
fn verbose_is_global() {
    let matches = build_cli()
        .try_get_matches_from(["courier", "decrypt", "-vv", "payload.txt"])
        .unwrap();
    let (name, m) = matches.subcommand().unwrap();

    assert_eq!(name, "decrypt");
    assert_eq!(verbosity(m), 2);
}

#[test]
fn subcommand_is_required() {
    let result = build_cli().try_get_matches_from(["courier"]);

    assert!(result.is_err());
}

#[test]
fn cli_definition_is_consistent() {
    build_cli().debug_assert();
}
