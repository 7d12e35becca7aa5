use std::path::Path;

use super::input::{load_input, load_secret};

#[test]
fn inline_text_wins() {
    let text = load_input(Some(Path::new("missing.json")), Some("{}")).unwrap();

    assert_eq!(text, "{}");
}

#[test]
fn missing_file_is_reported() {
    let err = load_input(Some(Path::new("definitely/missing.json")), None).unwrap_err();

    assert!(err.starts_with("failed to read 'definitely/missing.json'"), "{err}");
}

#[test]
fn unset_secret_variable_is_reported() {
    let err = load_secret("COURIER_CLI_SECRET_THAT_IS_NEVER_SET").unwrap_err();

    assert_eq!(
        err,
        "configuration error: secret variable `COURIER_CLI_SECRET_THAT_IS_NEVER_SET` is not set"
    );
}
