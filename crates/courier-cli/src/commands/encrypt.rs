use std::path::PathBuf;

use courier_lib::{cipher, wire};

use super::fail;
use super::input::{load_input, load_secret};

pub struct EncryptArgs {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub secret_env: String,
}

pub fn run(args: EncryptArgs) {
    let text = load_input(args.input_path.as_deref(), args.input_text.as_deref())
        .unwrap_or_else(|msg| fail(msg));

    // Parse first so only well-formed trees are ever encrypted.
    let tree = wire::from_json(&text).unwrap_or_else(|e| fail(e));
    let compact = wire::to_json(&tree).unwrap_or_else(|e| fail(e));

    let secret = load_secret(&args.secret_env).unwrap_or_else(|msg| fail(msg));
    let payload = cipher::encrypt(&compact, &secret).unwrap_or_else(|e| fail(e));
    tracing::info!(bytes = compact.len(), "tree encrypted");
    println!("{payload}");
}
