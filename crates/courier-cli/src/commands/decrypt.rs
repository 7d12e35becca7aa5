use std::path::PathBuf;

use courier_lib::{cipher, wire};

use super::fail;
use super::input::{load_input, load_secret};

pub struct DecryptArgs {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub secret_env: String,
    pub compact: bool,
}

pub fn run(args: DecryptArgs) {
    let payload = load_input(args.input_path.as_deref(), args.input_text.as_deref())
        .unwrap_or_else(|msg| fail(msg));
    let secret = load_secret(&args.secret_env).unwrap_or_else(|msg| fail(msg));

    let text = cipher::decrypt(&payload, &secret).unwrap_or_else(|e| fail(e));
    let tree = wire::from_json(&text).unwrap_or_else(|e| fail(e));

    let output = if args.compact {
        wire::to_json(&tree)
    } else {
        wire::to_json_pretty(&tree)
    };
    println!("{}", output.unwrap_or_else(|e| fail(e)));
}
