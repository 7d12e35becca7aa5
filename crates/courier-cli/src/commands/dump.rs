use std::path::PathBuf;

use courier_lib::{Colors, cipher, dump, wire};

use super::fail;
use super::input::{load_input, load_secret};

pub struct DumpArgs {
    pub input_path: Option<PathBuf>,
    pub input_text: Option<String>,
    pub encrypted: bool,
    pub secret_env: String,
    pub colors: Colors,
}

pub fn run(args: DumpArgs) {
    let input = load_input(args.input_path.as_deref(), args.input_text.as_deref())
        .unwrap_or_else(|msg| fail(msg));

    let text = if args.encrypted {
        let secret = load_secret(&args.secret_env).unwrap_or_else(|msg| fail(msg));
        cipher::decrypt(&input, &secret).unwrap_or_else(|e| fail(e))
    } else {
        input
    };

    let tree = wire::from_json(&text).unwrap_or_else(|e| fail(e));
    print!("{}", dump(&tree, args.colors));
}
