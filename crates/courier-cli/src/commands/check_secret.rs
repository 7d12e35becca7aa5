use super::fail;
use super::input::load_secret;

pub struct CheckSecretArgs {
    pub secret_env: String,
}

pub fn run(args: CheckSecretArgs) {
    load_secret(&args.secret_env).unwrap_or_else(|msg| fail(msg));
    println!("secret in `{}` is valid", args.secret_env);
}
