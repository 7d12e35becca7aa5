use std::fs;
use std::io::{self, Read};
use std::path::Path;

use courier_lib::SecretSource;

/// Inline text wins; otherwise the file, or stdin for `-` and no file.
pub fn load_input(path: Option<&Path>, text: Option<&str>) -> Result<String, String> {
    if let Some(text) = text {
        return Ok(text.to_owned());
    }
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {}", path.display(), e)),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

/// Validated secret from the environment variable `name`.
pub fn load_secret(name: &str) -> Result<String, String> {
    SecretSource::env(name)
        .resolve()
        .map_err(|e| format!("configuration error: {}", e))
}
