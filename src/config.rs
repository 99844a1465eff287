// ABOUTME: Version constants, REPL banner text, and file-sandbox configuration

use std::path::PathBuf;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "Brew interpreter";
pub const WELCOME_HINT: &str = "Type a statement to run it, Ctrl-D to exit.";

/// Filesystem sandbox configuration for the `file` built-ins.
#[derive(Debug, Clone)]
pub struct FsConfig {
    pub allowed_paths: Vec<PathBuf>,
    pub max_file_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            allowed_paths: vec![PathBuf::from("./data")],
            // 10 MiB write cap
            max_file_size: 10 * 1024 * 1024,
        }
    }
}
