//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `LESSONS_DIR`, `PORT`: see config.rs
//!
//! ```bash
//! DATA_DIR=data/test PORT=3001 cargo run
//! ```

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Lesson JSON files
pub fn lessons_dir() -> String {
    format!("{}/lessons", data_dir())
}

/// Static assets served under /static - not under DATA_DIR
pub const STATIC_DIR: &str = "static";

/// wasm-pack output for the grader, inside the static directory
pub const GRADER_PKG_DIR: &str = "static/pkg";

/// JS glue emitted by wasm-pack for the grader
pub const GRADER_JS: &str = "static/pkg/exercise_grader.js";

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    // DATA_DIR is read once through OnceLock, so only defaults are checked.

    #[test]
    fn test_data_dir_default() {
        let dir = data_dir();
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_lessons_dir_format() {
        let path = lessons_dir();
        assert!(path.ends_with("/lessons"));
    }

    #[test]
    fn test_grader_paths_under_static() {
        assert!(GRADER_PKG_DIR.starts_with(STATIC_DIR));
        assert!(GRADER_JS.starts_with(GRADER_PKG_DIR));
    }
}
