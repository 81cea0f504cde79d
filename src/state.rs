//! Application state shared by all handlers.

use std::path::PathBuf;
use std::sync::Arc;

use crate::content::LessonLibrary;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Lessons loaded at startup (read-only afterwards)
    pub library: Arc<LessonLibrary>,

    /// Directory served under /static
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(library: LessonLibrary, static_dir: PathBuf) -> Self {
        Self {
            library: Arc::new(library),
            static_dir,
        }
    }
}
