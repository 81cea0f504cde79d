//! Errors raised while binding exercises to page markup.

/// Error building or locating an exercise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraderError {
    /// The container's kind tag is not a known exercise kind.
    UnknownKind(String),
    /// No exercise container encloses the element.
    NoExercise,
    /// A required attribute is absent.
    MissingAttribute(&'static str),
    /// The host environment (window, document) is unavailable.
    Environment(String),
}

impl std::fmt::Display for GraderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraderError::UnknownKind(kind) => write!(f, "Unknown exercise kind: {}", kind),
            GraderError::NoExercise => write!(f, "Element is not inside an exercise"),
            GraderError::MissingAttribute(attr) => write!(f, "Missing attribute: {}", attr),
            GraderError::Environment(e) => write!(f, "Environment error: {}", e),
        }
    }
}

impl std::error::Error for GraderError {}
