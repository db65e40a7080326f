use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SectionError>;

/// Every error here is recoverable: callers keep their previous state and
/// carry on. Missed picks and empty inputs are not errors at all.
#[derive(Debug, Error)]
pub enum SectionError {
    /// Two-point plane derivation could not produce a normal.
    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: &'static str },

    #[error("expected {expected} points, found {found}")]
    PointCount { expected: usize, found: usize },

    #[error("failed to read mesh: {0}")]
    Io(#[from] io::Error),

    #[error("invalid mesh data: {0}")]
    MeshFormat(String),
}

impl SectionError {
    pub const fn degenerate(reason: &'static str) -> Self {
        Self::DegenerateInput { reason }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::DegenerateInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = SectionError::degenerate("coincident points");
        assert_eq!(err.to_string(), "degenerate input: coincident points");
        assert!(err.is_degenerate());

        let err = SectionError::PointCount {
            expected: 2,
            found: 3,
        };
        assert_eq!(err.to_string(), "expected 2 points, found 3");
        assert!(!err.is_degenerate());
    }
}
