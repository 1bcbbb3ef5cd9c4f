//! Errors a tweak hook can report.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TweakError {
    #[error("{0}")]
    Custom(String),
}

pub type HookResult = Result<(), TweakError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TweakError::Custom("boom".to_string());
        assert_eq!(err.to_string(), "boom");
    }
}
