// ============================================================================
// cocolabel-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// This module provides error handling utilities for the CLI that integrate
// with the cocolabel-core error types while adding CLI-specific error
// contexts, plus the hints shown to the operator when a command fails.
//
// KEY COMPONENTS:
// - CliResult: Type alias for CLI operations
// - CliErrorContext: Context extension for collaborator results
// - suggestion_for: Operator hint for a failed run

// ---- Internal crate imports ----
use cocolabel_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for adding context to errors in the CLI.
///
/// Works like anyhow's `context` but keeps the error a `CoreError`, so every
/// command still returns a `CliResult`.
pub trait CliErrorContext<T> {
    /// Wraps the error as `OperationFailed` with `context` prepended.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", context, core_error))
        })
    }
}

/// Returns a hint for errors the operator can fix by changing the invocation.
pub fn suggestion_for(error: &CoreError) -> Option<String> {
    match error {
        CoreError::UnknownCategories(_) => Some(
            "Check the spelling against the dataset's category names, or pass --allow-missing"
                .to_string(),
        ),
        CoreError::OutputExists(_) => Some("Pass --force to replace existing output".to_string()),
        CoreError::InputNotFound(_) => {
            Some("Check the path, or drop --no-download to fetch the dataset".to_string())
        }
        CoreError::ChecksumMismatch { .. } | CoreError::Archive(_) => {
            Some("Delete the archive or pass --overwrite to download it again".to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn context_wraps_the_core_message() {
        let result: Result<(), CoreError> = Err(CoreError::InputNotFound(PathBuf::from("x.json")));
        let err = result.cli_context("Loading dataset").unwrap_err();
        assert_eq!(err.to_string(), "Loading dataset: Input not found: x.json");
    }

    #[test]
    fn context_passes_success_through() {
        let result: Result<u8, CoreError> = Ok(7);
        assert_eq!(result.cli_context("unused").unwrap(), 7);
    }

    #[test]
    fn user_errors_carry_a_suggestion() {
        let err = CoreError::UnknownCategories(vec!["dragon".to_string()]);
        assert!(suggestion_for(&err).unwrap().contains("--allow-missing"));
        assert!(suggestion_for(&CoreError::Config("x".to_string())).is_none());
    }
}
