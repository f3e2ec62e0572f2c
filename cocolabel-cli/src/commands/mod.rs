//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Full run: fetch, filter, build manifest, publish.
pub mod prepare;

pub mod filter;

pub mod manifest;

use cocolabel_core::{MissingCategoryPolicy, OutputPolicy};

pub(crate) fn missing_policy(allow_missing: bool) -> MissingCategoryPolicy {
    if allow_missing {
        MissingCategoryPolicy::ProceedWithSubset
    } else {
        MissingCategoryPolicy::Abort
    }
}

pub(crate) fn output_policy(force: bool) -> OutputPolicy {
    if force {
        OutputPolicy::Overwrite
    } else {
        OutputPolicy::Fail
    }
}
