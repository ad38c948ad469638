//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A component was used outside its valid lifecycle window, e.g. an item
    /// list manager operated on after `destroy`. Always a programmer error,
    /// so callers must not swallow it.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// Represents an I/O error, typically from invoking the VCS backend.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// The VCS backend produced output this crate could not interpret.
    #[error("unparseable status output: {0}")]
    StatusParse(String),
}
