//! The error type shared by all handle operations.

use il4il_core::validate::{BrowseError, ValidateError};
use miette::Diagnostic;
use thiserror::Error;

/// Any failure observable through a handle.
///
/// Core errors pass through transparently so their diagnostic codes and
/// messages survive the trip; the handle layer adds only the two lifecycle
/// failures of its own.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum HandleError {
    /// The slot behind the handle was already consumed by validation or an
    /// explicit dispose.
    #[error("handle has already been consumed or disposed")]
    #[diagnostic(
        code("HANDLE-001"),
        help("a builder is gone after validate or dispose; create a new one")
    )]
    Consumed,

    /// A metadata read raced the last drop of its owning browser.
    #[error("the browser backing this metadata handle has been dropped")]
    #[diagnostic(
        code("HANDLE-002"),
        help("keep a clone of the browser alive for as long as entry handles are in use")
    )]
    BrowserDropped,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Browse(#[from] BrowseError),

    #[error(transparent)]
    #[diagnostic(code("HANDLE-003"))]
    Io(#[from] std::io::Error),
}
