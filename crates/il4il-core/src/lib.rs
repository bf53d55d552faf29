//! Core engine for the IL4IL module container format.
//!
//! This crate is responsible for:
//! - Building in-memory modules out of metadata and (eventually) other declarations
//! - Encoding modules into the versioned IL4IL binary layout and decoding them back
//! - Validating a built module into an immutable, browseable view
//! - Enforcing the identifier invariants (non-empty, NUL-free UTF-8) everywhere names appear
//!
//! ## Lifecycle
//!
//! A [`Module`] is the mutable builder. It can be serialized any number of times
//! without being consumed, or handed to [`ValidModule::validate`] exactly once,
//! which takes it by value and produces the read-only browse view. Decoding bytes
//! with [`Module::read_from`] yields a builder again; browsing always goes
//! through validation.
//!
//! ## Errors
//!
//! Every fallible operation returns a dedicated error type deriving
//! [`thiserror::Error`] and [`miette::Diagnostic`], so callers can surface
//! failures with stable diagnostic codes and help text.

pub mod binary;
pub mod ident;
pub mod module;
pub mod section;
pub mod validate;
pub mod varint;
pub mod version;

pub use ident::{IdStr, Ident};
pub use module::Module;
pub use section::{Metadata, MetadataKind, ModuleName, Section, SectionKind};
pub use validate::{BrowseError, ValidModule, ValidateError, ValidationRules};
pub use version::{FormatVersion, SupportedVersion};
