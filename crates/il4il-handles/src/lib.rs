//! Shared-ownership handle surface over [`il4il_core`].
//!
//! The core crate moves values around the way Rust likes: validation takes the
//! builder by value, browse views borrow. Binding layers for managed runtimes
//! cannot express that; they hold every object behind an opaque, long-lived,
//! possibly-shared handle and call in from any thread. This crate is the
//! bridge:
//!
//! - [`ModuleHandle`] keeps the builder in a mutex-guarded slot. Mutation is
//!   serialized internally, and the validate step is an atomic take: exactly
//!   one caller wins the builder, every later operation observes
//!   [`HandleError::Consumed`].
//! - [`BrowserHandle`] shares a validated module by reference counting;
//!   cloning is cheap and every clone is an independent reader.
//! - [`MetadataHandle`] is a back-reference (weak pointer plus index) into a
//!   browser, never an owner; reads re-check that the browser is still alive
//!   and fail loudly with [`HandleError::BrowserDropped`] after the last
//!   reader is gone.
//! - [`ErrorMessage`] carries a failure as an owned UTF-8 buffer, the shape
//!   foreign callers read error text in.
//!
//! Disposal is explicit and detectable: disposing a slot twice reports
//! [`HandleError::Consumed`] rather than doing anything undefined.

mod browser;
mod error;
mod message;
mod module;
mod slot;

pub use browser::{BrowserHandle, MetadataHandle};
pub use error::HandleError;
pub use message::ErrorMessage;
pub use module::ModuleHandle;
pub use slot::Slot;
