//! Reading and writing of the binary module layout.
//!
//! The layout, in stream order:
//!
//! 1. [`MAGIC`], six fixed bytes.
//! 2. Format version, two raw bytes (major, minor).
//! 3. A varint section count, then each section as: one kind-tag byte, a
//!    varint byte length of the body, then the body itself. The length prefix
//!    lets a reader skip section kinds introduced by later format revisions.
//! 4. A metadata section body is a varint entry count followed by entries,
//!    each a kind-tag byte and a kind-specific payload. A `Name` payload is a
//!    length-prefixed identifier followed by one reserved varint that must be
//!    zero.
//!
//! [`Module::write_to`] and [`Module::read_from`] are the entry points;
//! [`writer`] and [`reader`] hold the per-construct routines.
//!
//! [`Module::write_to`]: crate::module::Module::write_to
//! [`Module::read_from`]: crate::module::Module::read_from

pub(crate) mod reader;
pub(crate) mod writer;

pub use reader::DecodeError;

/// The signature at the start of every encoded module.
pub const MAGIC: &[u8; 6] = b"IL4IL\0";
