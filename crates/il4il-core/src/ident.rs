//! Identifier strings used for module and symbol names.
//!
//! An identifier is a UTF-8 string that is never empty and never contains an
//! interior `NUL` byte, which keeps names convertible to null-terminated
//! representations without escaping. The types here come in a borrowed/owned
//! pair: [`IdStr`] is to [`Ident`] what [`str`] is to [`String`]. Neither type
//! exposes mutation, so the invariants hold for the whole lifetime of a value.

use miette::Diagnostic;
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// Why a string was rejected as an identifier.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum IdentError {
    #[error("identifier must not be empty")]
    #[diagnostic(
        code("IDENT-001"),
        help("module and symbol names need at least one character")
    )]
    Empty,

    #[error("identifier must not contain NUL bytes")]
    #[diagnostic(
        code("IDENT-002"),
        help("remove embedded '\\0' characters before constructing the identifier")
    )]
    ContainsNul,
}

/// Why a byte or code-unit sequence could not be parsed into an identifier.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseIdentError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] IdentError),

    #[error("identifier must be valid UTF-8: {0}")]
    #[diagnostic(code("IDENT-003"))]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("identifier must be valid UTF-16")]
    #[diagnostic(code("IDENT-004"))]
    InvalidUtf16,
}

/// A borrowed identifier string slice.
///
/// Obtained from [`IdStr::new`] or by dereferencing an [`Ident`]. The unsized
/// representation lets containers hand out identifier views without copying.
#[derive(Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct IdStr(str);

impl IdStr {
    /// Checks that `text` satisfies the identifier invariants and borrows it.
    ///
    /// # Errors
    ///
    /// Fails with [`IdentError::Empty`] or [`IdentError::ContainsNul`].
    pub fn new(text: &str) -> Result<&Self, IdentError> {
        if text.is_empty() {
            Err(IdentError::Empty)
        } else if text.bytes().any(|b| b == 0) {
            Err(IdentError::ContainsNul)
        } else {
            // Safety: checked above
            Ok(unsafe { Self::new_unchecked(text) })
        }
    }

    /// Borrows `text` as an identifier without validating it.
    ///
    /// # Safety
    ///
    /// `text` must be non-empty and contain no `NUL` bytes.
    pub unsafe fn new_unchecked(text: &str) -> &Self {
        // Safety: repr(transparent) over str
        unsafe { &*(text as *const str as *const IdStr) }
    }

    /// Parses an identifier from raw bytes.
    pub fn from_utf8(bytes: &[u8]) -> Result<&Self, ParseIdentError> {
        Ok(Self::new(std::str::from_utf8(bytes)?)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The exact stored bytes. Always non-empty, NUL-free UTF-8.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present so slice-like call sites read naturally.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Copies the contents into an owned [`Ident`].
    pub fn to_ident(&self) -> Ident {
        Ident(self.0.to_owned())
    }
}

impl Deref for IdStr {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for IdStr {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IdStr {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl ToOwned for IdStr {
    type Owned = Ident;

    fn to_owned(&self) -> Ident {
        self.to_ident()
    }
}

impl fmt::Debug for IdStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for IdStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// An owned identifier string.
///
/// See [`IdStr`] for the invariants.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ident(String);

impl Ident {
    /// Validates `text` and takes ownership of it.
    ///
    /// # Errors
    ///
    /// Fails with [`IdentError::Empty`] or [`IdentError::ContainsNul`].
    pub fn new(text: String) -> Result<Self, IdentError> {
        IdStr::new(&text)?;
        Ok(Self(text))
    }

    /// Parses an identifier from raw bytes, taking ownership of the buffer.
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, ParseIdentError> {
        let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        Ok(Self::new(text).map_err(ParseIdentError::Invalid)?)
    }

    /// Decodes UTF-16 code units into an identifier.
    ///
    /// Binding layers for runtimes with UTF-16 strings construct names through
    /// this entry point.
    pub fn from_utf16(code_units: &[u16]) -> Result<Self, ParseIdentError> {
        let text = String::from_utf16(code_units).map_err(|_| ParseIdentError::InvalidUtf16)?;
        Ok(Self::new(text).map_err(ParseIdentError::Invalid)?)
    }

    pub fn as_id(&self) -> &IdStr {
        // Safety: contents were validated on construction and are immutable
        unsafe { IdStr::new_unchecked(&self.0) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Ident {
    type Target = IdStr;

    fn deref(&self) -> &IdStr {
        self.as_id()
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<IdStr> for Ident {
    fn as_ref(&self) -> &IdStr {
        self.as_id()
    }
}

impl Borrow<IdStr> for Ident {
    fn borrow(&self) -> &IdStr {
        self.as_id()
    }
}

impl Borrow<str> for Ident {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Ident {
    type Err = IdentError;

    fn from_str(text: &str) -> Result<Self, IdentError> {
        IdStr::new(text).map(IdStr::to_ident)
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_id(), f)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_id(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_valid_identifier_preserves_contents() {
        let id = IdStr::new("very_very_long_function_name").unwrap();
        assert_eq!(id.as_str(), "very_very_long_function_name");
        assert_eq!(id.as_bytes(), b"very_very_long_function_name");

        let owned = Ident::from_str("MyModuleName").unwrap();
        assert_eq!(owned.as_str(), "MyModuleName");
        assert_eq!(owned.len(), 12);
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        assert_eq!(IdStr::new(""), Err(IdentError::Empty));
        assert_eq!(Ident::new(String::new()), Err(IdentError::Empty));
        assert!(matches!(
            IdStr::from_utf8(&[]),
            Err(ParseIdentError::Invalid(IdentError::Empty))
        ));
    }

    #[test]
    fn test_nul_bytes_are_rejected() {
        assert_eq!(IdStr::new("\0"), Err(IdentError::ContainsNul));
        assert_eq!(IdStr::new("ab\0cd"), Err(IdentError::ContainsNul));
        assert!(matches!(
            Ident::from_utf8(vec![b'a', 0, b'b']),
            Err(ParseIdentError::Invalid(IdentError::ContainsNul))
        ));
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        assert!(matches!(
            IdStr::from_utf8(&[0xFF, 0xFE]),
            Err(ParseIdentError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_from_utf16() {
        let units: Vec<u16> = "módulo".encode_utf16().collect();
        assert_eq!(Ident::from_utf16(&units).unwrap().as_str(), "módulo");

        // Unpaired surrogate
        assert_eq!(Ident::from_utf16(&[0xD800]), Err(ParseIdentError::InvalidUtf16));
        assert!(matches!(
            Ident::from_utf16(&[]),
            Err(ParseIdentError::Invalid(IdentError::Empty))
        ));
    }

    #[test]
    fn test_non_ascii_contents_round_trip() {
        let text = "名前";
        let id = Ident::from_utf8(text.as_bytes().to_vec()).unwrap();
        assert_eq!(id.as_bytes(), text.as_bytes());
    }

    #[test]
    fn test_equality_is_bytewise() {
        let a = Ident::from_str("same").unwrap();
        let b = IdStr::new("same").unwrap();
        assert_eq!(a.as_id(), b);
        assert_ne!(a.as_id(), IdStr::new("Same").unwrap());
    }
}
