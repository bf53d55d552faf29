//! Owned error-message buffers for foreign callers.

use std::fmt;

/// A failure carried as an owned UTF-8 byte buffer.
///
/// Binding layers read errors as "length, then bytes"; this type is that
/// shape. Any displayable error converts into one, and callbacks coming from
/// UTF-16 runtimes can allocate one directly from their native strings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ErrorMessage(String);

impl ErrorMessage {
    /// Captures the rendered form of any displayable failure.
    pub fn new(error: impl fmt::Display) -> Self {
        Self(error.to_string())
    }

    /// Builds a message from UTF-16 code units, replacing unpaired surrogates
    /// rather than failing; an error report must always be constructible.
    pub fn from_utf16(code_units: &[u16]) -> Self {
        Self(String::from_utf16_lossy(code_units))
    }

    /// Length of the message in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The UTF-8 contents, ready to copy into a caller-supplied buffer.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<crate::error::HandleError> for ErrorMessage {
    fn from(error: crate::error::HandleError) -> Self {
        Self::new(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandleError;

    #[test]
    fn test_message_preserves_error_text() {
        let message = ErrorMessage::from(HandleError::Consumed);
        assert_eq!(message.as_str(), HandleError::Consumed.to_string());
        assert_eq!(message.len(), message.as_bytes().len());
    }

    #[test]
    fn test_from_utf16_is_lossy_not_fallible() {
        assert_eq!(ErrorMessage::from_utf16(&[]).len(), 0);

        let units: Vec<u16> = "boom".encode_utf16().collect();
        assert_eq!(ErrorMessage::from_utf16(&units).as_str(), "boom");

        // Unpaired surrogate becomes U+FFFD instead of failing.
        let message = ErrorMessage::from_utf16(&[0xD800]);
        assert_eq!(message.as_str(), "\u{FFFD}");
    }
}
