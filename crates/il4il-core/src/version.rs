//! Binary format version numbers.

use miette::Diagnostic;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// A `major.minor` format version pair as stored in a module header.
///
/// The major number is incremented for breaking layout changes, the minor
/// number for additive ones. Any `FormatVersion` can be decoded from a header;
/// only a [`SupportedVersion`] can be attached to an in-memory module.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FormatVersion {
    pub major: u8,
    pub minor: u8,
}

impl FormatVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Ord for FormatVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl PartialOrd for FormatVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error produced when a module header declares a version this build cannot read.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[error(
    "format version {version} is not supported (supported range is {} through {})",
    SupportedVersion::MINIMUM,
    SupportedVersion::CURRENT
)]
#[diagnostic(
    code("VERSION-001"),
    help("re-encode the module with a toolchain matching this reader")
)]
pub struct UnsupportedVersionError {
    version: FormatVersion,
}

impl UnsupportedVersionError {
    /// The version the header declared.
    pub fn version(&self) -> FormatVersion {
        self.version
    }
}

/// A format version within the range this build of the library understands.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct SupportedVersion(FormatVersion);

impl SupportedVersion {
    /// The version written into newly created modules.
    pub const CURRENT: Self = Self(FormatVersion::new(0, 1));

    /// The oldest version this reader still accepts.
    pub const MINIMUM: Self = Self::CURRENT;

    pub const fn version(self) -> FormatVersion {
        self.0
    }

    /// Checks `version` against the supported range.
    pub fn new(version: FormatVersion) -> Result<Self, UnsupportedVersionError> {
        if version >= Self::MINIMUM.0 && version <= Self::CURRENT.0 {
            Ok(Self(version))
        } else {
            Err(UnsupportedVersionError { version })
        }
    }
}

impl TryFrom<FormatVersion> for SupportedVersion {
    type Error = UnsupportedVersionError;

    fn try_from(version: FormatVersion) -> Result<Self, Self::Error> {
        Self::new(version)
    }
}

impl From<SupportedVersion> for FormatVersion {
    fn from(version: SupportedVersion) -> Self {
        version.0
    }
}

impl fmt::Display for SupportedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering_is_major_then_minor() {
        assert!(FormatVersion::new(1, 0) > FormatVersion::new(0, 9));
        assert!(FormatVersion::new(0, 2) > FormatVersion::new(0, 1));
        assert_eq!(FormatVersion::new(2, 3), FormatVersion::new(2, 3));
    }

    #[test]
    fn test_unsupported_versions_are_rejected() {
        assert!(SupportedVersion::new(FormatVersion::new(0, 0)).is_err());
        assert!(SupportedVersion::new(FormatVersion::new(9, 9)).is_err());
        assert_eq!(
            SupportedVersion::new(SupportedVersion::CURRENT.version()),
            Ok(SupportedVersion::CURRENT)
        );
    }
}
