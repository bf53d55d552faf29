//! Sections and metadata entries of a module.
//!
//! A module body is a sequence of sections, each introduced on the wire by a
//! kind tag and a byte length so readers can skip kinds they do not know.
//! The kind sets are closed enums; both are `#[non_exhaustive]` because the
//! format grows by appending new tags.

use crate::ident::Ident;
use std::fmt;

/// Wire tag of a section.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
#[repr(u8)]
pub enum SectionKind {
    Metadata = 0,
}

impl SectionKind {
    /// Maps a wire tag back to a known kind, `None` for tags from a newer
    /// format revision.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Metadata),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Wire tag of a metadata entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
#[repr(u8)]
pub enum MetadataKind {
    Name = 0,
}

impl MetadataKind {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Name),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// The name declared for a module.
///
/// A newtype rather than a bare [`Ident`]: the wire layout reserves room next
/// to the name for a version stamp, and future fields land here.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ModuleName {
    ident: Ident,
}

impl ModuleName {
    pub fn new(ident: Ident) -> Self {
        Self { ident }
    }

    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    pub fn into_ident(self) -> Ident {
        self.ident
    }
}

impl From<Ident> for ModuleName {
    fn from(ident: Ident) -> Self {
        Self::new(ident)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ident, f)
    }
}

/// A single entry in a metadata section.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Metadata {
    /// Declares the module's name.
    Name(ModuleName),
}

impl Metadata {
    pub fn kind(&self) -> MetadataKind {
        match self {
            Self::Name(_) => MetadataKind::Name,
        }
    }

    /// The name payload, or `None` when the entry is some other kind.
    ///
    /// A mismatched kind is an expected, caller-checkable condition here, not
    /// a fault; callers wanting an error wrap the `None` themselves.
    pub fn as_name(&self) -> Option<&ModuleName> {
        match self {
            Self::Name(name) => Some(name),
        }
    }
}

/// One section of a module.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Section {
    /// Facts about the module itself, e.g. its name.
    Metadata(Vec<Metadata>),
}

impl Section {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Metadata(_) => SectionKind::Metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_tags_round_trip() {
        assert_eq!(SectionKind::from_tag(SectionKind::Metadata.tag()), Some(SectionKind::Metadata));
        assert_eq!(MetadataKind::from_tag(MetadataKind::Name.tag()), Some(MetadataKind::Name));
        assert_eq!(SectionKind::from_tag(0xFF), None);
        assert_eq!(MetadataKind::from_tag(0xFF), None);
    }

    #[test]
    fn test_metadata_discriminated_access() {
        let entry = Metadata::Name(ModuleName::new(Ident::from_str("m").unwrap()));
        assert_eq!(entry.kind(), MetadataKind::Name);
        assert_eq!(entry.as_name().unwrap().ident().as_str(), "m");
    }
}
