//! Decoding of modules from the binary layout.
//!
//! Decoding aborts at the first structural violation. Every error carries the
//! stream offset where the violated rule was detected, counted from the first
//! magic byte.

use crate::ident::{Ident, ParseIdentError};
use crate::module::Module;
use crate::section::{Metadata, MetadataKind, ModuleName, Section, SectionKind};
use crate::varint::{self, VarintError};
use crate::version::{FormatVersion, SupportedVersion, UnsupportedVersionError};
use miette::Diagnostic;
use std::io::{ErrorKind, Read};
use thiserror::Error;

/// A structurally invalid or unreadable module stream.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("failed to read module at offset {offset}: {source}")]
    #[diagnostic(code("DECODE-001"))]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("truncated module: input ends at offset {offset} while reading {context}")]
    #[diagnostic(
        code("DECODE-002"),
        help("the file was cut off mid-write or is not a complete module")
    )]
    Truncated { offset: u64, context: &'static str },

    #[error("not an IL4IL module: bad magic signature")]
    #[diagnostic(
        code("DECODE-003"),
        help("IL4IL modules start with the 6 bytes \"IL4IL\\0\"")
    )]
    BadMagic,

    #[error("unsupported module at offset {offset}: {source}")]
    #[diagnostic(code("DECODE-004"))]
    UnsupportedVersion {
        offset: u64,
        #[source]
        source: UnsupportedVersionError,
    },

    #[error("malformed varint at offset {offset} while reading {context}: {reason}")]
    #[diagnostic(code("DECODE-005"))]
    InvalidVarint {
        offset: u64,
        context: &'static str,
        #[source]
        reason: VarintError,
    },

    #[error("unknown metadata kind tag {tag:#04X} at offset {offset}")]
    #[diagnostic(
        code("DECODE-006"),
        help("metadata kinds cannot be skipped; the module needs a newer reader")
    )]
    UnknownMetadataKind { offset: u64, tag: u8 },

    #[error("section body declared {declared} bytes but parsing consumed {actual} (section starting at offset {offset})")]
    #[diagnostic(code("DECODE-007"))]
    SectionLengthMismatch {
        offset: u64,
        declared: u64,
        actual: u64,
    },

    #[error("reserved integer at offset {offset} must be zero")]
    #[diagnostic(code("DECODE-008"))]
    NonZeroReserved { offset: u64 },

    #[error("invalid identifier at offset {offset}: {source}")]
    #[diagnostic(code("DECODE-009"))]
    InvalidIdent {
        offset: u64,
        #[source]
        source: ParseIdentError,
    },
}

impl DecodeError {
    /// The stream offset at which decoding failed.
    pub fn offset(&self) -> u64 {
        match self {
            Self::Io { offset, .. }
            | Self::Truncated { offset, .. }
            | Self::UnsupportedVersion { offset, .. }
            | Self::InvalidVarint { offset, .. }
            | Self::UnknownMetadataKind { offset, .. }
            | Self::SectionLengthMismatch { offset, .. }
            | Self::NonZeroReserved { offset }
            | Self::InvalidIdent { offset, .. } => *offset,
            Self::BadMagic => 0,
        }
    }

    pub(crate) fn open_failure(source: std::io::Error) -> Self {
        Self::Io { offset: 0, source }
    }
}

/// A byte source that tracks how far into the stream it has read.
struct Source<R: Read> {
    src: R,
    offset: u64,
}

impl<R: Read> Source<R> {
    fn new(src: R) -> Self {
        Self { src, offset: 0 }
    }

    fn fill(&mut self, buf: &mut [u8], context: &'static str) -> Result<(), DecodeError> {
        match self.src.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(DecodeError::Truncated {
                offset: self.offset,
                context,
            }),
            Err(source) => Err(DecodeError::Io {
                offset: self.offset,
                source,
            }),
        }
    }

    fn byte(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        let mut value = 0u8;
        self.fill(std::slice::from_mut(&mut value), context)?;
        Ok(value)
    }

    fn varint(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        let offset = self.offset;
        match varint::read_u32(&mut self.src) {
            Ok(Ok((value, len))) => {
                self.offset += len as u64;
                Ok(value)
            }
            Ok(Err(reason)) => Err(DecodeError::InvalidVarint {
                offset,
                context,
                reason,
            }),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(DecodeError::Truncated { offset, context })
            }
            Err(source) => Err(DecodeError::Io { offset, source }),
        }
    }

    fn length(&mut self, context: &'static str) -> Result<usize, DecodeError> {
        Ok(self.varint(context)? as usize)
    }

    /// Discards exactly `count` bytes, e.g. the body of an unrecognized section.
    fn skip(&mut self, mut count: usize, context: &'static str) -> Result<(), DecodeError> {
        let mut chunk = [0u8; 512];
        while count > 0 {
            let take = count.min(chunk.len());
            self.fill(&mut chunk[..take], context)?;
            count -= take;
        }
        Ok(())
    }
}

pub(crate) fn read_module<R: Read>(source: R) -> Result<Module, DecodeError> {
    let mut src = Source::new(source);

    read_magic(&mut src)?;
    let version = read_version(&mut src)?;

    let section_count = src.length("section count")?;
    let mut sections = Vec::new();
    for _ in 0..section_count {
        if let Some(section) = read_section(&mut src)? {
            sections.push(section);
        }
    }

    log::trace!(
        "decoded module: format {}, {} section(s), {} byte(s)",
        version,
        sections.len(),
        src.offset
    );
    Ok(Module::from_parts(version, sections))
}

fn read_magic<R: Read>(src: &mut Source<R>) -> Result<(), DecodeError> {
    let mut magic = [0u8; crate::binary::MAGIC.len()];
    // A short or mismatched prefix both mean "not one of ours".
    match src.fill(&mut magic, "magic signature") {
        Ok(()) if magic == *crate::binary::MAGIC => Ok(()),
        Ok(()) => Err(DecodeError::BadMagic),
        Err(DecodeError::Truncated { .. }) => Err(DecodeError::BadMagic),
        Err(other) => Err(other),
    }
}

fn read_version<R: Read>(src: &mut Source<R>) -> Result<SupportedVersion, DecodeError> {
    let offset = src.offset;
    let mut bytes = [0u8; 2];
    src.fill(&mut bytes, "format version")?;
    SupportedVersion::try_from(FormatVersion::new(bytes[0], bytes[1]))
        .map_err(|source| DecodeError::UnsupportedVersion { offset, source })
}

/// Reads one section, or `None` when the kind tag is unrecognized and the
/// body was skipped over via its length prefix.
fn read_section<R: Read>(src: &mut Source<R>) -> Result<Option<Section>, DecodeError> {
    let tag = src.byte("section kind")?;
    let declared = src.length("section byte length")?;
    let start = src.offset;

    let section = match SectionKind::from_tag(tag) {
        Some(SectionKind::Metadata) => {
            let count = src.length("metadata entry count")?;
            let mut entries = Vec::new();
            for _ in 0..count {
                entries.push(read_metadata(src)?);
            }
            Section::Metadata(entries)
        }
        None => {
            log::debug!("skipping unknown section kind {tag:#04X} ({declared} bytes)");
            src.skip(declared, "unknown section body")?;
            return Ok(None);
        }
    };

    let actual = src.offset - start;
    if actual != declared as u64 {
        return Err(DecodeError::SectionLengthMismatch {
            offset: start,
            declared: declared as u64,
            actual,
        });
    }

    Ok(Some(section))
}

fn read_metadata<R: Read>(src: &mut Source<R>) -> Result<Metadata, DecodeError> {
    let offset = src.offset;
    let tag = src.byte("metadata kind")?;
    match MetadataKind::from_tag(tag) {
        Some(MetadataKind::Name) => Ok(Metadata::Name(read_module_name(src)?)),
        None => Err(DecodeError::UnknownMetadataKind { offset, tag }),
    }
}

fn read_module_name<R: Read>(src: &mut Source<R>) -> Result<ModuleName, DecodeError> {
    let name = read_ident(src)?;

    let offset = src.offset;
    if src.varint("reserved integer after module name")? != 0 {
        return Err(DecodeError::NonZeroReserved { offset });
    }

    Ok(ModuleName::new(name))
}

fn read_ident<R: Read>(src: &mut Source<R>) -> Result<Ident, DecodeError> {
    let offset = src.offset;
    let length = src.length("identifier byte length")?;
    let mut bytes = vec![0u8; length];
    src.fill(&mut bytes, "identifier contents")?;
    Ident::from_utf8(bytes).map_err(|source| DecodeError::InvalidIdent { offset, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdentError;

    fn encoded(build: impl FnOnce(&mut Module)) -> Vec<u8> {
        let mut module = Module::new();
        build(&mut module);
        let mut buffer = Vec::new();
        module.write_to(&mut buffer).unwrap();
        buffer
    }

    fn name(text: &str) -> ModuleName {
        ModuleName::new(text.parse::<Ident>().unwrap())
    }

    #[test]
    fn test_garbage_input_is_not_a_module() {
        assert!(matches!(
            Module::read_from([1u8, 2, 3, 4].as_slice()),
            Err(DecodeError::BadMagic)
        ));
        assert!(matches!(
            Module::read_from(b"IL4IL!\x00\x01\x00".as_slice()),
            Err(DecodeError::BadMagic)
        ));
        assert!(matches!(Module::read_from(&[][..]), Err(DecodeError::BadMagic)));
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let err = Module::read_from(b"IL4IL\0\xFF\x00\x00".as_slice()).unwrap_err();
        match err {
            DecodeError::UnsupportedVersion { offset, source } => {
                assert_eq!(offset, 6);
                assert_eq!(source.version(), FormatVersion::new(0xFF, 0));
            }
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_metadata_entry_is_rejected() {
        let bytes = encoded(|m| m.add_metadata_name(name("MyModuleName")));
        // Cut the stream in the middle of the name's identifier contents.
        let truncated = &bytes[..bytes.len() - 6];
        assert!(matches!(
            Module::read_from(truncated),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_truncated_section_header_is_rejected() {
        let bytes = encoded(|m| m.add_metadata_name(name("x")));
        // Keep magic + version + section count + kind tag, drop the rest.
        let truncated = &bytes[..10];
        assert!(matches!(
            Module::read_from(truncated),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_unknown_section_kind_is_skipped() {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(crate::binary::MAGIC);
        bytes.extend_from_slice(&[0, 1]); // version
        bytes.push(2); // two sections
        bytes.extend_from_slice(&[0x7E, 3, 0xAA, 0xBB, 0xCC]); // unknown kind, 3-byte body
        bytes.extend_from_slice(&[0, 1, 0]); // empty metadata section

        let module = Module::read_from(bytes.as_slice()).unwrap();
        assert_eq!(module.sections().len(), 1);
        assert!(matches!(module.sections()[0], Section::Metadata(ref e) if e.is_empty()));
    }

    #[test]
    fn test_unknown_metadata_kind_is_rejected() {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(crate::binary::MAGIC);
        bytes.extend_from_slice(&[0, 1]);
        bytes.push(1); // one section
        bytes.extend_from_slice(&[0, 2, 1, 0x7F]); // metadata section, one entry, unknown tag

        assert!(matches!(
            Module::read_from(bytes.as_slice()),
            Err(DecodeError::UnknownMetadataKind { tag: 0x7F, .. })
        ));
    }

    #[test]
    fn test_section_length_mismatch_is_rejected() {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(crate::binary::MAGIC);
        bytes.extend_from_slice(&[0, 1]);
        bytes.push(1);
        // Metadata section declaring 5 body bytes but containing an empty body
        // of 1 byte (entry count 0), followed by 4 bytes of padding that the
        // parser never consumes.
        bytes.extend_from_slice(&[0, 5, 0, 0xDE, 0xAD, 0xBE, 0xEF]);

        assert!(matches!(
            Module::read_from(bytes.as_slice()),
            Err(DecodeError::SectionLengthMismatch { declared: 5, actual: 1, .. })
        ));
    }

    #[test]
    fn test_nonzero_reserved_integer_is_rejected() {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(crate::binary::MAGIC);
        bytes.extend_from_slice(&[0, 1]);
        bytes.push(1);
        bytes.extend_from_slice(&[0, 5, 1, 0, 1, b'a', 7]); // reserved varint is 7

        assert!(matches!(
            Module::read_from(bytes.as_slice()),
            Err(DecodeError::NonZeroReserved { .. })
        ));
    }

    #[test]
    fn test_invalid_identifier_bytes_are_rejected() {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(crate::binary::MAGIC);
        bytes.extend_from_slice(&[0, 1]);
        bytes.push(1);
        bytes.extend_from_slice(&[0, 5, 1, 0, 1, 0x00, 0]); // name is a lone NUL byte

        match Module::read_from(bytes.as_slice()).unwrap_err() {
            DecodeError::InvalidIdent { source, .. } => {
                assert_eq!(
                    source,
                    ParseIdentError::Invalid(IdentError::ContainsNul)
                );
            }
            other => panic!("expected InvalidIdent, got {other:?}"),
        }
    }

    #[test]
    fn test_non_canonical_varint_is_rejected() {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(crate::binary::MAGIC);
        bytes.extend_from_slice(&[0, 1]);
        bytes.extend_from_slice(&[0x80, 0x00]); // section count 0, over-long

        assert!(matches!(
            Module::read_from(bytes.as_slice()),
            Err(DecodeError::InvalidVarint {
                reason: VarintError::NonCanonical,
                ..
            })
        ));
    }

    #[test]
    fn test_error_offsets_point_at_the_violation() {
        let err = Module::read_from(b"IL4IL\0\xFF\x00\x00".as_slice()).unwrap_err();
        assert_eq!(err.offset(), 6);
        assert_eq!(Module::read_from(&[][..]).unwrap_err().offset(), 0);
    }
}
