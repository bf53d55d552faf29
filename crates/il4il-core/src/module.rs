//! The mutable module builder.

use crate::binary::{reader, writer, DecodeError};
use crate::section::{Metadata, ModuleName, Section};
use crate::version::SupportedVersion;
use std::io::{Read, Write};
use std::path::Path;

/// An in-memory module under construction.
///
/// Sections and the metadata entries inside them keep their insertion order;
/// that order is what the codec writes and what the browse view exposes after
/// validation. Serializing borrows the builder and can be repeated; validating
/// (see [`ValidModule::validate`]) consumes it.
///
/// [`ValidModule::validate`]: crate::validate::ValidModule::validate
#[derive(Clone, Debug)]
pub struct Module {
    version: SupportedVersion,
    sections: Vec<Section>,
}

impl Module {
    /// Creates an empty module stamped with the current format version.
    pub fn new() -> Self {
        Self {
            version: SupportedVersion::CURRENT,
            sections: Vec::new(),
        }
    }

    pub(crate) fn from_parts(version: SupportedVersion, sections: Vec<Section>) -> Self {
        Self { version, sections }
    }

    pub fn version(&self) -> SupportedVersion {
        self.version
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut Vec<Section> {
        &mut self.sections
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.sections
    }

    /// Appends a `Name` entry to the module's trailing metadata section,
    /// starting a new section if the last one is something else.
    pub fn add_metadata_name<N: Into<ModuleName>>(&mut self, name: N) {
        let entries = match self.sections.last_mut() {
            Some(Section::Metadata(entries)) => entries,
            _ => {
                self.sections.push(Section::Metadata(Vec::new()));
                match self.sections.last_mut() {
                    Some(Section::Metadata(entries)) => entries,
                    _ => unreachable!("metadata section was just pushed"),
                }
            }
        };
        entries.push(Metadata::Name(name.into()));
    }

    /// All metadata entries across every metadata section, in insertion order.
    pub fn metadata_entries(&self) -> impl Iterator<Item = &Metadata> {
        self.sections.iter().flat_map(|section| match section {
            Section::Metadata(entries) => entries.iter(),
        })
    }

    /// Encodes the module and writes it to `out`. Does not consume or mutate
    /// the builder.
    pub fn write_to<W: Write>(&self, out: W) -> std::io::Result<()> {
        writer::write_module(self, out)
    }

    /// Encodes the module into a file at `path`, truncating anything there.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(std::io::BufWriter::new(file))
    }

    /// Decodes a module from a byte source.
    ///
    /// The result is a builder again; browsing its contents requires
    /// validation.
    pub fn read_from<R: Read>(source: R) -> Result<Self, DecodeError> {
        reader::read_module(source)
    }

    /// Decodes a module from a file at `path`.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let file = std::fs::File::open(path).map_err(DecodeError::open_failure)?;
        Self::read_from(std::io::BufReader::new(file))
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}
