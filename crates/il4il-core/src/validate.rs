//! Validation of built modules and the read-only browse view.
//!
//! [`ValidModule::validate`] is the single gate between the mutable builder
//! and browsing: it consumes a [`Module`] by value, checks every rule, and
//! either yields the immutable view or a [`ValidateError`]. There is no
//! partially-validated state and no way to browse raw bytes without decoding
//! into a builder first.

use crate::ident::{IdStr, IdentError};
use crate::module::Module;
use crate::section::{Metadata, MetadataKind, ModuleName, Section};
use crate::version::SupportedVersion;
use fxhash::FxHashMap;
use miette::Diagnostic;
use thiserror::Error;

/// Configurable validation policy.
///
/// The defaults encode the strict interpretation of the format; relaxations
/// exist for producers with looser needs.
#[derive(Clone, Copy, Debug)]
pub struct ValidationRules {
    /// Permit more than one `Name` metadata entry. Off by default: a module
    /// has at most one name. A module with no name is always valid; anonymous
    /// intermediate modules are useful to linkers.
    pub allow_multiple_names: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            allow_multiple_names: false,
        }
    }
}

/// A rule violation found while validating a module.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidateError {
    #[error("metadata entry {index} carries an invalid name: {source}")]
    #[diagnostic(code("VALIDATE-001"))]
    InvalidName {
        index: usize,
        #[source]
        source: IdentError,
    },

    #[error("duplicate module name: metadata entries {first} and {second} both declare one")]
    #[diagnostic(
        code("VALIDATE-002"),
        help("a module may declare at most one name; drop the extra entry or validate with allow_multiple_names")
    )]
    DuplicateName { first: usize, second: usize },
}

/// Misuse of the browse accessors.
#[derive(Clone, Debug, Error, Diagnostic, PartialEq, Eq)]
#[non_exhaustive]
pub enum BrowseError {
    #[error("metadata index {index} is out of range for a module with {count} entries")]
    #[diagnostic(code("BROWSE-001"))]
    IndexOutOfRange { index: usize, count: usize },
}

/// An immutable, validated module ready for browsing.
///
/// Obtained only through [`ValidModule::validate`]. Metadata entries keep the
/// builder's insertion order. The view never mutates after construction, so
/// sharing it across threads needs no locking.
#[derive(Clone, Debug)]
pub struct ValidModule {
    version: SupportedVersion,
    metadata: Vec<Metadata>,
}

impl ValidModule {
    /// Checks `module` against `rules`, consuming it.
    ///
    /// Validation is total: either every rule passes and the browse view is
    /// returned, or the first violation is reported and the module is gone
    /// either way.
    pub fn validate(module: Module, rules: &ValidationRules) -> Result<Self, ValidateError> {
        let version = module.version();

        let mut metadata = Vec::new();
        for section in module.into_sections() {
            match section {
                Section::Metadata(mut entries) => metadata.append(&mut entries),
            }
        }

        let mut first_of_kind: FxHashMap<MetadataKind, usize> = FxHashMap::default();
        for (index, entry) in metadata.iter().enumerate() {
            check_entry(index, entry)?;

            let kind = entry.kind();
            match first_of_kind.get(&kind) {
                Some(&first) if kind == MetadataKind::Name && !rules.allow_multiple_names => {
                    return Err(ValidateError::DuplicateName {
                        first,
                        second: index,
                    });
                }
                Some(_) => {}
                None => {
                    first_of_kind.insert(kind, index);
                }
            }
        }

        log::debug!("validated module with {} metadata entries", metadata.len());
        Ok(Self { version, metadata })
    }

    pub fn version(&self) -> SupportedVersion {
        self.version
    }

    /// Number of metadata entries. O(1).
    pub fn metadata_count(&self) -> usize {
        self.metadata.len()
    }

    /// The entry at `index`, in original insertion order.
    pub fn metadata(&self, index: usize) -> Result<&Metadata, BrowseError> {
        self.metadata.get(index).ok_or(BrowseError::IndexOutOfRange {
            index,
            count: self.metadata.len(),
        })
    }

    /// All entries, in original insertion order.
    pub fn metadata_entries(&self) -> &[Metadata] {
        &self.metadata
    }

    /// The module's declared name, when it has one. With the default rules
    /// there is at most one; otherwise the first declaration wins.
    pub fn name(&self) -> Option<&ModuleName> {
        self.metadata.iter().find_map(Metadata::as_name)
    }

    /// Turns the validated view back into a builder, e.g. to amend and
    /// re-validate.
    pub fn into_module(self) -> Module {
        let mut sections = Vec::new();
        if !self.metadata.is_empty() {
            sections.push(Section::Metadata(self.metadata));
        }
        Module::from_parts(self.version, sections)
    }
}

/// Kind-specific constraints, re-checked even though construction already
/// enforces them: a browse view must never be produced from torn state.
fn check_entry(index: usize, entry: &Metadata) -> Result<(), ValidateError> {
    match entry {
        Metadata::Name(name) => IdStr::new(name.ident().as_str())
            .map(|_| ())
            .map_err(|source| ValidateError::InvalidName { index, source }),
    }
}

impl TryFrom<Module> for ValidModule {
    type Error = ValidateError;

    /// Validates with the default [`ValidationRules`].
    fn try_from(module: Module) -> Result<Self, ValidateError> {
        Self::validate(module, &ValidationRules::default())
    }
}
