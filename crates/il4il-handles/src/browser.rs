//! Shared browsers and the metadata back-references derived from them.

use crate::error::HandleError;
use il4il_core::section::{Metadata, MetadataKind, ModuleName};
use il4il_core::validate::ValidModule;
use il4il_core::Ident;
use std::sync::{Arc, Weak};

/// A reference-counted handle to a validated module.
///
/// Created by [`ModuleHandle::validate`]. The underlying view is immutable,
/// so clones can read from any number of threads without locking; the module
/// is freed when the last clone drops.
///
/// [`ModuleHandle::validate`]: crate::module::ModuleHandle::validate
#[derive(Clone, Debug)]
pub struct BrowserHandle {
    inner: Arc<ValidModule>,
}

impl BrowserHandle {
    pub(crate) fn new(valid: ValidModule) -> Self {
        Self {
            inner: Arc::new(valid),
        }
    }

    /// Number of metadata entries. O(1).
    pub fn metadata_count(&self) -> usize {
        self.inner.metadata_count()
    }

    /// Direct access to the validated view.
    pub fn module(&self) -> &ValidModule {
        &self.inner
    }

    /// The module's declared name, when present.
    pub fn name(&self) -> Option<&ModuleName> {
        self.inner.name()
    }

    /// A back-reference to the entry at `index`.
    pub fn metadata_handle(&self, index: usize) -> Result<MetadataHandle, HandleError> {
        // Resolve the index now so misuse is reported where it happens.
        self.inner.metadata(index)?;
        Ok(MetadataHandle {
            owner: Arc::downgrade(&self.inner),
            index,
        })
    }

    /// Back-references to every entry, in insertion order. The bulk analog of
    /// [`BrowserHandle::metadata_handle`] for callers copying references into
    /// their own storage.
    pub fn metadata_handles(&self) -> Vec<MetadataHandle> {
        (0..self.inner.metadata_count())
            .map(|index| MetadataHandle {
                owner: Arc::downgrade(&self.inner),
                index,
            })
            .collect()
    }
}

/// A non-owning reference to one metadata entry of a [`BrowserHandle`].
///
/// Holding one does not keep the browser alive; every read upgrades the weak
/// link first and reports [`HandleError::BrowserDropped`] once the last
/// browser clone is gone.
#[derive(Clone, Debug)]
pub struct MetadataHandle {
    owner: Weak<ValidModule>,
    index: usize,
}

impl MetadataHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    fn entry<U>(&self, f: impl FnOnce(&Metadata) -> U) -> Result<U, HandleError> {
        let owner = self.owner.upgrade().ok_or(HandleError::BrowserDropped)?;
        let entry = owner.metadata(self.index)?;
        Ok(f(entry))
    }

    /// The entry's kind discriminant.
    pub fn kind(&self) -> Result<MetadataKind, HandleError> {
        self.entry(Metadata::kind)
    }

    /// The name payload copied out, or `Ok(None)` when the entry is some
    /// other kind (a caller-checkable mismatch, not a fault).
    pub fn name(&self) -> Result<Option<Ident>, HandleError> {
        self.entry(|entry| entry.as_name().map(|name| name.ident().clone()))
    }
}
