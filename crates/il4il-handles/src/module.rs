//! The builder handle.

use crate::browser::BrowserHandle;
use crate::error::HandleError;
use crate::slot::Slot;
use il4il_core::ident::IdStr;
use il4il_core::validate::{ValidModule, ValidationRules};
use il4il_core::Module;
use std::io::Write;
use std::path::Path;

/// A shareable handle to a module under construction.
///
/// Mutating calls are serialized by the slot's internal lock, so the handle
/// can sit behind a shared reference in a binding layer without external
/// synchronization. Serialization borrows; [`ModuleHandle::validate`]
/// consumes. After a consume (or [`ModuleHandle::dispose`]), every operation
/// reports [`HandleError::Consumed`].
#[derive(Debug)]
pub struct ModuleHandle {
    slot: Slot<Module>,
}

impl ModuleHandle {
    /// Creates a handle owning a fresh, empty module.
    pub fn new() -> Self {
        Self {
            slot: Slot::new(Module::new()),
        }
    }

    /// Wraps an existing builder, e.g. one decoded from bytes.
    pub fn from_module(module: Module) -> Self {
        Self {
            slot: Slot::new(module),
        }
    }

    /// Appends a `Name` metadata entry, copying the identifier.
    pub fn add_metadata_name(&self, name: &IdStr) -> Result<(), HandleError> {
        self.slot
            .with_mut(|module| module.add_metadata_name(name.to_ident()))
    }

    /// Number of metadata entries accumulated so far.
    pub fn metadata_count(&self) -> Result<usize, HandleError> {
        self.slot.with(|module| module.metadata_entries().count())
    }

    /// Encodes the module into `out` without consuming the builder.
    pub fn write_to<W: Write>(&self, out: W) -> Result<(), HandleError> {
        self.slot.with(|module| module.write_to(out))?.map_err(Into::into)
    }

    /// Encodes the module into the file at `path` without consuming the
    /// builder.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), HandleError> {
        self.slot.with(|module| module.write_to_path(path))?.map_err(Into::into)
    }

    /// Validates the module and hands back a shareable browser.
    ///
    /// This is the atomic consume: the builder leaves the slot before
    /// validation runs, so a concurrent second call observes
    /// [`HandleError::Consumed`] instead of racing. Whether validation
    /// succeeds or fails, the builder is gone afterwards.
    pub fn validate(&self, rules: &ValidationRules) -> Result<BrowserHandle, HandleError> {
        let module = self.slot.take()?;
        log::debug!("builder consumed by validation");
        let valid = ValidModule::validate(module, rules)?;
        Ok(BrowserHandle::new(valid))
    }

    /// Explicitly destroys the builder. Further operations, including a
    /// second dispose, report [`HandleError::Consumed`].
    pub fn dispose(&self) -> Result<(), HandleError> {
        self.slot.dispose()
    }

    pub fn is_consumed(&self) -> bool {
        self.slot.is_consumed()
    }
}

impl Default for ModuleHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use il4il_core::Ident;
    use std::str::FromStr;

    fn id(text: &str) -> Ident {
        Ident::from_str(text).unwrap()
    }

    #[test]
    fn test_build_and_serialize_without_consuming() {
        let handle = ModuleHandle::new();
        handle.add_metadata_name(&id("persistent")).unwrap();

        let mut first = Vec::new();
        handle.write_to(&mut first).unwrap();
        let mut second = Vec::new();
        handle.write_to(&mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(handle.metadata_count().unwrap(), 1);
    }

    #[test]
    fn test_validate_consumes_the_builder() {
        let handle = ModuleHandle::new();
        handle.add_metadata_name(&id("MyModuleName")).unwrap();

        let browser = handle.validate(&ValidationRules::default()).unwrap();
        assert_eq!(browser.metadata_count(), 1);

        assert!(handle.is_consumed());
        assert!(matches!(
            handle.validate(&ValidationRules::default()),
            Err(HandleError::Consumed)
        ));
        assert!(matches!(
            handle.add_metadata_name(&id("too_late")),
            Err(HandleError::Consumed)
        ));
    }

    #[test]
    fn test_failed_validation_also_consumes() {
        let handle = ModuleHandle::new();
        handle.add_metadata_name(&id("one")).unwrap();
        handle.add_metadata_name(&id("two")).unwrap();

        assert!(matches!(
            handle.validate(&ValidationRules::default()),
            Err(HandleError::Validation(_))
        ));
        // The builder is discarded either way.
        assert!(handle.is_consumed());
    }

    #[test]
    fn test_concurrent_validate_has_one_winner() {
        use std::sync::Arc;

        let handle = Arc::new(ModuleHandle::new());
        handle.add_metadata_name(&id("contested")).unwrap();

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let handle = Arc::clone(&handle);
                std::thread::spawn(move || handle.validate(&ValidationRules::default()).is_ok())
            })
            .collect();

        let winners = threads
            .into_iter()
            .map(|t| t.join().unwrap())
            .filter(|&ok| ok)
            .count();
        assert_eq!(winners, 1);
    }
}
