use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, RwLock};

use tracing::debug;

use super::TypeConverter;
use crate::error::SqlMarshalError;
use crate::object::DataObject;

type Entry = Arc<dyn Any + Send + Sync>;

/// Registry of compiled converters, one per data object type.
///
/// Lookups take a shared read lock. A miss serializes on a single build lock and checks
/// again before compiling, so a type is compiled at most once even when many threads
/// ask for it at the same time. Failed builds are not recorded; the next call retries.
///
/// A descriptor must not ask the same cache for a converter while it is being built.
#[derive(Default)]
pub struct ConverterCache {
    entries: RwLock<HashMap<TypeId, Entry>>,
    build_lock: Mutex<()>,
}

static GLOBAL: LazyLock<ConverterCache> = LazyLock::new(ConverterCache::new);

impl ConverterCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    #[must_use]
    pub fn global() -> &'static ConverterCache {
        &GLOBAL
    }

    fn lookup<T: DataObject>(&self) -> Option<Arc<TypeConverter<T>>> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<TypeConverter<T>>().ok())
    }

    /// The converter for `T`, compiling it on first use.
    ///
    /// # Errors
    /// `SqlMarshalError::ConverterBuild` if `T`'s descriptor cannot be compiled.
    pub fn get<T: DataObject>(&self) -> Result<Arc<TypeConverter<T>>, SqlMarshalError> {
        if let Some(converter) = self.lookup::<T>() {
            return Ok(converter);
        }

        let _build = match self.build_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(converter) = self.lookup::<T>() {
            return Ok(converter);
        }

        debug!(type_name = std::any::type_name::<T>(), "building type converter");
        let converter = Arc::new(TypeConverter::<T>::compile()?);
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(TypeId::of::<T>(), converter.clone());
        Ok(converter)
    }

    #[must_use]
    pub fn contains<T: DataObject>(&self) -> bool {
        self.lookup::<T>().is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ConverterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// The converter for `T` from the process-wide cache.
///
/// # Errors
/// See [`ConverterCache::get`].
pub fn get_converter<T: DataObject>() -> Result<Arc<TypeConverter<T>>, SqlMarshalError> {
    ConverterCache::global().get::<T>()
}
