use crate::common::{
    MEMORY_STORE_TYPE, PREFIX_DECORATOR, READONLY_DECORATOR, READONLY_DECORATOR_ALIAS,
    URLENCODE_DECORATOR,
};
use crate::errors::{ErrorKind, StrataError, StrataResult};
use crate::factory::{DecoratorSpec, StoreDescriptor, StoreParams};
use crate::store::memory::InMemoryStore;
use crate::store::{KeyValueStore, PrefixDecorator, ReadOnlyDecorator, UrlEncodeDecorator};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Constructor building a backend store from validated parameters.
pub type StoreConstructor =
    Arc<dyn Fn(&StoreParams) -> StrataResult<KeyValueStore> + Send + Sync>;

/// Constructor wrapping a store with one decorator, given its optional
/// argument.
pub type DecoratorConstructor =
    Arc<dyn Fn(KeyValueStore, Option<&str>) -> StrataResult<KeyValueStore> + Send + Sync>;

/// Registry resolving store type and decorator identifiers to
/// constructors.
///
/// # Purpose
/// The factory's dispatch tables. Identifiers are plain strings so that
/// adapter crates can register their backends at process startup without
/// the core crate knowing about them. Lookup of an unregistered identifier
/// is an explicit error (`UnknownStoreType` / `UnknownDecorator`), never a
/// silent fallback.
///
/// # Characteristics
/// - **Thread-Safe**: backed by concurrent maps; registration and lookup
///   can happen from any thread
/// - **Extensible**: `register_store` / `register_decorator` accept any
///   closure with the constructor shape
/// - **Pre-populated**: `with_defaults` installs the `memory` backend and
///   the built-in decorators; the process-wide instance from
///   [`default_registry`] starts from the same defaults
pub struct StoreRegistry {
    stores: DashMap<String, StoreConstructor>,
    decorators: DashMap<String, DecoratorConstructor>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    pub fn new() -> StoreRegistry {
        StoreRegistry {
            stores: DashMap::new(),
            decorators: DashMap::new(),
        }
    }

    /// Creates a registry holding the built-in store types and decorators.
    pub fn with_defaults() -> StoreRegistry {
        let registry = StoreRegistry::new();

        registry.register_store(MEMORY_STORE_TYPE, |_params| {
            Ok(KeyValueStore::new(InMemoryStore::new()))
        });

        registry.register_decorator(PREFIX_DECORATOR, |store, arg| match arg {
            Some(prefix) => Ok(PrefixDecorator::new(prefix, store)),
            None => Err(StrataError::new(
                "The prefix decorator requires an argument, e.g. prefix(ns/)",
                ErrorKind::ConfigurationError,
            )),
        });

        registry.register_decorator(URLENCODE_DECORATOR, |store, arg| {
            reject_argument(URLENCODE_DECORATOR, arg)?;
            Ok(UrlEncodeDecorator::new(store))
        });

        let readonly = |store: KeyValueStore, arg: Option<&str>| -> StrataResult<KeyValueStore> {
            reject_argument(READONLY_DECORATOR, arg)?;
            Ok(ReadOnlyDecorator::new(store))
        };
        registry.register_decorator(READONLY_DECORATOR, readonly);
        registry.register_decorator(READONLY_DECORATOR_ALIAS, readonly);

        registry
    }

    /// Registers (or replaces) a store constructor under `store_type`.
    pub fn register_store<F>(&self, store_type: &str, constructor: F)
    where
        F: Fn(&StoreParams) -> StrataResult<KeyValueStore> + Send + Sync + 'static,
    {
        self.stores
            .insert(store_type.to_string(), Arc::new(constructor));
    }

    /// Registers (or replaces) a decorator constructor under `name`.
    pub fn register_decorator<F>(&self, name: &str, constructor: F)
    where
        F: Fn(KeyValueStore, Option<&str>) -> StrataResult<KeyValueStore> + Send + Sync + 'static,
    {
        self.decorators
            .insert(name.to_string(), Arc::new(constructor));
    }

    /// Whether a store type is registered.
    pub fn has_store_type(&self, store_type: &str) -> bool {
        self.stores.contains_key(store_type)
    }

    /// Whether a decorator identifier is registered.
    pub fn has_decorator(&self, name: &str) -> bool {
        self.decorators.contains_key(name)
    }

    /// Builds the base (undecorated) store for `store_type`.
    pub fn create_store(
        &self,
        store_type: &str,
        params: &StoreParams,
    ) -> StrataResult<KeyValueStore> {
        let constructor = match self.stores.get(store_type) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                return Err(StrataError::new(
                    &format!("No store registered for type '{}'", store_type),
                    ErrorKind::UnknownStoreType,
                ))
            }
        };
        log::debug!("creating '{}' store", store_type);
        constructor.as_ref()(params)
    }

    /// Applies one decorator to `store`.
    pub fn decorate(&self, store: KeyValueStore, spec: &DecoratorSpec) -> StrataResult<KeyValueStore> {
        let constructor = match self.decorators.get(&spec.name) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                return Err(StrataError::new(
                    &format!("No decorator registered for '{}'", spec.name),
                    ErrorKind::UnknownDecorator,
                ))
            }
        };
        log::debug!("applying '{}' decorator", spec.name);
        constructor.as_ref()(store, spec.arg.as_deref())
    }

    /// Builds the final store for a normalized descriptor: base store
    /// first, then the decorator list folded over it left to right, each
    /// step wrapping the previous result. The first list entry ends up
    /// innermost, the last outermost.
    pub fn build(&self, descriptor: StoreDescriptor) -> StrataResult<KeyValueStore> {
        let StoreDescriptor {
            store_type,
            params,
            decorators,
        } = descriptor;

        let mut store = self.create_store(&store_type, &params)?;
        for spec in &decorators {
            store = self.decorate(store, spec)?;
        }
        Ok(store)
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        StoreRegistry::with_defaults()
    }
}

fn reject_argument(name: &str, arg: Option<&str>) -> StrataResult<()> {
    match arg {
        None => Ok(()),
        Some(_) => Err(StrataError::new(
            &format!("The {} decorator takes no argument", name),
            ErrorKind::ConfigurationError,
        )),
    }
}

static DEFAULT_REGISTRY: Lazy<StoreRegistry> = Lazy::new(StoreRegistry::with_defaults);

/// The process-wide registry used by the top-level factory functions.
///
/// Adapter crates register their store types here at startup; the built-in
/// defaults are always present.
pub fn default_registry() -> &'static StoreRegistry {
    &DEFAULT_REGISTRY
}
