//! Total, namespaced key-value accessor.
//!
//! Keys have one of two shapes:
//!
//! - per-workspace: `${prefix}-${namespace}-${suffix}` (layout, backup, tabs)
//! - shared: `${prefix}-${suffix}` (theme, sidebar state)
//!
//! Every operation is total. A backend failure is logged and then treated as
//! an absent value on read and as a dropped write otherwise.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::{MemoryStorage, StorageBackend};

/// Suffix of the primary layout record.
pub const LAYOUT_SUFFIX: &str = "layout";
/// Suffix of the last-known-good layout backup.
pub const LAST_KNOWN_GOOD_SUFFIX: &str = "lastKnownGoodLayout";
/// Suffix of the per-workspace open-tabs record.
pub const TABS_SUFFIX: &str = "tabs";
/// Suffix of the shared theme preference.
pub const THEME_SUFFIX: &str = "theme";
/// Suffix of the shared sidebar-collapsed preference.
pub const SIDEBAR_COLLAPSED_SUFFIX: &str = "sidebar-collapsed";

/// Fully qualified storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreKey<'a> {
    pub prefix: &'a str,
    pub namespace: Option<&'a str>,
    pub suffix: &'a str,
}

impl<'a> StoreKey<'a> {
    #[must_use]
    pub fn scoped(prefix: &'a str, namespace: &'a str, suffix: &'a str) -> Self {
        Self {
            prefix,
            namespace: Some(namespace),
            suffix,
        }
    }

    #[must_use]
    pub fn shared(prefix: &'a str, suffix: &'a str) -> Self {
        Self {
            prefix,
            namespace: None,
            suffix,
        }
    }
}

impl fmt::Display for StoreKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Some(namespace) => write!(f, "{}-{}-{}", self.prefix, namespace, self.suffix),
            None => write!(f, "{}-{}", self.prefix, self.suffix),
        }
    }
}

/// Namespaced accessor over a [`StorageBackend`].
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn StorageBackend>,
}

impl Store {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Store over fresh [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Whether writes can currently succeed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Every stored key. Empty when the backend cannot be listed.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        match self.backend.keys() {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(backend = %self.backend.name(), error = %e, "store listing failed, treating as empty");
                Vec::new()
            }
        }
    }

    #[must_use]
    pub fn get(&self, prefix: &str, namespace: Option<&str>, suffix: &str) -> Option<String> {
        self.get_key(StoreKey {
            prefix,
            namespace,
            suffix,
        })
    }

    pub fn set(&self, prefix: &str, namespace: Option<&str>, suffix: &str, value: &str) {
        self.set_key(
            StoreKey {
                prefix,
                namespace,
                suffix,
            },
            value,
        );
    }

    pub fn delete(&self, prefix: &str, namespace: Option<&str>, suffix: &str) {
        self.delete_key(StoreKey {
            prefix,
            namespace,
            suffix,
        });
    }

    #[must_use]
    pub fn get_key(&self, key: StoreKey<'_>) -> Option<String> {
        let key = key.to_string();
        match self.backend.get(&key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(backend = %self.backend.name(), key = %key, error = %e, "store read failed, treating as absent");
                None
            }
        }
    }

    pub fn set_key(&self, key: StoreKey<'_>, value: &str) {
        let key = key.to_string();
        if let Err(e) = self.backend.set(&key, value) {
            tracing::warn!(backend = %self.backend.name(), key = %key, error = %e, "store write failed, dropping value");
        }
    }

    pub fn delete_key(&self, key: StoreKey<'_>) {
        let key = key.to_string();
        if let Err(e) = self.backend.remove(&key) {
            tracing::warn!(backend = %self.backend.name(), key = %key, error = %e, "store delete failed");
        }
    }

    /// Read and deserialize a JSON value. Malformed payloads are absent.
    #[must_use]
    pub fn get_json<T: DeserializeOwned>(&self, key: StoreKey<'_>) -> Option<T> {
        let raw = self.get_key(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "malformed stored value, treating as absent");
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: StoreKey<'_>, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_key(key, &raw),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to serialize value, dropping write");
            }
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("backend", &self.backend.name())
            .finish()
    }
}
