#![forbid(unsafe_code)]

//! Dockyard persistence: makes a dockable workspace durable across reloads.
//!
//! # Key Components
//!
//! - [`StorageBackend`] - pluggable string key-value backends ([`MemoryStorage`], [`FileStorage`])
//! - [`Store`] - total accessor building `${prefix}-${namespace}-${suffix}` keys
//! - [`MigrationGraph`] - versioned, all-or-nothing document transforms
//! - [`LayoutManager`] - save, load, migrate, validate, recover from backup
//! - [`LayoutSettings`] - caller configuration shared by save and load
//!
//! # Failure Model
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Backend I/O | Logged; absent on read, dropped on write |
//! | Malformed payload | Treated as absent, backup tried |
//! | Structural violation | Backup tried |
//! | Migration failure | Treated as absent, backup tried |
//! | Config version change | `None`, caller rebuilds |

pub mod config;
pub mod manager;
pub mod migration;
pub mod prefs;
pub mod storage;
pub mod store;

pub use config::{DEFAULT_PREFIX, LayoutSettings};
pub use manager::{AbsentReason, LayoutManager, LayoutRejection, LoadOutcome};
pub use migration::{MigrationError, MigrationGraph, Transform};
pub use prefs::{OpenTabs, Preferences};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use store::{
    LAST_KNOWN_GOOD_SUFFIX, LAYOUT_SUFFIX, SIDEBAR_COLLAPSED_SUFFIX, Store, StoreKey, TABS_SUFFIX,
    THEME_SUFFIX,
};
