//! Layout save/load orchestration with last-known-good recovery.
//!
//! # Load pipeline
//!
//! ```text
//!  main record ──absent──────────────────────────────▶ None
//!      │
//!      ▼
//!  parse JSON ─▶ configVersion ─mismatch─────────────▶ None (rebuild)
//!      │               │
//!      │               ▼
//!      │          migrate schema ─▶ validate ─ok─────▶ Primary
//!      │                                │
//!      └──────── any other failure ─────┘
//!                       │
//!                       ▼
//!       last-known-good record, same pipeline ─ok────▶ Backup
//!                       │
//!                       └──────────────────────────────▶ None (rebuild)
//! ```
//!
//! Save never validates: the live tree is written as both the primary record
//! and the last-known-good backup, and validation happens on the next load.

use std::fmt;

use dockyard_core::{
    ComponentCatalog, EssentialPanels, LAYOUT_SCHEMA_VERSION, LayoutDocument, LayoutSnapshot,
    LayoutViolation, StructuralValidator, parse_document,
};
use serde_json::Value;

use crate::config::LayoutSettings;
use crate::migration::{MigrationError, MigrationGraph};
use crate::store::{LAST_KNOWN_GOOD_SUFFIX, LAYOUT_SUFFIX, Store, StoreKey};

/// Why a stored record was not usable.
#[derive(Debug)]
pub enum LayoutRejection {
    /// Payload is not JSON.
    Malformed(String),
    /// The caller's panel-type set changed since the record was written.
    ConfigVersionMismatch { stored: Option<u64>, expected: u32 },
    /// Schema migration failed or has no path.
    Migration(MigrationError),
    /// Structural validation failed.
    Invalid(LayoutViolation),
}

impl fmt::Display for LayoutRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(msg) => write!(f, "malformed layout payload: {msg}"),
            Self::ConfigVersionMismatch { stored, expected } => write!(
                f,
                "config version mismatch: stored {stored:?}, expected {expected}"
            ),
            Self::Migration(e) => write!(f, "{e}"),
            Self::Invalid(v) => write!(f, "{v}"),
        }
    }
}

impl std::error::Error for LayoutRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Migration(e) => Some(e),
            Self::Invalid(v) => Some(v),
            Self::Malformed(_) | Self::ConfigVersionMismatch { .. } => None,
        }
    }
}

/// Why [`LayoutManager::load_detailed`] produced no document.
#[derive(Debug)]
pub enum AbsentReason {
    /// Nothing was ever saved under this namespace.
    NotStored,
    /// The primary record was written for a different panel-type set.
    ConfigVersionMismatch { stored: Option<u64>, expected: u32 },
    /// Primary and backup were both unusable.
    Unrecoverable {
        primary: LayoutRejection,
        backup: Option<LayoutRejection>,
    },
}

/// Result of a detailed load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The primary record was usable.
    Primary(LayoutDocument),
    /// The primary record was rejected; the last-known-good backup was usable.
    Backup(LayoutDocument),
    /// No usable layout; the caller rebuilds from panel configuration.
    Absent(AbsentReason),
}

impl LoadOutcome {
    #[must_use]
    pub fn into_document(self) -> Option<LayoutDocument> {
        match self {
            Self::Primary(doc) | Self::Backup(doc) => Some(doc),
            Self::Absent(_) => None,
        }
    }

    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Backup(_))
    }
}

/// Orchestrates persistence of one application's layouts.
///
/// Distinct namespaces never interact; one manager can serve every open
/// workspace.
pub struct LayoutManager {
    store: Store,
    migrations: MigrationGraph,
    schema_version: u32,
    essential: EssentialPanels,
}

impl LayoutManager {
    /// Manager at [`LAYOUT_SCHEMA_VERSION`] with no migrations registered.
    #[must_use]
    pub fn new(store: Store, essential: EssentialPanels) -> Self {
        Self {
            store,
            migrations: MigrationGraph::new(),
            schema_version: LAYOUT_SCHEMA_VERSION,
            essential,
        }
    }

    /// Manager validating against the essential panels named in `settings`.
    #[must_use]
    pub fn from_settings(store: Store, settings: &LayoutSettings) -> Self {
        Self::new(store, settings.essential_panels.clone())
    }

    #[must_use]
    pub fn with_migrations(mut self, migrations: MigrationGraph) -> Self {
        self.migrations = migrations;
        self
    }

    /// Override the current schema version (upgrades staged behind a flag, tests).
    #[must_use]
    pub fn with_schema_version(mut self, version: u32) -> Self {
        self.schema_version = version;
        self
    }

    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn essential_panels(&self) -> &EssentialPanels {
        &self.essential
    }

    /// Persist `snapshot` as both the primary record and the backup.
    ///
    /// Returns the stamped document that was written.
    pub fn save(
        &self,
        prefix: &str,
        namespace: &str,
        snapshot: &LayoutSnapshot,
        config_version: u32,
    ) -> LayoutDocument {
        let doc = LayoutDocument::stamp(
            snapshot.clone(),
            self.schema_version,
            config_version,
            now_millis(),
        );
        match serde_json::to_string(&doc) {
            Ok(payload) => {
                self.store
                    .set_key(StoreKey::scoped(prefix, namespace, LAYOUT_SUFFIX), &payload);
                self.store.set_key(
                    StoreKey::scoped(prefix, namespace, LAST_KNOWN_GOOD_SUFFIX),
                    &payload,
                );
                tracing::debug!(
                    namespace,
                    panels = doc.panels.len(),
                    bytes = payload.len(),
                    "saved layout"
                );
            }
            Err(e) => {
                tracing::warn!(namespace, error = %e, "failed to serialize layout, skipping save");
            }
        }
        doc
    }

    /// Load a usable layout, or `None` when the caller must rebuild.
    #[must_use]
    pub fn load(
        &self,
        prefix: &str,
        namespace: &str,
        known: Option<&dyn ComponentCatalog>,
        config_version: Option<u32>,
    ) -> Option<LayoutDocument> {
        self.load_detailed(prefix, namespace, known, config_version)
            .into_document()
    }

    /// Like [`load`](Self::load), reporting where the layout came from.
    pub fn load_detailed(
        &self,
        prefix: &str,
        namespace: &str,
        known: Option<&dyn ComponentCatalog>,
        config_version: Option<u32>,
    ) -> LoadOutcome {
        let Some(primary_raw) = self
            .store
            .get_key(StoreKey::scoped(prefix, namespace, LAYOUT_SUFFIX))
        else {
            tracing::debug!(namespace, "no stored layout");
            return LoadOutcome::Absent(AbsentReason::NotStored);
        };

        let primary = match self.accept(&primary_raw, known, config_version) {
            Ok(doc) => return LoadOutcome::Primary(doc),
            Err(LayoutRejection::ConfigVersionMismatch { stored, expected }) => {
                tracing::info!(
                    namespace,
                    ?stored,
                    expected,
                    "panel configuration changed, discarding stored layout"
                );
                return LoadOutcome::Absent(AbsentReason::ConfigVersionMismatch {
                    stored,
                    expected,
                });
            }
            Err(rejection) => rejection,
        };
        tracing::warn!(namespace, reason = %primary, "stored layout rejected, trying last known good");

        let Some(backup_raw) = self
            .store
            .get_key(StoreKey::scoped(prefix, namespace, LAST_KNOWN_GOOD_SUFFIX))
        else {
            return LoadOutcome::Absent(AbsentReason::Unrecoverable {
                primary,
                backup: None,
            });
        };

        match self.accept(&backup_raw, known, config_version) {
            Ok(doc) => {
                tracing::info!(namespace, "recovered layout from last known good");
                LoadOutcome::Backup(doc)
            }
            Err(backup) => {
                tracing::warn!(namespace, reason = %backup, "last known good layout rejected");
                LoadOutcome::Absent(AbsentReason::Unrecoverable {
                    primary,
                    backup: Some(backup),
                })
            }
        }
    }

    /// Run the load pipeline on the last-known-good record alone.
    ///
    /// For callers whose host refused an otherwise valid primary document.
    #[must_use]
    pub fn load_backup(
        &self,
        prefix: &str,
        namespace: &str,
        known: Option<&dyn ComponentCatalog>,
        config_version: Option<u32>,
    ) -> Option<LayoutDocument> {
        let raw = self
            .store
            .get_key(StoreKey::scoped(prefix, namespace, LAST_KNOWN_GOOD_SUFFIX))?;
        match self.accept(&raw, known, config_version) {
            Ok(doc) => Some(doc),
            Err(reason) => {
                tracing::warn!(namespace, %reason, "last known good layout rejected");
                None
            }
        }
    }

    /// Remove the primary record and its backup.
    pub fn clear(&self, prefix: &str, namespace: &str) {
        self.store
            .delete_key(StoreKey::scoped(prefix, namespace, LAYOUT_SUFFIX));
        self.store
            .delete_key(StoreKey::scoped(prefix, namespace, LAST_KNOWN_GOOD_SUFFIX));
    }

    #[must_use]
    pub fn has_stored_layout(&self, prefix: &str, namespace: &str) -> bool {
        self.store
            .get_key(StoreKey::scoped(prefix, namespace, LAYOUT_SUFFIX))
            .is_some()
    }

    /// Namespaces under `prefix` that hold a primary layout record, sorted.
    #[must_use]
    pub fn stored_namespaces(&self, prefix: &str) -> Vec<String> {
        let head = format!("{prefix}-");
        let tail = format!("-{LAYOUT_SUFFIX}");
        let mut namespaces: Vec<String> = self
            .store
            .keys()
            .iter()
            .filter_map(|key| key.strip_prefix(&head)?.strip_suffix(&tail))
            .filter(|namespace| !namespace.is_empty() && !namespace.contains('-'))
            .map(str::to_string)
            .collect();
        namespaces.sort();
        namespaces
    }

    /// Parse, version-check, migrate, and validate one stored record.
    fn accept(
        &self,
        raw: &str,
        known: Option<&dyn ComponentCatalog>,
        config_version: Option<u32>,
    ) -> Result<LayoutDocument, LayoutRejection> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| LayoutRejection::Malformed(e.to_string()))?;

        if let Some(expected) = config_version {
            let stored = value.get("configVersion").and_then(Value::as_u64);
            if stored != Some(u64::from(expected)) {
                return Err(LayoutRejection::ConfigVersionMismatch { stored, expected });
            }
        }

        let stored_schema = value
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .map_or(Ok(0), u32::try_from)
            .map_err(|e| LayoutRejection::Malformed(format!("schemaVersion: {e}")))?;
        let value = if stored_schema < self.schema_version {
            let migrated = self
                .migrations
                .migrate(value, stored_schema, self.schema_version)
                .map_err(LayoutRejection::Migration)?;
            tracing::info!(
                from = stored_schema,
                to = self.schema_version,
                "migrated stored layout"
            );
            migrated
        } else {
            value
        };

        let doc = parse_document(value).map_err(LayoutRejection::Invalid)?;
        StructuralValidator::new(&self.essential)
            .with_catalog(known)
            .check(&doc)
            .map_err(LayoutRejection::Invalid)?;
        Ok(doc)
    }
}

impl fmt::Debug for LayoutManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutManager")
            .field("store", &self.store)
            .field("schema_version", &self.schema_version)
            .field("migrations", &self.migrations)
            .field("essential", &self.essential)
            .finish()
    }
}

fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
