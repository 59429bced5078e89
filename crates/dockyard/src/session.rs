//! Workspace bootstrap and autosave.
//!
//! Opening a workspace either restores its persisted layout into the host or
//! rebuilds the default arrangement from panel configuration. Either way the
//! session then subscribes to the host's structural-change notifications so
//! every rearrangement is saved (primary record plus last-known-good backup)
//! synchronously, without debouncing.

use std::fmt;
use std::sync::Arc;

use dockyard_core::{LayoutDocument, namespace_for};
use dockyard_persist::{LayoutManager, LayoutSettings, LoadOutcome, OpenTabs, Preferences};
use dockyard_reconcile::{DockHost, PanelConfig, PanelReconciler, ReconcileReport};

/// How the live layout of a session came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOrigin {
    /// A persisted layout was restored. `recovered` is set when the primary
    /// record was rejected and the last-known-good backup was used instead.
    Restored { recovered: bool },
    /// No usable layout; the default arrangement was rebuilt.
    Rebuilt(ReconcileReport),
}

impl SessionOrigin {
    #[must_use]
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored { .. })
    }
}

/// One open workspace: a dock host bound to its persistence namespace.
pub struct WorkspaceSession<H: DockHost> {
    host: H,
    manager: Arc<LayoutManager>,
    settings: LayoutSettings,
    namespace: String,
    origin: SessionOrigin,
}

impl<H: DockHost> WorkspaceSession<H> {
    /// Open the workspace named by `identifier` (a path-like string; `None`
    /// or empty selects the shared default namespace).
    pub fn open(
        identifier: Option<&str>,
        mut host: H,
        manager: Arc<LayoutManager>,
        settings: LayoutSettings,
        configs: &[PanelConfig],
    ) -> Self {
        let namespace = namespace_for(identifier);
        if !manager.store().is_available() {
            tracing::warn!(
                namespace = %namespace,
                backend = manager.store().backend_name(),
                "storage unavailable, layout changes will not persist"
            );
        }
        let outcome = manager.load_detailed(
            &settings.prefix,
            &namespace,
            settings.catalog(),
            Some(settings.config_version),
        );

        let mut recovered = outcome.is_recovered();
        let restored = match outcome {
            LoadOutcome::Primary(doc) if host.restore(&doc) => true,
            LoadOutcome::Primary(_) => {
                tracing::warn!(namespace = %namespace, "host refused stored layout, trying last known good");
                recovered = manager
                    .load_backup(
                        &settings.prefix,
                        &namespace,
                        settings.catalog(),
                        Some(settings.config_version),
                    )
                    .is_some_and(|backup| host.restore(&backup));
                recovered
            }
            LoadOutcome::Backup(doc) => {
                let accepted = host.restore(&doc);
                if !accepted {
                    tracing::warn!(namespace = %namespace, "host refused last known good layout");
                }
                accepted
            }
            LoadOutcome::Absent(reason) => {
                tracing::debug!(namespace = %namespace, ?reason, "no usable stored layout");
                false
            }
        };

        let origin = if restored {
            if recovered {
                // Rewrite the rejected primary record from the backup.
                manager.save(
                    &settings.prefix,
                    &namespace,
                    &host.serialize(),
                    settings.config_version,
                );
            }
            tracing::info!(namespace = %namespace, recovered, "restored workspace layout");
            SessionOrigin::Restored { recovered }
        } else {
            let report = PanelReconciler::new(&mut host).reconcile(configs);
            manager.save(
                &settings.prefix,
                &namespace,
                &host.serialize(),
                settings.config_version,
            );
            tracing::info!(
                namespace = %namespace,
                panels = report.created.len(),
                "rebuilt default workspace layout"
            );
            SessionOrigin::Rebuilt(report)
        };

        let autosave = Arc::clone(&manager);
        let prefix = settings.prefix.clone();
        let scope = namespace.clone();
        let config_version = settings.config_version;
        host.on_structural_change(Box::new(move |snapshot| {
            autosave.save(&prefix, &scope, snapshot, config_version);
        }));

        Self {
            host,
            manager,
            settings,
            namespace,
            origin,
        }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutations made through the host are saved automatically.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[must_use]
    pub fn origin(&self) -> &SessionOrigin {
        &self.origin
    }

    #[must_use]
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    #[must_use]
    pub fn manager(&self) -> &LayoutManager {
        &self.manager
    }

    /// Save the live layout outside of a structural change.
    pub fn save_now(&self) -> LayoutDocument {
        self.manager.save(
            &self.settings.prefix,
            &self.namespace,
            &self.host.serialize(),
            self.settings.config_version,
        )
    }

    /// Drop the persisted layout so the next open rebuilds the default.
    ///
    /// The live layout is untouched, and the next structural change saves
    /// it again.
    pub fn forget(&self) {
        self.manager.clear(&self.settings.prefix, &self.namespace);
        tracing::info!(namespace = %self.namespace, "forgot workspace layout");
    }

    #[must_use]
    pub fn preferences(&self) -> Preferences<'_> {
        Preferences::new(self.manager.store(), &self.settings.prefix)
    }

    #[must_use]
    pub fn open_tabs(&self) -> OpenTabs {
        self.preferences().open_tabs(&self.namespace)
    }

    pub fn set_open_tabs(&self, tabs: &OpenTabs) {
        self.preferences().set_open_tabs(&self.namespace, tabs);
    }
}

impl<H: DockHost> fmt::Debug for WorkspaceSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceSession")
            .field("namespace", &self.namespace)
            .field("origin", &self.origin)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
