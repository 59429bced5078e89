#![forbid(unsafe_code)]

//! Dockyard public facade crate.
//!
//! Re-exports the layout model, persistence, and reconciliation crates and
//! ties them together in [`WorkspaceSession`], which restores a workspace's
//! last layout (or rebuilds the default one) and keeps it saved as the user
//! rearranges panels.

pub mod session;

pub use session::{SessionOrigin, WorkspaceSession};

// --- Core re-exports -------------------------------------------------------

pub use dockyard_core::{
    ComponentCatalog, EssentialPanels, GroupId, LAYOUT_SCHEMA_VERSION, LayoutDocument,
    LayoutSnapshot, LayoutViolation, Orientation, PanelGroup, PanelId, PanelRecord,
    StructuralValidator, TreeNode, namespace_for,
};

// --- Persistence re-exports ------------------------------------------------

pub use dockyard_persist::{
    FileStorage, LayoutManager, LayoutSettings, LoadOutcome, MemoryStorage, MigrationError,
    MigrationGraph, OpenTabs, Preferences, StorageBackend, StorageError, Store,
};

// --- Reconcile re-exports --------------------------------------------------

pub use dockyard_reconcile::{
    Direction, DockHost, MemoryDockHost, PanelConfig, PanelPosition, PanelReconciler,
    PositionDescriptor, PositionToken, ReconcileReport,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DockHost, EssentialPanels, FileStorage, LayoutManager, LayoutSettings, MemoryDockHost,
        MemoryStorage, PanelConfig, PanelId, PositionDescriptor, PositionToken, SessionOrigin,
        Store, WorkspaceSession,
    };

    pub use crate::{core, persist, reconcile};
}

pub use dockyard_core as core;
pub use dockyard_persist as persist;
pub use dockyard_reconcile as reconcile;
