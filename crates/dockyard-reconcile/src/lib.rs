#![forbid(unsafe_code)]

//! Dock host contract and declarative panel reconstruction.
//!
//! When no persisted layout is usable, the default arrangement is rebuilt
//! from a list of [`PanelConfig`]s by [`PanelReconciler`]. The rendering
//! engine is reached only through the [`DockHost`] trait;
//! [`MemoryDockHost`] implements it headlessly.
//!
//! # Example
//!
//! ```
//! use dockyard_reconcile::{DockHost, MemoryDockHost, PanelConfig, PanelReconciler, PositionToken};
//!
//! let configs = vec![
//!     PanelConfig::new("editor", "editor"),
//!     PanelConfig::new("files", "fileTree").position(PositionToken::Left),
//! ];
//! let mut host = MemoryDockHost::new();
//! let report = PanelReconciler::new(&mut host).reconcile(&configs);
//! assert_eq!(report.created.len(), 2);
//! assert_eq!(host.list_panels().len(), 2);
//! ```

pub mod config;
pub mod host;
pub mod memory;
pub mod position;
pub mod reconciler;

pub use config::PanelConfig;
pub use host::{
    Direction, DockHost, GroupFlags, PanelHandle, PanelSpec, Placement, PlacementReference,
    StructuralChangeCallback,
};
pub use memory::MemoryDockHost;
pub use position::{PanelPosition, PositionDescriptor, PositionToken};
pub use reconciler::{PanelReconciler, ReconcileReport};
