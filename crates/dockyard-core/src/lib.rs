#![forbid(unsafe_code)]

//! Dockyard core: the layout document model shared by persistence and
//! reconciliation.
//!
//! # Key Components
//!
//! - [`LayoutDocument`] / [`LayoutSnapshot`] - persisted and live layout shapes
//! - [`TreeNode`] - closed branch/leaf split tree whose leaves are [`PanelGroup`]s
//! - [`namespace_for`] - stable per-workspace storage namespace
//! - [`StructuralValidator`] - the load-time gate between "usable" and "discard"

pub mod model;
pub mod namespace;
pub mod validate;

pub use model::{
    GroupId, LAYOUT_SCHEMA_VERSION, LayoutDocument, LayoutSnapshot, Orientation, PanelGroup,
    PanelId, PanelRecord, TreeNode,
};
pub use namespace::{DEFAULT_NAMESPACE, namespace_for};
pub use validate::{
    ComponentCatalog, EssentialPanels, LayoutViolation, StructuralValidator, check_shape,
    parse_document, validate,
};
