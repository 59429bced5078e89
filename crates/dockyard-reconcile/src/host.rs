//! Narrow contract over the panel-rendering engine.
//!
//! The layout engine never touches renderers or the rendering engine's own
//! tree types. Everything it needs is expressed here, so the engine can be
//! swapped for [`MemoryDockHost`](crate::memory::MemoryDockHost) in tests.

use dockyard_core::{GroupId, LayoutDocument, LayoutSnapshot, Orientation, PanelId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a new panel goes relative to its reference (or the whole grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Above,
    Below,
    /// As a tab inside the reference group.
    Within,
}

impl Direction {
    /// Split orientation this direction produces; `None` for tabbing.
    #[must_use]
    pub const fn orientation(self) -> Option<Orientation> {
        match self {
            Self::Left | Self::Right => Some(Orientation::Horizontal),
            Self::Above | Self::Below => Some(Orientation::Vertical),
            Self::Within => None,
        }
    }

    /// Whether the new node is inserted before its reference.
    #[must_use]
    pub const fn is_leading(self) -> bool {
        matches!(self, Self::Left | Self::Above)
    }
}

/// Resolved anchor of a placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementReference {
    Panel(PanelId),
    Group(GroupId),
}

/// Concrete position handed to the host. The default is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub direction: Option<Direction>,
    pub reference: Option<PlacementReference>,
}

impl Placement {
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.direction.is_none() && self.reference.is_none()
    }
}

/// Everything the host needs to instantiate a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub id: PanelId,
    pub component_kind: String,
    pub title: Option<String>,
    pub params: Map<String, Value>,
}

/// Host-side handle of a live panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHandle {
    pub id: PanelId,
    /// Group currently holding the panel.
    pub group: GroupId,
}

/// Group-level flags applied after creation.
///
/// Flags are additive: a set flag turns the behavior on, an unset flag
/// leaves the group as it is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFlags {
    pub locked: bool,
    pub hide_header: bool,
}

impl GroupFlags {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.locked && !self.hide_header
    }
}

/// Callback fired after every structural change with the new live layout.
pub type StructuralChangeCallback = Box<dyn FnMut(&LayoutSnapshot)>;

/// Tree-mutation primitives exposed by the panel-rendering engine.
pub trait DockHost {
    /// Create a panel. `None` when the host refuses (duplicate id, unknown kind).
    fn create_panel(&mut self, spec: PanelSpec, placement: &Placement) -> Option<PanelHandle>;

    fn get_panel(&self, id: &PanelId) -> Option<PanelHandle>;

    fn list_panels(&self) -> Vec<PanelHandle>;

    /// Current tree and panel records.
    fn serialize(&self) -> LayoutSnapshot;

    /// Replace the live layout with `doc`. `false` leaves the host unchanged.
    fn restore(&mut self, doc: &LayoutDocument) -> bool;

    fn on_structural_change(&mut self, callback: StructuralChangeCallback);

    /// Turn on the set flags of `group`. `false` when the group is unknown.
    fn apply_group_flags(&mut self, group: &GroupId, flags: GroupFlags) -> bool;
}
