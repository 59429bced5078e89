//! Persisted layout document schema.
//!
//! A layout is a split tree whose leaves are panel groups (tab sets). Groups
//! reference panels by id; the panel records themselves live in a flat map
//! next to the tree so a panel is never duplicated.
//!
//! The wire format is camelCase JSON:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "configVersion": 3,
//!   "savedAt": 1718000000000,
//!   "grid": { "type": "leaf", "group": { "id": "g1", "views": ["editor"] } },
//!   "panels": { "editor": { "id": "editor", "contentComponent": "editor" } }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current layout document schema version.
///
/// Bump this (and register a migration) when the persisted shape changes in
/// a way older readers cannot deserialize.
pub const LAYOUT_SCHEMA_VERSION: u32 = 1;

/// Stable identifier of a dockable panel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PanelId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Identifier of a panel group (tab set).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for GroupId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Persisted record of one panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelRecord {
    pub id: PanelId,
    /// Renderer kind; must be known to the component catalog at load time.
    #[serde(rename = "contentComponent")]
    pub component_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Opaque renderer parameters. Never interpreted by the layout engine.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl PanelRecord {
    #[must_use]
    pub fn new(id: impl Into<PanelId>, component_kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_kind: component_kind.into(),
            title: None,
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }
}

/// A tab set holding one or more panels that share screen space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelGroup {
    pub id: GroupId,
    /// Panel ids in tab order.
    #[serde(default)]
    pub views: Vec<PanelId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_view: Option<PanelId>,
    /// Locked groups refuse drops of foreign panels.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hide_header: bool,
}

impl PanelGroup {
    #[must_use]
    pub fn new(id: impl Into<GroupId>) -> Self {
        Self {
            id: id.into(),
            views: Vec::new(),
            active_view: None,
            locked: false,
            hide_header: false,
        }
    }

    #[must_use]
    pub fn with_views<I, P>(mut self, views: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PanelId>,
    {
        self.views = views.into_iter().map(Into::into).collect();
        self.active_view = self.views.first().cloned();
        self
    }

    #[must_use]
    pub fn contains(&self, panel: &PanelId) -> bool {
        self.views.contains(panel)
    }
}

/// Orientation of a branch node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Children laid out left to right.
    #[default]
    Horizontal,
    /// Children laid out top to bottom.
    Vertical,
}

/// Node of the layout split tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Branch {
        #[serde(default)]
        orientation: Orientation,
        children: Vec<TreeNode>,
    },
    Leaf {
        group: PanelGroup,
    },
}

impl TreeNode {
    #[must_use]
    pub fn leaf(group: PanelGroup) -> Self {
        Self::Leaf { group }
    }

    #[must_use]
    pub fn branch(orientation: Orientation, children: Vec<TreeNode>) -> Self {
        Self::Branch {
            orientation,
            children,
        }
    }

    /// All groups in depth-first, left-to-right order.
    #[must_use]
    pub fn groups(&self) -> Vec<&PanelGroup> {
        let mut out = Vec::new();
        self.collect_groups(&mut out);
        out
    }

    fn collect_groups<'a>(&'a self, out: &mut Vec<&'a PanelGroup>) {
        match self {
            Self::Branch { children, .. } => {
                for child in children {
                    child.collect_groups(out);
                }
            }
            Self::Leaf { group } => out.push(group),
        }
    }

    /// The group whose tab set contains `panel`.
    #[must_use]
    pub fn group_containing(&self, panel: &PanelId) -> Option<&PanelGroup> {
        match self {
            Self::Branch { children, .. } => {
                children.iter().find_map(|child| child.group_containing(panel))
            }
            Self::Leaf { group } => group.contains(panel).then_some(group),
        }
    }

    #[must_use]
    pub fn group(&self, id: &GroupId) -> Option<&PanelGroup> {
        match self {
            Self::Branch { children, .. } => children.iter().find_map(|child| child.group(id)),
            Self::Leaf { group } => (&group.id == id).then_some(group),
        }
    }

    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut PanelGroup> {
        match self {
            Self::Branch { children, .. } => {
                children.iter_mut().find_map(|child| child.group_mut(id))
            }
            Self::Leaf { group } => (&group.id == id).then_some(group),
        }
    }

    /// Every panel id referenced by any group, in tree order.
    #[must_use]
    pub fn panel_ids(&self) -> Vec<&PanelId> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.views.iter())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups().is_empty()
    }
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::branch(Orientation::Horizontal, Vec::new())
    }
}

/// Live layout as produced by a dock host: tree plus panel records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(rename = "grid")]
    pub tree: TreeNode,
    pub panels: BTreeMap<PanelId, PanelRecord>,
}

impl LayoutSnapshot {
    #[must_use]
    pub fn new(tree: TreeNode, panels: BTreeMap<PanelId, PanelRecord>) -> Self {
        Self { tree, panels }
    }
}

/// Versioned, timestamped layout as persisted by the layout manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub schema_version: u32,
    #[serde(default)]
    pub config_version: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub saved_at: u64,
    #[serde(rename = "grid")]
    pub tree: TreeNode,
    pub panels: BTreeMap<PanelId, PanelRecord>,
}

impl LayoutDocument {
    /// Stamp a host snapshot with version metadata.
    #[must_use]
    pub fn stamp(
        snapshot: LayoutSnapshot,
        schema_version: u32,
        config_version: u32,
        saved_at: u64,
    ) -> Self {
        Self {
            schema_version,
            config_version,
            saved_at,
            tree: snapshot.tree,
            panels: snapshot.panels,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::new(self.tree.clone(), self.panels.clone())
    }

    #[must_use]
    pub fn into_snapshot(self) -> LayoutSnapshot {
        LayoutSnapshot::new(self.tree, self.panels)
    }

    /// Equality on everything except `saved_at`.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.schema_version == other.schema_version
            && self.config_version == other.config_version
            && self.tree == other.tree
            && self.panels == other.panels
    }
}
