//! Static panel configuration read at bootstrap.

use dockyard_core::PanelId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::host::{GroupFlags, PanelSpec};
use crate::position::PanelPosition;

/// Declarative description of one panel in the default arrangement.
///
/// Only consulted when no persisted layout is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelConfig {
    pub id: PanelId,
    pub component_kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PanelPosition>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hide_header: bool,
}

impl PanelConfig {
    #[must_use]
    pub fn new(id: impl Into<PanelId>, component_kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_kind: component_kind.into(),
            title: None,
            position: None,
            params: Map::new(),
            locked: false,
            hide_header: false,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn position(mut self, position: impl Into<PanelPosition>) -> Self {
        self.position = Some(position.into());
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    #[must_use]
    pub fn hide_header(mut self, hide: bool) -> Self {
        self.hide_header = hide;
        self
    }

    #[must_use]
    pub fn spec(&self) -> PanelSpec {
        PanelSpec {
            id: self.id.clone(),
            component_kind: self.component_kind.clone(),
            title: self.title.clone(),
            params: self.params.clone(),
        }
    }

    #[must_use]
    pub fn group_flags(&self) -> GroupFlags {
        GroupFlags {
            locked: self.locked,
            hide_header: self.hide_header,
        }
    }
}
