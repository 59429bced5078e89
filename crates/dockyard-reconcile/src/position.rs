//! Declarative panel positions.
//!
//! A config may give a symbolic token (`"left"`, `"right"`, `"above"`,
//! `"below"`, `"center"`) or an explicit descriptor naming a direction and a
//! reference panel or group:
//!
//! ```json
//! { "direction": "below", "referencePanel": "editor" }
//! ```
//!
//! `referenceGroup` names a *panel*; the placement targets whichever group
//! holds that panel once it exists.

use dockyard_core::PanelId;
use serde::{Deserialize, Serialize};

use crate::host::Direction;

/// Symbolic position shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionToken {
    Left,
    Right,
    Above,
    Below,
    Center,
}

/// Explicit position with optional anchors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PositionDescriptor {
    pub direction: Option<Direction>,
    pub reference_panel: Option<PanelId>,
    pub reference_group: Option<PanelId>,
}

impl PositionDescriptor {
    #[must_use]
    pub fn toward(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn of_panel(mut self, panel: impl Into<PanelId>) -> Self {
        self.reference_panel = Some(panel.into());
        self
    }

    #[must_use]
    pub fn in_group_of(mut self, panel: impl Into<PanelId>) -> Self {
        self.reference_group = Some(panel.into());
        self
    }

    /// Panels that must exist before this position can be honored.
    pub fn references(&self) -> impl Iterator<Item = &PanelId> {
        self.reference_panel.iter().chain(self.reference_group.iter())
    }
}

/// Position as written in panel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanelPosition {
    Token(PositionToken),
    Explicit(PositionDescriptor),
}

impl PanelPosition {
    /// First-pass resolution: symbolic tokens become fixed descriptors;
    /// `center` means no explicit position.
    #[must_use]
    pub fn resolve(&self) -> Option<PositionDescriptor> {
        match self {
            Self::Token(PositionToken::Left) => Some(PositionDescriptor::toward(Direction::Left)),
            Self::Token(PositionToken::Right) => {
                Some(PositionDescriptor::toward(Direction::Right))
            }
            Self::Token(PositionToken::Above) => {
                Some(PositionDescriptor::toward(Direction::Above))
            }
            Self::Token(PositionToken::Below) => {
                Some(PositionDescriptor::toward(Direction::Below))
            }
            Self::Token(PositionToken::Center) => None,
            Self::Explicit(descriptor) => Some(descriptor.clone()),
        }
    }
}

impl From<PositionToken> for PanelPosition {
    fn from(token: PositionToken) -> Self {
        Self::Token(token)
    }
}

impl From<PositionDescriptor> for PanelPosition {
    fn from(descriptor: PositionDescriptor) -> Self {
        Self::Explicit(descriptor)
    }
}
