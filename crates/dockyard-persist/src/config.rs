//! Layout persistence settings.

use std::collections::BTreeSet;

use dockyard_core::{ComponentCatalog, EssentialPanels};
use serde::{Deserialize, Serialize};

/// Default storage key prefix.
pub const DEFAULT_PREFIX: &str = "dockyard";

/// Caller-side settings shared by save and load.
///
/// Deserializable so applications can embed it in their own config files;
/// every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
    /// First segment of every storage key.
    pub prefix: String,
    /// Version of the panel-type set. Bump when panels are added or removed
    /// so stale layouts are rebuilt instead of restored.
    pub config_version: u32,
    /// Panels every valid layout must contain, each in its own group.
    pub essential_panels: EssentialPanels,
    /// Renderer kinds the application can instantiate. `None` skips the check.
    pub known_components: Option<BTreeSet<String>>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            config_version: 1,
            essential_panels: EssentialPanels::new(),
            known_components: None,
        }
    }
}

impl LayoutSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn config_version(mut self, version: u32) -> Self {
        self.config_version = version;
        self
    }

    #[must_use]
    pub fn essential_panels(mut self, panels: EssentialPanels) -> Self {
        self.essential_panels = panels;
        self
    }

    #[must_use]
    pub fn known_components<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_components = Some(kinds.into_iter().map(Into::into).collect());
        self
    }

    /// Catalog view for the validator.
    #[must_use]
    pub fn catalog(&self) -> Option<&dyn ComponentCatalog> {
        self.known_components
            .as_ref()
            .map(|kinds| kinds as &dyn ComponentCatalog)
    }
}
