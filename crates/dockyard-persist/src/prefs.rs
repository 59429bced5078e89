//! Small UI preferences persisted next to the layout.
//!
//! Theme and sidebar state are shared by every workspace; the open-tab list
//! belongs to one workspace namespace.

use serde::{Deserialize, Serialize};

use crate::store::{SIDEBAR_COLLAPSED_SUFFIX, Store, StoreKey, TABS_SUFFIX, THEME_SUFFIX};

/// Editor tabs open in one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenTabs {
    pub files: Vec<String>,
    pub active: Option<String>,
}

/// Preference accessor bound to a key prefix.
#[derive(Debug, Clone, Copy)]
pub struct Preferences<'a> {
    store: &'a Store,
    prefix: &'a str,
}

impl<'a> Preferences<'a> {
    #[must_use]
    pub fn new(store: &'a Store, prefix: &'a str) -> Self {
        Self { store, prefix }
    }

    #[must_use]
    pub fn theme(&self) -> Option<String> {
        self.store
            .get_key(StoreKey::shared(self.prefix, THEME_SUFFIX))
    }

    pub fn set_theme(&self, theme: &str) {
        self.store
            .set_key(StoreKey::shared(self.prefix, THEME_SUFFIX), theme);
    }

    /// Collapsed state of the sidebar; expanded when never stored.
    #[must_use]
    pub fn sidebar_collapsed(&self) -> bool {
        self.store
            .get_json(StoreKey::shared(self.prefix, SIDEBAR_COLLAPSED_SUFFIX))
            .unwrap_or(false)
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) {
        self.store.set_json(
            StoreKey::shared(self.prefix, SIDEBAR_COLLAPSED_SUFFIX),
            &collapsed,
        );
    }

    #[must_use]
    pub fn open_tabs(&self, namespace: &str) -> OpenTabs {
        self.store
            .get_json(StoreKey::scoped(self.prefix, namespace, TABS_SUFFIX))
            .unwrap_or_default()
    }

    pub fn set_open_tabs(&self, namespace: &str, tabs: &OpenTabs) {
        self.store
            .set_json(StoreKey::scoped(self.prefix, namespace, TABS_SUFFIX), tabs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_preferences_ignore_namespace() {
        let store = Store::in_memory();
        let prefs = Preferences::new(&store, "dockyard");
        assert_eq!(prefs.theme(), None);
        assert!(!prefs.sidebar_collapsed());

        prefs.set_theme("dark");
        prefs.set_sidebar_collapsed(true);
        assert_eq!(
            store.get("dockyard", None, THEME_SUFFIX).as_deref(),
            Some("dark")
        );
        assert_eq!(
            store.get("dockyard", None, SIDEBAR_COLLAPSED_SUFFIX).as_deref(),
            Some("true")
        );
        assert!(prefs.sidebar_collapsed());
    }

    #[test]
    fn tabs_are_per_workspace() {
        let store = Store::in_memory();
        let prefs = Preferences::new(&store, "dockyard");
        let tabs = OpenTabs {
            files: vec!["src/main.rs".into(), "Cargo.toml".into()],
            active: Some("Cargo.toml".into()),
        };
        prefs.set_open_tabs("ws1", &tabs);
        assert_eq!(prefs.open_tabs("ws1"), tabs);
        assert_eq!(prefs.open_tabs("ws2"), OpenTabs::default());
    }

    #[test]
    fn corrupt_tabs_fall_back_to_empty() {
        let store = Store::in_memory();
        store.set("dockyard", Some("ws1"), TABS_SUFFIX, "[[[");
        assert_eq!(
            Preferences::new(&store, "dockyard").open_tabs("ws1"),
            OpenTabs::default()
        );
    }
}
