//! End-to-end workspace lifecycle: open, rearrange, reload, recover.

use std::sync::Arc;

use dockyard::prelude::*;
use dockyard::persist::{LAYOUT_SUFFIX, StoreKey};
use dockyard::reconcile::{Direction, PanelSpec, Placement, PlacementReference};
use dockyard::{LayoutDocument, namespace_for};

const WORKSPACE: &str = "/home/dev/dockyard";

fn configs() -> Vec<PanelConfig> {
    vec![
        PanelConfig::new("terminal", "terminal")
            .position(PositionDescriptor::toward(Direction::Below).of_panel("editor")),
        PanelConfig::new("files", "fileTree")
            .position(PositionToken::Left)
            .hide_header(true),
        PanelConfig::new("editor", "editor").position(PositionToken::Right),
        PanelConfig::new("chat", "chat")
            .position(PositionToken::Right)
            .locked(true),
    ]
}

fn settings() -> LayoutSettings {
    LayoutSettings::new()
        .config_version(3)
        .essential_panels(EssentialPanels::from_iter(["editor", "chat"]))
        .known_components(["terminal", "fileTree", "editor", "chat", "notes"])
}

fn open(
    store: &Store,
    settings: LayoutSettings,
    host: MemoryDockHost,
) -> WorkspaceSession<MemoryDockHost> {
    let manager = Arc::new(LayoutManager::from_settings(store.clone(), &settings));
    WorkspaceSession::open(Some(WORKSPACE), host, manager, settings, &configs())
}

fn stored(store: &Store, settings: &LayoutSettings) -> Option<LayoutDocument> {
    LayoutManager::from_settings(store.clone(), settings).load(
        &settings.prefix,
        &namespace_for(Some(WORKSPACE)),
        settings.catalog(),
        Some(settings.config_version),
    )
}

fn spec(id: &str, kind: &str) -> PanelSpec {
    PanelSpec {
        id: PanelId::new(id),
        component_kind: kind.to_string(),
        title: None,
        params: Default::default(),
    }
}

#[test]
fn save_then_reload_is_identical_except_timestamp() {
    let store = Store::in_memory();
    let settings = settings();
    let first = open(&store, settings.clone(), MemoryDockHost::new());
    let SessionOrigin::Rebuilt(report) = first.origin() else {
        panic!("first open must rebuild");
    };
    assert!(report.is_clean());
    assert_eq!(report.deferred, vec![PanelId::new("terminal")]);

    let mut saved = first.save_now();
    let loaded = stored(&store, &settings).expect("layout persisted");
    assert!(loaded.same_content(&saved));
    saved.saved_at = loaded.saved_at;
    assert_eq!(loaded, saved);

    let second = open(&store, settings, MemoryDockHost::new());
    assert!(second.origin().is_restored());
    assert_eq!(second.host().serialize(), first.host().serialize());
}

#[test]
fn structural_changes_are_autosaved() {
    let store = Store::in_memory();
    let settings = settings();
    let mut session = open(&store, settings.clone(), MemoryDockHost::new());

    let placement = Placement {
        direction: Some(Direction::Within),
        reference: Some(PlacementReference::Panel(PanelId::new("editor"))),
    };
    session
        .host_mut()
        .create_panel(spec("notes", "notes"), &placement)
        .expect("notes created");

    let doc = stored(&store, &settings).expect("autosaved");
    assert!(doc.panels.contains_key(&PanelId::new("notes")));
    let group = doc
        .tree
        .group_containing(&PanelId::new("notes"))
        .expect("notes docked");
    assert!(group.contains(&PanelId::new("editor")));
}

#[test]
fn config_version_bump_rebuilds() {
    let store = Store::in_memory();
    let settings = settings();
    let mut session = open(&store, settings.clone(), MemoryDockHost::new());
    session.host_mut().remove_panel(&PanelId::new("terminal"));
    assert!(stored(&store, &settings).is_some());

    let bumped = settings.clone().config_version(4);
    assert!(stored(&store, &bumped).is_none());

    let reopened = open(&store, bumped.clone(), MemoryDockHost::new());
    let SessionOrigin::Rebuilt(report) = reopened.origin() else {
        panic!("config change must rebuild");
    };
    assert_eq!(report.created.len(), 4);
    assert!(stored(&store, &bumped).is_some());
}

#[test]
fn corrupted_primary_recovers_from_backup() {
    let store = Store::in_memory();
    let settings = settings();
    let first = open(&store, settings.clone(), MemoryDockHost::new());
    let expected = first.host().serialize();

    let namespace = namespace_for(Some(WORKSPACE));
    let primary = StoreKey::scoped(&settings.prefix, &namespace, LAYOUT_SUFFIX);
    store.set_key(primary, "{ not json");

    let second = open(&store, settings.clone(), MemoryDockHost::new());
    assert_eq!(
        second.origin(),
        &SessionOrigin::Restored { recovered: true }
    );
    assert_eq!(second.host().serialize(), expected);

    // The primary record was rewritten from the recovered layout.
    let raw = store.get_key(primary).expect("primary rewritten");
    let repaired: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(repaired["configVersion"], 3);
}

#[test]
fn merged_essentials_are_rejected_on_next_open() {
    let store = Store::in_memory();
    let settings = settings();
    let mut session = open(&store, settings.clone(), MemoryDockHost::new());

    // Save never validates: tabbing chat into the editor group is persisted
    // as both primary and backup, and only caught on the next load.
    session.host_mut().remove_panel(&PanelId::new("chat"));
    let placement = Placement {
        direction: Some(Direction::Within),
        reference: Some(PlacementReference::Panel(PanelId::new("editor"))),
    };
    session
        .host_mut()
        .create_panel(spec("chat", "chat"), &placement)
        .expect("chat re-created");
    assert!(stored(&store, &settings).is_none());

    let reopened = open(&store, settings, MemoryDockHost::new());
    assert!(!reopened.origin().is_restored());
    let editor = reopened
        .host()
        .group_of(&PanelId::new("editor"))
        .expect("editor docked");
    assert!(!editor.contains(&PanelId::new("chat")));
}

#[test]
fn unknown_component_forces_rebuild() {
    let store = Store::in_memory();
    let settings = settings();
    open(&store, settings.clone(), MemoryDockHost::new());

    let narrowed = settings.known_components(["terminal", "fileTree", "editor"]);
    assert!(stored(&store, &narrowed).is_none());
}

#[test]
fn file_storage_persists_across_sessions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("layout.json");
    let settings = settings();

    let expected = {
        let store = Store::new(Arc::new(FileStorage::new(&path)));
        let session = open(&store, settings.clone(), MemoryDockHost::new());
        session.preferences().set_theme("dark");
        session.host().serialize()
    };
    assert!(path.exists());

    let store = Store::new(Arc::new(FileStorage::new(&path)));
    let session = open(&store, settings, MemoryDockHost::new());
    assert!(session.origin().is_restored());
    assert_eq!(session.host().serialize(), expected);
    assert_eq!(session.preferences().theme().as_deref(), Some("dark"));
}

#[test]
fn group_flags_survive_reload() {
    let store = Store::in_memory();
    let settings = settings();
    open(&store, settings.clone(), MemoryDockHost::new());

    let session = open(&store, settings, MemoryDockHost::new());
    assert!(session.origin().is_restored());
    let chat = session
        .host()
        .group_of(&PanelId::new("chat"))
        .expect("chat docked");
    assert!(chat.locked);
    let files = session
        .host()
        .group_of(&PanelId::new("files"))
        .expect("files docked");
    assert!(files.hide_header && !files.locked);
}
