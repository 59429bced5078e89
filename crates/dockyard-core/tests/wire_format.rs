//! Validation of persisted documents as they appear on the wire.

use dockyard_core::{
    EssentialPanels, LayoutViolation, PanelId, StructuralValidator, check_shape, namespace_for,
    parse_document,
};
use serde_json::json;

fn stored() -> serde_json::Value {
    json!({
        "schemaVersion": 1,
        "configVersion": 7,
        "savedAt": 1718000000000u64,
        "grid": {
            "type": "branch",
            "orientation": "horizontal",
            "children": [
                { "type": "leaf", "group": { "id": "g1", "views": ["files"], "hideHeader": true } },
                {
                    "type": "branch",
                    "orientation": "vertical",
                    "children": [
                        { "type": "leaf", "group": { "id": "g2", "views": ["editor", "notes"], "activeView": "notes" } },
                        { "type": "leaf", "group": { "id": "g3", "views": ["terminal"], "locked": true } }
                    ]
                }
            ]
        },
        "panels": {
            "files": { "id": "files", "contentComponent": "fileTree" },
            "editor": { "id": "editor", "contentComponent": "editor", "params": { "path": "lib.rs" } },
            "notes": { "id": "notes", "contentComponent": "notes", "title": "Scratch" },
            "terminal": { "id": "terminal", "contentComponent": "terminal" }
        }
    })
}

#[test]
fn stored_document_passes_all_rules() {
    let essential: EssentialPanels = ["editor", "terminal"].into_iter().collect();
    let known = ["fileTree", "editor", "notes", "terminal"];
    let doc = StructuralValidator::new(&essential)
        .with_catalog(Some(&known))
        .check_value(stored())
        .expect("valid");

    assert_eq!(doc.config_version, 7);
    assert_eq!(doc.tree.panel_ids().len(), 4);
    let notes = &doc.panels[&PanelId::new("notes")];
    assert_eq!(notes.title.as_deref(), Some("Scratch"));
    let g2 = doc
        .tree
        .group_containing(&PanelId::new("editor"))
        .expect("editor docked");
    assert_eq!(g2.active_view, Some(PanelId::new("notes")));
}

#[test]
fn shape_rules_run_before_parsing() {
    let mut no_grid = stored();
    no_grid.as_object_mut().expect("object").remove("grid");
    assert!(matches!(check_shape(&no_grid), Err(LayoutViolation::MissingTree)));

    let mut no_panels = stored();
    no_panels["panels"] = json!(null);
    assert!(matches!(
        parse_document(no_panels),
        Err(LayoutViolation::MissingPanels)
    ));

    assert!(matches!(
        check_shape(&json!([1, 2])),
        Err(LayoutViolation::NotAnObject)
    ));
}

#[test]
fn unknown_node_type_is_malformed() {
    let mut doc = stored();
    doc["grid"]["type"] = json!("floating");
    assert!(matches!(
        parse_document(doc),
        Err(LayoutViolation::Malformed { .. })
    ));
}

#[test]
fn namespaces_are_stable_tokens() {
    assert_eq!(namespace_for(None), "default");
    assert_eq!(namespace_for(Some("")), "default");
    let token = namespace_for(Some("/srv/repos/dockyard"));
    assert_eq!(token, namespace_for(Some("/srv/repos/dockyard")));
    assert!(token.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
}
