//! Structural validation of layout documents.
//!
//! Validation is the only gate between a persisted layout being used and it
//! being discarded. Rules run in a fixed order and stop at the first
//! violation:
//!
//! 1. The document carries both a tree (`grid`) and a panel map.
//! 2. Every essential panel id is a key of the panel map.
//! 3. When a component catalog is supplied, every panel's component kind is
//!    in it. A single unknown kind rejects the whole document.
//! 4. No group contains more than one essential panel.
//!
//! Rule 1 is a property of raw JSON ([`check_shape`]); a typed
//! [`LayoutDocument`] satisfies it by construction.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{GroupId, LayoutDocument, PanelId};

/// Set of renderer kinds the caller can instantiate.
pub trait ComponentCatalog {
    fn contains_kind(&self, kind: &str) -> bool;
}

impl ComponentCatalog for BTreeSet<String> {
    fn contains_kind(&self, kind: &str) -> bool {
        self.contains(kind)
    }
}

impl ComponentCatalog for HashSet<String> {
    fn contains_kind(&self, kind: &str) -> bool {
        self.contains(kind)
    }
}

impl<const N: usize> ComponentCatalog for [&str; N] {
    fn contains_kind(&self, kind: &str) -> bool {
        self.iter().any(|known| *known == kind)
    }
}

impl ComponentCatalog for Vec<String> {
    fn contains_kind(&self, kind: &str) -> bool {
        self.iter().any(|known| known == kind)
    }
}

/// Panels the application cannot function without.
///
/// Each must exist in every valid layout and must never share a group with
/// another essential panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EssentialPanels(BTreeSet<PanelId>);

impl EssentialPanels {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, panel: &PanelId) -> bool {
        self.0.contains(panel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PanelId> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<PanelId>> FromIterator<P> for EssentialPanels {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// First rule a layout document failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutViolation {
    NotAnObject,
    MissingTree,
    MissingPanels,
    Malformed {
        message: String,
    },
    MissingEssential {
        panel: PanelId,
    },
    UnknownComponent {
        panel: PanelId,
        kind: String,
    },
    EssentialsShareGroup {
        group: GroupId,
        first: PanelId,
        second: PanelId,
    },
}

impl fmt::Display for LayoutViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "layout document is not a JSON object"),
            Self::MissingTree => write!(f, "layout document has no grid"),
            Self::MissingPanels => write!(f, "layout document has no panel map"),
            Self::Malformed { message } => write!(f, "malformed layout document: {message}"),
            Self::MissingEssential { panel } => {
                write!(f, "essential panel {panel} is missing")
            }
            Self::UnknownComponent { panel, kind } => {
                write!(f, "panel {panel} uses unknown component kind {kind:?}")
            }
            Self::EssentialsShareGroup {
                group,
                first,
                second,
            } => write!(
                f,
                "essential panels {first} and {second} share group {group}"
            ),
        }
    }
}

impl std::error::Error for LayoutViolation {}

/// Validator bound to the caller's essential panels and optional catalog.
#[derive(Clone, Copy)]
pub struct StructuralValidator<'a> {
    essential: &'a EssentialPanels,
    known: Option<&'a dyn ComponentCatalog>,
}

impl fmt::Debug for StructuralValidator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuralValidator")
            .field("essential", &self.essential)
            .field("catalog", &self.known.is_some())
            .finish()
    }
}

impl<'a> StructuralValidator<'a> {
    #[must_use]
    pub fn new(essential: &'a EssentialPanels) -> Self {
        Self {
            essential,
            known: None,
        }
    }

    #[must_use]
    pub fn with_catalog(mut self, known: Option<&'a dyn ComponentCatalog>) -> Self {
        self.known = known;
        self
    }

    /// Run rules 2-4 against a typed document.
    pub fn check(&self, doc: &LayoutDocument) -> Result<(), LayoutViolation> {
        for panel in self.essential.iter() {
            if !doc.panels.contains_key(panel) {
                return Err(LayoutViolation::MissingEssential {
                    panel: panel.clone(),
                });
            }
        }

        if let Some(known) = self.known
            && let Some(record) = doc
                .panels
                .values()
                .find(|record| !known.contains_kind(&record.component_kind))
        {
            return Err(LayoutViolation::UnknownComponent {
                panel: record.id.clone(),
                kind: record.component_kind.clone(),
            });
        }

        for group in doc.tree.groups() {
            let mut essentials = group.views.iter().filter(|id| self.essential.contains(id));
            if let (Some(first), Some(second)) = (essentials.next(), essentials.next()) {
                return Err(LayoutViolation::EssentialsShareGroup {
                    group: group.id.clone(),
                    first: first.clone(),
                    second: second.clone(),
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn validate(&self, doc: &LayoutDocument) -> bool {
        self.check(doc).is_ok()
    }

    /// Run all four rules against raw JSON, returning the typed document.
    pub fn check_value(&self, value: Value) -> Result<LayoutDocument, LayoutViolation> {
        let doc = parse_document(value)?;
        self.check(&doc)?;
        Ok(doc)
    }
}

/// Boolean form of [`StructuralValidator::check`].
#[must_use]
pub fn validate(
    doc: &LayoutDocument,
    essential: &EssentialPanels,
    known: Option<&dyn ComponentCatalog>,
) -> bool {
    StructuralValidator::new(essential)
        .with_catalog(known)
        .validate(doc)
}

/// Rule 1: the raw document carries a tree and a panel map.
pub fn check_shape(value: &Value) -> Result<(), LayoutViolation> {
    let Some(object) = value.as_object() else {
        return Err(LayoutViolation::NotAnObject);
    };
    if !object.get("grid").is_some_and(Value::is_object) {
        return Err(LayoutViolation::MissingTree);
    }
    if !object.get("panels").is_some_and(Value::is_object) {
        return Err(LayoutViolation::MissingPanels);
    }
    Ok(())
}

/// Shape-check and deserialize a raw document.
pub fn parse_document(value: Value) -> Result<LayoutDocument, LayoutViolation> {
    check_shape(&value)?;
    serde_json::from_value(value).map_err(|e| LayoutViolation::Malformed {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        LAYOUT_SCHEMA_VERSION, LayoutSnapshot, Orientation, PanelGroup, PanelRecord, TreeNode,
    };
    use proptest::prelude::*;
    use serde_json::json;

    fn essentials() -> EssentialPanels {
        ["editor", "terminal"].into_iter().collect()
    }

    fn doc_with_groups(groups: Vec<Vec<&str>>) -> LayoutDocument {
        let mut panels = std::collections::BTreeMap::new();
        let mut leaves = Vec::new();
        for (idx, views) in groups.into_iter().enumerate() {
            for view in &views {
                panels.insert(PanelId::new(*view), PanelRecord::new(*view, *view));
            }
            leaves.push(TreeNode::leaf(
                PanelGroup::new(format!("g{idx}")).with_views(views),
            ));
        }
        LayoutDocument::stamp(
            LayoutSnapshot::new(TreeNode::branch(Orientation::Horizontal, leaves), panels),
            LAYOUT_SCHEMA_VERSION,
            1,
            0,
        )
    }

    #[test]
    fn separated_essentials_are_valid() {
        let doc = doc_with_groups(vec![vec!["editor", "notes"], vec!["terminal"]]);
        assert!(validate(&doc, &essentials(), None));
    }

    #[test]
    fn missing_essential_is_invalid() {
        let doc = doc_with_groups(vec![vec!["editor"], vec!["files"]]);
        let err = StructuralValidator::new(&essentials())
            .check(&doc)
            .expect_err("terminal missing");
        assert_eq!(
            err,
            LayoutViolation::MissingEssential {
                panel: PanelId::new("terminal")
            }
        );
    }

    #[test]
    fn essentials_sharing_a_group_is_invalid() {
        let doc = doc_with_groups(vec![vec!["editor", "terminal"], vec!["files"]]);
        let err = StructuralValidator::new(&essentials())
            .check(&doc)
            .expect_err("shared group");
        assert!(matches!(
            err,
            LayoutViolation::EssentialsShareGroup { ref group, .. } if group.as_str() == "g0"
        ));
    }

    #[test]
    fn one_unknown_component_rejects_whole_document() {
        let mut doc = doc_with_groups(vec![vec!["editor"], vec!["terminal"], vec!["files"]]);
        let known: BTreeSet<String> = ["editor", "terminal"].map(String::from).into();
        assert!(!validate(&doc, &essentials(), Some(&known)));

        doc.panels
            .get_mut(&PanelId::new("files"))
            .expect("files")
            .component_kind = "editor".to_string();
        assert!(validate(&doc, &essentials(), Some(&known)));
    }

    #[test]
    fn catalog_is_optional() {
        let doc = doc_with_groups(vec![vec!["editor"], vec!["terminal", "mystery"]]);
        assert!(validate(&doc, &essentials(), None));
        let known = ["editor", "terminal"];
        assert!(!validate(&doc, &essentials(), Some(&known)));
    }

    #[test]
    fn missing_essential_checked_before_catalog() {
        let doc = doc_with_groups(vec![vec!["mystery"]]);
        let known: Vec<String> = vec!["editor".into()];
        let err = StructuralValidator::new(&essentials())
            .with_catalog(Some(&known))
            .check(&doc)
            .expect_err("invalid");
        assert!(matches!(err, LayoutViolation::MissingEssential { .. }));
    }

    #[test]
    fn shape_requires_grid_and_panels() {
        assert_eq!(check_shape(&json!([])), Err(LayoutViolation::NotAnObject));
        assert_eq!(
            check_shape(&json!({ "panels": {} })),
            Err(LayoutViolation::MissingTree)
        );
        assert_eq!(
            check_shape(&json!({ "grid": { "type": "branch", "children": [] } })),
            Err(LayoutViolation::MissingPanels)
        );
    }

    #[test]
    fn check_value_parses_and_validates() {
        let doc = doc_with_groups(vec![vec!["editor"], vec!["terminal"]]);
        let value = serde_json::to_value(&doc).expect("serialize");
        let parsed = StructuralValidator::new(&essentials())
            .check_value(value)
            .expect("valid");
        assert_eq!(parsed, doc);

        let malformed = json!({ "schemaVersion": 1, "grid": { "type": "nope" }, "panels": {} });
        assert!(matches!(
            parse_document(malformed),
            Err(LayoutViolation::Malformed { .. })
        ));
    }

    proptest! {
        #[test]
        fn validity_matches_group_exclusivity(
            editor_group in 0usize..3,
            terminal_group in 0usize..3,
        ) {
            let mut groups = vec![vec!["files"], vec!["notes"], vec!["chat"]];
            groups[editor_group].push("editor");
            groups[terminal_group].push("terminal");
            let doc = doc_with_groups(groups);
            prop_assert_eq!(
                validate(&doc, &essentials(), None),
                editor_group != terminal_group
            );
        }
    }
}
