//! Headless in-memory dock host.
//!
//! Maintains a real branch/leaf tree with the same placement rules as the
//! rendering engine:
//!
//! - unconstrained / `within` without anchor: tab into the active group, or
//!   open the first group;
//! - `within` an anchor: tab into the anchor's group;
//! - directional without anchor: new group at that edge of the whole grid;
//! - directional with anchor: new group beside the anchor's group.
//!
//! Used as the reference host in tests and for server-side rendering of the
//! default arrangement.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use dockyard_core::{
    GroupId, LayoutDocument, LayoutSnapshot, Orientation, PanelGroup, PanelId, PanelRecord,
    TreeNode,
};

use crate::host::{
    Direction, DockHost, GroupFlags, PanelHandle, PanelSpec, Placement, PlacementReference,
    StructuralChangeCallback,
};

pub struct MemoryDockHost {
    tree: TreeNode,
    panels: BTreeMap<PanelId, PanelRecord>,
    active_group: Option<GroupId>,
    next_group: u64,
    listeners: Vec<StructuralChangeCallback>,
}

impl Default for MemoryDockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDockHost {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: TreeNode::default(),
            panels: BTreeMap::new(),
            active_group: None,
            next_group: 1,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn tree(&self) -> &TreeNode {
        &self.tree
    }

    #[must_use]
    pub fn group_of(&self, panel: &PanelId) -> Option<&PanelGroup> {
        self.tree.group_containing(panel)
    }

    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Close a panel, dropping its group when it was the last tab.
    pub fn remove_panel(&mut self, id: &PanelId) -> bool {
        if self.panels.remove(id).is_none() {
            return false;
        }
        let emptied = self.tree.group_containing(id).map(|g| g.id.clone());
        if let Some(group_id) = emptied
            && let Some(group) = self.tree.group_mut(&group_id)
        {
            group.views.retain(|view| view != id);
            if group.active_view.as_ref() == Some(id) {
                group.active_view = group.views.first().cloned();
            }
            if group.views.is_empty() {
                prune_group(&mut self.tree, &group_id);
                if self.active_group.as_ref() == Some(&group_id) {
                    self.active_group = self.tree.groups().first().map(|g| g.id.clone());
                }
            }
        }
        self.notify();
        true
    }

    fn allocate_group(&mut self) -> GroupId {
        loop {
            let candidate = GroupId::new(format!("group-{}", self.next_group));
            self.next_group += 1;
            if self.tree.group(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn anchor_group(&self, reference: Option<&PlacementReference>) -> Option<GroupId> {
        match reference? {
            PlacementReference::Panel(panel) => {
                self.tree.group_containing(panel).map(|g| g.id.clone())
            }
            PlacementReference::Group(group) => self.tree.group(group).map(|g| g.id.clone()),
        }
    }

    fn add_tab(&mut self, group_id: &GroupId, panel: &PanelId) -> bool {
        let Some(group) = self.tree.group_mut(group_id) else {
            return false;
        };
        group.views.push(panel.clone());
        group.active_view = Some(panel.clone());
        true
    }

    fn open_group(
        &mut self,
        panel: &PanelId,
        direction: Option<Direction>,
        anchor: Option<&GroupId>,
    ) -> GroupId {
        let group_id = self.allocate_group();
        let mut leaf = Some(TreeNode::leaf(
            PanelGroup::new(group_id.clone()).with_views([panel.clone()]),
        ));
        wrap_leaf_root(&mut self.tree);

        let split = direction.filter(|d| d.orientation().is_some());
        if let (Some(direction), Some(anchor)) = (split, anchor) {
            split_beside(&mut self.tree, anchor, &mut leaf, direction);
        }
        if let Some(leaf) = leaf {
            insert_at_edge(&mut self.tree, leaf, split.unwrap_or(Direction::Right));
        }
        group_id
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.serialize();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

impl DockHost for MemoryDockHost {
    fn create_panel(&mut self, spec: PanelSpec, placement: &Placement) -> Option<PanelHandle> {
        if self.panels.contains_key(&spec.id) {
            tracing::debug!(panel = %spec.id, "panel already exists");
            return None;
        }

        let anchor = self.anchor_group(placement.reference.as_ref());
        let tab_target = match placement.direction {
            None | Some(Direction::Within) => anchor.clone().or_else(|| self.active_group.clone()),
            Some(_) => None,
        };

        let group = match tab_target {
            Some(group) if self.add_tab(&group, &spec.id) => group,
            _ => self.open_group(&spec.id, placement.direction, anchor.as_ref()),
        };

        let mut record = PanelRecord::new(spec.id.clone(), spec.component_kind)
            .with_params(spec.params);
        record.title = spec.title;
        self.panels.insert(spec.id.clone(), record);
        self.active_group = Some(group.clone());
        self.notify();

        Some(PanelHandle { id: spec.id, group })
    }

    fn get_panel(&self, id: &PanelId) -> Option<PanelHandle> {
        if !self.panels.contains_key(id) {
            return None;
        }
        let group = self.tree.group_containing(id)?;
        Some(PanelHandle {
            id: id.clone(),
            group: group.id.clone(),
        })
    }

    fn list_panels(&self) -> Vec<PanelHandle> {
        self.tree
            .groups()
            .into_iter()
            .flat_map(|group| {
                group.views.iter().map(|view| PanelHandle {
                    id: view.clone(),
                    group: group.id.clone(),
                })
            })
            .collect()
    }

    fn serialize(&self) -> LayoutSnapshot {
        LayoutSnapshot::new(self.tree.clone(), self.panels.clone())
    }

    fn restore(&mut self, doc: &LayoutDocument) -> bool {
        if let Err(reason) = check_consistency(doc) {
            tracing::warn!(%reason, "refusing to restore inconsistent layout");
            return false;
        }
        self.tree = doc.tree.clone();
        self.panels = doc.panels.clone();
        self.active_group = self.tree.groups().first().map(|g| g.id.clone());
        true
    }

    fn on_structural_change(&mut self, callback: StructuralChangeCallback) {
        self.listeners.push(callback);
    }

    fn apply_group_flags(&mut self, group: &GroupId, flags: GroupFlags) -> bool {
        let Some(target) = self.tree.group_mut(group) else {
            return false;
        };
        target.locked |= flags.locked;
        target.hide_header |= flags.hide_header;
        self.notify();
        true
    }
}

impl fmt::Debug for MemoryDockHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDockHost")
            .field("groups", &self.tree.groups().len())
            .field("panels", &self.panels.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Every docked view has a record, no view is docked twice, group ids are unique.
fn check_consistency(doc: &LayoutDocument) -> Result<(), String> {
    let mut seen_views = BTreeSet::new();
    let mut seen_groups = BTreeSet::new();
    for group in doc.tree.groups() {
        if !seen_groups.insert(&group.id) {
            return Err(format!("duplicate group {}", group.id));
        }
        for view in &group.views {
            if !doc.panels.contains_key(view) {
                return Err(format!("view {view} has no panel record"));
            }
            if !seen_views.insert(view) {
                return Err(format!("view {view} is docked twice"));
            }
        }
    }
    Ok(())
}

/// Mutations assume a branch root.
fn wrap_leaf_root(tree: &mut TreeNode) {
    if matches!(tree, TreeNode::Leaf { .. }) {
        let leaf = std::mem::take(tree);
        *tree = TreeNode::branch(Orientation::Horizontal, vec![leaf]);
    }
}

/// Place `leaf` beside the leaf holding `target`. Leaves `leaf` untouched
/// when the target is not found.
fn split_beside(
    node: &mut TreeNode,
    target: &GroupId,
    leaf: &mut Option<TreeNode>,
    direction: Direction,
) -> bool {
    let TreeNode::Branch {
        orientation,
        children,
    } = node
    else {
        return false;
    };
    let Some(wanted) = direction.orientation() else {
        return false;
    };

    let position = children
        .iter()
        .position(|child| matches!(child, TreeNode::Leaf { group } if &group.id == target));
    if let Some(idx) = position {
        let Some(new_leaf) = leaf.take() else {
            return false;
        };
        if *orientation == wanted || children.len() == 1 {
            *orientation = wanted;
            let at = if direction.is_leading() { idx } else { idx + 1 };
            children.insert(at, new_leaf);
        } else {
            let existing = std::mem::take(&mut children[idx]);
            let pair = if direction.is_leading() {
                vec![new_leaf, existing]
            } else {
                vec![existing, new_leaf]
            };
            children[idx] = TreeNode::branch(wanted, pair);
        }
        return true;
    }

    children
        .iter_mut()
        .any(|child| split_beside(child, target, leaf, direction))
}

/// Place `leaf` at one edge of the whole grid.
fn insert_at_edge(tree: &mut TreeNode, leaf: TreeNode, direction: Direction) {
    let wanted = direction.orientation().unwrap_or(Orientation::Horizontal);
    let TreeNode::Branch {
        orientation,
        children,
    } = tree
    else {
        return;
    };
    if *orientation == wanted || children.len() <= 1 {
        *orientation = wanted;
        if direction.is_leading() {
            children.insert(0, leaf);
        } else {
            children.push(leaf);
        }
        return;
    }

    let existing = std::mem::take(tree);
    let children = if direction.is_leading() {
        vec![leaf, existing]
    } else {
        vec![existing, leaf]
    };
    *tree = TreeNode::branch(wanted, children);
}

/// Remove the leaf for `group` and collapse branches left with one child.
fn prune_group(node: &mut TreeNode, group: &GroupId) -> bool {
    let TreeNode::Branch { children, .. } = node else {
        return false;
    };
    if let Some(idx) = children
        .iter()
        .position(|child| matches!(child, TreeNode::Leaf { group: g } if &g.id == group))
    {
        children.remove(idx);
        return true;
    }
    for idx in 0..children.len() {
        if prune_group(&mut children[idx], group) {
            if let TreeNode::Branch { children: inner, .. } = &mut children[idx]
                && inner.len() <= 1
            {
                match inner.pop() {
                    Some(only) => children[idx] = only,
                    None => {
                        children.remove(idx);
                    }
                }
            }
            return true;
        }
    }
    false
}
