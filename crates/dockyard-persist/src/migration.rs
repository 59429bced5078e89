//! Schema migration graph for persisted layout documents.
//!
//! Migrations operate on raw JSON so that documents written by older schema
//! versions never need to deserialize into the current types. A migration is
//! all-or-nothing: if any step fails, every intermediate result is discarded
//! and the caller treats the stored document as absent.
//!
//! The graph is an explicit value built once at startup and handed to the
//! layout manager; there is no process-wide registration table.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Error that can occur during document migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationError {
    /// No migration path exists from source to target version.
    NoPathFound { from: u32, to: u32 },
    /// A migration function returned an error.
    MigrationFailed { from: u32, to: u32, message: String },
    /// The migrated document is not a JSON object, so it cannot be stamped.
    NonObjectDocument,
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPathFound { from, to } => {
                write!(f, "no migration path from version {from} to {to}")
            }
            Self::MigrationFailed { from, to, message } => {
                write!(f, "migration from {from} to {to} failed: {message}")
            }
            Self::NonObjectDocument => write!(f, "migrated document is not a JSON object"),
        }
    }
}

impl std::error::Error for MigrationError {}

/// A registered transform from one schema version to another.
pub type Transform = Box<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// Directed graph of versioned document transforms.
///
/// # Example
///
/// ```
/// use dockyard_persist::migration::MigrationGraph;
/// use serde_json::json;
///
/// let mut graph = MigrationGraph::new();
/// graph.register(1, 2, |mut doc| {
///     doc["panels"] = doc.get("views").cloned().unwrap_or(json!({}));
///     Ok(doc)
/// });
///
/// let migrated = graph.migrate(json!({ "views": {} }), 1, 2).unwrap();
/// assert_eq!(migrated["schemaVersion"], 2);
/// ```
#[derive(Default)]
pub struct MigrationGraph {
    edges: HashMap<(u32, u32), Transform>,
}

impl MigrationGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the edge `from -> to`. Re-registering an edge replaces it.
    pub fn register<F>(&mut self, from: u32, to: u32, transform: F) -> &mut Self
    where
        F: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        if self.edges.insert((from, to), Box::new(transform)).is_some() {
            tracing::debug!(from, to, "replaced existing migration edge");
        }
        self
    }

    #[must_use]
    pub fn has_edge(&self, from: u32, to: u32) -> bool {
        self.edges.contains_key(&(from, to))
    }

    /// Check if [`migrate`](Self::migrate) could succeed structurally.
    #[must_use]
    pub fn has_path(&self, from: u32, target: u32) -> bool {
        if from >= target || self.has_edge(from, target) {
            return true;
        }
        (from..target).all(|version| self.has_edge(version, version + 1))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Migrate `doc` from schema version `from` to `target`.
    ///
    /// - `from >= target`: returned unchanged (newer documents are tolerated).
    /// - a direct `from -> target` edge is applied once.
    /// - otherwise the chain `from -> from+1 -> ... -> target` is walked.
    ///
    /// On success `schemaVersion` is stamped to `target`.
    pub fn migrate(&self, doc: Value, from: u32, target: u32) -> Result<Value, MigrationError> {
        if from >= target {
            return Ok(doc);
        }

        let migrated = if let Some(transform) = self.edges.get(&(from, target)) {
            transform(doc).map_err(|message| MigrationError::MigrationFailed {
                from,
                to: target,
                message,
            })?
        } else {
            if let Some(gap) = (from..target).find(|v| !self.has_edge(*v, v + 1)) {
                return Err(MigrationError::NoPathFound { from: gap, to: target });
            }
            let mut current = doc;
            for version in from..target {
                let transform = self
                    .edges
                    .get(&(version, version + 1))
                    .ok_or(MigrationError::NoPathFound {
                        from: version,
                        to: target,
                    })?;
                current = transform(current).map_err(|message| {
                    MigrationError::MigrationFailed {
                        from: version,
                        to: version + 1,
                        message,
                    }
                })?;
            }
            current
        };

        stamp_schema_version(migrated, target)
    }
}

fn stamp_schema_version(mut doc: Value, version: u32) -> Result<Value, MigrationError> {
    let Some(object) = doc.as_object_mut() else {
        return Err(MigrationError::NonObjectDocument);
    };
    object.insert("schemaVersion".to_string(), Value::from(version));
    Ok(doc)
}

impl fmt::Debug for MigrationGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut edges: Vec<_> = self.edges.keys().copied().collect();
        edges.sort_unstable();
        f.debug_struct("MigrationGraph")
            .field("edges", &edges)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn append_step(tag: &'static str) -> impl Fn(Value) -> Result<Value, String> {
        move |mut doc| {
            let steps = doc["steps"].as_array_mut().ok_or("missing steps")?;
            steps.push(json!(tag));
            Ok(doc)
        }
    }

    #[test]
    fn same_version_is_identity() {
        let graph = MigrationGraph::new();
        let doc = json!({ "schemaVersion": 3, "grid": {} });
        assert_eq!(graph.migrate(doc.clone(), 3, 3).unwrap(), doc);
    }

    #[test]
    fn newer_document_is_tolerated_unchanged() {
        let graph = MigrationGraph::new();
        let doc = json!({ "schemaVersion": 9 });
        assert_eq!(graph.migrate(doc.clone(), 9, 2).unwrap(), doc);
    }

    #[test]
    fn missing_path_fails() {
        let mut graph = MigrationGraph::new();
        graph.register(1, 2, append_step("a"));
        let err = graph.migrate(json!({ "steps": [] }), 1, 3).unwrap_err();
        assert_eq!(err, MigrationError::NoPathFound { from: 2, to: 3 });
        assert!(!graph.has_path(1, 3));
        assert!(graph.has_path(1, 2));
    }

    #[test]
    fn two_hop_chain_composes_in_order() {
        let mut graph = MigrationGraph::new();
        graph
            .register(2, 3, append_step("second"))
            .register(1, 2, append_step("first"));

        let migrated = graph
            .migrate(json!({ "schemaVersion": 1, "steps": [] }), 1, 3)
            .unwrap();
        assert_eq!(migrated["steps"], json!(["first", "second"]));
        assert_eq!(migrated["schemaVersion"], 3);
    }

    #[test]
    fn direct_edge_is_preferred_and_applied_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut graph = MigrationGraph::new();
        graph
            .register(1, 2, append_step("hop1"))
            .register(2, 3, append_step("hop2"))
            .register(1, 3, move |mut doc| {
                counter.fetch_add(1, Ordering::SeqCst);
                doc["steps"] = json!(["direct"]);
                Ok(doc)
            });

        let migrated = graph.migrate(json!({ "steps": [] }), 1, 3).unwrap();
        assert_eq!(migrated["steps"], json!(["direct"]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failing_step_discards_all_progress() {
        let first_ran = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&first_ran);
        let mut graph = MigrationGraph::new();
        graph
            .register(1, 2, move |doc| {
                seen.fetch_add(1, Ordering::SeqCst);
                append_step("first")(doc)
            })
            .register(2, 3, |_| Err("panel map is corrupt".to_string()));

        let err = graph.migrate(json!({ "steps": [] }), 1, 3).unwrap_err();
        assert_eq!(
            err,
            MigrationError::MigrationFailed {
                from: 2,
                to: 3,
                message: "panel map is corrupt".to_string()
            }
        );
        assert_eq!(first_ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_link_is_detected_before_running_any_step() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut graph = MigrationGraph::new();
        graph.register(1, 2, move |doc| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(doc)
        });
        assert!(graph.migrate(json!({}), 1, 4).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_object_result_is_rejected() {
        let mut graph = MigrationGraph::new();
        graph.register(1, 2, |_| Ok(json!([1, 2, 3])));
        assert_eq!(
            graph.migrate(json!({}), 1, 2).unwrap_err(),
            MigrationError::NonObjectDocument
        );
    }

    #[test]
    fn reregistering_replaces_edge() {
        let mut graph = MigrationGraph::new();
        graph.register(1, 2, |_| Err("old".into()));
        graph.register(1, 2, |doc| Ok(doc));
        assert_eq!(graph.len(), 1);
        assert!(graph.migrate(json!({}), 1, 2).is_ok());
        assert_eq!(format!("{graph:?}"), "MigrationGraph { edges: [(1, 2)] }");
    }

    // Edge kinds: 0 missing, 1 succeeds, 2 fails.
    proptest! {
        #[test]
        fn migrate_is_all_or_nothing(
            from in 0u32..4,
            span in 0u32..4,
            chain in proptest::collection::vec(0u8..3, 4),
            direct in 0u8..3,
        ) {
            let target = from + span;
            let mut graph = MigrationGraph::new();
            for (offset, kind) in chain.iter().enumerate() {
                let version = from + offset as u32;
                match kind {
                    1 => {
                        graph.register(version, version + 1, append_step("chain"));
                    }
                    2 => {
                        graph.register(version, version + 1, |_| Err("boom".to_string()));
                    }
                    _ => {}
                }
            }
            if span > 1 {
                match direct {
                    1 => {
                        graph.register(from, target, |mut doc| {
                            doc["steps"] = json!(["direct"]);
                            Ok(doc)
                        });
                    }
                    2 => {
                        graph.register(from, target, |_| Err("boom".to_string()));
                    }
                    _ => {}
                }
            }

            let doc = json!({ "steps": [] });
            let direct_ok = span > 1 && direct == 1;
            let direct_fails = span > 1 && direct == 2;
            let chain_ok = chain[..span as usize].iter().all(|kind| *kind == 1);
            match graph.migrate(doc.clone(), from, target) {
                Ok(out) if span == 0 => prop_assert_eq!(out, doc),
                Ok(out) => {
                    prop_assert_eq!(&out["schemaVersion"], &json!(target));
                    let steps = out["steps"].as_array().cloned().unwrap_or_default();
                    if direct_ok {
                        prop_assert_eq!(steps, vec![json!("direct")]);
                    } else {
                        prop_assert!(chain_ok);
                        prop_assert_eq!(steps.len(), span as usize);
                    }
                }
                Err(_) => {
                    prop_assert!(span > 0);
                    prop_assert!(!direct_ok);
                    prop_assert!(direct_fails || !chain_ok);
                }
            }
        }
    }
}
