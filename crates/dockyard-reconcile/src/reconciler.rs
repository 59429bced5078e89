//! Two-pass reconstruction of the default panel arrangement.
//!
//! Config order need not follow dependency order, so a panel may name a
//! reference that has not been created yet. The first pass creates every
//! panel whose references already exist and defers the rest; the second pass
//! replays the deferred queue once. Dependencies are at most one level deep,
//! so a single replay is enough.
//!
//! Nothing here fails: an unresolvable reference degrades to the host's
//! default placement, and a refused creation is recorded in the report.

use dockyard_core::PanelId;

use crate::config::PanelConfig;
use crate::host::{DockHost, Placement, PlacementReference};
use crate::position::PositionDescriptor;

/// What happened to each config during a [`PanelReconciler::reconcile`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Panels created, in creation order.
    pub created: Vec<PanelId>,
    /// Panels postponed to the second pass.
    pub deferred: Vec<PanelId>,
    /// Panels created with the default placement because a reference never resolved.
    pub unresolved: Vec<PanelId>,
    /// Panels already present in the host.
    pub skipped: Vec<PanelId>,
    /// Panels the host refused to create.
    pub failed: Vec<PanelId>,
}

impl ReconcileReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty() && self.failed.is_empty()
    }
}

/// Materializes [`PanelConfig`]s into a dock host.
pub struct PanelReconciler<'h, H: DockHost + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: DockHost + ?Sized> PanelReconciler<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    pub fn reconcile(&mut self, configs: &[PanelConfig]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut queue: Vec<(&PanelConfig, PositionDescriptor)> = Vec::new();

        for config in configs {
            if self.host.get_panel(&config.id).is_some() {
                tracing::debug!(panel = %config.id, "panel already present, skipping");
                report.skipped.push(config.id.clone());
                continue;
            }

            let descriptor = config.position.as_ref().and_then(|p| p.resolve());
            let placement = match descriptor {
                None => Placement::default(),
                Some(descriptor) => match self.placement_for(&descriptor) {
                    Some(placement) => placement,
                    None => {
                        tracing::debug!(panel = %config.id, "reference not created yet, deferring");
                        report.deferred.push(config.id.clone());
                        queue.push((config, descriptor));
                        continue;
                    }
                },
            };
            self.create(config, &placement, &mut report);
        }

        for (config, descriptor) in queue {
            if self.host.get_panel(&config.id).is_some() {
                report.skipped.push(config.id.clone());
                continue;
            }
            let placement = self.placement_for(&descriptor).unwrap_or_else(|| {
                tracing::warn!(
                    panel = %config.id,
                    reference_panel = ?descriptor.reference_panel,
                    reference_group = ?descriptor.reference_group,
                    "unresolved panel reference, using default placement"
                );
                report.unresolved.push(config.id.clone());
                Placement::default()
            });
            self.create(config, &placement, &mut report);
        }

        self.apply_flags(configs, &report);

        tracing::info!(
            created = report.created.len(),
            deferred = report.deferred.len(),
            unresolved = report.unresolved.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "panel reconciliation complete"
        );
        report
    }

    /// Resolve a descriptor against live host panels.
    ///
    /// `None` when a named reference does not exist. A reference panel takes
    /// precedence over a reference group when both are given.
    fn placement_for(&self, descriptor: &PositionDescriptor) -> Option<Placement> {
        let mut reference = None;
        if let Some(panel) = &descriptor.reference_group {
            let handle = self.host.get_panel(panel)?;
            reference = Some(PlacementReference::Group(handle.group));
        }
        if let Some(panel) = &descriptor.reference_panel {
            self.host.get_panel(panel)?;
            reference = Some(PlacementReference::Panel(panel.clone()));
        }
        Some(Placement {
            direction: descriptor.direction,
            reference,
        })
    }

    fn create(&mut self, config: &PanelConfig, placement: &Placement, report: &mut ReconcileReport) {
        match self.host.create_panel(config.spec(), placement) {
            Some(handle) => {
                tracing::debug!(panel = %handle.id, group = %handle.group, "panel created");
                report.created.push(handle.id);
            }
            None => {
                tracing::warn!(panel = %config.id, kind = %config.component_kind, "host refused panel");
                report.failed.push(config.id.clone());
            }
        }
    }

    fn apply_flags(&mut self, configs: &[PanelConfig], report: &ReconcileReport) {
        for config in configs {
            let flags = config.group_flags();
            if flags.is_empty() || !report.created.contains(&config.id) {
                continue;
            }
            let Some(handle) = self.host.get_panel(&config.id) else {
                continue;
            };
            if !self.host.apply_group_flags(&handle.group, flags) {
                tracing::warn!(panel = %config.id, group = %handle.group, "could not apply group flags");
            }
        }
    }
}
