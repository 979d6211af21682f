//! Update router: change notifications to layer refreshes

use lv_core::{ChangeKind, ChangeNotification, SourceRef};

use crate::registry::LayerRegistry;

/// External redraw hook.
///
/// Called at most once per processed batch, however many layers were
/// touched, and at most once per successful add/remove on the controller.
pub trait RedrawSink: Send {
    fn request_redraw(&mut self);
}

/// Accounting for one processed notification batch.
///
/// Distinguishes lightweight refreshes from full rebuilds so callers can
/// verify routing decisions without reaching into renderer internals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Layers given a lightweight refresh after a cosmetic change.
    pub refreshed: usize,

    /// Layers given a full update after their predicate changed or was
    /// deleted.
    pub rebuilt: usize,

    /// Layers destroyed because their source was removed.
    pub removed: usize,

    /// Per-source failures that were logged and skipped.
    pub failures: usize,

    /// Whether a redraw was requested for this batch.
    pub redraw_requested: bool,
}

impl BatchOutcome {
    fn touched(&self) -> bool {
        self.refreshed + self.rebuilt + self.removed > 0
    }

    /// Fold another batch's accounting into this one.
    pub fn merge(&mut self, other: BatchOutcome) {
        self.refreshed += other.refreshed;
        self.rebuilt += other.rebuilt;
        self.removed += other.removed;
        self.failures += other.failures;
        self.redraw_requested |= other.redraw_requested;
    }
}

/// Routes change notifications to the layers they affect.
///
/// Each source passes through idle -> refreshing -> idle within the same
/// `process_batch` call; "refreshing" means the renderer update was
/// requested, not that rendering completed. A failure for one source is
/// logged and never blocks the rest of the batch, and all the batch's
/// updates coalesce into a single redraw request.
#[derive(Debug, Default)]
pub struct UpdateRouter;

impl UpdateRouter {
    pub fn new() -> Self {
        Self
    }

    /// Process one notification batch against the registry.
    pub fn process_batch(
        &self,
        batch: &[ChangeNotification],
        registry: &mut LayerRegistry,
        redraw: &mut dyn RedrawSink,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for notification in batch {
            let source = notification.source;
            match notification.kind {
                // Cosmetic or positional change: refresh in place, no
                // renderer rebuild.
                ChangeKind::AttributeChanged => {
                    let (updated, failed) = Self::update_source(registry, source);
                    outcome.refreshed += updated;
                    outcome.failures += failed;
                }
                // The predicate changed or went away: every layer of the
                // source rebuilds its output.
                ChangeKind::SubsetRedefined | ChangeKind::SubsetDeleted => {
                    let (updated, failed) = Self::update_source(registry, source);
                    outcome.rebuilt += updated;
                    outcome.failures += failed;
                }
                // A notification alone cannot supply a renderer; layer
                // construction waits for the caller's explicit add_data.
                ChangeKind::DataAdded => {
                    tracing::trace!(source = %source.id, "data added, awaiting explicit registration");
                }
                ChangeKind::DataRemoved => {
                    outcome.removed += registry.remove(source);
                }
            }
        }

        if outcome.touched() {
            redraw.request_redraw();
            outcome.redraw_requested = true;
        }
        outcome
    }

    /// Run `update` on every layer of `source`, isolating failures.
    ///
    /// Returns (layers updated, failures). A layer whose update fails is
    /// left exactly as it was.
    fn update_source(registry: &mut LayerRegistry, source: SourceRef) -> (usize, usize) {
        let Some(layers) = registry.layers_for_mut(source) else {
            tracing::warn!(source = %source.id, "notification for untracked source ignored");
            return (0, 1);
        };

        let mut updated = 0;
        let mut failed = 0;
        for layer in layers.iter_mut() {
            match layer.update() {
                Ok(()) => updated += 1,
                Err(err) => {
                    tracing::warn!(
                        source = %source.id,
                        layer = %layer.id,
                        error = %err,
                        "layer update failed"
                    );
                    failed += 1;
                }
            }
        }
        (updated, failed)
    }
}
