//! Viewer controller: the single public surface of one viewer

use lv_core::{
    AttributeId, ChangeNotification, Roi, SelectionError, SessionHandle, SourceRef, SubsetState,
    Subscription,
};

use crate::layer::{DisplayOptions, DisplayState, RendererFactory};
use crate::registry::{DuplicatePolicy, LayerRegistry};
use crate::router::{BatchOutcome, RedrawSink, UpdateRouter};

/// Upper bound on notifications handled in one routing pass.
const MAX_BATCH: usize = 64;

/// Orchestrates one viewer: the layer registry, the update router, the
/// selection pipeline, and the session subscription.
pub struct ViewerController {
    session: SessionHandle,
    subscription: Subscription,
    registry: LayerRegistry,
    router: UpdateRouter,
    factory: Box<dyn RendererFactory>,
    redraw: Box<dyn RedrawSink>,
}

impl ViewerController {
    /// Wire a viewer against a session.
    ///
    /// All collaborators are fixed here at construction time; there is no
    /// post-hoc discovery of layer kinds or tools.
    pub fn new(
        session: SessionHandle,
        factory: Box<dyn RendererFactory>,
        redraw: Box<dyn RedrawSink>,
        policy: DuplicatePolicy,
    ) -> Self {
        let subscription = session.subscribe();
        Self {
            session,
            subscription,
            registry: LayerRegistry::new(policy),
            router: UpdateRouter::new(),
            factory,
            redraw,
        }
    }

    /// Register `source` and create its layer.
    ///
    /// Display options apply only to the layer created by this call; an
    /// omitted option leaves the default untouched. Returns false, with
    /// nothing created and no redraw, when the duplicate policy refuses the
    /// source.
    pub fn add_data(&mut self, source: SourceRef, options: &DisplayOptions) -> bool {
        let mut display = DisplayState::default();
        options.apply_to(&mut display);
        if !self.registry.add(source, self.factory.as_ref(), display) {
            return false;
        }
        tracing::debug!(source = %source.id, "layer added");
        self.redraw.request_redraw();
        true
    }

    /// Drop every layer of `source`.
    ///
    /// Requests a redraw only when something was actually removed; an
    /// untracked source is a no-op.
    pub fn remove_data(&mut self, source: SourceRef) -> bool {
        if self.registry.remove(source) == 0 {
            return false;
        }
        self.redraw.request_redraw();
        true
    }

    /// Translate a raw ROI into a subset state over `attribute`.
    ///
    /// Reduces the ROI to its x interval and snaps it onto the attribute's
    /// committed axis partition, so the resulting subset matches rendered
    /// bin groupings exactly. Mutates nothing; publishing the returned
    /// state to the session is the caller's decision.
    pub fn apply_selection(
        &self,
        roi: &Roi,
        attribute: Option<AttributeId>,
    ) -> Result<SubsetState, SelectionError> {
        let attribute = attribute.ok_or(SelectionError::UnresolvedAttribute)?;
        let (lo, hi) = roi.to_interval()?;
        let partition = self
            .session
            .axis_partition(attribute)
            .ok_or(SelectionError::UnresolvedAttribute)?;
        let (lo, hi) = partition.snap(lo, hi);
        SubsetState::range(Some(attribute), lo, hi)
    }

    /// Route one externally assembled notification batch.
    pub fn on_notifications(&mut self, batch: &[ChangeNotification]) -> BatchOutcome {
        self.router
            .process_batch(batch, &mut self.registry, self.redraw.as_mut())
    }

    /// Drain and route everything pending on the session subscription.
    ///
    /// Notifications are consumed in bounded FIFO batches, preserving
    /// per-source ordering; each batch coalesces into at most one redraw.
    pub fn process_pending(&mut self) -> BatchOutcome {
        let mut total = BatchOutcome::default();
        loop {
            let batch = self.subscription.drain_batch(MAX_BATCH);
            if batch.is_empty() {
                break;
            }
            let outcome =
                self.router
                    .process_batch(&batch, &mut self.registry, self.redraw.as_mut());
            total.merge(outcome);
        }
        total
    }

    /// The session this viewer observes.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The viewer's layers.
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }
}

impl Drop for ViewerController {
    fn drop(&mut self) {
        self.session.unsubscribe(self.subscription.id());
    }
}
