//! Layer registry: ordered, keyed layer storage for one viewer

use indexmap::IndexMap;

use lv_core::{SourceKind, SourceRef};

use crate::layer::{DisplayState, Layer, RendererFactory};

/// Duplicate-registration policy, split by source kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DuplicatePolicy {
    /// Allow a full dataset to be registered more than once.
    pub allow_duplicate_data: bool,

    /// Allow a subset to be registered more than once.
    pub allow_duplicate_subset: bool,
}

/// Insertion-ordered multimap from source to its layers.
///
/// Iteration order is registration order, which is also draw order: later
/// layers draw on top. The registry exclusively owns every layer's renderer
/// and destroys it synchronously when the source is removed; no other
/// component may hold a renderer past that point.
pub struct LayerRegistry {
    layers: IndexMap<SourceRef, Vec<Layer>>,
    policy: DuplicatePolicy,
}

impl LayerRegistry {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            layers: IndexMap::new(),
            policy,
        }
    }

    /// Create and register one layer for `source`.
    ///
    /// Returns false, creating nothing, when the source is already
    /// registered and the policy forbids duplicates of its kind.
    pub fn add(
        &mut self,
        source: SourceRef,
        factory: &dyn RendererFactory,
        display: DisplayState,
    ) -> bool {
        if self.layers.contains_key(&source) {
            let allowed = match source.kind {
                SourceKind::Data => self.policy.allow_duplicate_data,
                SourceKind::Subset => self.policy.allow_duplicate_subset,
            };
            if !allowed {
                tracing::debug!(source = %source.id, "duplicate registration refused");
                return false;
            }
        }
        let renderer = factory.create(source, &display);
        self.layers
            .entry(source)
            .or_default()
            .push(Layer::new(source, display, renderer));
        true
    }

    /// Destroy and remove every layer of `source`.
    ///
    /// Returns the number of layers destroyed; removing an untracked source
    /// is a no-op.
    pub fn remove(&mut self, source: SourceRef) -> usize {
        let Some(mut removed) = self.layers.shift_remove(&source) else {
            return 0;
        };
        for layer in removed.iter_mut() {
            layer.destroy();
        }
        tracing::debug!(source = %source.id, count = removed.len(), "layers removed");
        removed.len()
    }

    /// The layers registered for `source`, in registration order.
    ///
    /// Never fails: an untracked source yields an empty slice.
    pub fn layers_for(&self, source: SourceRef) -> &[Layer] {
        self.layers.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn layers_for_mut(&mut self, source: SourceRef) -> Option<&mut Vec<Layer>> {
        self.layers.get_mut(&source)
    }

    /// Whether any layer is registered for `source`.
    pub fn contains(&self, source: SourceRef) -> bool {
        self.layers.contains_key(&source)
    }

    /// Number of tracked sources.
    pub fn source_count(&self) -> usize {
        self.layers.len()
    }

    /// Total number of layers across all sources.
    pub fn layer_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    /// All layers in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.values().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.layers.values_mut().flatten()
    }
}
