//! Layers and the renderer seam

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lv_core::SourceRef;

/// Unique identifier for a layer within one viewer.
pub type LayerId = Uuid;

/// Opaque renderer handle for one layer.
///
/// The registry is the sole owner of a renderer: it calls `update` when the
/// router schedules a refresh and `destroy` exactly once on removal. An
/// update may defer its actual drawing to a later redraw pass; returning
/// `Ok` only means the refresh was accepted.
pub trait LayerRenderer: Send {
    /// Bring the rendered output up to date with the layer's source.
    fn update(&mut self) -> anyhow::Result<()>;

    /// Release rendering resources. Called once, before the layer is
    /// dropped.
    fn destroy(&mut self);
}

/// Produces renderer handles for newly registered layers.
pub trait RendererFactory: Send {
    fn create(&self, source: SourceRef, display: &DisplayState) -> Box<dyn LayerRenderer>;
}

/// Visual state of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// RGB color.
    pub color: [u8; 3],

    /// Opacity in [0, 1].
    pub alpha: f32,

    /// Whether the layer is drawn at all.
    pub visible: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            color: [128, 128, 128],
            alpha: 1.0,
            visible: true,
        }
    }
}

/// Optional display overrides accepted by `add_data`.
///
/// Every field defaults to "unchanged"; an omitted option is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub color: Option<[u8; 3]>,
    pub alpha: Option<f32>,
}

impl DisplayOptions {
    /// Apply the set fields onto a layer's display state.
    pub fn apply_to(&self, display: &mut DisplayState) {
        if let Some(color) = self.color {
            display.color = color;
        }
        if let Some(alpha) = self.alpha {
            display.alpha = alpha;
        }
    }
}

/// One renderer bound to one data source within a viewer.
pub struct Layer {
    pub id: LayerId,
    pub source: SourceRef,
    pub display: DisplayState,
    renderer: Box<dyn LayerRenderer>,
}

impl Layer {
    pub(crate) fn new(
        source: SourceRef,
        display: DisplayState,
        renderer: Box<dyn LayerRenderer>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            display,
            renderer,
        }
    }

    /// Run the renderer's update; on failure the layer is left exactly as
    /// it was.
    pub fn update(&mut self) -> anyhow::Result<()> {
        self.renderer.update()
    }

    pub(crate) fn destroy(&mut self) {
        self.renderer.destroy();
    }
}
