//! Viewer-side machinery for the linked-views platform
//!
//! Keeps a dynamic set of layer renderers synchronized with the shared
//! session: the renderer seam, the insertion-ordered layer registry, the
//! notification router, and the viewer controller tying them together.

mod layer;
mod registry;
mod router;
mod viewer;

pub use layer::{
    DisplayOptions, DisplayState, Layer, LayerId, LayerRenderer, RendererFactory,
};
pub use registry::{DuplicatePolicy, LayerRegistry};
pub use router::{BatchOutcome, RedrawSink, UpdateRouter};
pub use viewer::ViewerController;
