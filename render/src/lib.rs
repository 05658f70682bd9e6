//! Renderer adapter: view annotation, Graphviz invocation, image cache.

mod annotate;
mod cache;
mod graphviz;

pub use annotate::{annotate_for_view, SELECTED_COLOR};
pub use cache::ImageCache;
pub use graphviz::{cmapx, svg, RenderError};
