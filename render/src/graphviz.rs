use dotedit_core::error::{EditorError, ErrorCode};
use dotedit_core::model::GraphDoc;
use graphviz_rust::cmd::{CommandArg, Format};
use graphviz_rust::printer::PrinterContext;
use std::io;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("graphviz failed: {0}")]
    Graphviz(#[source] io::Error),
    #[error("graphviz produced a non-UTF-8 image map")]
    MapEncoding,
}

impl EditorError for RenderError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::Internal
    }
}

/// Lay out and render the document as SVG via the `dot` binary.
pub fn svg(doc: &GraphDoc) -> Result<Vec<u8>, RenderError> {
    exec(doc, Format::Svg)
}

/// Client-side image map matching the URLs attached by `annotate_for_view`.
pub fn cmapx(doc: &GraphDoc) -> Result<String, RenderError> {
    let bytes = exec(doc, Format::Cmapx)?;
    String::from_utf8(bytes).map_err(|_| RenderError::MapEncoding)
}

fn exec(doc: &GraphDoc, out: Format) -> Result<Vec<u8>, RenderError> {
    debug!(nodes = doc.nodes.len(), edges = doc.edges.len(), "invoking dot");
    graphviz_rust::exec(
        format::to_ast(doc),
        &mut PrinterContext::default(),
        vec![CommandArg::Format(out)],
    )
    .map_err(RenderError::Graphviz)
}
