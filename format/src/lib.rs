//! Format adapter: DOT text to `GraphDoc` and back.
//!
//! Parsing and printing delegate to the `graphviz-rust` AST; this crate
//! owns the mapping between that AST and the editor's document model,
//! plus atomic on-disk persistence.

mod ast;

pub use ast::to_ast;

use dotedit_core::error::{EditorError, ErrorCode};
use dotedit_core::model::{GraphDoc, IntegrityError};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to parse DOT: {0}")]
    Parse(String),
    #[error("unsupported DOT construct: {0}")]
    Unsupported(&'static str),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl EditorError for FormatError {
    fn error_code(&self) -> ErrorCode {
        match self {
            FormatError::Parse(_) | FormatError::Unsupported(_) => ErrorCode::MalformedInput,
            FormatError::Integrity(_) => ErrorCode::InvariantViolation,
            FormatError::Io { .. } => ErrorCode::IoFailure,
        }
    }
}

pub fn parse_dot(text: &str) -> Result<GraphDoc, FormatError> {
    let graph = graphviz_rust::parse(text).map_err(FormatError::Parse)?;
    ast::from_ast(&graph)
}

pub fn to_dot(doc: &GraphDoc) -> String {
    ast::to_ast(doc).print(&mut PrinterContext::default())
}

pub fn read_dot(path: &Path) -> Result<GraphDoc, FormatError> {
    let text = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dot(&text)
}

/// Serialize the whole document and replace the file atomically.
///
/// The path may be a symlink (the session store's file link); writing goes
/// to a temporary sibling of the link *target* followed by a rename, so a
/// failure mid-write never leaves a partial document and the link itself
/// is never clobbered.
pub fn write_dot(doc: &GraphDoc, path: &Path) -> Result<(), FormatError> {
    doc.integrity_check()?;
    let text = to_dot(doc);

    let real = fs::canonicalize(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = sibling_tmp_path(&real);

    fs::write(&tmp, text.as_bytes()).map_err(|source| FormatError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, &real).map_err(|source| FormatError::Io {
        path: real.clone(),
        source,
    })?;

    debug!(path = %real.display(), nodes = doc.nodes.len(), edges = doc.edges.len(), "wrote document");
    Ok(())
}

fn sibling_tmp_path(real: &Path) -> PathBuf {
    let mut name = real
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dotedit".to_string());
    name.push_str(".tmp");
    real.with_file_name(name)
}
