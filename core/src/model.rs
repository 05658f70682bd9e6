use crate::error::{EditorError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Node and edge attributes are flat string-to-string mappings; a BTreeMap
/// keeps serialization order deterministic across parse/serialize cycles.
pub type AttrMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRec {
    pub id: String,
    pub attrs: AttrMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRec {
    pub source: String,
    pub target: String,
    pub attrs: AttrMap,
}

/// In-memory equivalent of one parsed DOT file: ordered nodes and edges.
/// Node ids are unique by convention, not by construction (see `mutate`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDoc {
    pub name: String,
    pub strict: bool,
    pub directed: bool,
    pub nodes: Vec<NodeRec>,
    pub edges: Vec<EdgeRec>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntegrityError {
    // Field is not named `source`: thiserror reserves that name for the
    // error's cause.
    #[error("edge `{edge_source}` -> `{edge_target}` references missing node `{missing}`")]
    DanglingEdge {
        edge_source: String,
        edge_target: String,
        missing: String,
    },
}

impl EditorError for IntegrityError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InvariantViolation
    }
}

impl NodeRec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attrs: AttrMap::new(),
        }
    }
}

impl EdgeRec {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attrs: AttrMap::new(),
        }
    }
}

impl GraphDoc {
    pub fn new(name: impl Into<String>, directed: bool) -> Self {
        Self {
            name: name.into(),
            strict: false,
            directed,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// First node with the given id, in document order.
    pub fn node(&self, id: &str) -> Option<&NodeRec> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeRec> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Pre-write guard: every edge endpoint must name an existing node.
    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(IntegrityError::DanglingEdge {
                        edge_source: edge.source.clone(),
                        edge_target: edge.target.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
