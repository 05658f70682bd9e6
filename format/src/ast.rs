//! Mapping between `graphviz_rust`'s DOT AST and the editor's `GraphDoc`.

use crate::FormatError;
use dotedit_core::model::{AttrMap, EdgeRec, GraphDoc, NodeRec};
use graphviz_rust::dot_structures::{
    Attribute, Edge, EdgeTy, Graph, Id, Node, NodeId, Stmt, Vertex,
};

/// Reserved words that must be quoted when used as identifiers.
const KEYWORDS: [&str; 6] = ["graph", "digraph", "subgraph", "node", "edge", "strict"];

/// Fallback graph name for anonymous graphs; the HTML view needs a map name.
const DEFAULT_GRAPH_NAME: &str = "G";

pub fn from_ast(graph: &Graph) -> Result<GraphDoc, FormatError> {
    let (id, strict, directed, stmts) = match graph {
        Graph::Graph { id, strict, stmts } => (id, *strict, false, stmts),
        Graph::DiGraph { id, strict, stmts } => (id, *strict, true, stmts),
    };

    let mut name = id_text(id)?;
    if name.is_empty() {
        name = DEFAULT_GRAPH_NAME.to_string();
    }

    let mut doc = GraphDoc {
        name,
        strict,
        directed,
        nodes: Vec::new(),
        edges: Vec::new(),
    };

    for stmt in stmts {
        match stmt {
            Stmt::Node(node) => {
                let id = node_id_text(&node.id)?;
                let attrs = attr_map(&node.attributes)?;
                upsert_node(&mut doc, id, attrs);
            }
            Stmt::Edge(edge) => {
                let attrs = attr_map(&edge.attributes)?;
                for (source, target) in edge_pairs(edge)? {
                    upsert_node(&mut doc, source.clone(), AttrMap::new());
                    upsert_node(&mut doc, target.clone(), AttrMap::new());
                    doc.edges.push(EdgeRec {
                        source,
                        target,
                        attrs: attrs.clone(),
                    });
                }
            }
            // Graph-level attribute defaults are not part of the document
            // model; they are dropped on read.
            Stmt::Attribute(_) | Stmt::GAttribute(_) => {}
            Stmt::Subgraph(_) => return Err(FormatError::Unsupported("subgraph")),
        }
    }

    Ok(doc)
}

pub fn to_ast(doc: &GraphDoc) -> Graph {
    let mut stmts = Vec::with_capacity(doc.nodes.len() + doc.edges.len());

    for node in &doc.nodes {
        stmts.push(Stmt::Node(Node {
            id: NodeId(quoted(&node.id), None),
            attributes: attributes(&node.attrs),
        }));
    }
    for edge in &doc.edges {
        stmts.push(Stmt::Edge(Edge {
            ty: EdgeTy::Pair(
                Vertex::N(NodeId(quoted(&edge.source), None)),
                Vertex::N(NodeId(quoted(&edge.target), None)),
            ),
            attributes: attributes(&edge.attrs),
        }));
    }

    let id = quoted(&doc.name);
    if doc.directed {
        Graph::DiGraph {
            id,
            strict: doc.strict,
            stmts,
        }
    } else {
        Graph::Graph {
            id,
            strict: doc.strict,
            stmts,
        }
    }
}

fn upsert_node(doc: &mut GraphDoc, id: String, attrs: AttrMap) {
    if let Some(existing) = doc.node_mut(&id) {
        existing.attrs.extend(attrs);
    } else {
        doc.nodes.push(NodeRec { id, attrs });
    }
}

fn edge_pairs(edge: &Edge) -> Result<Vec<(String, String)>, FormatError> {
    match &edge.ty {
        EdgeTy::Pair(a, b) => Ok(vec![(vertex_text(a)?, vertex_text(b)?)]),
        EdgeTy::Chain(vertices) => {
            let ids: Vec<String> = vertices
                .iter()
                .map(vertex_text)
                .collect::<Result<_, _>>()?;
            Ok(ids
                .windows(2)
                .map(|pair| (pair[0].clone(), pair[1].clone()))
                .collect())
        }
    }
}

fn vertex_text(vertex: &Vertex) -> Result<String, FormatError> {
    match vertex {
        Vertex::N(node_id) => node_id_text(node_id),
        Vertex::S(_) => Err(FormatError::Unsupported("subgraph edge endpoint")),
    }
}

fn node_id_text(node_id: &NodeId) -> Result<String, FormatError> {
    if node_id.1.is_some() {
        return Err(FormatError::Unsupported("node port"));
    }
    id_text(&node_id.0)
}

fn id_text(id: &Id) -> Result<String, FormatError> {
    match id {
        Id::Plain(s) => Ok(s.clone()),
        Id::Escaped(s) => Ok(unescape(s)),
        Id::Anonymous(_) => Ok(String::new()),
        Id::Html(_) => Err(FormatError::Unsupported("HTML identifier")),
    }
}

fn attr_map(attributes: &[Attribute]) -> Result<AttrMap, FormatError> {
    let mut map = AttrMap::new();
    for Attribute(key, value) in attributes {
        map.insert(id_text(key)?, id_text(value)?);
    }
    Ok(map)
}

fn attributes(attrs: &AttrMap) -> Vec<Attribute> {
    attrs
        .iter()
        .map(|(k, v)| Attribute(quoted(k), quoted(v)))
        .collect()
}

/// The parser hands quoted identifiers over verbatim, quotes included.
fn unescape(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn quoted(text: &str) -> Id {
    if is_bare(text) {
        Id::Plain(text.to_string())
    } else {
        let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
        Id::Escaped(format!("\"{}\"", escaped))
    }
}

/// Bare DOT identifiers: `[A-Za-z_][A-Za-z0-9_]*` or an unsigned integer,
/// and not a DOT keyword. Everything else gets quoted.
fn is_bare(text: &str) -> bool {
    if text.is_empty() || KEYWORDS.contains(&text.to_ascii_lowercase().as_str()) {
        return false;
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
