//! The mutation protocol: how a selection plus an incoming action
//! transforms the document and yields the next selection. All functions
//! are pure with respect to the filesystem; callers own the
//! parse-mutate-serialize cycle and persist only when a function reports
//! that the document changed.

use crate::error::{EditorError, ErrorCode};
use crate::model::{AttrMap, EdgeRec, GraphDoc, NodeRec};
use crate::selection::Selection;
use serde_json::Value;
use thiserror::Error;

/// Synthetic attribute some DOT round-trips attach to parallel edges.
/// Stripped before any freshly-added edge is persisted so the key never
/// leaks into the on-disk file.
pub const EDGE_KEY_ATTR: &str = "key";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MutateError {
    #[error("no node with id `{0}`")]
    NodeNotFound(String),
    #[error("rename collides with existing node `{0}`")]
    RenameCollision(String),
    #[error("malformed edit payload: {0}")]
    MalformedPayload(String),
    #[error("selection holds {0} nodes; transitions are defined for at most one")]
    SelectionCardinality(usize),
}

impl EditorError for MutateError {
    fn error_code(&self) -> ErrorCode {
        match self {
            MutateError::NodeNotFound(_) => ErrorCode::NotFound,
            MutateError::MalformedPayload(_) => ErrorCode::MalformedInput,
            MutateError::RenameCollision(_) | MutateError::SelectionCardinality(_) => {
                ErrorCode::InvariantViolation
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The node was already selected; toggled off.
    Deselected,
    /// Nothing was selected; the node became the sole selection.
    Selected,
    /// A second node was picked: a new edge was added to the document.
    Connected { source: String, target: String },
}

impl SelectOutcome {
    pub fn mutated_document(&self) -> bool {
        matches!(self, SelectOutcome::Connected { .. })
    }
}

/// Click-to-select / click-to-connect transition.
///
/// Toggling (either direction) never touches the document. Picking a node
/// while exactly one *other* node is selected connects the two and clears
/// the selection. A selection larger than one is an invariant violation:
/// the defined transitions can never produce one, so it is rejected rather
/// than tie-broken.
pub fn select_node(
    doc: &mut GraphDoc,
    selection: &Selection,
    id: &str,
) -> Result<(Selection, SelectOutcome), MutateError> {
    if selection.len() > 1 {
        return Err(MutateError::SelectionCardinality(selection.len()));
    }

    if selection.contains(id) {
        return Ok((Selection::new(), SelectOutcome::Deselected));
    }

    match selection.first() {
        None => {
            let mut next = Selection::new();
            next.insert(id);
            Ok((next, SelectOutcome::Selected))
        }
        Some(source) => {
            let source = source.to_string();
            connect(doc, &source, id);
            Ok((
                Selection::new(),
                SelectOutcome::Connected {
                    source,
                    target: id.to_string(),
                },
            ))
        }
    }
}

fn connect(doc: &mut GraphDoc, source: &str, target: &str) {
    for edge in &mut doc.edges {
        edge.attrs.remove(EDGE_KEY_ATTR);
    }
    doc.edges.push(EdgeRec::new(source, target));
}

/// Append a node with no attributes. Duplicate ids are permitted; by-id
/// operations resolve to the first match in document order.
pub fn add_node(doc: &mut GraphDoc, id: &str) {
    doc.nodes.push(NodeRec::new(id));
}

/// Remove every node with the given id and, cascading, every edge that
/// touches it. Returns whether anything was removed.
pub fn delete_node(doc: &mut GraphDoc, id: &str) -> bool {
    let nodes_before = doc.nodes.len();
    let edges_before = doc.edges.len();
    doc.nodes.retain(|n| n.id != id);
    doc.edges.retain(|e| e.source != id && e.target != id);
    doc.nodes.len() != nodes_before || doc.edges.len() != edges_before
}

/// Parse the edit form's attribute payload: a flat JSON object. Strings
/// pass through; numbers and booleans are stringified; nested values are
/// rejected since DOT attributes are flat strings. An `id` key is dropped:
/// the node id travels in its own form field and is never an attribute.
pub fn parse_edit_payload(raw: &str) -> Result<AttrMap, MutateError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| MutateError::MalformedPayload(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(MutateError::MalformedPayload(
            "expected a JSON object".into(),
        ));
    };

    let mut attrs = AttrMap::new();
    for (key, value) in map {
        if key == "id" {
            continue;
        }
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => {
                return Err(MutateError::MalformedPayload(format!(
                    "attribute `{key}` has non-scalar value {other}"
                )))
            }
        };
        attrs.insert(key, text);
    }
    Ok(attrs)
}

/// Rename plus full attribute replacement on the first node matching `id`,
/// rewriting every edge endpoint that referenced the old id. The previous
/// attribute set is discarded entirely, not merged.
pub fn edit_node(
    doc: &mut GraphDoc,
    id: &str,
    new_id: &str,
    attrs: AttrMap,
) -> Result<(), MutateError> {
    if !doc.has_node(id) {
        return Err(MutateError::NodeNotFound(id.to_string()));
    }
    if new_id != id && doc.has_node(new_id) {
        return Err(MutateError::RenameCollision(new_id.to_string()));
    }

    if let Some(node) = doc.node_mut(id) {
        node.attrs = attrs;
        node.id = new_id.to_string();
    }
    for edge in &mut doc.edges {
        if edge.source == id {
            edge.source = new_id.to_string();
        }
        if edge.target == id {
            edge.target = new_id.to_string();
        }
    }
    Ok(())
}

/// Remove every edge whose (source, target) pair matches exactly.
/// Direction-sensitive: `(a, b)` does not match `(b, a)`. Returns the
/// number of edges removed (parallel edges all go at once).
pub fn delete_edge(doc: &mut GraphDoc, source: &str, target: &str) -> usize {
    let before = doc.edges.len();
    doc.edges
        .retain(|e| !(e.source == source && e.target == target));
    before - doc.edges.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(nodes: &[&str], edges: &[(&str, &str)]) -> GraphDoc {
        let mut doc = GraphDoc::new("G", true);
        for id in nodes {
            doc.nodes.push(NodeRec::new(*id));
        }
        for (s, t) in edges {
            doc.edges.push(EdgeRec::new(*s, *t));
        }
        doc
    }

    fn edge_pairs(doc: &GraphDoc) -> Vec<(String, String)> {
        doc.edges
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }

    #[test]
    fn toggle_on_then_off_is_idempotent_and_mutation_free() {
        let mut doc = doc_with(&["a", "b"], &[]);
        let untouched = doc.clone();

        let (sel, outcome) = select_node(&mut doc, &Selection::new(), "a").unwrap();
        assert_eq!(outcome, SelectOutcome::Selected);
        assert!(sel.contains("a"));

        let (sel, outcome) = select_node(&mut doc, &sel, "a").unwrap();
        assert_eq!(outcome, SelectOutcome::Deselected);
        assert!(sel.is_empty());
        assert_eq!(doc, untouched);
    }

    #[test]
    fn selecting_second_node_connects_and_clears() {
        let mut doc = doc_with(&["a", "b"], &[]);
        let selection = Selection::from_ids(["a"]);

        let (sel, outcome) = select_node(&mut doc, &selection, "b").unwrap();
        assert_eq!(
            outcome,
            SelectOutcome::Connected {
                source: "a".into(),
                target: "b".into(),
            }
        );
        assert!(sel.is_empty());
        assert_eq!(edge_pairs(&doc), vec![("a".to_string(), "b".to_string())]);
        assert!(doc.edges[0].attrs.is_empty());
    }

    #[test]
    fn connect_strips_transient_key_attribute_from_all_edges() {
        let mut doc = doc_with(&["a", "b", "c"], &[("a", "b")]);
        doc.edges[0].attrs.insert(EDGE_KEY_ATTR.into(), "0".into());
        doc.edges[0].attrs.insert("label".into(), "kept".into());

        select_node(&mut doc, &Selection::from_ids(["b"]), "c").unwrap();

        assert!(!doc.edges[0].attrs.contains_key(EDGE_KEY_ATTR));
        assert_eq!(doc.edges[0].attrs.get("label").unwrap(), "kept");
    }

    #[test]
    fn oversized_selection_is_rejected_without_mutation() {
        let mut doc = doc_with(&["a", "b", "c"], &[]);
        let untouched = doc.clone();

        let err = select_node(&mut doc, &Selection::from_ids(["a", "b"]), "c").unwrap_err();
        assert_eq!(err, MutateError::SelectionCardinality(2));
        assert_eq!(err.error_code(), ErrorCode::InvariantViolation);
        assert_eq!(doc, untouched);
    }

    #[test]
    fn delete_node_cascades_to_touching_edges() {
        let mut doc = doc_with(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);

        assert!(delete_node(&mut doc, "b"));

        let ids: Vec<_> = doc.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(doc.edges.is_empty());
    }

    #[test]
    fn delete_node_on_unknown_id_reports_nothing_removed() {
        let mut doc = doc_with(&["a"], &[]);
        assert!(!delete_node(&mut doc, "ghost"));
    }

    #[test]
    fn edit_replaces_attributes_instead_of_merging() {
        let mut doc = doc_with(&["a"], &[]);
        doc.node_mut("a")
            .unwrap()
            .attrs
            .insert("color".into(), "blue".into());

        let payload = parse_edit_payload(r#"{"shape": "box"}"#).unwrap();
        edit_node(&mut doc, "a", "a", payload).unwrap();

        let attrs = &doc.node("a").unwrap().attrs;
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("shape").unwrap(), "box");
    }

    #[test]
    fn rename_propagates_to_both_edge_endpoints() {
        let mut doc = doc_with(&["a", "b", "c"], &[("a", "b"), ("c", "a")]);

        edit_node(&mut doc, "a", "z", AttrMap::new()).unwrap();

        assert_eq!(
            edge_pairs(&doc),
            vec![
                ("z".to_string(), "b".to_string()),
                ("c".to_string(), "z".to_string()),
            ]
        );
        assert!(doc.has_node("z"));
        assert!(!doc.has_node("a"));
    }

    #[test]
    fn edit_unknown_node_surfaces_not_found() {
        let mut doc = doc_with(&["a"], &[]);
        let untouched = doc.clone();

        let err = edit_node(&mut doc, "ghost", "ghost", AttrMap::new()).unwrap_err();
        assert_eq!(err, MutateError::NodeNotFound("ghost".into()));
        assert_eq!(err.error_code(), ErrorCode::NotFound);
        assert_eq!(doc, untouched);
    }

    #[test]
    fn rename_onto_existing_id_is_rejected() {
        let mut doc = doc_with(&["a", "b"], &[("a", "b")]);
        let untouched = doc.clone();

        let err = edit_node(&mut doc, "a", "b", AttrMap::new()).unwrap_err();
        assert_eq!(err, MutateError::RenameCollision("b".into()));
        assert_eq!(doc, untouched);
    }

    #[test]
    fn edit_payload_accepts_scalars_and_rejects_nesting() {
        let attrs = parse_edit_payload(r#"{"label": "Hi", "weight": 2, "flag": true}"#).unwrap();
        assert_eq!(attrs.get("label").unwrap(), "Hi");
        assert_eq!(attrs.get("weight").unwrap(), "2");
        assert_eq!(attrs.get("flag").unwrap(), "true");

        assert!(matches!(
            parse_edit_payload(r#"{"nested": {"x": 1}}"#),
            Err(MutateError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_edit_payload("not json"),
            Err(MutateError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_edit_payload(r#"["a", "b"]"#),
            Err(MutateError::MalformedPayload(_))
        ));
    }

    #[test]
    fn edit_payload_drops_the_id_key() {
        let attrs = parse_edit_payload(r#"{"id": "z", "shape": "box"}"#).unwrap();
        assert!(!attrs.contains_key("id"));
        assert_eq!(attrs.get("shape").unwrap(), "box");

        let mut doc = doc_with(&["a"], &[]);
        edit_node(&mut doc, "a", "z", attrs).unwrap();
        assert!(!doc.node("z").unwrap().attrs.contains_key("id"));
    }

    #[test]
    fn edge_deletion_is_direction_sensitive_and_exact() {
        let mut doc = doc_with(&["a", "b"], &[("a", "b"), ("b", "a"), ("a", "b")]);

        let removed = delete_edge(&mut doc, "a", "b");

        assert_eq!(removed, 2);
        assert_eq!(edge_pairs(&doc), vec![("b".to_string(), "a".to_string())]);
    }

    #[test]
    fn duplicate_node_ids_are_permitted_on_add() {
        let mut doc = doc_with(&["a"], &[]);
        add_node(&mut doc, "a");
        assert_eq!(doc.nodes.len(), 2);
    }
}
