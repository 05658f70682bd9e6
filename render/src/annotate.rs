use dotedit_core::model::GraphDoc;
use dotedit_core::selection::Selection;
use url::form_urlencoded;

pub const SELECTED_COLOR: &str = "red";

/// Build the transient view copy of a document: every node gets a
/// select-link `URL` attribute, every edge a delete-link `URL`, and
/// selected nodes are tinted. The copy exists only for rendering and is
/// never written back to the session file.
pub fn annotate_for_view(doc: &GraphDoc, selection: &Selection, sessionid: &str) -> GraphDoc {
    let session_pair = pair("sessionid", sessionid);
    let sel_suffix = selection.query_suffix();

    let mut view = doc.clone();
    for node in &mut view.nodes {
        let url = format!(
            "/selectnode?{}{}&{}",
            session_pair,
            sel_suffix,
            pair("id", &node.id)
        );
        node.attrs.insert("URL".to_string(), url);
        if selection.contains(&node.id) {
            node.attrs
                .insert("color".to_string(), SELECTED_COLOR.to_string());
        }
    }
    for edge in &mut view.edges {
        let url = format!(
            "/selectedge?{}{}&{}&{}",
            session_pair,
            sel_suffix,
            pair("source", &edge.source),
            pair("target", &edge.target)
        );
        edge.attrs.insert("URL".to_string(), url);
    }
    view
}

fn pair(key: &str, value: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotedit_core::model::{EdgeRec, NodeRec};

    fn doc() -> GraphDoc {
        let mut doc = GraphDoc::new("G", true);
        doc.nodes.push(NodeRec::new("a"));
        doc.nodes.push(NodeRec::new("b c"));
        doc.edges.push(EdgeRec::new("a", "b c"));
        doc
    }

    #[test]
    fn nodes_get_select_urls_and_edges_get_delete_urls() {
        let view = annotate_for_view(&doc(), &Selection::new(), "s1");

        assert_eq!(
            view.node("a").unwrap().attrs.get("URL").unwrap(),
            "/selectnode?sessionid=s1&id=a"
        );
        assert_eq!(
            view.node("b c").unwrap().attrs.get("URL").unwrap(),
            "/selectnode?sessionid=s1&id=b+c"
        );
        assert_eq!(
            view.edges[0].attrs.get("URL").unwrap(),
            "/selectedge?sessionid=s1&source=a&target=b+c"
        );
    }

    #[test]
    fn selection_is_carried_in_urls_and_marks_nodes() {
        let selection = Selection::from_ids(["a"]);
        let view = annotate_for_view(&doc(), &selection, "s1");

        assert_eq!(
            view.node("b c").unwrap().attrs.get("URL").unwrap(),
            "/selectnode?sessionid=s1&sel_node=a&id=b+c"
        );
        assert_eq!(view.node("a").unwrap().attrs.get("color").unwrap(), "red");
        assert!(!view.node("b c").unwrap().attrs.contains_key("color"));
        assert_eq!(
            view.edges[0].attrs.get("URL").unwrap(),
            "/selectedge?sessionid=s1&sel_node=a&source=a&target=b+c"
        );
    }

    #[test]
    fn annotation_leaves_the_source_document_untouched() {
        let original = doc();
        let _ = annotate_for_view(&original, &Selection::from_ids(["a"]), "s1");
        assert!(original.node("a").unwrap().attrs.is_empty());
    }
}
