//! The control-panel page: rendered image plus its clickable map on the
//! left, add/delete/edit forms on the right. Self-contained HTML built
//! with `format!`; the cmapx fragment comes straight from Graphviz and
//! is embedded verbatim.

use dotedit_core::model::{GraphDoc, NodeRec};
use dotedit_core::selection::Selection;

/// Attribute keys hidden from the edit form: `id` is edited through its
/// own field, `URL` and `color` are view-layer annotations.
const PRUNED_ATTRS: [&str; 3] = ["id", "URL", "color"];

pub fn page(sessionid: &str, doc: &GraphDoc, selection: &Selection, cmapx: &str) -> String {
    let map_name = if doc.name.is_empty() { "G" } else { &doc.name };

    let panel = match selection.first() {
        None => add_form(sessionid),
        Some(selected) => {
            let mut panel = add_form(sessionid);
            panel.push_str(&delete_form(sessionid, selected));
            if let Some(node) = doc.node(selected) {
                panel.push_str(&edit_form(sessionid, node));
            }
            panel
        }
    };

    // r## because the template itself contains a `"#` sequence (usemap).
    format!(
        r##"<!DOCTYPE html>
<html>
	<body>
		<div style="float: left; width: 50%">
			<img src="imgs/{sessionid}" usemap="#{map}" alt="graph {map}" />
			{cmapx}
		</div>
		<div style="float: right; width: 22%">
			{panel}
		</div>
	</body>
</html>
"##,
        sessionid = escape(sessionid),
        map = escape(map_name),
        cmapx = cmapx,
        panel = panel,
    )
}

fn add_form(sessionid: &str) -> String {
    format!(
        r#"<form action="/addnode" method="post">
				<strong>Add Node</strong><br>
				<label for="id">Id:</label>
				<input type="text" id="id" name="id" style="width: 75px" value=""><br>
				<input type="hidden" name="sessionid" value="{sessionid}" />
				<input type="submit" value="Submit">
			</form>
"#,
        sessionid = escape(sessionid),
    )
}

fn delete_form(sessionid: &str, id: &str) -> String {
    format!(
        r#"			<form action="/deletenode" method="post">
				<strong>Delete Node</strong><br>
				<input type="hidden" name="id" value="{id}">
				<input type="hidden" name="sessionid" value="{sessionid}" />
				<input type="submit" value="Submit">
			</form>
"#,
        id = escape(id),
        sessionid = escape(sessionid),
    )
}

fn edit_form(sessionid: &str, node: &NodeRec) -> String {
    format!(
        r#"			<form action="/editnode" method="post" id="editnodeform">
				<strong>Edit Node</strong><br>
				<label for="edit_node_data">Node Data (json):</label><br>
				<textarea name="edit_node_data" cols="25" rows="3" form="editnodeform">{data}</textarea><br>
				<label for="new_id">Id:</label>
				<input type="text" id="new_id" name="new_id" style="width: 75px" value="{id}"><br>
				<input type="hidden" name="id" value="{id}">
				<input type="hidden" name="sessionid" value="{sessionid}"/>
				<input type="submit" value="Submit">
			</form>
"#,
        data = escape(&pruned_attr_json(node)),
        id = escape(&node.id),
        sessionid = escape(sessionid),
    )
}

/// The node's attributes as pretty JSON, minus the view-layer keys.
fn pruned_attr_json(node: &NodeRec) -> String {
    let pruned: std::collections::BTreeMap<&String, &String> = node
        .attrs
        .iter()
        .filter(|(k, _)| !PRUNED_ATTRS.contains(&k.as_str()))
        .collect();
    serde_json::to_string_pretty(&pruned).unwrap_or_else(|_| "{}".to_string())
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dotedit_core::model::AttrMap;

    fn doc() -> GraphDoc {
        let mut doc = GraphDoc::new("G", true);
        let mut node = NodeRec::new("a");
        node.attrs.insert("shape".into(), "box".into());
        node.attrs.insert("URL".into(), "/stale".into());
        doc.nodes.push(node);
        doc
    }

    #[test]
    fn empty_selection_shows_only_the_add_form() {
        let html = page("s1", &doc(), &Selection::new(), "<map name=\"G\"></map>");
        assert!(html.contains("/addnode"));
        assert!(!html.contains("/deletenode"));
        assert!(!html.contains("/editnode"));
        assert!(html.contains("imgs/s1"));
        assert!(html.contains("usemap=\"#G\""));
        assert!(html.contains("alt=\"graph G\""));
    }

    #[test]
    fn selected_node_shows_delete_and_edit_with_pruned_attrs() {
        let html = page("s1", &doc(), &Selection::from_ids(["a"]), "");
        assert!(html.contains("/deletenode"));
        assert!(html.contains("/editnode"));
        assert!(html.contains("shape"));
        assert!(!html.contains("/stale"), "URL attr must be pruned");
    }

    #[test]
    fn selected_but_vanished_node_skips_the_edit_form() {
        let html = page("s1", &doc(), &Selection::from_ids(["gone"]), "");
        assert!(html.contains("/deletenode"));
        assert!(!html.contains("/editnode"));
    }

    #[test]
    fn values_are_html_escaped() {
        let mut doc = GraphDoc::new("G", true);
        let mut node = NodeRec::new("<script>");
        node.attrs = AttrMap::new();
        doc.nodes.push(node);

        let html = page("s1", &doc, &Selection::from_ids(["<script>"]), "");
        assert!(!html.contains("value=\"<script>\""));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn escape_handles_all_specials() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
