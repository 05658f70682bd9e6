use std::collections::BTreeSet;
use url::form_urlencoded;

/// The set of node ids currently highlighted in the UI. Reconstructed from
/// request parameters on every request and carried back through redirect
/// URLs; it has no server-side lifecycle of its own.
///
/// Canonical wire form: repeated percent-encoded `sel_node=<id>` pairs.
/// Duplicate entries collapse on parse, ordering is not significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

pub const SEL_NODE_PARAM: &str = "sel_node";

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Extract the selection from a raw query string, ignoring unrelated keys.
    pub fn from_query(query: &str) -> Self {
        let ids = form_urlencoded::parse(query.as_bytes())
            .filter(|(k, _)| k == SEL_NODE_PARAM)
            .map(|(_, v)| v.into_owned());
        Self::from_ids(ids)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn first(&self) -> Option<&str> {
        self.ids.iter().next().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Query-string suffix to append after the session parameter, e.g.
    /// `&sel_node=a&sel_node=b`. Empty selection yields an empty string.
    pub fn query_suffix(&self) -> String {
        let mut out = String::new();
        for id in &self.ids {
            out.push('&');
            let encoded = form_urlencoded::Serializer::new(String::new())
                .append_pair(SEL_NODE_PARAM, id)
                .finish();
            out.push_str(&encoded);
        }
        out
    }
}
