//! Raw query-string handling. The select endpoints carry a repeated
//! `sel_node` key, which axum's serde-based `Query` extractor cannot
//! collect into a set, so parsing goes through `form_urlencoded`
//! directly and shares the selection codec with the redirect builder.

use crate::error::AppError;
use dotedit_core::selection::Selection;
use std::collections::HashMap;
use url::form_urlencoded;

pub struct QueryParams {
    values: HashMap<String, String>,
    pub selection: Selection,
}

pub fn parse(raw: Option<&str>) -> QueryParams {
    let raw = raw.unwrap_or("");
    let mut values = HashMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        // First occurrence wins for scalar keys.
        values.entry(key.into_owned()).or_insert(value.into_owned());
    }
    QueryParams {
        values,
        selection: Selection::from_query(raw),
    }
}

impl QueryParams {
    pub fn required(&self, key: &'static str) -> Result<&str, AppError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or(AppError::MissingParam(key))
    }
}
