use crate::error::AppError;
use crate::html;
use crate::params;
use crate::state::AppState;
use axum::extract::{Path as UrlPath, RawQuery, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use dotedit_core::mutate;
use dotedit_core::selection::Selection;
use serde::Deserialize;
use tracing::info;
use url::form_urlencoded;

/// `GET /` — render the current document with click targets and return
/// the control panel. Read-only with respect to the session file: the
/// annotated copy is rendered and discarded, never written back.
pub async fn view(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Html<String>, AppError> {
    let q = params::parse(raw.as_deref());
    let sessionid = q.required("sessionid")?.to_string();
    let selection = q.selection;

    let path = state.store.resolve(&sessionid)?;
    let doc = format::read_dot(&path)?;

    let view_doc = render::annotate_for_view(&doc, &selection, &sessionid);
    let (svg, map) = tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, String), AppError> {
        let svg = render::svg(&view_doc)?;
        let map = render::cmapx(&view_doc)?;
        Ok((svg, map))
    })
    .await??;

    state.images.put(&sessionid, svg);
    Ok(Html(html::page(&sessionid, &doc, &selection, &map)))
}

/// `GET /imgs/:sessionid` — the latest rendered image. Regenerated on
/// every page view, so the client must never cache it.
pub async fn image(
    State(state): State<AppState>,
    UrlPath(sessionid): UrlPath<String>,
) -> Result<Response, AppError> {
    let bytes = state
        .images
        .get(&sessionid)
        .ok_or_else(|| AppError::ImageMissing(sessionid.clone()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response())
}

/// `GET /selectnode` — the click-to-select / click-to-connect transition.
pub async fn select_node(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Redirect, AppError> {
    let q = params::parse(raw.as_deref());
    let sessionid = q.required("sessionid")?;
    let id = q.required("id")?;

    let path = state.store.resolve(sessionid)?;
    let lock = state.store.lock(sessionid);
    let _guard = lock.lock().await;

    let mut doc = format::read_dot(&path)?;
    let (next, outcome) = mutate::select_node(&mut doc, &q.selection, id)?;
    if outcome.mutated_document() {
        format::write_dot(&doc, &path)?;
    }
    info!(session = %sessionid, node = %id, ?outcome, "select");

    Ok(Redirect::to(&view_url(sessionid, &next)))
}

/// `GET /selectedge` — delete the clicked edge; selection is untouched.
pub async fn select_edge(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Redirect, AppError> {
    let q = params::parse(raw.as_deref());
    let sessionid = q.required("sessionid")?;
    let source = q.required("source")?;
    let target = q.required("target")?;

    let path = state.store.resolve(sessionid)?;
    let lock = state.store.lock(sessionid);
    let _guard = lock.lock().await;

    let mut doc = format::read_dot(&path)?;
    let removed = mutate::delete_edge(&mut doc, source, target);
    if removed > 0 {
        format::write_dot(&doc, &path)?;
    }
    info!(session = %sessionid, %source, %target, removed, "delete edge");

    Ok(Redirect::to(&view_url(sessionid, &q.selection)))
}

#[derive(Debug, Deserialize)]
pub struct AddNodeForm {
    pub sessionid: String,
    pub id: String,
}

/// `POST /addnode` — append an attribute-free node.
pub async fn add_node(
    State(state): State<AppState>,
    Form(form): Form<AddNodeForm>,
) -> Result<Redirect, AppError> {
    if form.id.is_empty() {
        return Err(AppError::EmptyParam("id"));
    }

    let path = state.store.resolve(&form.sessionid)?;
    let lock = state.store.lock(&form.sessionid);
    let _guard = lock.lock().await;

    let mut doc = format::read_dot(&path)?;
    mutate::add_node(&mut doc, &form.id);
    format::write_dot(&doc, &path)?;
    info!(session = %form.sessionid, node = %form.id, "add node");

    Ok(Redirect::to(&view_url(&form.sessionid, &Selection::new())))
}

#[derive(Debug, Deserialize)]
pub struct DeleteNodeForm {
    pub sessionid: String,
    pub id: String,
}

/// `POST /deletenode` — remove the node and, cascading, its edges.
pub async fn delete_node(
    State(state): State<AppState>,
    Form(form): Form<DeleteNodeForm>,
) -> Result<Redirect, AppError> {
    let path = state.store.resolve(&form.sessionid)?;
    let lock = state.store.lock(&form.sessionid);
    let _guard = lock.lock().await;

    let mut doc = format::read_dot(&path)?;
    let removed = mutate::delete_node(&mut doc, &form.id);
    if removed {
        format::write_dot(&doc, &path)?;
    }
    info!(session = %form.sessionid, node = %form.id, removed, "delete node");

    Ok(Redirect::to(&view_url(&form.sessionid, &Selection::new())))
}

#[derive(Debug, Deserialize)]
pub struct EditNodeForm {
    pub sessionid: String,
    pub id: String,
    pub new_id: String,
    pub edit_node_data: String,
}

/// `POST /editnode` — rename plus full attribute replacement. The payload
/// is parsed before the file is touched, so a malformed payload leaves
/// the document exactly as it was.
pub async fn edit_node(
    State(state): State<AppState>,
    Form(form): Form<EditNodeForm>,
) -> Result<Redirect, AppError> {
    let attrs = mutate::parse_edit_payload(&form.edit_node_data)?;

    let path = state.store.resolve(&form.sessionid)?;
    let lock = state.store.lock(&form.sessionid);
    let _guard = lock.lock().await;

    let mut doc = format::read_dot(&path)?;
    mutate::edit_node(&mut doc, &form.id, &form.new_id, attrs)?;
    format::write_dot(&doc, &path)?;
    info!(session = %form.sessionid, node = %form.id, new_id = %form.new_id, "edit node");

    Ok(Redirect::to(&view_url(&form.sessionid, &Selection::new())))
}

fn view_url(sessionid: &str, selection: &Selection) -> String {
    let session_pair = form_urlencoded::Serializer::new(String::new())
        .append_pair("sessionid", sessionid)
        .finish();
    format!("/?{}{}", session_pair, selection.query_suffix())
}
