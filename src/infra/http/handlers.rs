use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    response::{IntoResponse, Response},
};

use crate::{
    application::error::AppError,
    cache::CachedResponse,
    domain::request::{HighlightRequest, ThemeRequest, ThemeUrlRequest},
};

use super::HttpState;

// Every handler waits for the engine before looking at its input.

pub(super) async fn css_from_body(State(state): State<HttpState>, body: Bytes) -> Response {
    let result = async {
        let engine = state.gate.ready().await?;
        let request = ThemeRequest::from_body(&body)?;
        state.theme.css(engine, request).await
    }
    .await;

    respond(&state, result)
}

pub(super) async fn css_from_url(
    State(state): State<HttpState>,
    RawQuery(query): RawQuery,
) -> Response {
    let result = async {
        let engine = state.gate.ready().await?;
        let request = ThemeUrlRequest::from_query(query.as_deref())?;
        state.theme.css_from_url(engine, request).await
    }
    .await;

    respond(&state, result)
}

pub(super) async fn highlight(State(state): State<HttpState>, body: Bytes) -> Response {
    let result = async {
        let engine = state.gate.ready().await?;
        let request = HighlightRequest::from_body(&body)?;
        state.highlight.highlight(engine, request).await
    }
    .await;

    respond(&state, result)
}

pub(super) async fn redirect(State(state): State<HttpState>) -> Response {
    state.responses.redirect()
}

fn respond(state: &HttpState, result: Result<CachedResponse, AppError>) -> Response {
    match result {
        Ok(cached) => state.responses.replay(cached),
        Err(err) => err.into_response(),
    }
}
