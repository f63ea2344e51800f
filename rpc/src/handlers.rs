//! Request handlers.
//!
//! Page bodies come pre-rendered from the node; handlers only pick the
//! status code and content type.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;
use bytes::Bytes;
use tally_node::{Ballot, TallyNode, VoteForm};
use tally_types::CandidateId;
use tracing::info;

use crate::error::RpcError;

fn json(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Plain `302 Found` to the homepage.
fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

// ── Pages ────────────────────────────────────────────────────────────────

pub async fn home(State(node): State<Arc<TallyNode>>) -> Result<Response, RpcError> {
    Ok(json(node.home_page().await?))
}

/// Unknown or malformed IDs send the visitor back to the homepage.
pub async fn candidate(
    State(node): State<Arc<TallyNode>>,
    Path(id): Path<String>,
) -> Result<Response, RpcError> {
    let Ok(id) = id.parse::<CandidateId>() else {
        return Ok(redirect_home());
    };
    match node.candidate_page(id).await? {
        Some(page) => Ok(json(page)),
        None => Ok(redirect_home()),
    }
}

pub async fn political_party(
    State(node): State<Arc<TallyNode>>,
    Path(name): Path<String>,
) -> Result<Response, RpcError> {
    match node.party_page(&name).await? {
        Some(page) => Ok(json(page)),
        None => Err(RpcError::NotFound(format!("political party '{name}'"))),
    }
}

// ── Voting ───────────────────────────────────────────────────────────────

pub async fn vote_form(State(node): State<Arc<TallyNode>>) -> Result<Response, RpcError> {
    Ok(json(node.vote_form()?))
}

pub async fn submit_vote(
    State(node): State<Arc<TallyNode>>,
    Form(form): Form<VoteForm>,
) -> Result<Response, RpcError> {
    let outcome = node.submit_vote(Ballot::from(form)).await?;
    Ok(json(outcome.page))
}

// ── Maintenance ──────────────────────────────────────────────────────────

pub async fn initialize(State(node): State<Arc<TallyNode>>) -> Result<Response, RpcError> {
    let report = node.reset().await?;
    info!(
        candidates = report.candidates,
        "Reset requested over HTTP"
    );
    Ok((StatusCode::OK, "Finish").into_response())
}

pub async fn metrics(State(node): State<Arc<TallyNode>>) -> Response {
    match node.metrics().encode_text() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
