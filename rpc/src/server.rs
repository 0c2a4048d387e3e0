//! Axum-based RPC server.

use crate::handlers::*;
use crate::RpcError;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use gpoll_core::PollService;
use gpoll_types::{PollId, Timestamp};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

/// The service behind a single-writer lock: each RPC handler holds the lock
/// for the whole call, preserving the per-call atomicity the core assumes.
pub type SharedService = Arc<Mutex<PollService>>;

pub struct RpcServer {
    addr: SocketAddr,
    service: SharedService,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, service: SharedService) -> Self {
        Self { addr, service }
    }

    /// Bind and serve until the process is shut down.
    pub async fn start(&self) -> Result<(), RpcError> {
        let app = router(self.service.clone());
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.addr)))?;
        tracing::info!(addr = %self.addr, "rpc server listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}

/// Build the full route table over a shared service.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/polls", post(create_poll))
        .route("/polls/:id", get(get_poll))
        .route("/polls/:id/end", post(end_poll))
        .route("/polls/:id/process", post(process_pending_batch))
        .route("/polls/:id/force", post(force_process_batch))
        .route("/polls/:id/tallies", get(get_tallies))
        .route("/polls/:id/pending", get(get_pending))
        .route("/polls/:id/voted/:address", get(has_voted))
        .route("/votes", post(submit_vote))
        .route("/nonces/:address", get(get_nonce))
        .route("/settings/batch", get(get_batch_settings))
        .route("/settings/batch", put(set_batch_settings))
        .with_state(service)
}

fn lock(service: &SharedService) -> Result<MutexGuard<'_, PollService>, RpcError> {
    service
        .lock()
        .map_err(|_| RpcError::Server("service lock poisoned".into()))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health(State(service): State<SharedService>) -> Result<Json<HealthResponse>, RpcError> {
    let svc = lock(&service)?;
    Ok(Json(HealthResponse {
        status: "ok",
        polls: svc.polls().count(),
    }))
}

async fn create_poll(
    State(service): State<SharedService>,
    Json(req): Json<CreatePollRequest>,
) -> Result<Json<CreatePollResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    let mut svc = lock(&service)?;
    let poll_id = svc.create_poll(
        caller,
        req.question,
        req.options,
        req.duration_secs,
        Timestamp::now(),
    )?;
    Ok(Json(CreatePollResponse {
        poll_id: poll_id.as_u64(),
        events: svc.take_events(),
    }))
}

async fn submit_vote(
    State(service): State<SharedService>,
    Json(req): Json<SubmitVoteRequest>,
) -> Result<Json<SubmitVoteResponse>, RpcError> {
    let vote = req.into_signed_vote()?;
    let poll_id = vote.poll_id;
    let mut svc = lock(&service)?;
    svc.submit_vote(vote, Timestamp::now())?;
    Ok(Json(SubmitVoteResponse {
        queued: true,
        pending: svc.pending_votes_count(poll_id),
        events: svc.take_events(),
    }))
}

async fn end_poll(
    State(service): State<SharedService>,
    Path(id): Path<u64>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<AckResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    let mut svc = lock(&service)?;
    svc.end_poll(&caller, PollId::new(id))?;
    Ok(Json(AckResponse {
        events: svc.take_events(),
    }))
}

async fn process_pending_batch(
    State(service): State<SharedService>,
    Path(id): Path<u64>,
) -> Result<Json<SettlementResponse>, RpcError> {
    let mut svc = lock(&service)?;
    let outcome = svc.process_pending_batch(PollId::new(id), Timestamp::now())?;
    Ok(Json(SettlementResponse {
        processed: outcome.processed,
        discarded: outcome.discarded,
        events: svc.take_events(),
    }))
}

async fn force_process_batch(
    State(service): State<SharedService>,
    Path(id): Path<u64>,
    Json(req): Json<CallerRequest>,
) -> Result<Json<SettlementResponse>, RpcError> {
    let caller = parse_address(&req.caller)?;
    let mut svc = lock(&service)?;
    let outcome = svc.force_process_batch(&caller, PollId::new(id), Timestamp::now())?;
    Ok(Json(SettlementResponse {
        processed: outcome.processed,
        discarded: outcome.discarded,
        events: svc.take_events(),
    }))
}

async fn get_poll(
    State(service): State<SharedService>,
    Path(id): Path<u64>,
) -> Result<Json<PollView>, RpcError> {
    let svc = lock(&service)?;
    let poll = svc.poll(PollId::new(id))?;
    Ok(Json(PollView::from_poll(poll, Timestamp::now())))
}

async fn get_tallies(
    State(service): State<SharedService>,
    Path(id): Path<u64>,
) -> Result<Json<TalliesResponse>, RpcError> {
    let svc = lock(&service)?;
    let tallies = svc.vote_counts(PollId::new(id))?.to_vec();
    let total = tallies.iter().sum();
    Ok(Json(TalliesResponse {
        poll_id: id,
        tallies,
        total,
    }))
}

async fn get_pending(
    State(service): State<SharedService>,
    Path(id): Path<u64>,
) -> Result<Json<PendingResponse>, RpcError> {
    let svc = lock(&service)?;
    // Existence check so unknown polls 404 instead of reporting zero.
    svc.poll(PollId::new(id))?;
    Ok(Json(PendingResponse {
        poll_id: id,
        pending: svc.pending_votes_count(PollId::new(id)),
    }))
}

async fn has_voted(
    State(service): State<SharedService>,
    Path((id, address)): Path<(u64, String)>,
) -> Result<Json<HasVotedResponse>, RpcError> {
    let voter = parse_address(&address)?;
    let svc = lock(&service)?;
    svc.poll(PollId::new(id))?;
    Ok(Json(HasVotedResponse {
        poll_id: id,
        voter: address,
        voted: svc.has_voted_in_poll(PollId::new(id), &voter),
    }))
}

async fn get_nonce(
    State(service): State<SharedService>,
    Path(address): Path<String>,
) -> Result<Json<NonceResponse>, RpcError> {
    let voter = parse_address(&address)?;
    let svc = lock(&service)?;
    Ok(Json(NonceResponse {
        voter: address,
        nonce: svc.nonce_of(&voter),
    }))
}

async fn get_batch_settings(
    State(service): State<SharedService>,
) -> Result<Json<BatchSettingsView>, RpcError> {
    let svc = lock(&service)?;
    let settings = svc.batch_settings();
    Ok(Json(BatchSettingsView {
        min_batch_size: settings.min_batch_size,
        max_batch_size: settings.max_batch_size,
    }))
}

async fn set_batch_settings(
    State(service): State<SharedService>,
    Json(req): Json<BatchSettingsRequest>,
) -> Result<Json<BatchSettingsView>, RpcError> {
    let caller = parse_address(&req.caller)?;
    let mut svc = lock(&service)?;
    svc.set_batch_settings(&caller, req.min_batch_size, req.max_batch_size)?;
    let settings = svc.batch_settings();
    Ok(Json(BatchSettingsView {
        min_batch_size: settings.min_batch_size,
        max_batch_size: settings.max_batch_size,
    }))
}
