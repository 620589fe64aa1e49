//! Call handlers for the tender module.
//!
//! These functions implement the business logic for each call type. Every
//! handler takes the state store by `&mut`, so its guard checks and writes
//! form one atomic step: a bid either fully lands before a termination is
//! observed or is rejected, and two racing decryption requests cannot both
//! pass the pending guard.

use tracing::{info, warn};

use tender_crypto::verify_delivery;
use tender_fhe::HomomorphicOps;
use tender_oracle::DecryptionOracle;
use tender_types::{
    Address, Ciphertext, DeliveryProof, InputProof, LifecycleState, Project, RequestId,
    TenderResult,
};

use crate::error::TenderError;
use crate::ledger::BidLedger;
use crate::state::{PendingRequest, TenderState};
use crate::{accumulator, lifecycle, resolve};

/// Context provided by the runtime for each call.
pub struct CallContext {
    /// Sender of the transaction
    pub sender: Address,
    /// Current block height
    pub block_height: u64,
    /// Current timestamp
    pub timestamp: u64,
}

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, TenderError>;

/// What a decryption request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptionOutcome {
    /// A request was submitted to the oracle; the project now waits in
    /// DecryptionPending for the matching delivery.
    Requested(RequestId),
    /// The frozen ledger was empty: zero results were published at once,
    /// with no external decryption round.
    ResolvedWithoutBids,
}

/// Handle CreateProject call.
pub fn handle_create_project(
    state: &mut TenderState,
    fhe: &mut dyn HomomorphicOps,
    ctx: &CallContext,
    title: String,
    description: String,
    deadline: u64,
) -> HandlerResult<u64> {
    if title.trim().is_empty() {
        return Err(TenderError::EmptyTitle);
    }
    if deadline <= ctx.timestamp {
        return Err(TenderError::InvalidDeadline {
            deadline,
            now: ctx.timestamp,
        });
    }

    let project_id = state.allocate_project_id();
    let (encrypted_sum, encrypted_min, encrypted_max) = accumulator::init(fhe, project_id)?;

    let project = Project {
        id: project_id,
        creator: ctx.sender,
        title,
        description,
        deadline,
        state: LifecycleState::Open,
        encrypted_sum,
        encrypted_min,
        encrypted_max,
        num_bids: 0,
    };

    state.projects.insert(project_id, project);
    state.ledgers.insert(project_id, BidLedger::new());

    info!(project_id, deadline, "Created tender project");
    Ok(project_id)
}

/// Handle PlaceBid call. Returns the bid's position in the ledger.
pub fn handle_place_bid(
    state: &mut TenderState,
    fhe: &mut dyn HomomorphicOps,
    ctx: &CallContext,
    project_id: u64,
    ciphertext: Ciphertext,
    proof: InputProof,
) -> HandlerResult<u64> {
    let project = state
        .get_project_mut(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;

    // Open-and-before-deadline is checked in the same atomic step as the
    // accumulator update; a bid racing a termination is either fully applied
    // or fully rejected.
    lifecycle::ensure_open_for_bidding(project, ctx.timestamp)?;

    fhe.verify_input(&ciphertext, &proof, &ctx.sender)?;

    accumulator::accumulate(fhe, project, &ciphertext)?;
    project.num_bids += 1;

    let ledger = state
        .ledgers
        .get_mut(&project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    let position = ledger.append(ctx.sender, ciphertext, ctx.timestamp)?;

    Ok(position)
}

/// Handle Terminate call (creator-only).
pub fn handle_terminate(
    state: &mut TenderState,
    ctx: &CallContext,
    project_id: u64,
) -> HandlerResult<()> {
    let project = state
        .get_project_mut(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    lifecycle::terminate(project, &ctx.sender)?;

    info!(project_id, "Tender terminated by creator");
    Ok(())
}

/// Handle RequestDecryption call (anyone, once terminated or past deadline).
///
/// Freezes the ledger, takes its snapshot and submits one decryption request
/// for the whole batch. An empty ledger short-circuits: the project passes
/// through DecryptionPending and lands on Resolved within this single call,
/// with zero stats and no winner.
pub fn handle_request_decryption(
    state: &mut TenderState,
    oracle: &mut dyn DecryptionOracle,
    ctx: &CallContext,
    project_id: u64,
) -> HandlerResult<DecryptionOutcome> {
    let project = state
        .get_project(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    lifecycle::ensure_decryptable(project, ctx.timestamp)?;

    let ledger = state
        .get_ledger(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;

    if ledger.is_empty() {
        let ledger = state
            .ledgers
            .get_mut(&project_id)
            .ok_or(TenderError::ProjectNotFound(project_id))?;
        ledger.freeze();

        let project = state
            .get_project_mut(project_id)
            .ok_or(TenderError::ProjectNotFound(project_id))?;
        lifecycle::begin_decryption(project, ctx.timestamp)?;
        lifecycle::finish_resolution(project)?;

        state.results.insert(
            project_id,
            TenderResult {
                project_id,
                min: 0,
                max: 0,
                average: 0,
                winner: None,
                num_bids: 0,
                resolved_at: ctx.timestamp,
            },
        );

        info!(project_id, "Resolved without bids; no decryption round needed");
        return Ok(DecryptionOutcome::ResolvedWithoutBids);
    }

    let snapshot = ledger.snapshot();
    let request_id = oracle.submit_decryption_request(project_id, &snapshot)?;

    // The guard re-check and the flip happen together; a concurrent request
    // that raced us past ensure_decryptable would fail here.
    let project = state
        .get_project_mut(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    lifecycle::begin_decryption(project, ctx.timestamp)?;

    let ledger = state
        .ledgers
        .get_mut(&project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    ledger.freeze();
    let snapshot_len = ledger.len();

    state.pending_requests.insert(
        request_id,
        PendingRequest {
            project_id,
            snapshot_len,
        },
    );

    info!(
        project_id,
        request_id = %request_id,
        batch_len = snapshot_len,
        "Submitted decryption request"
    );
    Ok(DecryptionOutcome::Requested(request_id))
}

/// Handle DeliverDecryption call: the oracle's asynchronous response.
///
/// Order matters here. The proof is authenticated first, so a forged
/// delivery does not consume the pending request and the genuine delivery
/// can still land. The pending entry is then removed before any state
/// mutation, so a duplicate of an already-consumed request id is rejected
/// outright. A batch-length mismatch after that point is an authenticated
/// but inconsistent oracle response: fatal for the delivery, and the
/// project stays in DecryptionPending.
pub fn handle_decryption_delivered(
    state: &mut TenderState,
    ctx: &CallContext,
    request_id: RequestId,
    plaintexts: &[u64],
    proof: &DeliveryProof,
) -> HandlerResult<TenderResult> {
    verify_delivery(proof, &state.oracle_keys, &request_id, plaintexts).map_err(|err| {
        warn!(
            request_id = %request_id,
            error = %err,
            "Rejected unauthenticated decryption delivery"
        );
        TenderError::from(err)
    })?;

    let pending = state
        .pending_requests
        .remove(&request_id)
        .ok_or_else(|| {
            warn!(
                request_id = %request_id,
                "Delivery for unknown or already-consumed request"
            );
            TenderError::UnknownRequest(request_id)
        })?;
    let project_id = pending.project_id;

    if plaintexts.len() as u64 != pending.snapshot_len {
        warn!(
            project_id,
            request_id = %request_id,
            expected = pending.snapshot_len,
            got = plaintexts.len(),
            "Oracle delivered a batch of the wrong length"
        );
        return Err(TenderError::BatchLengthMismatch {
            expected: pending.snapshot_len,
            got: plaintexts.len() as u64,
        });
    }

    let ledger = state
        .get_ledger(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    let bidders = ledger.bidders();
    let outcome = resolve::resolve_outcome(&bidders, plaintexts).ok_or(
        TenderError::BatchLengthMismatch {
            expected: pending.snapshot_len,
            got: plaintexts.len() as u64,
        },
    )?;

    let project = state
        .get_project_mut(project_id)
        .ok_or(TenderError::ProjectNotFound(project_id))?;
    lifecycle::finish_resolution(project)?;

    let result = TenderResult {
        project_id,
        min: outcome.min,
        max: outcome.max,
        average: outcome.average,
        winner: Some(outcome.winner),
        num_bids: plaintexts.len() as u64,
        resolved_at: ctx.timestamp,
    };
    state.results.insert(project_id, result.clone());

    info!(
        project_id,
        request_id = %request_id,
        min = result.min,
        max = result.max,
        average = result.average,
        "Tender resolved"
    );
    Ok(result)
}
