//! Keyed state store for the tender module.
//!
//! All mutable per-project data lives behind this one structure; handlers
//! take it by `&mut`, which makes every read-then-write transition a single
//! critical section over the store. Nothing here is ambient or global.

use std::collections::HashMap;

use tender_types::{G2Point, Project, RequestId, TenderResult};

use crate::ledger::BidLedger;

/// A decryption request awaiting its delivery.
///
/// The entry is removed when a delivery consumes it (or fails fatally after
/// authentication), so a request id can never be replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub project_id: u64,
    /// Ledger length at the moment the request was issued; the delivered
    /// batch must match it exactly.
    pub snapshot_len: u64,
}

/// Tender module state.
#[derive(Debug, Default)]
pub struct TenderState {
    /// Next project ID to assign
    next_project_id: u64,

    /// All projects by ID
    pub projects: HashMap<u64, Project>,

    /// Bid ledger per project
    pub ledgers: HashMap<u64, BidLedger>,

    /// Outstanding decryption requests: request id -> pending entry.
    /// At most one per project at any time.
    pub pending_requests: HashMap<RequestId, PendingRequest>,

    /// Write-once plaintext results per project
    pub results: HashMap<u64, TenderResult>,

    /// Oracle public keys deliveries are verified against, indexed by
    /// signer index
    pub oracle_keys: Vec<G2Point>,
}

impl TenderState {
    /// Create a new tender state with the given oracle key set.
    pub fn new(oracle_keys: Vec<G2Point>) -> Self {
        Self {
            next_project_id: 1,
            oracle_keys,
            ..Default::default()
        }
    }

    /// Get the next project ID and increment.
    pub fn allocate_project_id(&mut self) -> u64 {
        let id = self.next_project_id;
        self.next_project_id += 1;
        id
    }

    pub fn get_project(&self, project_id: u64) -> Option<&Project> {
        self.projects.get(&project_id)
    }

    pub fn get_project_mut(&mut self, project_id: u64) -> Option<&mut Project> {
        self.projects.get_mut(&project_id)
    }

    pub fn get_ledger(&self, project_id: u64) -> Option<&BidLedger> {
        self.ledgers.get(&project_id)
    }

    pub fn get_result(&self, project_id: u64) -> Option<&TenderResult> {
        self.results.get(&project_id)
    }

    /// Whether a project has an outstanding decryption request.
    pub fn has_pending_request(&self, project_id: u64) -> bool {
        self.pending_requests
            .values()
            .any(|pending| pending.project_id == project_id)
    }
}
