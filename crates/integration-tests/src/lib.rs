//! End-to-end integration tests for the sealed-bid tender system.
//!
//! These tests exercise the full tender lifecycle:
//! 1. Oracle key setup via genesis
//! 2. Project creation
//! 3. Encrypted bid submission with running aggregates
//! 4. Termination / deadline expiry
//! 5. Asynchronous decryption round and resolution

#![cfg(test)]

use rand::rngs::OsRng;

use tender_crypto::{generate_signing_key, sign_delivery};
use tender_fhe::MockFhe;
use tender_module::{
    genesis::{OracleKeyConfig, TenderGenesisConfig},
    handlers::{self, CallContext, DecryptionOutcome},
    queries::{self, TenderQuery, TenderQueryResponse},
    TenderError, TenderState,
};
use tender_oracle::MockOracle;
use tender_types::{Address, DeliveryProof, LifecycleState, RequestId, TenderStats};

const CREATOR: Address = [1u8; 32];
const BIDDER_A: Address = [2u8; 32];
const BIDDER_B: Address = [3u8; 32];
const BIDDER_C: Address = [4u8; 32];
const DEADLINE: u64 = 1000;

struct World {
    state: TenderState,
    fhe: MockFhe,
    oracle: MockOracle,
    oracle_secret: bls12_381::Scalar,
}

fn setup() -> World {
    let fhe = MockFhe::new();
    let (secret, public) = generate_signing_key(&mut OsRng);

    let genesis = TenderGenesisConfig {
        oracle_keys: vec![OracleKeyConfig {
            index: 0,
            public_key: public,
        }],
    };
    let state = genesis.init_state().expect("genesis config is valid");
    let oracle = MockOracle::new(fhe.store_handle(), secret, 0);

    World {
        state,
        fhe,
        oracle,
        oracle_secret: secret,
    }
}

fn ctx(sender: Address, timestamp: u64) -> CallContext {
    CallContext {
        sender,
        block_height: timestamp / 10,
        timestamp,
    }
}

fn create_project(w: &mut World, at: u64) -> u64 {
    handlers::handle_create_project(
        &mut w.state,
        &mut w.fhe,
        &ctx(CREATOR, at),
        "municipal bridge repair".into(),
        "sealed-bid tender, lowest offer wins".into(),
        DEADLINE,
    )
    .expect("project creation succeeds")
}

fn place_bid(w: &mut World, project_id: u64, bidder: Address, value: u64, at: u64) {
    let (ciphertext, proof) = w.fhe.encrypt_input(value, &bidder);
    handlers::handle_place_bid(
        &mut w.state,
        &mut w.fhe,
        &ctx(bidder, at),
        project_id,
        ciphertext,
        proof,
    )
    .expect("bid is accepted");
}

fn request_decryption(w: &mut World, project_id: u64, at: u64) -> RequestId {
    let outcome = handlers::handle_request_decryption(
        &mut w.state,
        &mut w.oracle,
        &ctx([9u8; 32], at),
        project_id,
    )
    .expect("decryption request succeeds");
    match outcome {
        DecryptionOutcome::Requested(request_id) => request_id,
        other => panic!("expected a decryption request, got {other:?}"),
    }
}

fn deliver(w: &mut World, request_id: &RequestId, at: u64) -> tender_types::TenderResult {
    let delivery = w
        .oracle
        .produce_delivery(request_id)
        .expect("oracle can decrypt the batch");
    handlers::handle_decryption_delivered(
        &mut w.state,
        &ctx([9u8; 32], at),
        delivery.request_id,
        &delivery.plaintexts,
        &delivery.proof,
    )
    .expect("authenticated delivery resolves the tender")
}

/// Test the complete tender flow from creation to resolution.
#[test]
fn test_full_tender_flow() {
    let mut w = setup();

    // ========================================
    // Phase 1: Create project and place bids
    // ========================================

    let project_id = create_project(&mut w, 0);
    place_bid(&mut w, project_id, BIDDER_A, 5, 10);
    place_bid(&mut w, project_id, BIDDER_B, 2, 11);
    place_bid(&mut w, project_id, BIDDER_C, 2, 12);

    let project = w.state.get_project(project_id).unwrap();
    assert_eq!(project.num_bids, 3);
    assert_eq!(project.state, LifecycleState::Open);

    // ========================================
    // Phase 2: Everything is still sealed
    // ========================================

    assert_eq!(queries::get_stats(&w.state, project_id), TenderStats::zero());
    assert_eq!(
        queries::get_winner(&w.state, project_id),
        Err(TenderError::NotReady)
    );

    // ========================================
    // Phase 3: Terminate and run the decryption round
    // ========================================

    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 20), project_id)
        .expect("creator terminates");
    let request_id = request_decryption(&mut w, project_id, 21);

    // Still sealed while the request is outstanding.
    assert_eq!(
        w.state.get_project(project_id).unwrap().state,
        LifecycleState::DecryptionPending
    );
    assert_eq!(queries::get_stats(&w.state, project_id), TenderStats::zero());

    // ========================================
    // Phase 4: Delivery resolves everything at once
    // ========================================

    let result = deliver(&mut w, &request_id, 30);

    // Bids (A,5), (B,2), (C,2): B bid the minimum first.
    assert_eq!(result.winner, Some(BIDDER_B));
    assert_eq!(result.min, 2);
    assert_eq!(result.max, 5);
    assert_eq!(result.average, 3);
    assert_eq!(result.num_bids, 3);

    let stats = queries::get_stats(&w.state, project_id);
    assert_eq!(stats.count, 3);
    assert_eq!((stats.min, stats.max, stats.average), (2, 5, 3));
    assert_eq!(
        queries::get_winner(&w.state, project_id),
        Ok((Some(BIDDER_B), 2))
    );
    assert_eq!(
        w.state.get_project(project_id).unwrap().state,
        LifecycleState::Resolved
    );
}

/// Decryption can start without termination once the deadline has passed.
#[test]
fn test_deadline_expiry_opens_decryption() {
    let mut w = setup();
    let project_id = create_project(&mut w, 0);
    place_bid(&mut w, project_id, BIDDER_A, 40, 10);

    // Too early: bidding is still open.
    let early = handlers::handle_request_decryption(
        &mut w.state,
        &mut w.oracle,
        &ctx([9u8; 32], 500),
        project_id,
    );
    assert_eq!(early, Err(TenderError::StillOpen));

    // Late bids bounce, decryption proceeds.
    let (ciphertext, proof) = w.fhe.encrypt_input(7, &BIDDER_B);
    let late_bid = handlers::handle_place_bid(
        &mut w.state,
        &mut w.fhe,
        &ctx(BIDDER_B, DEADLINE),
        project_id,
        ciphertext,
        proof,
    );
    assert_eq!(late_bid, Err(TenderError::DeadlinePassed));

    let request_id = request_decryption(&mut w, project_id, DEADLINE);
    let result = deliver(&mut w, &request_id, DEADLINE + 5);
    assert_eq!(result.winner, Some(BIDDER_A));
    assert_eq!(result.num_bids, 1);
}

/// A tender with no bids resolves immediately, with no oracle round.
#[test]
fn test_zero_bid_tender_resolves_directly() {
    let mut w = setup();
    let project_id = create_project(&mut w, 0);
    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 20), project_id).unwrap();

    let outcome = handlers::handle_request_decryption(
        &mut w.state,
        &mut w.oracle,
        &ctx([9u8; 32], 21),
        project_id,
    )
    .unwrap();
    assert_eq!(outcome, DecryptionOutcome::ResolvedWithoutBids);

    assert_eq!(
        w.state.get_project(project_id).unwrap().state,
        LifecycleState::Resolved
    );
    assert_eq!(queries::get_winner(&w.state, project_id), Ok((None, 0)));
    let stats = queries::get_stats(&w.state, project_id);
    assert_eq!(stats, TenderStats::zero());
    assert!(w.oracle.pending_requests().is_empty());
}

/// A forged delivery bounces off signature verification without consuming
/// the request; the genuine oracle still resolves the tender afterwards.
#[test]
fn test_forged_delivery_then_genuine() {
    let mut w = setup();
    let project_id = create_project(&mut w, 0);
    place_bid(&mut w, project_id, BIDDER_A, 5, 10);
    place_bid(&mut w, project_id, BIDDER_B, 2, 11);
    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 20), project_id).unwrap();
    let request_id = request_decryption(&mut w, project_id, 21);

    let (rogue_secret, _) = generate_signing_key(&mut OsRng);
    let forged_plaintexts = vec![1u64, 9];
    let forged = DeliveryProof {
        signer_index: 0,
        signature: sign_delivery(&rogue_secret, &request_id, &forged_plaintexts),
    };
    let rejected = handlers::handle_decryption_delivered(
        &mut w.state,
        &ctx([9u8; 32], 25),
        request_id,
        &forged_plaintexts,
        &forged,
    );
    assert!(matches!(
        rejected,
        Err(TenderError::InvalidDeliveryProof(_))
    ));
    assert!(w.state.has_pending_request(project_id));

    let result = deliver(&mut w, &request_id, 30);
    assert_eq!(result.winner, Some(BIDDER_B));
}

/// An authenticated delivery of the wrong batch length consumes the request
/// and leaves the project unresolvable.
#[test]
fn test_truncated_delivery_is_fatal() {
    let mut w = setup();
    let project_id = create_project(&mut w, 0);
    place_bid(&mut w, project_id, BIDDER_A, 5, 10);
    place_bid(&mut w, project_id, BIDDER_B, 2, 11);
    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 20), project_id).unwrap();
    let request_id = request_decryption(&mut w, project_id, 21);

    let truncated = vec![5u64];
    let proof = DeliveryProof {
        signer_index: 0,
        signature: sign_delivery(&w.oracle_secret, &request_id, &truncated),
    };
    let result = handlers::handle_decryption_delivered(
        &mut w.state,
        &ctx([9u8; 32], 25),
        request_id,
        &truncated,
        &proof,
    );
    assert_eq!(
        result,
        Err(TenderError::BatchLengthMismatch {
            expected: 2,
            got: 1
        })
    );

    // Request consumed, project stuck, nothing revealed.
    assert!(!w.state.has_pending_request(project_id));
    assert_eq!(
        w.state.get_project(project_id).unwrap().state,
        LifecycleState::DecryptionPending
    );
    assert_eq!(queries::get_stats(&w.state, project_id), TenderStats::zero());
}

/// Concurrent tenders do not interfere: each has its own ledger, pending
/// request and result.
#[test]
fn test_independent_projects() {
    let mut w = setup();
    let first = create_project(&mut w, 0);
    let second = create_project(&mut w, 0);
    assert_ne!(first, second);

    place_bid(&mut w, first, BIDDER_A, 10, 5);
    place_bid(&mut w, second, BIDDER_A, 30, 6);
    place_bid(&mut w, second, BIDDER_B, 20, 7);

    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 20), first).unwrap();
    let request_first = request_decryption(&mut w, first, 21);
    let result_first = deliver(&mut w, &request_first, 25);
    assert_eq!(result_first.winner, Some(BIDDER_A));
    assert_eq!(result_first.min, 10);

    // The second project is untouched: still open, still sealed.
    let project = w.state.get_project(second).unwrap();
    assert_eq!(project.state, LifecycleState::Open);
    assert_eq!(project.num_bids, 2);
    assert_eq!(queries::get_stats(&w.state, second), TenderStats::zero());

    place_bid(&mut w, second, BIDDER_C, 15, 30);
    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 40), second).unwrap();
    let request_second = request_decryption(&mut w, second, 41);
    let result_second = deliver(&mut w, &request_second, 45);
    assert_eq!(result_second.winner, Some(BIDDER_C));
    assert_eq!((result_second.min, result_second.max), (15, 30));
}

/// Query interface round-trip over a resolved tender.
#[test]
fn test_query_interface() {
    let mut w = setup();
    let project_id = create_project(&mut w, 0);
    place_bid(&mut w, project_id, BIDDER_A, 8, 10);
    place_bid(&mut w, project_id, BIDDER_B, 3, 11);

    match queries::handle_query(&w.state, TenderQuery::GetBids { project_id }) {
        TenderQueryResponse::Bids(bids) => {
            assert_eq!(bids.len(), 2);
            assert_eq!(bids[0].bidder, BIDDER_A);
            assert_eq!(bids[1].bidder, BIDDER_B);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    handlers::handle_terminate(&mut w.state, &ctx(CREATOR, 20), project_id).unwrap();
    let request_id = request_decryption(&mut w, project_id, 21);
    deliver(&mut w, &request_id, 25);

    match queries::handle_query(&w.state, TenderQuery::GetResult { project_id }) {
        TenderQueryResponse::Result(Some(result)) => {
            assert_eq!(result.winner, Some(BIDDER_B));
            assert_eq!(result.min, 3);
            assert_eq!(result.max, 8);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    match queries::handle_query(
        &w.state,
        TenderQuery::ListProjects {
            offset: 0,
            limit: 10,
        },
    ) {
        TenderQueryResponse::ProjectList(projects) => {
            assert_eq!(projects.len(), 1);
            assert_eq!(projects[0].state, LifecycleState::Resolved);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}
