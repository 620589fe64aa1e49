//! Core type definitions for the sealed-bid tender system.
//!
//! This crate provides the shared data structures used across the tender
//! system: opaque ciphertext handles, lifecycle states, project and bid
//! records, and the identifiers that tie an asynchronous decryption round
//! back to the project it belongs to.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::fmt;

// =========================
// CRYPTOGRAPHIC PRIMITIVES
// =========================

/// Compressed G1 point on BLS12-381 (48 bytes)
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct G1Point(#[serde_as(as = "[_; 48]")] pub [u8; 48]);

impl Default for G1Point {
    fn default() -> Self {
        Self([0u8; 48])
    }
}

/// Compressed G2 point on BLS12-381 (96 bytes)
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct G2Point(#[serde_as(as = "[_; 96]")] pub [u8; 96]);

impl Default for G2Point {
    fn default() -> Self {
        Self([0u8; 96])
    }
}

// =========================
// ENCRYPTED DOMAIN
// =========================

/// Opaque handle to an encrypted bid value.
///
/// Handles are issued by the homomorphic backend. The core operates on them
/// exclusively through the backend's `add`/`lt`/`gt`/`select` circuits and
/// never learns the plaintext behind a handle.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Ciphertext(pub [u8; 32]);

impl Default for Ciphertext {
    fn default() -> Self {
        Self([0u8; 32])
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// Proof that a submitted ciphertext is a well-formed encryption of a value
/// in the bid domain. Produced client-side, opaque to the core, checked by
/// the homomorphic backend.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct InputProof(pub [u8; 32]);

/// Maximum representable bid value; the `min` accumulator starts here.
pub const MAX_BID_VALUE: u64 = u64::MAX;

// =========================
// DECRYPTION ROUND
// =========================

/// Opaque identifier assigned by the decryption oracle to a batch request.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct RequestId(pub [u8; 32]);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Authentication proof attached to an oracle delivery.
///
/// The signature covers the exact `(request_id, plaintexts)` pair, so a
/// proof cannot be replayed against a different request or payload.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct DeliveryProof {
    /// Index of the signing key within the configured oracle key set.
    pub signer_index: u32,
    /// BLS signature over the delivery digest.
    pub signature: G1Point,
}

// =========================
// TENDER TYPES
// =========================

/// Generic address type (32 bytes)
pub type Address = [u8; 32];

/// Project lifecycle state.
///
/// Transitions are monotonic: `Open -> Terminated -> DecryptionPending ->
/// Resolved`, with `Open -> DecryptionPending` allowed once the deadline has
/// passed. `Resolved` is terminal.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Accepting bids until the deadline.
    Open,
    /// Closed by the creator; awaiting a decryption request.
    Terminated,
    /// One decryption request outstanding; ledger frozen.
    DecryptionPending,
    /// Results published; no further transitions.
    Resolved,
}

/// A tender project.
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub description: String,

    /// Absolute time after which new bids are rejected regardless of
    /// termination.
    pub deadline: u64,

    pub state: LifecycleState,

    // Running encrypted accumulators, updated on every accepted bid.
    // Meaningless once plaintext results exist.
    pub encrypted_sum: Ciphertext,
    pub encrypted_min: Ciphertext,
    pub encrypted_max: Ciphertext,

    /// Count of accepted bids; equals the ledger length.
    pub num_bids: u64,
}

/// A submitted encrypted bid, stored in strict submission order.
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: Address,
    pub ciphertext: Ciphertext,
    pub timestamp: u64,
}

/// Plaintext outcome of a resolved tender. Written exactly once.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize, Serialize, Deserialize)]
pub struct TenderResult {
    pub project_id: u64,
    pub min: u64,
    pub max: u64,
    /// Integer-truncated `sum / count`.
    pub average: u64,
    /// First bidder (by submission order) whose bid decrypted to `min`;
    /// `None` when the tender resolved with zero bids.
    pub winner: Option<Address>,
    pub num_bids: u64,
    pub resolved_at: u64,
}

/// Aggregate statistics exposed to clients.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderStats {
    pub count: u64,
    pub average: u64,
    pub max: u64,
    pub min: u64,
}

impl TenderStats {
    /// Zero-stats tuple returned before resolution (and for zero-bid
    /// resolutions).
    pub fn zero() -> Self {
        Self::default()
    }
}
