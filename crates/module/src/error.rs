//! Tender module error types.
//!
//! Three families, per the system's error design: validation errors (bad
//! input, no state change), state errors (legal input at the wrong time, no
//! state change), and protocol errors (an oracle delivery that cannot be
//! accepted — fatal for that delivery, surfaced to the operator, never
//! silently retried).

use thiserror::Error;

use tender_fhe::FheError;
use tender_oracle::OracleError;
use tender_types::{LifecycleState, RequestId};

/// Errors that can occur in the tender module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenderError {
    // === Validation ===
    #[error("Project title must not be empty")]
    EmptyTitle,

    #[error("Deadline {deadline} is not in the future (now: {now})")]
    InvalidDeadline { deadline: u64, now: u64 },

    // === State ===
    #[error("Project not found: {0}")]
    ProjectNotFound(u64),

    #[error("Invalid state. Expected: {expected:?}, Got: {got:?}")]
    InvalidState {
        expected: LifecycleState,
        got: LifecycleState,
    },

    #[error("Deadline has passed; no further bids accepted")]
    DeadlinePassed,

    #[error("Only the project creator may terminate")]
    NotCreator,

    #[error("Project is still open: terminate it or wait for the deadline")]
    StillOpen,

    #[error("Decryption already requested")]
    DecryptionAlreadyRequested,

    #[error("Project already resolved")]
    AlreadyResolved,

    #[error("Results not ready: project is not resolved")]
    NotReady,

    #[error("Bid ledger is frozen")]
    LedgerFrozen,

    // === Protocol / authentication ===
    #[error("Unknown or already-consumed decryption request: {0}")]
    UnknownRequest(RequestId),

    #[error("Delivery proof rejected: {0}")]
    InvalidDeliveryProof(#[from] tender_crypto::CryptoError),

    #[error("Plaintext batch length {got} does not match snapshot length {expected}")]
    BatchLengthMismatch { expected: u64, got: u64 },

    #[error("Ciphertext rejected: {0}")]
    RejectedInput(#[from] FheError),

    #[error("Oracle request failed: {0}")]
    Oracle(#[from] OracleError),
}
