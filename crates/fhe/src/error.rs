//! Error types for homomorphic backend operations.

use tender_types::Ciphertext;
use thiserror::Error;

/// Errors that can occur in a homomorphic backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FheError {
    #[error("Unknown ciphertext handle: {0}")]
    UnknownHandle(Ciphertext),

    #[error("Condition handle is not an encrypted boolean")]
    NotBoolean,

    #[error("Input proof does not match ciphertext and submitter")]
    InvalidInputProof,
}
