//! Authentication primitives for decryption-oracle deliveries.
//!
//! The tender core accepts a decrypted bid batch only when it carries a
//! proof binding the exact `(request_id, plaintexts)` pair to a key in the
//! configured oracle key set. This crate implements that proof as a BLS
//! signature on BLS12-381:
//!
//! - signing key: scalar `sk`, public key `pk = sk * G2`
//! - signature: `sigma = sk * H1(digest)` where `digest` commits to the
//!   request id and every plaintext in order
//! - verification: `e(sigma, G2) == e(H1(digest), pk)`
//!
//! A forged or replayed delivery fails the pairing check; the core treats
//! that as fatal for the delivery rather than retrying.

pub mod error;
pub mod signature;

pub use error::CryptoError;
pub use signature::{
    delivery_digest, generate_signing_key, sign_delivery, verify_delivery,
};
