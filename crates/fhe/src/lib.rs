//! Homomorphic backend seam for the sealed-bid tender system.
//!
//! The tender core maintains encrypted running accumulators (sum, min, max)
//! without ever seeing a plaintext bid. Comparison results are themselves
//! encrypted, so the core cannot branch on them; instead it composes
//! `add`/`lt`/`gt`/`select` circuits through the [`HomomorphicOps`] trait and
//! leaves the concrete cryptographic backend swappable.
//!
//! Two backends matter in practice:
//!
//! - a production FHE coprocessor, which evaluates the circuits over real
//!   ciphertexts and whose decryption is performed by an external oracle;
//! - [`MockFhe`], a table-backed stand-in that issues opaque handles and
//!   evaluates the same circuits against an internal plaintext table. The
//!   mock oracle shares that table to produce deliveries, which lets the
//!   whole protocol run end-to-end in tests.

pub mod error;
pub mod mock;

pub use error::FheError;
pub use mock::{CipherStoreHandle, MockFhe};

use tender_types::{Address, Ciphertext, InputProof};

/// Homomorphic operations over opaque ciphertext handles.
///
/// Every operation returns a fresh handle; the inputs are not consumed. The
/// comparison circuits return encrypted booleans (an encryption of 0 or 1)
/// that are only meaningful as the condition argument of [`select`].
///
/// [`select`]: HomomorphicOps::select
pub trait HomomorphicOps {
    /// Encrypt a public constant. Used to initialize accumulators; the
    /// resulting handle carries no secret.
    fn trivial_encrypt(&mut self, value: u64) -> Ciphertext;

    /// Homomorphic addition in the fixed-width bid domain (wrapping).
    fn add(&mut self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError>;

    /// Encrypted `a < b`.
    fn lt(&mut self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError>;

    /// Encrypted `a > b`.
    fn gt(&mut self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError>;

    /// Oblivious selection: decrypts to `if_true`'s value when `cond` is an
    /// encryption of 1, `if_false`'s value when it is an encryption of 0.
    /// Which branch was taken is not observable from the handles.
    fn select(
        &mut self,
        cond: &Ciphertext,
        if_true: &Ciphertext,
        if_false: &Ciphertext,
    ) -> Result<Ciphertext, FheError>;

    /// Grant a project continued permission to use a handle.
    ///
    /// Each homomorphic output is a fresh ciphertext, so the authorization
    /// attached to its inputs does not carry over and must be re-granted.
    fn allow(&mut self, handle: &Ciphertext, project_id: u64) -> Result<(), FheError>;

    /// Check a submitted ciphertext's well-formedness proof. The proof binds
    /// the handle to the submitter, so a bidder cannot replay another
    /// bidder's ciphertext as their own.
    fn verify_input(
        &self,
        handle: &Ciphertext,
        proof: &InputProof,
        submitter: &Address,
    ) -> Result<(), FheError>;
}
