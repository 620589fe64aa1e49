//! Table-backed mock homomorphic backend.
//!
//! Ciphertext handles are opaque 32-byte digests; the plaintext behind each
//! handle lives in a shared table that plays the role of the coprocessor's
//! key material. The core only ever sees handles, and the mock oracle holds
//! a [`CipherStoreHandle`] onto the same table to produce decryptions.

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tender_types::{Address, Ciphertext, InputProof};

use crate::error::FheError;
use crate::HomomorphicOps;

const HANDLE_DOMAIN: &[u8] = b"TENDER_CT_V1:";
const INPUT_PROOF_DOMAIN: &[u8] = b"TENDER_INPUT_V1:";

/// Plaintext table shared between the mock backend and the mock oracle.
#[derive(Debug, Default)]
struct CipherStore {
    /// handle -> plaintext
    values: HashMap<Ciphertext, u64>,
    /// handle -> projects granted continued use
    grants: HashMap<Ciphertext, HashSet<u64>>,
    /// Counter folded into each fresh handle so repeated operations on the same
    /// operands still yield distinct handles.
    counter: u64,
}

/// Cloneable view onto the mock backend's plaintext table.
///
/// Held by the mock oracle; this is the decryption capability the core never
/// has.
#[derive(Clone, Debug)]
pub struct CipherStoreHandle {
    inner: Arc<Mutex<CipherStore>>,
}

impl CipherStoreHandle {
    /// Decrypt a handle. Only the oracle side calls this.
    pub fn reveal(&self, handle: &Ciphertext) -> Result<u64, FheError> {
        self.inner
            .lock()
            .values
            .get(handle)
            .copied()
            .ok_or(FheError::UnknownHandle(*handle))
    }
}

/// Mock homomorphic backend.
#[derive(Debug)]
pub struct MockFhe {
    store: Arc<Mutex<CipherStore>>,
}

impl Default for MockFhe {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFhe {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(CipherStore::default())),
        }
    }

    /// Obtain the decryption capability for the oracle side.
    pub fn store_handle(&self) -> CipherStoreHandle {
        CipherStoreHandle {
            inner: Arc::clone(&self.store),
        }
    }

    /// Client-side encryption of a bid value.
    ///
    /// Returns the handle together with a proof binding it to the submitter.
    pub fn encrypt_input(&mut self, value: u64, submitter: &Address) -> (Ciphertext, InputProof) {
        let handle = self.insert(value, b"input");
        (handle, input_proof(&handle, submitter))
    }

    /// Whether a project has been granted continued use of a handle.
    pub fn is_allowed(&self, handle: &Ciphertext, project_id: u64) -> bool {
        self.store
            .lock()
            .grants
            .get(handle)
            .is_some_and(|projects| projects.contains(&project_id))
    }

    fn insert(&mut self, value: u64, tag: &[u8]) -> Ciphertext {
        let mut store = self.store.lock();
        let counter = store.counter;
        store.counter += 1;

        let mut hasher = Sha256::new();
        hasher.update(HANDLE_DOMAIN);
        hasher.update(tag);
        hasher.update(counter.to_le_bytes());
        hasher.update(value.to_le_bytes());
        let handle = Ciphertext(hasher.finalize().into());

        store.values.insert(handle, value);
        handle
    }

    fn value_of(&self, handle: &Ciphertext) -> Result<u64, FheError> {
        self.store
            .lock()
            .values
            .get(handle)
            .copied()
            .ok_or(FheError::UnknownHandle(*handle))
    }
}

impl HomomorphicOps for MockFhe {
    fn trivial_encrypt(&mut self, value: u64) -> Ciphertext {
        self.insert(value, b"trivial")
    }

    fn add(&mut self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError> {
        let lhs = self.value_of(a)?;
        let rhs = self.value_of(b)?;
        Ok(self.insert(lhs.wrapping_add(rhs), b"add"))
    }

    fn lt(&mut self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError> {
        let lhs = self.value_of(a)?;
        let rhs = self.value_of(b)?;
        Ok(self.insert(u64::from(lhs < rhs), b"lt"))
    }

    fn gt(&mut self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext, FheError> {
        let lhs = self.value_of(a)?;
        let rhs = self.value_of(b)?;
        Ok(self.insert(u64::from(lhs > rhs), b"gt"))
    }

    fn select(
        &mut self,
        cond: &Ciphertext,
        if_true: &Ciphertext,
        if_false: &Ciphertext,
    ) -> Result<Ciphertext, FheError> {
        let cond_value = self.value_of(cond)?;
        let true_value = self.value_of(if_true)?;
        let false_value = self.value_of(if_false)?;

        let selected = match cond_value {
            0 => false_value,
            1 => true_value,
            _ => return Err(FheError::NotBoolean),
        };
        Ok(self.insert(selected, b"select"))
    }

    fn allow(&mut self, handle: &Ciphertext, project_id: u64) -> Result<(), FheError> {
        let mut store = self.store.lock();
        if !store.values.contains_key(handle) {
            return Err(FheError::UnknownHandle(*handle));
        }
        store.grants.entry(*handle).or_default().insert(project_id);
        Ok(())
    }

    fn verify_input(
        &self,
        handle: &Ciphertext,
        proof: &InputProof,
        submitter: &Address,
    ) -> Result<(), FheError> {
        if !self.store.lock().values.contains_key(handle) {
            return Err(FheError::UnknownHandle(*handle));
        }
        if input_proof(handle, submitter) != *proof {
            return Err(FheError::InvalidInputProof);
        }
        Ok(())
    }
}

fn input_proof(handle: &Ciphertext, submitter: &Address) -> InputProof {
    let mut hasher = Sha256::new();
    hasher.update(INPUT_PROOF_DOMAIN);
    hasher.update(handle.0);
    hasher.update(submitter);
    InputProof(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_homomorphic() {
        let mut fhe = MockFhe::new();
        let a = fhe.trivial_encrypt(3);
        let b = fhe.trivial_encrypt(4);
        let sum = fhe.add(&a, &b).unwrap();

        assert_eq!(fhe.store_handle().reveal(&sum).unwrap(), 7);
        // Inputs are untouched.
        assert_eq!(fhe.store_handle().reveal(&a).unwrap(), 3);
    }

    #[test]
    fn test_lt_gt_produce_booleans() {
        let mut fhe = MockFhe::new();
        let a = fhe.trivial_encrypt(2);
        let b = fhe.trivial_encrypt(5);

        let lt = fhe.lt(&a, &b).unwrap();
        let gt = fhe.gt(&a, &b).unwrap();

        let store = fhe.store_handle();
        assert_eq!(store.reveal(&lt).unwrap(), 1);
        assert_eq!(store.reveal(&gt).unwrap(), 0);
    }

    #[test]
    fn test_select_branches() {
        let mut fhe = MockFhe::new();
        let a = fhe.trivial_encrypt(10);
        let b = fhe.trivial_encrypt(20);

        let cond = fhe.lt(&a, &b).unwrap();
        let picked = fhe.select(&cond, &a, &b).unwrap();
        assert_eq!(fhe.store_handle().reveal(&picked).unwrap(), 10);

        let cond = fhe.gt(&a, &b).unwrap();
        let picked = fhe.select(&cond, &a, &b).unwrap();
        assert_eq!(fhe.store_handle().reveal(&picked).unwrap(), 20);
    }

    #[test]
    fn test_select_rejects_non_boolean_condition() {
        let mut fhe = MockFhe::new();
        let a = fhe.trivial_encrypt(10);
        let b = fhe.trivial_encrypt(20);
        let not_bool = fhe.trivial_encrypt(7);

        assert_eq!(
            fhe.select(&not_bool, &a, &b),
            Err(FheError::NotBoolean)
        );
    }

    #[test]
    fn test_fresh_handles_are_distinct() {
        let mut fhe = MockFhe::new();
        let a = fhe.trivial_encrypt(1);
        let b = fhe.trivial_encrypt(1);
        assert_ne!(a, b);

        let s1 = fhe.add(&a, &b).unwrap();
        let s2 = fhe.add(&a, &b).unwrap();
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_unknown_handle_rejected() {
        let mut fhe = MockFhe::new();
        let known = fhe.trivial_encrypt(1);
        let bogus = Ciphertext([0xffu8; 32]);

        assert!(matches!(
            fhe.add(&known, &bogus),
            Err(FheError::UnknownHandle(_))
        ));
    }

    #[test]
    fn test_allow_and_is_allowed() {
        let mut fhe = MockFhe::new();
        let handle = fhe.trivial_encrypt(5);

        assert!(!fhe.is_allowed(&handle, 1));
        fhe.allow(&handle, 1).unwrap();
        assert!(fhe.is_allowed(&handle, 1));
        assert!(!fhe.is_allowed(&handle, 2));
    }

    #[test]
    fn test_input_proof_binds_submitter() {
        let mut fhe = MockFhe::new();
        let alice = [1u8; 32];
        let mallory = [9u8; 32];

        let (handle, proof) = fhe.encrypt_input(42, &alice);
        assert!(fhe.verify_input(&handle, &proof, &alice).is_ok());

        // Replaying Alice's ciphertext as Mallory fails.
        assert_eq!(
            fhe.verify_input(&handle, &proof, &mallory),
            Err(FheError::InvalidInputProof)
        );
    }
}
