//! Sealed-bid tender module with encrypted bid aggregation.
//!
//! This module implements the coordinator logic for sealed public tenders:
//!
//! - Project creation with a bidding deadline
//! - Encrypted bid submission with running homomorphic aggregates
//! - Lifecycle control (manual termination, deadline expiry)
//! - Asynchronous decryption rounds against a signing oracle
//! - Winner resolution: lowest bid wins, first bidder breaks ties
//!
//! # Architecture
//!
//! - `call`: Message types for state-changing operations
//! - `handlers`: Business logic for processing calls
//! - `queries`: Read-only state access
//! - `state`: Keyed state store
//! - `ledger`: Append-only, freezable bid ledger
//! - `lifecycle`: Guarded state-machine transitions
//! - `accumulator`: Encrypted sum/min/max maintenance
//! - `resolve`: Plaintext winner resolution
//! - `genesis`: Initial configuration
//! - `error`: Error types
//!
//! Nothing decrypted is ever observable before resolution: statistics read
//! zero and the winner query fails until the oracle's authenticated delivery
//! publishes everything at once.
//!
//! # Example
//!
//! ```ignore
//! use tender_module::{handlers, state::TenderState};
//!
//! let mut state = TenderState::new(oracle_keys);
//! let ctx = handlers::CallContext { ... };
//!
//! // Create a project
//! let project_id = handlers::handle_create_project(&mut state, &mut fhe, &ctx, ...)?;
//!
//! // Place a bid
//! handlers::handle_place_bid(&mut state, &mut fhe, &ctx, project_id, ...)?;
//! ```

pub mod accumulator;
pub mod call;
pub mod error;
pub mod genesis;
pub mod handlers;
pub mod ledger;
pub mod lifecycle;
pub mod queries;
pub mod resolve;
pub mod state;

pub use call::TenderCall;
pub use error::TenderError;
pub use genesis::{OracleKeyConfig, TenderGenesisConfig};
pub use handlers::{CallContext, DecryptionOutcome, HandlerResult};
pub use ledger::BidLedger;
pub use queries::{TenderQuery, TenderQueryResponse};
pub use state::TenderState;
