//! Wallet session capabilities
//!
//! The orchestrator talks to a connected wallet only through the traits in
//! this crate. Transports implement [`WalletSession`]; [`MockWallet`] is an
//! in-memory implementation for tests.

pub mod error;
pub mod mock;
pub mod state;
pub mod traits;
pub mod verifier;

pub use error::SessionError;
pub use mock::{MockBehavior, MockReceiptWatcher, MockWallet, WalletCall};
pub use state::SessionState;
pub use traits::{ReceiptWatcher, SignatureVerifier, WalletSession};
pub use verifier::EcdsaVerifier;
