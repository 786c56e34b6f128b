//! Script surface consumed by consensus validation: verification flags, the
//! verifier capability trait, sigop counting, and standard templates.

pub mod flags;
pub mod sigops;
pub mod standard;
pub mod verifier;

pub use flags::ScriptFlags;
pub use verifier::{PrecomputedTransactionData, ScriptVerifier, TransactionChecker};
