//! Chain primitives: hashes, wire encoding, transactions, and blocks.

pub mod block;
pub mod encoding;
pub mod hash;
pub mod outpoint;
pub mod transaction;
