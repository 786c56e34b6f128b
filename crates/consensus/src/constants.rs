//! Consensus-wide constants shared across validation.

/// Interpret the sequence field of version-2 transactions as a relative
/// lock-time (BIP68).
pub const LOCKTIME_VERIFY_SEQUENCE: u32 = 1 << 0;
/// Use the median of the past blocks instead of the block time for
/// relative lock-time end points.
pub const LOCKTIME_MEDIAN_TIME_PAST: u32 = 1 << 1;

/// Standard locktime verify flags used by non-consensus code.
pub const STANDARD_LOCKTIME_VERIFY_FLAGS: u32 =
    LOCKTIME_VERIFY_SEQUENCE | LOCKTIME_MEDIAN_TIME_PAST;

/// Number of halvings after which the shift-based subsidy is forced to zero.
pub const SUBSIDY_HALVING_SHIFT_LIMIT: i32 = 64;
