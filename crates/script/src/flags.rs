//! Script verification flags.

pub type ScriptFlags = u32;

pub const SCRIPT_VERIFY_NONE: ScriptFlags = 0;
pub const SCRIPT_VERIFY_P2SH: ScriptFlags = 1 << 0;
pub const SCRIPT_VERIFY_STRICTENC: ScriptFlags = 1 << 1;
pub const SCRIPT_VERIFY_LOW_S: ScriptFlags = 1 << 3;
pub const SCRIPT_VERIFY_NULLDUMMY: ScriptFlags = 1 << 4;
pub const SCRIPT_VERIFY_MINIMALDATA: ScriptFlags = 1 << 6;
pub const SCRIPT_VERIFY_CLEANSTACK: ScriptFlags = 1 << 8;
pub const SCRIPT_VERIFY_CHECKLOCKTIMEVERIFY: ScriptFlags = 1 << 9;
pub const SCRIPT_VERIFY_CHECKSEQUENCEVERIFY: ScriptFlags = 1 << 10;
pub const SCRIPT_VERIFY_WITNESS: ScriptFlags = 1 << 11;

pub const MANDATORY_SCRIPT_VERIFY_FLAGS: ScriptFlags = SCRIPT_VERIFY_P2SH;
pub const STANDARD_SCRIPT_VERIFY_FLAGS: ScriptFlags = MANDATORY_SCRIPT_VERIFY_FLAGS
    | SCRIPT_VERIFY_STRICTENC
    | SCRIPT_VERIFY_MINIMALDATA
    | SCRIPT_VERIFY_NULLDUMMY
    | SCRIPT_VERIFY_CLEANSTACK
    | SCRIPT_VERIFY_CHECKLOCKTIMEVERIFY
    | SCRIPT_VERIFY_LOW_S;
