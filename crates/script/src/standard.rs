//! Standard script templates and contract markers.

use crate::sigops::{
    sigops_count, OP_0, OP_1, OP_16, OP_EQUAL, OP_HASH160, OP_PUSHDATA1, OP_PUSHDATA2,
    OP_PUSHDATA4,
};

/// First opcode of a contract-creating output script.
pub const OP_CREATECONTRACT: u8 = 0xc0;
/// First opcode of a contract-calling output script.
pub const OP_CALLCONTRACT: u8 = 0xc1;
/// First opcode of the scriptSig spending a contract-owned output.
pub const OP_SPEND: u8 = 0xc2;
/// First opcode of an output created by contract-internal value transfer.
pub const OP_INTERNALCONTRACTTRANSFER: u8 = 0xc3;

pub fn is_p2sh(script: &[u8]) -> bool {
    script.len() == 23
        && script[0] == OP_HASH160
        && script[1] == 0x14
        && script[22] == OP_EQUAL
}

/// Extracts the segwit version and program when `script` is a witness
/// program (BIP141 shape).
pub fn witness_program(script: &[u8]) -> Option<(u8, &[u8])> {
    if script.len() < 4 || script.len() > 42 {
        return None;
    }
    let version = match script[0] {
        OP_0 => 0,
        op if (OP_1..=OP_16).contains(&op) => op - OP_1 + 1,
        _ => return None,
    };
    let push_len = script[1] as usize;
    if push_len != script.len() - 2 || !(2..=40).contains(&push_len) {
        return None;
    }
    Some((version, &script[2..]))
}

pub fn is_contract_exec(script: &[u8]) -> bool {
    matches!(script.first(), Some(&OP_CREATECONTRACT) | Some(&OP_CALLCONTRACT))
}

pub fn is_contract_spend(script_sig: &[u8]) -> bool {
    script_sig.first() == Some(&OP_SPEND)
}

pub fn is_contract_internal_transfer(script: &[u8]) -> bool {
    script.first() == Some(&OP_INTERNALCONTRACTTRANSFER)
}

pub fn is_push_only(script: &[u8]) -> bool {
    let mut cursor = 0usize;
    while cursor < script.len() {
        let opcode = script[cursor];
        cursor += 1;
        match opcode {
            0x00 => {}
            0x01..=0x4b => cursor += opcode as usize,
            OP_PUSHDATA1 => {
                if cursor >= script.len() {
                    return false;
                }
                cursor += 1 + script[cursor] as usize;
            }
            OP_PUSHDATA2 => {
                if cursor + 2 > script.len() {
                    return false;
                }
                cursor += 2 + u16::from_le_bytes([script[cursor], script[cursor + 1]]) as usize;
            }
            OP_PUSHDATA4 => {
                if cursor + 4 > script.len() {
                    return false;
                }
                let len = u32::from_le_bytes([
                    script[cursor],
                    script[cursor + 1],
                    script[cursor + 2],
                    script[cursor + 3],
                ]) as usize;
                cursor += 4 + len;
            }
            op if (OP_1..=OP_16).contains(&op) || op == 0x4f => {}
            _ => return false,
        }
        if cursor > script.len() {
            return false;
        }
    }
    true
}

/// Returns the payload of the last data push in a push-only script.
pub fn last_push(script: &[u8]) -> Option<&[u8]> {
    let mut cursor = 0usize;
    let mut last: Option<&[u8]> = None;
    while cursor < script.len() {
        let opcode = script[cursor];
        cursor += 1;
        let len = match opcode {
            0x00 => 0,
            0x01..=0x4b => opcode as usize,
            OP_PUSHDATA1 => {
                let len = *script.get(cursor)? as usize;
                cursor += 1;
                len
            }
            OP_PUSHDATA2 => {
                let bytes = script.get(cursor..cursor + 2)?;
                cursor += 2;
                u16::from_le_bytes([bytes[0], bytes[1]]) as usize
            }
            OP_PUSHDATA4 => {
                let bytes = script.get(cursor..cursor + 4)?;
                cursor += 4;
                u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
            }
            _ => return None,
        };
        let payload = script.get(cursor..cursor + len)?;
        cursor += len;
        last = Some(payload);
    }
    last
}

/// P2SH sigop cost of spending `script_pubkey` with `script_sig`, counted
/// accurately over the redeem script.
pub fn p2sh_sigops(script_pubkey: &[u8], script_sig: &[u8]) -> u32 {
    if !is_p2sh(script_pubkey) || !is_push_only(script_sig) {
        return 0;
    }
    match last_push(script_sig) {
        Some(redeem_script) => sigops_count(redeem_script, true),
        None => 0,
    }
}

/// Witness sigop cost for one input: a v0 keyhash program costs one sigop,
/// a v0 scripthash program is counted accurately over the witness script.
pub fn witness_sigops(script_pubkey: &[u8], witness: &[Vec<u8>]) -> u32 {
    let Some((version, program)) = witness_program(script_pubkey) else {
        return 0;
    };
    if version != 0 {
        return 0;
    }
    if program.len() == 20 {
        return 1;
    }
    if program.len() == 32 {
        if let Some(witness_script) = witness.last() {
            return sigops_count(witness_script, true);
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigops::{OP_CHECKMULTISIG, OP_CHECKSIG};

    fn p2sh_script() -> Vec<u8> {
        let mut script = Vec::with_capacity(23);
        script.push(OP_HASH160);
        script.push(0x14);
        script.extend_from_slice(&[0x11; 20]);
        script.push(OP_EQUAL);
        script
    }

    #[test]
    fn p2sh_template_detection() {
        assert!(is_p2sh(&p2sh_script()));
        assert!(!is_p2sh(&[OP_CHECKSIG]));
    }

    #[test]
    fn witness_program_v0_shapes() {
        let mut keyhash = vec![OP_0, 0x14];
        keyhash.extend_from_slice(&[0x22; 20]);
        assert_eq!(witness_program(&keyhash), Some((0, &keyhash[2..])));

        let mut scripthash = vec![OP_0, 0x20];
        scripthash.extend_from_slice(&[0x33; 32]);
        assert_eq!(witness_program(&scripthash), Some((0, &scripthash[2..])));

        assert_eq!(witness_program(&[OP_CHECKSIG]), None);
    }

    #[test]
    fn p2sh_sigops_counts_redeem_script() {
        // scriptSig pushing a 2-of-N redeem script.
        let redeem = vec![OP_1 + 1, OP_CHECKMULTISIG];
        let mut script_sig = vec![redeem.len() as u8];
        script_sig.extend_from_slice(&redeem);
        assert_eq!(p2sh_sigops(&p2sh_script(), &script_sig), 2);

        // Not a P2SH output: nothing counted.
        assert_eq!(p2sh_sigops(&[OP_CHECKSIG], &script_sig), 0);

        // Non-push scriptSig: nothing counted.
        assert_eq!(p2sh_sigops(&p2sh_script(), &[OP_CHECKSIG]), 0);
    }

    #[test]
    fn witness_sigops_keyhash_and_scripthash() {
        let mut keyhash = vec![OP_0, 0x14];
        keyhash.extend_from_slice(&[0x22; 20]);
        assert_eq!(witness_sigops(&keyhash, &[vec![0xaa; 72]]), 1);

        let mut scripthash = vec![OP_0, 0x20];
        scripthash.extend_from_slice(&[0x33; 32]);
        let witness_script = vec![OP_CHECKSIG];
        assert_eq!(
            witness_sigops(&scripthash, &[vec![0xaa; 72], witness_script]),
            1
        );
        assert_eq!(witness_sigops(&scripthash, &[]), 0);
    }

    #[test]
    fn contract_markers() {
        assert!(is_contract_exec(&[OP_CREATECONTRACT, 0x01]));
        assert!(is_contract_exec(&[OP_CALLCONTRACT, 0x01]));
        assert!(!is_contract_exec(&[OP_CHECKSIG]));
        assert!(is_contract_spend(&[OP_SPEND]));
        assert!(is_contract_internal_transfer(&[
            OP_INTERNALCONTRACTTRANSFER
        ]));
    }

    #[test]
    fn last_push_extracts_final_payload() {
        let mut script = vec![0x02, 0xaa, 0xbb];
        script.push(0x01);
        script.push(0xcc);
        assert_eq!(last_push(&script), Some(&[0xcc][..]));
        assert_eq!(last_push(&[OP_CHECKSIG]), None);
    }
}
