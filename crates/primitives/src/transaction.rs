//! Transaction types and serialization.

use cruxd_consensus::{Amount, Hash256};

use crate::encoding::{Decodable, DecodeError, Decoder, Encodable, Encoder};
use crate::hash::sha256d;
use crate::outpoint::OutPoint;

/// Sequence value that disables all lock-time semantics for an input.
pub const SEQUENCE_FINAL: u32 = u32::MAX;

/// Transactions below this version never carry BIP68 semantics.
pub const MIN_SEQUENCE_LOCK_TX_VERSION: i32 = 2;

const WITNESS_MARKER: u8 = 0x00;
const WITNESS_FLAG: u8 = 0x01;

#[derive(Clone, Debug, PartialEq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    /// Segwit witness stack; empty for non-witness spends.
    pub witness: Vec<Vec<u8>>,
}

impl Encodable for TxIn {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        self.prevout.consensus_encode(encoder);
        encoder.write_var_bytes(&self.script_sig);
        encoder.write_u32_le(self.sequence);
    }
}

impl Decodable for TxIn {
    fn consensus_decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let prevout = OutPoint::consensus_decode(decoder)?;
        let script_sig = decoder.read_var_bytes()?;
        let sequence = decoder.read_u32_le()?;
        Ok(Self {
            prevout,
            script_sig,
            sequence,
            witness: Vec::new(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    /// The empty marker output that opens every coinstake transaction.
    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.script_pubkey.is_empty()
    }
}

impl Encodable for TxOut {
    fn consensus_encode(&self, encoder: &mut Encoder) {
        encoder.write_i64_le(self.value);
        encoder.write_var_bytes(&self.script_pubkey);
    }
}

impl Decodable for TxOut {
    fn consensus_decode(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let value = decoder.read_i64_le()?;
        let script_pubkey = decoder.read_var_bytes()?;
        Ok(Self {
            value,
            script_pubkey,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub version: i32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].prevout.is_null()
    }

    /// A coinstake spends real outputs and opens with an empty marker output.
    pub fn is_coinstake(&self) -> bool {
        !self.vin.is_empty()
            && !self.vin[0].prevout.is_null()
            && self.vout.len() >= 2
            && self.vout[0].is_empty()
    }

    pub fn has_witness(&self) -> bool {
        self.vin.iter().any(|input| !input.witness.is_empty())
    }

    pub fn total_out(&self) -> Amount {
        self.vout.iter().map(|output| output.value).sum()
    }

    pub fn txid(&self) -> Hash256 {
        sha256d(&self.encode_with_mode(false))
    }

    /// Witness hash; equals the txid for transactions without witness data.
    pub fn wtxid(&self) -> Hash256 {
        if !self.has_witness() {
            return self.txid();
        }
        sha256d(&self.encode_with_mode(true))
    }

    pub fn consensus_encode(&self) -> Vec<u8> {
        self.encode_with_mode(self.has_witness())
    }

    fn encode_with_mode(&self, include_witness: bool) -> Vec<u8> {
        let mut encoder = Encoder::new();
        encoder.write_i32_le(self.version);
        if include_witness {
            encoder.write_u8(WITNESS_MARKER);
            encoder.write_u8(WITNESS_FLAG);
        }
        encoder.write_varint(self.vin.len() as u64);
        for input in &self.vin {
            input.consensus_encode(&mut encoder);
        }
        encoder.write_varint(self.vout.len() as u64);
        for output in &self.vout {
            output.consensus_encode(&mut encoder);
        }
        if include_witness {
            for input in &self.vin {
                encoder.write_varint(input.witness.len() as u64);
                for item in &input.witness {
                    encoder.write_var_bytes(item);
                }
            }
        }
        encoder.write_u32_le(self.lock_time);
        encoder.into_inner()
    }

    pub fn consensus_decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut decoder = Decoder::new(bytes);
        let tx = Self::decode_from(&mut decoder)?;
        if !decoder.is_empty() {
            return Err(DecodeError::TrailingBytes);
        }
        Ok(tx)
    }

    pub fn decode_from(decoder: &mut Decoder) -> Result<Self, DecodeError> {
        let version = decoder.read_i32_le()?;
        let has_witness =
            decoder.peek_u8(0) == Some(WITNESS_MARKER) && decoder.peek_u8(1) == Some(WITNESS_FLAG);
        if has_witness {
            decoder.read_u8()?;
            decoder.read_u8()?;
        }
        let vin_count = decoder.read_varint()?;
        let vin_count = usize::try_from(vin_count).map_err(|_| DecodeError::SizeTooLarge)?;
        let mut vin = Vec::with_capacity(vin_count);
        for _ in 0..vin_count {
            vin.push(TxIn::consensus_decode(decoder)?);
        }
        let vout_count = decoder.read_varint()?;
        let vout_count = usize::try_from(vout_count).map_err(|_| DecodeError::SizeTooLarge)?;
        let mut vout = Vec::with_capacity(vout_count);
        for _ in 0..vout_count {
            vout.push(TxOut::consensus_decode(decoder)?);
        }
        if has_witness {
            for input in vin.iter_mut() {
                let item_count = decoder.read_varint()?;
                let item_count =
                    usize::try_from(item_count).map_err(|_| DecodeError::SizeTooLarge)?;
                let mut witness = Vec::with_capacity(item_count);
                for _ in 0..item_count {
                    witness.push(decoder.read_var_bytes()?);
                }
                input.witness = witness;
            }
        }
        let lock_time = decoder.read_u32_le()?;
        Ok(Self {
            version,
            vin,
            vout,
            lock_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coinbase() -> Transaction {
        Transaction {
            version: 1,
            vin: vec![TxIn {
                prevout: OutPoint::null(),
                script_sig: vec![0x51],
                sequence: SEQUENCE_FINAL,
                witness: Vec::new(),
            }],
            vout: vec![TxOut {
                value: 50,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        }
    }

    #[test]
    fn coinbase_detection() {
        let tx = coinbase();
        assert!(tx.is_coinbase());
        assert!(!tx.is_coinstake());
    }

    #[test]
    fn coinstake_detection() {
        let tx = Transaction {
            version: 1,
            vin: vec![TxIn {
                prevout: OutPoint {
                    hash: [0x11; 32],
                    index: 0,
                },
                script_sig: Vec::new(),
                sequence: SEQUENCE_FINAL,
                witness: Vec::new(),
            }],
            vout: vec![
                TxOut {
                    value: 0,
                    script_pubkey: Vec::new(),
                },
                TxOut {
                    value: 100,
                    script_pubkey: vec![0x51],
                },
            ],
            lock_time: 0,
        };
        assert!(tx.is_coinstake());
        assert!(!tx.is_coinbase());
    }

    #[test]
    fn txid_ignores_witness_data() {
        let mut tx = coinbase();
        tx.vin[0].prevout = OutPoint {
            hash: [0x22; 32],
            index: 1,
        };
        let txid_before = tx.txid();
        tx.vin[0].witness = vec![vec![0xaa; 72], vec![0xbb; 33]];
        assert_eq!(tx.txid(), txid_before);
        assert_ne!(tx.wtxid(), tx.txid());
    }

    #[test]
    fn encode_decode_roundtrip_with_witness() {
        let mut tx = coinbase();
        tx.vin[0].prevout = OutPoint {
            hash: [0x33; 32],
            index: 2,
        };
        tx.vin[0].witness = vec![vec![0x01, 0x02], Vec::new(), vec![0x03]];
        let bytes = tx.consensus_encode();
        let decoded = Transaction::consensus_decode(&bytes).expect("decode");
        assert_eq!(decoded, tx);
    }

    #[test]
    fn encode_decode_roundtrip_legacy() {
        let tx = coinbase();
        let bytes = tx.consensus_encode();
        let decoded = Transaction::consensus_decode(&bytes).expect("decode");
        assert_eq!(decoded, tx);
    }
}
