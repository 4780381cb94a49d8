//! Receipt envelopes for types 0 through 3.
//!
//! The consensus receipt is `[postState, cumulativeGasUsed, logsBloom,
//! logs]`, type-prefixed like transactions. Post-Byzantium the first field
//! is the one-byte status (success `0x01`, failure as the empty string);
//! pre-Byzantium it is the 32-byte intermediate state root.

use crate::rlp::{self, Item};
use crate::types::{Address, Hash32, Quantity, RawLog, RawReceipt, ReceiptOutcome};

use super::{envelope_type, quantity_item, EncodeError};

const BLOOM_LEN: usize = 256;

/// A validated receipt ready for canonical encoding.
#[derive(Clone, Debug)]
pub struct ReceiptEnvelope {
    pub tx_type: u8,
    pub outcome: ReceiptOutcome,
    pub cumulative_gas_used: Quantity,
    pub logs_bloom: Vec<u8>,
    pub logs: Vec<LogEntry>,
}

/// A validated log entry.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<Hash32>,
    pub data: Vec<u8>,
}

impl ReceiptEnvelope {
    /// Validate a raw provider receipt into its typed envelope.
    pub fn from_raw(raw: &RawReceipt) -> Result<Self, EncodeError> {
        let tx_type = match envelope_type(&raw.tx_type)? {
            t @ 0..=3 => t as u8,
            got => return Err(EncodeError::UnsupportedReceiptType { got }),
        };
        let cumulative_gas_used = raw.cumulative_gas_used.clone().ok_or(
            EncodeError::MissingField {
                tx_type,
                field: "cumulativeGasUsed",
            },
        )?;
        let logs_bloom = raw
            .logs_bloom
            .as_ref()
            .ok_or(EncodeError::MissingField {
                tx_type,
                field: "logsBloom",
            })?
            .0
            .clone();
        if logs_bloom.len() != BLOOM_LEN {
            return Err(EncodeError::InvalidBloomLength {
                got: logs_bloom.len(),
            });
        }
        let logs = raw
            .logs
            .iter()
            .map(|log| LogEntry::from_raw(log, tx_type))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tx_type,
            outcome: raw.outcome(),
            cumulative_gas_used,
            logs_bloom,
            logs,
        })
    }

    /// The exact bytes this receipt occupies in the receipt trie.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let outcome = match &self.outcome {
            ReceiptOutcome::Status(true) => Item::Bytes(vec![0x01]),
            ReceiptOutcome::Status(false) => Item::Bytes(Vec::new()),
            ReceiptOutcome::StateRoot(root) => Item::Bytes(root.0.to_vec()),
        };
        let fields = vec![
            outcome,
            quantity_item(&self.cumulative_gas_used),
            Item::Bytes(self.logs_bloom.clone()),
            Item::List(self.logs.iter().map(LogEntry::item).collect()),
        ];
        let payload = rlp::encode(&Item::List(fields));
        if self.tx_type == 0 {
            payload
        } else {
            let mut out = vec![self.tx_type];
            out.extend(payload);
            out
        }
    }
}

impl LogEntry {
    fn from_raw(raw: &RawLog, tx_type: u8) -> Result<Self, EncodeError> {
        Ok(Self {
            address: raw.address.ok_or(EncodeError::MissingField {
                tx_type,
                field: "logs.address",
            })?,
            topics: raw.topics.clone(),
            data: raw.data.clone().unwrap_or_default().0,
        })
    }

    /// `[address, [topic, ...], data]`
    fn item(&self) -> Item {
        Item::List(vec![
            Item::Bytes(self.address.0.to_vec()),
            Item::List(
                self.topics
                    .iter()
                    .map(|topic| Item::Bytes(topic.0.to_vec()))
                    .collect(),
            ),
            Item::Bytes(self.data.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rlp::decode;

    fn parse(json: &str) -> RawReceipt {
        serde_json::from_str(json).unwrap()
    }

    fn zero_bloom_json() -> String {
        format!("\"0x{}\"", "00".repeat(256))
    }

    #[test]
    fn test_legacy_success_receipt_bytes() {
        let raw = parse(&format!(
            r#"{{"status": "0x1", "cumulativeGasUsed": "0x5208", "logsBloom": {}, "logs": []}}"#,
            zero_bloom_json()
        ));
        let bytes = ReceiptEnvelope::from_raw(&raw).unwrap().canonical_bytes();

        // [0x01, 0x5208, bloom, []] by hand: payload is 1 + 3 + (3 + 256)
        // + 1 = 264 bytes, so the list header is f9 0108.
        let mut expected = vec![0xF9, 0x01, 0x08, 0x01, 0x82, 0x52, 0x08, 0xB9, 0x01, 0x00];
        expected.extend([0u8; 256]);
        expected.push(0xC0);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_typed_receipt_gets_prefix() {
        let raw = parse(&format!(
            r#"{{"type": "0x2", "status": "0x1", "cumulativeGasUsed": "0x5208", "logsBloom": {}, "logs": []}}"#,
            zero_bloom_json()
        ));
        let bytes = ReceiptEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        assert_eq!(bytes[0], 0x02);
        let (item, consumed) = decode(&bytes[1..]).unwrap();
        assert_eq!(consumed, bytes.len() - 1);
        assert_eq!(item.as_list().unwrap().len(), 4);
    }

    #[test]
    fn test_failed_status_is_empty_string() {
        let raw = parse(&format!(
            r#"{{"status": "0x0", "cumulativeGasUsed": "0x5208", "logsBloom": {}, "logs": []}}"#,
            zero_bloom_json()
        ));
        let bytes = ReceiptEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        let (item, _) = decode(&bytes).unwrap();
        assert_eq!(item.as_list().unwrap()[0], Item::Bytes(Vec::new()));
    }

    #[test]
    fn test_status_dialects_encode_identically() {
        let variants = [
            format!(
                r#"{{"status": "0x1", "cumulativeGasUsed": "0x1", "logsBloom": {}}}"#,
                zero_bloom_json()
            ),
            format!(
                r#"{{"status": true, "cumulativeGasUsed": "0x1", "logsBloom": {}}}"#,
                zero_bloom_json()
            ),
            format!(
                r#"{{"status": 1, "cumulativeGasUsed": "0x1", "logsBloom": {}}}"#,
                zero_bloom_json()
            ),
        ];
        let encodings: Vec<Vec<u8>> = variants
            .iter()
            .map(|json| ReceiptEnvelope::from_raw(&parse(json)).unwrap().canonical_bytes())
            .collect();
        assert_eq!(encodings[0], encodings[1]);
        assert_eq!(encodings[1], encodings[2]);
    }

    #[test]
    fn test_pre_byzantium_root_replaces_status() {
        let raw = parse(&format!(
            r#"{{"root": "0x{}", "cumulativeGasUsed": "0x5208", "logsBloom": {}, "logs": []}}"#,
            "ab".repeat(32),
            zero_bloom_json()
        ));
        let bytes = ReceiptEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        let (item, _) = decode(&bytes).unwrap();
        let first = item.as_list().unwrap()[0].as_bytes().unwrap().to_vec();
        assert_eq!(first, vec![0xAB; 32]);
    }

    #[test]
    fn test_log_is_three_element_list() {
        let raw = parse(&format!(
            r#"{{
                "type": "0x2",
                "status": "0x1",
                "cumulativeGasUsed": "0x5208",
                "logsBloom": {},
                "logs": [
                    {{
                        "address": "0x0000000000000000000000000000000000001234",
                        "topics": [
                            "0x0000000000000000000000000000000000000000000000000000000000000001",
                            "0x0000000000000000000000000000000000000000000000000000000000000002"
                        ],
                        "data": "0xcafe"
                    }}
                ]
            }}"#,
            zero_bloom_json()
        ));
        let bytes = ReceiptEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        let (item, _) = decode(&bytes[1..]).unwrap();
        let logs = item.as_list().unwrap()[3].as_list().unwrap().to_vec();
        assert_eq!(logs.len(), 1);
        let entry = logs[0].as_list().unwrap();
        assert_eq!(entry.len(), 3);
        assert_eq!(entry[0].as_bytes().unwrap().len(), 20);
        assert_eq!(entry[1].as_list().unwrap().len(), 2);
        assert_eq!(entry[2], Item::Bytes(vec![0xCA, 0xFE]));
    }

    #[test]
    fn test_unknown_receipt_type_is_rejected() {
        let raw = parse(&format!(
            r#"{{"type": "0x9", "status": "0x1", "cumulativeGasUsed": "0x1", "logsBloom": {}}}"#,
            zero_bloom_json()
        ));
        assert_eq!(
            ReceiptEnvelope::from_raw(&raw).unwrap_err(),
            EncodeError::UnsupportedReceiptType { got: 9 }
        );
    }

    #[test]
    fn test_short_bloom_is_rejected() {
        let raw = parse(
            r#"{"status": "0x1", "cumulativeGasUsed": "0x1", "logsBloom": "0x0000"}"#,
        );
        assert_eq!(
            ReceiptEnvelope::from_raw(&raw).unwrap_err(),
            EncodeError::InvalidBloomLength { got: 2 }
        );
    }
}
