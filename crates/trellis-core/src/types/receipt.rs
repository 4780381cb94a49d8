//! Raw receipt objects as returned by `eth_getBlockReceipts` or per-hash
//! receipt queries, before any validation.

use serde::{Deserialize, Serialize};

use super::primitives::{Address, Hash32, HexBytes, Quantity};

/// The post-state field of a receipt.
///
/// Byzantium and later blocks carry a one-byte status flag. Pre-Byzantium
/// receipts carry the 32-byte intermediate state root instead. The two are
/// mutually exclusive on the wire and encode differently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Status(bool),
    StateRoot(Hash32),
}

/// A receipt status flag that tolerates the provider dialects in the wild:
/// `"0x1"`, `true`, and bare `1` all mean success.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct StatusFlag(pub bool);

impl<'de> Deserialize<'de> for StatusFlag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl serde::de::Visitor<'_> for StatusVisitor {
            type Value = StatusFlag;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a receipt status as hex string, boolean, or integer")
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<StatusFlag, E> {
                Ok(StatusFlag(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<StatusFlag, E> {
                Ok(StatusFlag(v != 0))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<StatusFlag, E> {
                let q = Quantity::from_hex(v).map_err(E::custom)?;
                Ok(StatusFlag(!q.is_zero()))
            }
        }

        deserializer.deserialize_any(StatusVisitor)
    }
}

/// A receipt as the provider reports it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawReceipt {
    /// Envelope type. Absent or "0x0" means a legacy receipt.
    #[serde(rename = "type")]
    pub tx_type: Option<Quantity>,

    /// Post-Byzantium status flag.
    pub status: Option<StatusFlag>,

    /// Pre-Byzantium intermediate state root.
    pub root: Option<Hash32>,

    pub cumulative_gas_used: Option<Quantity>,

    /// 256-byte logs bloom filter.
    pub logs_bloom: Option<HexBytes>,

    pub logs: Vec<RawLog>,

    /// Hash of the transaction this receipt belongs to, used for
    /// cross-checks against the block's transaction list.
    pub transaction_hash: Option<Hash32>,

    pub transaction_index: Option<Quantity>,

    pub block_hash: Option<Hash32>,
}

impl RawReceipt {
    /// Resolve the post-state field. A status flag wins when both are
    /// present; a receipt with neither is treated as failed rather than
    /// rejected, matching how providers surface malformed historic data.
    pub fn outcome(&self) -> ReceiptOutcome {
        match (&self.status, &self.root) {
            (Some(flag), _) => ReceiptOutcome::Status(flag.0),
            (None, Some(root)) => ReceiptOutcome::StateRoot(*root),
            (None, None) => ReceiptOutcome::Status(false),
        }
    }
}

/// One log entry inside a receipt.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLog {
    pub address: Option<Address>,

    pub topics: Vec<Hash32>,

    pub data: Option<HexBytes>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_status_flag_dialects() {
        let from_hex: StatusFlag = serde_json::from_str("\"0x1\"").unwrap();
        let from_bool: StatusFlag = serde_json::from_str("true").unwrap();
        let from_int: StatusFlag = serde_json::from_str("1").unwrap();
        assert_eq!(from_hex, StatusFlag(true));
        assert_eq!(from_bool, StatusFlag(true));
        assert_eq!(from_int, StatusFlag(true));

        let failed: StatusFlag = serde_json::from_str("\"0x0\"").unwrap();
        assert_eq!(failed, StatusFlag(false));
    }

    #[test]
    fn test_outcome_prefers_status() {
        let receipt: RawReceipt = serde_json::from_str(r#"{"status": "0x1"}"#).unwrap();
        assert_eq!(receipt.outcome(), ReceiptOutcome::Status(true));
    }

    #[test]
    fn test_outcome_falls_back_to_state_root() {
        let receipt: RawReceipt = serde_json::from_str(
            r#"{"root": "0x56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"}"#,
        )
        .unwrap();
        assert_eq!(
            receipt.outcome(),
            ReceiptOutcome::StateRoot(Hash32(hex!(
                "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
            )))
        );
    }

    #[test]
    fn test_parse_receipt_with_logs() {
        let json = r#"{
            "type": "0x2",
            "status": "0x1",
            "cumulativeGasUsed": "0x5208",
            "logs": [
                {
                    "address": "0x0000000000000000000000000000000000001234",
                    "topics": [
                        "0x0000000000000000000000000000000000000000000000000000000000000001"
                    ],
                    "data": "0xcafe"
                }
            ],
            "transactionIndex": "0x0"
        }"#;
        let receipt: RawReceipt = serde_json::from_str(json).unwrap();
        assert_eq!(receipt.tx_type.unwrap().to_u64(), Some(2));
        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(receipt.logs[0].topics.len(), 1);
        assert_eq!(receipt.logs[0].data.as_ref().unwrap().as_slice(), &[0xCA, 0xFE]);
    }
}
