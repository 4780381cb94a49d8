//! Transaction envelopes for types 0 through 4.
//!
//! Each variant lists its signing-payload fields in consensus order and
//! re-emits the signed network encoding: bare RLP for legacy, a one-byte
//! type prefix over the RLP payload for everything later (EIP-2718).

use crate::rlp::{self, Item};
use crate::types::{AccessListItem, Address, Authorization, Hash32, HexBytes, Quantity, RawTransaction};

use super::{envelope_type, quantity_item, EncodeError};

/// A validated transaction ready for canonical encoding.
#[derive(Clone, Debug)]
pub enum TxEnvelope {
    Legacy(LegacyTx),
    Eip2930(Eip2930Tx),
    Eip1559(Eip1559Tx),
    Eip4844(Eip4844Tx),
    Eip7702(Eip7702Tx),
}

/// Type 0. Signature `v` carries the EIP-155 chain id when present.
#[derive(Clone, Debug)]
pub struct LegacyTx {
    pub nonce: Quantity,
    pub gas_price: Quantity,
    pub gas: Quantity,
    pub to: Option<Address>,
    pub value: Quantity,
    pub input: HexBytes,
    pub v: Quantity,
    pub r: Quantity,
    pub s: Quantity,
}

/// Type 1 (EIP-2930): legacy pricing plus an access list.
#[derive(Clone, Debug)]
pub struct Eip2930Tx {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub gas_price: Quantity,
    pub gas: Quantity,
    pub to: Option<Address>,
    pub value: Quantity,
    pub input: HexBytes,
    pub access_list: Vec<AccessEntry>,
    pub y_parity: Quantity,
    pub r: Quantity,
    pub s: Quantity,
}

/// Type 2 (EIP-1559): priority fee and fee cap replace the gas price.
#[derive(Clone, Debug)]
pub struct Eip1559Tx {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub max_priority_fee_per_gas: Quantity,
    pub max_fee_per_gas: Quantity,
    pub gas: Quantity,
    pub to: Option<Address>,
    pub value: Quantity,
    pub input: HexBytes,
    pub access_list: Vec<AccessEntry>,
    pub y_parity: Quantity,
    pub r: Quantity,
    pub s: Quantity,
}

/// Type 3 (EIP-4844): blob fee cap and versioned hashes on top of 1559.
#[derive(Clone, Debug)]
pub struct Eip4844Tx {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub max_priority_fee_per_gas: Quantity,
    pub max_fee_per_gas: Quantity,
    pub gas: Quantity,
    pub to: Option<Address>,
    pub value: Quantity,
    pub input: HexBytes,
    pub access_list: Vec<AccessEntry>,
    pub max_fee_per_blob_gas: Quantity,
    pub blob_versioned_hashes: Vec<Hash32>,
    pub y_parity: Quantity,
    pub r: Quantity,
    pub s: Quantity,
}

/// Type 4 (EIP-7702): an authorization list on top of 1559.
#[derive(Clone, Debug)]
pub struct Eip7702Tx {
    pub chain_id: Quantity,
    pub nonce: Quantity,
    pub max_priority_fee_per_gas: Quantity,
    pub max_fee_per_gas: Quantity,
    pub gas: Quantity,
    pub to: Option<Address>,
    pub value: Quantity,
    pub input: HexBytes,
    pub access_list: Vec<AccessEntry>,
    pub authorization_list: Vec<AuthEntry>,
    pub y_parity: Quantity,
    pub r: Quantity,
    pub s: Quantity,
}

/// A validated access list entry: address plus storage keys.
#[derive(Clone, Debug)]
pub struct AccessEntry {
    pub address: Address,
    pub storage_keys: Vec<Hash32>,
}

/// A validated EIP-7702 authorization tuple.
#[derive(Clone, Debug)]
pub struct AuthEntry {
    pub chain_id: Quantity,
    pub address: Address,
    pub nonce: Quantity,
    pub y_parity: Quantity,
    pub r: Quantity,
    pub s: Quantity,
}

impl TxEnvelope {
    /// Validate a raw provider transaction into its typed envelope.
    pub fn from_raw(raw: &RawTransaction) -> Result<Self, EncodeError> {
        match envelope_type(&raw.tx_type)? {
            0 => Ok(Self::Legacy(LegacyTx::from_raw(raw)?)),
            1 => Ok(Self::Eip2930(Eip2930Tx::from_raw(raw)?)),
            2 => Ok(Self::Eip1559(Eip1559Tx::from_raw(raw)?)),
            3 => Ok(Self::Eip4844(Eip4844Tx::from_raw(raw)?)),
            4 => Ok(Self::Eip7702(Eip7702Tx::from_raw(raw)?)),
            got => Err(EncodeError::UnsupportedTxType { got }),
        }
    }

    pub fn tx_type(&self) -> u8 {
        match self {
            Self::Legacy(_) => 0,
            Self::Eip2930(_) => 1,
            Self::Eip1559(_) => 2,
            Self::Eip4844(_) => 3,
            Self::Eip7702(_) => 4,
        }
    }

    /// The exact bytes this transaction occupies in the transaction trie.
    /// Its keccak256 is the transaction hash.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Self::Legacy(tx) => rlp::encode(&Item::List(tx.fields())),
            Self::Eip2930(tx) => prefixed(1, tx.fields()),
            Self::Eip1559(tx) => prefixed(2, tx.fields()),
            Self::Eip4844(tx) => prefixed(3, tx.fields()),
            Self::Eip7702(tx) => prefixed(4, tx.fields()),
        }
    }
}

impl LegacyTx {
    fn from_raw(raw: &RawTransaction) -> Result<Self, EncodeError> {
        Ok(Self {
            nonce: require(&raw.nonce, 0, "nonce")?,
            gas_price: require(&raw.gas_price, 0, "gasPrice")?,
            gas: require(&raw.gas, 0, "gas")?,
            to: raw.to,
            value: require(&raw.value, 0, "value")?,
            input: raw.input.clone().unwrap_or_default(),
            v: require(&raw.v, 0, "v")?,
            r: require(&raw.r, 0, "r")?,
            s: require(&raw.s, 0, "s")?,
        })
    }

    fn fields(&self) -> Vec<Item> {
        vec![
            quantity_item(&self.nonce),
            quantity_item(&self.gas_price),
            quantity_item(&self.gas),
            recipient_item(&self.to),
            quantity_item(&self.value),
            Item::Bytes(self.input.0.clone()),
            quantity_item(&self.v),
            quantity_item(&self.r),
            quantity_item(&self.s),
        ]
    }
}

impl Eip2930Tx {
    fn from_raw(raw: &RawTransaction) -> Result<Self, EncodeError> {
        Ok(Self {
            chain_id: require(&raw.chain_id, 1, "chainId")?,
            nonce: require(&raw.nonce, 1, "nonce")?,
            gas_price: require(&raw.gas_price, 1, "gasPrice")?,
            gas: require(&raw.gas, 1, "gas")?,
            to: raw.to,
            value: require(&raw.value, 1, "value")?,
            input: raw.input.clone().unwrap_or_default(),
            access_list: convert_access_list(&raw.access_list, 1)?,
            y_parity: signature_parity(raw, 1)?,
            r: require(&raw.r, 1, "r")?,
            s: require(&raw.s, 1, "s")?,
        })
    }

    fn fields(&self) -> Vec<Item> {
        vec![
            quantity_item(&self.chain_id),
            quantity_item(&self.nonce),
            quantity_item(&self.gas_price),
            quantity_item(&self.gas),
            recipient_item(&self.to),
            quantity_item(&self.value),
            Item::Bytes(self.input.0.clone()),
            access_list_item(&self.access_list),
            quantity_item(&self.y_parity),
            quantity_item(&self.r),
            quantity_item(&self.s),
        ]
    }
}

impl Eip1559Tx {
    fn from_raw(raw: &RawTransaction) -> Result<Self, EncodeError> {
        Ok(Self {
            chain_id: require(&raw.chain_id, 2, "chainId")?,
            nonce: require(&raw.nonce, 2, "nonce")?,
            max_priority_fee_per_gas: require(&raw.max_priority_fee_per_gas, 2, "maxPriorityFeePerGas")?,
            max_fee_per_gas: require(&raw.max_fee_per_gas, 2, "maxFeePerGas")?,
            gas: require(&raw.gas, 2, "gas")?,
            to: raw.to,
            value: require(&raw.value, 2, "value")?,
            input: raw.input.clone().unwrap_or_default(),
            access_list: convert_access_list(&raw.access_list, 2)?,
            y_parity: signature_parity(raw, 2)?,
            r: require(&raw.r, 2, "r")?,
            s: require(&raw.s, 2, "s")?,
        })
    }

    fn fields(&self) -> Vec<Item> {
        vec![
            quantity_item(&self.chain_id),
            quantity_item(&self.nonce),
            quantity_item(&self.max_priority_fee_per_gas),
            quantity_item(&self.max_fee_per_gas),
            quantity_item(&self.gas),
            recipient_item(&self.to),
            quantity_item(&self.value),
            Item::Bytes(self.input.0.clone()),
            access_list_item(&self.access_list),
            quantity_item(&self.y_parity),
            quantity_item(&self.r),
            quantity_item(&self.s),
        ]
    }
}

impl Eip4844Tx {
    fn from_raw(raw: &RawTransaction) -> Result<Self, EncodeError> {
        Ok(Self {
            chain_id: require(&raw.chain_id, 3, "chainId")?,
            nonce: require(&raw.nonce, 3, "nonce")?,
            max_priority_fee_per_gas: require(&raw.max_priority_fee_per_gas, 3, "maxPriorityFeePerGas")?,
            max_fee_per_gas: require(&raw.max_fee_per_gas, 3, "maxFeePerGas")?,
            gas: require(&raw.gas, 3, "gas")?,
            to: raw.to,
            value: require(&raw.value, 3, "value")?,
            input: raw.input.clone().unwrap_or_default(),
            access_list: convert_access_list(&raw.access_list, 3)?,
            max_fee_per_blob_gas: require(&raw.max_fee_per_blob_gas, 3, "maxFeePerBlobGas")?,
            blob_versioned_hashes: require(&raw.blob_versioned_hashes, 3, "blobVersionedHashes")?,
            y_parity: signature_parity(raw, 3)?,
            r: require(&raw.r, 3, "r")?,
            s: require(&raw.s, 3, "s")?,
        })
    }

    fn fields(&self) -> Vec<Item> {
        vec![
            quantity_item(&self.chain_id),
            quantity_item(&self.nonce),
            quantity_item(&self.max_priority_fee_per_gas),
            quantity_item(&self.max_fee_per_gas),
            quantity_item(&self.gas),
            recipient_item(&self.to),
            quantity_item(&self.value),
            Item::Bytes(self.input.0.clone()),
            access_list_item(&self.access_list),
            quantity_item(&self.max_fee_per_blob_gas),
            Item::List(
                self.blob_versioned_hashes
                    .iter()
                    .map(|h| Item::Bytes(h.0.to_vec()))
                    .collect(),
            ),
            quantity_item(&self.y_parity),
            quantity_item(&self.r),
            quantity_item(&self.s),
        ]
    }
}

impl Eip7702Tx {
    fn from_raw(raw: &RawTransaction) -> Result<Self, EncodeError> {
        Ok(Self {
            chain_id: require(&raw.chain_id, 4, "chainId")?,
            nonce: require(&raw.nonce, 4, "nonce")?,
            max_priority_fee_per_gas: require(&raw.max_priority_fee_per_gas, 4, "maxPriorityFeePerGas")?,
            max_fee_per_gas: require(&raw.max_fee_per_gas, 4, "maxFeePerGas")?,
            gas: require(&raw.gas, 4, "gas")?,
            to: raw.to,
            value: require(&raw.value, 4, "value")?,
            input: raw.input.clone().unwrap_or_default(),
            access_list: convert_access_list(&raw.access_list, 4)?,
            authorization_list: convert_authorizations(&raw.authorization_list)?,
            y_parity: signature_parity(raw, 4)?,
            r: require(&raw.r, 4, "r")?,
            s: require(&raw.s, 4, "s")?,
        })
    }

    fn fields(&self) -> Vec<Item> {
        vec![
            quantity_item(&self.chain_id),
            quantity_item(&self.nonce),
            quantity_item(&self.max_priority_fee_per_gas),
            quantity_item(&self.max_fee_per_gas),
            quantity_item(&self.gas),
            recipient_item(&self.to),
            quantity_item(&self.value),
            Item::Bytes(self.input.0.clone()),
            access_list_item(&self.access_list),
            Item::List(
                self.authorization_list
                    .iter()
                    .map(|auth| {
                        Item::List(vec![
                            quantity_item(&auth.chain_id),
                            Item::Bytes(auth.address.0.to_vec()),
                            quantity_item(&auth.nonce),
                            quantity_item(&auth.y_parity),
                            quantity_item(&auth.r),
                            quantity_item(&auth.s),
                        ])
                    })
                    .collect(),
            ),
            quantity_item(&self.y_parity),
            quantity_item(&self.r),
            quantity_item(&self.s),
        ]
    }
}

// --- Shared field helpers ---

fn prefixed(type_byte: u8, fields: Vec<Item>) -> Vec<u8> {
    let mut out = vec![type_byte];
    out.extend(rlp::encode(&Item::List(fields)));
    out
}

fn require<T: Clone>(
    field: &Option<T>,
    tx_type: u8,
    name: &'static str,
) -> Result<T, EncodeError> {
    field.clone().ok_or(EncodeError::MissingField {
        tx_type,
        field: name,
    })
}

/// Typed signatures carry the parity as `yParity`, but many providers emit
/// a legacy-style `v` holding the same 0/1 value, sometimes without
/// `yParity` at all. Accept either, preferring `yParity`.
fn signature_parity(raw: &RawTransaction, tx_type: u8) -> Result<Quantity, EncodeError> {
    raw.y_parity
        .clone()
        .or_else(|| raw.v.clone())
        .ok_or(EncodeError::MissingField {
            tx_type,
            field: "yParity",
        })
}

/// Contract creation encodes the recipient as the empty byte string.
fn recipient_item(to: &Option<Address>) -> Item {
    match to {
        Some(addr) => Item::Bytes(addr.0.to_vec()),
        None => Item::Bytes(Vec::new()),
    }
}

fn access_list_item(entries: &[AccessEntry]) -> Item {
    Item::List(
        entries
            .iter()
            .map(|entry| {
                Item::List(vec![
                    Item::Bytes(entry.address.0.to_vec()),
                    Item::List(
                        entry
                            .storage_keys
                            .iter()
                            .map(|key| Item::Bytes(key.0.to_vec()))
                            .collect(),
                    ),
                ])
            })
            .collect(),
    )
}

fn convert_access_list(
    raw: &Option<Vec<AccessListItem>>,
    tx_type: u8,
) -> Result<Vec<AccessEntry>, EncodeError> {
    let items = match raw {
        Some(items) => items.as_slice(),
        None => return Ok(Vec::new()),
    };
    items
        .iter()
        .map(|item| {
            Ok(AccessEntry {
                address: item.address.ok_or(EncodeError::MissingField {
                    tx_type,
                    field: "accessList.address",
                })?,
                storage_keys: item.storage_keys.clone(),
            })
        })
        .collect()
}

fn convert_authorizations(
    raw: &Option<Vec<Authorization>>,
) -> Result<Vec<AuthEntry>, EncodeError> {
    let items = match raw {
        Some(items) => items.as_slice(),
        None => return Err(EncodeError::MissingField {
            tx_type: 4,
            field: "authorizationList",
        }),
    };
    items
        .iter()
        .map(|auth| {
            let field = |opt: &Option<Quantity>, name: &'static str| {
                opt.clone().ok_or(EncodeError::MissingField {
                    tx_type: 4,
                    field: name,
                })
            };
            Ok(AuthEntry {
                chain_id: field(&auth.chain_id, "authorizationList.chainId")?,
                address: auth.address.ok_or(EncodeError::MissingField {
                    tx_type: 4,
                    field: "authorizationList.address",
                })?,
                nonce: field(&auth.nonce, "authorizationList.nonce")?,
                y_parity: field(&auth.y_parity, "authorizationList.yParity")?,
                r: field(&auth.r, "authorizationList.r")?,
                s: field(&auth.s, "authorizationList.s")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;
    use crate::rlp::decode;
    use hex_literal::hex;

    fn parse(json: &str) -> RawTransaction {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_eip155_example_vector() {
        // The worked example from EIP-155: nonce 9, 20 gwei, 21000 gas,
        // 1 ether to 0x3535...35, signed with chain id 1.
        let raw = parse(
            r#"{
                "nonce": "0x9",
                "gasPrice": "0x4a817c800",
                "gas": "0x5208",
                "to": "0x3535353535353535353535353535353535353535",
                "value": "0xde0b6b3a7640000",
                "input": "0x",
                "v": "0x25",
                "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            }"#,
        );
        let envelope = TxEnvelope::from_raw(&raw).unwrap();
        assert_eq!(envelope.tx_type(), 0);
        assert_eq!(
            envelope.canonical_bytes(),
            hex!(
                "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            )
        );
    }

    #[test]
    fn test_mainnet_first_transfer_vector() {
        // The first ether transfer on mainnet, mined in block 46147:
        // 31337 wei for 21000 gas, signed pre-EIP-155 with v = 28. Raw
        // encoding and transaction hash are published chain data.
        let raw = parse(
            r#"{
                "nonce": "0x0",
                "gasPrice": "0x2d79883d2000",
                "gas": "0x5208",
                "to": "0x5df9b87991262f6ba471f09758cde1c0fc1de734",
                "value": "0x7a69",
                "input": "0x",
                "v": "0x1c",
                "r": "0x88ff6cf0fefd94db46111149ae4bfc179e9b94721fffd821d38d16464b3f71d0",
                "s": "0x45e0aff800961cfce805daef7016b9b675c137a6a41a548f7b60a3484c06a33a"
            }"#,
        );
        let bytes = TxEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        assert_eq!(
            bytes,
            hex!(
                "f86780862d79883d2000825208945df9b87991262f6ba471f09758cde1c0fc1de734827a69801ca088ff6cf0fefd94db46111149ae4bfc179e9b94721fffd821d38d16464b3f71d0a045e0aff800961cfce805daef7016b9b675c137a6a41a548f7b60a3484c06a33a"
            )
        );
        assert_eq!(
            keccak256(&bytes),
            hex!("5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060")
        );
    }

    #[test]
    fn test_encoding_unchanged_by_json_field_order() {
        // Providers do not guarantee any key order, so the same payload
        // arrives here twice with its fields reversed.
        let forward = parse(
            r#"{
                "nonce": "0x9",
                "gasPrice": "0x4a817c800",
                "gas": "0x5208",
                "to": "0x3535353535353535353535353535353535353535",
                "value": "0xde0b6b3a7640000",
                "input": "0x",
                "v": "0x25",
                "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            }"#,
        );
        let reversed = parse(
            r#"{
                "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83",
                "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                "v": "0x25",
                "input": "0x",
                "value": "0xde0b6b3a7640000",
                "to": "0x3535353535353535353535353535353535353535",
                "gas": "0x5208",
                "gasPrice": "0x4a817c800",
                "nonce": "0x9"
            }"#,
        );
        let a = TxEnvelope::from_raw(&forward).unwrap().canonical_bytes();
        let b = TxEnvelope::from_raw(&reversed).unwrap().canonical_bytes();
        assert_eq!(a, b);
        assert_eq!(
            a,
            hex!(
                "f86c098504a817c800825208943535353535353535353535353535353535353535880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            )
        );
    }

    #[test]
    fn test_legacy_contract_creation_encodes_empty_recipient() {
        let raw = parse(
            r#"{
                "nonce": "0x0",
                "gasPrice": "0x1",
                "gas": "0x5208",
                "to": null,
                "value": "0x0",
                "input": "0x60006000",
                "v": "0x1b",
                "r": "0x1",
                "s": "0x2"
            }"#,
        );
        let bytes = TxEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        let (item, consumed) = decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        let fields = item.as_list().unwrap();
        assert_eq!(fields.len(), 9);
        assert_eq!(fields[3], Item::Bytes(Vec::new()));
        assert_eq!(fields[5], Item::Bytes(hex!("60006000").to_vec()));
    }

    #[test]
    fn test_eip2930_payload_structure() {
        let raw = parse(
            r#"{
                "type": "0x1",
                "chainId": "0x1",
                "nonce": "0x7",
                "gasPrice": "0x1",
                "gas": "0x5208",
                "to": "0x000000000000000000000000000000000000dead",
                "value": "0x0",
                "input": "0x",
                "accessList": [
                    {
                        "address": "0x0000000000000000000000000000000000001234",
                        "storageKeys": [
                            "0x0000000000000000000000000000000000000000000000000000000000000001"
                        ]
                    }
                ],
                "yParity": "0x0",
                "r": "0x1",
                "s": "0x2"
            }"#,
        );
        let bytes = TxEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        assert_eq!(bytes[0], 0x01);
        let (item, consumed) = decode(&bytes[1..]).unwrap();
        assert_eq!(consumed, bytes.len() - 1);
        let fields = item.as_list().unwrap();
        assert_eq!(fields.len(), 11);
        // accessList is [[address, [storageKeys...]]].
        let access = fields[7].as_list().unwrap();
        assert_eq!(access.len(), 1);
        let entry = access[0].as_list().unwrap();
        assert_eq!(entry.len(), 2);
        assert_eq!(entry[0].as_bytes().unwrap().len(), 20);
        assert_eq!(entry[1].as_list().unwrap().len(), 1);
        // yParity 0 is the empty byte string, not 0x00.
        assert_eq!(fields[8], Item::Bytes(Vec::new()));
    }

    #[test]
    fn test_eip1559_payload_structure() {
        let raw = parse(
            r#"{
                "type": "0x2",
                "chainId": "0x1",
                "nonce": "0x2a",
                "maxPriorityFeePerGas": "0x3b9aca00",
                "maxFeePerGas": "0x2540be400",
                "gas": "0x5208",
                "to": "0x000000000000000000000000000000000000dead",
                "value": "0x38d7ea4c68000",
                "input": "0x",
                "accessList": [],
                "yParity": "0x1",
                "r": "0x1",
                "s": "0x2"
            }"#,
        );
        let bytes = TxEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        assert_eq!(bytes[0], 0x02);
        let (item, _) = decode(&bytes[1..]).unwrap();
        let fields = item.as_list().unwrap();
        assert_eq!(fields.len(), 12);
        assert_eq!(fields[0], Item::Bytes(vec![0x01]));
        assert_eq!(fields[2], Item::Bytes(hex!("3b9aca00").to_vec()));
        assert_eq!(fields[8], Item::List(Vec::new()));
    }

    #[test]
    fn test_eip4844_payload_structure() {
        let raw = parse(
            r#"{
                "type": "0x3",
                "chainId": "0x1",
                "nonce": "0x0",
                "maxPriorityFeePerGas": "0x1",
                "maxFeePerGas": "0x2",
                "gas": "0x5208",
                "to": "0x000000000000000000000000000000000000dead",
                "value": "0x0",
                "input": "0x",
                "maxFeePerBlobGas": "0x42",
                "blobVersionedHashes": [
                    "0x0100000000000000000000000000000000000000000000000000000000000001"
                ],
                "yParity": "0x0",
                "r": "0x1",
                "s": "0x2"
            }"#,
        );
        let bytes = TxEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        assert_eq!(bytes[0], 0x03);
        let (item, _) = decode(&bytes[1..]).unwrap();
        let fields = item.as_list().unwrap();
        assert_eq!(fields.len(), 14);
        assert_eq!(fields[9], Item::Bytes(vec![0x42]));
        let blobs = fields[10].as_list().unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].as_bytes().unwrap().len(), 32);
    }

    #[test]
    fn test_eip7702_payload_structure() {
        let raw = parse(
            r#"{
                "type": "0x4",
                "chainId": "0x1",
                "nonce": "0x1",
                "maxPriorityFeePerGas": "0x1",
                "maxFeePerGas": "0x2",
                "gas": "0x186a0",
                "to": "0x000000000000000000000000000000000000dead",
                "value": "0x0",
                "input": "0x",
                "authorizationList": [
                    {
                        "chainId": "0x1",
                        "address": "0x0000000000000000000000000000000000005678",
                        "nonce": "0x0",
                        "yParity": "0x1",
                        "r": "0x1",
                        "s": "0x2"
                    }
                ],
                "yParity": "0x0",
                "r": "0x3",
                "s": "0x4"
            }"#,
        );
        let bytes = TxEnvelope::from_raw(&raw).unwrap().canonical_bytes();
        assert_eq!(bytes[0], 0x04);
        let (item, _) = decode(&bytes[1..]).unwrap();
        let fields = item.as_list().unwrap();
        assert_eq!(fields.len(), 13);
        let auths = fields[9].as_list().unwrap();
        assert_eq!(auths.len(), 1);
        // Each authorization is [chainId, address, nonce, yParity, r, s].
        assert_eq!(auths[0].as_list().unwrap().len(), 6);
    }

    #[test]
    fn test_parity_falls_back_to_v() {
        let with_v = parse(
            r#"{
                "type": "0x2",
                "chainId": "0x1",
                "nonce": "0x0",
                "maxPriorityFeePerGas": "0x1",
                "maxFeePerGas": "0x2",
                "gas": "0x5208",
                "to": "0x000000000000000000000000000000000000dead",
                "value": "0x0",
                "v": "0x1",
                "r": "0x1",
                "s": "0x2"
            }"#,
        );
        let mut with_parity = with_v.clone();
        with_parity.v = None;
        with_parity.y_parity = Some(Quantity::from_u64(1));

        let a = TxEnvelope::from_raw(&with_v).unwrap().canonical_bytes();
        let b = TxEnvelope::from_raw(&with_parity).unwrap().canonical_bytes();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_field_is_reported() {
        let raw = parse(
            r#"{
                "type": "0x2",
                "chainId": "0x1",
                "nonce": "0x0",
                "maxPriorityFeePerGas": "0x1",
                "gas": "0x5208",
                "value": "0x0",
                "yParity": "0x0",
                "r": "0x1",
                "s": "0x2"
            }"#,
        );
        assert_eq!(
            TxEnvelope::from_raw(&raw).unwrap_err(),
            EncodeError::MissingField {
                tx_type: 2,
                field: "maxFeePerGas"
            }
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let raw = parse(r#"{"type": "0x7", "nonce": "0x0"}"#);
        assert_eq!(
            TxEnvelope::from_raw(&raw).unwrap_err(),
            EncodeError::UnsupportedTxType { got: 7 }
        );
    }

    #[test]
    fn test_explicit_type_zero_is_legacy() {
        let raw = parse(
            r#"{
                "type": "0x0",
                "nonce": "0x9",
                "gasPrice": "0x4a817c800",
                "gas": "0x5208",
                "to": "0x3535353535353535353535353535353535353535",
                "value": "0xde0b6b3a7640000",
                "input": "0x",
                "v": "0x25",
                "r": "0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276",
                "s": "0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            }"#,
        );
        let envelope = TxEnvelope::from_raw(&raw).unwrap();
        assert_eq!(envelope.tx_type(), 0);
        // No type prefix on legacy encodings.
        assert_eq!(envelope.canonical_bytes()[0], 0xF8);
    }
}
