//! JSON-facing data model: primitives plus the raw block, transaction and
//! receipt shapes that providers return.

pub mod block;
pub mod primitives;
pub mod receipt;
pub mod transaction;

pub use block::BlockData;
pub use primitives::{Address, Hash32, HexBytes, PrimitiveError, Quantity};
pub use receipt::{RawLog, RawReceipt, ReceiptOutcome, StatusFlag};
pub use transaction::{AccessListItem, Authorization, RawTransaction};
