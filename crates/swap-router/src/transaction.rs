//! The payload handed to a signer.

use alloy_primitives::{Address, Bytes, U256};

/// An unsigned call to a router contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionData {
    /// The router contract.
    pub to: Address,
    /// Native coin attached to the call.
    pub value: U256,
    /// ABI-encoded calldata.
    pub input: Bytes,
}

impl TransactionData {
    pub fn new(to: Address, value: U256, input: Bytes) -> Self {
        Self { to, value, input }
    }

    /// The 4-byte function selector, if the input carries one.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.input.get(..4).and_then(|s| s.try_into().ok())
    }
}
