//! Packed multi-hop paths for the concentrated-liquidity router and quoter.
//!
//! Wire layout: `token(20) { fee(3, big-endian) | token(20) }*` with no
//! padding between fields.

use crate::error::SwapError;
use crate::types::{Address, Bytes};
use std::fmt;

const ADDRESS_LEN: usize = 20;
const FEE_LEN: usize = 3;
const HOP_LEN: usize = FEE_LEN + ADDRESS_LEN;

/// A pool fee tier in hundredths of a basis point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeeAmount(u32);

impl FeeAmount {
    /// 0.01%
    pub const LOWEST: FeeAmount = FeeAmount(100);
    /// 0.05%
    pub const LOW: FeeAmount = FeeAmount(500);
    /// 0.25%, PancakeSwap's medium tier.
    pub const MEDIUM_PANCAKESWAP: FeeAmount = FeeAmount(2500);
    /// 0.3%
    pub const MEDIUM: FeeAmount = FeeAmount(3000);
    /// 1%
    pub const HIGH: FeeAmount = FeeAmount(10000);

    /// Largest value that fits the 24-bit wire field.
    pub const MAX: u32 = 0x00ff_ffff;

    pub fn new(fee: u32) -> Result<Self, SwapError> {
        if fee > Self::MAX {
            return Err(SwapError::InvalidPath(format!("fee {fee} exceeds 24 bits")));
        }
        Ok(Self(fee))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn to_be_bytes(&self) -> [u8; FEE_LEN] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }

    fn from_be_bytes(bytes: [u8; FEE_LEN]) -> Self {
        Self(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One pool on a path: swap `token_a` for `token_b` in the `fee` tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SwapPathItem {
    pub token_a: Address,
    pub token_b: Address,
    pub fee: FeeAmount,
}

impl SwapPathItem {
    pub fn new(token_a: Address, token_b: Address, fee: FeeAmount) -> Self {
        Self {
            token_a,
            token_b,
            fee,
        }
    }

    /// The same pool traversed the other way.
    pub fn reversed(&self) -> Self {
        Self::new(self.token_b, self.token_a, self.fee)
    }
}

/// A non-empty chain of pools where each item starts at the previous item's
/// end token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SwapPath {
    items: Vec<SwapPathItem>,
}

impl SwapPath {
    pub fn new(items: Vec<SwapPathItem>) -> Result<Self, SwapError> {
        if items.is_empty() {
            return Err(SwapError::PathEmpty);
        }
        for (index, hop) in items.windows(2).enumerate() {
            if hop[0].token_b != hop[1].token_a {
                return Err(SwapError::InvalidPath(format!(
                    "item {} starts at {} but the previous item ends at {}",
                    index + 1,
                    hop[1].token_a,
                    hop[0].token_b
                )));
            }
        }
        Ok(Self { items })
    }

    /// A single-pool path.
    pub fn single(item: SwapPathItem) -> Self {
        Self { items: vec![item] }
    }

    pub fn items(&self) -> &[SwapPathItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.items.len() == 1
    }

    pub fn first_fee(&self) -> FeeAmount {
        self.items[0].fee
    }

    pub fn token_in(&self) -> Address {
        self.items[0].token_a
    }

    pub fn token_out(&self) -> Address {
        self.items[self.items.len() - 1].token_b
    }

    /// Append `other`, which must start where this path ends.
    pub fn concat(&self, other: &SwapPath) -> Result<SwapPath, SwapError> {
        let mut items = self.items.clone();
        items.extend_from_slice(&other.items);
        SwapPath::new(items)
    }

    /// The path walked from its end back to its start.
    pub fn reversed(&self) -> SwapPath {
        Self {
            items: self.items.iter().rev().map(SwapPathItem::reversed).collect(),
        }
    }

    /// Pack into the router's byte layout.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(ADDRESS_LEN + self.items.len() * HOP_LEN);
        out.extend_from_slice(self.token_in().as_slice());
        for item in &self.items {
            out.extend_from_slice(&item.fee.to_be_bytes());
            out.extend_from_slice(item.token_b.as_slice());
        }
        out.into()
    }

    /// Unpack the router's byte layout.
    pub fn decode(data: &[u8]) -> Result<SwapPath, SwapError> {
        if data.is_empty() || data.len() == ADDRESS_LEN {
            return Err(SwapError::PathEmpty);
        }
        if data.len() < ADDRESS_LEN || (data.len() - ADDRESS_LEN) % HOP_LEN != 0 {
            return Err(SwapError::InvalidPath(format!(
                "length {} is not 20 + 23k",
                data.len()
            )));
        }

        let mut token_a = Address::from_slice(&data[..ADDRESS_LEN]);
        let mut items = Vec::with_capacity((data.len() - ADDRESS_LEN) / HOP_LEN);
        for hop in data[ADDRESS_LEN..].chunks_exact(HOP_LEN) {
            let fee = FeeAmount::from_be_bytes([hop[0], hop[1], hop[2]]);
            let token_b = Address::from_slice(&hop[FEE_LEN..]);
            items.push(SwapPathItem::new(token_a, token_b, fee));
            token_a = token_b;
        }
        Ok(SwapPath { items })
    }
}

impl fmt::Display for SwapPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token_in())?;
        for item in &self.items {
            write!(f, " -({})-> {}", item.fee, item.token_b)?;
        }
        Ok(())
    }
}
