//! Search and trade configuration parameters.

use crate::fraction::Fraction;
use crate::types::Address;
use std::time::Duration;

/// Configuration for the classic route search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of pools a route may pass through.
    pub max_hops: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_hops: 3 }
    }
}

impl SearchConfig {
    /// Create a new configuration with custom max hops.
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }
}

/// Bounds applied when a selected trade is turned into a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOptions {
    /// Tolerated price movement, e.g. 1/200 for 0.5%.
    pub slippage: Fraction,

    /// How long the transaction stays valid after it is built.
    pub ttl: Duration,

    /// Receiver of the output. Defaults to the sending account.
    pub recipient: Option<Address>,

    /// Use the router methods that tolerate tokens taking a transfer fee.
    /// Only exact-in swaps have such variants.
    pub fee_on_transfer: bool,
}

impl Default for TradeOptions {
    fn default() -> Self {
        Self {
            slippage: Fraction::new(1, 200),
            ttl: Duration::from_secs(20 * 60),
            recipient: None,
            fee_on_transfer: false,
        }
    }
}

impl TradeOptions {
    /// Negative slippage is stored as zero.
    pub fn with_slippage(mut self, slippage: Fraction) -> Self {
        self.slippage = if slippage.is_negative() {
            Fraction::zero()
        } else {
            slippage
        };
        self
    }

    /// Slippage in basis points (1 bp = 0.01%).
    pub fn with_slippage_bps(self, bps: u32) -> Self {
        self.with_slippage(Fraction::new(bps, 10_000))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn with_fee_on_transfer(mut self, enabled: bool) -> Self {
        self.fee_on_transfer = enabled;
        self
    }
}
