//! Chain-facing half of the swap engine.
//!
//! This library provides:
//! - Per-chain router, factory and quoter addresses
//! - Classic pool discovery and quoting through a pluggable [`CallExecutor`]
//! - Concentrated-liquidity quoting across fee tiers
//! - Router calldata for both families, and decoding it back
//!
//! Every network read goes through [`CallExecutor`], so the crate carries no
//! transport of its own.

pub mod classic;
pub mod concentrated;
pub mod config;
pub mod contracts;
pub mod decoder;
pub mod error;
pub mod executor;
pub mod swap_router;
pub mod transaction;

pub use classic::{pair_candidates, ClassicKit};
pub use concentrated::{best_tier, ConcentratedKit, TierQuote, TradeDataV3, TradeV3};
pub use config::{Chain, ClassicConfig, ConcentratedConfig, DexType, RouterVersion};
pub use decoder::{DecodedAmount, SwapDecoder, SwapDecoration, SwapToken};
pub use error::{CallError, DecodeError, Error};
pub use executor::{call_with_cancel, cancel_pair, CallExecutor, CancelHandle, CancelToken, RequestSlot};
pub use swap_router::ADDRESS_THIS;
pub use transaction::TransactionData;
