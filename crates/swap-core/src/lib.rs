//! Pure pricing and routing for AMM swaps.
//!
//! This library provides the synchronous half of the swap engine:
//! - Exact rational prices and slippage bounds
//! - Constant-product pool math with the 0.30% fee
//! - Depth-first multi-hop route search and best-trade selection
//! - The packed path format used by concentrated-liquidity routers

pub mod config;
pub mod error;
pub mod fraction;
pub mod pair;
pub mod path;
pub mod route;
pub mod trade;
pub mod types;

pub use config::{SearchConfig, TradeOptions};
pub use error::SwapError;
pub use fraction::{Fraction, Price};
pub use pair::{pair_address, Pair};
pub use path::{FeeAmount, SwapPath, SwapPathItem};
pub use route::{trades_exact_in, trades_exact_out, Route};
pub use trade::{
    best_trade_exact_in, best_trade_exact_out, lower_bound, requested_amount, select_best,
    upper_bound, Trade, TradeData, TradeType,
};
pub use types::{Address, Amount, Bytes, Token, TokenAmount, B256, NATIVE_DECIMALS, U256};
