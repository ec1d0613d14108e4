//! Error taxonomy shared by the pricing, routing and path modules.

/// Errors produced by the pure swap machinery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    #[error("token is not part of the pair")]
    InvalidToken,

    #[error("pair has a zero reserve")]
    InsufficientReserves,

    #[error("trade would meet or exceed the output reserve")]
    InsufficientReserveOut,

    #[error("pair {index} does not connect to the previous hop")]
    InvalidRoute { index: usize },

    #[error("no route found")]
    RouteNotFound,

    #[error("no trade found")]
    TradeNotFound,

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount does not fit in 256 bits")]
    AmountOverflow,

    #[error("no protocol constants configured for chain {0}")]
    UnsupportedChain(u64),

    #[error("input and output tokens are the same")]
    InvalidTokensForSwap,

    #[error("swap path is empty")]
    PathEmpty,

    #[error("invalid swap path: {0}")]
    InvalidPath(String),
}
