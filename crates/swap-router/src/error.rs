//! Errors surfaced by the chain-facing half of the engine.

use alloy_primitives::Bytes;
use swap_core::SwapError;

/// Failure of a single read-only call, as reported by a [`CallExecutor`].
///
/// [`CallExecutor`]: crate::executor::CallExecutor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The contract executed and reverted with the given data.
    #[error("call reverted: 0x{}", hex::encode(.0))]
    Reverted(Bytes),

    /// The call never produced an answer (network, node or timeout).
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("call cancelled")]
    Cancelled,
}

/// Errors that can occur while quoting or building a swap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Swap(#[from] SwapError),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// Whether the caller should give up on the whole request rather than
    /// skip a candidate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Cancelled)
    }
}

/// Errors from reading router calldata back into a swap.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid calldata: {0}")]
    InvalidCalldata(String),

    #[error("unknown function selector: 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),
}
