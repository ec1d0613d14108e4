//! A scripted executor shared by the integration tests.

#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use swap_router::{CallError, CallExecutor};

/// What the mock answers to one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Return(Bytes),
    Revert,
    Transport,
    /// Never answers within a test's lifetime.
    Hang,
}

/// Answers by exact calldata first, then by selector, then with `fallback`.
pub struct MockExecutor {
    exact: HashMap<(Address, Bytes), Reply>,
    by_selector: HashMap<(Address, [u8; 4]), Reply>,
    fallback: Reply,
    calls: Mutex<Vec<(Address, Bytes)>>,
}

impl MockExecutor {
    /// Every unscripted call reverts.
    pub fn new() -> Self {
        Self {
            exact: HashMap::new(),
            by_selector: HashMap::new(),
            fallback: Reply::Revert,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_call(mut self, to: Address, data: impl Into<Bytes>, reply: Reply) -> Self {
        self.exact.insert((to, data.into()), reply);
        self
    }

    pub fn on_selector(mut self, to: Address, selector: [u8; 4], reply: Reply) -> Self {
        self.by_selector.insert((to, selector), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn reply_for(&self, to: Address, data: &Bytes) -> Reply {
        if let Some(reply) = self.exact.get(&(to, data.clone())) {
            return reply.clone();
        }
        let selector = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok());
        selector
            .and_then(|selector| self.by_selector.get(&(to, selector)))
            .unwrap_or(&self.fallback)
            .clone()
    }
}

#[async_trait]
impl CallExecutor for MockExecutor {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, CallError> {
        let reply = self.reply_for(to, &data);
        self.calls.lock().push((to, data));

        match reply {
            Reply::Return(bytes) => Ok(bytes),
            Reply::Revert => Err(CallError::Reverted(Bytes::new())),
            Reply::Transport => Err(CallError::Transport("connection reset".to_string())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(CallError::Transport("timed out".to_string()))
            }
        }
    }
}

/// Return data of a single-pool quote. Narrow integer fields share the
/// 32-byte word layout of `uint256`.
pub fn single_quote(amount: u64) -> Reply {
    let words = (U256::from(amount), U256::ZERO, U256::ZERO, U256::ZERO);
    Reply::Return(words.abi_encode_params().into())
}

/// Return data of a whole-path quote.
pub fn path_quote(amount: u64) -> Reply {
    let words = (
        U256::from(amount),
        Vec::<U256>::new(),
        Vec::<U256>::new(),
        U256::ZERO,
    );
    Reply::Return(words.abi_encode_params().into())
}

pub fn address_reply(address: Address) -> Reply {
    Reply::Return(address.abi_encode().into())
}

/// `slot0` return data with only the price set.
pub fn slot0_reply(sqrt_price_x96: U256) -> Reply {
    let z = U256::ZERO;
    Reply::Return((sqrt_price_x96, z, z, z, z, z, z).abi_encode_params().into())
}

pub fn reserves_reply(reserve0: u128, reserve1: u128) -> Reply {
    let words = (U256::from(reserve0), U256::from(reserve1), U256::ZERO);
    Reply::Return(words.abi_encode_params().into())
}
