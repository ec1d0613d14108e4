//! Classic constant-product swaps: pool discovery, quoting and the router
//! call.

use crate::config::ClassicConfig;
use crate::contracts::{IUniswapV2Pair, IUniswapV2Router02};
use crate::error::Error;
use crate::executor::{call_with_cancel, revert_as_none, CallExecutor, CancelToken, RequestSlot};
use crate::transaction::TransactionData;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};
use swap_core::{
    pair_address, requested_amount, Pair, SearchConfig, SwapError, Token, TokenAmount, TradeData,
    TradeOptions, TradeType,
};
use tracing::{debug, info};

/// Token pairs worth fetching for a swap between `token_a` and `token_b`.
///
/// When neither side is the native coin, the pools through the wrapped native
/// token are included so two-hop routes can be found.
pub fn pair_candidates(native: Token, token_a: Token, token_b: Token) -> Vec<(Token, Token)> {
    if token_a.is_native() || token_b.is_native() {
        return vec![(token_a, token_b)];
    }
    let mut seen = HashSet::new();
    [(token_a, token_b), (token_a, native), (token_b, native)]
        .into_iter()
        .filter(|(a, b)| a.address() != b.address())
        .filter(|(a, b)| seen.insert(pool_key(a, b)))
        .collect()
}

fn pool_key(a: &Token, b: &Token) -> (Address, Address) {
    if a.sorts_before(b) {
        (a.address(), b.address())
    } else {
        (b.address(), a.address())
    }
}

/// Quotes and builds swaps against a classic router.
pub struct ClassicKit<E> {
    executor: E,
    config: ClassicConfig,
    requests: RequestSlot,
}

impl<E: CallExecutor> ClassicKit<E> {
    pub fn new(executor: E, config: ClassicConfig) -> Self {
        Self {
            executor,
            config,
            requests: RequestSlot::new(),
        }
    }

    pub fn config(&self) -> &ClassicConfig {
        &self.config
    }

    pub fn router_address(&self) -> Address {
        self.config.router
    }

    /// Cancel the quote in flight, if any.
    pub fn cancel(&self) {
        self.requests.cancel();
    }

    /// Read one pool's reserves. A pool that reverts or answers with
    /// something other than reserves counts as empty.
    pub async fn pair(
        &self,
        token_a: Token,
        token_b: Token,
        cancel: &CancelToken,
    ) -> Result<Pair, Error> {
        let (token0, token1) = if token_a.sorts_before(&token_b) {
            (token_a.wrapped(), token_b.wrapped())
        } else {
            (token_b.wrapped(), token_a.wrapped())
        };
        let address = pair_address(
            self.config.factory,
            self.config.init_code_hash,
            token0.address(),
            token1.address(),
        );

        let data: Bytes = IUniswapV2Pair::getReservesCall {}.abi_encode().into();
        let answer = revert_as_none(
            call_with_cancel(&self.executor, cancel, address, data).await,
        )?;

        let (reserve0, reserve1) = answer
            .and_then(|bytes| IUniswapV2Pair::getReservesCall::abi_decode_returns(&bytes).ok())
            .map(|reserves| (U256::from(reserves.reserve0), U256::from(reserves.reserve1)))
            .unwrap_or_default();

        debug!(pair = %address, %reserve0, %reserve1, "fetched reserves");
        Ok(Pair::new(
            TokenAmount::new(token0, reserve0),
            TokenAmount::new(token1, reserve1),
        )?)
    }

    /// Fetch every candidate pool concurrently. A transport failure or
    /// cancellation aborts the whole batch.
    pub async fn pairs(
        &self,
        token_a: Token,
        token_b: Token,
        cancel: &CancelToken,
    ) -> Result<Vec<Pair>, Error> {
        let candidates = pair_candidates(self.config.native_token(), token_a, token_b);
        try_join_all(
            candidates
                .into_iter()
                .map(|(a, b)| self.pair(a, b, cancel)),
        )
        .await
    }

    /// Best trade spending exactly `amount_in` of `token_in`.
    pub async fn best_trade_exact_in(
        &self,
        token_in: Token,
        token_out: Token,
        amount_in: Decimal,
        options: TradeOptions,
    ) -> Result<TradeData, Error> {
        requested_amount(token_in, amount_in)?;
        if token_in.address() == token_out.address() {
            return Err(SwapError::InvalidTokensForSwap.into());
        }

        let cancel = self.requests.begin();
        let pairs = self.pairs(token_in, token_out, &cancel).await?;
        let trade = swap_core::best_trade_exact_in(
            &pairs,
            token_in,
            token_out,
            amount_in,
            &self.search_config(),
        )?;
        info!(amount_out = %trade.amount_out().raw, hops = trade.route().len(), "best exact-in trade");
        Ok(TradeData::new(trade, options))
    }

    /// Best trade yielding exactly `amount_out` of `token_out`.
    pub async fn best_trade_exact_out(
        &self,
        token_in: Token,
        token_out: Token,
        amount_out: Decimal,
        options: TradeOptions,
    ) -> Result<TradeData, Error> {
        requested_amount(token_out, amount_out)?;
        if token_in.address() == token_out.address() {
            return Err(SwapError::InvalidTokensForSwap.into());
        }

        let cancel = self.requests.begin();
        let pairs = self.pairs(token_in, token_out, &cancel).await?;
        let trade = swap_core::best_trade_exact_out(
            &pairs,
            token_in,
            token_out,
            amount_out,
            &self.search_config(),
        )?;
        info!(amount_in = %trade.amount_in().raw, hops = trade.route().len(), "best exact-out trade");
        Ok(TradeData::new(trade, options))
    }

    /// Router call for `trade_data`, sent from `account`, with the deadline
    /// counted from now.
    pub fn transaction_data(
        &self,
        trade_data: &TradeData,
        account: Address,
    ) -> Result<TransactionData, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        build_transaction(&self.config, trade_data, account, now)
    }

    fn search_config(&self) -> SearchConfig {
        SearchConfig::default().with_max_hops(self.config.max_hops)
    }
}

/// Encode the router call for a classic trade. `now` is the current unix time
/// in seconds.
pub fn build_transaction(
    config: &ClassicConfig,
    trade_data: &TradeData,
    account: Address,
    now: u64,
) -> Result<TransactionData, Error> {
    let trade = &trade_data.trade;
    let options = &trade_data.options;
    let token_in = trade.amount_in().token;
    let token_out = trade.amount_out().token;

    if token_in.address() == token_out.address() {
        return Err(SwapError::InvalidTokensForSwap.into());
    }

    let path = trade.route().addresses();
    let to = options.recipient.unwrap_or(account);
    let deadline = U256::from(now.saturating_add(options.ttl.as_secs()));
    let fee_on_transfer = options.fee_on_transfer;

    let (value, input): (U256, Vec<u8>) = match trade.kind() {
        TradeType::ExactIn => {
            let amount_in = trade.amount_in().raw;
            let amount_out_min = trade_data.amount_out_min().raw;

            if token_in.is_native() {
                let input = if fee_on_transfer {
                    IUniswapV2Router02::swapExactETHForTokensSupportingFeeOnTransferTokensCall {
                        amountOutMin: amount_out_min,
                        path,
                        to,
                        deadline,
                    }
                    .abi_encode()
                } else {
                    IUniswapV2Router02::swapExactETHForTokensCall {
                        amountOutMin: amount_out_min,
                        path,
                        to,
                        deadline,
                    }
                    .abi_encode()
                };
                (amount_in, input)
            } else if token_out.is_native() {
                let input = if fee_on_transfer {
                    IUniswapV2Router02::swapExactTokensForETHSupportingFeeOnTransferTokensCall {
                        amountIn: amount_in,
                        amountOutMin: amount_out_min,
                        path,
                        to,
                        deadline,
                    }
                    .abi_encode()
                } else {
                    IUniswapV2Router02::swapExactTokensForETHCall {
                        amountIn: amount_in,
                        amountOutMin: amount_out_min,
                        path,
                        to,
                        deadline,
                    }
                    .abi_encode()
                };
                (U256::ZERO, input)
            } else {
                let input = if fee_on_transfer {
                    IUniswapV2Router02::swapExactTokensForTokensSupportingFeeOnTransferTokensCall {
                        amountIn: amount_in,
                        amountOutMin: amount_out_min,
                        path,
                        to,
                        deadline,
                    }
                    .abi_encode()
                } else {
                    IUniswapV2Router02::swapExactTokensForTokensCall {
                        amountIn: amount_in,
                        amountOutMin: amount_out_min,
                        path,
                        to,
                        deadline,
                    }
                    .abi_encode()
                };
                (U256::ZERO, input)
            }
        }
        TradeType::ExactOut => {
            let amount_out = trade.amount_out().raw;
            let amount_in_max = trade_data.amount_in_max()?.raw;

            if token_in.is_native() {
                let input = IUniswapV2Router02::swapETHForExactTokensCall {
                    amountOut: amount_out,
                    path,
                    to,
                    deadline,
                }
                .abi_encode();
                (amount_in_max, input)
            } else if token_out.is_native() {
                let input = IUniswapV2Router02::swapTokensForExactETHCall {
                    amountOut: amount_out,
                    amountInMax: amount_in_max,
                    path,
                    to,
                    deadline,
                }
                .abi_encode();
                (U256::ZERO, input)
            } else {
                let input = IUniswapV2Router02::swapTokensForExactTokensCall {
                    amountOut: amount_out,
                    amountInMax: amount_in_max,
                    path,
                    to,
                    deadline,
                }
                .abi_encode();
                (U256::ZERO, input)
            }
        }
    };

    debug!(
        router = %config.router,
        selector = %hex::encode(&input[..4]),
        %value,
        "built classic swap"
    );
    Ok(TransactionData::new(config.router, value, input.into()))
}
