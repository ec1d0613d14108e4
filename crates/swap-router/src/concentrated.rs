//! Concentrated-liquidity quoting: fee-tier search, the route through the
//! wrapped native token, and price impact from pool spot prices.

use crate::config::ConcentratedConfig;
use crate::contracts::{IQuoterV2, IUniswapV3Factory, IUniswapV3Pool};
use crate::error::Error;
use crate::executor::{call_with_cancel, revert_as_none, CallExecutor, CancelToken, RequestSlot};
use crate::swap_router::build_transaction;
use crate::transaction::TransactionData;
use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use std::time::{SystemTime, UNIX_EPOCH};
use swap_core::{
    lower_bound, requested_amount, upper_bound, FeeAmount, Fraction, Price, SwapError, SwapPath,
    SwapPathItem, Token, TokenAmount, TradeOptions, TradeType,
};
use tracing::{debug, info, trace};

/// A quoted concentrated-liquidity trade.
///
/// For exact-out trades the path runs from the output token back to the
/// input token, which is the order the router and quoter expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeV3 {
    kind: TradeType,
    path: SwapPath,
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    spot_price: Option<Fraction>,
}

impl TradeV3 {
    pub fn new(
        kind: TradeType,
        path: SwapPath,
        amount_in: TokenAmount,
        amount_out: TokenAmount,
        spot_price: Option<Fraction>,
    ) -> Self {
        Self {
            kind,
            path,
            amount_in,
            amount_out,
            spot_price,
        }
    }

    pub fn kind(&self) -> TradeType {
        self.kind
    }

    pub fn path(&self) -> &SwapPath {
        &self.path
    }

    pub fn amount_in(&self) -> &TokenAmount {
        &self.amount_in
    }

    pub fn amount_out(&self) -> &TokenAmount {
        &self.amount_out
    }

    /// Raw output per raw input at the pools' current prices, multiplied
    /// across hops. `None` when a pool on the path could not be read.
    pub fn spot_price(&self) -> Option<&Fraction> {
        self.spot_price.as_ref()
    }

    pub fn execution_price(&self) -> Option<Price> {
        Price::from_amounts(&self.amount_in, &self.amount_out)
    }

    /// `1 - realized / spot`. A zero spot price reads as 99.9%.
    pub fn price_impact(&self) -> Option<Fraction> {
        let spot = self.spot_price.as_ref()?;
        if spot.is_zero() {
            return Some(Fraction::new(999, 1000));
        }
        if self.amount_in.is_zero() {
            return None;
        }
        let realized = Fraction::ratio(self.amount_out.raw, self.amount_in.raw);
        Some(&Fraction::one() - &(&realized / spot))
    }
}

/// A selected concentrated trade with the options it will be sent with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeDataV3 {
    pub trade: TradeV3,
    pub options: TradeOptions,
}

impl TradeDataV3 {
    pub fn new(trade: TradeV3, options: TradeOptions) -> Self {
        Self { trade, options }
    }

    pub fn kind(&self) -> TradeType {
        self.trade.kind
    }

    /// Exact output for exact-out trades, the slippage floor otherwise.
    pub fn amount_out_min(&self) -> TokenAmount {
        match self.trade.kind {
            TradeType::ExactIn => lower_bound(&self.trade.amount_out, &self.options.slippage),
            TradeType::ExactOut => self.trade.amount_out,
        }
    }

    /// Exact input for exact-in trades, the slippage ceiling otherwise.
    pub fn amount_in_max(&self) -> Result<TokenAmount, SwapError> {
        match self.trade.kind {
            TradeType::ExactIn => Ok(self.trade.amount_in),
            TradeType::ExactOut => upper_bound(&self.trade.amount_in, &self.options.slippage),
        }
    }
}

/// The best amount one fee tier offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierQuote {
    pub fee: FeeAmount,
    pub amount: U256,
}

/// Largest output for exact-in, smallest input for exact-out. The first tier
/// wins a tie.
pub fn best_tier(kind: TradeType, quotes: impl IntoIterator<Item = TierQuote>) -> Option<TierQuote> {
    quotes.into_iter().fold(None, |best, quote| match best {
        Some(current) => {
            let better = match kind {
                TradeType::ExactIn => quote.amount > current.amount,
                TradeType::ExactOut => quote.amount < current.amount,
            };
            Some(if better { quote } else { current })
        }
        None => Some(quote),
    })
}

/// Orient a pool's token1-per-token0 price to the hop's direction.
fn hop_price(hop: &SwapPathItem, token1_per_token0: Fraction) -> Fraction {
    if hop.token_a < hop.token_b {
        token1_per_token0
    } else {
        token1_per_token0.invert().unwrap_or_else(Fraction::zero)
    }
}

/// Quotes and builds swaps against a concentrated-liquidity deployment.
pub struct ConcentratedKit<E> {
    executor: E,
    config: ConcentratedConfig,
    requests: RequestSlot,
}

impl<E: CallExecutor> ConcentratedKit<E> {
    pub fn new(executor: E, config: ConcentratedConfig) -> Self {
        Self {
            executor,
            config,
            requests: RequestSlot::new(),
        }
    }

    pub fn config(&self) -> &ConcentratedConfig {
        &self.config
    }

    pub fn router_address(&self) -> Address {
        self.config.router
    }

    /// Cancel the quote in flight, if any.
    pub fn cancel(&self) {
        self.requests.cancel();
    }

    /// Best trade spending exactly `amount_in` of `token_in`.
    pub async fn best_trade_exact_in(
        &self,
        token_in: Token,
        token_out: Token,
        amount_in: Decimal,
        options: TradeOptions,
    ) -> Result<TradeDataV3, Error> {
        let amount = requested_amount(token_in, amount_in)?;
        if token_in.address() == token_out.address() {
            return Err(SwapError::InvalidTokensForSwap.into());
        }

        let cancel = self.requests.begin();
        let trade = self
            .quote(TradeType::ExactIn, token_in, token_out, amount.raw, &cancel)
            .await?;
        info!(amount_out = %trade.amount_out.raw, path = %trade.path, "best exact-in trade");
        Ok(TradeDataV3::new(trade, options))
    }

    /// Best trade yielding exactly `amount_out` of `token_out`.
    pub async fn best_trade_exact_out(
        &self,
        token_in: Token,
        token_out: Token,
        amount_out: Decimal,
        options: TradeOptions,
    ) -> Result<TradeDataV3, Error> {
        let amount = requested_amount(token_out, amount_out)?;
        if token_in.address() == token_out.address() {
            return Err(SwapError::InvalidTokensForSwap.into());
        }

        let cancel = self.requests.begin();
        let trade = self
            .quote(TradeType::ExactOut, token_in, token_out, amount.raw, &cancel)
            .await?;
        info!(amount_in = %trade.amount_in.raw, path = %trade.path, "best exact-out trade");
        Ok(TradeDataV3::new(trade, options))
    }

    /// Quote a trade of `amount` raw units: the input for exact-in, the
    /// output for exact-out. A direct pool is preferred; without one the
    /// trade routes through the wrapped native token.
    pub async fn quote(
        &self,
        kind: TradeType,
        token_in: Token,
        token_out: Token,
        amount: U256,
        cancel: &CancelToken,
    ) -> Result<TradeV3, Error> {
        let (address_in, address_out) = (token_in.address(), token_out.address());

        let direct = self
            .best_single(kind, address_in, address_out, amount, cancel)
            .await?;
        let (path, quoted) = match direct {
            Some(tier) => {
                let item = match kind {
                    TradeType::ExactIn => SwapPathItem::new(address_in, address_out, tier.fee),
                    TradeType::ExactOut => SwapPathItem::new(address_out, address_in, tier.fee),
                };
                (SwapPath::single(item), tier.amount)
            }
            None => {
                debug!(%address_in, %address_out, "no direct pool, routing through wrapped native");
                self.quote_multihop(kind, address_in, address_out, amount, cancel)
                    .await?
                    .ok_or(SwapError::TradeNotFound)?
            }
        };

        let (amount_in, amount_out, hops) = match kind {
            TradeType::ExactIn => (amount, quoted, path.clone()),
            TradeType::ExactOut => (quoted, amount, path.reversed()),
        };
        let spot_price = self.spot_price(hops.items(), cancel).await?;

        Ok(TradeV3::new(
            kind,
            path,
            TokenAmount::new(token_in, amount_in),
            TokenAmount::new(token_out, amount_out),
            spot_price,
        ))
    }

    /// Quote every configured fee tier concurrently and keep the best.
    /// Tiers that revert are skipped; a transport failure or cancellation
    /// ends the whole search.
    pub async fn best_single(
        &self,
        kind: TradeType,
        token_in: Address,
        token_out: Address,
        amount: U256,
        cancel: &CancelToken,
    ) -> Result<Option<TierQuote>, Error> {
        let quotes = try_join_all(self.config.fee_tiers.iter().map(|&fee| async move {
            let quoted = self
                .quote_tier(kind, token_in, token_out, amount, fee, cancel)
                .await?;
            Ok::<_, Error>(quoted.map(|amount| TierQuote { fee, amount }))
        }))
        .await?;

        Ok(best_tier(kind, quotes.into_iter().flatten()))
    }

    async fn quote_tier(
        &self,
        kind: TradeType,
        token_in: Address,
        token_out: Address,
        amount: U256,
        fee: FeeAmount,
        cancel: &CancelToken,
    ) -> Result<Option<U256>, Error> {
        let fee_field = U24::from(fee.raw());
        let data: Bytes = match kind {
            TradeType::ExactIn => IQuoterV2::quoteExactInputSingleCall {
                params: IQuoterV2::QuoteExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    amountIn: amount,
                    fee: fee_field,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }
            .abi_encode()
            .into(),
            TradeType::ExactOut => IQuoterV2::quoteExactOutputSingleCall {
                params: IQuoterV2::QuoteExactOutputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    amount,
                    fee: fee_field,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }
            .abi_encode()
            .into(),
        };

        let answer = revert_as_none(
            call_with_cancel(&self.executor, cancel, self.config.quoter, data).await,
        )?;
        let quoted = answer.and_then(|bytes| match kind {
            TradeType::ExactIn => IQuoterV2::quoteExactInputSingleCall::abi_decode_returns(&bytes)
                .ok()
                .map(|quote| quote.amountOut),
            TradeType::ExactOut => IQuoterV2::quoteExactOutputSingleCall::abi_decode_returns(&bytes)
                .ok()
                .map(|quote| quote.amountIn),
        });

        match quoted {
            Some(quoted) => trace!(%fee, %quoted, "tier quoted"),
            None => trace!(%fee, "tier unavailable"),
        }
        Ok(quoted)
    }

    /// Two hops through the wrapped native token. Each leg picks its own best
    /// tier, then the combined path is quoted as a whole and that quote is
    /// the one kept.
    async fn quote_multihop(
        &self,
        kind: TradeType,
        token_in: Address,
        token_out: Address,
        amount: U256,
        cancel: &CancelToken,
    ) -> Result<Option<(SwapPath, U256)>, Error> {
        let weth = self.config.wrapped_native;
        if token_in == weth || token_out == weth {
            return Ok(None);
        }

        let path = match kind {
            TradeType::ExactIn => {
                let Some(first) = self.best_single(kind, token_in, weth, amount, cancel).await?
                else {
                    return Ok(None);
                };
                let Some(second) = self
                    .best_single(kind, weth, token_out, first.amount, cancel)
                    .await?
                else {
                    return Ok(None);
                };
                SwapPath::new(vec![
                    SwapPathItem::new(token_in, weth, first.fee),
                    SwapPathItem::new(weth, token_out, second.fee),
                ])?
            }
            TradeType::ExactOut => {
                let Some(last) = self.best_single(kind, weth, token_out, amount, cancel).await?
                else {
                    return Ok(None);
                };
                let Some(first) = self
                    .best_single(kind, token_in, weth, last.amount, cancel)
                    .await?
                else {
                    return Ok(None);
                };
                SwapPath::new(vec![
                    SwapPathItem::new(token_out, weth, last.fee),
                    SwapPathItem::new(weth, token_in, first.fee),
                ])?
            }
        };

        let data: Bytes = match kind {
            TradeType::ExactIn => IQuoterV2::quoteExactInputCall {
                path: path.encode(),
                amountIn: amount,
            }
            .abi_encode()
            .into(),
            TradeType::ExactOut => IQuoterV2::quoteExactOutputCall {
                path: path.encode(),
                amountOut: amount,
            }
            .abi_encode()
            .into(),
        };
        let answer = revert_as_none(
            call_with_cancel(&self.executor, cancel, self.config.quoter, data).await,
        )?;
        let quoted = answer.and_then(|bytes| match kind {
            TradeType::ExactIn => IQuoterV2::quoteExactInputCall::abi_decode_returns(&bytes)
                .ok()
                .map(|quote| quote.amountOut),
            TradeType::ExactOut => IQuoterV2::quoteExactOutputCall::abi_decode_returns(&bytes)
                .ok()
                .map(|quote| quote.amountIn),
        });

        debug!(%path, quoted = ?quoted, "quoted path through wrapped native");
        Ok(quoted.map(|quoted| (path, quoted)))
    }

    /// Product of the hops' spot prices, each oriented input to output.
    /// `None` if any pool on the way is missing or unreadable.
    async fn spot_price(
        &self,
        hops: &[SwapPathItem],
        cancel: &CancelToken,
    ) -> Result<Option<Fraction>, Error> {
        let prices = try_join_all(hops.iter().map(|hop| self.pool_price(hop, cancel))).await?;
        Ok(prices
            .into_iter()
            .try_fold(Fraction::one(), |product, price| price.map(|price| &product * &price)))
    }

    async fn pool_price(
        &self,
        hop: &SwapPathItem,
        cancel: &CancelToken,
    ) -> Result<Option<Fraction>, Error> {
        let data: Bytes = IUniswapV3Factory::getPoolCall {
            tokenA: hop.token_a,
            tokenB: hop.token_b,
            fee: U24::from(hop.fee.raw()),
        }
        .abi_encode()
        .into();
        let pool = revert_as_none(
            call_with_cancel(&self.executor, cancel, self.config.factory, data).await,
        )?
        .and_then(|bytes| IUniswapV3Factory::getPoolCall::abi_decode_returns(&bytes).ok())
        .filter(|pool| !pool.is_zero());

        let Some(pool) = pool else {
            debug!(token_a = %hop.token_a, token_b = %hop.token_b, fee = %hop.fee, "pool not found");
            return Ok(None);
        };

        let data: Bytes = IUniswapV3Pool::slot0Call {}.abi_encode().into();
        let sqrt_price = revert_as_none(call_with_cancel(&self.executor, cancel, pool, data).await)?
            .and_then(|bytes| IUniswapV3Pool::slot0Call::abi_decode_returns(&bytes).ok())
            .map(|slot| U256::from(slot.sqrtPriceX96));

        if sqrt_price.is_none() {
            debug!(%pool, "slot0 unavailable");
        }
        Ok(sqrt_price.map(|sqrt_price| hop_price(hop, Fraction::from_sqrt_price_x96(sqrt_price))))
    }

    /// Router call for `trade_data`, sent from `account`, with the deadline
    /// counted from now.
    pub fn transaction_data(
        &self,
        trade_data: &TradeDataV3,
        account: Address,
    ) -> Result<TransactionData, Error> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        build_transaction(&self.config, trade_data, account, now)
    }
}
