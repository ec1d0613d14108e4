//! Fee-tier quoting, the wrapped-native fallback and request cancellation.

mod common;

use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use common::{address_reply, path_quote, single_quote, slot0_reply, MockExecutor, Reply};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use swap_core::{
    FeeAmount, Fraction, SwapError, SwapPath, SwapPathItem, Token, TradeOptions, TradeType,
};
use swap_router::contracts::{IQuoterV2, IUniswapV3Factory, IUniswapV3Pool};
use swap_router::{CallExecutor, ConcentratedConfig, ConcentratedKit, DexType, Error};

const QUOTER: Address = Address::repeat_byte(0x51);
const FACTORY: Address = Address::repeat_byte(0xfa);
const ROUTER: Address = Address::repeat_byte(0x77);
const WETH: Address = Address::repeat_byte(0xee);
const POOL: Address = Address::repeat_byte(0x90);

fn config() -> ConcentratedConfig {
    ConcentratedConfig::new(DexType::Uniswap, ROUTER, FACTORY, QUOTER, WETH)
}

// Whole-unit tokens so decimal requests map straight to raw amounts.
fn token_a() -> Token {
    Token::erc20(Address::repeat_byte(0x0a), 0)
}

fn token_b() -> Token {
    Token::erc20(Address::repeat_byte(0x0b), 0)
}

fn quote_in(token_in: Address, token_out: Address, amount: u64, fee: FeeAmount) -> Bytes {
    IQuoterV2::quoteExactInputSingleCall {
        params: IQuoterV2::QuoteExactInputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            amountIn: U256::from(amount),
            fee: U24::from(fee.raw()),
            sqrtPriceLimitX96: U160::ZERO,
        },
    }
    .abi_encode()
    .into()
}

fn quote_out(token_in: Address, token_out: Address, amount: u64, fee: FeeAmount) -> Bytes {
    IQuoterV2::quoteExactOutputSingleCall {
        params: IQuoterV2::QuoteExactOutputSingleParams {
            tokenIn: token_in,
            tokenOut: token_out,
            amount: U256::from(amount),
            fee: U24::from(fee.raw()),
            sqrtPriceLimitX96: U160::ZERO,
        },
    }
    .abi_encode()
    .into()
}

fn get_pool(token_a: Address, token_b: Address, fee: FeeAmount) -> Bytes {
    IUniswapV3Factory::getPoolCall {
        tokenA: token_a,
        tokenB: token_b,
        fee: U24::from(fee.raw()),
    }
    .abi_encode()
    .into()
}

fn q96() -> U256 {
    U256::from(1u8) << 96usize
}

#[tokio::test]
async fn test_direct_quote_picks_best_tier() {
    let (a, b) = (token_a().address(), token_b().address());
    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_in(a, b, 100, FeeAmount::LOW), single_quote(90))
        .on_call(QUOTER, quote_in(a, b, 100, FeeAmount::MEDIUM), single_quote(95))
        .on_call(QUOTER, quote_in(a, b, 100, FeeAmount::HIGH), single_quote(95))
        .on_call(FACTORY, get_pool(a, b, FeeAmount::MEDIUM), address_reply(POOL))
        .on_selector(POOL, IUniswapV3Pool::slot0Call::SELECTOR, slot0_reply(q96()));
    let kit = ConcentratedKit::new(executor, config());

    let trade_data = kit
        .best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
        .await
        .unwrap();
    let trade = &trade_data.trade;

    assert_eq!(trade.kind(), TradeType::ExactIn);
    // the 1% tier ties with 0.3% and loses to the earlier tier
    assert_eq!(
        trade.path(),
        &SwapPath::single(SwapPathItem::new(a, b, FeeAmount::MEDIUM))
    );
    assert_eq!(trade.amount_in().raw, U256::from(100));
    assert_eq!(trade.amount_out().raw, U256::from(95));
    assert_eq!(trade.price_impact(), Some(Fraction::new(1, 20)));
    assert_eq!(trade_data.amount_out_min().raw, U256::from(94));
}

#[tokio::test]
async fn test_exact_out_orients_spot_price() {
    let (a, b) = (token_a().address(), token_b().address());
    // token0 is A; a quarter B per A means four A per B
    let sqrt_price = U256::from(1u8) << 95usize;
    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_out(b, a, 50, FeeAmount::LOW), single_quote(100))
        .on_call(FACTORY, get_pool(b, a, FeeAmount::LOW), address_reply(POOL))
        .on_selector(POOL, IUniswapV3Pool::slot0Call::SELECTOR, slot0_reply(sqrt_price));
    let kit = ConcentratedKit::new(executor, config());

    let trade_data = kit
        .best_trade_exact_out(token_b(), token_a(), dec!(50), TradeOptions::default())
        .await
        .unwrap();
    let trade = &trade_data.trade;

    assert_eq!(trade.kind(), TradeType::ExactOut);
    assert_eq!(
        trade.path(),
        &SwapPath::single(SwapPathItem::new(a, b, FeeAmount::LOW))
    );
    assert_eq!(trade.spot_price(), Some(&Fraction::from_integer(4)));
    assert_eq!(trade.price_impact(), Some(Fraction::new(7, 8)));
    assert_eq!(trade_data.amount_in_max().unwrap().raw, U256::from(101));
}

#[tokio::test]
async fn test_no_pool_anywhere_is_trade_not_found() {
    let kit = ConcentratedKit::new(MockExecutor::new(), config());

    let result = kit
        .best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
        .await;

    assert_eq!(result.unwrap_err(), Error::Swap(SwapError::TradeNotFound));
}

#[tokio::test]
async fn test_first_leg_failure_skips_second_leg() {
    let executor = Arc::new(MockExecutor::new());
    let kit = ConcentratedKit::new(executor.clone(), config());

    let _ = kit
        .best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
        .await;

    // four direct tiers, then four tiers for the first leg
    assert_eq!(executor.call_count(), 8);
}

#[tokio::test]
async fn test_transport_failure_aborts() {
    let executor = MockExecutor::new().on_selector(
        QUOTER,
        IQuoterV2::quoteExactInputSingleCall::SELECTOR,
        Reply::Transport,
    );
    let kit = ConcentratedKit::new(executor, config());

    let result = kit
        .best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
        .await;

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_zero_amount_makes_no_calls() {
    let executor = Arc::new(MockExecutor::new());
    let kit = ConcentratedKit::new(executor.clone(), config());

    let result = kit
        .best_trade_exact_in(token_a(), token_b(), dec!(0), TradeOptions::default())
        .await;

    assert_eq!(result.unwrap_err(), Error::Swap(SwapError::ZeroAmount));
    assert_eq!(executor.call_count(), 0);
}

#[tokio::test]
async fn test_exact_in_through_wrapped_native() {
    let (a, b) = (token_a().address(), token_b().address());
    let path = through_weth(FeeAmount::LOW, FeeAmount::MEDIUM);
    let whole_path = whole_path_in(&path, 100);

    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_in(a, WETH, 100, FeeAmount::LOW), single_quote(40))
        .on_call(QUOTER, quote_in(WETH, b, 40, FeeAmount::MEDIUM), single_quote(80))
        .on_call(QUOTER, whole_path, path_quote(79))
        .on_call(FACTORY, get_pool(a, WETH, FeeAmount::LOW), address_reply(POOL))
        .on_selector(POOL, IUniswapV3Pool::slot0Call::SELECTOR, slot0_reply(q96()));
    let kit = ConcentratedKit::new(executor, config());

    let trade = kit
        .best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
        .await
        .unwrap()
        .trade;

    assert_eq!(trade.kind(), TradeType::ExactIn);
    assert_eq!(trade.path(), &path);
    // the whole-path quote wins over the legs' product
    assert_eq!(trade.amount_out().raw, U256::from(79));
    // second hop has no readable pool
    assert_eq!(trade.price_impact(), None);
}

#[tokio::test]
async fn test_exact_out_through_wrapped_native() {
    let (a, b) = (token_a().address(), token_b().address());
    let path = SwapPath::new(vec![
        SwapPathItem::new(b, WETH, FeeAmount::HIGH),
        SwapPathItem::new(WETH, a, FeeAmount::LOWEST),
    ])
    .unwrap();
    let whole_path = IQuoterV2::quoteExactOutputCall {
        path: path.encode(),
        amountOut: U256::from(50),
    }
    .abi_encode();

    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_out(WETH, b, 50, FeeAmount::HIGH), single_quote(30))
        .on_call(QUOTER, quote_out(a, WETH, 30, FeeAmount::LOWEST), single_quote(70))
        .on_call(QUOTER, whole_path, path_quote(72));
    let kit = ConcentratedKit::new(executor, config());

    let trade_data = kit
        .best_trade_exact_out(token_a(), token_b(), dec!(50), TradeOptions::default())
        .await
        .unwrap();
    let trade = &trade_data.trade;

    assert_eq!(trade.kind(), TradeType::ExactOut);
    assert_eq!(trade.path(), &path);
    assert_eq!(trade.amount_in().raw, U256::from(72));
    assert_eq!(trade.amount_out().raw, U256::from(50));
    assert_eq!(trade_data.amount_in_max().unwrap().raw, U256::from(73));
}

fn through_weth(first: FeeAmount, second: FeeAmount) -> SwapPath {
    let (a, b) = (token_a().address(), token_b().address());
    SwapPath::new(vec![
        SwapPathItem::new(a, WETH, first),
        SwapPathItem::new(WETH, b, second),
    ])
    .unwrap()
}

fn whole_path_in(path: &SwapPath, amount: u64) -> Bytes {
    IQuoterV2::quoteExactInputCall {
        path: path.encode(),
        amountIn: U256::from(amount),
    }
    .abi_encode()
    .into()
}

/// A to WETH quotes 40 on the 0.05% tier, nothing else is scripted.
fn first_leg_only() -> MockExecutor {
    let a = token_a().address();
    MockExecutor::new().on_call(QUOTER, quote_in(a, WETH, 100, FeeAmount::LOW), single_quote(40))
}

async fn exact_in_a_to_b<E: CallExecutor>(kit: &ConcentratedKit<E>) -> Result<(), Error> {
    kit.best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
        .await
        .map(|_| ())
}

#[tokio::test]
async fn test_second_leg_failure_is_trade_not_found() {
    let executor = Arc::new(first_leg_only());
    let kit = ConcentratedKit::new(executor.clone(), config());

    assert_eq!(
        exact_in_a_to_b(&kit).await,
        Err(Error::Swap(SwapError::TradeNotFound))
    );
    // direct, first leg and second leg tiers; the whole path is never quoted
    assert_eq!(executor.call_count(), 12);
}

#[tokio::test]
async fn test_whole_path_revert_is_trade_not_found() {
    let b = token_b().address();
    let executor = Arc::new(first_leg_only().on_call(
        QUOTER,
        quote_in(WETH, b, 40, FeeAmount::MEDIUM),
        single_quote(80),
    ));
    let kit = ConcentratedKit::new(executor.clone(), config());

    assert_eq!(
        exact_in_a_to_b(&kit).await,
        Err(Error::Swap(SwapError::TradeNotFound))
    );
    assert_eq!(executor.call_count(), 13);
}

#[tokio::test]
async fn test_exact_out_whole_path_revert_is_trade_not_found() {
    let (a, b) = (token_a().address(), token_b().address());
    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_out(WETH, b, 50, FeeAmount::HIGH), single_quote(30))
        .on_call(QUOTER, quote_out(a, WETH, 30, FeeAmount::LOWEST), single_quote(70));
    let kit = ConcentratedKit::new(executor, config());

    let result = kit
        .best_trade_exact_out(token_a(), token_b(), dec!(50), TradeOptions::default())
        .await;

    assert_eq!(result.unwrap_err(), Error::Swap(SwapError::TradeNotFound));
}

#[tokio::test]
async fn test_second_leg_transport_failure_aborts() {
    let b = token_b().address();
    let executor =
        first_leg_only().on_call(QUOTER, quote_in(WETH, b, 40, FeeAmount::HIGH), Reply::Transport);
    let kit = ConcentratedKit::new(executor, config());

    assert!(matches!(exact_in_a_to_b(&kit).await, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_whole_path_transport_failure_aborts() {
    let b = token_b().address();
    let path = through_weth(FeeAmount::LOW, FeeAmount::MEDIUM);
    let executor = first_leg_only()
        .on_call(QUOTER, quote_in(WETH, b, 40, FeeAmount::MEDIUM), single_quote(80))
        .on_call(QUOTER, whole_path_in(&path, 100), Reply::Transport);
    let kit = ConcentratedKit::new(executor, config());

    assert!(matches!(exact_in_a_to_b(&kit).await, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_pool_lookup_transport_failure_aborts() {
    let (a, b) = (token_a().address(), token_b().address());
    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_in(a, b, 100, FeeAmount::LOW), single_quote(90))
        .on_selector(FACTORY, IUniswapV3Factory::getPoolCall::SELECTOR, Reply::Transport);
    let kit = ConcentratedKit::new(executor, config());

    assert!(matches!(exact_in_a_to_b(&kit).await, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_slot0_transport_failure_aborts() {
    let (a, b) = (token_a().address(), token_b().address());
    let executor = MockExecutor::new()
        .on_call(QUOTER, quote_in(a, b, 100, FeeAmount::LOW), single_quote(90))
        .on_call(FACTORY, get_pool(a, b, FeeAmount::LOW), address_reply(POOL))
        .on_selector(POOL, IUniswapV3Pool::slot0Call::SELECTOR, Reply::Transport);
    let kit = ConcentratedKit::new(executor, config());

    assert!(matches!(exact_in_a_to_b(&kit).await, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_cancel_aborts_pending_quote() {
    let executor = MockExecutor::new().on_selector(
        QUOTER,
        IQuoterV2::quoteExactInputSingleCall::SELECTOR,
        Reply::Hang,
    );
    let kit = Arc::new(ConcentratedKit::new(executor, config()));

    let pending = {
        let kit = kit.clone();
        tokio::spawn(async move {
            kit.best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    kit.cancel();

    assert_eq!(pending.await.unwrap().unwrap_err(), Error::Cancelled);
}

#[tokio::test]
async fn test_new_request_supersedes_previous() {
    let executor = MockExecutor::new().on_selector(
        QUOTER,
        IQuoterV2::quoteExactInputSingleCall::SELECTOR,
        Reply::Hang,
    );
    let kit = Arc::new(ConcentratedKit::new(executor, config()));

    let spawn_quote = |kit: Arc<ConcentratedKit<MockExecutor>>| {
        tokio::spawn(async move {
            kit.best_trade_exact_in(token_a(), token_b(), dec!(100), TradeOptions::default())
                .await
        })
    };

    let first = spawn_quote(kit.clone());
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = spawn_quote(kit.clone());

    assert_eq!(first.await.unwrap().unwrap_err(), Error::Cancelled);

    kit.cancel();
    assert_eq!(second.await.unwrap().unwrap_err(), Error::Cancelled);
}
