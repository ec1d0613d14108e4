//! Calldata for the concentrated-liquidity router.

use crate::concentrated::TradeDataV3;
use crate::config::{ConcentratedConfig, RouterVersion};
use crate::contracts::{IPeripheryPayments, ISwapRouter, ISwapRouter02};
use crate::error::Error;
use crate::transaction::TransactionData;
use alloy_primitives::aliases::{U160, U24};
use alloy_primitives::{address, Address, Bytes, U256};
use alloy_sol_types::SolCall;
use swap_core::{SwapError, TradeType};
use tracing::debug;

/// Recipient that tells the router to keep the output itself, so a later
/// call in the same multicall can unwrap it.
pub const ADDRESS_THIS: Address = address!("0000000000000000000000000000000000000002");

/// Amounts and addresses shared by every swap-call shape.
struct SwapArgs {
    token_in: Address,
    token_out: Address,
    fee: U24,
    recipient: Address,
    deadline: U256,
    amount_in: U256,
    amount_out: U256,
    amount_out_min: U256,
    amount_in_max: U256,
    path: Bytes,
}

fn swap_call(version: RouterVersion, kind: TradeType, single: bool, args: SwapArgs) -> Vec<u8> {
    match (version, kind, single) {
        (RouterVersion::V1, TradeType::ExactIn, true) => ISwapRouter::exactInputSingleCall {
            params: ISwapRouter::ExactInputSingleParams {
                tokenIn: args.token_in,
                tokenOut: args.token_out,
                fee: args.fee,
                recipient: args.recipient,
                deadline: args.deadline,
                amountIn: args.amount_in,
                amountOutMinimum: args.amount_out_min,
                sqrtPriceLimitX96: U160::ZERO,
            },
        }
        .abi_encode(),
        (RouterVersion::V1, TradeType::ExactIn, false) => ISwapRouter::exactInputCall {
            params: ISwapRouter::ExactInputParams {
                path: args.path,
                recipient: args.recipient,
                deadline: args.deadline,
                amountIn: args.amount_in,
                amountOutMinimum: args.amount_out_min,
            },
        }
        .abi_encode(),
        (RouterVersion::V1, TradeType::ExactOut, true) => ISwapRouter::exactOutputSingleCall {
            params: ISwapRouter::ExactOutputSingleParams {
                tokenIn: args.token_in,
                tokenOut: args.token_out,
                fee: args.fee,
                recipient: args.recipient,
                deadline: args.deadline,
                amountOut: args.amount_out,
                amountInMaximum: args.amount_in_max,
                sqrtPriceLimitX96: U160::ZERO,
            },
        }
        .abi_encode(),
        (RouterVersion::V1, TradeType::ExactOut, false) => ISwapRouter::exactOutputCall {
            params: ISwapRouter::ExactOutputParams {
                path: args.path,
                recipient: args.recipient,
                deadline: args.deadline,
                amountOut: args.amount_out,
                amountInMaximum: args.amount_in_max,
            },
        }
        .abi_encode(),
        (RouterVersion::V2, TradeType::ExactIn, true) => ISwapRouter02::exactInputSingleCall {
            params: ISwapRouter02::ExactInputSingleParams {
                tokenIn: args.token_in,
                tokenOut: args.token_out,
                fee: args.fee,
                recipient: args.recipient,
                amountIn: args.amount_in,
                amountOutMinimum: args.amount_out_min,
                sqrtPriceLimitX96: U160::ZERO,
            },
        }
        .abi_encode(),
        (RouterVersion::V2, TradeType::ExactIn, false) => ISwapRouter02::exactInputCall {
            params: ISwapRouter02::ExactInputParams {
                path: args.path,
                recipient: args.recipient,
                amountIn: args.amount_in,
                amountOutMinimum: args.amount_out_min,
            },
        }
        .abi_encode(),
        (RouterVersion::V2, TradeType::ExactOut, true) => ISwapRouter02::exactOutputSingleCall {
            params: ISwapRouter02::ExactOutputSingleParams {
                tokenIn: args.token_in,
                tokenOut: args.token_out,
                fee: args.fee,
                recipient: args.recipient,
                amountOut: args.amount_out,
                amountInMaximum: args.amount_in_max,
                sqrtPriceLimitX96: U160::ZERO,
            },
        }
        .abi_encode(),
        (RouterVersion::V2, TradeType::ExactOut, false) => ISwapRouter02::exactOutputCall {
            params: ISwapRouter02::ExactOutputParams {
                path: args.path,
                recipient: args.recipient,
                amountOut: args.amount_out,
                amountInMaximum: args.amount_in_max,
            },
        }
        .abi_encode(),
    }
}

/// Encode the router call for a concentrated trade. `now` is the current unix
/// time in seconds; only the first router generation reads the deadline.
///
/// Native output routes the swap to [`ADDRESS_THIS`] and appends
/// `unwrapWETH9`. Native input on an exact-out trade appends `refundETH` for
/// the unspent part of the slippage allowance. Several calls are wrapped in
/// one `multicall` in the order swap, refund, unwrap.
pub fn build_transaction(
    config: &ConcentratedConfig,
    trade_data: &TradeDataV3,
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

    let kind = trade.kind();
    let recipient = options.recipient.unwrap_or(account);
    let unwrap = token_out.is_native();
    let refund = token_in.is_native() && kind == TradeType::ExactOut;

    let amount_out_min = trade_data.amount_out_min().raw;
    let amount_in_max = trade_data.amount_in_max()?.raw;

    let args = SwapArgs {
        token_in: token_in.address(),
        token_out: token_out.address(),
        fee: U24::from(trade.path().first_fee().raw()),
        recipient: if unwrap { ADDRESS_THIS } else { recipient },
        deadline: U256::from(now.saturating_add(options.ttl.as_secs())),
        amount_in: trade.amount_in().raw,
        amount_out: trade.amount_out().raw,
        amount_out_min,
        amount_in_max,
        path: trade.path().encode(),
    };

    let mut calls = vec![swap_call(
        config.router_version,
        kind,
        trade.path().is_single(),
        args,
    )];
    if refund {
        calls.push(IPeripheryPayments::refundETHCall {}.abi_encode());
    }
    if unwrap {
        calls.push(
            IPeripheryPayments::unwrapWETH9Call {
                amountMinimum: amount_out_min,
                recipient,
            }
            .abi_encode(),
        );
    }

    let input = if calls.len() > 1 {
        IPeripheryPayments::multicallCall {
            data: calls.into_iter().map(Bytes::from).collect(),
        }
        .abi_encode()
    } else {
        calls.concat()
    };

    let value = match (token_in.is_native(), kind) {
        (false, _) => U256::ZERO,
        (true, TradeType::ExactIn) => trade.amount_in().raw,
        (true, TradeType::ExactOut) => amount_in_max,
    };

    debug!(
        router = %config.router,
        version = ?config.router_version,
        selector = %hex::encode(&input[..4]),
        %value,
        refund,
        unwrap,
        "built concentrated swap"
    );
    Ok(TransactionData::new(config.router, value, input.into()))
}
