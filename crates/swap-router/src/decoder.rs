//! Read router calldata back into the swap it performs.
//!
//! Works from the calldata and attached value alone: amounts are what the
//! call commits to, not what a mined transaction actually moved.

use crate::contracts::{selectors, IPeripheryPayments, ISwapRouter, ISwapRouter02, IUniswapV2Router02};
use crate::error::DecodeError;
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use swap_core::SwapPath;
use tracing::trace;

/// A side of a decoded swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapToken {
    Native,
    Erc20(Address),
}

/// A decoded amount: fixed by the call, or the bound the call enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodedAmount {
    Exact(U256),
    /// Minimum output or maximum input.
    Extremum(U256),
}

impl DecodedAmount {
    pub fn value(&self) -> U256 {
        match self {
            DecodedAmount::Exact(value) | DecodedAmount::Extremum(value) => *value,
        }
    }
}

/// What a router call swaps, and for whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapDecoration {
    pub contract: Address,
    pub token_in: SwapToken,
    pub token_out: SwapToken,
    pub amount_in: DecodedAmount,
    pub amount_out: DecodedAmount,
    /// `None` when the output goes back to the sender.
    pub recipient: Option<Address>,
    /// Only calls that carry one, which excludes the second router
    /// generation.
    pub deadline: Option<U256>,
}

/// Recognises classic and concentrated router calls on one chain.
#[derive(Debug, Clone, Copy)]
pub struct SwapDecoder {
    wrapped_native: Address,
}

/// Decode one call, mapping failure into [`DecodeError::InvalidCalldata`].
fn decode<C: SolCall>(calldata: &[u8]) -> Result<C, DecodeError> {
    C::abi_decode(calldata).map_err(|e| {
        DecodeError::InvalidCalldata(format!("failed to decode {}: {}", C::SIGNATURE, e))
    })
}

fn path_ends(path: &[Address]) -> Result<(Address, Address), DecodeError> {
    match (path.first(), path.last()) {
        (Some(first), Some(last)) => Ok((*first, *last)),
        _ => Err(DecodeError::InvalidCalldata("empty swap path".to_string())),
    }
}

fn packed_path(path: &[u8]) -> Result<SwapPath, DecodeError> {
    SwapPath::decode(path).map_err(|e| DecodeError::InvalidCalldata(e.to_string()))
}

impl SwapDecoder {
    pub fn new(wrapped_native: Address) -> Self {
        Self { wrapped_native }
    }

    /// Decode a call `sender` sent to `contract` with `value` attached.
    pub fn decode(
        &self,
        sender: Address,
        contract: Address,
        calldata: &[u8],
        value: U256,
    ) -> Result<SwapDecoration, DecodeError> {
        let mut decoration = self.decode_call(contract, calldata, value)?;
        decoration.recipient = decoration.recipient.filter(|recipient| *recipient != sender);
        Ok(decoration)
    }

    fn decode_call(
        &self,
        contract: Address,
        calldata: &[u8],
        value: U256,
    ) -> Result<SwapDecoration, DecodeError> {
        if calldata.len() < 4 {
            return Err(DecodeError::InvalidCalldata(
                "calldata too short for function selector".to_string(),
            ));
        }

        let selector = &calldata[0..4];
        trace!(selector = %hex::encode(selector), "decoding router call");

        match selector {
            s if s == selectors::MULTICALL.as_slice() => {
                self.decode_multicall(contract, calldata, value)
            }
            s if s == selectors::SWAP_EXACT_TOKENS_FOR_TOKENS.as_slice() => {
                let call = decode::<IUniswapV2Router02::swapExactTokensForTokensCall>(calldata)?;
                let (token_in, token_out) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Erc20(token_in),
                    token_out: SwapToken::Erc20(token_out),
                    amount_in: DecodedAmount::Exact(call.amountIn),
                    amount_out: DecodedAmount::Extremum(call.amountOutMin),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_EXACT_TOKENS_FOR_TOKENS_FOT.as_slice() => {
                let call = decode::<
                    IUniswapV2Router02::swapExactTokensForTokensSupportingFeeOnTransferTokensCall,
                >(calldata)?;
                let (token_in, token_out) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Erc20(token_in),
                    token_out: SwapToken::Erc20(token_out),
                    amount_in: DecodedAmount::Exact(call.amountIn),
                    amount_out: DecodedAmount::Extremum(call.amountOutMin),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_TOKENS_FOR_EXACT_TOKENS.as_slice() => {
                let call = decode::<IUniswapV2Router02::swapTokensForExactTokensCall>(calldata)?;
                let (token_in, token_out) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Erc20(token_in),
                    token_out: SwapToken::Erc20(token_out),
                    amount_in: DecodedAmount::Extremum(call.amountInMax),
                    amount_out: DecodedAmount::Exact(call.amountOut),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_EXACT_ETH_FOR_TOKENS.as_slice() => {
                let call = decode::<IUniswapV2Router02::swapExactETHForTokensCall>(calldata)?;
                let (_, token_out) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Native,
                    token_out: SwapToken::Erc20(token_out),
                    amount_in: DecodedAmount::Exact(value),
                    amount_out: DecodedAmount::Extremum(call.amountOutMin),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_EXACT_ETH_FOR_TOKENS_FOT.as_slice() => {
                let call = decode::<
                    IUniswapV2Router02::swapExactETHForTokensSupportingFeeOnTransferTokensCall,
                >(calldata)?;
                let (_, token_out) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Native,
                    token_out: SwapToken::Erc20(token_out),
                    amount_in: DecodedAmount::Exact(value),
                    amount_out: DecodedAmount::Extremum(call.amountOutMin),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_ETH_FOR_EXACT_TOKENS.as_slice() => {
                let call = decode::<IUniswapV2Router02::swapETHForExactTokensCall>(calldata)?;
                let (_, token_out) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Native,
                    token_out: SwapToken::Erc20(token_out),
                    amount_in: DecodedAmount::Extremum(value),
                    amount_out: DecodedAmount::Exact(call.amountOut),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_EXACT_TOKENS_FOR_ETH.as_slice() => {
                let call = decode::<IUniswapV2Router02::swapExactTokensForETHCall>(calldata)?;
                let (token_in, _) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Erc20(token_in),
                    token_out: SwapToken::Native,
                    amount_in: DecodedAmount::Exact(call.amountIn),
                    amount_out: DecodedAmount::Extremum(call.amountOutMin),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_EXACT_TOKENS_FOR_ETH_FOT.as_slice() => {
                let call = decode::<
                    IUniswapV2Router02::swapExactTokensForETHSupportingFeeOnTransferTokensCall,
                >(calldata)?;
                let (token_in, _) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Erc20(token_in),
                    token_out: SwapToken::Native,
                    amount_in: DecodedAmount::Exact(call.amountIn),
                    amount_out: DecodedAmount::Extremum(call.amountOutMin),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::SWAP_TOKENS_FOR_EXACT_ETH.as_slice() => {
                let call = decode::<IUniswapV2Router02::swapTokensForExactETHCall>(calldata)?;
                let (token_in, _) = path_ends(&call.path)?;
                Ok(SwapDecoration {
                    contract,
                    token_in: SwapToken::Erc20(token_in),
                    token_out: SwapToken::Native,
                    amount_in: DecodedAmount::Extremum(call.amountInMax),
                    amount_out: DecodedAmount::Exact(call.amountOut),
                    recipient: Some(call.to),
                    deadline: Some(call.deadline),
                })
            }
            s if s == selectors::EXACT_INPUT_SINGLE_V1.as_slice() => {
                let p = decode::<ISwapRouter::exactInputSingleCall>(calldata)?.params;
                Ok(self.exact_in(
                    contract,
                    value,
                    p.tokenIn,
                    p.tokenOut,
                    p.amountIn,
                    p.amountOutMinimum,
                    p.recipient,
                    Some(p.deadline),
                ))
            }
            s if s == selectors::EXACT_INPUT_SINGLE.as_slice() => {
                let p = decode::<ISwapRouter02::exactInputSingleCall>(calldata)?.params;
                Ok(self.exact_in(
                    contract,
                    value,
                    p.tokenIn,
                    p.tokenOut,
                    p.amountIn,
                    p.amountOutMinimum,
                    p.recipient,
                    None,
                ))
            }
            s if s == selectors::EXACT_INPUT_V1.as_slice() => {
                let p = decode::<ISwapRouter::exactInputCall>(calldata)?.params;
                let path = packed_path(&p.path)?;
                Ok(self.exact_in(
                    contract,
                    value,
                    path.token_in(),
                    path.token_out(),
                    p.amountIn,
                    p.amountOutMinimum,
                    p.recipient,
                    Some(p.deadline),
                ))
            }
            s if s == selectors::EXACT_INPUT.as_slice() => {
                let p = decode::<ISwapRouter02::exactInputCall>(calldata)?.params;
                let path = packed_path(&p.path)?;
                Ok(self.exact_in(
                    contract,
                    value,
                    path.token_in(),
                    path.token_out(),
                    p.amountIn,
                    p.amountOutMinimum,
                    p.recipient,
                    None,
                ))
            }
            s if s == selectors::EXACT_OUTPUT_SINGLE_V1.as_slice() => {
                let p = decode::<ISwapRouter::exactOutputSingleCall>(calldata)?.params;
                Ok(self.exact_out(
                    contract,
                    value,
                    p.tokenIn,
                    p.tokenOut,
                    p.amountOut,
                    p.amountInMaximum,
                    p.recipient,
                    Some(p.deadline),
                ))
            }
            s if s == selectors::EXACT_OUTPUT_SINGLE.as_slice() => {
                let p = decode::<ISwapRouter02::exactOutputSingleCall>(calldata)?.params;
                Ok(self.exact_out(
                    contract,
                    value,
                    p.tokenIn,
                    p.tokenOut,
                    p.amountOut,
                    p.amountInMaximum,
                    p.recipient,
                    None,
                ))
            }
            // exact-output paths run from the output back to the input
            s if s == selectors::EXACT_OUTPUT_V1.as_slice() => {
                let p = decode::<ISwapRouter::exactOutputCall>(calldata)?.params;
                let path = packed_path(&p.path)?;
                Ok(self.exact_out(
                    contract,
                    value,
                    path.token_out(),
                    path.token_in(),
                    p.amountOut,
                    p.amountInMaximum,
                    p.recipient,
                    Some(p.deadline),
                ))
            }
            s if s == selectors::EXACT_OUTPUT.as_slice() => {
                let p = decode::<ISwapRouter02::exactOutputCall>(calldata)?.params;
                let path = packed_path(&p.path)?;
                Ok(self.exact_out(
                    contract,
                    value,
                    path.token_out(),
                    path.token_in(),
                    p.amountOut,
                    p.amountInMaximum,
                    p.recipient,
                    None,
                ))
            }
            _ => {
                let mut unknown = [0u8; 4];
                unknown.copy_from_slice(selector);
                Err(DecodeError::UnknownSelector(unknown))
            }
        }
    }

    /// The swap inside a multicall. A trailing `unwrapWETH9` turns the output
    /// native and names the real recipient; calls that are not swaps are
    /// skipped. Only one level of multicall is decoded.
    fn decode_multicall(
        &self,
        contract: Address,
        calldata: &[u8],
        value: U256,
    ) -> Result<SwapDecoration, DecodeError> {
        let calls = decode::<IPeripheryPayments::multicallCall>(calldata)?.data;

        let mut swap = None;
        let mut unwrap_to = None;
        for call in &calls {
            match call.get(..4) {
                Some(s) if s == selectors::UNWRAP_WETH9.as_slice() => {
                    unwrap_to = Some(decode::<IPeripheryPayments::unwrapWETH9Call>(call)?.recipient);
                }
                Some(s) if s == selectors::REFUND_ETH.as_slice() => {}
                Some(s) if s == selectors::MULTICALL.as_slice() => {
                    return Err(DecodeError::InvalidCalldata("nested multicall".to_string()));
                }
                _ if swap.is_some() => {}
                _ => match self.decode_call(contract, call, value) {
                    Ok(decoration) => swap = Some(decoration),
                    Err(DecodeError::UnknownSelector(_)) => {}
                    Err(e) => return Err(e),
                },
            }
        }

        let mut swap = swap.ok_or_else(|| {
            DecodeError::InvalidCalldata("multicall carries no swap".to_string())
        })?;
        if let Some(recipient) = unwrap_to {
            swap.token_out = SwapToken::Native;
            swap.recipient = Some(recipient);
        }
        Ok(swap)
    }

    fn token_in(&self, token: Address, value: U256) -> SwapToken {
        if !value.is_zero() && token == self.wrapped_native {
            SwapToken::Native
        } else {
            SwapToken::Erc20(token)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn exact_in(
        &self,
        contract: Address,
        value: U256,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out_minimum: U256,
        recipient: Address,
        deadline: Option<U256>,
    ) -> SwapDecoration {
        let token_in = self.token_in(token_in, value);
        let amount_in = match token_in {
            SwapToken::Native => value,
            SwapToken::Erc20(_) => amount_in,
        };
        SwapDecoration {
            contract,
            token_in,
            token_out: SwapToken::Erc20(token_out),
            amount_in: DecodedAmount::Exact(amount_in),
            amount_out: DecodedAmount::Extremum(amount_out_minimum),
            recipient: Some(recipient),
            deadline,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn exact_out(
        &self,
        contract: Address,
        value: U256,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
        amount_in_maximum: U256,
        recipient: Address,
        deadline: Option<U256>,
    ) -> SwapDecoration {
        SwapDecoration {
            contract,
            token_in: self.token_in(token_in, value),
            token_out: SwapToken::Erc20(token_out),
            amount_in: DecodedAmount::Extremum(amount_in_maximum),
            amount_out: DecodedAmount::Exact(amount_out),
            recipient: Some(recipient),
            deadline,
        }
    }
}
