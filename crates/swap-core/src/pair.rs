//! Constant-product pools with a 0.30% fee.

use crate::error::SwapError;
use crate::fraction::{big, to_u256, Fraction, Price};
use crate::types::{Address, Token, TokenAmount, B256};
use alloy::primitives::keccak256;
use num_bigint::BigInt;
use num_traits::One;
use std::fmt;

/// Fee numerator and denominator: 997/1000 of the input reaches the curve.
const FEE_NUMERATOR: u32 = 997;
const FEE_DENOMINATOR: u32 = 1000;

/// Derive a pool's address from its factory and init-code hash.
///
/// `last20(keccak256(0xff ++ factory ++ keccak256(token0 ++ token1) ++ init_code_hash))`
/// with the tokens in canonical order.
pub fn pair_address(
    factory: Address,
    init_code_hash: B256,
    token_a: Address,
    token_b: Address,
) -> Address {
    let (token0, token1) = if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    };

    let mut tokens = [0u8; 40];
    tokens[..20].copy_from_slice(token0.as_slice());
    tokens[20..].copy_from_slice(token1.as_slice());
    let salt = keccak256(tokens);

    let mut data = [0u8; 85];
    data[0] = 0xff;
    data[1..21].copy_from_slice(factory.as_slice());
    data[21..53].copy_from_slice(salt.as_slice());
    data[53..].copy_from_slice(init_code_hash.as_slice());

    Address::from_slice(&keccak256(data)[12..])
}

/// A snapshot of a classic pool's reserves.
///
/// Reserves are kept in canonical order: `reserve0` belongs to the token whose
/// address sorts first. Tokens are matched by on-chain address, so the native
/// coin is accepted wherever its wrapped token is held.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    reserve0: TokenAmount,
    reserve1: TokenAmount,
}

impl Pair {
    /// Create a pair from two reserves in any order.
    pub fn new(reserve_a: TokenAmount, reserve_b: TokenAmount) -> Result<Self, SwapError> {
        if reserve_a.token.address() == reserve_b.token.address() {
            return Err(SwapError::InvalidTokensForSwap);
        }
        let (reserve0, reserve1) = if reserve_a.token.sorts_before(&reserve_b.token) {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        Ok(Self { reserve0, reserve1 })
    }

    pub fn token0(&self) -> &Token {
        &self.reserve0.token
    }

    pub fn token1(&self) -> &Token {
        &self.reserve1.token
    }

    pub fn reserve0(&self) -> &TokenAmount {
        &self.reserve0
    }

    pub fn reserve1(&self) -> &TokenAmount {
        &self.reserve1
    }

    /// Identity of the pool, independent of its reserves.
    pub fn key(&self) -> (Address, Address) {
        (self.reserve0.token.address(), self.reserve1.token.address())
    }

    /// Address of this pool under the given factory.
    pub fn address(&self, factory: Address, init_code_hash: B256) -> Address {
        let (token0, token1) = self.key();
        pair_address(factory, init_code_hash, token0, token1)
    }

    /// Check if this pair holds the given token.
    pub fn involves(&self, token: &Token) -> bool {
        let address = token.address();
        self.reserve0.token.address() == address || self.reserve1.token.address() == address
    }

    /// Get the other token in the pair.
    pub fn other_token(&self, token: &Token) -> Option<Token> {
        let address = token.address();
        if self.reserve0.token.address() == address {
            Some(self.reserve1.token)
        } else if self.reserve1.token.address() == address {
            Some(self.reserve0.token)
        } else {
            None
        }
    }

    pub fn reserve_of(&self, token: &Token) -> Result<&TokenAmount, SwapError> {
        let address = token.address();
        if self.reserve0.token.address() == address {
            Ok(&self.reserve0)
        } else if self.reserve1.token.address() == address {
            Ok(&self.reserve1)
        } else {
            Err(SwapError::InvalidToken)
        }
    }

    /// Spot price of token0 in token1.
    pub fn token0_price(&self) -> Option<Price> {
        if self.reserve0.is_zero() {
            return None;
        }
        Some(Price::new(
            self.reserve0.token,
            self.reserve1.token,
            self.reserve0.raw,
            self.reserve1.raw,
        ))
    }

    /// Spot price of token1 in token0.
    pub fn token1_price(&self) -> Option<Price> {
        if self.reserve1.is_zero() {
            return None;
        }
        Some(Price::new(
            self.reserve1.token,
            self.reserve0.token,
            self.reserve1.raw,
            self.reserve0.raw,
        ))
    }

    /// Spot price of `token` in the other token of the pair.
    pub fn price_of(&self, token: &Token) -> Result<Price, SwapError> {
        let address = token.address();
        let price = if self.reserve0.token.address() == address {
            self.token0_price()
        } else if self.reserve1.token.address() == address {
            self.token1_price()
        } else {
            return Err(SwapError::InvalidToken);
        };
        price.ok_or(SwapError::InsufficientReserves)
    }

    /// Reserves ordered as (input side, output side).
    fn oriented(&self, token_in: &Token) -> Result<(&TokenAmount, &TokenAmount), SwapError> {
        let address = token_in.address();
        let (reserve_in, reserve_out) = if self.reserve0.token.address() == address {
            (&self.reserve0, &self.reserve1)
        } else if self.reserve1.token.address() == address {
            (&self.reserve1, &self.reserve0)
        } else {
            return Err(SwapError::InvalidToken);
        };

        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(SwapError::InsufficientReserves);
        }
        Ok((reserve_in, reserve_out))
    }

    /// Output received for an exact input, rounded down.
    pub fn amount_out(&self, input: &TokenAmount) -> Result<TokenAmount, SwapError> {
        let (reserve_in, reserve_out) = self.oriented(&input.token)?;

        let amount_in_with_fee = big(input.raw) * FEE_NUMERATOR;
        let numerator = &amount_in_with_fee * big(reserve_out.raw);
        let denominator = big(reserve_in.raw) * FEE_DENOMINATOR + amount_in_with_fee;
        let amount_out = numerator / denominator;

        if amount_out >= big(reserve_out.raw) {
            return Err(SwapError::InsufficientReserveOut);
        }
        let raw = to_u256(&amount_out).ok_or(SwapError::AmountOverflow)?;
        Ok(TokenAmount::new(reserve_out.token, raw))
    }

    /// Input required for an exact output, rounded up.
    pub fn amount_in(&self, output: &TokenAmount) -> Result<TokenAmount, SwapError> {
        let token_in = self
            .other_token(&output.token)
            .ok_or(SwapError::InvalidToken)?;
        let (reserve_in, reserve_out) = self.oriented(&token_in)?;

        if output.raw >= reserve_out.raw {
            return Err(SwapError::InsufficientReserveOut);
        }

        let numerator = big(reserve_in.raw) * big(output.raw) * FEE_DENOMINATOR;
        let denominator = (big(reserve_out.raw) - big(output.raw)) * FEE_NUMERATOR;
        let amount_in: BigInt = numerator / denominator + BigInt::one();

        let raw = to_u256(&amount_in).ok_or(SwapError::AmountOverflow)?;
        Ok(TokenAmount::new(reserve_in.token, raw))
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({} / {})",
            self.reserve0.token, self.reserve1.token, self.reserve0.raw, self.reserve1.raw
        )
    }
}

/// Share of each hop's input that reaches the curve after the pool fee.
pub(crate) fn fee_complement() -> Fraction {
    Fraction::new(FEE_NUMERATOR, FEE_DENOMINATOR)
}
