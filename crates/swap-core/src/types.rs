//! Core type definitions for the swap engine.
//!
//! Re-exports from alloy-primitives for Ethereum-compatible types.

use crate::error::SwapError;
use crate::fraction::{big, Fraction};
use rust_decimal::Decimal;
use std::fmt;

pub use alloy::primitives::{Address, Bytes, B256, U256};

/// Amount of tokens in the smallest unit (wei for the native coin).
pub type Amount = U256;

/// Decimal count of every EVM native coin.
pub const NATIVE_DECIMALS: u8 = 18;

/// A tradeable asset.
///
/// The native coin cannot sit in a pool itself, so it carries the address of
/// the chain's wrapped representation and prices through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// The chain's native coin, priced through its wrapped token.
    Native { wrapped: Address },
    /// A contract token.
    Erc20 { address: Address, decimals: u8 },
}

impl Token {
    pub fn native(wrapped: Address) -> Self {
        Token::Native { wrapped }
    }

    pub fn erc20(address: Address, decimals: u8) -> Self {
        Token::Erc20 { address, decimals }
    }

    /// Address used on-chain for this token. For the native coin this is the
    /// wrapped token address.
    pub fn address(&self) -> Address {
        match self {
            Token::Native { wrapped } => *wrapped,
            Token::Erc20 { address, .. } => *address,
        }
    }

    pub fn decimals(&self) -> u8 {
        match self {
            Token::Native { .. } => NATIVE_DECIMALS,
            Token::Erc20 { decimals, .. } => *decimals,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Token::Native { .. })
    }

    /// The token as it sits in a pool: the native coin becomes its wrapped
    /// contract token.
    pub fn wrapped(&self) -> Token {
        match self {
            Token::Native { wrapped } => Token::erc20(*wrapped, NATIVE_DECIMALS),
            erc20 => *erc20,
        }
    }

    /// Canonical pool ordering: lowercase hex address comparison, which is
    /// the same as comparing the raw address bytes.
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address() < other.address()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Native { .. } => write!(f, "[native]"),
            Token::Erc20 { address, .. } => write!(f, "[erc20: {}]", address),
        }
    }
}

/// A raw amount of a specific token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    pub token: Token,
    pub raw: Amount,
}

impl TokenAmount {
    pub fn new(token: Token, raw: Amount) -> Self {
        Self { token, raw }
    }

    pub fn zero(token: Token) -> Self {
        Self::new(token, U256::ZERO)
    }

    /// Convert a human-readable amount into raw units, truncating any digits
    /// beyond the token's precision.
    pub fn from_decimal(token: Token, value: Decimal) -> Result<Self, SwapError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(SwapError::ZeroAmount);
        }

        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let scale = value.scale();
        let decimals = u32::from(token.decimals());
        let ten = U256::from(10);

        let raw = if decimals >= scale {
            ten.checked_pow(U256::from(decimals - scale))
                .and_then(|factor| mantissa.checked_mul(factor))
        } else {
            ten.checked_pow(U256::from(scale - decimals))
                .map(|divisor| mantissa / divisor)
        };

        raw.map(|raw| Self::new(token, raw))
            .ok_or(SwapError::AmountOverflow)
    }

    /// Human-readable amount. Display and estimation only.
    pub fn decimal_amount(&self) -> Option<Decimal> {
        let decimals = u32::from(self.token.decimals());
        let unit = num_traits::pow(num_bigint::BigInt::from(10), decimals as usize);
        Fraction::new(big(self.raw), unit).to_decimal(decimals)
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.raw, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usdc() -> Token {
        Token::erc20(Address::repeat_byte(0x01), 6)
    }

    #[test]
    fn test_native_prices_through_wrapped() {
        let weth = Address::repeat_byte(0xee);
        let eth = Token::native(weth);

        assert_eq!(eth.address(), weth);
        assert_eq!(eth.decimals(), 18);
        assert!(eth.is_native());
        assert_ne!(eth, Token::erc20(weth, 18));
        assert_eq!(eth.wrapped(), Token::erc20(weth, 18));
    }

    #[test]
    fn test_sort_order() {
        let a = Token::erc20(Address::repeat_byte(0x0a), 18);
        let b = Token::erc20(Address::repeat_byte(0xb0), 18);

        assert!(a.sorts_before(&b));
        assert!(!b.sorts_before(&a));
        assert!(!a.sorts_before(&a));
    }

    #[test]
    fn test_from_decimal_scales_and_truncates() {
        let amount = TokenAmount::from_decimal(usdc(), dec!(12.3456789)).unwrap();
        assert_eq!(amount.raw, U256::from(12_345_678u64));

        let whole = TokenAmount::from_decimal(usdc(), dec!(5)).unwrap();
        assert_eq!(whole.raw, U256::from(5_000_000u64));
    }

    #[test]
    fn test_from_decimal_rejects_negative() {
        assert_eq!(
            TokenAmount::from_decimal(usdc(), dec!(-1)),
            Err(SwapError::ZeroAmount)
        );
    }

    #[test]
    fn test_decimal_amount() {
        let amount = TokenAmount::new(usdc(), U256::from(1_500_000u64));
        assert_eq!(amount.decimal_amount(), Some(dec!(1.5)));
    }
}
