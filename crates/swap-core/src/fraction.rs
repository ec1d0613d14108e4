//! Exact rational arithmetic and token prices.
//!
//! Everything that decides a rounding direction goes through [`Fraction`], so
//! the direction is explicit at the call site (`quotient` floors,
//! `ceil_quotient` rounds up).

use crate::error::SwapError;
use crate::types::{Token, TokenAmount, U256};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Widen a 256-bit amount into an arbitrary-precision integer.
pub(crate) fn big(value: U256) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>())
}

/// Narrow back to 256 bits. `None` for negative or oversized values.
pub(crate) fn to_u256(value: &BigInt) -> Option<U256> {
    if value.is_negative() {
        return None;
    }
    let (_, bytes) = value.to_bytes_be();
    U256::try_from_be_slice(&bytes)
}

fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exp as usize)
}

/// An exact rational number, always kept in lowest terms with a positive
/// denominator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: BigInt,
    denominator: BigInt,
}

impl Fraction {
    /// Create a fraction. Panics if the denominator is zero.
    pub fn new(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        let denominator = denominator.into();
        assert!(!denominator.is_zero(), "fraction denominator cannot be zero");
        Self::reduced(numerator.into(), denominator)
    }

    fn reduced(mut numerator: BigInt, mut denominator: BigInt) -> Self {
        if denominator.is_negative() {
            numerator = -numerator;
            denominator = -denominator;
        }
        let gcd = numerator.gcd(&denominator);
        if !gcd.is_zero() && !gcd.is_one() {
            numerator /= &gcd;
            denominator /= &gcd;
        }
        Self {
            numerator,
            denominator,
        }
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numerator: value.into(),
            denominator: BigInt::one(),
        }
    }

    pub fn from_u256(value: U256) -> Self {
        Self::from_integer(big(value))
    }

    /// `numerator / denominator` over raw 256-bit amounts.
    pub fn ratio(numerator: U256, denominator: U256) -> Self {
        Self::new(big(numerator), big(denominator))
    }

    /// Pool spot price from a `sqrtPriceX96` slot value: `sqrtP² / 2^192`,
    /// raw token1 per raw token0.
    pub fn from_sqrt_price_x96(sqrt_price: U256) -> Self {
        let root = big(sqrt_price);
        Self::new(&root * &root, BigInt::one() << 192)
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    /// `1 / self`, or `None` for zero.
    pub fn invert(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(Self::reduced(
            self.denominator.clone(),
            self.numerator.clone(),
        ))
    }

    /// Floor of the value.
    pub fn quotient(&self) -> BigInt {
        self.numerator.div_floor(&self.denominator)
    }

    /// Ceiling of the value.
    pub fn ceil_quotient(&self) -> BigInt {
        -(-&self.numerator).div_floor(&self.denominator)
    }

    pub fn pow(&self, exp: u32) -> Self {
        Self::reduced(
            num_traits::pow(self.numerator.clone(), exp as usize),
            num_traits::pow(self.denominator.clone(), exp as usize),
        )
    }

    /// Render with exactly `decimals` fractional digits, rounding half away
    /// from zero.
    pub fn to_fixed(&self, decimals: u32) -> String {
        let scaled = self.numerator.abs() * pow10(decimals);
        let (mut digits, remainder) = scaled.div_rem(&self.denominator);
        if remainder * BigInt::from(2) >= self.denominator {
            digits += BigInt::one();
        }

        let sign = if self.is_negative() && !digits.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = digits.to_string();
        if decimals == 0 {
            return format!("{sign}{digits}");
        }

        let width = decimals as usize + 1;
        let padded = format!("{digits:0>width$}");
        let (whole, fractional) = padded.split_at(padded.len() - decimals as usize);
        format!("{sign}{whole}.{fractional}")
    }

    /// Lossy conversion for display. `None` if the value does not fit a
    /// `Decimal`.
    pub fn to_decimal(&self, decimals: u32) -> Option<Decimal> {
        Decimal::from_str(&self.to_fixed(decimals.min(28))).ok()
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for &Fraction {
    type Output = Fraction;

    fn add(self, rhs: &Fraction) -> Fraction {
        Fraction::reduced(
            &self.numerator * &rhs.denominator + &rhs.numerator * &self.denominator,
            &self.denominator * &rhs.denominator,
        )
    }
}

impl Sub for &Fraction {
    type Output = Fraction;

    fn sub(self, rhs: &Fraction) -> Fraction {
        Fraction::reduced(
            &self.numerator * &rhs.denominator - &rhs.numerator * &self.denominator,
            &self.denominator * &rhs.denominator,
        )
    }
}

impl Mul for &Fraction {
    type Output = Fraction;

    fn mul(self, rhs: &Fraction) -> Fraction {
        Fraction::reduced(
            &self.numerator * &rhs.numerator,
            &self.denominator * &rhs.denominator,
        )
    }
}

impl Div for &Fraction {
    type Output = Fraction;

    /// Panics when dividing by zero, like integer division.
    fn div(self, rhs: &Fraction) -> Fraction {
        Fraction::new(
            &self.numerator * &rhs.denominator,
            &self.denominator * &rhs.numerator,
        )
    }
}

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Fraction) -> Fraction {
        &self + &rhs
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Fraction) -> Fraction {
        &self - &rhs
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Fraction) -> Fraction {
        &self * &rhs
    }
}

impl Div for Fraction {
    type Output = Fraction;

    fn div(self, rhs: Fraction) -> Fraction {
        &self / &rhs
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying keeps the order.
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.is_one() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

/// Price of `base` expressed in `quote`, stored as raw quote units per raw
/// base unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Price {
    base: Token,
    quote: Token,
    raw: Fraction,
}

impl Price {
    /// Price from raw reserves or amounts. Panics if `base_raw` is zero.
    pub fn new(base: Token, quote: Token, base_raw: U256, quote_raw: U256) -> Self {
        Self {
            base,
            quote,
            raw: Fraction::ratio(quote_raw, base_raw),
        }
    }

    pub fn from_fraction(base: Token, quote: Token, raw: Fraction) -> Self {
        Self { base, quote, raw }
    }

    /// Price implied by swapping `base_amount` for `quote_amount`.
    pub fn from_amounts(base_amount: &TokenAmount, quote_amount: &TokenAmount) -> Option<Self> {
        if base_amount.is_zero() {
            return None;
        }
        Some(Self::new(
            base_amount.token,
            quote_amount.token,
            base_amount.raw,
            quote_amount.raw,
        ))
    }

    pub fn base(&self) -> &Token {
        &self.base
    }

    pub fn quote(&self) -> &Token {
        &self.quote
    }

    pub fn raw(&self) -> &Fraction {
        &self.raw
    }

    pub fn invert(&self) -> Option<Self> {
        Some(Self {
            base: self.quote,
            quote: self.base,
            raw: self.raw.invert()?,
        })
    }

    /// Chain two prices: `A/B * B/C = A/C`.
    pub fn multiply(&self, other: &Price) -> Result<Self, SwapError> {
        if self.quote != other.base {
            return Err(SwapError::InvalidToken);
        }
        Ok(Self {
            base: self.base,
            quote: other.quote,
            raw: &self.raw * &other.raw,
        })
    }

    /// Quote an amount of the base token in the quote token, flooring.
    pub fn quote_amount(&self, amount: &TokenAmount) -> Result<TokenAmount, SwapError> {
        if amount.token != self.base {
            return Err(SwapError::InvalidToken);
        }
        let quoted = (&self.raw * &Fraction::from_u256(amount.raw)).quotient();
        let raw = to_u256(&quoted).ok_or(SwapError::AmountOverflow)?;
        Ok(TokenAmount::new(self.quote, raw))
    }

    /// Price in whole-token units, shifting by the decimal difference.
    pub fn adjusted(&self) -> Fraction {
        let scalar = Fraction::new(
            pow10(u32::from(self.base.decimals())),
            pow10(u32::from(self.quote.decimals())),
        );
        &self.raw * &scalar
    }

    pub fn decimal_value(&self) -> Option<Decimal> {
        self.adjusted().to_decimal(18)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.adjusted().to_fixed(6), self.quote, self.base)
    }
}
