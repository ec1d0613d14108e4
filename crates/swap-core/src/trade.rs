//! Trade selection and slippage bounds.

use crate::config::{SearchConfig, TradeOptions};
use crate::error::SwapError;
use crate::fraction::{to_u256, Fraction, Price};
use crate::pair::{fee_complement, Pair};
use crate::route::{find_exact_in, find_exact_out, Route};
use crate::types::{Token, TokenAmount};
use rust_decimal::Decimal;
use tracing::debug;

/// Which side of the trade is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeType {
    /// The input amount is exact; the output is estimated.
    ExactIn,
    /// The output amount is exact; the input is estimated.
    ExactOut,
}

/// A priced swap along a classic route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    kind: TradeType,
    route: Route,
    amount_in: TokenAmount,
    amount_out: TokenAmount,
}

impl Trade {
    pub fn new(
        kind: TradeType,
        route: Route,
        amount_in: TokenAmount,
        amount_out: TokenAmount,
    ) -> Self {
        Self {
            kind,
            route,
            amount_in,
            amount_out,
        }
    }

    pub fn kind(&self) -> TradeType {
        self.kind
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn amount_in(&self) -> &TokenAmount {
        &self.amount_in
    }

    pub fn amount_out(&self) -> &TokenAmount {
        &self.amount_out
    }

    /// Realized price of the input in the output. `None` for a zero input.
    pub fn execution_price(&self) -> Option<Price> {
        Price::from_amounts(&self.amount_in, &self.amount_out)
    }

    /// Relative shortfall of the output against the route's mid price:
    /// `(mid * in - out) / (mid * in)`.
    pub fn price_impact(&self) -> Result<Fraction, SwapError> {
        let mid = self.route.mid_price()?;
        let quoted = mid.raw() * &Fraction::from_u256(self.amount_in.raw);
        if quoted.is_zero() {
            return Err(SwapError::InsufficientReserves);
        }
        let shortfall = &quoted - &Fraction::from_u256(self.amount_out.raw);
        Ok(&shortfall / &quoted)
    }

    /// Share of the input paid to liquidity providers: `1 - 0.997^hops`.
    pub fn liquidity_provider_fee(&self) -> Fraction {
        let hops = u32::try_from(self.route.len()).unwrap_or(u32::MAX);
        &Fraction::one() - &fee_complement().pow(hops)
    }

    /// Least output accepted under `slippage`: `floor(out / (1 + slippage))`.
    /// Exact-out trades return the exact output.
    pub fn minimum_amount_out(&self, slippage: &Fraction) -> TokenAmount {
        match self.kind {
            TradeType::ExactOut => self.amount_out,
            TradeType::ExactIn => lower_bound(&self.amount_out, slippage),
        }
    }

    /// Most input spent under `slippage`: `ceil(in * (1 + slippage))`.
    /// Exact-in trades return the exact input.
    pub fn maximum_amount_in(&self, slippage: &Fraction) -> Result<TokenAmount, SwapError> {
        match self.kind {
            TradeType::ExactIn => Ok(self.amount_in),
            TradeType::ExactOut => upper_bound(&self.amount_in, slippage),
        }
    }
}

/// `1 + slippage`, with negative slippage counted as none.
fn tolerance(slippage: &Fraction) -> Fraction {
    if slippage.is_negative() {
        Fraction::one()
    } else {
        &Fraction::one() + slippage
    }
}

/// `floor(amount / (1 + slippage))`, the least output a trader accepts.
pub fn lower_bound(amount: &TokenAmount, slippage: &Fraction) -> TokenAmount {
    let bound = &Fraction::from_u256(amount.raw) / &tolerance(slippage);
    // never above the amount itself
    let raw = to_u256(&bound.quotient()).unwrap_or(amount.raw);
    TokenAmount::new(amount.token, raw)
}

/// `ceil(amount * (1 + slippage))`, the most input a trader spends.
pub fn upper_bound(amount: &TokenAmount, slippage: &Fraction) -> Result<TokenAmount, SwapError> {
    let bound = &Fraction::from_u256(amount.raw) * &tolerance(slippage);
    let raw = to_u256(&bound.ceil_quotient()).ok_or(SwapError::AmountOverflow)?;
    Ok(TokenAmount::new(amount.token, raw))
}

/// Pick the best trade: largest output for exact-in, smallest input for
/// exact-out. Ties keep the earliest candidate.
pub fn select_best(kind: TradeType, trades: Vec<Trade>) -> Result<Trade, SwapError> {
    let mut best: Option<Trade> = None;
    for trade in trades {
        let better = match &best {
            None => true,
            Some(current) => match kind {
                TradeType::ExactIn => trade.amount_out.raw > current.amount_out.raw,
                TradeType::ExactOut => trade.amount_in.raw < current.amount_in.raw,
            },
        };
        if better {
            best = Some(trade);
        }
    }
    best.ok_or(SwapError::TradeNotFound)
}

/// Convert a requested decimal amount to raw units, rejecting anything that
/// is not strictly positive after truncation.
pub fn requested_amount(token: Token, amount: Decimal) -> Result<TokenAmount, SwapError> {
    if amount <= Decimal::ZERO {
        return Err(SwapError::ZeroAmount);
    }
    let requested = TokenAmount::from_decimal(token, amount)?;
    if requested.is_zero() {
        return Err(SwapError::ZeroAmount);
    }
    Ok(requested)
}

/// Best trade spending exactly `amount` of `token_in`.
pub fn best_trade_exact_in(
    pairs: &[Pair],
    token_in: Token,
    token_out: Token,
    amount: Decimal,
    config: &SearchConfig,
) -> Result<Trade, SwapError> {
    let amount_in = requested_amount(token_in, amount)?;
    if token_in.address() == token_out.address() {
        return Err(SwapError::InvalidTokensForSwap);
    }

    let trades = find_exact_in(pairs, &amount_in, &token_out, config);
    debug!(
        candidates = trades.len(),
        pools = pairs.len(),
        %token_in,
        %token_out,
        "exact-in route search finished"
    );
    select_best(TradeType::ExactIn, trades)
}

/// Best trade yielding exactly `amount` of `token_out`.
pub fn best_trade_exact_out(
    pairs: &[Pair],
    token_in: Token,
    token_out: Token,
    amount: Decimal,
    config: &SearchConfig,
) -> Result<Trade, SwapError> {
    let amount_out = requested_amount(token_out, amount)?;
    if token_in.address() == token_out.address() {
        return Err(SwapError::InvalidTokensForSwap);
    }

    let trades = find_exact_out(pairs, &token_in, &amount_out, config);
    debug!(
        candidates = trades.len(),
        pools = pairs.len(),
        %token_in,
        %token_out,
        "exact-out route search finished"
    );
    select_best(TradeType::ExactOut, trades)
}

/// A selected trade together with the options it will be submitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeData {
    pub trade: Trade,
    pub options: TradeOptions,
}

impl TradeData {
    pub fn new(trade: Trade, options: TradeOptions) -> Self {
        Self { trade, options }
    }

    pub fn amount_out_min(&self) -> TokenAmount {
        self.trade.minimum_amount_out(&self.options.slippage)
    }

    pub fn amount_in_max(&self) -> Result<TokenAmount, SwapError> {
        self.trade.maximum_amount_in(&self.options.slippage)
    }

    /// Liquidity provider fee in input-token units, rounded down. Charged on
    /// the exact input, or on the maximum input of an exact-out trade.
    pub fn provider_fee(&self) -> Result<TokenAmount, SwapError> {
        let spent = match self.trade.kind {
            TradeType::ExactIn => self.trade.amount_in,
            TradeType::ExactOut => self.amount_in_max()?,
        };
        let fee = &self.trade.liquidity_provider_fee() * &Fraction::from_u256(spent.raw);
        let raw = to_u256(&fee.quotient()).ok_or(SwapError::AmountOverflow)?;
        Ok(TokenAmount::new(spent.token, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, U256};
    use rust_decimal_macros::dec;

    fn token(byte: u8) -> Token {
        Token::erc20(Address::repeat_byte(byte), 0)
    }

    fn pair(a: Token, ra: u64, b: Token, rb: u64) -> Pair {
        Pair::new(
            TokenAmount::new(a, U256::from(ra)),
            TokenAmount::new(b, U256::from(rb)),
        )
        .unwrap()
    }

    fn trade(kind: TradeType, amount_in: u64, amount_out: u64) -> Trade {
        let (a, b) = (token(0x01), token(0x02));
        let route = Route::new(vec![pair(a, 1_000_000, b, 1_000_000)], a, b).unwrap();
        Trade::new(
            kind,
            route,
            TokenAmount::new(a, U256::from(amount_in)),
            TokenAmount::new(b, U256::from(amount_out)),
        )
    }

    #[test]
    fn test_select_best_exact_in_prefers_output() {
        let trades = vec![
            trade(TradeType::ExactIn, 100, 90),
            trade(TradeType::ExactIn, 100, 95),
            trade(TradeType::ExactIn, 100, 95),
        ];
        let best = select_best(TradeType::ExactIn, trades).unwrap();
        assert_eq!(best.amount_out().raw, U256::from(95u64));
    }

    #[test]
    fn test_select_best_exact_out_prefers_input() {
        let trades = vec![
            trade(TradeType::ExactOut, 110, 100),
            trade(TradeType::ExactOut, 105, 100),
        ];
        let best = select_best(TradeType::ExactOut, trades).unwrap();
        assert_eq!(best.amount_in().raw, U256::from(105u64));
    }

    #[test]
    fn test_select_best_empty() {
        assert_eq!(
            select_best(TradeType::ExactIn, vec![]),
            Err(SwapError::TradeNotFound)
        );
    }

    #[test]
    fn test_slippage_bounds() {
        let slippage = Fraction::new(1, 200);

        // floor(1000 / 1.005) = 995
        let exact_in = trade(TradeType::ExactIn, 1000, 1000);
        assert_eq!(exact_in.minimum_amount_out(&slippage).raw, U256::from(995u64));
        assert_eq!(exact_in.maximum_amount_in(&slippage).unwrap().raw, U256::from(1000u64));

        // ceil(1001 * 1.005) = ceil(1006.005) = 1007
        let exact_out = trade(TradeType::ExactOut, 1001, 1000);
        assert_eq!(exact_out.maximum_amount_in(&slippage).unwrap().raw, U256::from(1007u64));
        assert_eq!(exact_out.minimum_amount_out(&slippage).raw, U256::from(1000u64));

        // exact products are not bumped
        let round = trade(TradeType::ExactOut, 200, 100);
        assert_eq!(round.maximum_amount_in(&slippage).unwrap().raw, U256::from(201u64));
    }

    #[test]
    fn test_negative_slippage_counts_as_none() {
        let amount = TokenAmount::new(token(0x01), U256::from(1000u64));
        for slippage in [Fraction::new(-1, 1), Fraction::new(-3, 2)] {
            assert_eq!(lower_bound(&amount, &slippage), amount);
            assert_eq!(upper_bound(&amount, &slippage), Ok(amount));
        }

        let exact_out = trade(TradeType::ExactOut, 1001, 1000);
        let data = TradeData::new(
            exact_out,
            TradeOptions {
                slippage: Fraction::new(-1, 1),
                ..TradeOptions::default()
            },
        );
        assert_eq!(data.amount_in_max().unwrap().raw, U256::from(1001u64));
    }

    #[test]
    fn test_liquidity_provider_fee() {
        let single = trade(TradeType::ExactIn, 100, 90);
        assert_eq!(single.liquidity_provider_fee(), Fraction::new(3, 1000));
    }

    #[test]
    fn test_price_impact() {
        // mid price 1, 1000 in, 990 out -> 1%
        let t = trade(TradeType::ExactIn, 1000, 990);
        assert_eq!(t.price_impact().unwrap(), Fraction::new(1, 100));
    }

    #[test]
    fn test_zero_and_negative_amounts() {
        let (a, b) = (token(0x01), token(0x02));
        let pairs = vec![pair(a, 1000, b, 1000)];
        let config = SearchConfig::default();

        for amount in [dec!(0), dec!(-5), dec!(0.4)] {
            assert_eq!(
                best_trade_exact_in(&pairs, a, b, amount, &config),
                Err(SwapError::ZeroAmount)
            );
            assert_eq!(
                best_trade_exact_out(&pairs, a, b, amount, &config),
                Err(SwapError::ZeroAmount)
            );
        }
    }

    #[test]
    fn test_same_token_rejected() {
        let a = token(0x01);
        assert_eq!(
            best_trade_exact_in(&[], a, a, dec!(1), &SearchConfig::default()),
            Err(SwapError::InvalidTokensForSwap)
        );
    }

    #[test]
    fn test_trade_data_bounds() {
        let data = TradeData::new(
            trade(TradeType::ExactIn, 1000, 1000),
            TradeOptions::default(),
        );
        assert_eq!(data.amount_out_min().raw, U256::from(995u64));
        assert_eq!(data.amount_in_max().unwrap().raw, U256::from(1000u64));
    }

    #[test]
    fn test_provider_fee() {
        // 0.3% of the exact input
        let exact_in = TradeData::new(
            trade(TradeType::ExactIn, 10_000, 9_000),
            TradeOptions::default(),
        );
        let fee = exact_in.provider_fee().unwrap();
        assert_eq!(fee.token, token(0x01));
        assert_eq!(fee.raw, U256::from(30u64));

        // charged on ceil(10_000 * 1.005) = 10_050, floor(30.15) = 30
        let exact_out = TradeData::new(
            trade(TradeType::ExactOut, 10_000, 9_000),
            TradeOptions::default(),
        );
        assert_eq!(exact_out.provider_fee().unwrap().raw, U256::from(30u64));

        // floor(0.003 * 20_100) = 60
        let wide = TradeData::new(
            trade(TradeType::ExactOut, 20_000, 9_000),
            TradeOptions::default(),
        );
        assert_eq!(wide.provider_fee().unwrap().raw, U256::from(60u64));
    }
}
