//! Multi-hop routes over classic pools and the depth-first route finder.

use crate::config::SearchConfig;
use crate::error::SwapError;
use crate::fraction::{Fraction, Price};
use crate::pair::Pair;
use crate::trade::{Trade, TradeType};
use crate::types::{Address, Token, TokenAmount};
use std::collections::HashSet;

/// A validated sequence of pools from one token to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pairs: Vec<Pair>,
    path: Vec<Token>,
    input: Token,
    output: Token,
}

impl Route {
    /// Build a route, checking that every pool links to the previous one and
    /// that the last pool yields `output`.
    pub fn new(pairs: Vec<Pair>, input: Token, output: Token) -> Result<Self, SwapError> {
        if pairs.is_empty() {
            return Err(SwapError::RouteNotFound);
        }

        let mut seen = HashSet::with_capacity(pairs.len());
        let mut path = Vec::with_capacity(pairs.len() + 1);
        path.push(input);

        let mut current = input;
        for (index, pair) in pairs.iter().enumerate() {
            if !seen.insert(pair.key()) {
                return Err(SwapError::InvalidRoute { index });
            }
            current = pair
                .other_token(&current)
                .ok_or(SwapError::InvalidRoute { index })?;
            path.push(current);
        }

        if current.address() != output.address() {
            return Err(SwapError::InvalidRoute {
                index: pairs.len() - 1,
            });
        }
        // The last hop yields the pool's token; keep the caller's label so a
        // native output stays native.
        if let Some(last) = path.last_mut() {
            *last = output;
        }

        Ok(Self {
            pairs,
            path,
            input,
            output,
        })
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Tokens visited, input first.
    pub fn path(&self) -> &[Token] {
        &self.path
    }

    /// On-chain addresses along the path, with native coins as their wrapped
    /// token.
    pub fn addresses(&self) -> Vec<Address> {
        self.path.iter().map(Token::address).collect()
    }

    /// Get the input token.
    pub fn input(&self) -> &Token {
        &self.input
    }

    /// Get the output token.
    pub fn output(&self) -> &Token {
        &self.output
    }

    /// Get the number of hops in this route.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Spot price of the input in the output, compounded over every hop.
    pub fn mid_price(&self) -> Result<Price, SwapError> {
        let mut raw = Fraction::one();
        for (pair, token) in self.pairs.iter().zip(&self.path) {
            raw = &raw * pair.price_of(token)?.raw();
        }
        Ok(Price::from_fraction(self.input, self.output, raw))
    }
}

/// The pools taken so far on one branch of the search.
///
/// Each branch extends its parent's trail on the stack, so sibling branches
/// never observe each other's choices.
struct Trail<'t> {
    pair: &'t Pair,
    rest: Option<&'t Trail<'t>>,
}

impl<'t> Trail<'t> {
    fn extend(rest: Option<&'t Trail<'t>>, pair: &'t Pair) -> Trail<'t> {
        Trail { pair, rest }
    }

    /// Pools from this node back to the root.
    fn collect(&self) -> Vec<Pair> {
        let mut pairs = Vec::new();
        let mut node = Some(self);
        while let Some(trail) = node {
            pairs.push(trail.pair.clone());
            node = trail.rest;
        }
        pairs
    }
}

/// Every trade that turns exactly `amount_in` into `token_out` using at most
/// `max_hops` pools, in discovery order.
pub fn trades_exact_in(
    pairs: &[Pair],
    amount_in: &TokenAmount,
    token_out: &Token,
    max_hops: usize,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    if max_hops == 0 {
        return trades;
    }
    let pool: Vec<&Pair> = pairs.iter().collect();
    search_exact_in(
        &pool,
        amount_in,
        amount_in,
        token_out,
        max_hops,
        None,
        &mut trades,
    );
    trades
}

fn search_exact_in(
    pairs: &[&Pair],
    original: &TokenAmount,
    current: &TokenAmount,
    token_out: &Token,
    hops_left: usize,
    trail: Option<&Trail<'_>>,
    trades: &mut Vec<Trade>,
) {
    for (index, &pair) in pairs.iter().enumerate() {
        if !pair.involves(&current.token) {
            continue;
        }
        let Ok(amount_out) = pair.amount_out(current) else {
            continue;
        };

        let here = Trail::extend(trail, pair);
        if amount_out.token.address() == token_out.address() {
            let mut hops = here.collect();
            hops.reverse();
            if let Ok(route) = Route::new(hops, original.token, *token_out) {
                trades.push(Trade::new(
                    TradeType::ExactIn,
                    route,
                    *original,
                    TokenAmount::new(*token_out, amount_out.raw),
                ));
            }
        } else if hops_left > 1 && pairs.len() > 1 {
            let remaining = without(pairs, index);
            search_exact_in(
                &remaining,
                original,
                &amount_out,
                token_out,
                hops_left - 1,
                Some(&here),
                trades,
            );
        }
    }
}

/// Every trade that yields exactly `amount_out` from `token_in` using at most
/// `max_hops` pools, in discovery order.
pub fn trades_exact_out(
    pairs: &[Pair],
    token_in: &Token,
    amount_out: &TokenAmount,
    max_hops: usize,
) -> Vec<Trade> {
    let mut trades = Vec::new();
    if max_hops == 0 {
        return trades;
    }
    let pool: Vec<&Pair> = pairs.iter().collect();
    search_exact_out(
        &pool,
        token_in,
        amount_out,
        amount_out,
        max_hops,
        None,
        &mut trades,
    );
    trades
}

fn search_exact_out(
    pairs: &[&Pair],
    token_in: &Token,
    original: &TokenAmount,
    current: &TokenAmount,
    hops_left: usize,
    trail: Option<&Trail<'_>>,
    trades: &mut Vec<Trade>,
) {
    for (index, &pair) in pairs.iter().enumerate() {
        if !pair.involves(&current.token) {
            continue;
        }
        let Ok(amount_in) = pair.amount_in(current) else {
            continue;
        };

        // Walking backwards, so the new pool goes in front of the trail.
        let here = Trail::extend(trail, pair);
        if amount_in.token.address() == token_in.address() {
            if let Ok(route) = Route::new(here.collect(), *token_in, original.token) {
                trades.push(Trade::new(
                    TradeType::ExactOut,
                    route,
                    TokenAmount::new(*token_in, amount_in.raw),
                    *original,
                ));
            }
        } else if hops_left > 1 && pairs.len() > 1 {
            let remaining = without(pairs, index);
            search_exact_out(
                &remaining,
                token_in,
                original,
                &amount_in,
                hops_left - 1,
                Some(&here),
                trades,
            );
        }
    }
}

fn without<'p>(pairs: &[&'p Pair], skip: usize) -> Vec<&'p Pair> {
    pairs
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != skip)
        .map(|(_, pair)| *pair)
        .collect()
}

/// Run the exact-in search with the configured hop limit.
pub fn find_exact_in(
    pairs: &[Pair],
    amount_in: &TokenAmount,
    token_out: &Token,
    config: &SearchConfig,
) -> Vec<Trade> {
    trades_exact_in(pairs, amount_in, token_out, config.max_hops)
}

/// Run the exact-out search with the configured hop limit.
pub fn find_exact_out(
    pairs: &[Pair],
    token_in: &Token,
    amount_out: &TokenAmount,
    config: &SearchConfig,
) -> Vec<Trade> {
    trades_exact_out(pairs, token_in, amount_out, config.max_hops)
}
