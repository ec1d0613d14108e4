//! Per-chain protocol constants.
//!
//! Each table resolves once into an immutable config value; nothing here is
//! consulted again after construction. Chains or forks that are not tabled
//! can build the config by hand.

use alloy_primitives::{address, b256, Address, B256};
use std::fmt;
use swap_core::{FeeAmount, SwapError, Token};

/// EVM chains with tabled protocol deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Ethereum,
    EthereumGoerli,
    Optimism,
    BinanceSmartChain,
    Polygon,
    ZkSync,
    Base,
    ArbitrumOne,
    Avalanche,
}

impl Chain {
    pub fn id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::EthereumGoerli => 5,
            Chain::Optimism => 10,
            Chain::BinanceSmartChain => 56,
            Chain::Polygon => 137,
            Chain::ZkSync => 324,
            Chain::Base => 8453,
            Chain::ArbitrumOne => 42161,
            Chain::Avalanche => 43114,
        }
    }

    pub fn from_id(id: u64) -> Result<Self, SwapError> {
        let chain = match id {
            1 => Chain::Ethereum,
            5 => Chain::EthereumGoerli,
            10 => Chain::Optimism,
            56 => Chain::BinanceSmartChain,
            137 => Chain::Polygon,
            324 => Chain::ZkSync,
            8453 => Chain::Base,
            42161 => Chain::ArbitrumOne,
            43114 => Chain::Avalanche,
            other => return Err(SwapError::UnsupportedChain(other)),
        };
        Ok(chain)
    }

    /// The chain's wrapped native token contract.
    pub fn wrapped_native(&self) -> Address {
        match self {
            Chain::Ethereum => address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
            Chain::EthereumGoerli => address!("b4fbf271143f4fbf7b91a5ded31805e42b2208d6"),
            Chain::Optimism | Chain::Base => address!("4200000000000000000000000000000000000006"),
            Chain::BinanceSmartChain => address!("bb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c"),
            Chain::Polygon => address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270"),
            Chain::ZkSync => address!("5aea5775959fbc2557cc8789bc1bf90a239d9a91"),
            Chain::ArbitrumOne => address!("82af49447d8a07e3bd95bd0d56f35241523fbab1"),
            Chain::Avalanche => address!("b31f66aa3c1e785363f0875a1b74e27b85fd66c7"),
        }
    }

    /// The native coin, priced through [`Chain::wrapped_native`].
    pub fn native_token(&self) -> Token {
        Token::native(self.wrapped_native())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.id())
    }
}

/// Addresses of a classic constant-product deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassicConfig {
    pub router: Address,
    pub factory: Address,
    pub init_code_hash: B256,
    pub wrapped_native: Address,

    /// Hop limit for route search.
    pub max_hops: usize,
}

impl ClassicConfig {
    pub fn new(
        router: Address,
        factory: Address,
        init_code_hash: B256,
        wrapped_native: Address,
    ) -> Self {
        Self {
            router,
            factory,
            init_code_hash,
            wrapped_native,
            max_hops: 3,
        }
    }

    /// Uniswap V2 on Ethereum, PancakeSwap on BSC, QuickSwap on Polygon and
    /// Trader Joe on Avalanche.
    pub fn for_chain(chain: Chain) -> Result<Self, SwapError> {
        const UNISWAP_INIT_CODE_HASH: B256 =
            b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");

        let (router, factory, init_code_hash) = match chain {
            Chain::Ethereum | Chain::EthereumGoerli => (
                address!("7a250d5630b4cf539739df2c5dacb4c659f2488d"),
                address!("5c69bee701ef814a2b6a3edd4b1652cb9cc5aa6f"),
                UNISWAP_INIT_CODE_HASH,
            ),
            Chain::BinanceSmartChain => (
                address!("10ed43c718714eb63d5aa57b78b54704e256024e"),
                address!("ca143ce32fe78f1f7019d7d551a6402fc5350c73"),
                b256!("00fb7f630766e6a796048ea87d01acd3068e8ff67d078148a3fa3f4a84f69bd5"),
            ),
            Chain::Polygon => (
                address!("a5e0829caced8ffdd4de3c43696c57f7d7a678ff"),
                address!("5757371414417b8c6caad45baef941abc7d3ab32"),
                UNISWAP_INIT_CODE_HASH,
            ),
            Chain::Avalanche => (
                address!("60ae616a2155ee3d9a68541ba4544862310933d4"),
                address!("9ad6c38be94206ca50bb0d90783181662f0cfa10"),
                UNISWAP_INIT_CODE_HASH,
            ),
            other => return Err(SwapError::UnsupportedChain(other.id())),
        };

        Ok(Self::new(
            router,
            factory,
            init_code_hash,
            chain.wrapped_native(),
        ))
    }

    /// Create a new configuration with custom max hops.
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn native_token(&self) -> Token {
        Token::native(self.wrapped_native)
    }
}

/// Concentrated-liquidity protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DexType {
    Uniswap,
    PancakeSwap,
}

impl DexType {
    pub fn medium_fee(&self) -> FeeAmount {
        match self {
            DexType::Uniswap => FeeAmount::MEDIUM,
            DexType::PancakeSwap => FeeAmount::MEDIUM_PANCAKESWAP,
        }
    }

    /// Fee tiers in quoting order.
    pub fn fee_tiers(&self) -> Vec<FeeAmount> {
        vec![
            FeeAmount::LOWEST,
            FeeAmount::LOW,
            self.medium_fee(),
            FeeAmount::HIGH,
        ]
    }

    fn factory(&self, chain: Chain) -> Address {
        match (self, chain) {
            (DexType::Uniswap, Chain::BinanceSmartChain) => {
                address!("db1d10011ad0ff90774d0c6bb92e5c5c8b4461f7")
            }
            (DexType::Uniswap, Chain::Base) => address!("33128a8fc17869897dce68ed026d694621f6fdfd"),
            (DexType::Uniswap, Chain::ZkSync) => address!("8fda5a7a8dca67bbcdd10f02fa0649a937215422"),
            (DexType::Uniswap, _) => address!("1f98431c8ad98523631ae4a59f267346ea31f984"),
            (DexType::PancakeSwap, Chain::ZkSync) => {
                address!("1bb72e0cbbea93c08f535fc7856e0338d7f7a8ab")
            }
            (DexType::PancakeSwap, _) => address!("0bfbcf9fa4f9c56b0f40a671ad40e0805a091865"),
        }
    }

    fn quoter(&self, chain: Chain) -> Address {
        match (self, chain) {
            (DexType::Uniswap, Chain::BinanceSmartChain) => {
                address!("78d78e420da98ad378d7799be8f4af69033eb077")
            }
            (DexType::Uniswap, Chain::Base) => address!("3d4e44eb1374240ce5f1b871ab261cd16335b76a"),
            (DexType::Uniswap, Chain::ZkSync) => address!("8cb537fc92e26d8ebbb760e632c95484b6ea3e28"),
            (DexType::Uniswap, _) => address!("61ffe014ba17989e743c5f6cb21bf9697530b21e"),
            (DexType::PancakeSwap, Chain::ZkSync) => {
                address!("3d146fce6c1006857750cbe8af44f76a28041ccc")
            }
            (DexType::PancakeSwap, _) => address!("b048bbc1ee6b733fffcfb9e9cef7375518e25997"),
        }
    }

    fn router(&self, chain: Chain) -> Address {
        match (self, chain) {
            (DexType::Uniswap, Chain::BinanceSmartChain) => {
                address!("b971ef87ede563556b2ed4b1c0b0019111dd85d2")
            }
            (DexType::Uniswap, Chain::Base) => address!("2626664c2603336e57b271c5c0b26f421741e481"),
            (DexType::Uniswap, Chain::ZkSync) => address!("99c56385dabce3e81d8499d0b8d0257abc07e8a3"),
            (DexType::Uniswap, _) => address!("68b3465833fb72a70ecdf485e0e4c7bd8665fc45"),
            (DexType::PancakeSwap, Chain::Base) => {
                address!("678aa4bf4e210cf2166753e054d5b7c31cc7fa86")
            }
            (DexType::PancakeSwap, Chain::ZkSync) => {
                address!("f8b59f3c3ab33200ec80a8a58b2aa5f5d2a8944c")
            }
            (DexType::PancakeSwap, _) => address!("13f4ea83d0bd40e75c8222255bc855a974568dd4"),
        }
    }
}

/// Which generation of the concentrated-liquidity router the calls target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouterVersion {
    /// `SwapRouter`: every swap struct carries a deadline.
    V1,
    /// `SwapRouter02`: no deadline in the swap structs.
    #[default]
    V2,
}

/// Addresses and quoting parameters of a concentrated-liquidity deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcentratedConfig {
    pub dex: DexType,
    pub router: Address,
    pub router_version: RouterVersion,
    pub factory: Address,
    pub quoter: Address,
    pub wrapped_native: Address,

    /// Fee tiers tried for every direct quote, in order.
    pub fee_tiers: Vec<FeeAmount>,
}

impl ConcentratedConfig {
    pub fn new(
        dex: DexType,
        router: Address,
        factory: Address,
        quoter: Address,
        wrapped_native: Address,
    ) -> Self {
        Self {
            dex,
            router,
            router_version: RouterVersion::default(),
            factory,
            quoter,
            wrapped_native,
            fee_tiers: dex.fee_tiers(),
        }
    }

    pub fn for_chain(dex: DexType, chain: Chain) -> Result<Self, SwapError> {
        match chain {
            Chain::Ethereum
            | Chain::EthereumGoerli
            | Chain::Optimism
            | Chain::BinanceSmartChain
            | Chain::Polygon
            | Chain::ZkSync
            | Chain::Base
            | Chain::ArbitrumOne => Ok(Self::new(
                dex,
                dex.router(chain),
                dex.factory(chain),
                dex.quoter(chain),
                chain.wrapped_native(),
            )),
            Chain::Avalanche => Err(SwapError::UnsupportedChain(chain.id())),
        }
    }

    pub fn with_router_version(mut self, version: RouterVersion) -> Self {
        self.router_version = version;
        self
    }

    pub fn with_fee_tiers(mut self, fee_tiers: Vec<FeeAmount>) -> Self {
        self.fee_tiers = fee_tiers;
        self
    }

    pub fn native_token(&self) -> Token {
        Token::native(self.wrapped_native)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids_round_trip() {
        for chain in [
            Chain::Ethereum,
            Chain::BinanceSmartChain,
            Chain::Polygon,
            Chain::Avalanche,
            Chain::ArbitrumOne,
        ] {
            assert_eq!(Chain::from_id(chain.id()), Ok(chain));
        }
        assert_eq!(Chain::from_id(999), Err(SwapError::UnsupportedChain(999)));
    }

    #[test]
    fn test_classic_tables() {
        let eth = ClassicConfig::for_chain(Chain::Ethereum).unwrap();
        assert_eq!(eth.router, address!("7a250d5630b4cf539739df2c5dacb4c659f2488d"));
        assert_eq!(eth.wrapped_native, Chain::Ethereum.wrapped_native());
        assert_eq!(eth.max_hops, 3);

        assert_eq!(
            ClassicConfig::for_chain(Chain::Base),
            Err(SwapError::UnsupportedChain(8453))
        );
    }

    #[test]
    fn test_fee_tiers_per_dex() {
        assert_eq!(
            DexType::Uniswap.fee_tiers(),
            vec![FeeAmount::LOWEST, FeeAmount::LOW, FeeAmount::MEDIUM, FeeAmount::HIGH]
        );
        assert_eq!(DexType::PancakeSwap.fee_tiers()[2], FeeAmount::MEDIUM_PANCAKESWAP);
    }

    #[test]
    fn test_concentrated_tables() {
        let config = ConcentratedConfig::for_chain(DexType::PancakeSwap, Chain::Base).unwrap();
        assert_eq!(config.router, address!("678aa4bf4e210cf2166753e054d5b7c31cc7fa86"));
        assert_eq!(config.factory, address!("0bfbcf9fa4f9c56b0f40a671ad40e0805a091865"));
        assert_eq!(config.router_version, RouterVersion::V2);
        assert_eq!(config.fee_tiers, DexType::PancakeSwap.fee_tiers());

        let v1 = config.with_router_version(RouterVersion::V1);
        assert_eq!(v1.router_version, RouterVersion::V1);

        assert!(ConcentratedConfig::for_chain(DexType::Uniswap, Chain::Avalanche).is_err());
    }
}
