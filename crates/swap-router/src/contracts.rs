//! Router, quoter and pool contract bindings and selectors.

use alloy_sol_macro::sol;

sol! {
    /// Classic constant-product router.
    interface IUniswapV2Router02 {
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
        function swapTokensForExactTokens(uint256 amountOut, uint256 amountInMax, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
        function swapExactETHForTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts);
        function swapETHForExactTokens(uint256 amountOut, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts);
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
        function swapTokensForExactETH(uint256 amountOut, uint256 amountInMax, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);

        function swapExactTokensForTokensSupportingFeeOnTransferTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external;
        function swapExactETHForTokensSupportingFeeOnTransferTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable;
        function swapExactTokensForETHSupportingFeeOnTransferTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external;
    }

    /// Classic pool.
    interface IUniswapV2Pair {
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

sol! {
    /// First-generation concentrated-liquidity router. Every swap struct
    /// carries its own deadline.
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }

        struct ExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountOut;
            uint256 amountInMaximum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactOutputParams {
            bytes path;
            address recipient;
            uint256 deadline;
            uint256 amountOut;
            uint256 amountInMaximum;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
        function exactInput(ExactInputParams calldata params) external payable returns (uint256 amountOut);
        function exactOutputSingle(ExactOutputSingleParams calldata params) external payable returns (uint256 amountIn);
        function exactOutput(ExactOutputParams calldata params) external payable returns (uint256 amountIn);
    }

    /// Second-generation router. Deadlines moved out of the swap structs.
    interface ISwapRouter02 {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactInputParams {
            bytes path;
            address recipient;
            uint256 amountIn;
            uint256 amountOutMinimum;
        }

        struct ExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 amountOut;
            uint256 amountInMaximum;
            uint160 sqrtPriceLimitX96;
        }

        struct ExactOutputParams {
            bytes path;
            address recipient;
            uint256 amountOut;
            uint256 amountInMaximum;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
        function exactInput(ExactInputParams calldata params) external payable returns (uint256 amountOut);
        function exactOutputSingle(ExactOutputSingleParams calldata params) external payable returns (uint256 amountIn);
        function exactOutput(ExactOutputParams calldata params) external payable returns (uint256 amountIn);
    }

    /// Payment helpers shared by both router generations.
    interface IPeripheryPayments {
        function multicall(bytes[] calldata data) external payable returns (bytes[] memory results);
        function unwrapWETH9(uint256 amountMinimum, address recipient) external payable;
        function refundETH() external payable;
    }
}

sol! {
    /// Quoter with per-call price and gas details.
    interface IQuoterV2 {
        struct QuoteExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        struct QuoteExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amount;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        function quoteExactInputSingle(QuoteExactInputSingleParams memory params) external returns (uint256 amountOut, uint160 sqrtPriceX96After, uint32 initializedTicksCrossed, uint256 gasEstimate);
        function quoteExactOutputSingle(QuoteExactOutputSingleParams memory params) external returns (uint256 amountIn, uint160 sqrtPriceX96After, uint32 initializedTicksCrossed, uint256 gasEstimate);
        function quoteExactInput(bytes memory path, uint256 amountIn) external returns (uint256 amountOut, uint160[] memory sqrtPriceX96AfterList, uint32[] memory initializedTicksCrossedList, uint256 gasEstimate);
        function quoteExactOutput(bytes memory path, uint256 amountOut) external returns (uint256 amountIn, uint160[] memory sqrtPriceX96AfterList, uint32[] memory initializedTicksCrossedList, uint256 gasEstimate);
    }

    /// Concentrated-liquidity pool factory.
    interface IUniswapV3Factory {
        function getPool(address tokenA, address tokenB, uint24 fee) external view returns (address pool);
    }

    /// Concentrated-liquidity pool. `feeProtocol` is declared wide enough for
    /// forks that store it in more than eight bits.
    interface IUniswapV3Pool {
        function slot0() external view returns (uint160 sqrtPriceX96, int24 tick, uint16 observationIndex, uint16 observationCardinality, uint16 observationCardinalityNext, uint32 feeProtocol, bool unlocked);
    }
}

pub mod selectors {
    use super::{IPeripheryPayments, ISwapRouter, ISwapRouter02, IUniswapV2Router02};
    use alloy_sol_types::SolCall;

    pub const SWAP_EXACT_TOKENS_FOR_TOKENS: [u8; 4] =
        IUniswapV2Router02::swapExactTokensForTokensCall::SELECTOR;
    pub const SWAP_TOKENS_FOR_EXACT_TOKENS: [u8; 4] =
        IUniswapV2Router02::swapTokensForExactTokensCall::SELECTOR;
    pub const SWAP_EXACT_ETH_FOR_TOKENS: [u8; 4] =
        IUniswapV2Router02::swapExactETHForTokensCall::SELECTOR;
    pub const SWAP_ETH_FOR_EXACT_TOKENS: [u8; 4] =
        IUniswapV2Router02::swapETHForExactTokensCall::SELECTOR;
    pub const SWAP_EXACT_TOKENS_FOR_ETH: [u8; 4] =
        IUniswapV2Router02::swapExactTokensForETHCall::SELECTOR;
    pub const SWAP_TOKENS_FOR_EXACT_ETH: [u8; 4] =
        IUniswapV2Router02::swapTokensForExactETHCall::SELECTOR;
    pub const SWAP_EXACT_TOKENS_FOR_TOKENS_FOT: [u8; 4] =
        IUniswapV2Router02::swapExactTokensForTokensSupportingFeeOnTransferTokensCall::SELECTOR;
    pub const SWAP_EXACT_ETH_FOR_TOKENS_FOT: [u8; 4] =
        IUniswapV2Router02::swapExactETHForTokensSupportingFeeOnTransferTokensCall::SELECTOR;
    pub const SWAP_EXACT_TOKENS_FOR_ETH_FOT: [u8; 4] =
        IUniswapV2Router02::swapExactTokensForETHSupportingFeeOnTransferTokensCall::SELECTOR;

    pub const EXACT_INPUT_SINGLE_V1: [u8; 4] = ISwapRouter::exactInputSingleCall::SELECTOR;
    pub const EXACT_INPUT_V1: [u8; 4] = ISwapRouter::exactInputCall::SELECTOR;
    pub const EXACT_OUTPUT_SINGLE_V1: [u8; 4] = ISwapRouter::exactOutputSingleCall::SELECTOR;
    pub const EXACT_OUTPUT_V1: [u8; 4] = ISwapRouter::exactOutputCall::SELECTOR;

    pub const EXACT_INPUT_SINGLE: [u8; 4] = ISwapRouter02::exactInputSingleCall::SELECTOR;
    pub const EXACT_INPUT: [u8; 4] = ISwapRouter02::exactInputCall::SELECTOR;
    pub const EXACT_OUTPUT_SINGLE: [u8; 4] = ISwapRouter02::exactOutputSingleCall::SELECTOR;
    pub const EXACT_OUTPUT: [u8; 4] = ISwapRouter02::exactOutputCall::SELECTOR;

    pub const MULTICALL: [u8; 4] = IPeripheryPayments::multicallCall::SELECTOR;
    pub const UNWRAP_WETH9: [u8; 4] = IPeripheryPayments::unwrapWETH9Call::SELECTOR;
    pub const REFUND_ETH: [u8; 4] = IPeripheryPayments::refundETHCall::SELECTOR;
}
