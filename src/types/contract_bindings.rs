pub use bindings::*;

#[rustfmt::skip]
mod bindings {
    alloy_sol_types::sol! {
        #[allow(missing_docs)]
        #[derive(Debug, PartialEq, Eq)]
        interface IERC20 {
            event Transfer(address indexed from, address indexed to, uint256 value);
            event Approval(address indexed owner, address indexed spender, uint256 value);

            function symbol() external view returns (string memory);
            function balanceOf(address account) external view returns (uint256);
            function allowance(address owner, address spender) external view returns (uint256);
            function approve(address spender, uint256 amount) external returns (bool);
        }

        #[allow(missing_docs)]
        #[derive(Debug, PartialEq, Eq)]
        interface INonfungiblePositionManager {
            struct MintParams {
                address token0;
                address token1;
                uint24 fee;
                int24 tickLower;
                int24 tickUpper;
                uint256 amount0Desired;
                uint256 amount1Desired;
                uint256 amount0Min;
                uint256 amount1Min;
                address recipient;
                uint256 deadline;
            }

            event IncreaseLiquidity(uint256 indexed tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);

            function mint(MintParams calldata params)
                external
                payable
                returns (uint256 tokenId, uint128 liquidity, uint256 amount0, uint256 amount1);
        }
    }
}
