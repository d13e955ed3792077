mod common;
pub use common::*;

mod config;
pub use config::*;

pub mod contract_bindings;
pub mod errors;

use alloy_primitives::{Address, address};

pub const DAI: Address = address!("6B175474E89094C44Da98b954EedeAC495271d0F");
pub const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// Uniswap V3 `NonfungiblePositionManager` on mainnet.
pub const NONFUNGIBLE_POSITION_MANAGER: Address =
    address!("C36442b4a4522E871399CD717aBDD847Ab11FE88");

/// Mainnet holder of both DAI and WETH, impersonated on forks.
pub const DEFAULT_LIQUIDITY_ACCOUNT: Address =
    address!("f584f8728b874a6a5c7a8d4d387c9aae9172d621");

pub const TOKEN_DECIMALS: u8 = 18;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// Widest range usable with a tick spacing of 60.
pub const FULL_RANGE_TICK_LOWER: i32 = -887220;
pub const FULL_RANGE_TICK_UPPER: i32 = 887220;

pub const MAX_FEE: u32 = (1 << 24) - 1;

pub const DEFAULT_DEADLINE_OFFSET: u64 = 600;

/// Fee tiers in hundredths of a basis point.
pub struct FeeTier;

impl FeeTier {
    pub const LOW: u32 = 500;
    pub const MEDIUM: u32 = 3000;
    pub const HIGH: u32 = 10000;

    pub fn tick_spacing(fee: u32) -> Option<i32> {
        match fee {
            Self::LOW => Some(10),
            Self::MEDIUM => Some(60),
            Self::HIGH => Some(200),
            _ => None
        }
    }
}
