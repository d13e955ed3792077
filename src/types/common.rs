use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::{
    Address, TxHash, U256,
    aliases::{I24, U24},
    utils::{ParseUnits, format_units, parse_units}
};
use serde::{Deserialize, Serialize};

use super::{
    DEFAULT_DEADLINE_OFFSET, FULL_RANGE_TICK_LOWER, FULL_RANGE_TICK_UPPER, FeeTier, MAX_FEE,
    MAX_TICK, MIN_TICK, TOKEN_DECIMALS, contract_bindings::INonfungiblePositionManager::MintParams,
    errors::LiquidityError
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol:  String
}

impl Token {
    pub fn new(address: Address, symbol: impl ToString) -> Self {
        Self { address, symbol: symbol.to_string() }
    }
}

/// The two tokens of a pool, in the order the mint call expects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token0: Token,
    pub token1: Token
}

impl TokenPair {
    pub fn new(token0: Token, token1: Token) -> Self {
        Self { token0, token1 }
    }

    /// Pools sort their currencies by address; a pair that does not will be
    /// rejected by the position manager.
    pub fn is_canonically_ordered(&self) -> bool {
        self.token0.address < self.token1.address
    }

    pub fn addresses(&self) -> [Address; 2] {
        [self.token0.address, self.token1.address]
    }
}

/// Parses a decimal string like `"1000"` or `"0.5"` into the token's smallest
/// unit.
pub fn parse_token_amount(input: &str) -> Result<U256, LiquidityError> {
    match parse_units(input, TOKEN_DECIMALS) {
        Ok(ParseUnits::U256(amount)) => Ok(amount),
        Ok(ParseUnits::I256(_)) => Err(LiquidityError::InvalidAmount {
            input:  input.to_string(),
            reason: "amount must not be negative".to_string()
        }),
        Err(e) => {
            Err(LiquidityError::InvalidAmount { input: input.to_string(), reason: e.to_string() })
        }
    }
}

pub fn format_token_amount(amount: U256) -> String {
    format_units(amount, TOKEN_DECIMALS).unwrap_or_else(|_| amount.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub token: Token,
    pub raw:   U256
}

impl TokenBalance {
    pub fn formatted(&self) -> String {
        format_token_amount(self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub label:  String,
    pub owner:  Address,
    pub token0: TokenBalance,
    pub token1: TokenBalance
}

impl BalanceSnapshot {
    /// Amount of each token that left the account between `self` and `after`.
    /// Tokens that increased count as zero spent.
    pub fn spent_until(&self, after: &BalanceSnapshot) -> (U256, U256) {
        (
            self.token0.raw.saturating_sub(after.token0.raw),
            self.token1.raw.saturating_sub(after.token1.raw)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deadline {
    /// Seconds after the moment the mint is submitted.
    Offset(u64),
    /// Absolute unix timestamp, passed to the contract untouched.
    At(u64)
}

impl Deadline {
    /// Offsets saturate at `u64::MAX` so a huge offset never lands in the past.
    pub fn resolve(&self, now: u64) -> u64 {
        match self {
            Self::Offset(secs) => now.saturating_add(*secs),
            Self::At(ts) => *ts
        }
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Everything the position manager's `mint` needs, before the deadline has
/// been pinned to a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRequest {
    pub token0:          Address,
    pub token1:          Address,
    pub fee:             u32,
    pub tick_lower:      i32,
    pub tick_upper:      i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min:     U256,
    pub amount1_min:     U256,
    pub recipient:       Address,
    pub deadline:        Deadline
}

impl MintRequest {
    /// Full range, 0.3% fee tier, no slippage floor, ten minute deadline.
    pub fn new(pair: &TokenPair, recipient: Address) -> Self {
        Self {
            token0: pair.token0.address,
            token1: pair.token1.address,
            fee: FeeTier::MEDIUM,
            tick_lower: FULL_RANGE_TICK_LOWER,
            tick_upper: FULL_RANGE_TICK_UPPER,
            amount0_desired: U256::ZERO,
            amount1_desired: U256::ZERO,
            amount0_min: U256::ZERO,
            amount1_min: U256::ZERO,
            recipient,
            deadline: Deadline::Offset(DEFAULT_DEADLINE_OFFSET)
        }
    }

    pub fn with_fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_ticks(mut self, tick_lower: i32, tick_upper: i32) -> Self {
        self.tick_lower = tick_lower;
        self.tick_upper = tick_upper;
        self
    }

    pub fn with_amounts(mut self, amount0_desired: U256, amount1_desired: U256) -> Self {
        self.amount0_desired = amount0_desired;
        self.amount1_desired = amount1_desired;
        self
    }

    pub fn with_min_amounts(mut self, amount0_min: U256, amount1_min: U256) -> Self {
        self.amount0_min = amount0_min;
        self.amount1_min = amount1_min;
        self
    }

    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = Deadline::At(deadline);
        self
    }

    pub fn with_deadline_offset(mut self, secs: u64) -> Self {
        self.deadline = Deadline::Offset(secs);
        self
    }

    /// Checks that can be made without the pool. Tick spacing alignment is
    /// left to the contract.
    pub fn validate(&self) -> Result<(), LiquidityError> {
        if self.tick_lower >= self.tick_upper
            || self.tick_lower < MIN_TICK
            || self.tick_upper > MAX_TICK
        {
            return Err(LiquidityError::InvalidTickRange {
                lower: self.tick_lower,
                upper: self.tick_upper
            });
        }

        if self.fee > MAX_FEE {
            return Err(LiquidityError::Config(format!("fee {} does not fit in uint24", self.fee)));
        }

        Ok(())
    }

    /// ABI parameters with the deadline resolved against `now`.
    pub fn to_params(&self, now: u64) -> Result<MintParams, LiquidityError> {
        self.validate()?;

        Ok(MintParams {
            token0:         self.token0,
            token1:         self.token1,
            fee:            U24::from(self.fee),
            tickLower:      I24::unchecked_from(self.tick_lower),
            tickUpper:      I24::unchecked_from(self.tick_upper),
            amount0Desired: self.amount0_desired,
            amount1Desired: self.amount1_desired,
            amount0Min:     self.amount0_min,
            amount1Min:     self.amount1_min,
            recipient:      self.recipient,
            deadline:       U256::from(self.deadline.resolve(now))
        })
    }
}

/// Progress of one liquidity-add run. `Failed` can follow any state and is
/// terminal, as is `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    Init,
    SnapshotBefore,
    Approving,
    Minting,
    SnapshotAfter,
    Done,
    Failed
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::SnapshotBefore => "SNAPSHOT_BEFORE",
            Self::Approving => "APPROVING",
            Self::Minting => "MINTING",
            Self::SnapshotAfter => "SNAPSHOT_AFTER",
            Self::Done => "DONE",
            Self::Failed => "FAILED"
        };
        f.write_str(name)
    }
}

/// Decoded from the position manager's `IncreaseLiquidity` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedPosition {
    pub token_id:  U256,
    pub liquidity: u128,
    pub amount0:   U256,
    pub amount1:   U256
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub tx_hash:      TxHash,
    pub block_number: Option<u64>,
    pub gas_used:     u64,
    pub position:     Option<MintedPosition>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReport {
    pub before: BalanceSnapshot,
    pub after:  BalanceSnapshot,
    pub mint:   MintReceipt
}

impl LiquidityReport {
    pub fn tx_hash(&self) -> TxHash {
        self.mint.tx_hash
    }

    pub fn spent(&self) -> (U256, U256) {
        self.before.spent_until(&self.after)
    }
}
