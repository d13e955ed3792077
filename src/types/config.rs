use std::{fmt::Display, str::FromStr};

use alloy_primitives::Address;

use super::{
    DAI, DEFAULT_DEADLINE_OFFSET, DEFAULT_LIQUIDITY_ACCOUNT, FULL_RANGE_TICK_LOWER,
    FULL_RANGE_TICK_UPPER, FeeTier, MintRequest, NONFUNGIBLE_POSITION_MANAGER, Token, TokenPair,
    WETH, errors::LiquidityError, parse_token_amount
};

/// Inputs of a single liquidity-add run. Defaults reproduce the DAI/WETH full
/// range mint on mainnet.
#[derive(Debug, Clone)]
pub struct LiquidityConfig {
    eth_rpc_url:      Option<String>,
    pair:             TokenPair,
    position_manager: Address,
    account:          Address,
    private_key:      Option<String>,
    amount0:          String,
    amount1:          String,
    fee:              u32,
    tick_lower:       i32,
    tick_upper:       i32,
    deadline_offset:  u64
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            eth_rpc_url:      None,
            pair:             TokenPair::new(Token::new(DAI, "DAI"), Token::new(WETH, "WETH")),
            position_manager: NONFUNGIBLE_POSITION_MANAGER,
            account:          DEFAULT_LIQUIDITY_ACCOUNT,
            private_key:      None,
            amount0:          "1000".to_string(),
            amount1:          "1".to_string(),
            fee:              FeeTier::MEDIUM,
            tick_lower:       FULL_RANGE_TICK_LOWER,
            tick_upper:       FULL_RANGE_TICK_UPPER,
            deadline_offset:  DEFAULT_DEADLINE_OFFSET
        }
    }
}

impl LiquidityConfig {
    pub fn new(eth_rpc_url: impl ToString) -> Self {
        Self { eth_rpc_url: Some(eth_rpc_url.to_string()), ..Default::default() }
    }

    /// Loads `.env` if present, then overrides the defaults with any `ETH_RPC_URL`
    /// / `LP_*` variables that are set.
    pub fn from_env() -> Result<Self, LiquidityError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with variables read through `lookup`. A token
    /// given without a symbol gets an empty one, which is later filled from the
    /// token's own `symbol()`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LiquidityError>
    where
        F: Fn(&str) -> Option<String>
    {
        let mut this = Self::default();

        this.eth_rpc_url = lookup("ETH_RPC_URL");
        this.private_key = lookup("LP_PRIVATE_KEY");

        if let Some(token0) = parse_var::<Address>(&lookup, "LP_TOKEN0")? {
            this.pair.token0 = Token::new(token0, lookup("LP_TOKEN0_SYMBOL").unwrap_or_default());
        } else if let Some(symbol) = lookup("LP_TOKEN0_SYMBOL") {
            this.pair.token0.symbol = symbol;
        }
        if let Some(token1) = parse_var::<Address>(&lookup, "LP_TOKEN1")? {
            this.pair.token1 = Token::new(token1, lookup("LP_TOKEN1_SYMBOL").unwrap_or_default());
        } else if let Some(symbol) = lookup("LP_TOKEN1_SYMBOL") {
            this.pair.token1.symbol = symbol;
        }

        if let Some(position_manager) = parse_var(&lookup, "LP_POSITION_MANAGER")? {
            this.position_manager = position_manager;
        }
        if let Some(account) = parse_var(&lookup, "LP_ACCOUNT")? {
            this.account = account;
        }
        if let Some(amount0) = lookup("LP_AMOUNT0") {
            this.amount0 = amount0;
        }
        if let Some(amount1) = lookup("LP_AMOUNT1") {
            this.amount1 = amount1;
        }
        if let Some(fee) = parse_var(&lookup, "LP_FEE")? {
            this.fee = fee;
        }
        if let Some(tick_lower) = parse_var(&lookup, "LP_TICK_LOWER")? {
            this.tick_lower = tick_lower;
        }
        if let Some(tick_upper) = parse_var(&lookup, "LP_TICK_UPPER")? {
            this.tick_upper = tick_upper;
        }
        if let Some(deadline_offset) = parse_var(&lookup, "LP_DEADLINE_SECS")? {
            this.deadline_offset = deadline_offset;
        }

        Ok(this)
    }

    pub fn with_eth_rpc_url(mut self, url: impl ToString) -> Self {
        self.eth_rpc_url = Some(url.to_string());
        self
    }

    pub fn with_pair(mut self, pair: TokenPair) -> Self {
        self.pair = pair;
        self
    }

    pub fn with_position_manager(mut self, position_manager: Address) -> Self {
        self.position_manager = position_manager;
        self
    }

    pub fn with_account(mut self, account: Address) -> Self {
        self.account = account;
        self
    }

    pub fn with_private_key(mut self, private_key: impl ToString) -> Self {
        self.private_key = Some(private_key.to_string());
        self
    }

    pub fn with_amounts(mut self, amount0: impl ToString, amount1: impl ToString) -> Self {
        self.amount0 = amount0.to_string();
        self.amount1 = amount1.to_string();
        self
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

    pub fn with_deadline_offset(mut self, secs: u64) -> Self {
        self.deadline_offset = secs;
        self
    }

    pub fn eth_rpc_url(&self) -> Result<&str, LiquidityError> {
        self.eth_rpc_url
            .as_deref()
            .ok_or_else(|| LiquidityError::Config("no eth rpc url set (ETH_RPC_URL)".to_string()))
    }

    pub fn pair(&self) -> &TokenPair {
        &self.pair
    }

    pub fn position_manager(&self) -> Address {
        self.position_manager
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref()
    }

    /// The mint request this config describes, minted to the operating
    /// account itself.
    pub fn mint_request(&self, recipient: Address) -> Result<MintRequest, LiquidityError> {
        let request = MintRequest::new(&self.pair, recipient)
            .with_fee(self.fee)
            .with_ticks(self.tick_lower, self.tick_upper)
            .with_amounts(parse_token_amount(&self.amount0)?, parse_token_amount(&self.amount1)?)
            .with_deadline_offset(self.deadline_offset);
        request.validate()?;

        Ok(request)
    }
}

fn parse_var<T>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str
) -> Result<Option<T>, LiquidityError>
where
    T: FromStr,
    T::Err: Display
{
    lookup(key)
        .map(|val| {
            val.trim()
                .parse()
                .map_err(|e| LiquidityError::Config(format!("{key}={val:?}: {e}")))
        })
        .transpose()
}
