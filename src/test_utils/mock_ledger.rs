use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, TxHash, U256, keccak256};
use alloy_transport::TransportErrorKind;
use parking_lot::Mutex;

use super::units;
use crate::{
    providers::{AccountKind, LedgerApi, OperatingAccount},
    types::{
        DAI, FeeTier, MAX_TICK, MIN_TICK, MintReceipt, MintedPosition, WETH,
        contract_bindings::INonfungiblePositionManager::MintParams, errors::LedgerError, unix_now
    }
};

const BLOCK_TIME: u64 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Approve { from: Address, token: Address, spender: Address, amount: U256 },
    Mint { from: Address, position_manager: Address, params: MintParams }
}

#[derive(Debug, Default)]
struct MockState {
    symbols:            HashMap<Address, String>,
    balances:           HashMap<(Address, Address), U256>,
    allowances:         HashMap<(Address, Address, Address), U256>,
    rejected_approvals: HashSet<Address>,
    positions:          Vec<(Address, MintedPosition)>,
    submissions:        Vec<Submission>,
    unreachable:        bool,
    timestamp:          u64,
    block_number:       u64,
    tx_count:           u64
}

impl MockState {
    fn next_tx(&mut self) -> (TxHash, u64) {
        self.tx_count += 1;
        self.block_number += 1;
        self.timestamp += BLOCK_TIME;
        (keccak256(self.tx_count.to_be_bytes()), self.block_number)
    }

    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }
}

/// In-memory ledger with ERC-20 and Uniswap V3 position manager semantics,
/// including the position manager's revert strings. Every submission is
/// mined immediately.
#[derive(Debug)]
pub struct MockLedger {
    state: Mutex<MockState>,
    /// Pool price as token1 per token0, `(numerator, denominator)`.
    price: (U256, U256)
}

impl MockLedger {
    pub fn new(tokens: &[(Address, &str)], price: (U256, U256)) -> Self {
        let state = MockState {
            symbols: tokens
                .iter()
                .map(|(address, symbol)| (*address, symbol.to_string()))
                .collect(),
            timestamp: unix_now(),
            block_number: 1,
            ..Default::default()
        };

        Self { state: Mutex::new(state), price }
    }

    /// DAI / WETH priced at 2000 DAI per WETH.
    pub fn dai_weth() -> Self {
        Self::new(&[(DAI, "DAI"), (WETH, "WETH")], (U256::from(1u64), U256::from(2000u64)))
    }

    pub fn account(&self, address: Address) -> OperatingAccount {
        OperatingAccount::new(address, AccountKind::Impersonated)
    }

    pub fn set_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state.lock().balances.insert((token, owner), amount);
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.state.lock().balance(token, owner)
    }

    pub fn set_allowance(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state
            .lock()
            .allowances
            .insert((token, owner, spender), amount);
    }

    pub fn set_timestamp(&self, timestamp: u64) {
        self.state.lock().timestamp = timestamp;
    }

    pub fn timestamp(&self) -> u64 {
        self.state.lock().timestamp
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.lock().unreachable = unreachable;
    }

    pub fn reject_approvals_of(&self, token: Address) {
        self.state.lock().rejected_approvals.insert(token);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }

    pub fn last_mint_params(&self) -> Option<MintParams> {
        self.state
            .lock()
            .submissions
            .iter()
            .rev()
            .find_map(|submission| match submission {
                Submission::Mint { params, .. } => Some(params.clone()),
                _ => None
            })
    }

    pub fn positions_of(&self, owner: Address) -> Vec<MintedPosition> {
        self.state
            .lock()
            .positions
            .iter()
            .filter(|(recipient, _)| *recipient == owner)
            .map(|(_, position)| position.clone())
            .collect()
    }

    fn check_reachable(&self) -> Result<(), LedgerError> {
        if self.state.lock().unreachable {
            return Err(TransportErrorKind::backend_gone().into());
        }
        Ok(())
    }

    /// Amounts the pool takes at its current price, limited by whichever side
    /// runs out first.
    fn amounts_used(&self, params: &MintParams) -> (U256, U256) {
        let (num, den) = self.price;
        let needed1 = params.amount0Desired.saturating_mul(num) / den;
        if needed1 <= params.amount1Desired {
            (params.amount0Desired, needed1)
        } else {
            (params.amount1Desired.saturating_mul(den) / num, params.amount1Desired)
        }
    }
}

fn revert(reason: &str) -> LedgerError {
    LedgerError::ExecutionReverted(reason.to_string())
}

#[async_trait::async_trait]
impl LedgerApi for MockLedger {
    async fn token_balance(
        &self,
        token: Address,
        owner: Address,
        _: Option<u64>
    ) -> Result<U256, LedgerError> {
        self.check_reachable()?;

        let state = self.state.lock();
        if !state.symbols.contains_key(&token) {
            // no code at the address, so nothing to decode
            return Err(alloy_sol_types::Error::Overrun.into());
        }
        Ok(state.balance(token, owner))
    }

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address
    ) -> Result<U256, LedgerError> {
        self.check_reachable()?;
        Ok(self.state.lock().allowance(token, owner, spender))
    }

    async fn token_symbol(&self, token: Address) -> Result<String, LedgerError> {
        self.check_reachable()?;
        self.state
            .lock()
            .symbols
            .get(&token)
            .cloned()
            .ok_or(alloy_sol_types::Error::Overrun.into())
    }

    async fn block_timestamp(&self) -> Result<u64, LedgerError> {
        self.check_reachable()?;
        Ok(self.state.lock().timestamp)
    }

    async fn submit_approve(
        &self,
        account: &OperatingAccount,
        token: Address,
        spender: Address,
        amount: U256
    ) -> Result<TxHash, LedgerError> {
        self.check_reachable()?;

        let mut state = self.state.lock();
        state.submissions.push(Submission::Approve {
            from: account.address(),
            token,
            spender,
            amount
        });
        if state.rejected_approvals.contains(&token) {
            return Err(revert("approve reverted"));
        }

        state
            .allowances
            .insert((token, account.address(), spender), amount);
        Ok(state.next_tx().0)
    }

    async fn submit_mint(
        &self,
        account: &OperatingAccount,
        position_manager: Address,
        params: MintParams
    ) -> Result<MintReceipt, LedgerError> {
        self.check_reachable()?;

        let from = account.address();
        let mut state = self.state.lock();
        state.submissions.push(Submission::Mint {
            from,
            position_manager,
            params: params.clone()
        });

        if U256::from(state.timestamp) > params.deadline {
            return Err(revert("Transaction too old"));
        }

        let (lower, upper) = (params.tickLower.as_i32(), params.tickUpper.as_i32());
        if lower >= upper {
            return Err(revert("TLU"));
        }
        if lower < MIN_TICK {
            return Err(revert("TLM"));
        }
        if upper > MAX_TICK {
            return Err(revert("TUM"));
        }
        let Some(spacing) = FeeTier::tick_spacing(params.fee.to::<u32>()) else {
            return Err(revert(""));
        };
        if lower % spacing != 0 || upper % spacing != 0 {
            return Err(revert(""));
        }

        let (used0, used1) = self.amounts_used(&params);
        if used0 < params.amount0Min || used1 < params.amount1Min {
            return Err(revert("Price slippage check"));
        }

        for (token, used) in [(params.token0, used0), (params.token1, used1)] {
            if state.allowance(token, from, position_manager) < used
                || state.balance(token, from) < used
            {
                return Err(revert("STF"));
            }
        }

        for (token, used) in [(params.token0, used0), (params.token1, used1)] {
            let balance = state.balance(token, from) - used;
            state.balances.insert((token, from), balance);

            let allowance = state.allowance(token, from, position_manager);
            if allowance != U256::MAX {
                state
                    .allowances
                    .insert((token, from, position_manager), allowance - used);
            }
        }

        let position = MintedPosition {
            token_id:  U256::from(state.positions.len() + 1),
            liquidity: u128::try_from(used0.min(used1)).unwrap_or(u128::MAX),
            amount0:   used0,
            amount1:   used1
        };
        state.positions.push((params.recipient, position.clone()));

        let (tx_hash, block_number) = state.next_tx();
        Ok(MintReceipt {
            tx_hash,
            block_number: Some(block_number),
            gas_used: 500_000,
            position: Some(position)
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::aliases::{I24, U24};

    use super::*;

    fn params(owner: Address) -> MintParams {
        MintParams {
            token0:         DAI,
            token1:         WETH,
            fee:            U24::from(3000u32),
            tickLower:      I24::unchecked_from(-887220),
            tickUpper:      I24::unchecked_from(887220),
            amount0Desired: units(1000),
            amount1Desired: units(1),
            amount0Min:     U256::ZERO,
            amount1Min:     U256::ZERO,
            recipient:      owner,
            deadline:       U256::from(u64::MAX)
        }
    }

    #[tokio::test]
    async fn test_mint_limited_by_scarcer_side() {
        let ledger = MockLedger::dai_weth();
        let owner = Address::repeat_byte(0xaa);
        let account = ledger.account(owner);
        let spender = Address::repeat_byte(0xbb);
        ledger.set_balance(DAI, owner, units(5000));
        ledger.set_balance(WETH, owner, units(10));
        ledger.set_allowance(DAI, owner, spender, units(1000));
        ledger.set_allowance(WETH, owner, spender, units(1));

        let receipt = ledger
            .submit_mint(&account, spender, params(owner))
            .await
            .unwrap();
        let position = receipt.position.unwrap();

        assert_eq!(position.amount0, units(1000));
        assert_eq!(position.amount1, units(1) / U256::from(2u64));
        assert_eq!(ledger.balance(DAI, owner), units(4000));
        assert_eq!(ledger.allowance_left(WETH, owner, spender), units(1) / U256::from(2u64));
        assert_eq!(ledger.positions_of(owner), vec![position]);
    }

    #[tokio::test]
    async fn test_failed_mint_changes_nothing() {
        let ledger = MockLedger::dai_weth();
        let owner = Address::repeat_byte(0xaa);
        let account = ledger.account(owner);
        let spender = Address::repeat_byte(0xbb);
        ledger.set_balance(DAI, owner, units(5000));
        ledger.set_allowance(DAI, owner, spender, U256::MAX);
        ledger.set_allowance(WETH, owner, spender, U256::MAX);

        let err = ledger
            .submit_mint(&account, spender, params(owner))
            .await
            .unwrap_err();

        assert_eq!(err.revert_reason(), "STF");
        assert_eq!(ledger.balance(DAI, owner), units(5000));
        assert!(ledger.positions_of(owner).is_empty());
    }

    impl MockLedger {
        fn allowance_left(&self, token: Address, owner: Address, spender: Address) -> U256 {
            self.state.lock().allowance(token, owner, spender)
        }
    }
}
