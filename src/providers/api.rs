use alloy_primitives::{Address, TxHash, U256};
use auto_impl::auto_impl;

use crate::types::{
    MintReceipt, contract_bindings::INonfungiblePositionManager::MintParams, errors::LedgerError
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// The node signs on the account's behalf (`anvil_impersonateAccount`).
    /// Only valid on forks and test ledgers.
    Impersonated,
    /// A local key held by the provider's wallet.
    Wallet
}

/// The address a workflow acts for, together with the ledger's permission to
/// submit transactions from it. Only obtainable from a ledger client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatingAccount {
    address: Address,
    kind:    AccountKind
}

impl OperatingAccount {
    pub(crate) fn new(address: Address, kind: AccountKind) -> Self {
        Self { address, kind }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }
}

/// The calls the liquidity workflow makes against the ledger.
#[async_trait::async_trait]
#[auto_impl(&, Box, Arc)]
pub trait LedgerApi: Send + Sync {
    /// ERC-20 `balanceOf`, at `block_number` or the latest block.
    async fn token_balance(
        &self,
        token: Address,
        owner: Address,
        block_number: Option<u64>
    ) -> Result<U256, LedgerError>;

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address
    ) -> Result<U256, LedgerError>;

    async fn token_symbol(&self, token: Address) -> Result<String, LedgerError>;

    async fn block_timestamp(&self) -> Result<u64, LedgerError>;

    /// Returns as soon as the node has accepted the transaction.
    async fn submit_approve(
        &self,
        account: &OperatingAccount,
        token: Address,
        spender: Address,
        amount: U256
    ) -> Result<TxHash, LedgerError>;

    /// Returns once the mint has one confirmation and did not revert.
    async fn submit_mint(
        &self,
        account: &OperatingAccount,
        position_manager: Address,
        params: MintParams
    ) -> Result<MintReceipt, LedgerError>;
}
