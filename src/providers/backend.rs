use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_json_rpc::RpcError;
use alloy_network::{EthereumWallet, ReceiptResponse, TxSigner};
use alloy_primitives::{Address, Bytes, Signature, TxHash, TxKind, U256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder, ext::AnvilApi};
use alloy_rpc_types::{TransactionInput, TransactionRequest};
use alloy_sol_types::{SolCall, SolEvent};
use alloy_transport::TransportErrorKind;
use tracing::{debug, info};

use super::{AccountKind, LedgerApi, OperatingAccount};
use crate::types::{
    MintReceipt, MintedPosition,
    contract_bindings::{
        IERC20,
        INonfungiblePositionManager::{self, MintParams}
    },
    errors::{LedgerError, LiquidityError}
};

/// [`LedgerApi`] over any alloy provider.
#[derive(Debug, Clone)]
pub struct LedgerProvider<P> {
    eth_provider: P
}

impl LedgerProvider<DynProvider> {
    /// Connects with the recommended gas / nonce / chain id fillers.
    pub async fn connect(eth_url: &str) -> Result<Self, LedgerError> {
        let eth_provider = ProviderBuilder::new().connect(eth_url).await?.erased();
        Ok(Self { eth_provider })
    }
}

impl<P: Provider> LedgerProvider<P> {
    pub fn new(eth_provider: P) -> Self {
        Self { eth_provider }
    }

    pub fn eth_provider(&self) -> &P {
        &self.eth_provider
    }

    /// Asks the node to sign for `account`. Fails on ledgers that are not a
    /// fork or test node.
    pub async fn impersonate(&self, account: Address) -> Result<OperatingAccount, LiquidityError> {
        self.eth_provider
            .anvil_impersonate_account(account)
            .await
            .map_err(|e| LiquidityError::Impersonation { account, source: e.into() })?;

        info!(target: "ledger", ?account, "impersonating account");
        Ok(OperatingAccount::new(account, AccountKind::Impersonated))
    }

    /// Signs locally with `signer` instead of relying on the node.
    pub fn with_wallet<S>(self, signer: S) -> (LedgerProvider<DynProvider>, OperatingAccount)
    where
        P: 'static,
        S: TxSigner<Signature> + Send + Sync + 'static
    {
        let address = TxSigner::address(&signer);
        let eth_provider = ProviderBuilder::new()
            .wallet(EthereumWallet::new(signer))
            .connect_provider(self.eth_provider)
            .erased();

        (LedgerProvider { eth_provider }, OperatingAccount::new(address, AccountKind::Wallet))
    }

    async fn submit_call<IC>(
        &self,
        account: &OperatingAccount,
        contract: Address,
        call: IC
    ) -> Result<TxHash, LedgerError>
    where
        IC: SolCall + Send
    {
        let tx = TransactionRequest {
            from: Some(account.address()),
            to: Some(TxKind::Call(contract)),
            input: TransactionInput::both(call.abi_encode().into()),
            ..Default::default()
        };

        let pending = self.eth_provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }
}

pub(crate) async fn view_call<P, IC>(
    provider: &P,
    block_number: Option<u64>,
    contract: Address,
    call: IC
) -> Result<IC::Return, LedgerError>
where
    P: Provider,
    IC: SolCall + Send
{
    let tx = TransactionRequest {
        to: Some(TxKind::Call(contract)),
        input: TransactionInput::both(call.abi_encode().into()),
        ..Default::default()
    };

    let data = provider
        .call(tx)
        .block(block_number.map(Into::into).unwrap_or(BlockId::latest()))
        .await?;
    Ok(IC::abi_decode_returns(&data)?)
}

/// The revert message a replayed transaction produced, falling back to the
/// bare hash when the replay did not revert.
pub(crate) fn mined_revert(
    tx_hash: TxHash,
    replay: Result<Bytes, RpcError<TransportErrorKind>>
) -> LedgerError {
    match replay {
        Err(RpcError::ErrorResp(payload)) => {
            LedgerError::ExecutionReverted(payload.message.to_string())
        }
        _ => LedgerError::Reverted(tx_hash)
    }
}

#[async_trait::async_trait]
impl<P: Provider> LedgerApi for LedgerProvider<P> {
    async fn token_balance(
        &self,
        token: Address,
        owner: Address,
        block_number: Option<u64>
    ) -> Result<U256, LedgerError> {
        view_call(&self.eth_provider, block_number, token, IERC20::balanceOfCall { account: owner })
            .await
    }

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address
    ) -> Result<U256, LedgerError> {
        view_call(&self.eth_provider, None, token, IERC20::allowanceCall { owner, spender }).await
    }

    async fn token_symbol(&self, token: Address) -> Result<String, LedgerError> {
        view_call(&self.eth_provider, None, token, IERC20::symbolCall {}).await
    }

    async fn block_timestamp(&self) -> Result<u64, LedgerError> {
        let block = self
            .eth_provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or(LedgerError::MissingBlock)?;

        Ok(block.header.timestamp)
    }

    async fn submit_approve(
        &self,
        account: &OperatingAccount,
        token: Address,
        spender: Address,
        amount: U256
    ) -> Result<TxHash, LedgerError> {
        let tx_hash = self
            .submit_call(account, token, IERC20::approveCall { spender, amount })
            .await?;

        debug!(target: "ledger", ?token, ?spender, %amount, ?tx_hash, "approve accepted");
        Ok(tx_hash)
    }

    async fn submit_mint(
        &self,
        account: &OperatingAccount,
        position_manager: Address,
        params: MintParams
    ) -> Result<MintReceipt, LedgerError> {
        let tx = TransactionRequest {
            from: Some(account.address()),
            to: Some(TxKind::Call(position_manager)),
            input: TransactionInput::both(
                INonfungiblePositionManager::mintCall { params }
                    .abi_encode()
                    .into()
            ),
            ..Default::default()
        };

        let pending = self.eth_provider.send_transaction(tx.clone()).await?;
        debug!(target: "ledger", tx_hash = ?pending.tx_hash(), "mint accepted");

        let receipt = pending
            .with_required_confirmations(1)
            .get_receipt()
            .await?;
        if !receipt.status() {
            // replay on the parent state to get the node's revert message
            let parent = receipt
                .block_number
                .map(|n| BlockId::number(n.saturating_sub(1)))
                .unwrap_or(BlockId::latest());
            let replay = self.eth_provider.call(tx).block(parent).await;
            return Err(mined_revert(receipt.transaction_hash, replay));
        }

        let position = receipt
            .inner
            .logs()
            .iter()
            .filter(|log| log.inner.address == position_manager)
            .find_map(|log| {
                INonfungiblePositionManager::IncreaseLiquidity::decode_log(&log.inner).ok()
            })
            .map(|log| MintedPosition {
                token_id:  log.data.tokenId,
                liquidity: log.data.liquidity,
                amount0:   log.data.amount0,
                amount1:   log.data.amount1
            });

        Ok(MintReceipt {
            tx_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            position
        })
    }
}
