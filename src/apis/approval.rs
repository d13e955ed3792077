use alloy_primitives::{Address, TxHash, U256};
use futures::TryFutureExt;
use tracing::info;

use crate::{
    providers::{LedgerApi, OperatingAccount},
    types::{TokenPair, errors::LiquidityError}
};

/// Lets `spender` pull up to `amount0` / `amount1` of the pair from the
/// account. Both approvals are submitted concurrently and the step finishes
/// once the node has accepted both; a rejection of either fails the step.
pub async fn approve_pair<L>(
    ledger: &L,
    account: &OperatingAccount,
    pair: &TokenPair,
    spender: Address,
    amount0: U256,
    amount1: U256
) -> Result<(TxHash, TxHash), LiquidityError>
where
    L: LedgerApi + ?Sized
{
    let token0 = pair.token0.address;
    let token1 = pair.token1.address;

    let approvals = futures::future::try_join(
        ledger
            .submit_approve(account, token0, spender, amount0)
            .map_err(LiquidityError::authorization(token0)),
        ledger
            .submit_approve(account, token1, spender, amount1)
            .map_err(LiquidityError::authorization(token1))
    )
    .await?;

    info!(target: "approval", ?spender, %amount0, %amount1, "tokens approved");
    Ok(approvals)
}
