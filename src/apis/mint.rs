use alloy_primitives::Address;
use tracing::{info, warn};

use crate::{
    providers::{LedgerApi, OperatingAccount},
    types::{Deadline, MintReceipt, MintRequest, errors::LiquidityError, unix_now}
};

/// Submits `request` to the position manager and waits for one confirmation.
///
/// A relative deadline is anchored to the later of the wall clock and the
/// latest block, so a fork whose clock lags still sees it in the future. An
/// absolute deadline is sent as is and an expired one is left for the contract
/// to reject.
pub async fn mint_position<L>(
    ledger: &L,
    account: &OperatingAccount,
    position_manager: Address,
    request: &MintRequest
) -> Result<MintReceipt, LiquidityError>
where
    L: LedgerApi + ?Sized
{
    request.validate()?;

    let now = match request.deadline {
        Deadline::At(_) => 0,
        Deadline::Offset(_) => match ledger.block_timestamp().await {
            Ok(block_ts) => block_ts.max(unix_now()),
            Err(e) => {
                warn!(target: "mint", error = %e, "no block timestamp, using wall clock");
                unix_now()
            }
        }
    };
    let params = request.to_params(now)?;

    let receipt = ledger
        .submit_mint(account, position_manager, params)
        .await
        .map_err(LiquidityError::mint_rejected)?;

    info!(target: "mint", tx_hash = ?receipt.tx_hash, block = ?receipt.block_number, "minted");
    Ok(receipt)
}
