use alloy_primitives::Address;
use tracing::{debug, warn};

use crate::{
    providers::LedgerApi,
    types::{BalanceSnapshot, Token, TokenBalance, TokenPair, errors::LiquidityError}
};

pub async fn token_balance<L>(
    ledger: &L,
    token: &Token,
    owner: Address,
    block_number: Option<u64>
) -> Result<TokenBalance, LiquidityError>
where
    L: LedgerApi + ?Sized
{
    let raw = ledger
        .token_balance(token.address, owner, block_number)
        .await
        .map_err(LiquidityError::query(token.address))?;

    debug!(target: "snapshot", token = %token.symbol, ?owner, %raw, "read balance");
    Ok(TokenBalance { token: token.clone(), raw })
}

/// Reads both balances of `owner`. Read-only.
pub async fn balance_snapshot<L>(
    ledger: &L,
    pair: &TokenPair,
    owner: Address,
    label: &str,
    block_number: Option<u64>
) -> Result<BalanceSnapshot, LiquidityError>
where
    L: LedgerApi + ?Sized
{
    let token0 = token_balance(ledger, &pair.token0, owner, block_number).await?;
    let token1 = token_balance(ledger, &pair.token1, owner, block_number).await?;

    Ok(BalanceSnapshot { label: label.to_string(), owner, token0, token1 })
}

/// Fills in any empty symbol from the token contract. A token that cannot
/// report its symbol is labelled with its address.
pub async fn resolve_symbols<L>(ledger: &L, mut pair: TokenPair) -> TokenPair
where
    L: LedgerApi + ?Sized
{
    for token in [&mut pair.token0, &mut pair.token1] {
        if !token.symbol.is_empty() {
            continue;
        }

        token.symbol = match ledger.token_symbol(token.address).await {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!(target: "snapshot", token = ?token.address, error = %e, "no symbol");
                token.address.to_string()
            }
        };
    }

    pair
}
