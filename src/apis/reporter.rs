use alloy_primitives::{Address, TxHash};
use auto_impl::auto_impl;

use crate::types::{BalanceSnapshot, MintReceipt, TokenPair, WorkflowState, errors::LiquidityError};

const SEPARATOR: &str = "--------------------------------------------------";

/// Observer of a liquidity-add run. Every hook defaults to doing nothing.
#[auto_impl(&, Box, Arc)]
pub trait Reporter: Send + Sync {
    fn on_transition(&self, _from: WorkflowState, _to: WorkflowState) {}

    fn on_snapshot(&self, _snapshot: &BalanceSnapshot) {}

    fn on_approving(&self, _pair: &TokenPair, _spender: Address) {}

    fn on_approved(&self, _tx_hashes: (TxHash, TxHash)) {}

    fn on_minted(&self, _receipt: &MintReceipt) {}

    fn on_failed(&self, _state: WorkflowState, _error: &LiquidityError) {}
}

impl Reporter for () {}

/// Prints progress to stdout and failures to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    fn print(lines: Vec<String>) {
        for line in lines {
            println!("{line}");
        }
    }
}

impl Reporter for ConsoleReporter {
    fn on_snapshot(&self, snapshot: &BalanceSnapshot) {
        Self::print(snapshot_lines(snapshot));
    }

    fn on_approving(&self, _: &TokenPair, _: Address) {
        Self::print(vec![SEPARATOR.to_string(), "Approving tokens for liquidity...".to_string()]);
    }

    fn on_approved(&self, _: (TxHash, TxHash)) {
        Self::print(vec!["Tokens approved.".to_string(), SEPARATOR.to_string()]);
    }

    fn on_minted(&self, receipt: &MintReceipt) {
        Self::print(minted_lines(receipt));
    }

    fn on_failed(&self, state: WorkflowState, error: &LiquidityError) {
        println!("{SEPARATOR}");
        eprintln!("{}", failure_line(state, error));
        println!("{SEPARATOR}");
    }
}

/// Both balances of `snapshot`, labels padded so the values line up.
pub(crate) fn snapshot_lines(snapshot: &BalanceSnapshot) -> Vec<String> {
    let width = snapshot
        .token0
        .token
        .symbol
        .len()
        .max(snapshot.token1.token.symbol.len())
        + " Balance:".len();

    let mut lines = vec![SEPARATOR.to_string(), format!("Balances {}:", snapshot.label)];
    for balance in [&snapshot.token0, &snapshot.token1] {
        let label = format!("{} Balance:", balance.token.symbol);
        lines.push(format!("  {label:<width$} {}", balance.formatted()));
    }
    lines.push(SEPARATOR.to_string());

    lines
}

pub(crate) fn minted_lines(receipt: &MintReceipt) -> Vec<String> {
    let mut lines = vec![
        SEPARATOR.to_string(),
        "Liquidity added successfully!".to_string(),
        format!("Transaction hash: {}", receipt.tx_hash)
    ];
    if let Some(position) = &receipt.position {
        lines.push(format!("Position token id: {}", position.token_id));
    }
    lines.push(SEPARATOR.to_string());

    lines
}

pub(crate) fn failure_line(state: WorkflowState, error: &LiquidityError) -> String {
    format!("An error occurred during {state}: {error}")
}
