use alloy_json_rpc::RpcError;
use alloy_primitives::{Address, TxHash};
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportErrorKind;

/// Failure of a single interaction with the ledger node.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("eth call error: {0}")]
    EthCall(#[from] RpcError<TransportErrorKind>),
    #[error("abi decoding error: {0:?}")]
    AbiDecoding(#[from] alloy_sol_types::Error),
    #[error("pending transaction error: {0}")]
    PendingTransaction(#[from] PendingTransactionError),
    #[error("transaction {0:?} was mined but reverted")]
    Reverted(TxHash),
    #[error("execution reverted: {0}")]
    ExecutionReverted(String),
    #[error("latest block not found")]
    MissingBlock
}

impl LedgerError {
    /// The node's own description of the failure, without any wrapping added
    /// by this crate.
    pub fn revert_reason(&self) -> String {
        match self {
            Self::EthCall(RpcError::ErrorResp(payload))
            | Self::PendingTransaction(PendingTransactionError::TransportError(
                RpcError::ErrorResp(payload)
            )) => payload.message.to_string(),
            Self::ExecutionReverted(reason) => reason.clone(),
            other => other.to_string()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LiquidityError {
    #[error("ledger query against {address:?} failed: {source}")]
    LedgerQuery { address: Address, source: LedgerError },
    #[error("approval of token {token:?} rejected: {source}")]
    Authorization { token: Address, source: LedgerError },
    #[error("mint rejected: {reason}")]
    MintRejected { reason: String, source: LedgerError },
    #[error("invalid tick range: tickLower {lower}, tickUpper {upper}")]
    InvalidTickRange { lower: i32, upper: i32 },
    #[error("invalid token amount {input:?}: {reason}")]
    InvalidAmount { input: String, reason: String },
    #[error("could not impersonate account {account:?}: {source}")]
    Impersonation { account: Address, source: LedgerError },
    #[error("could not connect to ledger: {0}")]
    Connection(#[source] LedgerError),
    #[error("config error: {0}")]
    Config(String)
}

impl LiquidityError {
    pub(crate) fn query(address: Address) -> impl FnOnce(LedgerError) -> Self {
        move |source| Self::LedgerQuery { address, source }
    }

    pub(crate) fn authorization(token: Address) -> impl FnOnce(LedgerError) -> Self {
        move |source| Self::Authorization { token, source }
    }

    pub(crate) fn mint_rejected(source: LedgerError) -> Self {
        Self::MintRejected { reason: source.revert_reason(), source }
    }
}
