pub mod apis;
pub mod providers;
pub mod types;

use alloy_primitives::Address;
use alloy_provider::DynProvider;
use alloy_signer_local::PrivateKeySigner;
use apis::{Reporter, approve_pair, balance_snapshot, mint_position, resolve_symbols};
use providers::{LedgerApi, LedgerProvider, OperatingAccount};
use tracing::{debug, warn};
use types::{
    BalanceSnapshot, LiquidityConfig, LiquidityReport, MintRequest, TokenPair, WorkflowState,
    errors::LiquidityError
};

pub const BEFORE_LABEL: &str = "Before Liquidity Addition";
pub const AFTER_LABEL: &str = "After Liquidity Addition";

/// Adds liquidity for one account to one pool:
/// balances before, approve both tokens, mint, balances after.
///
/// A failed step ends the run. Nothing is retried or rolled back, so an
/// approval made before a failed mint stays in place.
#[derive(Debug, Clone)]
pub struct LiquidityProvider<L, R = ()> {
    ledger:           L,
    reporter:         R,
    pair:             TokenPair,
    position_manager: Address,
    account:          OperatingAccount
}

impl<L: LedgerApi> LiquidityProvider<L> {
    pub fn new(
        ledger: L,
        pair: TokenPair,
        position_manager: Address,
        account: OperatingAccount
    ) -> Self {
        Self { ledger, reporter: (), pair, position_manager, account }
    }
}

impl LiquidityProvider<LedgerProvider<DynProvider>> {
    /// Connects to the configured node and obtains the operating account,
    /// from `LP_PRIVATE_KEY` when one is set and by impersonation otherwise.
    pub async fn from_config(config: &LiquidityConfig) -> Result<Self, LiquidityError> {
        let ledger = LedgerProvider::connect(config.eth_rpc_url()?)
            .await
            .map_err(LiquidityError::Connection)?;

        let (ledger, account) = match config.private_key() {
            Some(private_key) => {
                let signer: PrivateKeySigner = private_key
                    .parse()
                    .map_err(|e| LiquidityError::Config(format!("invalid private key: {e}")))?;
                let (ledger, account) = ledger.with_wallet(signer);
                if account.address() != config.account() {
                    warn!(
                        configured = ?config.account(),
                        signer = ?account.address(),
                        "private key overrides the configured account"
                    );
                }
                (ledger, account)
            }
            None => {
                let account = ledger.impersonate(config.account()).await?;
                (ledger, account)
            }
        };

        let pair = resolve_symbols(&ledger, config.pair().clone()).await;
        Ok(Self::new(ledger, pair, config.position_manager(), account))
    }
}

impl<L, R> LiquidityProvider<L, R>
where
    L: LedgerApi,
    R: Reporter
{
    pub fn with_reporter<R1: Reporter>(self, reporter: R1) -> LiquidityProvider<L, R1> {
        LiquidityProvider {
            ledger: self.ledger,
            reporter,
            pair: self.pair,
            position_manager: self.position_manager,
            account: self.account
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn pair(&self) -> &TokenPair {
        &self.pair
    }

    pub fn account(&self) -> &OperatingAccount {
        &self.account
    }

    pub fn position_manager(&self) -> Address {
        self.position_manager
    }

    /// Runs the workflow once. Not idempotent: every successful run mints a
    /// new position and spends more of the account's balance.
    pub async fn run(&self, request: &MintRequest) -> Result<LiquidityReport, LiquidityError> {
        let mut state = WorkflowState::Init;

        match self.run_steps(request, &mut state).await {
            Ok(report) => {
                self.transition(&mut state, WorkflowState::Done);
                Ok(report)
            }
            Err(e) => {
                self.reporter.on_failed(state, &e);
                self.transition(&mut state, WorkflowState::Failed);
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        request: &MintRequest,
        state: &mut WorkflowState
    ) -> Result<LiquidityReport, LiquidityError> {
        self.check_request(request)?;

        self.transition(state, WorkflowState::SnapshotBefore);
        let before = self.snapshot(BEFORE_LABEL, None).await?;

        self.transition(state, WorkflowState::Approving);
        self.reporter
            .on_approving(&self.pair, self.position_manager);
        let approvals = approve_pair(
            &self.ledger,
            &self.account,
            &self.pair,
            self.position_manager,
            request.amount0_desired,
            request.amount1_desired
        )
        .await?;
        self.reporter.on_approved(approvals);

        self.transition(state, WorkflowState::Minting);
        let mint =
            mint_position(&self.ledger, &self.account, self.position_manager, request).await?;
        self.reporter.on_minted(&mint);

        self.transition(state, WorkflowState::SnapshotAfter);
        let after = self.snapshot(AFTER_LABEL, mint.block_number).await?;

        Ok(LiquidityReport { before, after, mint })
    }

    fn check_request(&self, request: &MintRequest) -> Result<(), LiquidityError> {
        if [request.token0, request.token1] != self.pair.addresses() {
            return Err(LiquidityError::Config(format!(
                "request tokens {:?}/{:?} do not match the provider's pair {:?}/{:?}",
                request.token0, request.token1, self.pair.token0.address, self.pair.token1.address
            )));
        }
        if !self.pair.is_canonically_ordered() {
            warn!(pair = ?self.pair.addresses(), "token0 sorts after token1, mint will revert");
        }

        request.validate()
    }

    async fn snapshot(
        &self,
        label: &str,
        block_number: Option<u64>
    ) -> Result<BalanceSnapshot, LiquidityError> {
        let snapshot = balance_snapshot(
            &self.ledger,
            &self.pair,
            self.account.address(),
            label,
            block_number
        )
        .await?;
        self.reporter.on_snapshot(&snapshot);

        Ok(snapshot)
    }

    fn transition(&self, state: &mut WorkflowState, next: WorkflowState) {
        debug!(from = %state, to = %next, "workflow transition");
        self.reporter.on_transition(*state, next);
        *state = next;
    }
}
