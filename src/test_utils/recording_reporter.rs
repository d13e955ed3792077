use alloy_primitives::{Address, TxHash};
use parking_lot::Mutex;

use crate::{
    apis::Reporter,
    types::{BalanceSnapshot, MintReceipt, TokenPair, WorkflowState, errors::LiquidityError}
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Transition(WorkflowState, WorkflowState),
    Snapshot(BalanceSnapshot),
    Approving(Address),
    Approved(TxHash, TxHash),
    Minted(TxHash),
    Failed(WorkflowState, String)
}

#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().clone()
    }

    /// Every state entered, starting from `Init`.
    pub fn states(&self) -> Vec<WorkflowState> {
        let events = self.events.lock();
        std::iter::once(WorkflowState::Init)
            .chain(events.iter().filter_map(|event| match event {
                ReportEvent::Transition(_, to) => Some(*to),
                _ => None
            }))
            .collect()
    }

    fn push(&self, event: ReportEvent) {
        self.events.lock().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn on_transition(&self, from: WorkflowState, to: WorkflowState) {
        self.push(ReportEvent::Transition(from, to));
    }

    fn on_snapshot(&self, snapshot: &BalanceSnapshot) {
        self.push(ReportEvent::Snapshot(snapshot.clone()));
    }

    fn on_approving(&self, _: &TokenPair, spender: Address) {
        self.push(ReportEvent::Approving(spender));
    }

    fn on_approved(&self, (hash0, hash1): (TxHash, TxHash)) {
        self.push(ReportEvent::Approved(hash0, hash1));
    }

    fn on_minted(&self, receipt: &MintReceipt) {
        self.push(ReportEvent::Minted(receipt.tx_hash));
    }

    fn on_failed(&self, state: WorkflowState, error: &LiquidityError) {
        self.push(ReportEvent::Failed(state, error.to_string()));
    }
}
