pub mod approval;
pub mod mint;
pub mod reporter;
pub mod snapshot;

pub use approval::approve_pair;
pub use mint::mint_position;
pub use reporter::{ConsoleReporter, Reporter};
pub use snapshot::{balance_snapshot, resolve_symbols, token_balance};
