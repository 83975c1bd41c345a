use rewards_hook::HookError;
use rewards_ledger::LedgerError;
use rewards_types::AmountError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid amount {value:?} in {field}: {source}")]
    Amount {
        field: &'static str,
        value: String,
        source: AmountError,
    },

    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("step {step}: expected {what} = {expected}, got {actual}")]
    ExpectationFailed {
        step: usize,
        what: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
