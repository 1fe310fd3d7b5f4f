use strum_macros::{AsRefStr, Display};

/// Broad origin of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    /// The signed bytes are bad. Discard the transaction and reject the request.
    InputTainted,
    /// The codec, registry or vocabulary no longer matches the deployed program.
    ConfigurationDrift,
}

#[derive(thiserror::Error, Debug, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Error {
    #[error("malformed transaction: {reason}")]
    MalformedTransaction { reason: String },

    #[error("expected exactly one instruction, found {found}")]
    UnexpectedInstructionCount { found: usize },

    #[error("instruction targets program {found}, expected {expected}")]
    WrongProgram { expected: String, found: String },

    #[error("unknown instruction discriminator {discriminator:?}")]
    UnknownInstruction { discriminator: Vec<u8> },

    #[error("malformed {kind} args: {reason}")]
    MalformedArgs { kind: String, reason: String },

    #[error("{kind} expects {expected} accounts, found {found}")]
    AccountCountMismatch {
        kind: String,
        expected: usize,
        found: usize,
    },

    #[error("decoded {found} instruction, expected {expected}")]
    InstructionMismatch { expected: String, found: String },

    #[error("payer {found} does not match expected signer {expected}")]
    SignerMismatch { expected: String, found: String },

    #[error("fee payer {found} does not match expected signer {expected}")]
    FeePayerMismatch { expected: String, found: String },

    #[error("{field} {found} exceeds granted {granted}")]
    ValueExceedsGrant {
        field: &'static str,
        granted: u64,
        found: u64,
    },

    #[error("achievement bitset {found:?} does not match expected {expected:?}")]
    AchievementMismatch {
        expected: Vec<u128>,
        found: Vec<u128>,
    },

    #[error("achievement flag not in vocabulary: {flag}")]
    InvalidFlag { flag: String },

    #[error("achievement index {index} exceeds capacity of {capacity} bits")]
    CapacityExceeded { index: usize, capacity: usize },

    #[error("config error: {reason}")]
    Config { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Message shown to end users for any input-tainted rejection.
pub const GENERIC_REJECTION: &str = "transaction rejected";

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidFlag { .. }
            | Self::CapacityExceeded { .. }
            | Self::Config { .. }
            | Self::Json(_) => ErrorClass::ConfigurationDrift,
            Self::MalformedTransaction { .. }
            | Self::UnexpectedInstructionCount { .. }
            | Self::WrongProgram { .. }
            | Self::UnknownInstruction { .. }
            | Self::MalformedArgs { .. }
            | Self::AccountCountMismatch { .. }
            | Self::InstructionMismatch { .. }
            | Self::SignerMismatch { .. }
            | Self::FeePayerMismatch { .. }
            | Self::ValueExceedsGrant { .. }
            | Self::AchievementMismatch { .. } => ErrorClass::InputTainted,
        }
    }

    pub fn is_input_tainted(&self) -> bool {
        self.class() == ErrorClass::InputTainted
    }

    /// Short, stable name of the failed check, for logs and metrics labels.
    pub fn kind(&self) -> &str {
        self.as_ref()
    }

    /// Text safe to return to the end user.
    ///
    /// Input-tainted errors collapse to [`GENERIC_REJECTION`] so a client cannot
    /// learn which check its bytes failed. Configuration drift is not the
    /// client's fault and is reported as an internal error.
    pub fn public_message(&self) -> &'static str {
        match self.class() {
            ErrorClass::InputTainted => GENERIC_REJECTION,
            ErrorClass::ConfigurationDrift => "internal error",
        }
    }
}
