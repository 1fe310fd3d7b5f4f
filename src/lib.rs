#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod achievements;
pub mod config;
pub mod decoder;
pub mod error;
pub mod host;
pub mod program;
pub mod registry;
pub mod transaction;
pub mod types;
pub mod validator;

#[doc(hidden)]
pub mod testing;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use achievements::{
    ACHIEVEMENT_CAPACITY, ACHIEVEMENT_WORDS, Achievement, AchievementBitset, AchievementCodec,
};
pub use config::{Deployment, DeploymentConfig};
pub use decoder::{ArgValue, InstructionDecoder};
pub use error::{Error, ErrorClass, GENERIC_REJECTION};
pub use host::Host;
pub use program::{PROGRAM_ID, find_user_account, parse_pubkey};
pub use registry::{
    AccountRole, ArgField, FieldType, InstructionKind, InstructionSchema, SchemaRegistry,
};
pub use transaction::{Signature, VersionedMessage, VersionedTransaction};
pub use types::{
    DecodedInstruction, DecodedTransaction, ExpectedUserState, NamedAccount, UserArgs,
    ValidatedTransaction,
};
pub use validator::TransactionValidator;
