use std::collections::BTreeSet;

use solana_message::Hash;
use solana_pubkey::Pubkey;

use crate::achievements::{Achievement, AchievementBitset};
use crate::registry::{InstructionKind, PAYER_ROLE};
use crate::transaction::Signature;

/// The post-state the backend decided to grant. Never derived from wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize)]
pub struct ExpectedUserState {
    #[serde(default)]
    pub level: u8,
    pub experience_points: u64,
    pub currency: u64,
    /// Achievement flag names, resolved by the codec at validation time.
    #[serde(default)]
    pub achievements: BTreeSet<String>,
}

impl ExpectedUserState {
    pub fn new(level: u8, experience_points: u64, currency: u64) -> Self {
        Self {
            level,
            experience_points,
            currency,
            achievements: BTreeSet::new(),
        }
    }

    pub fn with_achievements<I>(mut self, achievements: I) -> Self
    where
        I: IntoIterator<Item = Achievement>,
    {
        self.achievements
            .extend(achievements.into_iter().map(|a| a.to_string()));
        self
    }

    pub fn with_flag_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.achievements.extend(names.into_iter().map(Into::into));
        self
    }
}

/// Arguments shared by `initUser` and `updateUser`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserArgs {
    pub level: u8,
    /// `xp` on the wire.
    pub experience_points: u64,
    /// `aura` on the wire.
    pub currency: u64,
    pub achievements: AchievementBitset,
}

/// One instruction account, labelled with the schema role at its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedAccount {
    pub role: &'static str,
    pub address: Pubkey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    pub program_id: Pubkey,
    pub kind: InstructionKind,
    /// In schema role order.
    pub accounts: Vec<NamedAccount>,
    pub args: UserArgs,
}

impl DecodedInstruction {
    pub fn account(&self, role: &str) -> Option<&Pubkey> {
        self.accounts
            .iter()
            .find(|a| a.role == role)
            .map(|a| &a.address)
    }

    pub fn payer(&self) -> Option<&Pubkey> {
        self.account(PAYER_ROLE)
    }
}

/// The single decoded invocation plus the outer fields checked alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub fee_payer: Pubkey,
    pub signatures: Vec<Signature>,
    pub recent_blockhash: Hash,
    pub instruction: DecodedInstruction,
}

/// A transaction that passed every check, with the exact bytes that were
/// validated. Broadcast `raw`, never a re-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransaction {
    pub transaction: DecodedTransaction,
    pub raw: Vec<u8>,
}

impl ValidatedTransaction {
    pub fn instruction(&self) -> &DecodedInstruction {
        &self.transaction.instruction
    }

    /// Base58 of the first signature, which is the transaction id on chain.
    pub fn signature(&self) -> Option<String> {
        self.transaction
            .signatures
            .first()
            .map(ToString::to_string)
    }
}
