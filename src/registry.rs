use crate::achievements::ACHIEVEMENT_WORDS;
use crate::error::Error;

pub const DISCRIMINATOR_LEN: usize = 8;
pub const KEY_LEN: usize = 32;

pub const INIT_USER_DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [14, 51, 68, 159, 237, 78, 158, 102];
pub const UPDATE_USER_DISCRIMINATOR: [u8; DISCRIMINATOR_LEN] = [9, 2, 160, 169, 118, 12, 207, 84];

pub const PAYER_ROLE: &str = "payer";

/// Mutating instructions the backend authorizes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum InstructionKind {
    InitUser,
    UpdateUser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRole {
    pub name: &'static str,
    pub signer: bool,
    pub writable: bool,
    pub optional: bool,
}

impl AccountRole {
    const fn new(name: &'static str, signer: bool, writable: bool) -> Self {
        Self {
            name,
            signer,
            writable,
            optional: false,
        }
    }
}

/// Wire type of one argument field. Integers are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Unsigned integer of the given byte width (1, 2, 4, 8 or 16).
    Unsigned(usize),
    UnsignedArray { width: usize, len: usize },
    /// Opaque 32-byte key.
    Key,
}

impl FieldType {
    pub fn byte_len(self) -> usize {
        match self {
            Self::Unsigned(width) => width,
            Self::UnsignedArray { width, len } => width * len,
            Self::Key => KEY_LEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgField {
    pub name: &'static str,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSchema {
    pub kind: InstructionKind,
    pub discriminator: [u8; DISCRIMINATOR_LEN],
    pub accounts: &'static [AccountRole],
    pub args: &'static [ArgField],
}

impl InstructionSchema {
    pub fn args_len(&self) -> usize {
        self.args.iter().map(|f| f.ty.byte_len()).sum()
    }

    pub fn role_index(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|r| r.name == name)
    }
}

const INIT_USER_ACCOUNTS: &[AccountRole] = &[
    AccountRole::new(PAYER_ROLE, true, true),
    AccountRole::new("cosigner", true, false),
    AccountRole::new("user", false, true),
    AccountRole::new("referrer", false, false),
    AccountRole::new("systemProgram", false, false),
];

const UPDATE_USER_ACCOUNTS: &[AccountRole] = &[
    AccountRole::new(PAYER_ROLE, true, true),
    AccountRole::new("cosigner", true, false),
    AccountRole::new("user", false, true),
    AccountRole::new("systemProgram", false, false),
];

/// `initUserInstructionArgs` and `updateUserInstructionArgs` share this layout.
pub const USER_ARGS: &[ArgField] = &[
    ArgField {
        name: "level",
        ty: FieldType::Unsigned(1),
    },
    ArgField {
        name: "xp",
        ty: FieldType::Unsigned(8),
    },
    ArgField {
        name: "aura",
        ty: FieldType::Unsigned(8),
    },
    ArgField {
        name: "achievements",
        ty: FieldType::UnsignedArray {
            width: 16,
            len: ACHIEVEMENT_WORDS,
        },
    },
];

/// Static table of the instructions the validator understands.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: [InstructionSchema; 2],
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::candy_leaderboard()
    }
}

impl SchemaRegistry {
    pub fn candy_leaderboard() -> Self {
        Self {
            schemas: [
                InstructionSchema {
                    kind: InstructionKind::InitUser,
                    discriminator: INIT_USER_DISCRIMINATOR,
                    accounts: INIT_USER_ACCOUNTS,
                    args: USER_ARGS,
                },
                InstructionSchema {
                    kind: InstructionKind::UpdateUser,
                    discriminator: UPDATE_USER_DISCRIMINATOR,
                    accounts: UPDATE_USER_ACCOUNTS,
                    args: USER_ARGS,
                },
            ],
        }
    }

    pub fn lookup(&self, discriminator: &[u8]) -> Result<&InstructionSchema, Error> {
        self.schemas
            .iter()
            .find(|s| s.discriminator.as_slice() == discriminator)
            .ok_or_else(|| Error::UnknownInstruction {
                discriminator: discriminator.to_vec(),
            })
    }

    pub fn schema_for(&self, kind: InstructionKind) -> &InstructionSchema {
        match kind {
            InstructionKind::InitUser => &self.schemas[0],
            InstructionKind::UpdateUser => &self.schemas[1],
        }
    }

    pub fn schemas(&self) -> &[InstructionSchema] {
        &self.schemas
    }
}
