//! Builders for well-formed candy leaderboard transactions, shared by the
//! unit and integration tests.
//!
//! Every message uses the same static keys: payer and fee payer `key(1)`,
//! cosigner `key(2)`, user record `key(3)`, referrer `key(4)`, then the system
//! program and the program id.

use solana_message::compiled_instruction::CompiledInstruction;
use solana_message::{Hash, Message, MessageHeader, v0};
use solana_pubkey::Pubkey;

use crate::error::Error;
use crate::program::{PROGRAM_ID, SYSTEM_PROGRAM_ID};
use crate::registry::{InstructionKind, SchemaRegistry};
use crate::transaction::{self, Signature, VersionedMessage, VersionedTransaction};
use crate::types::UserArgs;

/// Position of the program id in [`user_message`]'s static keys.
pub const PROGRAM_INDEX: u8 = 5;

pub fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

/// Anchor instruction data: discriminator, then the little-endian args.
pub fn user_ix_data(kind: InstructionKind, args: &UserArgs) -> Vec<u8> {
    let registry = SchemaRegistry::default();
    let mut data = registry.schema_for(kind).discriminator.to_vec();
    data.push(args.level);
    data.extend_from_slice(&args.experience_points.to_le_bytes());
    data.extend_from_slice(&args.currency.to_le_bytes());
    for word in args.achievements.words() {
        data.extend_from_slice(&word.to_le_bytes());
    }
    data
}

pub fn user_message(kind: InstructionKind, args: &UserArgs) -> Message {
    let accounts = match kind {
        InstructionKind::InitUser => vec![0, 1, 2, 3, 4],
        InstructionKind::UpdateUser => vec![0, 1, 2, 4],
    };
    Message {
        header: MessageHeader {
            num_required_signatures: 2,
            num_readonly_signed_accounts: 1,
            num_readonly_unsigned_accounts: 3,
        },
        account_keys: vec![key(1), key(2), key(3), key(4), SYSTEM_PROGRAM_ID, PROGRAM_ID],
        recent_blockhash: Hash::new_from_array([42; 32]),
        instructions: vec![CompiledInstruction {
            program_id_index: PROGRAM_INDEX,
            accounts,
            data: user_ix_data(kind, args),
        }],
    }
}

/// The same message in v0 form, with no lookup tables.
pub fn to_v0(message: Message) -> v0::Message {
    v0::Message {
        header: message.header,
        account_keys: message.account_keys,
        recent_blockhash: message.recent_blockhash,
        instructions: message.instructions,
        address_table_lookups: Vec::new(),
    }
}

/// Attaches one placeholder signature per required signer. The first is
/// `[0xA1; 64]`, the next `[0xA2; 64]`, and so on.
pub fn signed(message: VersionedMessage) -> VersionedTransaction {
    let required = message.header().num_required_signatures;
    VersionedTransaction {
        signatures: (0..required)
            .map(|i| Signature::from([0xA1_u8.wrapping_add(i); 64]))
            .collect(),
        message,
    }
}

pub fn legacy_wire(message: Message) -> Result<Vec<u8>, Error> {
    transaction::serialize(&signed(VersionedMessage::Legacy(message)))
}

pub fn user_tx_bytes(kind: InstructionKind, args: &UserArgs) -> Result<Vec<u8>, Error> {
    legacy_wire(user_message(kind, args))
}
