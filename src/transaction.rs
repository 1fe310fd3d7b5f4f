//! Wire decoding of signed transactions, legacy and v0.
//!
//! Decoding itself is bincode over the upstream message types; on top of it
//! the envelope must be exact: no trailing bytes, one signature per required
//! signer, and account indices that resolve against the static key list.

use bincode::Options;
use solana_pubkey::Pubkey;

pub use solana_message::VersionedMessage;
pub use solana_transaction::Signature;
pub use solana_transaction::versioned::VersionedTransaction;

use crate::error::Error;

/// Largest serialized transaction that fits a single packet.
pub const PACKET_DATA_SIZE: u64 = 1232;

fn malformed(reason: String) -> Error {
    Error::MalformedTransaction { reason }
}

/// Decodes exactly one transaction from `bytes`.
pub fn parse(bytes: &[u8]) -> Result<VersionedTransaction, Error> {
    let mut remaining = bytes;
    let transaction: VersionedTransaction = bincode::options()
        .with_limit(PACKET_DATA_SIZE)
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .deserialize_from(&mut remaining)
        .map_err(|e| malformed(format!("undecodable transaction: {e}")))?;
    if !remaining.is_empty() {
        return Err(malformed(format!(
            "{} trailing bytes after message",
            remaining.len()
        )));
    }

    let message = &transaction.message;
    let required = usize::from(message.header().num_required_signatures);
    let keys = message.static_account_keys();
    if keys.is_empty() {
        return Err(malformed("message has no account keys".to_string()));
    }
    if required > keys.len() {
        return Err(malformed(format!(
            "{required} required signers but only {} account keys",
            keys.len()
        )));
    }
    if transaction.signatures.len() != required {
        return Err(malformed(format!(
            "{} signatures for {required} required signers",
            transaction.signatures.len()
        )));
    }

    tracing::trace!(
        signatures = transaction.signatures.len(),
        keys = keys.len(),
        instructions = message.instructions().len(),
        versioned = matches!(message, VersionedMessage::V0(_)),
        "parsed transaction"
    );
    Ok(transaction)
}

/// Wire form of `transaction`, as a wallet would submit it.
pub fn serialize(transaction: &VersionedTransaction) -> Result<Vec<u8>, Error> {
    bincode::serialize(transaction)
        .map_err(|e| malformed(format!("unserializable transaction: {e}")))
}

/// The account billed for the transaction: the first static key.
pub fn fee_payer(message: &VersionedMessage) -> Option<&Pubkey> {
    message.static_account_keys().first()
}

/// Resolves an instruction account index against the static key list.
///
/// Indices past the static keys point into address lookup tables, which
/// cannot be resolved without fetching the tables, so they are rejected.
pub fn resolve_key(message: &VersionedMessage, index: u8) -> Result<&Pubkey, Error> {
    let keys = message.static_account_keys();
    keys.get(usize::from(index)).ok_or_else(|| {
        let in_lookup_table = message
            .address_table_lookups()
            .is_some_and(|lookups| !lookups.is_empty());
        malformed(if in_lookup_table {
            format!("account index {index} refers to an address lookup table entry")
        } else {
            format!("account index {index} out of range for {} keys", keys.len())
        })
    })
}
