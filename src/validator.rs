use base64::Engine;
use solana_pubkey::Pubkey;

use crate::achievements::AchievementCodec;
use crate::decoder::InstructionDecoder;
use crate::error::{Error, ErrorClass};
use crate::registry::{InstructionKind, SchemaRegistry};
use crate::types::{ExpectedUserState, ValidatedTransaction};

/// Re-checks a client-signed transaction against what the backend intended to
/// authorize.
///
/// Holds only shared references to the registry and codec, so one validator
/// (or many) can serve concurrent requests.
#[derive(Debug, Clone, Copy)]
pub struct TransactionValidator<'a> {
    registry: &'a SchemaRegistry,
    codec: &'a AchievementCodec,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(registry: &'a SchemaRegistry, codec: &'a AchievementCodec) -> Self {
        Self { registry, codec }
    }

    /// Runs every check in order and returns the first failure unchanged.
    ///
    /// On success the returned value carries `raw` verbatim for broadcast.
    pub fn validate(
        &self,
        raw: &[u8],
        expected_program: &Pubkey,
        expected_signer: &Pubkey,
        expected_state: &ExpectedUserState,
        required_kind: InstructionKind,
    ) -> Result<ValidatedTransaction, Error> {
        let result = self.check(
            raw,
            expected_program,
            expected_signer,
            expected_state,
            required_kind,
        );
        match &result {
            Ok(validated) => tracing::debug!(
                kind = %required_kind,
                signer = %expected_signer,
                signature = validated.signature().as_deref().unwrap_or("-"),
                "signed transaction validated"
            ),
            Err(err) => log_rejection(err, required_kind),
        }
        result
    }

    /// Same as [`TransactionValidator::validate`] for the base64 string a
    /// wallet hands back.
    pub fn validate_base64(
        &self,
        encoded: &str,
        expected_program: &Pubkey,
        expected_signer: &Pubkey,
        expected_state: &ExpectedUserState,
        required_kind: InstructionKind,
    ) -> Result<ValidatedTransaction, Error> {
        let raw = match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
            Ok(raw) => raw,
            Err(e) => {
                let err = Error::MalformedTransaction {
                    reason: format!("invalid base64: {e}"),
                };
                log_rejection(&err, required_kind);
                return Err(err);
            }
        };
        self.validate(
            &raw,
            expected_program,
            expected_signer,
            expected_state,
            required_kind,
        )
    }

    fn check(
        &self,
        raw: &[u8],
        expected_program: &Pubkey,
        expected_signer: &Pubkey,
        expected_state: &ExpectedUserState,
        required_kind: InstructionKind,
    ) -> Result<ValidatedTransaction, Error> {
        let transaction = InstructionDecoder::new(self.registry).decode(raw, expected_program)?;
        let ix = &transaction.instruction;

        if ix.kind != required_kind {
            return Err(Error::InstructionMismatch {
                expected: required_kind.to_string(),
                found: ix.kind.to_string(),
            });
        }

        let payer = ix.payer().ok_or_else(|| Error::SignerMismatch {
            expected: expected_signer.to_string(),
            found: "none".to_string(),
        })?;
        if payer != expected_signer {
            return Err(Error::SignerMismatch {
                expected: expected_signer.to_string(),
                found: payer.to_string(),
            });
        }

        if transaction.fee_payer != *expected_signer {
            return Err(Error::FeePayerMismatch {
                expected: expected_signer.to_string(),
                found: transaction.fee_payer.to_string(),
            });
        }

        let args = &ix.args;
        at_most(
            "experience_points",
            args.experience_points,
            expected_state.experience_points,
        )?;
        at_most("currency", args.currency, expected_state.currency)?;
        at_most(
            "level",
            u64::from(args.level),
            u64::from(expected_state.level),
        )?;

        let expected_bits = self.codec.encode(&expected_state.achievements)?;
        if !AchievementCodec::equals(&expected_bits, &args.achievements) {
            return Err(Error::AchievementMismatch {
                expected: expected_bits.words().to_vec(),
                found: args.achievements.words().to_vec(),
            });
        }

        Ok(ValidatedTransaction {
            transaction,
            raw: raw.to_vec(),
        })
    }
}

fn at_most(field: &'static str, found: u64, granted: u64) -> Result<(), Error> {
    if found > granted {
        return Err(Error::ValueExceedsGrant {
            field,
            granted,
            found,
        });
    }
    Ok(())
}

fn log_rejection(err: &Error, required_kind: InstructionKind) {
    match err.class() {
        ErrorClass::InputTainted => tracing::warn!(
            check = err.kind(),
            kind = %required_kind,
            reason = %err,
            "rejected signed transaction"
        ),
        ErrorClass::ConfigurationDrift => tracing::error!(
            check = err.kind(),
            kind = %required_kind,
            reason = %err,
            "validator configuration does not match the deployed program"
        ),
    }
}
