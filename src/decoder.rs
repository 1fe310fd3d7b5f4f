use solana_pubkey::Pubkey;

use crate::achievements::{ACHIEVEMENT_WORDS, AchievementBitset};
use crate::error::Error;
use crate::registry::{DISCRIMINATOR_LEN, FieldType, InstructionSchema, KEY_LEN, SchemaRegistry};
use crate::transaction::{self, VersionedTransaction};
use crate::types::{DecodedInstruction, DecodedTransaction, NamedAccount, UserArgs};

/// A decoded argument field before it is mapped onto [`UserArgs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Unsigned(u128),
    UnsignedArray(Vec<u128>),
    Key(Pubkey),
}

/// Turns signed transaction bytes into a [`DecodedTransaction`] using the
/// registry's schemas.
#[derive(Debug, Clone, Copy)]
pub struct InstructionDecoder<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> InstructionDecoder<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn decode(
        &self,
        raw: &[u8],
        expected_program: &Pubkey,
    ) -> Result<DecodedTransaction, Error> {
        let VersionedTransaction {
            signatures,
            message,
        } = transaction::parse(raw)?;

        let [ix] = message.instructions() else {
            return Err(Error::UnexpectedInstructionCount {
                found: message.instructions().len(),
            });
        };

        let program_id = transaction::resolve_key(&message, ix.program_id_index)?;
        if program_id != expected_program {
            return Err(Error::WrongProgram {
                expected: expected_program.to_string(),
                found: program_id.to_string(),
            });
        }

        let addresses = ix
            .accounts
            .iter()
            .map(|index| transaction::resolve_key(&message, *index).copied())
            .collect::<Result<Vec<_>, _>>()?;

        let discriminator = ix.data.get(..DISCRIMINATOR_LEN).unwrap_or(ix.data.as_slice());
        let schema = self.registry.lookup(discriminator)?;
        let payload = ix.data.get(DISCRIMINATOR_LEN..).unwrap_or_default();
        let values = decode_args(schema, payload)?;
        let args = user_args(schema, &values)?;

        let accounts = name_accounts(schema, addresses)?;

        let fee_payer = transaction::fee_payer(&message).copied().ok_or_else(|| {
            Error::MalformedTransaction {
                reason: "message has no fee payer".to_string(),
            }
        })?;

        tracing::debug!(
            kind = %schema.kind,
            program = %program_id,
            accounts = accounts.len(),
            "decoded instruction"
        );

        Ok(DecodedTransaction {
            fee_payer,
            signatures,
            recent_blockhash: message.recent_blockhash().clone(),
            instruction: DecodedInstruction {
                program_id: *program_id,
                kind: schema.kind,
                accounts,
                args,
            },
        })
    }
}

fn malformed_args(schema: &InstructionSchema, reason: String) -> Error {
    Error::MalformedArgs {
        kind: schema.kind.to_string(),
        reason,
    }
}

/// Decodes `payload` positionally against the schema's argument layout.
/// The payload must be exactly as long as the layout.
pub fn decode_args(
    schema: &InstructionSchema,
    payload: &[u8],
) -> Result<Vec<(&'static str, ArgValue)>, Error> {
    let expected = schema.args_len();
    if payload.len() != expected {
        return Err(malformed_args(
            schema,
            format!("expected {expected} bytes, found {}", payload.len()),
        ));
    }

    let mut rest = payload;
    let mut values = Vec::with_capacity(schema.args.len());
    for field in schema.args {
        let value = match field.ty {
            FieldType::Unsigned(width) => {
                ArgValue::Unsigned(read_unsigned(schema, &mut rest, field.name, width)?)
            }
            FieldType::UnsignedArray { width, len } => {
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(read_unsigned(schema, &mut rest, field.name, width)?);
                }
                ArgValue::UnsignedArray(items)
            }
            FieldType::Key => {
                let bytes = take(schema, &mut rest, field.name, KEY_LEN)?;
                let address = Pubkey::try_from(bytes)
                    .map_err(|_| malformed_args(schema, format!("{} is not a key", field.name)))?;
                ArgValue::Key(address)
            }
        };
        values.push((field.name, value));
    }
    Ok(values)
}

fn take<'p>(
    schema: &InstructionSchema,
    rest: &mut &'p [u8],
    name: &str,
    len: usize,
) -> Result<&'p [u8], Error> {
    let (head, tail) = rest
        .split_at_checked(len)
        .ok_or_else(|| malformed_args(schema, format!("truncated {name}")))?;
    *rest = tail;
    Ok(head)
}

fn read_unsigned(
    schema: &InstructionSchema,
    rest: &mut &[u8],
    name: &str,
    width: usize,
) -> Result<u128, Error> {
    let bytes = take(schema, rest, name, width)?;
    let mut buf = [0_u8; 16];
    buf.get_mut(..width)
        .ok_or_else(|| malformed_args(schema, format!("{name} is wider than 16 bytes")))?
        .copy_from_slice(bytes);
    Ok(u128::from_le_bytes(buf))
}

fn field<'v>(
    schema: &InstructionSchema,
    values: &'v [(&'static str, ArgValue)],
    name: &str,
) -> Result<&'v ArgValue, Error> {
    values
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v)
        .ok_or_else(|| malformed_args(schema, format!("missing field {name}")))
}

fn unsigned_field<T: TryFrom<u128>>(
    schema: &InstructionSchema,
    values: &[(&'static str, ArgValue)],
    name: &str,
) -> Result<T, Error> {
    match field(schema, values, name)? {
        ArgValue::Unsigned(v) => {
            T::try_from(*v).map_err(|_| malformed_args(schema, format!("{name} out of range")))
        }
        other => Err(malformed_args(
            schema,
            format!("{name} has unexpected shape {other:?}"),
        )),
    }
}

/// Maps decoded fields onto [`UserArgs`]: `level`, `xp`, `aura`, `achievements`.
pub fn user_args(
    schema: &InstructionSchema,
    values: &[(&'static str, ArgValue)],
) -> Result<UserArgs, Error> {
    let achievements = match field(schema, values, "achievements")? {
        ArgValue::UnsignedArray(words) => <[u128; ACHIEVEMENT_WORDS]>::try_from(words.as_slice())
            .map(AchievementBitset)
            .map_err(|_| {
                malformed_args(
                    schema,
                    format!("achievements has {} words, expected {ACHIEVEMENT_WORDS}", words.len()),
                )
            })?,
        other => {
            return Err(malformed_args(
                schema,
                format!("achievements has unexpected shape {other:?}"),
            ));
        }
    };

    Ok(UserArgs {
        level: unsigned_field(schema, values, "level")?,
        experience_points: unsigned_field(schema, values, "xp")?,
        currency: unsigned_field(schema, values, "aura")?,
        achievements,
    })
}

fn name_accounts(
    schema: &InstructionSchema,
    addresses: Vec<Pubkey>,
) -> Result<Vec<NamedAccount>, Error> {
    if addresses.len() != schema.accounts.len() {
        return Err(Error::AccountCountMismatch {
            kind: schema.kind.to_string(),
            expected: schema.accounts.len(),
            found: addresses.len(),
        });
    }
    Ok(schema
        .accounts
        .iter()
        .zip(addresses)
        .map(|(role, address)| NamedAccount {
            role: role.name,
            address,
        })
        .collect())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use solana_message::compiled_instruction::CompiledInstruction;

    use crate::program::PROGRAM_ID;
    use crate::registry::{InstructionKind, USER_ARGS};
    use crate::testing::{key, legacy_wire, user_ix_data, user_message, user_tx_bytes};

    fn decode(raw: &[u8]) -> Result<DecodedTransaction, Error> {
        let registry = SchemaRegistry::default();
        InstructionDecoder::new(&registry).decode(raw, &PROGRAM_ID)
    }

    fn sample_args() -> UserArgs {
        UserArgs {
            level: 3,
            experience_points: 100,
            currency: 50,
            achievements: AchievementBitset([1, 1 << 5]),
        }
    }

    #[test]
    fn decodes_update_user() {
        let raw = user_tx_bytes(InstructionKind::UpdateUser, &sample_args()).unwrap();
        let decoded = decode(&raw).unwrap();
        let ix = &decoded.instruction;
        assert_eq!(ix.kind, InstructionKind::UpdateUser);
        assert_eq!(ix.program_id, PROGRAM_ID);
        assert_eq!(ix.args, sample_args());
        assert_eq!(ix.payer(), Some(&key(1)));
        assert_eq!(ix.account("user"), Some(&key(3)));
        assert_eq!(decoded.fee_payer, key(1));
        let roles: Vec<_> = ix.accounts.iter().map(|a| a.role).collect();
        assert_eq!(roles, ["payer", "cosigner", "user", "systemProgram"]);
    }

    #[test]
    fn decodes_init_user_with_referrer() {
        let raw = user_tx_bytes(InstructionKind::InitUser, &sample_args()).unwrap();
        let decoded = decode(&raw).unwrap();
        assert_eq!(decoded.instruction.kind, InstructionKind::InitUser);
        assert_eq!(decoded.instruction.account("referrer"), Some(&key(4)));
    }

    #[test]
    fn integers_are_little_endian() {
        let args = UserArgs {
            level: 0x7f,
            experience_points: 0x0102_0304_0506_0708,
            currency: u64::MAX,
            achievements: AchievementBitset([u128::MAX, 0x0102]),
        };
        let data = user_ix_data(InstructionKind::UpdateUser, &args);
        assert_eq!(data[8], 0x7f);
        assert_eq!(data[9..17], [8_u8, 7, 6, 5, 4, 3, 2, 1]);
        let registry = SchemaRegistry::default();
        let schema = registry.schema_for(InstructionKind::UpdateUser);
        let values = decode_args(schema, &data[8..]).unwrap();
        assert_eq!(user_args(schema, &values).unwrap(), args);
    }

    #[test]
    fn zero_or_many_instructions_are_rejected() {
        let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
        message.instructions.clear();
        assert!(matches!(
            decode(&legacy_wire(message).unwrap()),
            Err(Error::UnexpectedInstructionCount { found: 0 })
        ));

        let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
        let extra = message.instructions[0].clone();
        message.instructions.push(extra);
        assert!(matches!(
            decode(&legacy_wire(message).unwrap()),
            Err(Error::UnexpectedInstructionCount { found: 2 })
        ));
    }

    #[test]
    fn other_program_is_rejected() {
        let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
        // index 0 is the payer, not the program
        message.instructions[0].program_id_index = 0;
        assert!(matches!(
            decode(&legacy_wire(message).unwrap()),
            Err(Error::WrongProgram { .. })
        ));
    }

    #[test]
    fn unknown_or_short_discriminator_is_rejected() {
        for data in [vec![186, 85, 17, 249, 219, 231, 98, 251], vec![9, 2, 160]] {
            let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
            message.instructions[0].data = data;
            assert!(matches!(
                decode(&legacy_wire(message).unwrap()),
                Err(Error::UnknownInstruction { .. })
            ));
        }
    }

    #[test]
    fn payload_length_must_match_layout() {
        for delta in [-1_i32, 1] {
            let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
            let data = &mut message.instructions[0].data;
            if delta < 0 {
                data.pop();
            } else {
                data.push(0);
            }
            assert!(matches!(
                decode(&legacy_wire(message).unwrap()),
                Err(Error::MalformedArgs { .. })
            ));
        }
    }

    #[test]
    fn account_count_must_match_roles() {
        let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
        message.instructions[0].accounts.push(0);
        assert!(matches!(
            decode(&legacy_wire(message).unwrap()),
            Err(Error::AccountCountMismatch {
                expected: 4,
                found: 5,
                ..
            })
        ));
    }

    #[test]
    fn unresolvable_account_index_is_malformed() {
        let mut message = user_message(InstructionKind::UpdateUser, &sample_args());
        message.instructions[0] = CompiledInstruction {
            accounts: vec![0, 1, 2, 200],
            ..message.instructions[0].clone()
        };
        assert!(matches!(
            decode(&legacy_wire(message).unwrap()),
            Err(Error::MalformedTransaction { .. })
        ));
    }

    #[test]
    fn key_fields_decode_as_pubkeys() {
        static KEYED: &[crate::registry::ArgField] = &[crate::registry::ArgField {
            name: "owner",
            ty: FieldType::Key,
        }];
        let registry = SchemaRegistry::default();
        let schema = InstructionSchema {
            args: KEYED,
            ..registry.schema_for(InstructionKind::UpdateUser).clone()
        };
        let values = decode_args(&schema, &[5; 32]).unwrap();
        assert_eq!(values, vec![("owner", ArgValue::Key(key(5)))]);
        assert!(matches!(
            user_args(&schema, &values),
            Err(Error::MalformedArgs { .. })
        ));
        assert_eq!(USER_ARGS.len(), 4);
    }
}
