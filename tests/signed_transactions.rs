#![expect(
    clippy::unwrap_used,
    clippy::panic,
    reason = "test code uses unwrap/panic for concise assertions"
)]

use candy_leaderboard_guard::testing::{
    PROGRAM_INDEX, key, legacy_wire, signed, to_v0, user_message, user_tx_bytes,
};
use candy_leaderboard_guard::transaction::serialize;
use candy_leaderboard_guard::{
    Achievement, AchievementBitset, AchievementCodec, Deployment, DeploymentConfig, Error,
    ErrorClass, ExpectedUserState, GENERIC_REJECTION, InstructionKind, PROGRAM_ID, SchemaRegistry,
    Signature, TransactionValidator, UserArgs, ValidatedTransaction, VersionedMessage,
};
use solana_message::compiled_instruction::CompiledInstruction;
use solana_message::v0::MessageAddressTableLookup;
use solana_pubkey::Pubkey;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn signer() -> Pubkey {
    key(1)
}

fn deployment() -> Deployment {
    DeploymentConfig::default().build().unwrap()
}

fn scenario_state() -> ExpectedUserState {
    ExpectedUserState::new(1, 100, 50).with_flag_names(["i_minted"])
}

fn scenario_args() -> UserArgs {
    let codec = AchievementCodec::default();
    UserArgs {
        level: 1,
        experience_points: 100,
        currency: 50,
        achievements: codec.encode(["i_minted"]).unwrap(),
    }
}

fn update_wire(args: &UserArgs) -> Vec<u8> {
    user_tx_bytes(InstructionKind::UpdateUser, args).unwrap()
}

fn validate(
    deployment: &Deployment,
    raw: &[u8],
    state: &ExpectedUserState,
    kind: InstructionKind,
) -> Result<ValidatedTransaction, Error> {
    deployment
        .validator()
        .validate(raw, &deployment.program_id, &signer(), state, kind)
}

fn validate_update(raw: &[u8], state: &ExpectedUserState) -> Result<ValidatedTransaction, Error> {
    validate(&deployment(), raw, state, InstructionKind::UpdateUser)
}

// ──────────────────── scenarios ────────────────────

#[test]
fn scenario_a_exact_grant_is_accepted() {
    init_tracing();
    let raw = update_wire(&scenario_args());
    let validated = validate_update(&raw, &scenario_state()).unwrap();

    assert_eq!(validated.raw, raw);
    let ix = validated.instruction();
    assert_eq!(ix.kind, InstructionKind::UpdateUser);
    assert_eq!(ix.program_id, PROGRAM_ID);
    assert_eq!(ix.payer(), Some(&signer()));
    assert_eq!(validated.transaction.fee_payer, signer());
    assert_eq!(ix.args, scenario_args());
    assert_eq!(
        validated.signature().unwrap(),
        Signature::from([0xA1; 64]).to_string()
    );
}

#[test]
fn scenario_a_init_user_is_accepted() {
    let raw = user_tx_bytes(InstructionKind::InitUser, &scenario_args()).unwrap();
    let validated = validate(
        &deployment(),
        &raw,
        &scenario_state(),
        InstructionKind::InitUser,
    )
    .unwrap();
    assert_eq!(validated.instruction().account("referrer"), Some(&key(4)));
}

#[test]
fn scenario_b_experience_over_grant_is_rejected() {
    init_tracing();
    let args = UserArgs {
        experience_points: 101,
        ..scenario_args()
    };
    let err = validate_update(&update_wire(&args), &scenario_state()).unwrap_err();
    let Error::ValueExceedsGrant {
        field,
        granted,
        found,
    } = err
    else {
        panic!("expected ValueExceedsGrant, got {err:?}");
    };
    assert_eq!((field, granted, found), ("experience_points", 100, 101));
}

#[test]
fn scenario_c_second_invocation_is_rejected_before_inspection() {
    let mut message = user_message(InstructionKind::UpdateUser, &scenario_args());
    // the extra invocation is garbage on purpose: it must never be looked at
    message.instructions.push(CompiledInstruction {
        program_id_index: 4,
        accounts: vec![0],
        data: vec![0xFF],
    });
    let err = validate_update(&legacy_wire(message).unwrap(), &scenario_state()).unwrap_err();
    assert!(
        matches!(err, Error::UnexpectedInstructionCount { found: 2 }),
        "{err:?}"
    );
}

#[test]
fn scenario_d_single_bit_tamper_is_rejected() {
    let expected = scenario_args().achievements;
    for bit in [1_usize, 19, 127, 128, 255] {
        let mut words = *expected.words();
        words[bit / 128] ^= 1 << (bit % 128);
        let args = UserArgs {
            achievements: AchievementBitset(words),
            ..scenario_args()
        };
        let err = validate_update(&update_wire(&args), &scenario_state()).unwrap_err();
        assert!(
            matches!(err, Error::AchievementMismatch { .. }),
            "bit {bit}: {err:?}"
        );
    }

    let cleared = UserArgs {
        achievements: AchievementBitset::default(),
        ..scenario_args()
    };
    assert!(matches!(
        validate_update(&update_wire(&cleared), &scenario_state()),
        Err(Error::AchievementMismatch { .. })
    ));
}

#[test]
fn scenario_e_unknown_flag_fails_encode() {
    let codec = AchievementCodec::default();
    let err = codec.encode(["not_a_real_flag"]).unwrap_err();
    assert!(matches!(err, Error::InvalidFlag { .. }));
    assert_eq!(err.class(), ErrorClass::ConfigurationDrift);
}

#[test]
fn scenario_f_split_fee_payer_is_rejected() {
    let attacker = key(9);
    let mut message = user_message(InstructionKind::UpdateUser, &scenario_args());
    message.header.num_required_signatures = 3;
    message.account_keys.insert(0, attacker);
    // payer role still names the expected signer, now at index 1
    let ix = &mut message.instructions[0];
    ix.accounts = vec![1, 2, 3, 5];
    ix.program_id_index = PROGRAM_INDEX + 1;

    let err = validate_update(&legacy_wire(message).unwrap(), &scenario_state()).unwrap_err();
    let Error::FeePayerMismatch { expected, found } = &err else {
        panic!("expected FeePayerMismatch, got {err:?}");
    };
    assert_eq!(*expected, signer().to_string());
    assert_eq!(*found, attacker.to_string());
}

// ──────────────────── ordering & properties ────────────────────

#[test]
fn wrong_program_wins_over_later_checks() {
    let args = UserArgs {
        experience_points: u64::MAX,
        ..scenario_args()
    };
    let mut message = user_message(InstructionKind::UpdateUser, &args);
    message.account_keys[usize::from(PROGRAM_INDEX)] = key(77);
    assert!(matches!(
        validate_update(&legacy_wire(message).unwrap(), &scenario_state()),
        Err(Error::WrongProgram { .. })
    ));
}

#[test]
fn instruction_mismatch_precedes_signer_checks() {
    let mut message = user_message(InstructionKind::InitUser, &scenario_args());
    message.instructions[0].accounts[0] = 2;
    assert!(matches!(
        validate_update(&legacy_wire(message).unwrap(), &scenario_state()),
        Err(Error::InstructionMismatch { .. })
    ));
}

#[test]
fn validation_is_idempotent() {
    let deployment = deployment();
    let state = scenario_state();
    let kind = InstructionKind::UpdateUser;

    let ok = update_wire(&scenario_args());
    let first = validate(&deployment, &ok, &state, kind).unwrap();
    let second = validate(&deployment, &ok, &state, kind).unwrap();
    assert_eq!(first, second);

    let bad = update_wire(&UserArgs {
        currency: 51,
        ..scenario_args()
    });
    let first = validate(&deployment, &bad, &state, kind).unwrap_err();
    let second = validate(&deployment, &bad, &state, kind).unwrap_err();
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn every_input_rejection_maps_to_generic_message() {
    let mut two = user_message(InstructionKind::UpdateUser, &scenario_args());
    let extra = two.instructions[0].clone();
    two.instructions.push(extra);
    let over = update_wire(&UserArgs {
        level: 2,
        ..scenario_args()
    });
    for raw in [legacy_wire(two).unwrap(), over] {
        let err = validate_update(&raw, &scenario_state()).unwrap_err();
        assert!(err.is_input_tainted());
        assert_eq!(err.public_message(), GENERIC_REJECTION);
    }
}

#[test]
fn v0_message_without_lookups_is_accepted() {
    let message = to_v0(user_message(InstructionKind::UpdateUser, &scenario_args()));
    let raw = serialize(&signed(VersionedMessage::V0(message))).unwrap();
    assert!(validate_update(&raw, &scenario_state()).is_ok());
}

#[test]
fn lookup_table_accounts_are_rejected() {
    let mut message = to_v0(user_message(InstructionKind::UpdateUser, &scenario_args()));
    message.address_table_lookups.push(MessageAddressTableLookup {
        account_key: key(50),
        writable_indexes: vec![0],
        readonly_indexes: Vec::new(),
    });
    // user record loaded from the table instead of the static keys
    message.instructions[0].accounts[2] = 6;
    let raw = serialize(&signed(VersionedMessage::V0(message))).unwrap();
    let err = validate_update(&raw, &scenario_state()).unwrap_err();
    assert!(matches!(err, Error::MalformedTransaction { .. }), "{err:?}");
}

#[test]
fn garbage_bytes_are_malformed() {
    let deployment = deployment();
    for raw in [&[][..], &[0x01][..], &[0xFF; 200][..]] {
        let err = validate(&deployment, raw, &scenario_state(), InstructionKind::UpdateUser)
            .unwrap_err();
        assert!(
            matches!(err, Error::MalformedTransaction { .. }),
            "{raw:?}: {err:?}"
        );
    }
}

#[test]
fn typed_achievements_match_flag_names() {
    let typed = ExpectedUserState::new(1, 100, 50).with_achievements([Achievement::IMinted]);
    assert_eq!(typed, scenario_state());
}

#[test]
fn discriminators_match_anchor_sighash() {
    use sha2::{Digest, Sha256};

    let registry = SchemaRegistry::default();
    for (kind, snake) in [
        (InstructionKind::InitUser, "init_user"),
        (InstructionKind::UpdateUser, "update_user"),
    ] {
        let hash = Sha256::digest(format!("global:{snake}").as_bytes());
        assert_eq!(
            registry.schema_for(kind).discriminator,
            hash[..8],
            "discriminator for {kind}"
        );
    }
}

#[test]
fn validator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SchemaRegistry>();
    assert_send_sync::<AchievementCodec>();
    assert_send_sync::<TransactionValidator<'static>>();

    let deployment = deployment();
    let ok = update_wire(&scenario_args());
    let state = scenario_state();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    validate(&deployment, &ok, &state, InstructionKind::UpdateUser).unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    });
}
