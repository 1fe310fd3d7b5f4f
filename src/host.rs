//! JSON request/response surface for embedding hosts such as the wasm build.
//!
//! A [`Host`] is built once from deployment config JSON and reused for every
//! call. Responses never name the failed check: a rejection carries only the
//! public message and the error class, and the check goes to the log.

use std::collections::BTreeSet;

use serde_json::{Value, json};

use crate::config::{Deployment, DeploymentConfig};
use crate::error::Error;
use crate::program::parse_pubkey;
use crate::registry::InstructionKind;
use crate::types::ExpectedUserState;

#[derive(Debug, Clone)]
pub struct Host {
    deployment: Deployment,
}

impl Host {
    /// `config_json` is a [`DeploymentConfig`]; `"{}"` selects the built-in
    /// program id and vocabulary.
    pub fn from_config_json(config_json: &str) -> Result<Self, Error> {
        let deployment = DeploymentConfig::from_json(config_json)?.build()?;
        Ok(Self { deployment })
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Ordered achievement vocabulary; list position is the bit index.
    pub fn achievement_vocabulary(&self) -> Value {
        json!(self.deployment.codec.vocabulary())
    }

    /// Encodes a JSON array of flag names into the two on-chain words, as
    /// decimal strings (a u128 does not fit a JS number).
    pub fn encode_achievements(&self, flags_json: &str) -> Value {
        let encoded = serde_json::from_str::<BTreeSet<String>>(flags_json)
            .map_err(Error::from)
            .and_then(|flags| self.deployment.codec.encode(&flags));
        match encoded {
            Ok(bits) => {
                let words: Vec<String> = bits.words().iter().map(u128::to_string).collect();
                json!({ "ok": true, "words": words })
            }
            Err(e) => error_value(&e),
        }
    }

    /// Validates a base64 signed transaction against the intended grant.
    ///
    /// `expected_json` is `{"level", "experience_points", "currency",
    /// "achievements"}`; `kind` is `"initUser"` or `"updateUser"`.
    pub fn validate_transaction(
        &self,
        tx_base64: &str,
        signer: &str,
        expected_json: &str,
        kind: &str,
    ) -> Value {
        match self.validate_inner(tx_base64, signer, expected_json, kind) {
            Ok(value) => value,
            Err(e) => error_value(&e),
        }
    }

    fn validate_inner(
        &self,
        tx_base64: &str,
        signer: &str,
        expected_json: &str,
        kind: &str,
    ) -> Result<Value, Error> {
        let signer = parse_pubkey(signer)?;
        let expected: ExpectedUserState = serde_json::from_str(expected_json)?;
        let kind: InstructionKind = kind.parse().map_err(|_| Error::Config {
            reason: format!("unknown instruction kind {kind:?}"),
        })?;

        let deployment = &self.deployment;
        let validated = deployment.validator().validate_base64(
            tx_base64,
            &deployment.program_id,
            &signer,
            &expected,
            kind,
        )?;
        let ix = validated.instruction();
        Ok(json!({
            "ok": true,
            "kind": ix.kind.as_ref(),
            "signature": validated.signature(),
            "level": ix.args.level,
            "experiencePoints": ix.args.experience_points,
            "currency": ix.args.currency,
        }))
    }
}

/// Failure response: the public message and the error class only.
pub fn error_value(err: &Error) -> Value {
    tracing::debug!(
        check = err.kind(),
        class = %err.class(),
        reason = %err,
        "host call failed"
    );
    json!({
        "ok": false,
        "error": err.public_message(),
        "class": err.class().as_ref(),
    })
}
