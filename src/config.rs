use solana_pubkey::Pubkey;
use strum::VariantNames;

use crate::achievements::{Achievement, AchievementCodec};
use crate::error::Error;
use crate::program::{PROGRAM_ID_STR, parse_pubkey};
use crate::registry::SchemaRegistry;
use crate::validator::TransactionValidator;

/// Deployment settings, usually loaded once from JSON at startup.
///
/// ```json
/// { "program_id": "GgD5PpVu5Gmns4ByFTudbjjxGxtEt8zLWmgsqdJCq222",
///   "achievements": ["i_minted", "first_game"] }
/// ```
///
/// Both fields are optional and default to the built-in values.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    #[serde(default = "default_program_id")]
    pub program_id: String,
    #[serde(default = "default_achievements")]
    pub achievements: Vec<String>,
}

fn default_program_id() -> String {
    PROGRAM_ID_STR.to_string()
}

fn default_achievements() -> Vec<String> {
    Achievement::VARIANTS
        .iter()
        .map(|name| (*name).to_string())
        .collect()
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            program_id: default_program_id(),
            achievements: default_achievements(),
        }
    }
}

impl DeploymentConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validates the settings and builds the immutable registry and codec.
    ///
    /// The vocabulary must fit the on-chain bitset and agree with the built-in
    /// vocabulary on every shared position: flags are append-only, so one list
    /// is always a prefix of the other.
    pub fn build(&self) -> Result<Deployment, Error> {
        let program_id = parse_pubkey(&self.program_id)?;

        let codec = AchievementCodec::new(self.achievements.iter().cloned())?;
        codec.check_capacity()?;
        if let Some((index, (configured, builtin))) = self
            .achievements
            .iter()
            .zip(Achievement::VARIANTS)
            .enumerate()
            .find(|(_, (configured, builtin))| configured.as_str() != **builtin)
        {
            return Err(Error::Config {
                reason: format!(
                    "achievement {index} is {configured:?} but this build expects {builtin:?}"
                ),
            });
        }

        tracing::info!(
            program = %program_id,
            achievements = codec.vocabulary().len(),
            "deployment configuration loaded"
        );
        Ok(Deployment {
            program_id,
            registry: SchemaRegistry::candy_leaderboard(),
            codec,
        })
    }
}

/// Process-wide, read-only state shared by every validation call.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub program_id: Pubkey,
    pub registry: SchemaRegistry,
    pub codec: AchievementCodec,
}

impl Deployment {
    pub fn validator(&self) -> TransactionValidator<'_> {
        TransactionValidator::new(&self.registry, &self.codec)
    }
}
