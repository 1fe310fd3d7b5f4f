use std::collections::HashMap;

use strum::VariantNames;

use crate::error::Error;

/// Number of `u128` words the program stores per user.
pub const ACHIEVEMENT_WORDS: usize = 2;
pub const WORD_BITS: usize = 128;
pub const ACHIEVEMENT_CAPACITY: usize = ACHIEVEMENT_WORDS * WORD_BITS;

/// Built-in achievement vocabulary.
///
/// Declaration order is the on-chain bit index. Append only: never reorder,
/// remove or rename a variant once deployed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
    strum_macros::VariantNames,
)]
#[strum(serialize_all = "snake_case")]
pub enum Achievement {
    IMinted,
    FirstGame,
    SweetTooth,
    SugarRush,
    CandyCrusher,
    ComboMaster,
    StreakThreeDays,
    StreakWeek,
    StreakMonth,
    ReferredFriend,
    ReferralChampion,
    TopHundred,
    TopTen,
    SeasonChampion,
    AuraCollector,
    AuraSpender,
    LevelTen,
    LevelTwentyFive,
    LevelFifty,
    EarlyAdopter,
}

impl Achievement {
    pub fn bit_index(self) -> usize {
        self as usize
    }
}

/// Fixed-width achievement bitset as stored by the program (`[u128; 2]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AchievementBitset(pub [u128; ACHIEVEMENT_WORDS]);

impl AchievementBitset {
    pub fn words(&self) -> &[u128; ACHIEVEMENT_WORDS] {
        &self.0
    }

    pub fn is_set(&self, index: usize) -> bool {
        self.0
            .get(index / WORD_BITS)
            .is_some_and(|word| word & (1_u128 << (index % WORD_BITS)) != 0)
    }

    pub fn count_ones(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }
}

/// Maps achievement names to bit positions of an [`AchievementBitset`].
#[derive(Debug, Clone)]
pub struct AchievementCodec {
    vocabulary: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Default for AchievementCodec {
    fn default() -> Self {
        let vocabulary: Vec<String> = Achievement::VARIANTS
            .iter()
            .map(|name| (*name).to_string())
            .collect();
        let positions = vocabulary
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            vocabulary,
            positions,
        }
    }
}

impl AchievementCodec {
    /// Builds a codec over an ordered vocabulary. Duplicate names are rejected;
    /// capacity is not checked here, see [`AchievementCodec::check_capacity`].
    pub fn new<I, S>(vocabulary: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let vocabulary: Vec<String> = vocabulary.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(vocabulary.len());
        for (i, name) in vocabulary.iter().enumerate() {
            if positions.insert(name.clone(), i).is_some() {
                return Err(Error::Config {
                    reason: format!("duplicate achievement flag in vocabulary: {name}"),
                });
            }
        }
        Ok(Self {
            vocabulary,
            positions,
        })
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Fails if the vocabulary has outgrown the on-chain bitset.
    pub fn check_capacity(&self) -> Result<(), Error> {
        if self.vocabulary.len() > ACHIEVEMENT_CAPACITY {
            return Err(Error::CapacityExceeded {
                index: self.vocabulary.len() - 1,
                capacity: ACHIEVEMENT_CAPACITY,
            });
        }
        Ok(())
    }

    pub fn index_of(&self, flag: &str) -> Result<usize, Error> {
        self.positions
            .get(flag)
            .copied()
            .ok_or_else(|| Error::InvalidFlag {
                flag: flag.to_string(),
            })
    }

    /// Encodes a set of flag names. The result depends only on membership, and
    /// nothing is returned unless every flag encodes.
    pub fn encode<I, S>(&self, flags: I) -> Result<AchievementBitset, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = [0_u128; ACHIEVEMENT_WORDS];
        for flag in flags {
            let index = self.index_of(flag.as_ref())?;
            let word = words
                .get_mut(index / WORD_BITS)
                .ok_or(Error::CapacityExceeded {
                    index,
                    capacity: ACHIEVEMENT_CAPACITY,
                })?;
            *word |= 1_u128 << (index % WORD_BITS);
        }
        Ok(AchievementBitset(words))
    }

    pub fn equals(a: &AchievementBitset, b: &AchievementBitset) -> bool {
        a.0.iter().zip(b.0.iter()).all(|(x, y)| x == y)
    }

    /// Names of the set bits, in vocabulary order. Diagnostics only.
    pub fn decode(&self, bitset: &AchievementBitset) -> Result<Vec<&str>, Error> {
        let mut names = Vec::with_capacity(bitset.count_ones() as usize);
        for index in (0..ACHIEVEMENT_CAPACITY).filter(|i| bitset.is_set(*i)) {
            let name = self
                .vocabulary
                .get(index)
                .ok_or_else(|| Error::InvalidFlag {
                    flag: format!("bit {index}"),
                })?;
            names.push(name.as_str());
        }
        Ok(names)
    }
}
