//! Deployment constants of the candy leaderboard program.

use solana_pubkey::Pubkey;

use crate::error::Error;

pub const PROGRAM_ID_STR: &str = "GgD5PpVu5Gmns4ByFTudbjjxGxtEt8zLWmgsqdJCq222";
pub const PROGRAM_ID: Pubkey = Pubkey::from_str_const(PROGRAM_ID_STR);

/// Stand-in address passed where the program expects "no account", e.g. a
/// missing referrer.
pub const PLACEHOLDER_PUBKEY: Pubkey =
    Pubkey::from_str_const("1nc1nerator11111111111111111111111111111111");

pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new_from_array([0; 32]);

pub const USER_SEED: &[u8] = b"user";
pub const CURRENT_SEASON: u8 = 0;
pub const CURRENT_SEASON_SEED: &[u8] = &[CURRENT_SEASON];

/// Address of `owner`'s user record for the current season.
pub fn find_user_account(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[USER_SEED, owner.as_ref(), CURRENT_SEASON_SEED],
        program_id,
    )
}

/// Parses a base58 address.
pub fn parse_pubkey(s: &str) -> Result<Pubkey, Error> {
    let bytes = bs58::decode(s).into_vec().map_err(|e| Error::Config {
        reason: format!("invalid base58 address {s:?}: {e}"),
    })?;
    let bytes = <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| Error::Config {
        reason: format!("address {s:?} is {} bytes, expected 32", bytes.len()),
    })?;
    Ok(Pubkey::new_from_array(bytes))
}
